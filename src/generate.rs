use crate::{error::Result, model::TextModel, prompt::Prompt};

/// Encode the prompt, run one bounded generation, decode, and trim.
///
/// The decoded text covers the whole returned sequence, so the prompt is
/// echoed ahead of the continuation.
pub fn generate_message<M: TextModel>(
   model: &mut M,
   prompt: &Prompt,
   max_length: usize,
) -> Result<String> {
   let input = model.encode(prompt.as_str())?;
   tracing::debug!(prompt_tokens = input.len(), max_length, "encoded prompt");
   if input.len() >= max_length {
      tracing::warn!(
         prompt_tokens = input.len(),
         max_length,
         "prompt already reaches max_length; only one token will be generated"
      );
   }

   let output = model.generate(&input, max_length)?;
   tracing::debug!(total_tokens = output.len(), "generation finished");

   let text = model.decode(&output)?;
   Ok(text.trim().to_string())
}
