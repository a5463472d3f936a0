//! Offline backend selected with `AI_MODE=mock`.
//!
//! Nothing is downloaded: each encoded text becomes a single token and
//! generation appends one token that decodes to a fixed message, so the whole
//! pipeline can run without weights or network access.

use std::cell::RefCell;

use crate::{
   config::Configuration,
   error::{CommitGenError, Result},
   model::{ModelLoader, TextModel},
};

pub const MOCK_MESSAGE: &str = "feat: mock commit message";

const MESSAGE_TOKEN: u32 = 0;

/// Remembers every encoded text; token `n + 1` stands for the `n`-th one.
#[derive(Debug, Default)]
pub struct CannedModel {
   texts: RefCell<Vec<String>>,
}

impl TextModel for CannedModel {
   fn encode(&self, text: &str) -> Result<Vec<u32>> {
      let mut texts = self.texts.borrow_mut();
      texts.push(text.to_string());
      let id = u32::try_from(texts.len())
         .map_err(|_| CommitGenError::tokenizer("too many texts for the mock vocabulary"))?;
      Ok(vec![id])
   }

   fn decode(&self, tokens: &[u32]) -> Result<String> {
      let texts = self.texts.borrow();
      let mut out = String::new();
      for &token in tokens {
         if token == MESSAGE_TOKEN {
            out.push('\n');
            out.push_str(MOCK_MESSAGE);
            continue;
         }
         let text = texts
            .get(token as usize - 1)
            .ok_or_else(|| CommitGenError::tokenizer(format!("unknown token id {token}")))?;
         out.push_str(text);
      }
      Ok(out)
   }

   fn generate(&mut self, prompt: &[u32], _max_length: usize) -> Result<Vec<u32>> {
      let mut out = prompt.to_vec();
      out.push(MESSAGE_TOKEN);
      Ok(out)
   }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MockLoader;

impl ModelLoader for MockLoader {
   type Model = CannedModel;

   fn load(&self, config: &Configuration) -> Result<CannedModel> {
      tracing::info!(model = %config.model_id, "mock mode: skipping model download");
      Ok(CannedModel::default())
   }
}
