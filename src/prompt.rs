use crate::input::DiffText;

/// Instruction placed before the diff.
pub const INSTRUCTION: &str = "Generate a concise git commit message for the following diff:";

/// Prompt sent to the model: instruction, newline, then the untouched diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
   pub fn as_str(&self) -> &str {
      &self.0
   }
}

pub fn build_prompt(diff: &DiffText) -> Prompt {
   let diff = diff.as_str();
   let mut prompt = String::with_capacity(INSTRUCTION.len() + 1 + diff.len());
   prompt.push_str(INSTRUCTION);
   prompt.push('\n');
   prompt.push_str(diff);
   Prompt(prompt)
}
