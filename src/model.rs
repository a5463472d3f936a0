//! Capability boundary between the orchestration and the model runtime.
//!
//! The orchestrator only needs to turn text into token ids, extend a token
//! sequence, and turn ids back into text. [`crate::starcoder`] implements this
//! with candle; tests use a scripted stand-in.

use crate::{config::Configuration, error::Result};

/// A loaded tokenizer plus generative model.
pub trait TextModel {
   fn encode(&self, text: &str) -> Result<Vec<u32>>;

   fn decode(&self, tokens: &[u32]) -> Result<String>;

   /// Extend `prompt` by sampling. The returned sequence starts with the
   /// prompt tokens and holds at most `max_length` tokens in total, except
   /// that one token is always sampled even when the prompt alone reaches the
   /// bound.
   fn generate(&mut self, prompt: &[u32], max_length: usize) -> Result<Vec<u32>>;
}

/// Builds a [`TextModel`] for a resolved configuration.
pub trait ModelLoader {
   type Model: TextModel;

   fn load(&self, config: &Configuration) -> Result<Self::Model>;
}

/// Number of new tokens to sample for a prompt of `prompt_len` tokens.
pub const fn new_token_budget(prompt_len: usize, max_length: usize) -> usize {
   if prompt_len >= max_length { 1 } else { max_length - prompt_len }
}
