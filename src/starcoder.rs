//! StarCoder (GPT-BigCode) backend built on candle.

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::{
   generation::{LogitsProcessor, Sampling},
   models::bigcode::{Config, GPTBigCode},
};
use tokenizers::Tokenizer;

use crate::{
   config::{Configuration, GenerationConfig},
   error::{CommitGenError, Result},
   hub,
   model::{ModelLoader, TextModel, new_token_budget},
};

pub const END_OF_TEXT: &str = "<|endoftext|>";

/// Architecture of a supported checkpoint, keyed on the repository name.
pub fn architecture(model_id: &str) -> Result<Config> {
   let name = model_id.rsplit('/').next().unwrap_or(model_id).to_ascii_lowercase();
   match name.as_str() {
      "starcoder" | "starcoderbase" | "starcoderplus" => Ok(Config::starcoder()),
      "starcoderbase-1b" => Ok(Config::starcoder_1b()),
      "starcoderbase-3b" => Ok(Config::starcoder_3b()),
      "starcoderbase-7b" => Ok(Config::starcoder_7b()),
      _ => Err(CommitGenError::UnsupportedModel(model_id.to_string())),
   }
}

/// Map the configured sampling knobs onto candle's strategies.
pub fn sampling(config: &GenerationConfig) -> Sampling {
   let temperature = config.temperature;
   match (config.top_k, config.top_p) {
      (0, None) => Sampling::All { temperature },
      (0, Some(p)) => Sampling::TopP { p, temperature },
      (k, None) => Sampling::TopK { k, temperature },
      (k, Some(p)) => Sampling::TopKThenTopP { k, p, temperature },
   }
}

/// Token-level decoding loop over a GPT-BigCode model.
pub struct Generator {
   model:     GPTBigCode,
   device:    Device,
   processor: LogitsProcessor,
   eos:       Option<u32>,
   used:      bool,
}

impl Generator {
   pub fn new(
      model: GPTBigCode,
      device: Device,
      processor: LogitsProcessor,
      eos: Option<u32>,
   ) -> Self {
      Self { model, device, processor, eos, used: false }
   }

   /// Sample until `max_length` total tokens or end-of-text.
   ///
   /// The attention cache lives inside the model, so a generator serves a
   /// single generation.
   pub fn run(&mut self, prompt: &[u32], max_length: usize) -> Result<Vec<u32>> {
      if self.used {
         return Err(candle_core::Error::Msg("generator already used".to_string()).into());
      }
      if prompt.is_empty() {
         return Err(candle_core::Error::Msg("cannot generate from an empty prompt".to_string())
            .into());
      }
      self.used = true;

      let budget = new_token_budget(prompt.len(), max_length);
      let window = self.model.config().max_position_embeddings;
      if prompt.len() + budget > window {
         return Err(candle_core::Error::Msg(format!(
            "prompt of {} tokens does not fit the model's {window}-token context",
            prompt.len()
         ))
         .into());
      }

      let use_cache = self.model.config().use_cache;
      let mut tokens = prompt.to_vec();
      for index in 0..budget {
         let (context_size, past_len) = if use_cache && index > 0 {
            (1, tokens.len() - 1)
         } else {
            (tokens.len(), 0)
         };
         let context = &tokens[tokens.len() - context_size..];
         let input = Tensor::new(context, &self.device)?.unsqueeze(0)?;
         let logits = self.model.forward(&input, past_len)?;
         let logits = logits.squeeze(0)?.to_dtype(DType::F32)?;

         let next = self.processor.sample(&logits)?;
         tokens.push(next);
         if Some(next) == self.eos {
            tracing::debug!(step = index, "end of text");
            break;
         }
      }
      Ok(tokens)
   }
}

/// Tokenizer plus generator for one StarCoder checkpoint.
pub struct StarCoder {
   tokenizer:           Tokenizer,
   generator:           Generator,
   skip_special_tokens: bool,
}

impl TextModel for StarCoder {
   fn encode(&self, text: &str) -> Result<Vec<u32>> {
      let encoding = self.tokenizer.encode(text, true).map_err(CommitGenError::tokenizer)?;
      Ok(encoding.get_ids().to_vec())
   }

   fn decode(&self, tokens: &[u32]) -> Result<String> {
      self
         .tokenizer
         .decode(tokens, self.skip_special_tokens)
         .map_err(CommitGenError::tokenizer)
   }

   fn generate(&mut self, prompt: &[u32], max_length: usize) -> Result<Vec<u32>> {
      self.generator.run(prompt, max_length)
   }
}

/// Loads StarCoder checkpoints from the Hugging Face Hub.
#[derive(Debug, Default, Clone, Copy)]
pub struct HubLoader;

impl ModelLoader for HubLoader {
   type Model = StarCoder;

   fn load(&self, config: &Configuration) -> Result<StarCoder> {
      let architecture = architecture(&config.model_id)?;
      let device = config.device.to_candle()?;
      tracing::info!(model = %config.model_id, device = %config.device, "loading model");

      let repo = hub::open_repo(config)?;
      let files = hub::fetch_model_files(&repo)?;

      let tokenizer = Tokenizer::from_file(&files.tokenizer).map_err(CommitGenError::tokenizer)?;
      let eos = tokenizer.token_to_id(END_OF_TEXT);

      // SAFETY: the safetensors files live in the hub cache and are not
      // modified while mapped.
      let vb = unsafe { VarBuilder::from_mmaped_safetensors(&files.weights, DType::F32, &device)? };
      let model = GPTBigCode::load(vb, architecture)?;

      let seed = config.generation.seed.unwrap_or_else(rand::random);
      tracing::debug!(seed, "sampling seed");
      let processor = LogitsProcessor::from_sampling(seed, sampling(&config.generation));

      Ok(StarCoder {
         tokenizer,
         generator: Generator::new(model, device, processor, eos),
         skip_special_tokens: config.generation.skip_special_tokens,
      })
   }
}
