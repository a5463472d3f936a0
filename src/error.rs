use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommitGenError {
   #[error("Missing credential: set the {var} environment variable to a Hugging Face read token")]
   MissingCredential { var: &'static str },

   #[error("Configuration error: {0}")]
   Config(String),

   #[error("Unsupported model '{0}': only GPT-BigCode (StarCoder family) checkpoints can be loaded")]
   UnsupportedModel(String),

   #[error("{0}")]
   Hub(#[from] hf_hub::api::sync::ApiError),

   #[error("{0}")]
   Model(#[from] candle_core::Error),

   #[error("Tokenizer error: {0}")]
   Tokenizer(String),

   #[error("Invalid weight index {path}: {reason}")]
   WeightIndex { path: String, reason: String },

   #[error("Failed to read {source_name}: {source}")]
   InputRead {
      source_name: String,
      #[source]
      source:      std::io::Error,
   },

   #[error("Input from {source_name} is not valid UTF-8")]
   InputEncoding { source_name: String },

   #[error("Input diff exceeds the {limit} byte limit (raise max_input_bytes in the config file)")]
   InputTooLarge { limit: u64 },

   #[error("IO error: {0}")]
   IoError(#[from] std::io::Error),
}

impl CommitGenError {
   /// Wrap a `tokenizers` error, keeping its message as-is.
   pub fn tokenizer(err: impl std::fmt::Display) -> Self {
      Self::Tokenizer(err.to_string())
   }
}

pub type Result<T> = std::result::Result<T, CommitGenError>;
