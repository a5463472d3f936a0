use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
   error::{CommitGenError, Result},
   types::{ComputeDevice, Credential},
};

/// Selects the CUDA device when exactly `"1"`
pub const DEVICE_ENV: &str = "USE_CUDA";
/// Hugging Face read token (required)
pub const CREDENTIAL_ENV: &str = "HUGGINGFACE_HUB_TOKEN";
/// Overrides the config file location
pub const CONFIG_PATH_ENV: &str = "AI_COMMIT_GEN_CONFIG";
/// Overrides `model_id` from the config file
pub const MODEL_ENV: &str = "AI_COMMIT_GEN_MODEL";
/// `mock` selects the offline canned-message backend
pub const MODE_ENV: &str = "AI_MODE";

pub const DEFAULT_MODEL_ID: &str = "bigcode/starcoder";
/// Total sequence bound, prompt tokens included.
pub const DEFAULT_MAX_LENGTH: usize = 50;
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 8 * 1024 * 1024;

/// Generation settings, optionally read from
/// `~/.config/ai-commit-gen/config.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
   pub model_id: String,
   pub revision: String,

   /// Maximum total token count of prompt plus generated tokens
   pub max_length: usize,

   pub temperature: f64,

   /// Top-k cut-off; 0 disables it
   pub top_k: usize,

   pub top_p: Option<f64>,

   /// Fixed sampling seed; a random one is drawn per run when unset
   pub seed: Option<u64>,

   /// Remove special tokens (e.g. `<|endoftext|>`) while decoding
   pub skip_special_tokens: bool,

   /// Inputs larger than this are rejected instead of truncated
   pub max_input_bytes: u64,
}

impl Default for GenerationConfig {
   fn default() -> Self {
      Self {
         model_id:            DEFAULT_MODEL_ID.to_string(),
         revision:            "main".to_string(),
         max_length:          DEFAULT_MAX_LENGTH,
         temperature:         1.0,
         top_k:               50,
         top_p:               None,
         seed:                None,
         skip_special_tokens: false,
         max_input_bytes:     DEFAULT_MAX_INPUT_BYTES,
      }
   }
}

impl GenerationConfig {
   /// Load config from `$AI_COMMIT_GEN_CONFIG` or the default location.
   /// A missing file yields defaults; `AI_COMMIT_GEN_MODEL` overrides the model.
   pub fn load() -> Result<Self> {
      let config_path = if let Ok(custom_path) = std::env::var(CONFIG_PATH_ENV) {
         Some(PathBuf::from(custom_path))
      } else {
         Self::default_config_path()
      };

      let mut config = match config_path {
         Some(path) if path.exists() => Self::from_file(&path)?,
         _ => Self::default(),
      };

      config.apply_env_overrides(|key| std::env::var(key).ok());
      Ok(config)
   }

   /// Load config from a specific file
   pub fn from_file(path: &Path) -> Result<Self> {
      let contents = std::fs::read_to_string(path).map_err(|e| {
         CommitGenError::Config(format!("failed to read {}: {e}", path.display()))
      })?;
      let config = Self::parse(&contents)
         .map_err(|e| CommitGenError::Config(format!("failed to parse {}: {e}", path.display())))?;
      tracing::debug!(path = %path.display(), "loaded config file");
      Ok(config)
   }

   fn parse(contents: &str) -> std::result::Result<Self, String> {
      let config: Self = toml::from_str(contents).map_err(|e| e.to_string())?;
      if config.max_length == 0 {
         return Err("max_length must be at least 1".to_string());
      }
      if config.temperature <= 0.0 {
         return Err("temperature must be positive".to_string());
      }
      if let Some(p) = config.top_p
         && !(p > 0.0 && p <= 1.0)
      {
         return Err(format!("top_p must be in (0, 1], got {p}"));
      }
      Ok(config)
   }

   fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
      if let Some(model) = lookup(MODEL_ENV).filter(|m| !m.trim().is_empty()) {
         self.model_id = model;
      }
   }

   /// `~/.config/ai-commit-gen/config.toml`, trying HOME then USERPROFILE
   pub fn default_config_path() -> Option<PathBuf> {
      std::env::var("HOME")
         .or_else(|_| std::env::var("USERPROFILE"))
         .ok()
         .map(|home| PathBuf::from(home).join(".config/ai-commit-gen/config.toml"))
   }
}

/// Load `.env` from the working directory without overriding variables that
/// are already set. Only a missing file is tolerated.
pub fn load_dotenv() -> Result<()> {
   check_dotenv(dotenvy::dotenv())
}

fn check_dotenv(loaded: std::result::Result<PathBuf, dotenvy::Error>) -> Result<()> {
   match loaded {
      Ok(_) => Ok(()),
      Err(e) if e.not_found() => Ok(()),
      Err(e) => Err(CommitGenError::Config(format!("failed to load .env: {e}"))),
   }
}

/// Everything the run needs, resolved once at startup and passed explicitly.
#[derive(Debug, Clone)]
pub struct Configuration {
   pub model_id:   String,
   pub device:     ComputeDevice,
   pub credential: Credential,
   pub generation: GenerationConfig,
}

impl Configuration {
   /// Resolve from an arbitrary variable lookup. Fails on a missing or empty
   /// credential.
   pub fn resolve(
      lookup: impl Fn(&str) -> Option<String>,
      generation: GenerationConfig,
   ) -> Result<Self> {
      let credential = lookup(CREDENTIAL_ENV)
         .and_then(Credential::new)
         .ok_or(CommitGenError::MissingCredential { var: CREDENTIAL_ENV })?;
      let device = ComputeDevice::from_flag(lookup(DEVICE_ENV).as_deref());

      Ok(Self { model_id: generation.model_id.clone(), device, credential, generation })
   }
}
