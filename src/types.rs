use std::{fmt, path::PathBuf};

use clap::Parser;

/// Command-line arguments
#[derive(Parser, Debug, Default)]
#[command(
   name = "ai-commit-gen",
   version,
   about = "Suggest a git commit message for a diff using a StarCoder model",
   long_about = "Suggest a git commit message for a diff using a StarCoder model.\n\nReads the \
                 diff from DIFF_FILE, or from standard input when no file is given.\n\nRequires \
                 HUGGINGFACE_HUB_TOKEN. Set USE_CUDA=1 to run on the first CUDA device, or \
                 AI_MODE=mock for an offline canned message."
)]
pub struct Args {
   /// File containing the diff (default: read standard input)
   #[arg(value_name = "DIFF_FILE")]
   pub diff_file: Option<PathBuf>,
}

/// Compute device the model runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComputeDevice {
   #[default]
   Cpu,
   /// First CUDA accelerator (ordinal 0)
   Cuda,
}

impl ComputeDevice {
   /// Only the exact value `"1"` selects the accelerator.
   pub fn from_flag(flag: Option<&str>) -> Self {
      match flag {
         Some("1") => Self::Cuda,
         _ => Self::Cpu,
      }
   }

   /// Instantiate the matching candle device. A missing accelerator is an
   /// error, never a silent CPU fallback.
   pub fn to_candle(self) -> candle_core::Result<candle_core::Device> {
      match self {
         Self::Cpu => Ok(candle_core::Device::Cpu),
         Self::Cuda => candle_core::Device::new_cuda(0),
      }
   }
}

impl fmt::Display for ComputeDevice {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match self {
         Self::Cpu => f.write_str("cpu"),
         Self::Cuda => f.write_str("cuda:0"),
      }
   }
}

/// Which model runtime serves the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
   /// StarCoder weights from the Hugging Face Hub
   #[default]
   Hub,
   /// Offline canned message, no download
   Mock,
}

impl Backend {
   /// `"mock"` selects the offline backend; anything else uses the Hub.
   pub fn from_mode(mode: Option<&str>) -> Self {
      match mode {
         Some("mock") => Self::Mock,
         _ => Self::Hub,
      }
   }
}

/// Hugging Face access token. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
   /// Returns `None` for an empty token.
   pub fn new(token: impl Into<String>) -> Option<Self> {
      let token = token.into();
      if token.is_empty() { None } else { Some(Self(token)) }
   }

   pub fn expose(&self) -> &str {
      &self.0
   }
}

impl fmt::Debug for Credential {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str("Credential(***)")
   }
}
