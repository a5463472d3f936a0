//! Commit message suggestions from a local StarCoder model.
//!
//! Reads a diff, wraps it in a fixed instruction, samples a bounded
//! continuation from a GPT-BigCode checkpoint on the Hugging Face Hub, and
//! prints the decoded text.
pub mod app;
pub mod config;
pub mod error;
pub mod generate;
pub mod hub;
pub mod input;
pub mod logging;
pub mod mock;
pub mod model;
pub mod prompt;
pub mod starcoder;
pub mod style;
pub mod types;

// Re-export commonly used types
pub use config::{Configuration, GenerationConfig};
pub use error::{CommitGenError, Result};
pub use mock::MockLoader;
pub use model::{ModelLoader, TextModel};
pub use starcoder::HubLoader;
