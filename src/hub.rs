//! Model file retrieval from the Hugging Face Hub.

use std::{
   collections::BTreeSet,
   io::IsTerminal,
   path::{Path, PathBuf},
};

use hf_hub::{
   Repo, RepoType,
   api::sync::{ApiBuilder, ApiRepo},
};
use serde::Deserialize;

use crate::{
   config::Configuration,
   error::{CommitGenError, Result},
};

pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const SINGLE_WEIGHTS_FILE: &str = "model.safetensors";
pub const WEIGHTS_INDEX_FILE: &str = "model.safetensors.index.json";

/// Local paths of everything needed to build the model.
#[derive(Debug, Clone)]
pub struct ModelFiles {
   pub tokenizer: PathBuf,
   pub weights:   Vec<PathBuf>,
}

/// Open the configured repository, authenticated with the credential.
pub fn open_repo(config: &Configuration) -> Result<ApiRepo> {
   let api = ApiBuilder::new()
      .with_token(Some(config.credential.expose().to_string()))
      .with_progress(std::io::stderr().is_terminal())
      .build()?;

   Ok(api.repo(Repo::with_revision(
      config.model_id.clone(),
      RepoType::Model,
      config.generation.revision.clone(),
   )))
}

/// Download (or reuse from cache) the tokenizer and weight files.
pub fn fetch_model_files(repo: &ApiRepo) -> Result<ModelFiles> {
   let tokenizer = repo.get(TOKENIZER_FILE)?;
   tracing::debug!(path = %tokenizer.display(), "tokenizer ready");

   let weights = weight_files(|name| repo.get(name).map_err(CommitGenError::from))?;
   Ok(ModelFiles { tokenizer, weights })
}

#[derive(Debug, Deserialize)]
struct WeightIndex {
   weight_map: std::collections::HashMap<String, String>,
}

/// Resolve weight files: every shard named in the safetensors index, or the
/// single `model.safetensors` when the repository is not sharded.
pub fn weight_files(fetch: impl Fn(&str) -> Result<PathBuf>) -> Result<Vec<PathBuf>> {
   let index_path = match fetch(WEIGHTS_INDEX_FILE) {
      Ok(path) => path,
      Err(e) => {
         tracing::debug!(error = %e, "no weight index, using single weights file");
         return Ok(vec![fetch(SINGLE_WEIGHTS_FILE)?]);
      },
   };

   let shards = shard_names(&index_path)?;
   tracing::info!(shards = shards.len(), "fetching sharded weights");
   shards.iter().map(|name| fetch(name)).collect()
}

fn shard_names(index_path: &Path) -> Result<BTreeSet<String>> {
   let invalid = |reason: String| CommitGenError::WeightIndex {
      path: index_path.display().to_string(),
      reason,
   };

   let contents = std::fs::read_to_string(index_path).map_err(|e| invalid(e.to_string()))?;
   let index: WeightIndex = serde_json::from_str(&contents).map_err(|e| invalid(e.to_string()))?;

   let shards: BTreeSet<String> = index.weight_map.into_values().collect();
   if shards.is_empty() {
      return Err(invalid("weight_map is empty".to_string()));
   }
   Ok(shards)
}
