//! One invocation: configure, read, guard, prompt, load, generate, print.

use std::io::{Read, Write};

use crate::{
   config::{Configuration, GenerationConfig},
   error::Result,
   generate::generate_message,
   input::{InputSource, read_diff},
   model::ModelLoader,
   prompt::build_prompt,
   style,
};

/// Printed instead of a message when the diff is blank.
pub const EMPTY_INPUT_NOTICE: &str = "No input diff provided.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
   /// Blank input; the model was never loaded.
   EmptyInput,
   /// The trimmed message that was printed.
   Message(String),
}

/// Run the pipeline once.
///
/// The credential is checked before anything else, and the model is only
/// loaded once a non-blank diff is in hand. Every error is final.
pub fn run<L: ModelLoader>(
   env: impl Fn(&str) -> Option<String>,
   generation: GenerationConfig,
   loader: &L,
   source: &InputSource,
   stdin: impl Read,
   out: &mut impl Write,
) -> Result<Outcome> {
   let config = Configuration::resolve(env, generation)?;
   tracing::debug!(model = %config.model_id, device = %config.device, "resolved configuration");

   let diff = read_diff(source, stdin, config.generation.max_input_bytes)?;
   if diff.is_blank() {
      writeln!(out, "{EMPTY_INPUT_NOTICE}")?;
      return Ok(Outcome::EmptyInput);
   }

   let prompt = build_prompt(&diff);

   // No spinner here: first-time downloads draw their own progress bars
   style::print_info(&format!(
      "Loading {} on {}",
      style::model(&config.model_id),
      style::dim(&config.device.to_string())
   ));
   let mut model = loader.load(&config)?;

   let message = style::with_spinner_result("Generating commit message", || {
      generate_message(&mut model, &prompt, config.generation.max_length)
   })?;

   writeln!(out, "{message}")?;
   out.flush()?;
   Ok(Outcome::Message(message))
}

#[cfg(test)]
mod tests {
   use std::io::{self, Cursor};

   use super::*;
   use crate::{
      config::{CREDENTIAL_ENV, DEVICE_ENV},
      error::CommitGenError,
      generate::tests::ScriptedLoader,
      prompt::INSTRUCTION,
      types::ComputeDevice,
   };

   fn with_token(key: &str) -> Option<String> {
      (key == CREDENTIAL_ENV).then(|| "hf_test".to_string())
   }

   fn no_env(_: &str) -> Option<String> {
      None
   }

   struct UntouchedStdin;

   impl Read for UntouchedStdin {
      fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
         panic!("stdin must not be read when a file argument is given");
      }
   }

   fn run_stdin(
      env: impl Fn(&str) -> Option<String>,
      loader: &ScriptedLoader,
      stdin: &str,
   ) -> (Result<Outcome>, String) {
      let mut out = Vec::new();
      let result = run(
         env,
         GenerationConfig::default(),
         loader,
         &InputSource::Stdin,
         Cursor::new(stdin.to_string()),
         &mut out,
      );
      (result, String::from_utf8(out).unwrap())
   }

   // ========== Empty input ==========

   #[test]
   fn test_blank_input_prints_notice_without_loading() {
      for blank in ["", "   ", "\n\n", "\t \r\n"] {
         let loader = ScriptedLoader::new("never");
         let (result, stdout) = run_stdin(with_token, &loader, blank);

         assert_eq!(result.unwrap(), Outcome::EmptyInput);
         assert_eq!(stdout, "No input diff provided.\n");
         assert_eq!(loader.record.borrow().loads, 0);
         assert!(loader.record.borrow().prompts.is_empty());
      }
   }

   // ========== Configuration ==========

   #[test]
   fn test_missing_credential_fails_before_loading() {
      let loader = ScriptedLoader::new("x");
      let (result, stdout) = run_stdin(no_env, &loader, "+a\n");

      let err = result.unwrap_err();
      assert!(matches!(err, CommitGenError::MissingCredential { .. }));
      assert!(err.to_string().contains(CREDENTIAL_ENV));
      assert_eq!(loader.record.borrow().loads, 0);
      assert!(stdout.is_empty());
   }

   #[test]
   fn test_device_flag_reaches_loader() {
      struct DeviceProbe(std::cell::Cell<Option<ComputeDevice>>);

      impl ModelLoader for DeviceProbe {
         type Model = crate::generate::tests::ScriptedModel;

         fn load(&self, config: &Configuration) -> Result<Self::Model> {
            self.0.set(Some(config.device));
            Err(CommitGenError::UnsupportedModel(config.model_id.clone()))
         }
      }

      let probe = DeviceProbe(std::cell::Cell::new(None));
      let env = |key: &str| match key {
         CREDENTIAL_ENV => Some("t".to_string()),
         DEVICE_ENV => Some("1".to_string()),
         _ => None,
      };
      let mut out = Vec::new();
      let result = run(
         env,
         GenerationConfig::default(),
         &probe,
         &InputSource::Stdin,
         Cursor::new("+a"),
         &mut out,
      );

      assert!(result.is_err());
      assert_eq!(probe.0.get(), Some(ComputeDevice::Cuda));
   }

   // ========== Generation ==========

   #[test]
   fn test_file_input_end_to_end() {
      let dir = tempfile::tempdir().unwrap();
      let path = dir.path().join("change.diff");
      std::fs::write(&path, "diff --git a/x b/x\n+foo\n").unwrap();

      let loader = ScriptedLoader::new("\nAdd foo to x\n");
      let generation = GenerationConfig { max_length: 10_000, ..Default::default() };
      let mut out = Vec::new();
      let outcome = run(
         with_token,
         generation,
         &loader,
         &InputSource::File(path),
         UntouchedStdin,
         &mut out,
      )
      .unwrap();

      let expected_prompt = format!("{INSTRUCTION}\ndiff --git a/x b/x\n+foo\n");
      let record = loader.record.borrow();
      assert_eq!(record.loads, 1);
      assert_eq!(record.prompts, vec![expected_prompt.clone()]);
      assert_eq!(record.generations.len(), 1);

      let expected_message = format!("{expected_prompt}\nAdd foo to x");
      assert_eq!(outcome, Outcome::Message(expected_message.clone()));
      assert_eq!(String::from_utf8(out).unwrap(), format!("{expected_message}\n"));
   }

   #[test]
   fn test_stdin_input_reaches_prompt() {
      let loader = ScriptedLoader::new("");
      let (result, _) = run_stdin(with_token, &loader, "  +bar\n");

      assert!(result.is_ok());
      assert_eq!(loader.record.borrow().prompts, vec![format!("{INSTRUCTION}\n  +bar\n")]);
   }

   #[test]
   fn test_default_bound_is_passed_to_generation() {
      let loader = ScriptedLoader::new("");
      let (result, _) = run_stdin(with_token, &loader, "+x");

      assert!(result.is_ok());
      let prompt_len = INSTRUCTION.len() + 1 + 2;
      assert_eq!(loader.record.borrow().generations, vec![(prompt_len, 50)]);
   }

   #[test]
   fn test_load_failure_is_fatal() {
      let mut loader = ScriptedLoader::new("x");
      loader.fail_load = true;
      let (result, stdout) = run_stdin(with_token, &loader, "+a");

      assert!(matches!(result, Err(CommitGenError::UnsupportedModel(_))));
      assert!(loader.record.borrow().prompts.is_empty());
      assert!(stdout.is_empty());
   }

   #[test]
   fn test_generation_failure_is_fatal() {
      let mut loader = ScriptedLoader::new("x");
      loader.fail_generate = true;
      let (result, stdout) = run_stdin(with_token, &loader, "+a");

      assert!(matches!(result, Err(CommitGenError::Model(_))));
      assert!(stdout.is_empty());
   }

   #[test]
   fn test_oversized_input_never_loads() {
      let loader = ScriptedLoader::new("x");
      let generation = GenerationConfig { max_input_bytes: 4, ..Default::default() };
      let mut out = Vec::new();
      let result = run(
         with_token,
         generation,
         &loader,
         &InputSource::Stdin,
         Cursor::new("+abcdef"),
         &mut out,
      );

      assert!(matches!(result, Err(CommitGenError::InputTooLarge { limit: 4 })));
      assert_eq!(loader.record.borrow().loads, 0);
   }
}
