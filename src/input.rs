//! Diff input: a named file, or standard input read to end-of-stream.

use std::{
   fmt,
   fs::File,
   io::Read,
   path::PathBuf,
};

use crate::error::{CommitGenError, Result};

/// Where the diff comes from. A file argument always wins over stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
   File(PathBuf),
   Stdin,
}

impl InputSource {
   pub fn from_arg(path: Option<PathBuf>) -> Self {
      path.map_or(Self::Stdin, Self::File)
   }
}

impl fmt::Display for InputSource {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match self {
         Self::File(path) => write!(f, "{}", path.display()),
         Self::Stdin => f.write_str("standard input"),
      }
   }
}

/// Raw diff text, exactly as read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffText(String);

impl DiffText {
   pub fn new(text: impl Into<String>) -> Self {
      Self(text.into())
   }

   pub fn as_str(&self) -> &str {
      &self.0
   }

   /// True when nothing but whitespace was supplied.
   pub fn is_blank(&self) -> bool {
      self.0.trim().is_empty()
   }
}

/// Read the diff from `source`. `stdin` is only touched for
/// [`InputSource::Stdin`].
///
/// At most `limit` bytes are accepted; anything larger is an
/// [`CommitGenError::InputTooLarge`] error rather than a truncated diff.
pub fn read_diff(source: &InputSource, stdin: impl Read, limit: u64) -> Result<DiffText> {
   let bytes = match source {
      InputSource::File(path) => {
         let file = File::open(path).map_err(|e| CommitGenError::InputRead {
            source_name: source.to_string(),
            source:      e,
         })?;
         read_bounded(file, source, limit)?
      },
      InputSource::Stdin => read_bounded(stdin, source, limit)?,
   };

   tracing::debug!(source = %source, bytes = bytes.len(), "read diff input");

   String::from_utf8(bytes)
      .map(DiffText)
      .map_err(|_| CommitGenError::InputEncoding { source_name: source.to_string() })
}

fn read_bounded(reader: impl Read, source: &InputSource, limit: u64) -> Result<Vec<u8>> {
   let mut buf = Vec::new();
   reader
      .take(limit.saturating_add(1))
      .read_to_end(&mut buf)
      .map_err(|e| CommitGenError::InputRead { source_name: source.to_string(), source: e })?;

   if buf.len() as u64 > limit {
      return Err(CommitGenError::InputTooLarge { limit });
   }
   Ok(buf)
}

#[cfg(test)]
mod tests {
   use std::io::{self, Cursor};

   use super::*;

   /// Reader that fails the test if it is ever read.
   struct UntouchedStdin;

   impl Read for UntouchedStdin {
      fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
         panic!("stdin must not be read when a file argument is given");
      }
   }

   #[test]
   fn test_from_arg() {
      assert_eq!(InputSource::from_arg(None), InputSource::Stdin);
      assert_eq!(
         InputSource::from_arg(Some(PathBuf::from("a.diff"))),
         InputSource::File(PathBuf::from("a.diff"))
      );
   }

   #[test]
   fn test_reads_stdin_to_end() {
      let text = "diff --git a/x b/x\n+foo\n".repeat(1000);
      let diff = read_diff(&InputSource::Stdin, Cursor::new(text.clone()), u64::MAX).unwrap();
      assert_eq!(diff.as_str(), text);
   }

   #[test]
   fn test_file_takes_precedence_over_stdin() {
      let dir = tempfile::tempdir().unwrap();
      let path = dir.path().join("change.diff");
      std::fs::write(&path, "from file\n").unwrap();

      let diff = read_diff(&InputSource::File(path), UntouchedStdin, 1024).unwrap();
      assert_eq!(diff.as_str(), "from file\n");
   }

   #[test]
   fn test_missing_file_is_input_error() {
      let dir = tempfile::tempdir().unwrap();
      let path = dir.path().join("nope.diff");

      let err = read_diff(&InputSource::File(path), UntouchedStdin, 1024).unwrap_err();
      assert!(matches!(err, CommitGenError::InputRead { .. }));
      assert!(err.to_string().contains("nope.diff"));
   }

   #[test]
   fn test_limit_is_inclusive() {
      let diff = read_diff(&InputSource::Stdin, Cursor::new("12345"), 5).unwrap();
      assert_eq!(diff.as_str(), "12345");
   }

   #[test]
   fn test_oversized_input_is_rejected() {
      let err = read_diff(&InputSource::Stdin, Cursor::new("123456"), 5).unwrap_err();
      assert!(matches!(err, CommitGenError::InputTooLarge { limit: 5 }));
   }

   #[test]
   fn test_invalid_utf8_is_rejected() {
      let err =
         read_diff(&InputSource::Stdin, Cursor::new(vec![0x66, 0xff, 0xfe]), 1024).unwrap_err();
      assert!(matches!(err, CommitGenError::InputEncoding { .. }));
   }

   #[test]
   fn test_is_blank() {
      for text in ["", " ", "\n", "\t \r\n  "] {
         assert!(DiffText::new(text).is_blank(), "{text:?}");
      }
      assert!(!DiffText::new("  +x\n").is_blank());
   }
}
