//! Terminal styling for status output.
//!
//! Everything here writes to stderr: stdout carries only the commit message.
//! Respects `NO_COLOR` and terminal capabilities.

use std::{
   io::{self, IsTerminal, Write},
   sync::{OnceLock, mpsc},
   thread,
   time::Duration,
};

use owo_colors::OwoColorize;

/// Whether color output is enabled on stderr (cached on first call).
static COLOR_ENABLED: OnceLock<bool> = OnceLock::new();

pub fn colors_enabled() -> bool {
   *COLOR_ENABLED.get_or_init(|| {
      // NO_COLOR takes precedence (https://no-color.org/)
      if std::env::var_os("NO_COLOR").is_some() {
         return false;
      }
      supports_color::on(supports_color::Stream::Stderr).is_some_and(|level| level.has_basic)
   })
}

// === Color Palette ===

/// Error: fatal failures (red + bold).
pub fn error(s: &str) -> String {
   if colors_enabled() {
      s.red().bold().to_string()
   } else {
      s.to_string()
   }
}

/// Model name styling (magenta).
pub fn model(s: &str) -> String {
   if colors_enabled() {
      s.magenta().to_string()
   } else {
      s.to_string()
   }
}

/// Dim: less important details (dimmed).
pub fn dim(s: &str) -> String {
   if colors_enabled() {
      s.dimmed().to_string()
   } else {
      s.to_string()
   }
}

pub mod icons {
   pub const SUCCESS: &str = "\u{2713}";
   pub const ERROR: &str = "\u{2717}";
   pub const INFO: &str = "\u{2139}";
}

/// Print an informational status line.
pub fn print_info(msg: &str) {
   if colors_enabled() {
      eprintln!("{} {msg}", icons::INFO.cyan());
   } else {
      eprintln!("{} {msg}", icons::INFO);
   }
}

/// Print the single fatal error line of a failed run.
pub fn print_error(msg: &str) {
   eprintln!("{} {}", error(icons::ERROR), error(msg));
}

// === Spinner ===

const SPINNER_FRAMES: &[char] = &[
   '\u{280B}', '\u{2819}', '\u{2839}', '\u{2838}', '\u{283C}', '\u{2834}', '\u{2826}', '\u{2827}',
   '\u{2807}', '\u{280F}',
];

/// Run `f` with a spinner on stderr, finishing with a success or failure icon.
/// Prints the message once when stderr is not a colour terminal.
pub fn with_spinner_result<F, T, E>(message: &str, f: F) -> Result<T, E>
where
   F: FnOnce() -> Result<T, E>,
{
   if !colors_enabled() || !io::stderr().is_terminal() {
      print_info(message);
      return f();
   }

   let (tx, rx) = mpsc::channel::<bool>();
   let msg = message.to_string();

   let spinner = thread::spawn(move || {
      let mut stderr = io::stderr();
      let mut idx = 0;
      loop {
         match rx.try_recv() {
            Ok(success) => {
               let icon = if success {
                  icons::SUCCESS.green().to_string()
               } else {
                  icons::ERROR.red().to_string()
               };
               writeln!(stderr, "\r\x1b[K{icon} {msg}").ok();
               stderr.flush().ok();
               break;
            },
            Err(mpsc::TryRecvError::Disconnected) => break,
            Err(mpsc::TryRecvError::Empty) => {},
         }
         write!(stderr, "\r{} {}", SPINNER_FRAMES[idx].cyan(), msg).ok();
         stderr.flush().ok();
         idx = (idx + 1) % SPINNER_FRAMES.len();
         thread::sleep(Duration::from_millis(80));
      }
   });

   let result = f();
   tx.send(result.is_ok()).ok();
   spinner.join().ok();
   result
}
