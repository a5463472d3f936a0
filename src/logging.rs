use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter directives for diagnostics, e.g. `ai_commit_gen=debug`.
pub const LOG_ENV: &str = "AI_COMMIT_GEN_LOG";

/// Install the stderr tracing subscriber. Defaults to `warn` when
/// `AI_COMMIT_GEN_LOG` is unset or invalid.
pub fn init_tracing() {
   let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
   let _ = tracing_subscriber::registry()
      .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
      .with(filter)
      .try_init();
}
