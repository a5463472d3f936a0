use std::{io, process::ExitCode};

use ai_commit_gen::{
   GenerationConfig, HubLoader, MockLoader, ModelLoader, Result, app,
   config::{self, MODE_ENV},
   input::InputSource,
   logging, style,
   types::{Args, Backend},
};
use clap::Parser;

fn run_with<L: ModelLoader>(
   loader: &L,
   generation: GenerationConfig,
   source: &InputSource,
) -> Result<()> {
   app::run(
      |key| std::env::var(key).ok(),
      generation,
      loader,
      source,
      io::stdin().lock(),
      &mut io::stdout().lock(),
   )?;
   Ok(())
}

fn try_main(args: Args) -> Result<()> {
   let generation = GenerationConfig::load()?;
   let source = InputSource::from_arg(args.diff_file);

   match Backend::from_mode(std::env::var(MODE_ENV).ok().as_deref()) {
      Backend::Hub => run_with(&HubLoader, generation, &source),
      Backend::Mock => run_with(&MockLoader, generation, &source),
   }
}

fn main() -> ExitCode {
   let args = Args::parse();

   // .env never overrides variables already set in the environment
   let dotenv = config::load_dotenv();
   logging::init_tracing();

   match dotenv.and_then(|()| try_main(args)) {
      Ok(()) => ExitCode::SUCCESS,
      Err(e) => {
         style::print_error(&e.to_string());
         ExitCode::FAILURE
      },
   }
}
