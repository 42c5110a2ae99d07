mod args;
mod console;
mod engine;
mod lifecycle;
mod orchestrator;
mod progress;

use std::process::ExitCode;

use ansi_term::Colour;
use args::Commands;
use clap::Parser;
use console::Console;
use engine::BundlerEngine;
use env_logger::Env;
use orchestrator::Orchestrator;

const LOG_ENV: &str = "MODULE_BUILD_LOG";

#[tokio::main]
async fn main() -> ExitCode {
  let args = Commands::parse();
  env_logger::Builder::from_env(Env::new().filter_or(LOG_ENV, "warn")).init();

  let console = Console::stdout();
  let cwd = match std::env::current_dir() {
    Ok(cwd) => cwd,
    Err(error) => {
      console.line(&format!("module-build:{} {error}", Colour::Red.paint("ERROR")));
      return ExitCode::FAILURE;
    }
  };

  Orchestrator::new(BundlerEngine, cwd, console).run(&args).await.into()
}
