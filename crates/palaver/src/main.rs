//! An interactive terminal chat with a hosted model.

#[macro_use]
extern crate tracing;

use std::process::ExitCode;

use palaver::SessionBuilder;
use palaver::config::{Config, ConfigError};
use palaver::repl::Repl;
use tokio::io::{self, BufReader};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}.");
            if err == ConfigError::MissingApiKey {
                eprintln!(
                    "Please set your Anthropic API key before running this program."
                );
            }
            return ExitCode::FAILURE;
        }
    };
    debug!("starting with {config:?}");

    let builder = SessionBuilder::with_anthropic(config.anthropic_config());
    let session = match builder {
        Ok(builder) => builder
            .with_max_output_tokens(config.max_output_tokens)
            .build(),
        Err(err) => {
            eprintln!("Error initializing chat: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut repl = Repl::new(session, std::io::stdout())
        .with_colors()
        .with_spinner();
    if let Err(err) = repl.run(BufReader::new(io::stdin())).await {
        error!("terminal I/O failed: {err}");
        eprintln!("Error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
