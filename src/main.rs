//! chat - terminal ChatGPT interface
//!
#![doc = "Main entry point for the chat binary."]

use anyhow::Result;
use colored::Colorize;
use std::io::{IsTerminal, Read};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chat::cli::Cli;
use chat::commands::{self, Invocation};
use chat::config::GatewayConfig;
use chat::output;
use chat::providers::create_provider;
use chat::storage::StateStore;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments (exits on --help, --version and usage errors)
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let arg_count = std::env::args_os().len().saturating_sub(1);
    let piped = read_piped_stdin()?;
    let invocation = Invocation::from_cli(&cli, piped, arg_count);

    let store = match &cli.state_file {
        Some(path) => StateStore::new_with_path(path),
        None => StateStore::new()?,
    };
    tracing::debug!("Using state file {}", store.path().display());

    let provider = create_provider(GatewayConfig::from_env())?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = commands::execute(
        &invocation,
        &store,
        provider.as_ref(),
        &mut out,
        output::terminal_width(),
    )
    .await?;

    tracing::debug!("Invocation finished: {:?}", outcome);
    Ok(())
}

/// Read the whole of stdin when it is not an interactive terminal
fn read_piped_stdin() -> Result<Option<String>> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut content = String::new();
    stdin.read_to_string(&mut content)?;
    Ok(Some(content))
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr; stdout is reserved for replies.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "chat=debug" } else { "chat=warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
