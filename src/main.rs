// Entrypoint for the CLI application.
// - Keeps `main` small: set up logging, parse arguments, hand off to `cli::run`.
// - Logs go to stderr so JSON printed on stdout stays pipeable.

use clap::Parser;
use domain_insight::cli::{self, Cli};
use domain_insight::progress::TerminalSink;
use domain_insight::ClientConfig;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("domain_insight=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    // Base settings come from AI_BACKEND_URL / OLLAMA_URL; flags on `cli`
    // override them.
    let base = ClientConfig::from_env();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    cli::run(cli, base, TerminalSink::new(), &mut out)
}
