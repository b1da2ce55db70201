// Command line surface: parse arguments into a `Command` and run it.

use crate::api::{AnalysisClient, DEFAULT_INPUT_TYPE};
use crate::config::ClientConfig;
use crate::domain::domain_list;
use crate::progress::ProgressSink;
use crate::ui;
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "domain-insight",
    version,
    about = "Domain analysis through a local AI backend, with static fallbacks"
)]
pub struct Cli {
    /// Check backend health and print it as JSON
    #[arg(long)]
    pub health: bool,

    /// List installed and recommended models
    #[arg(long)]
    pub install: bool,

    /// Pick domain and query from an interactive menu
    #[arg(long)]
    pub interactive: bool,

    /// Backend base URL (overrides AI_BACKEND_URL)
    #[arg(long, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Model runtime URL shown in instructions (overrides OLLAMA_URL)
    #[arg(long, value_name = "URL")]
    pub ollama_url: Option<String>,

    /// Input type sent with an analysis request
    #[arg(long, default_value = DEFAULT_INPUT_TYPE)]
    pub input_type: String,

    /// File to attach; only used when it exists
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// `<domain> <query words...>`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Demo,
    Health,
    Install,
    Interactive,
    Analyze {
        domain: String,
        query: String,
        input_type: String,
        file: Option<PathBuf>,
    },
    Usage,
}

impl Cli {
    pub fn config(&self, base: ClientConfig) -> ClientConfig {
        let mut config = base;
        if let Some(url) = &self.backend_url {
            config = config.with_backend_url(url.clone());
        }
        if let Some(url) = &self.ollama_url {
            config = config.with_ollama_url(url.clone());
        }
        config
    }

    pub fn command(self) -> Command {
        let modes = [self.health, self.install, self.interactive]
            .iter()
            .filter(|m| **m)
            .count();
        match (modes, self.args.len()) {
            (0, 0) => Command::Demo,
            (1, 0) if self.health => Command::Health,
            (1, 0) if self.install => Command::Install,
            (1, 0) => Command::Interactive,
            (0, n) if n >= 2 => {
                let mut args = self.args.into_iter();
                let domain = args.next().unwrap_or_default();
                let query = args.collect::<Vec<_>>().join(" ");
                Command::Analyze {
                    domain,
                    query,
                    input_type: self.input_type,
                    file: self.file,
                }
            }
            _ => Command::Usage,
        }
    }
}

pub fn usage() -> String {
    format!(
        "Usage:\n  \
         domain-insight                    # Run comprehensive test\n  \
         domain-insight --health           # Check system health\n  \
         domain-insight --install          # Install models\n  \
         domain-insight --interactive      # Pick domain and query from a menu\n  \
         domain-insight <domain> <query>   # Analyze specific domain\n\
         \nDomains: {}",
        domain_list()
    )
}

fn print_json(out: &mut dyn Write, value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Serializing output")?;
    writeln!(out, "{json}")?;
    Ok(())
}

/// Execute `command`, writing its output to `out`.
pub fn execute<S: ProgressSink>(command: Command, client: &AnalysisClient<S>, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Demo => {
            ui::run_demo(client, out);
            Ok(())
        }
        Command::Health => {
            let report = ui::with_spinner(client.sink(), "Checking backend...", || client.check_health());
            print_json(out, &report)
        }
        Command::Install => {
            let report = ui::with_spinner(client.sink(), "Listing models...", || client.install_models());
            print_json(out, &report)
        }
        Command::Interactive => ui::interactive_menu(client, out),
        Command::Analyze {
            domain,
            query,
            input_type,
            file,
        } => {
            let result = ui::with_spinner(client.sink(), "Analyzing...", || {
                client.analyze_domain(&domain, &query, &input_type, file.as_deref())
            });
            print_json(out, &result)
        }
        Command::Usage => {
            writeln!(out, "{}", usage())?;
            Ok(())
        }
    }
}

/// Build a client from `base` plus any URL flags on `cli`, then run the
/// selected command.
pub fn run<S: ProgressSink>(cli: Cli, base: ClientConfig, sink: S, out: &mut dyn Write) -> Result<()> {
    let client = AnalysisClient::new(cli.config(base), sink)?;
    execute(cli.command(), &client, out)
}
