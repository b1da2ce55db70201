// UI layer: the six-domain demonstration run, the interactive menu built
// on `dialoguer`, and a spinner shown while a request is in flight.

use crate::api::{AnalysisClient, DEFAULT_INPUT_TYPE};
use crate::domain::Domain;
use crate::progress::ProgressSink;
use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Sample query run for each domain by the demonstration.
pub fn demo_query(domain: Domain) -> &'static str {
    match domain {
        Domain::Agriculture => "Analyze crop yield optimization for tomatoes with current soil pH 6.2 and nitrogen levels at 15 ppm",
        Domain::Health => "Evaluate cardiovascular risk factors for a 35-year-old with BP 130/85, BMI 28, and sedentary lifestyle",
        Domain::Finance => "Assess portfolio rebalancing strategy with 60% stocks, 30% bonds, 10% commodities amid rising inflation",
        Domain::Education => "Optimize learning path for computer science student struggling with data structures and algorithms",
        Domain::Transport => "Analyze traffic flow optimization for urban intersection with 40% congestion during peak hours",
        Domain::Universal => "Synthesize multi-domain insights for smart city planning integrating health, transport, and environmental data",
    }
}

/// Run `f` while a spinner with `message` ticks on stderr. The spinner is
/// hidden when stderr is not a terminal. `sink` is told about the spinner
/// for the duration so its own stderr lines don't interleave with it.
pub fn with_spinner<S: ProgressSink, T>(sink: &S, message: &str, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    sink.attach_spinner(&spinner);
    let out = f();
    sink.detach_spinner();
    spinner.finish_and_clear();
    out
}

/// Health summary, then every domain analyzed one after another. Failures
/// only change what is printed; the run itself always completes, even
/// when `out` stops accepting writes.
pub fn run_demo<S: ProgressSink>(client: &AnalysisClient<S>, out: &mut dyn Write) {
    if let Err(err) = write_demo(client, out) {
        debug!(error = %err, "demo output truncated");
    }
}

fn write_demo<S: ProgressSink>(client: &AnalysisClient<S>, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "Running comprehensive domain analysis test...\n")?;

    let health = client.check_health();
    writeln!(out, "System health: {}", health.status())?;
    if health.ollama_running() {
        writeln!(out, "Ollama status: running")?;
        writeln!(out, "Available models: {}", health.models())?;
    } else {
        writeln!(out, "Ollama status: not running (using fallback)")?;
    }
    writeln!(out)?;

    for domain in Domain::ALL {
        writeln!(
            out,
            "Testing {} domain (model {})...",
            domain.as_str().to_uppercase(),
            client.config().model_for(domain.as_str())
        )?;
        let result = client.analyze(domain.as_str(), demo_query(domain));

        if result.success {
            let analysis = &result.analysis;
            writeln!(out, "Analysis successful!")?;
            writeln!(out, "Confidence: {}%", analysis.confidence_score)?;
            writeln!(out, "Key insights: {} found", analysis.insights.len())?;
            writeln!(out, "Recommendations: {} provided", analysis.recommendations.len())?;
            writeln!(out, "Causal links: {} identified", analysis.causal_relationships.len())?;
            writeln!(out, "Source: {}", result.metadata.source)?;
        } else {
            writeln!(out, "Analysis failed for {domain}")?;
        }
        writeln!(out, "{}", "-".repeat(60))?;
    }

    writeln!(out, "Comprehensive test completed!")?;
    writeln!(out, "\nQuick start commands:")?;
    writeln!(out, "1. Start backend: cd backend && npm start")?;
    writeln!(out, "2. Install models: ollama pull llama3.1:8b (runtime at {})", client.config().ollama_url)?;
    writeln!(out, "3. Test again: domain-insight")?;
    Ok(())
}

/// Interactive loop: pick a domain, type a query, optionally attach a
/// file. Results are printed as indented JSON.
pub fn interactive_menu<S: ProgressSink>(client: &AnalysisClient<S>, out: &mut dyn Write) -> Result<()> {
    let names: Vec<&str> = Domain::ALL.iter().map(|d| d.as_str()).collect();
    loop {
        // `Select` shows a keyboard-navigable list in the terminal.
        let selection = Select::new()
            .with_prompt("Domain")
            .items(&names)
            .default(0)
            .interact()?;
        let domain = Domain::ALL[selection];

        let query: String = Input::new().with_prompt("Query").interact_text()?;
        let input_type: String = Input::new()
            .with_prompt("Input type")
            .default(DEFAULT_INPUT_TYPE.to_string())
            .interact_text()?;
        let file: String = Input::new()
            .with_prompt("File to attach (empty for none)")
            .allow_empty(true)
            .interact_text()?;
        let file = Some(file.trim())
            .filter(|f| !f.is_empty())
            .map(PathBuf::from);

        let result = with_spinner(client.sink(), "Analyzing...", || {
            client.analyze_domain(domain.as_str(), &query, &input_type, file.as_deref())
        });
        let json = serde_json::to_string_pretty(&result).context("Serializing analysis result")?;
        writeln!(out, "{json}")?;

        if !Confirm::new()
            .with_prompt("Analyze another query?")
            .default(true)
            .interact()?
        {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::progress::{NullSink, ProgressEvent};
    use std::cell::Cell;

    #[derive(Default)]
    struct SpinnerAware {
        attached: Cell<bool>,
        detached: Cell<bool>,
    }

    impl ProgressSink for SpinnerAware {
        fn emit(&self, _event: ProgressEvent) {}

        fn attach_spinner(&self, _bar: &ProgressBar) {
            self.attached.set(true);
        }

        fn detach_spinner(&self) {
            self.detached.set(true);
        }
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn spinner_is_attached_only_while_work_runs() {
        let sink = SpinnerAware::default();
        let seen = with_spinner(&sink, "Working...", || {
            (sink.attached.get(), sink.detached.get())
        });
        assert_eq!(seen, (true, false));
        assert!(sink.detached.get());
    }

    #[test]
    fn demo_completes_when_output_is_closed() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .and_then(|l| l.local_addr())
            .unwrap()
            .port();
        let config = ClientConfig::default().with_backend_url(format!("http://127.0.0.1:{port}"));
        let client = AnalysisClient::new(config, NullSink).unwrap();
        run_demo(&client, &mut ClosedPipe);
    }

    #[test]
    fn every_domain_has_a_demo_query() {
        for d in Domain::ALL {
            assert!(!demo_query(d).is_empty());
        }
    }
}
