// Progress reporting. The client emits events through `ProgressSink`
// instead of printing, so it can run headless in tests.

use crossterm::style::Stylize;
use indicatif::ProgressBar;
use serde_json::Value;
use std::cell::RefCell;
use std::io::Write;

#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    AnalysisStarted { domain: String },
    QueryPreview { preview: String },
    LocalAiCompleted,
    BackendRejected,
    BackendStatus { status: u16 },
    ConnectionFailed { error: String },
    InstallStarted,
    ModelsListed { installed: Value, recommended: Value },
}

pub trait ProgressSink {
    fn emit(&self, event: ProgressEvent);

    /// Called while `bar` is ticking on the terminal. Sinks that write to
    /// the same stream must clear it around their own output.
    fn attach_spinner(&self, _bar: &ProgressBar) {}

    fn detach_spinner(&self) {}
}

impl<S: ProgressSink + ?Sized> ProgressSink for &S {
    fn emit(&self, event: ProgressEvent) {
        (**self).emit(event)
    }

    fn attach_spinner(&self, bar: &ProgressBar) {
        (**self).attach_spinner(bar)
    }

    fn detach_spinner(&self) {
        (**self).detach_spinner()
    }
}

/// Drops every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: ProgressEvent) {}
}

/// Human readable lines on stderr, coloured by outcome. Stdout is left
/// for JSON output.
#[derive(Debug, Default)]
pub struct TerminalSink {
    spinner: RefCell<Option<ProgressBar>>,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn write_line(line: &str) {
        let mut stderr = std::io::stderr().lock();
        // A closed stderr is not worth failing an analysis over.
        let _ = writeln!(stderr, "{line}");
    }

    fn line(event: &ProgressEvent) -> String {
        match event {
            ProgressEvent::AnalysisStarted { domain } => {
                format!("Analyzing {} query...", domain.to_uppercase())
                    .cyan()
                    .to_string()
            }
            ProgressEvent::QueryPreview { preview } => format!("Query: {preview}"),
            ProgressEvent::LocalAiCompleted => {
                "Analysis completed using local AI".green().to_string()
            }
            ProgressEvent::BackendRejected => "AI backend returned error, using fallback"
                .yellow()
                .to_string(),
            ProgressEvent::BackendStatus { status } => {
                format!("Backend error: {status}").red().to_string()
            }
            ProgressEvent::ConnectionFailed { error } => {
                format!("Backend connection failed: {error}").red().to_string()
            }
            ProgressEvent::InstallStarted => "Starting model installation...".cyan().to_string(),
            ProgressEvent::ModelsListed {
                installed,
                recommended,
            } => format!("Current models: {installed}\nRecommended models: {recommended}"),
        }
    }
}

impl ProgressSink for TerminalSink {
    fn emit(&self, event: ProgressEvent) {
        let line = Self::line(&event);
        match self.spinner.borrow().as_ref() {
            // Clear the spinner row, print, then let it redraw below.
            Some(bar) => bar.suspend(|| Self::write_line(&line)),
            None => Self::write_line(&line),
        }
    }

    fn attach_spinner(&self, bar: &ProgressBar) {
        *self.spinner.borrow_mut() = Some(bar.clone());
    }

    fn detach_spinner(&self) {
        self.spinner.borrow_mut().take();
    }
}

/// Keeps events in memory; used by tests to assert on what the client
/// reported.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: RefCell<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.borrow().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: ProgressEvent) {
        self.events.borrow_mut().push(event);
    }
}
