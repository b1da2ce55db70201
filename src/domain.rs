// Analysis domains known to the CLI and the backend.

use std::fmt;

/// One of the six analysis categories. Requests may still name an
/// arbitrary domain string; this enum only covers the ones the CLI
/// advertises and has fallback data for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Domain {
    Agriculture,
    Health,
    Finance,
    Education,
    Transport,
    Universal,
}

impl Domain {
    pub const ALL: [Domain; 6] = [
        Domain::Agriculture,
        Domain::Health,
        Domain::Finance,
        Domain::Education,
        Domain::Transport,
        Domain::Universal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Agriculture => "agriculture",
            Domain::Health => "health",
            Domain::Finance => "finance",
            Domain::Education => "education",
            Domain::Transport => "transport",
            Domain::Universal => "universal",
        }
    }

    /// Exact, case-sensitive lookup. `"Health"` or `" health "` are not
    /// known domains and get `None`, like any other unmapped name.
    pub fn parse(name: &str) -> Option<Domain> {
        Domain::ALL.into_iter().find(|d| d.as_str() == name)
    }

    /// Model the backend is expected to run for this domain.
    pub fn default_model(&self) -> &'static str {
        match self {
            Domain::Health | Domain::Education => "mistral:7b",
            _ => "llama3.1:8b",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comma separated list used in usage text.
pub fn domain_list() -> String {
    Domain::ALL
        .iter()
        .map(|d| d.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
