// Client configuration. Defaults point at a backend and Ollama runtime
// on localhost; both addresses can be overridden from the environment
// or from command line flags.

use crate::domain::Domain;
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3001";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

pub const BACKEND_URL_ENV: &str = "AI_BACKEND_URL";
pub const OLLAMA_URL_ENV: &str = "OLLAMA_URL";

/// Immutable settings handed to `AnalysisClient` at construction.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub backend_url: String,
    /// Only shown in instructional text; the client never calls it.
    pub ollama_url: String,
    pub models: BTreeMap<Domain, String>,
    pub health_timeout: Duration,
    pub analyze_timeout: Duration,
    pub models_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            models: Domain::ALL
                .iter()
                .map(|d| (*d, d.default_model().to_string()))
                .collect(),
            health_timeout: Duration::from_secs(5),
            analyze_timeout: Duration::from_secs(30),
            models_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Defaults, with `AI_BACKEND_URL` / `OLLAMA_URL` applied when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = ClientConfig::default();
        if let Some(url) = lookup(BACKEND_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config.backend_url = url;
        }
        if let Some(url) = lookup(OLLAMA_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config.ollama_url = url;
        }
        config.normalized()
    }

    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self.normalized()
    }

    pub fn with_ollama_url(mut self, url: impl Into<String>) -> Self {
        self.ollama_url = url.into();
        self.normalized()
    }

    /// Model configured for `domain`, or the agriculture model for any name
    /// that is not an exact domain name.
    pub fn model_for(&self, domain: &str) -> &str {
        let domain = Domain::parse(domain).unwrap_or(Domain::Agriculture);
        self.models
            .get(&domain)
            .map(String::as_str)
            .unwrap_or_else(|| domain.default_model())
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.backend_url, path)
    }

    fn normalized(mut self) -> Self {
        let trimmed = self.backend_url.trim().trim_end_matches('/').to_string();
        self.backend_url = trimmed;
        let trimmed = self.ollama_url.trim().trim_end_matches('/').to_string();
        self.ollama_url = trimmed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_local_services() {
        let config = ClientConfig::default();
        assert_eq!(config.backend_url, "http://localhost:3001");
        assert_eq!(config.ollama_url, "http://localhost:11434");
        assert_eq!(config.health_timeout, Duration::from_secs(5));
        assert_eq!(config.analyze_timeout, Duration::from_secs(30));
        assert_eq!(config.models_timeout, Duration::from_secs(10));
        assert_eq!(config.model_for("health"), "mistral:7b");
        assert_eq!(config.model_for("finance"), "llama3.1:8b");
    }

    #[test]
    fn environment_overrides_urls() {
        let config = ClientConfig::from_lookup(|key| match key {
            BACKEND_URL_ENV => Some("http://10.0.0.5:4000/".to_string()),
            OLLAMA_URL_ENV => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.backend_url, "http://10.0.0.5:4000");
        assert_eq!(config.ollama_url, DEFAULT_OLLAMA_URL);
        assert_eq!(config.endpoint("/api/health"), "http://10.0.0.5:4000/api/health");
    }

    #[test]
    fn unknown_domain_uses_agriculture_model() {
        let mut config = ClientConfig::default();
        config
            .models
            .insert(Domain::Agriculture, "phi3:mini".to_string());
        assert_eq!(config.model_for("weather"), "phi3:mini");
        assert_eq!(config.model_for("HEALTH"), "phi3:mini");
    }
}
