// API client module: a small blocking HTTP client that talks to the local
// AI backend. Every public operation returns a well formed report; backend
// failures during analysis are replaced by static fallback data.

use crate::config::ClientConfig;
use crate::error::{BackendError, BackendResult};
use crate::fallback::{fallback_payload, preview_query};
use crate::normalize::{format_response, AnalysisResult, Source};
use crate::progress::{ProgressEvent, ProgressSink, TerminalSink};
use anyhow::{Context, Result};
use reqwest::blocking::{multipart, Client, Response};
use reqwest::StatusCode;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const HEALTH_PATH: &str = "/api/health";
pub const ANALYZE_PATH: &str = "/api/analyze";
pub const MULTIMODAL_PATH: &str = "/api/analyze/multimodal";
pub const MODELS_PATH: &str = "/api/models";

pub const DEFAULT_INPUT_TYPE: &str = "text";
pub const BACKEND_DOWN_MESSAGE: &str = "Backend not available. Start with: cd backend && npm start";
pub const INSTALL_INSTRUCTIONS: &str = "Run 'ollama pull llama3.1:8b' to install the main model";

/// Body of both analysis endpoints. `input_type` is passed through as is.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest<'a> {
    pub domain: &'a str,
    pub query: &'a str,
    pub input_type: &'a str,
}

/// Outcome of a health check.
#[derive(Clone, Debug, PartialEq)]
pub enum HealthReport {
    /// The backend answered 200; its body is kept verbatim.
    Reported(Value),
    /// The backend answered with another status.
    Unhealthy { error: String },
    /// No answer at all.
    Unavailable { error: String },
}

impl HealthReport {
    pub fn status(&self) -> &str {
        match self {
            HealthReport::Reported(body) => body
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
            HealthReport::Unhealthy { .. } => "unhealthy",
            HealthReport::Unavailable { .. } => "unavailable",
        }
    }

    /// True when the health check got no answer, or the backend itself reports
    /// `"status": "unavailable"`.
    pub fn is_unavailable(&self) -> bool {
        self.status() == "unavailable"
    }

    pub fn ollama_running(&self) -> bool {
        match self {
            HealthReport::Reported(body) => body.get("ollama").and_then(Value::as_str) == Some("running"),
            _ => false,
        }
    }

    pub fn models(&self) -> Value {
        match self {
            HealthReport::Reported(body) => body.get("models").cloned().unwrap_or_else(|| json!([])),
            _ => json!([]),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            HealthReport::Reported(body) => body.clone(),
            HealthReport::Unhealthy { error } | HealthReport::Unavailable { error } => {
                json!({ "status": self.status(), "error": error })
            }
        }
    }
}

impl Serialize for HealthReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Result of `install_models`. Only the fields relevant to the outcome are
/// serialized.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InstallReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installed: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InstallReport {
    fn listed(installed: Value, recommended: Value) -> Self {
        InstallReport {
            success: true,
            installed: Some(installed),
            recommended: Some(recommended),
            instructions: Some(INSTALL_INSTRUCTIONS.to_string()),
            message: None,
            error: None,
        }
    }

    fn backend_down() -> Self {
        InstallReport {
            success: false,
            installed: None,
            recommended: None,
            instructions: None,
            message: Some(BACKEND_DOWN_MESSAGE.to_string()),
            error: None,
        }
    }

    fn failed(error: &BackendError) -> Self {
        InstallReport {
            success: false,
            installed: None,
            recommended: None,
            instructions: None,
            message: None,
            error: Some(error.to_string()),
        }
    }
}

/// Blocking client for the analysis backend. Progress is reported through
/// the sink `S`; the client never prints.
pub struct AnalysisClient<S = TerminalSink> {
    client: Client,
    config: ClientConfig,
    sink: S,
}

impl<S: ProgressSink> AnalysisClient<S> {
    pub fn new(config: ClientConfig, sink: S) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(AnalysisClient { client, config, sink })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Query `/api/health`. Never fails: transport problems become
    /// `Unavailable`, anything else unexpected becomes `Unhealthy`.
    pub fn check_health(&self) -> HealthReport {
        match self.get_json(HEALTH_PATH, self.config.health_timeout) {
            Ok(body) => HealthReport::Reported(body),
            Err(err) if err.is_transport() => {
                debug!(error = %err, "health check got no answer");
                HealthReport::Unavailable { error: err.to_string() }
            }
            Err(BackendError::Decode(detail)) => HealthReport::Unhealthy {
                error: format!("invalid health payload: {detail}"),
            },
            Err(err) => HealthReport::Unhealthy { error: err.to_string() },
        }
    }

    /// `analyze_domain` with a plain text query and no attachment.
    pub fn analyze(&self, domain: &str, query: &str) -> AnalysisResult {
        self.analyze_domain(domain, query, DEFAULT_INPUT_TYPE, None)
    }

    /// Ask the backend to analyze `query` for `domain`. When `file_path`
    /// names an existing file it is uploaded to the multimodal endpoint;
    /// otherwise the query goes out as JSON. Any failure yields the
    /// domain's fallback analysis.
    pub fn analyze_domain(
        &self,
        domain: &str,
        query: &str,
        input_type: &str,
        file_path: Option<&Path>,
    ) -> AnalysisResult {
        self.sink.emit(ProgressEvent::AnalysisStarted {
            domain: domain.to_string(),
        });
        self.sink.emit(ProgressEvent::QueryPreview {
            preview: preview_query(query),
        });

        let request = AnalyzeRequest {
            domain,
            query,
            input_type,
        };
        match self.request_analysis(&request, file_path) {
            Ok(data) => {
                self.sink.emit(ProgressEvent::LocalAiCompleted);
                format_response(data, Source::LocalAi)
            }
            Err(err) => {
                debug!(domain, error = %err, "analysis request failed, serving fallback");
                self.sink.emit(match &err {
                    BackendError::Status(status) => ProgressEvent::BackendStatus { status: *status },
                    BackendError::Rejected(_) => ProgressEvent::BackendRejected,
                    other => ProgressEvent::ConnectionFailed {
                        error: other.to_string(),
                    },
                });
                self.fallback_response(domain, query)
            }
        }
    }

    /// Static analysis for `domain`, normalized like a live answer.
    pub fn fallback_response(&self, domain: &str, query: &str) -> AnalysisResult {
        format_response(fallback_payload(domain, query), Source::Fallback)
    }

    /// Report installed and recommended models. Skips the listing call when
    /// the health check could not reach the backend.
    pub fn install_models(&self) -> InstallReport {
        self.sink.emit(ProgressEvent::InstallStarted);

        let health = self.check_health();
        if health.is_unavailable() {
            return InstallReport::backend_down();
        }

        match self.get_json(MODELS_PATH, self.config.models_timeout) {
            Ok(Value::Object(body)) => {
                let installed = body.get("installed").cloned().unwrap_or_else(|| json!([]));
                let recommended = body.get("recommended").cloned().unwrap_or_else(|| json!({}));
                self.sink.emit(ProgressEvent::ModelsListed {
                    installed: installed.clone(),
                    recommended: recommended.clone(),
                });
                InstallReport::listed(installed, recommended)
            }
            Ok(other) => InstallReport::failed(&BackendError::Decode(format!(
                "expected a JSON object, got {other}"
            ))),
            Err(err) => {
                debug!(error = %err, "model listing failed");
                InstallReport::failed(&err)
            }
        }
    }

    fn request_analysis(&self, request: &AnalyzeRequest<'_>, file_path: Option<&Path>) -> BackendResult<Value> {
        let res = self.send_analysis(request, file_path)?;
        let body = Self::expect_json(res)?;
        if !is_truthy(body.get("success")) {
            let detail = body.get("error").and_then(Value::as_str).map(str::to_string);
            return Err(BackendError::Rejected(detail));
        }
        Ok(body.get("data").cloned().unwrap_or_else(|| json!({})))
    }

    fn send_analysis(&self, request: &AnalyzeRequest<'_>, file_path: Option<&Path>) -> BackendResult<Response> {
        let timeout = self.config.analyze_timeout;
        match file_path.filter(|p| p.is_file()) {
            Some(path) => {
                let url = self.config.endpoint(MULTIMODAL_PATH);
                debug!(%url, file = %path.display(), "sending multimodal analysis");
                let bytes = std::fs::read(path)?;
                let file_name = path
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or("upload")
                    .to_string();
                let part = multipart::Part::bytes(bytes).file_name(file_name);
                let form = multipart::Form::new()
                    .text("domain", request.domain.to_string())
                    .text("query", request.query.to_string())
                    .text("inputType", request.input_type.to_string())
                    .part("file", part);
                Ok(self.client.post(&url).multipart(form).timeout(timeout).send()?)
            }
            None => {
                let url = self.config.endpoint(ANALYZE_PATH);
                debug!(%url, "sending analysis");
                Ok(self.client.post(&url).json(request).timeout(timeout).send()?)
            }
        }
    }

    fn get_json(&self, path: &str, timeout: Duration) -> BackendResult<Value> {
        let url = self.config.endpoint(path);
        debug!(%url, "GET");
        let res = self.client.get(&url).timeout(timeout).send()?;
        Self::expect_json(res)
    }

    // Only 200 counts as success, matching the backend contract.
    fn expect_json(res: Response) -> BackendResult<Value> {
        let status = res.status();
        if status != StatusCode::OK {
            return Err(BackendError::Status(status.as_u16()));
        }
        res.json::<Value>()
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

/// Loose truthiness of the backend's `success` flag: missing, null, false,
/// zero and empty values all count as failure.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(false, |f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_follows_json_emptiness() {
        assert!(is_truthy(Some(&json!(true))));
        assert!(is_truthy(Some(&json!(1))));
        assert!(is_truthy(Some(&json!("yes"))));
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(!is_truthy(Some(&json!([]))));
    }

    #[test]
    fn health_report_serializes_failure_shape() {
        let report = HealthReport::Unhealthy {
            error: "HTTP 500".into(),
        };
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({"status": "unhealthy", "error": "HTTP 500"})
        );
        let report = HealthReport::Reported(json!({"status": "healthy", "ollama": "running", "models": ["m"]}));
        assert_eq!(report.status(), "healthy");
        assert!(report.ollama_running());
        assert_eq!(report.models(), json!(["m"]));
    }

    #[test]
    fn backend_reported_unavailable_counts_as_unavailable() {
        assert!(HealthReport::Reported(json!({"status": "unavailable"})).is_unavailable());
        assert!(!HealthReport::Reported(json!({"status": "healthy"})).is_unavailable());
        assert!(!HealthReport::Unhealthy { error: "HTTP 500".into() }.is_unavailable());
    }

    #[test]
    fn reported_health_without_status_is_unknown() {
        assert_eq!(HealthReport::Reported(json!({})).status(), "unknown");
    }

    #[test]
    fn request_body_uses_camel_case() {
        let body = serde_json::to_value(AnalyzeRequest {
            domain: "health",
            query: "q",
            input_type: "voice",
        })
        .unwrap();
        assert_eq!(body, json!({"domain": "health", "query": "q", "inputType": "voice"}));
    }

    #[test]
    fn install_failure_carries_only_error() {
        let value = serde_json::to_value(InstallReport::failed(&BackendError::Status(503))).unwrap();
        assert_eq!(value, json!({"success": false, "error": "HTTP 503"}));
        let value = serde_json::to_value(InstallReport::backend_down()).unwrap();
        assert_eq!(value, json!({"success": false, "message": BACKEND_DOWN_MESSAGE}));
    }
}
