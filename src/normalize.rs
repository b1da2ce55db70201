// Response normalization.
//
// Live backend payloads and fallback entries arrive in slightly different
// shapes (camelCase or snake_case keys, missing fields, integer or float
// confidences). `format_response` maps any of them into the single
// `AnalysisResult` contract. It performs no IO; the only ambient input
// is the wall clock used for the timestamp, and `format_response_at`
// takes that explicitly.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Where an analysis came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    LocalAi,
    Fallback,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::LocalAi => "local_ai",
            Source::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Positive,
    Negative,
}

/// A directed causal link between two factors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CausalRelationship {
    pub source: String,
    pub target: String,
    pub strength: f64,
    #[serde(rename = "type")]
    pub kind: RelationKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub causal_relationships: Vec<CausalRelationship>,
    pub risk_factors: Vec<String>,
    pub confidence_score: u8,
    pub data_quality: String,
    pub next_steps: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub source: Source,
    pub timestamp: String,
    pub model_used: String,
    pub processing_time: String,
}

/// Unified output of every analysis, live or fallback.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub success: bool,
    pub domain: String,
    pub analysis: Analysis,
    pub metadata: Metadata,
    pub raw_data: Value,
}

/// Values used for any field the source payload does not provide.
pub mod defaults {
    pub const DOMAIN: &str = "unknown";
    pub const CONFIDENCE: u8 = 70;
    pub const DATA_QUALITY: &str = "medium";
    pub const MODEL_USED: &str = "fallback";
    pub const PROCESSING_TIME: &str = "< 1s";
}

/// Optional-field view of a source payload. Each field is `Some` only when
/// the payload carries it under one of the accepted key spellings with a
/// usable type.
#[derive(Debug, Default, PartialEq)]
pub struct SourceFields {
    pub domain: Option<String>,
    pub insights: Option<Vec<String>>,
    pub recommendations: Option<Vec<String>>,
    pub causal_relationships: Option<Vec<CausalRelationship>>,
    pub risk_factors: Option<Vec<String>>,
    pub confidence_score: Option<u8>,
    pub confidence: Option<u8>,
    pub data_quality: Option<String>,
    pub next_steps: Option<Vec<String>>,
    pub model_used: Option<String>,
    pub processing_time: Option<String>,
}

impl SourceFields {
    pub fn read(data: &Value) -> Self {
        let Some(obj) = data.as_object() else {
            return SourceFields::default();
        };
        SourceFields {
            domain: field(obj, &["domain"]),
            insights: field(obj, &["insights"]),
            recommendations: field(obj, &["recommendations"]),
            causal_relationships: relationships(obj),
            risk_factors: field(obj, &["riskFactors", "risk_factors"]),
            confidence_score: percentage(obj, &["confidenceScore", "confidence_score"]),
            confidence: percentage(obj, &["confidence"]),
            data_quality: field(obj, &["dataQuality", "data_quality"]),
            next_steps: field(obj, &["nextSteps", "next_steps"]),
            model_used: field(obj, &["modelUsed", "model_used"]),
            processing_time: field(obj, &["processingTime", "processing_time"]),
        }
    }
}

/// First key in `names` whose value deserializes into `T`.
fn field<T: DeserializeOwned>(obj: &Map<String, Value>, names: &[&str]) -> Option<T> {
    names
        .iter()
        .filter_map(|name| obj.get(*name))
        .find_map(|value| T::deserialize(value).ok())
}

fn percentage(obj: &Map<String, Value>, names: &[&str]) -> Option<u8> {
    let raw: f64 = field(obj, names)?;
    if !raw.is_finite() {
        return None;
    }
    Some(raw.round().clamp(0.0, 100.0) as u8)
}

// Malformed entries are dropped rather than discarding the whole list.
fn relationships(obj: &Map<String, Value>) -> Option<Vec<CausalRelationship>> {
    let items = ["causalRelationships", "causal_relationships"]
        .iter()
        .filter_map(|name| obj.get(*name))
        .find_map(Value::as_array)?;
    Some(
        items
            .iter()
            .filter_map(|item| CausalRelationship::deserialize(item).ok())
            .collect(),
    )
}

/// Normalize `data` stamped with the current local time.
pub fn format_response(data: Value, source: Source) -> AnalysisResult {
    let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
    format_response_at(data, source, timestamp)
}

pub fn format_response_at(data: Value, source: Source, timestamp: String) -> AnalysisResult {
    let fields = SourceFields::read(&data);
    AnalysisResult {
        success: true,
        domain: fields.domain.unwrap_or_else(|| defaults::DOMAIN.to_string()),
        analysis: Analysis {
            insights: fields.insights.unwrap_or_default(),
            recommendations: fields.recommendations.unwrap_or_default(),
            causal_relationships: fields.causal_relationships.unwrap_or_default(),
            risk_factors: fields.risk_factors.unwrap_or_default(),
            confidence_score: fields
                .confidence_score
                .or(fields.confidence)
                .unwrap_or(defaults::CONFIDENCE),
            data_quality: fields
                .data_quality
                .unwrap_or_else(|| defaults::DATA_QUALITY.to_string()),
            next_steps: fields.next_steps.unwrap_or_default(),
        },
        metadata: Metadata {
            source,
            timestamp,
            model_used: fields
                .model_used
                .unwrap_or_else(|| defaults::MODEL_USED.to_string()),
            processing_time: fields
                .processing_time
                .unwrap_or_else(|| defaults::PROCESSING_TIME.to_string()),
        },
        raw_data: data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixed(data: Value, source: Source) -> AnalysisResult {
        format_response_at(data, source, "2024-01-01 00:00:00".to_string())
    }

    #[test]
    fn empty_payload_gets_every_default() {
        let result = fixed(json!({}), Source::LocalAi);
        assert!(result.success);
        assert_eq!(result.domain, "unknown");
        assert!(result.analysis.insights.is_empty());
        assert!(result.analysis.recommendations.is_empty());
        assert!(result.analysis.causal_relationships.is_empty());
        assert!(result.analysis.risk_factors.is_empty());
        assert!(result.analysis.next_steps.is_empty());
        assert_eq!(result.analysis.confidence_score, 70);
        assert_eq!(result.analysis.data_quality, "medium");
        assert_eq!(result.metadata.model_used, "fallback");
        assert_eq!(result.metadata.processing_time, "< 1s");
        assert_eq!(result.raw_data, json!({}));
    }

    #[test]
    fn snake_case_backend_payload_is_read() {
        let data = json!({
            "domain": "finance",
            "insights": ["a"],
            "causal_relationships": [
                {"source": "x", "target": "y", "strength": 0.4, "type": "negative"}
            ],
            "risk_factors": ["inflation"],
            "confidence_score": 91,
            "data_quality": "high",
            "next_steps": ["review"],
            "model_used": "llama3.1:8b",
            "processing_time": "2.3s"
        });
        let result = fixed(data.clone(), Source::LocalAi);
        assert_eq!(result.domain, "finance");
        assert_eq!(result.analysis.risk_factors, vec!["inflation"]);
        assert_eq!(result.analysis.confidence_score, 91);
        assert_eq!(result.analysis.data_quality, "high");
        assert_eq!(result.analysis.causal_relationships[0].kind, RelationKind::Negative);
        assert_eq!(result.metadata.model_used, "llama3.1:8b");
        assert_eq!(result.metadata.processing_time, "2.3s");
        assert_eq!(result.metadata.source, Source::LocalAi);
        assert_eq!(result.raw_data, data);
    }

    #[test]
    fn confidence_score_wins_over_confidence() {
        let result = fixed(json!({"confidence": 40, "confidenceScore": 88}), Source::Fallback);
        assert_eq!(result.analysis.confidence_score, 88);

        let result = fixed(json!({"confidence": 40}), Source::Fallback);
        assert_eq!(result.analysis.confidence_score, 40);
    }

    #[test]
    fn confidence_is_rounded_and_clamped() {
        assert_eq!(fixed(json!({"confidence": 84.6}), Source::LocalAi).analysis.confidence_score, 85);
        assert_eq!(fixed(json!({"confidence": 140}), Source::LocalAi).analysis.confidence_score, 100);
        assert_eq!(fixed(json!({"confidence": -3}), Source::LocalAi).analysis.confidence_score, 0);
        assert_eq!(fixed(json!({"confidence": "high"}), Source::LocalAi).analysis.confidence_score, 70);
    }

    #[test]
    fn wrongly_typed_fields_fall_back_to_defaults() {
        let result = fixed(
            json!({"insights": "not a list", "dataQuality": 3, "domain": null}),
            Source::LocalAi,
        );
        assert!(result.analysis.insights.is_empty());
        assert_eq!(result.analysis.data_quality, "medium");
        assert_eq!(result.domain, "unknown");
    }

    #[test]
    fn malformed_relationships_are_skipped() {
        let result = fixed(
            json!({"causalRelationships": [
                {"source": "rain", "target": "soil", "strength": 0.9, "type": "positive"},
                {"source": "rain"},
                {"source": "a", "target": "b", "strength": 0.1, "type": "sideways"}
            ]}),
            Source::LocalAi,
        );
        assert_eq!(result.analysis.causal_relationships.len(), 1);
        assert_eq!(result.analysis.causal_relationships[0].source, "rain");
    }

    #[test]
    fn non_object_payload_is_kept_as_raw_data() {
        let result = fixed(json!("plain text answer"), Source::LocalAi);
        assert_eq!(result.domain, "unknown");
        assert_eq!(result.raw_data, json!("plain text answer"));
    }

    #[test]
    fn formatting_its_own_analysis_is_stable() {
        let first = fixed(
            json!({
                "insights": ["i1", "i2"],
                "recommendations": ["r1"],
                "causal_relationships": [
                    {"source": "s", "target": "t", "strength": 0.5, "type": "positive"}
                ],
                "confidence": 64
            }),
            Source::Fallback,
        );
        let replay = serde_json::to_value(&first.analysis).unwrap();
        let second = fixed(replay, Source::Fallback);
        assert_eq!(first.analysis, second.analysis);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let value = serde_json::to_value(fixed(json!({"domain": "health"}), Source::Fallback)).unwrap();
        assert_eq!(value["metadata"]["source"], "fallback");
        assert!(value["analysis"].get("confidenceScore").is_some());
        assert!(value["analysis"].get("causalRelationships").is_some());
        assert!(value.get("rawData").is_some());
    }

    #[test]
    fn current_time_stamp_has_expected_shape() {
        let result = format_response(json!({}), Source::LocalAi);
        let stamp = &result.metadata.timestamp;
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).is_ok());
    }
}
