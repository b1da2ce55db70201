// Static analyses served when the backend cannot answer. The table is
// compiled in and never mutated.

use crate::domain::Domain;
use crate::normalize::RelationKind;
use crate::normalize::RelationKind::{Negative, Positive};
use serde_json::{json, Value};

pub const FALLBACK_NOTE: &str = "Local AI unavailable - using intelligent fallback responses";
pub const FALLBACK_SOURCE: &str = "fallback_data";
pub const QUERY_LIMIT: usize = 100;

pub struct FallbackLink {
    pub source: &'static str,
    pub target: &'static str,
    pub strength: f64,
    pub kind: RelationKind,
}

pub struct FallbackEntry {
    pub insights: &'static [&'static str],
    pub recommendations: &'static [&'static str],
    pub causal_relationships: &'static [FallbackLink],
    pub confidence: u8,
}

const fn link(source: &'static str, target: &'static str, strength: f64, kind: RelationKind) -> FallbackLink {
    FallbackLink { source, target, strength, kind }
}

static AGRICULTURE: FallbackEntry = FallbackEntry {
    insights: &[
        "Soil moisture at 45% indicates adequate hydration for most crops",
        "Upcoming rainfall may reduce irrigation needs by 30-40%",
        "Current conditions favor vegetative growth phase",
    ],
    recommendations: &[
        "Reduce irrigation schedule by 50% over next 3-5 days",
        "Monitor drainage systems to prevent waterlogging",
        "Apply nitrogen fertilizer before heavy rainfall",
    ],
    causal_relationships: &[
        link("rainfall", "soil_moisture", 0.9, Positive),
        link("soil_moisture", "crop_health", 0.8, Positive),
    ],
    confidence: 75,
};

static HEALTH: FallbackEntry = FallbackEntry {
    insights: &[
        "Heart rate of 95 bpm is slightly elevated for resting state",
        "Sleep issues may be contributing to cardiovascular stress",
        "Correlation between sleep quality and heart rate variability detected",
    ],
    recommendations: &[
        "Implement relaxation techniques before bedtime",
        "Monitor caffeine intake, especially after 2 PM",
        "Consider sleep hygiene improvements and consistent schedule",
    ],
    causal_relationships: &[
        link("sleep_quality", "heart_rate", 0.7, Negative),
        link("stress", "sleep_quality", 0.8, Negative),
    ],
    confidence: 82,
};

static FINANCE: FallbackEntry = FallbackEntry {
    insights: &[
        "Portfolio shows balanced risk-return profile",
        "Market volatility within acceptable parameters",
        "Diversification strategy appears effective",
    ],
    recommendations: &[
        "Consider rebalancing if any asset exceeds 25% allocation",
        "Monitor emerging market exposure for opportunities",
        "Review expense ratios quarterly for cost optimization",
    ],
    causal_relationships: &[
        link("diversification", "risk_reduction", 0.8, Positive),
        link("market_volatility", "portfolio_risk", 0.6, Positive),
    ],
    confidence: 78,
};

static EDUCATION: FallbackEntry = FallbackEntry {
    insights: &[
        "Learning progress shows strong conceptual understanding with application gaps",
        "Engagement metrics indicate high motivation but inconsistent study patterns",
        "Knowledge retention rates are above average for visual learning materials",
    ],
    recommendations: &[
        "Implement spaced repetition system for better long-term retention",
        "Focus on practical applications and project-based learning",
        "Establish consistent daily study schedule with 25-minute focused sessions",
    ],
    causal_relationships: &[
        link("study_consistency", "knowledge_retention", 0.8, Positive),
        link("practical_application", "concept_mastery", 0.85, Positive),
        link("visual_materials", "engagement", 0.75, Positive),
    ],
    confidence: 77,
};

static TRANSPORT: FallbackEntry = FallbackEntry {
    insights: &[
        "Current route optimization shows potential 15-20% time savings during peak hours",
        "Traffic pattern analysis reveals consistent bottlenecks at 3 key intersections",
        "Fuel efficiency metrics indicate room for improvement through driving behavior changes",
    ],
    recommendations: &[
        "Utilize alternative routes during 7-9 AM and 5-7 PM periods",
        "Implement eco-driving techniques to improve fuel efficiency by 10-15%",
        "Consider public transport integration for high-congestion corridors",
    ],
    causal_relationships: &[
        link("traffic_congestion", "travel_time", 0.9, Positive),
        link("route_optimization", "fuel_consumption", 0.7, Negative),
        link("driving_behavior", "safety_score", 0.8, Positive),
    ],
    confidence: 81,
};

static UNIVERSAL: FallbackEntry = FallbackEntry {
    insights: &[
        "Cross-domain analysis reveals interconnected optimization opportunities",
        "Data correlation shows health metrics improve with better time management",
        "Financial and environmental goals align through sustainable choices",
    ],
    recommendations: &[
        "Develop integrated dashboard for holistic life optimization",
        "Focus on keystone habits that positively impact multiple domains",
        "Implement decision framework considering multi-domain consequences",
    ],
    causal_relationships: &[
        link("time_management", "health_metrics", 0.7, Positive),
        link("sustainable_choices", "financial_savings", 0.6, Positive),
        link("holistic_planning", "goal_achievement", 0.85, Positive),
    ],
    confidence: 76,
};

impl FallbackEntry {
    pub fn for_domain(domain: Domain) -> &'static FallbackEntry {
        match domain {
            Domain::Agriculture => &AGRICULTURE,
            Domain::Health => &HEALTH,
            Domain::Finance => &FINANCE,
            Domain::Education => &EDUCATION,
            Domain::Transport => &TRANSPORT,
            Domain::Universal => &UNIVERSAL,
        }
    }

    /// Entry for an arbitrary domain name. Only exact names match; anything
    /// else, including other casings, gets the agriculture entry.
    pub fn lookup(domain: &str) -> &'static FallbackEntry {
        Self::for_domain(Domain::parse(domain).unwrap_or(Domain::Agriculture))
    }

    fn to_value(&self) -> Value {
        let links: Vec<Value> = self
            .causal_relationships
            .iter()
            .map(|l| {
                json!({
                    "source": l.source,
                    "target": l.target,
                    "strength": l.strength,
                    "type": l.kind,
                })
            })
            .collect();
        json!({
            "insights": self.insights,
            "recommendations": self.recommendations,
            "causalRelationships": links,
            "confidence": self.confidence,
        })
    }
}

/// First `QUERY_LIMIT` characters of `query`, without any marker.
pub fn truncate_query(query: &str) -> String {
    query.chars().take(QUERY_LIMIT).collect()
}

/// Display form of a query: truncated, with "..." appended only when
/// something was cut.
pub fn preview_query(query: &str) -> String {
    let mut preview = truncate_query(query);
    if query.chars().count() > QUERY_LIMIT {
        preview.push_str("...");
    }
    preview
}

/// Fallback entry for `domain` merged with request details. The requested
/// domain name is kept even when the entry is the agriculture default.
pub fn fallback_payload(domain: &str, query: &str) -> Value {
    let mut payload = FallbackEntry::lookup(domain).to_value();
    if let Value::Object(map) = &mut payload {
        map.insert("domain".into(), Value::from(domain));
        map.insert("queryProcessed".into(), Value::from(truncate_query(query)));
        map.insert("source".into(), Value::from(FALLBACK_SOURCE));
        map.insert("note".into(), Value::from(FALLBACK_NOTE));
    }
    payload
}
