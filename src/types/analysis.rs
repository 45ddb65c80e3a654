//! Analysis result types
//!
//! An `AnalysisResult` is computed fresh for every request and never persisted.

use serde::{Deserialize, Serialize};

/// Which backend produced an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// In-process pattern analyzer
    Local,
    /// Out-of-process analysis engine
    External,
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineKind::Local => write!(f, "local"),
            EngineKind::External => write!(f, "external"),
        }
    }
}

/// Derived feeding metrics
///
/// The aliases accept the field names emitted by the legacy Java analyzer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patterns {
    #[serde(default)]
    pub most_common_bird: Option<String>,
    #[serde(default)]
    pub preferred_food: Option<String>,
    #[serde(default)]
    pub average_quantity: f64,
    #[serde(default, alias = "total_feedings")]
    pub record_count: usize,
    #[serde(default, alias = "bird_diversity")]
    pub distinct_bird_count: usize,
    #[serde(default, alias = "food_variety")]
    pub distinct_food_count: usize,
}

/// Backend-independent part of an analysis
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisOutput {
    pub patterns: Patterns,
    pub recommendations: Vec<String>,
    /// Self-reported engine name, if the backend supplied one
    pub engine_name: Option<String>,
}

/// Provenance of an analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineInfo {
    pub kind: EngineKind,
    /// True when an external engine is configured but the local result was served
    pub fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Result of `POST /api/analyze`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub patterns: Patterns,
    pub recommendations: Vec<String>,
    pub engine: EngineInfo,
}

impl AnalysisResult {
    pub fn from_output(output: AnalysisOutput, kind: EngineKind, fallback: bool) -> Self {
        Self {
            patterns: output.patterns,
            recommendations: output.recommendations,
            engine: EngineInfo {
                kind,
                fallback,
                name: output.engine_name,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_accept_legacy_field_names() {
        let json = r#"{
            "most_common_bird": "Robin",
            "preferred_food": "Seeds",
            "average_quantity": 25.0,
            "total_feedings": 3,
            "bird_diversity": 2,
            "food_variety": 2
        }"#;

        let patterns: Patterns = serde_json::from_str(json).unwrap();
        assert_eq!(patterns.most_common_bird.as_deref(), Some("Robin"));
        assert_eq!(patterns.record_count, 3);
        assert_eq!(patterns.distinct_bird_count, 2);
        assert_eq!(patterns.distinct_food_count, 2);
    }

    #[test]
    fn test_engine_kind_serializes_lowercase() {
        let info = EngineInfo {
            kind: EngineKind::External,
            fallback: false,
            name: None,
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["kind"], "external");
        assert!(json.get("name").is_none());
    }
}
