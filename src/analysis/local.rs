//! In-process pattern analyzer
//!
//! This is the baseline every external engine result is compared against,
//! so the rules and their order are fixed.

use async_trait::async_trait;

use super::AnalysisBackend;
use crate::error::AnalysisEngineError;
use crate::stats::{average_quantity, Tally};
use crate::types::{AnalysisOutput, EngineKind, FeedingRecord, Patterns};

pub const VARIETY_RECOMMENDATION: &str =
    "Consider adding more food variety to attract different bird species";
pub const WASTE_RECOMMENDATION: &str = "Average quantity is high - monitor feeders for waste";
pub const ROBIN_RECOMMENDATION: &str =
    "Robins prefer worms and berries - consider adding these options";

/// Fewer distinct species than this triggers the variety advice
const MIN_BIRD_DIVERSITY: usize = 3;
/// Average quantities above this trigger the waste advice
const WASTE_THRESHOLD: f64 = 50.0;

/// Derive patterns and recommendations from records
pub fn analyze_records(records: &[FeedingRecord]) -> AnalysisOutput {
    let birds = Tally::from_labels(records.iter().map(|r| r.bird_type.as_str()));
    let foods = Tally::from_labels(records.iter().map(|r| r.food_type.as_str()));

    let patterns = Patterns {
        most_common_bird: birds.most_common().map(str::to_string),
        preferred_food: foods.most_common().map(str::to_string),
        average_quantity: average_quantity(records),
        record_count: records.len(),
        distinct_bird_count: birds.distinct(),
        distinct_food_count: foods.distinct(),
    };

    let mut recommendations = Vec::new();
    if patterns.distinct_bird_count < MIN_BIRD_DIVERSITY {
        recommendations.push(VARIETY_RECOMMENDATION.to_string());
    }
    if patterns.average_quantity > WASTE_THRESHOLD {
        recommendations.push(WASTE_RECOMMENDATION.to_string());
    }
    if patterns.most_common_bird.as_deref() == Some("Robin") {
        recommendations.push(ROBIN_RECOMMENDATION.to_string());
    }

    AnalysisOutput {
        patterns,
        recommendations,
        engine_name: None,
    }
}

/// Backend wrapper around `analyze_records`; never fails
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalAnalyzer;

impl LocalAnalyzer {
    pub fn run(&self, records: &[FeedingRecord]) -> AnalysisOutput {
        analyze_records(records)
    }
}

#[async_trait]
impl AnalysisBackend for LocalAnalyzer {
    fn kind(&self) -> EngineKind {
        EngineKind::Local
    }

    fn describe(&self) -> String {
        "local pattern analyzer".to_string()
    }

    async fn analyze(
        &self,
        records: &[FeedingRecord],
    ) -> Result<AnalysisOutput, AnalysisEngineError> {
        Ok(self.run(records))
    }

    async fn probe(&self) -> Result<(), AnalysisEngineError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: u64, bird: &str, food: &str, quantity: f64) -> FeedingRecord {
        FeedingRecord {
            id,
            bird_type: bird.to_string(),
            food_type: food.to_string(),
            quantity,
            location: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_robin_example() {
        let records = vec![
            record(1, "Robin", "Seeds", 20.0),
            record(2, "Robin", "Worms", 30.0),
            record(3, "Sparrow", "Seeds", 10.0),
        ];

        let output = analyze_records(&records);
        assert_eq!(output.patterns.most_common_bird.as_deref(), Some("Robin"));
        assert_eq!(output.patterns.preferred_food.as_deref(), Some("Seeds"));
        assert_eq!(output.patterns.average_quantity, 20.0);
        assert_eq!(output.patterns.record_count, 3);
        assert_eq!(output.patterns.distinct_bird_count, 2);
        assert_eq!(output.patterns.distinct_food_count, 2);
        assert_eq!(
            output.recommendations,
            vec![VARIETY_RECOMMENDATION, ROBIN_RECOMMENDATION]
        );
    }

    #[test]
    fn test_waste_rule_and_rule_order() {
        let records = vec![
            record(1, "Robin", "Seeds", 80.0),
            record(2, "Robin", "Berries", 60.0),
        ];

        let output = analyze_records(&records);
        assert_eq!(
            output.recommendations,
            vec![
                VARIETY_RECOMMENDATION,
                WASTE_RECOMMENDATION,
                ROBIN_RECOMMENDATION
            ]
        );
    }

    #[test]
    fn test_diverse_moderate_feeding_has_no_recommendations() {
        let records = vec![
            record(1, "Cardinal", "Nuts", 30.0),
            record(2, "Blue Jay", "Nuts", 35.0),
            record(3, "Sparrow", "Seeds", 20.0),
        ];

        let output = analyze_records(&records);
        assert_eq!(output.patterns.most_common_bird.as_deref(), Some("Cardinal"));
        assert!(output.recommendations.is_empty());
    }

    #[test]
    fn test_average_exactly_at_threshold_is_not_waste() {
        let records = vec![
            record(1, "Cardinal", "Nuts", 50.0),
            record(2, "Blue Jay", "Nuts", 50.0),
            record(3, "Sparrow", "Seeds", 50.0),
        ];

        assert!(analyze_records(&records).recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_backend_matches_pure_function() {
        let records = vec![record(1, "Robin", "Seeds", 20.0)];
        let analyzer = LocalAnalyzer;

        assert_eq!(analyzer.kind(), EngineKind::Local);
        assert!(analyzer.probe().await.is_ok());
        assert_eq!(
            analyzer.analyze(&records).await.unwrap(),
            analyze_records(&records)
        );
    }

    #[test]
    fn test_empty_input() {
        let output = analyze_records(&[]);
        assert_eq!(output.patterns, Patterns::default());
        assert_eq!(output.recommendations, vec![VARIETY_RECOMMENDATION]);
    }
}
