//! Aggregate statistics over feeding records

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Summary returned by `GET /api/stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedingStats {
    pub count: usize,
    pub total_quantity: f64,
    /// Mean quantity rounded to two decimals, zero when there are no records
    pub average_quantity: f64,
    pub distinct_bird_types: usize,
    pub distinct_food_types: usize,
    pub by_bird_type: BTreeMap<String, usize>,
    pub by_food_type: BTreeMap<String, usize>,
    pub most_common_bird: Option<String>,
    pub most_common_food: Option<String>,
}
