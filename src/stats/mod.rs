//! Stats Aggregator
//!
//! Pure summary statistics over a sequence of feeding records. Nothing here is
//! persisted; every call recomputes from its input.

use std::collections::BTreeMap;

use crate::types::{FeedingRecord, FeedingStats};

/// Frequency counts in first-encountered order
///
/// Keeping encounter order lets `most_common` break ties deterministically.
#[derive(Debug, Default)]
pub struct Tally {
    counts: Vec<(String, usize)>,
}

impl Tally {
    pub fn from_labels<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut tally = Tally::default();
        for label in labels {
            match tally.counts.iter_mut().find(|(l, _)| l == label) {
                Some((_, count)) => *count += 1,
                None => tally.counts.push((label.to_string(), 1)),
            }
        }
        tally
    }

    /// Number of distinct labels
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Label with the highest count; ties go to the first encountered
    pub fn most_common(&self) -> Option<&str> {
        let mut best: Option<&(String, usize)> = None;
        for entry in &self.counts {
            if best.map_or(true, |b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(label, _)| label.as_str())
    }

    pub fn to_map(&self) -> BTreeMap<String, usize> {
        self.counts.iter().cloned().collect()
    }
}

/// Round to two decimal places, halves rounding up
///
/// Rounds the shortest decimal form of `value`, so a mean such as 10.075
/// (stored in binary as 10.07499...) still rounds to 10.08.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }

    // `Display` for f64 prints the shortest round-tripping decimal, never exponent form
    let repr = value.abs().to_string();
    let (whole, frac) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    if frac.len() <= 2 {
        return value;
    }

    let Ok(mut cents) = format!("{}{}", whole, &frac[..2]).parse::<f64>() else {
        return value;
    };
    if frac.as_bytes()[2] >= b'5' {
        cents += 1.0;
    }
    (cents / 100.0).copysign(value)
}

/// Mean quantity rounded to two decimals; zero for no records
pub fn average_quantity(records: &[FeedingRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let total: f64 = records.iter().map(|r| r.quantity).sum();
    round2(total / records.len() as f64)
}

/// Summarize a sequence of records
pub fn summarize(records: &[FeedingRecord]) -> FeedingStats {
    let birds = Tally::from_labels(records.iter().map(|r| r.bird_type.as_str()));
    let foods = Tally::from_labels(records.iter().map(|r| r.food_type.as_str()));

    FeedingStats {
        count: records.len(),
        total_quantity: records.iter().map(|r| r.quantity).sum(),
        average_quantity: average_quantity(records),
        distinct_bird_types: birds.distinct(),
        distinct_food_types: foods.distinct(),
        by_bird_type: birds.to_map(),
        by_food_type: foods.to_map(),
        most_common_bird: birds.most_common().map(str::to_string),
        most_common_food: foods.most_common().map(str::to_string),
    }
}
