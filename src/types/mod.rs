//! Data types for the bird feeding tracker
//!
//! This module contains the core data structures used throughout the application.

mod analysis;
mod record;
mod stats;

pub use analysis::{AnalysisOutput, AnalysisResult, EngineInfo, EngineKind, Patterns};
pub use record::{FeedingRecord, NewFeeding, RecordFilter};
pub use stats::FeedingStats;
