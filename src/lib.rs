//! Bird Feeding Tracker
//!
//! Records bird feeding events, serves aggregate statistics over them, and
//! analyzes feeding patterns with an in-process analyzer or an optional
//! external analysis engine.
//!
//! # Features
//!
//! - **Durable**: Every feeding is fsynced to an append-only JSONL log
//! - **Thread-Safe**: Serialized appends, concurrent reads
//! - **Graceful Degradation**: Engine timeouts, crashes and malformed output
//!   fall back to the local analyzer
//! - **Bounded Probing**: An unavailable engine is re-probed only after a cooldown
//!
//! # Modules
//!
//! - `types`: Core data structures (FeedingRecord, FeedingStats, AnalysisResult)
//! - `record_store`: Durable append-only record storage
//! - `stats`: Summary statistics
//! - `analysis`: Local analyzer, external engine, and the dispatcher between them
//! - `service`: The façade composing the above
//! - `api`: Axum HTTP endpoints
//! - `validation`: Input rules
//! - `config`: CLI/env configuration
//!
//! # Example
//!
//! ```no_run
//! use bird_feeding::{FeedingService, NewFeeding, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = FeedingService::open(&ServiceConfig::default())?;
//!     service.record_feeding(NewFeeding::new("Robin", "Seeds", 25.0))?;
//!
//!     let analysis = service.analyze().await?;
//!     println!("{:?}", analysis.recommendations);
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod record_store;
pub mod service;
pub mod stats;
pub mod types;
pub mod validation;

// Re-export commonly used items at crate root
pub use analysis::{AnalysisBackend, AnalysisDispatcher, DispatcherConfig, ExternalEngine};
pub use config::{EngineConfig, ServerArgs, ServiceConfig};
pub use error::{AnalysisEngineError, FeedingError, FeedingResult, StorageError, ValidationError};
pub use record_store::{RecordStore, RecordStoreConfig};
pub use service::FeedingService;
pub use types::{
    AnalysisResult, EngineInfo, EngineKind, FeedingRecord, FeedingStats, NewFeeding, Patterns,
    RecordFilter,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
