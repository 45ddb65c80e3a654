//! Analysis backends and dispatch
//!
//! - `LocalAnalyzer`: in-process pattern analysis, always available
//! - `ExternalEngine`: out-of-process engine invoked per request
//! - `AnalysisDispatcher`: picks a backend, tracks external availability,
//!   and falls back to the local analyzer on any external failure

mod dispatcher;
mod external;
mod local;

use async_trait::async_trait;

use crate::error::AnalysisEngineError;
use crate::types::{AnalysisOutput, EngineKind, FeedingRecord};

pub use dispatcher::{AnalysisDispatcher, DispatcherConfig, EngineState, EngineStatus};
pub use external::ExternalEngine;
pub use local::{
    analyze_records, LocalAnalyzer, ROBIN_RECOMMENDATION, VARIETY_RECOMMENDATION,
    WASTE_RECOMMENDATION,
};

/// Capability interface shared by every analysis backend
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Which kind of engine this is
    fn kind(&self) -> EngineKind;

    /// Human-readable description for status reporting
    fn describe(&self) -> String;

    /// Derive patterns and recommendations from records
    async fn analyze(&self, records: &[FeedingRecord])
        -> Result<AnalysisOutput, AnalysisEngineError>;

    /// Health probe; by default an analysis of an empty input must succeed
    async fn probe(&self) -> Result<(), AnalysisEngineError> {
        self.analyze(&[]).await.map(|_| ())
    }
}
