//! Analysis Dispatcher
//!
//! Routes each analysis to the external engine when it is healthy and to the
//! local analyzer otherwise. Availability is tracked as a small state machine:
//!
//! ```text
//!             probe ok                     call fails
//! Unprobed ───────────► Healthy ─────────────────────────┐
//!    │                     ▲                              ▼
//!    │ probe fails         │ probe ok (after cooldown)  Unavailable
//!    └─────────────────────┴──────────────────────────────┘
//! ```
//!
//! The state lives behind an async mutex that is held across a probe, so
//! callers arriving mid-probe wait for and reuse its outcome. A separate
//! snapshot mirrors it for status reads, which never wait on a probe.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{AnalysisBackend, ExternalEngine, LocalAnalyzer};
use crate::error::AnalysisEngineError;
use crate::types::{AnalysisOutput, AnalysisResult, EngineKind, FeedingRecord};

/// Timing policy for the external engine
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Upper bound for a single probe or analysis call
    pub timeout: Duration,
    /// Minimum time spent routing locally before re-probing an unavailable engine
    pub reprobe_after: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            reprobe_after: Duration::from_secs(30),
        }
    }
}

/// Availability of the external engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// No external engine configured
    Disabled,
    /// Configured but not yet probed
    Unprobed,
    /// A probe is in flight
    Probing,
    Healthy,
    Unavailable,
}

/// Snapshot reported by `GET /api/analyze/status`
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub configured: bool,
    pub state: EngineState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Availability {
    Unprobed,
    Healthy,
    Unavailable { since: Instant },
}

enum Route {
    External,
    Local,
}

/// Chooses between the local analyzer and an optional external engine
pub struct AnalysisDispatcher {
    local: LocalAnalyzer,
    external: Option<Arc<dyn AnalysisBackend>>,
    availability: Mutex<Availability>,
    /// Last published state, readable while a probe holds `availability`
    snapshot: parking_lot::Mutex<EngineState>,
    config: DispatcherConfig,
}

impl AnalysisDispatcher {
    /// Dispatcher that always uses the local analyzer and never probes
    pub fn local_only() -> Self {
        Self {
            local: LocalAnalyzer,
            external: None,
            availability: Mutex::new(Availability::Unprobed),
            snapshot: parking_lot::Mutex::new(EngineState::Disabled),
            config: DispatcherConfig::default(),
        }
    }

    /// Dispatcher delegating to an external engine process
    pub fn with_external_engine(engine: ExternalEngine, config: DispatcherConfig) -> Self {
        Self::with_backend(Arc::new(engine), config)
    }

    /// Dispatcher delegating to any backend
    pub fn with_backend(backend: Arc<dyn AnalysisBackend>, config: DispatcherConfig) -> Self {
        Self {
            local: LocalAnalyzer,
            external: Some(backend),
            availability: Mutex::new(Availability::Unprobed),
            snapshot: parking_lot::Mutex::new(EngineState::Unprobed),
            config,
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Analyze records; always completes, falling back to the local analyzer
    pub async fn analyze(&self, records: &[FeedingRecord]) -> AnalysisResult {
        let Some(external) = self.external.as_deref() else {
            return self.local_result(records, false);
        };

        match self.route(external).await {
            Route::External => match self.call_external(external, records).await {
                Ok(output) => {
                    info!(
                        event = "analysis_performed",
                        engine = %EngineKind::External,
                        records = records.len(),
                        "Analysis performed"
                    );
                    AnalysisResult::from_output(output, EngineKind::External, false)
                }
                Err(e) => {
                    let mut availability = self.availability.lock().await;
                    self.set_availability(
                        &mut availability,
                        Availability::Unavailable {
                            since: Instant::now(),
                        },
                    );
                    drop(availability);
                    warn!(
                        event = "analysis_fallback",
                        error = %e,
                        records = records.len(),
                        "External analysis failed, falling back to local analyzer"
                    );
                    self.local_result(records, true)
                }
            },
            Route::Local => {
                warn!(
                    event = "analysis_fallback",
                    reason = "engine unavailable",
                    records = records.len(),
                    "External engine unavailable, using local analyzer"
                );
                self.local_result(records, true)
            }
        }
    }

    /// Report configuration and current availability
    ///
    /// Reads the published snapshot, so it returns immediately during a probe.
    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            configured: self.external.is_some(),
            state: *self.snapshot.lock(),
            engine: self.external.as_ref().map(|external| external.describe()),
        }
    }

    /// Update the availability guarded by `guard` and publish it for `status`
    fn set_availability(&self, guard: &mut Availability, next: Availability) {
        *guard = next;
        *self.snapshot.lock() = match next {
            Availability::Unprobed => EngineState::Unprobed,
            Availability::Healthy => EngineState::Healthy,
            Availability::Unavailable { .. } => EngineState::Unavailable,
        };
    }

    /// Decide where this request goes, probing when the state calls for it
    async fn route(&self, external: &dyn AnalysisBackend) -> Route {
        let mut availability = self.availability.lock().await;

        match *availability {
            Availability::Healthy => return Route::External,
            Availability::Unavailable { since } if since.elapsed() < self.config.reprobe_after => {
                return Route::Local
            }
            _ => {}
        }

        *self.snapshot.lock() = EngineState::Probing;

        match tokio::time::timeout(self.config.timeout, external.probe()).await {
            Ok(Ok(())) => {
                info!(
                    event = "engine_probe",
                    healthy = true,
                    engine = %external.describe(),
                    "External analysis engine is healthy"
                );
                self.set_availability(&mut availability, Availability::Healthy);
                Route::External
            }
            outcome => {
                let error = match outcome {
                    Ok(Err(e)) => e,
                    _ => AnalysisEngineError::Timeout(self.config.timeout),
                };
                warn!(
                    event = "engine_probe",
                    healthy = false,
                    engine = %external.describe(),
                    error = %error,
                    "External analysis engine is unavailable"
                );
                self.set_availability(
                    &mut availability,
                    Availability::Unavailable {
                        since: Instant::now(),
                    },
                );
                Route::Local
            }
        }
    }

    async fn call_external(
        &self,
        external: &dyn AnalysisBackend,
        records: &[FeedingRecord],
    ) -> Result<AnalysisOutput, AnalysisEngineError> {
        tokio::time::timeout(self.config.timeout, external.analyze(records))
            .await
            .map_err(|_| AnalysisEngineError::Timeout(self.config.timeout))?
    }

    fn local_result(&self, records: &[FeedingRecord], fallback: bool) -> AnalysisResult {
        let output = self.local.run(records);
        if !fallback {
            info!(
                event = "analysis_performed",
                engine = %EngineKind::Local,
                records = records.len(),
                "Analysis performed"
            );
        }
        AnalysisResult::from_output(output, EngineKind::Local, fallback)
    }
}
