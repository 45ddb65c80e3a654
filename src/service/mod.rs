//! Feeding Service - the entry point used by the HTTP layer
//!
//! Composes the record store, the stats aggregator and the analysis
//! dispatcher. Every operation reads a fresh snapshot of the store.

use tracing::{info, warn};

use crate::analysis::{AnalysisDispatcher, EngineStatus};
use crate::config::ServiceConfig;
use crate::error::{FeedingResult, StorageResult};
use crate::record_store::RecordStore;
use crate::stats;
use crate::types::{AnalysisResult, FeedingRecord, FeedingStats, NewFeeding, RecordFilter};
use crate::validation::validate_limit;

/// Façade over store, aggregator and dispatcher
pub struct FeedingService {
    store: RecordStore,
    dispatcher: AnalysisDispatcher,
}

impl FeedingService {
    pub fn new(store: RecordStore, dispatcher: AnalysisDispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// Open the store and build the dispatcher described by `config`
    pub fn open(config: &ServiceConfig) -> StorageResult<Self> {
        let store = RecordStore::open(config.store.clone())?;
        let dispatcher = config.engine.build_dispatcher();
        Ok(Self::new(store, dispatcher))
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn dispatcher(&self) -> &AnalysisDispatcher {
        &self.dispatcher
    }

    /// Validate and persist a new feeding
    pub fn record_feeding(&self, new: NewFeeding) -> FeedingResult<FeedingRecord> {
        match self.store.append(&new) {
            Ok(record) => {
                info!(
                    event = "feeding_created",
                    id = record.id,
                    bird_type = %record.bird_type,
                    food_type = %record.food_type,
                    quantity = record.quantity,
                    "Feeding recorded"
                );
                Ok(record)
            }
            Err(e) if e.is_validation() => {
                warn!(event = "feeding_validation_failed", error = %e, "Feeding rejected");
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// All feedings, or the most recent `limit`, oldest first
    pub fn get_feedings(&self, limit: Option<usize>) -> FeedingResult<Vec<FeedingRecord>> {
        let limit = validate_limit(limit)?;
        Ok(self.store.list(limit)?)
    }

    /// Aggregate statistics over every stored feeding
    pub fn get_stats(&self) -> FeedingResult<FeedingStats> {
        let records = self.store.list(None)?;
        Ok(stats::summarize(&records))
    }

    /// Analyze every stored feeding
    ///
    /// Fails only when the store cannot be read; engine failures fall back locally.
    pub async fn analyze(&self) -> FeedingResult<AnalysisResult> {
        self.analyze_filtered(&RecordFilter::default()).await
    }

    /// Analyze the feedings selected by `filter`
    pub async fn analyze_filtered(&self, filter: &RecordFilter) -> FeedingResult<AnalysisResult> {
        validate_limit(filter.limit)?;
        let records = filter.apply(self.store.list(None)?);
        Ok(self.dispatcher.analyze(&records).await)
    }

    pub fn engine_status(&self) -> EngineStatus {
        self.dispatcher.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ROBIN_RECOMMENDATION, VARIETY_RECOMMENDATION};
    use crate::error::{FeedingError, StorageError, ValidationError};
    use crate::record_store::RecordStoreConfig;
    use crate::types::EngineKind;
    use tempfile::TempDir;

    fn create_test_service() -> (FeedingService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::open(RecordStoreConfig::new(temp_dir.path())).unwrap();
        let service = FeedingService::new(store, AnalysisDispatcher::local_only());
        (service, temp_dir)
    }

    fn seed_example(service: &FeedingService) {
        service.record_feeding(NewFeeding::new("Robin", "Seeds", 20.0)).unwrap();
        service.record_feeding(NewFeeding::new("Robin", "Worms", 30.0)).unwrap();
        service.record_feeding(NewFeeding::new("Sparrow", "Seeds", 10.0)).unwrap();
    }

    #[test]
    fn test_record_then_list_contains_record_once() {
        let (service, _temp_dir) = create_test_service();
        seed_example(&service);

        let created = service
            .record_feeding(NewFeeding::new("Cardinal", "Nuts", 12.5))
            .unwrap();
        let feedings = service.get_feedings(None).unwrap();

        assert_eq!(feedings.iter().filter(|r| r.id == created.id).count(), 1);
        assert!(feedings
            .iter()
            .filter(|r| r.id != created.id)
            .all(|r| r.id < created.id));
    }

    #[test]
    fn test_invalid_feeding_persists_nothing() {
        let (service, _temp_dir) = create_test_service();

        for bad in [
            NewFeeding::new("", "Seeds", 1.0),
            NewFeeding::new("Robin", "", 1.0),
            NewFeeding::new("Robin", "Seeds", -1.0),
        ] {
            let err = service.record_feeding(bad).unwrap_err();
            assert!(err.is_validation());
        }

        assert!(service.get_feedings(None).unwrap().is_empty());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let (service, _temp_dir) = create_test_service();
        let err = service.get_feedings(Some(0)).unwrap_err();
        assert!(matches!(
            err,
            FeedingError::Validation(ValidationError::ZeroLimit)
        ));
    }

    #[test]
    fn test_stats_on_empty_store() {
        let (service, _temp_dir) = create_test_service();
        let stats = service.get_stats().unwrap();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.average_quantity, 0.0);
    }

    #[test]
    fn test_reads_are_idempotent() {
        let (service, _temp_dir) = create_test_service();
        seed_example(&service);

        assert_eq!(service.get_feedings(None).unwrap(), service.get_feedings(None).unwrap());
        assert_eq!(service.get_stats().unwrap(), service.get_stats().unwrap());
    }

    #[tokio::test]
    async fn test_unavailable_store_surfaces_storage_errors() {
        let (service, _temp_dir) = create_test_service();
        seed_example(&service);
        service.store().mark_unavailable("rollback failed");

        let err = service
            .record_feeding(NewFeeding::new("Robin", "Seeds", 1.0))
            .unwrap_err();
        assert!(!err.is_validation());
        assert!(matches!(err, FeedingError::Storage(StorageError::Unavailable(_))));

        assert!(matches!(
            service.get_feedings(None),
            Err(FeedingError::Storage(StorageError::Unavailable(_)))
        ));
        assert!(matches!(
            service.get_stats(),
            Err(FeedingError::Storage(StorageError::Unavailable(_)))
        ));
        assert!(matches!(
            service.analyze().await,
            Err(FeedingError::Storage(StorageError::Unavailable(_)))
        ));
    }

    #[tokio::test]
    async fn test_analyze_example_without_engine() {
        let (service, _temp_dir) = create_test_service();
        seed_example(&service);

        let result = service.analyze().await.unwrap();
        assert_eq!(result.patterns.most_common_bird.as_deref(), Some("Robin"));
        assert_eq!(result.patterns.preferred_food.as_deref(), Some("Seeds"));
        assert_eq!(result.patterns.average_quantity, 20.0);
        assert!(result.recommendations.iter().any(|r| r == ROBIN_RECOMMENDATION));
        assert!(result.recommendations.iter().any(|r| r == VARIETY_RECOMMENDATION));
        assert_eq!(result.engine.kind, EngineKind::Local);
        assert!(!result.engine.fallback);
    }

    #[tokio::test]
    async fn test_analyze_filtered() {
        let (service, _temp_dir) = create_test_service();
        seed_example(&service);

        let filter = RecordFilter {
            food_type: Some("seeds".to_string()),
            ..Default::default()
        };
        let result = service.analyze_filtered(&filter).await.unwrap();
        assert_eq!(result.patterns.record_count, 2);
        assert_eq!(result.patterns.average_quantity, 15.0);
    }
}
