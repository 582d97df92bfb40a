//! Application state for the timesheet engine API.
//!
//! Shared across all request handlers: the record store, the resolved
//! engine configuration, the pay report cache and the collaborator handles
//! for notifications and document generation.

use std::sync::Arc;

use crate::cache::TtlCache;
use crate::config::EngineConfig;
use crate::payroll::MonthPayReport;
use crate::workflow::store::RecordStore;
use crate::workflow::{DocumentGenerator, NotificationSender};

/// Shared application state, generic over the record store implementation.
pub struct AppState<S: RecordStore> {
    store: Arc<S>,
    config: Arc<EngineConfig>,
    reports: Arc<TtlCache<MonthPayReport>>,
    notifier: Arc<dyn NotificationSender>,
    documents: Arc<dyn DocumentGenerator>,
}

impl<S: RecordStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
            reports: Arc::clone(&self.reports),
            notifier: Arc::clone(&self.notifier),
            documents: Arc::clone(&self.documents),
        }
    }
}

impl<S: RecordStore> AppState<S> {
    /// Creates the application state.
    pub fn new(
        store: S,
        config: EngineConfig,
        notifier: Arc<dyn NotificationSender>,
        documents: Arc<dyn DocumentGenerator>,
    ) -> Self {
        let reports = Arc::new(TtlCache::new(config.report_cache_ttl));
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
            reports,
            notifier,
            documents,
        }
    }

    /// Returns the record store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the pay report cache.
    pub fn reports(&self) -> &TtlCache<MonthPayReport> {
        &self.reports
    }

    /// Returns the notification collaborator.
    pub fn notifier(&self) -> &dyn NotificationSender {
        self.notifier.as_ref()
    }

    /// Returns the document generation collaborator.
    pub fn documents(&self) -> &dyn DocumentGenerator {
        self.documents.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::store::MemoryStore;

    #[test]
    fn test_app_state_is_clone() {
        // Required for axum state
        fn assert_clone<T: Clone>(_: &T) {}

        struct NoopNotifier;
        impl NotificationSender for NoopNotifier {
            fn send_signing_request(
                &self,
                _recipient_name: &str,
                _recipient_email: &str,
                _submission: &crate::models::TeamSubmission,
                _token: uuid::Uuid,
            ) -> crate::error::EngineResult<()> {
                Ok(())
            }
        }
        struct NoopDocuments;
        impl DocumentGenerator for NoopDocuments {
            fn generate(
                &self,
                _submission: &crate::models::TeamSubmission,
                _timesheets: &[crate::models::Timesheet],
            ) -> crate::error::EngineResult<String> {
                Ok("doc://none".to_string())
            }
        }

        let state = AppState::new(
            MemoryStore::new(),
            EngineConfig::default(),
            Arc::new(NoopNotifier),
            Arc::new(NoopDocuments),
        );
        assert_clone(&state);
    }
}
