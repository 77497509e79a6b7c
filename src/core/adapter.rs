use crate::core::cost_query;
use crate::domain::model::{CostQuery, CostQueryOutcome, Credentials};
use crate::domain::ports::{
    AdapterLogger, BillingClient, BillingError, ClientFactory, NoopLogger, ObjectStore,
};
use crate::utils::error::{AdapterError, Result};
use std::sync::Arc;

enum ConnectionState<S, B> {
    Uninitialized,
    Ready { store: S, billing: B },
}

/// Storage and billing operations over one set of client handles.
///
/// Starts `Uninitialized`; every operation fails with
/// [`AdapterError::NotInitialized`] until [`initialize`](Self::initialize)
/// succeeds. Each instance owns its handles, so adapters built with
/// different credentials can coexist.
pub struct CloudResourceAdapter<F: ClientFactory> {
    factory: F,
    state: ConnectionState<F::Store, F::Billing>,
    logger: Arc<dyn AdapterLogger>,
}

impl<F: ClientFactory> CloudResourceAdapter<F> {
    pub fn new(factory: F) -> Self {
        Self::with_logger(factory, Arc::new(NoopLogger))
    }

    pub fn with_logger(factory: F, logger: Arc<dyn AdapterLogger>) -> Self {
        Self {
            factory,
            state: ConnectionState::Uninitialized,
            logger,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ConnectionState::Ready { .. })
    }

    /// Builds the client handles. On failure the error is logged and returned
    /// as-is and the previous state is kept. Calling it again on a ready
    /// adapter replaces the handles.
    pub fn initialize(&mut self, credentials: Credentials) -> Result<()> {
        let connected = credentials
            .check()
            .and_then(|_| self.factory.connect(&credentials));

        match connected {
            Ok((store, billing)) => {
                if self.is_ready() {
                    self.logger.info("Replacing existing cloud client handles");
                }
                self.state = ConnectionState::Ready { store, billing };
                self.logger.info("Cloud clients initialized");
                Ok(())
            }
            Err(e) => {
                self.logger.error("Failed to initialize cloud clients", &e);
                Err(e)
            }
        }
    }

    fn handles(&self) -> Result<(&F::Store, &F::Billing)> {
        match &self.state {
            ConnectionState::Ready { store, billing } => Ok((store, billing)),
            ConnectionState::Uninitialized => Err(AdapterError::NotInitialized),
        }
    }

    /// Uploads `data` and returns the store's locator.
    ///
    /// Errors: `NotInitialized`, or the store's failure returned unchanged.
    pub async fn upload_object(&self, bucket: &str, key: &str, data: &[u8]) -> Result<String> {
        let (store, _) = self.handles()?;
        match store.put_object(bucket, key, data).await {
            Ok(locator) => {
                self.logger
                    .info(&format!("Uploaded {} bytes to {}/{}", data.len(), bucket, key));
                Ok(locator)
            }
            Err(e) => {
                self.logger
                    .error(&format!("Failed to upload {}/{}", bucket, key), &e);
                Err(e)
            }
        }
    }

    /// Returns the object body as text. A missing body yields `""`.
    ///
    /// Errors: `NotInitialized`, or the store's failure (not-found included)
    /// returned unchanged.
    pub async fn fetch_object(&self, bucket: &str, key: &str) -> Result<String> {
        let (store, _) = self.handles()?;
        match store.get_object(bucket, key).await {
            Ok(body) => {
                self.logger.info(&format!("Fetched {}/{}", bucket, key));
                Ok(body
                    .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                    .unwrap_or_default())
            }
            Err(e) => {
                self.logger
                    .error(&format!("Failed to fetch {}/{}", bucket, key), &e);
                Err(e)
            }
        }
    }

    /// Errors: `NotInitialized`, or the store's failure returned unchanged.
    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        let (store, _) = self.handles()?;
        match store.delete_object(bucket, key).await {
            Ok(()) => {
                self.logger.info(&format!("Deleted {}/{}", bucket, key));
                Ok(())
            }
            Err(e) => {
                self.logger
                    .error(&format!("Failed to delete {}/{}", bucket, key), &e);
                Err(e)
            }
        }
    }

    /// Runs a single-page cost-and-usage query.
    ///
    /// Query failures never surface as `Err`: they come back as
    /// [`CostQueryOutcome::Failure`]. The only `Err` is `NotInitialized`.
    pub async fn query_cost(&self, query: &CostQuery) -> Result<CostQueryOutcome> {
        let (_, billing) = self.handles()?;

        let result = match query.validate() {
            Ok(()) => billing.get_cost_and_usage(query).await,
            Err(e) => Err(BillingError::new(None, e.to_string())),
        };

        match &result {
            Ok(page) => self.logger.info(&format!(
                "Fetched {} cost rows for {}..{}",
                page.results_by_time.len(),
                query.time_period.start_str(),
                query.time_period.end_str()
            )),
            Err(e) => self.logger.error("Error fetching cost data", e),
        }

        Ok(cost_query::classify(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryObjectStore, MemoryClientFactory, StaticBillingClient};
    use crate::domain::model::{Granularity, Metric, TimePeriod};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingLogger {
        lines: Mutex<Vec<String>>,
    }

    impl AdapterLogger for RecordingLogger {
        fn info(&self, message: &str) {
            self.lines.lock().unwrap().push(format!("INFO {}", message));
        }

        fn error(&self, message: &str, error: &dyn std::error::Error) {
            self.lines
                .lock()
                .unwrap()
                .push(format!("ERROR {}: {}", message, error));
        }
    }

    fn query() -> CostQuery {
        CostQuery::new(
            TimePeriod::parse("2024-01-01", "2024-01-02").unwrap(),
            Granularity::Daily,
            vec![Metric::UnblendedCost],
        )
    }

    #[tokio::test]
    async fn test_operations_fail_before_initialize() {
        let factory = MemoryClientFactory::new(InMemoryObjectStore::new(), StaticBillingClient::empty());
        let adapter = CloudResourceAdapter::new(factory);

        assert!(!adapter.is_ready());
        assert!(matches!(
            adapter.upload_object("b", "k", b"x").await,
            Err(AdapterError::NotInitialized)
        ));
        assert!(matches!(
            adapter.fetch_object("b", "k").await,
            Err(AdapterError::NotInitialized)
        ));
        assert!(matches!(
            adapter.delete_object("b", "k").await,
            Err(AdapterError::NotInitialized)
        ));
        assert!(matches!(
            adapter.query_cost(&query()).await,
            Err(AdapterError::NotInitialized)
        ));
    }

    #[test]
    fn test_bad_credentials_keep_adapter_uninitialized() {
        let logger = Arc::new(RecordingLogger::default());
        let factory = MemoryClientFactory::new(InMemoryObjectStore::new(), StaticBillingClient::empty());
        let mut adapter = CloudResourceAdapter::with_logger(factory, logger.clone());

        let err = adapter.initialize(Credentials::new("", "secret")).unwrap_err();
        assert!(matches!(err, AdapterError::InvalidCredentials { .. }));
        assert!(!adapter.is_ready());

        let lines = logger.lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("ERROR Failed to initialize"));
        assert!(!lines[0].contains("secret"));
    }

    #[tokio::test]
    async fn test_logger_sees_failures_without_credentials() {
        let logger = Arc::new(RecordingLogger::default());
        let factory = MemoryClientFactory::new(InMemoryObjectStore::new(), StaticBillingClient::empty());
        let mut adapter = CloudResourceAdapter::with_logger(factory, logger.clone());
        adapter
            .initialize(Credentials::new("AKIDEXAMPLE", "very-secret-key"))
            .unwrap();

        assert!(adapter.fetch_object("bucket1", "missing").await.is_err());

        let lines = logger.lines.lock().unwrap();
        assert!(lines.iter().any(|l| l.starts_with("ERROR Failed to fetch bucket1/missing")));
        assert!(lines.iter().all(|l| !l.contains("very-secret-key")));
    }

    #[tokio::test]
    async fn test_empty_metric_set_is_classified_not_raised() {
        let factory = MemoryClientFactory::new(InMemoryObjectStore::new(), StaticBillingClient::empty());
        let mut adapter = CloudResourceAdapter::new(factory);
        adapter.initialize(Credentials::new("a", "b")).unwrap();

        let mut q = query();
        q.metrics.clear();
        let outcome = adapter.query_cost(&q).await.unwrap();
        let failure = outcome.failure().unwrap();
        assert_eq!(failure.message, cost_query::FETCH_FAILED_MESSAGE);
        assert!(failure.error.contains("at least one metric"));
    }
}
