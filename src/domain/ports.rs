use crate::domain::model::{CostAndUsage, CostQuery, Credentials};
use crate::utils::error::{BoxError, Result};
use async_trait::async_trait;
use thiserror::Error;

/// Named byte blobs in named buckets.
///
/// Implementations report failures as `AdapterError::Transport` wrapping the
/// vendor error unchanged.
pub trait ObjectStore: Send + Sync {
    /// Stores `data` under `key` and returns an opaque locator.
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    /// `Ok(None)` means the object exists but carries no body.
    fn get_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>>> + Send;

    fn delete_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Failure of a billing query as reported by the provider.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct BillingError {
    /// Provider error code, e.g. `DataUnavailableException`.
    pub code: Option<String>,
    pub message: String,
    #[source]
    pub source: Option<BoxError>,
}

impl BillingError {
    pub fn new(code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: BoxError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

#[async_trait]
pub trait BillingClient: Send + Sync {
    /// Fetches a single page; `query.next_page_token` is forwarded untouched.
    async fn get_cost_and_usage(
        &self,
        query: &CostQuery,
    ) -> std::result::Result<CostAndUsage, BillingError>;
}

/// Builds the client handles for a given set of credentials.
pub trait ClientFactory: Send + Sync {
    type Store: ObjectStore;
    type Billing: BillingClient;

    fn connect(&self, credentials: &Credentials) -> Result<(Self::Store, Self::Billing)>;
}

pub trait AdapterLogger: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str, error: &dyn std::error::Error);
}

/// Used when no logger is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl AdapterLogger for NoopLogger {
    fn info(&self, _message: &str) {}

    fn error(&self, _message: &str, _error: &dyn std::error::Error) {}
}
