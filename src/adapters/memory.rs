//! In-process implementations of the ports.
//!
//! `InMemoryObjectStore` follows S3 semantics where they matter to callers:
//! deleting a missing key succeeds and fetching it afterwards fails with
//! [`MemoryStoreError::NoSuchKey`].

use crate::domain::model::{CostAndUsage, CostQuery, Credentials, ObjectRef};
use crate::domain::ports::{BillingClient, BillingError, ClientFactory, ObjectStore};
use crate::utils::error::{AdapterError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("NoSuchKey: the specified key does not exist: {bucket}/{key}")]
    NoSuchKey { bucket: String, key: String },
}

/// Clones share the same objects.
#[derive(Debug, Clone, Default)]
pub struct InMemoryObjectStore {
    objects: Arc<Mutex<HashMap<ObjectRef, Option<Vec<u8>>>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn objects(&self) -> MutexGuard<'_, HashMap<ObjectRef, Option<Vec<u8>>>> {
        self.objects.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers an object that exists but has no body.
    pub fn insert_without_body(&self, bucket: &str, key: &str) {
        self.objects().insert(ObjectRef::new(bucket, key), None);
    }

    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.objects().contains_key(&ObjectRef::new(bucket, key))
    }

    pub fn len(&self) -> usize {
        self.objects().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }
}

impl ObjectStore for InMemoryObjectStore {
    async fn put_object(&self, bucket: &str, key: &str, data: &[u8]) -> Result<String> {
        let object = ObjectRef::new(bucket, key);
        let locator = format!("memory://{}", object);
        self.objects().insert(object, Some(data.to_vec()));
        Ok(locator)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        self.objects()
            .get(&ObjectRef::new(bucket, key))
            .cloned()
            .ok_or_else(|| {
                AdapterError::transport(MemoryStoreError::NoSuchKey {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })
            })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.objects().remove(&ObjectRef::new(bucket, key));
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum CannedResponse {
    Page(CostAndUsage),
    Error { code: Option<String>, message: String },
}

/// Answers every query with the same canned response and records the queries.
#[derive(Debug, Clone)]
pub struct StaticBillingClient {
    response: CannedResponse,
    received: Arc<Mutex<Vec<CostQuery>>>,
}

impl StaticBillingClient {
    pub fn page(page: CostAndUsage) -> Self {
        Self {
            response: CannedResponse::Page(page),
            received: Arc::default(),
        }
    }

    /// A transport-level success with zero rows.
    pub fn empty() -> Self {
        Self::page(CostAndUsage::default())
    }

    pub fn error(code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            response: CannedResponse::Error {
                code: code.map(str::to_string),
                message: message.into(),
            },
            received: Arc::default(),
        }
    }

    pub fn received(&self) -> Vec<CostQuery> {
        self.received
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl BillingClient for StaticBillingClient {
    async fn get_cost_and_usage(
        &self,
        query: &CostQuery,
    ) -> std::result::Result<CostAndUsage, BillingError> {
        self.received
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(query.clone());

        match &self.response {
            CannedResponse::Page(page) => Ok(page.clone()),
            CannedResponse::Error { code, message } => {
                Err(BillingError::new(code.clone(), message.clone()))
            }
        }
    }
}

/// Hands out clones of the same store and billing client on every connect.
#[derive(Debug, Clone)]
pub struct MemoryClientFactory {
    store: InMemoryObjectStore,
    billing: StaticBillingClient,
}

impl MemoryClientFactory {
    pub fn new(store: InMemoryObjectStore, billing: StaticBillingClient) -> Self {
        Self { store, billing }
    }
}

impl ClientFactory for MemoryClientFactory {
    type Store = InMemoryObjectStore;
    type Billing = StaticBillingClient;

    fn connect(&self, _credentials: &Credentials) -> Result<(Self::Store, Self::Billing)> {
        Ok((self.store.clone(), self.billing.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_delete() {
        tokio_test::block_on(async {
            let store = InMemoryObjectStore::new();
            let locator = store.put_object("bucket1", "k1", b"hello").await.unwrap();
            assert_eq!(locator, "memory://bucket1/k1");
            assert_eq!(
                store.get_object("bucket1", "k1").await.unwrap(),
                Some(b"hello".to_vec())
            );

            store.delete_object("bucket1", "k1").await.unwrap();
            assert!(store.is_empty());
        });
    }

    #[test]
    fn test_missing_key_error_is_store_specific() {
        tokio_test::block_on(async {
            let store = InMemoryObjectStore::new();
            let err = store.get_object("bucket1", "nope").await.unwrap_err();
            let AdapterError::Transport(inner) = err else {
                panic!("expected transport error");
            };
            assert_eq!(
                inner.downcast_ref::<MemoryStoreError>(),
                Some(&MemoryStoreError::NoSuchKey {
                    bucket: "bucket1".to_string(),
                    key: "nope".to_string()
                })
            );
        });
    }

    #[test]
    fn test_delete_missing_key_succeeds() {
        tokio_test::block_on(async {
            let store = InMemoryObjectStore::new();
            assert!(store.delete_object("bucket1", "never-written").await.is_ok());
        });
    }

    #[test]
    fn test_clones_share_objects() {
        tokio_test::block_on(async {
            let store = InMemoryObjectStore::new();
            let other = store.clone();
            other.put_object("b", "k", b"v").await.unwrap();
            assert!(store.contains("b", "k"));
            assert_eq!(store.len(), 1);
        });
    }
}
