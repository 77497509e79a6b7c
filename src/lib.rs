pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::{Cli, Command};
pub use crate::config::AdapterConfig;

#[cfg(feature = "aws")]
pub use crate::adapters::{aws::AwsClientFactory, cost_explorer::CostExplorerBilling, s3::S3ObjectStore};
pub use crate::adapters::memory::{InMemoryObjectStore, MemoryClientFactory, StaticBillingClient};
pub use crate::core::adapter::CloudResourceAdapter;
pub use crate::domain::model::{
    CostAndUsage, CostQuery, CostQueryFailure, CostQueryOutcome, Credentials, Dimension,
    Expression, Granularity, GroupDefinition, Metric, TimePeriod,
};
pub use crate::utils::error::{AdapterError, Result};
