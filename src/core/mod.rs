pub mod adapter;
pub mod cost_query;

pub use crate::domain::model::{CostQuery, CostQueryOutcome, Credentials};
pub use crate::domain::ports::{AdapterLogger, BillingClient, ClientFactory, ObjectStore};
pub use crate::utils::error::Result;
