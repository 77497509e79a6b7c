// Adapters layer: concrete implementations of the domain ports.

#[cfg(feature = "aws")]
pub mod aws;
#[cfg(feature = "aws")]
pub mod cost_explorer;
pub mod memory;
#[cfg(feature = "aws")]
pub mod s3;
