#[cfg(feature = "cli")]
pub mod cli;

use crate::domain::model::Credentials;
use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

pub const DEFAULT_REGION: &str = "us-east-1";

/// Cost Explorer is served from a single region.
pub const DEFAULT_BILLING_REGION: &str = "us-east-1";

/// Connection settings for the AWS clients. Credentials are kept separate
/// and handed to `CloudResourceAdapter::initialize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    pub region: String,
    pub billing_region: String,
    /// Overrides the S3 endpoint, e.g. for MinIO or LocalStack.
    pub endpoint_url: Option<String>,
    /// Falls back to `endpoint_url` when unset.
    pub billing_endpoint_url: Option<String>,
    pub force_path_style: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            billing_region: DEFAULT_BILLING_REGION.to_string(),
            endpoint_url: None,
            billing_endpoint_url: None,
            force_path_style: false,
        }
    }
}

impl AdapterConfig {
    /// Loads settings from a TOML file; missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: AdapterConfig = toml::from_str(&content)?;
        tracing::debug!("Loaded adapter config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Defaults overlaid with `AWS_REGION`, `AWS_ENDPOINT_URL`,
    /// `AWS_S3_FORCE_PATH_STYLE`, `COST_EXPLORER_REGION` and
    /// `COST_EXPLORER_ENDPOINT_URL`.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(region) = env::var("AWS_REGION") {
            self.region = region;
        }
        if let Ok(region) = env::var("COST_EXPLORER_REGION") {
            self.billing_region = region;
        }
        if let Ok(url) = env::var("AWS_ENDPOINT_URL") {
            self.endpoint_url = Some(url);
        }
        if let Ok(url) = env::var("COST_EXPLORER_ENDPOINT_URL") {
            self.billing_endpoint_url = Some(url);
        }
        if let Ok(flag) = env::var("AWS_S3_FORCE_PATH_STYLE") {
            self.force_path_style = parse_bool("AWS_S3_FORCE_PATH_STYLE", &flag)?;
        }
        Ok(self)
    }

    pub fn billing_endpoint_url(&self) -> Option<String> {
        self.billing_endpoint_url
            .clone()
            .or_else(|| self.endpoint_url.clone())
    }
}

fn parse_bool(field: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => Err(AdapterError::InvalidConfigValueError {
            field: field.to_string(),
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

/// Reads `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and the optional
/// `AWS_SESSION_TOKEN`.
pub fn credentials_from_env() -> Result<Credentials> {
    let access_key_id = env::var("AWS_ACCESS_KEY_ID").map_err(|_| AdapterError::MissingConfigError {
        field: "AWS_ACCESS_KEY_ID".to_string(),
    })?;
    let secret_access_key =
        env::var("AWS_SECRET_ACCESS_KEY").map_err(|_| AdapterError::MissingConfigError {
            field: "AWS_SECRET_ACCESS_KEY".to_string(),
        })?;

    let credentials = Credentials::new(access_key_id, secret_access_key);
    Ok(match env::var("AWS_SESSION_TOKEN") {
        Ok(token) if !token.is_empty() => credentials.with_session_token(token),
        _ => credentials,
    })
}

impl Validate for AdapterConfig {
    fn validate(&self) -> Result<()> {
        validate_aws_region("region", &self.region)?;
        validate_aws_region("billing_region", &self.billing_region)?;

        if let Some(url) = &self.endpoint_url {
            validate_url("endpoint_url", url)?;
        }
        if let Some(url) = &self.billing_endpoint_url {
            validate_url("billing_endpoint_url", url)?;
        }

        tracing::debug!("Adapter configuration validation passed");
        Ok(())
    }
}

fn validate_aws_region(field_name: &str, region: &str) -> Result<()> {
    validate_non_empty_string(field_name, region)?;

    // AWS region format validation
    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(AdapterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: region.to_string(),
            reason: "AWS region can only contain lowercase letters, numbers, and hyphens"
                .to_string(),
        });
    }

    Ok(())
}
