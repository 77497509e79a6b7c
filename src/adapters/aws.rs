use crate::adapters::cost_explorer::CostExplorerBilling;
use crate::adapters::s3::S3ObjectStore;
use crate::config::AdapterConfig;
use crate::domain::model::Credentials;
use crate::domain::ports::ClientFactory;
use crate::utils::error::Result;
use aws_config::{BehaviorVersion, Region};

const CREDENTIALS_PROVIDER_NAME: &str = "cloud-adapter";

/// Builds S3 and Cost Explorer clients from static credentials.
#[derive(Debug, Clone)]
pub struct AwsClientFactory {
    config: AdapterConfig,
}

impl AwsClientFactory {
    pub fn new(config: AdapterConfig) -> Self {
        Self { config }
    }

    fn sdk_credentials(credentials: &Credentials) -> aws_sdk_s3::config::Credentials {
        aws_sdk_s3::config::Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            credentials.session_token.clone(),
            None,
            CREDENTIALS_PROVIDER_NAME,
        )
    }
}

impl ClientFactory for AwsClientFactory {
    type Store = S3ObjectStore;
    type Billing = CostExplorerBilling;

    fn connect(&self, credentials: &Credentials) -> Result<(Self::Store, Self::Billing)> {
        credentials.check()?;
        let sdk_credentials = Self::sdk_credentials(credentials);

        let mut s3_builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(self.config.region.clone()))
            .credentials_provider(sdk_credentials.clone())
            .force_path_style(self.config.force_path_style);
        s3_builder.set_endpoint_url(self.config.endpoint_url.clone());
        let s3_config = s3_builder.build();

        let mut billing_builder = aws_sdk_costexplorer::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(self.config.billing_region.clone()))
            .credentials_provider(sdk_credentials);
        billing_builder.set_endpoint_url(self.config.billing_endpoint_url());
        let billing_config = billing_builder.build();

        tracing::debug!(
            region = %self.config.region,
            billing_region = %self.config.billing_region,
            endpoint_url = ?self.config.endpoint_url,
            "Building AWS clients"
        );

        Ok((
            S3ObjectStore::new(aws_sdk_s3::Client::from_conf(s3_config)),
            CostExplorerBilling::new(aws_sdk_costexplorer::Client::from_conf(billing_config)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_rejects_blank_secret() {
        let factory = AwsClientFactory::new(AdapterConfig::default());
        assert!(factory.connect(&Credentials::new("AKIDEXAMPLE", "")).is_err());
    }

    #[tokio::test]
    async fn test_connect_builds_clients_for_region() {
        let config = AdapterConfig {
            region: "ap-southeast-2".to_string(),
            ..AdapterConfig::default()
        };
        let factory = AwsClientFactory::new(config);
        let (store, _billing) = factory
            .connect(&Credentials::new("AKIDEXAMPLE", "secret"))
            .unwrap();
        assert_eq!(
            store.client().config().region().map(|r| r.to_string()),
            Some("ap-southeast-2".to_string())
        );
    }

    #[tokio::test]
    async fn test_connect_with_endpoint_override() {
        let config = AdapterConfig {
            endpoint_url: Some("http://localhost:9000".to_string()),
            billing_endpoint_url: Some("http://localhost:4566".to_string()),
            force_path_style: true,
            ..AdapterConfig::default()
        };
        let factory = AwsClientFactory::new(config);
        let (store, _billing) = factory
            .connect(&Credentials::new("AKIDEXAMPLE", "secret"))
            .unwrap();
        assert_eq!(
            store.client().config().region().map(|r| r.to_string()),
            Some("us-east-1".to_string())
        );
    }
}
