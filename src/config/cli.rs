use crate::config::AdapterConfig;
use crate::domain::model::{CostQuery, GroupDefinition, Granularity, Metric, TimePeriod};
use crate::utils::error::Result;
use crate::utils::validation::validate_s3_bucket_name;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "cloud-adapter")]
#[command(about = "Object storage and cost-and-usage queries against AWS")]
pub struct Cli {
    #[arg(long, help = "TOML file with connection settings")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Region for the object store")]
    pub region: Option<String>,

    #[arg(long, help = "Endpoint override, e.g. http://localhost:9000")]
    pub endpoint_url: Option<String>,

    #[arg(long, help = "Use path-style bucket addressing")]
    pub force_path_style: bool,

    #[arg(long, help = "Emit JSON log lines")]
    pub json_logs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Upload a local file as an object
    Put {
        bucket: String,
        key: String,
        file: PathBuf,
    },
    /// Print an object's body as text
    Get { bucket: String, key: String },
    /// Delete an object
    Delete { bucket: String, key: String },
    /// Run a single-page cost-and-usage query
    Cost(CostArgs),
}

#[derive(Debug, Clone, clap::Args)]
pub struct CostArgs {
    #[arg(long, help = "Inclusive start date (YYYY-MM-DD)")]
    pub start: String,

    #[arg(long, help = "Exclusive end date (YYYY-MM-DD)")]
    pub end: String,

    #[arg(long, default_value = "DAILY")]
    pub granularity: String,

    #[arg(long = "metric", default_value = "UNBLENDED_COST", value_delimiter = ',')]
    pub metrics: Vec<String>,

    #[arg(long = "group-by", help = "TYPE:KEY, e.g. DIMENSION:SERVICE or TAG:team")]
    pub group_by: Vec<String>,

    #[arg(long)]
    pub next_page_token: Option<String>,
}

impl Command {
    /// Bucket addressed by the object commands.
    pub fn bucket(&self) -> Option<&str> {
        match self {
            Command::Put { bucket, .. }
            | Command::Get { bucket, .. }
            | Command::Delete { bucket, .. } => Some(bucket),
            Command::Cost(_) => None,
        }
    }

    pub fn validate_bucket(&self) -> Result<()> {
        match self.bucket() {
            Some(bucket) => validate_s3_bucket_name("bucket", bucket),
            None => Ok(()),
        }
    }
}

impl CostArgs {
    pub fn to_query(&self) -> Result<CostQuery> {
        let time_period = TimePeriod::parse(&self.start, &self.end)?;
        let granularity: Granularity = self.granularity.parse()?;
        let metrics = self
            .metrics
            .iter()
            .map(|m| m.parse::<Metric>())
            .collect::<Result<Vec<_>>>()?;

        let mut query = CostQuery::new(time_period, granularity, metrics);
        for group in &self.group_by {
            query = query.group_by(group.parse::<GroupDefinition>()?);
        }
        if let Some(token) = &self.next_page_token {
            query = query.next_page_token(token.clone());
        }
        Ok(query)
    }
}

impl Cli {
    /// File settings, then environment, then flags.
    pub fn adapter_config(&self) -> Result<AdapterConfig> {
        let base = match &self.config {
            Some(path) => AdapterConfig::from_file(path)?.with_env_overrides()?,
            None => AdapterConfig::from_env()?,
        };
        Ok(self.apply_flags(base))
    }

    fn apply_flags(&self, mut config: AdapterConfig) -> AdapterConfig {
        if let Some(region) = &self.region {
            config.region = region.clone();
        }
        if let Some(url) = &self.endpoint_url {
            config.endpoint_url = Some(url.clone());
        }
        if self.force_path_style {
            config.force_path_style = true;
        }
        config
    }
}
