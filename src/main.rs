use clap::Parser;
use cloud_adapter::config::credentials_from_env;
use cloud_adapter::utils::{logger, logger::TracingLogger, validation::Validate};
use cloud_adapter::{
    AdapterError, AwsClientFactory, Cli, CloudResourceAdapter, Command, CostQueryOutcome,
};
use std::sync::Arc;

const EXIT_FAILURE: i32 = 1;
const EXIT_COST_UNAVAILABLE: i32 = 2;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logging goes to stderr so command output stays clean on stdout
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    match run(&cli).await {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            tracing::error!("❌ {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(EXIT_FAILURE);
        }
    }

    Ok(())
}

async fn run(cli: &Cli) -> Result<i32, AdapterError> {
    let config = cli.adapter_config()?;
    config.validate()?;
    if cli.verbose {
        tracing::debug!("Adapter config: {:?}", config);
    }

    cli.command.validate_bucket()?;

    let mut adapter =
        CloudResourceAdapter::with_logger(AwsClientFactory::new(config), Arc::new(TracingLogger));
    adapter.initialize(credentials_from_env()?)?;

    match &cli.command {
        Command::Put { bucket, key, file } => {
            let data = tokio::fs::read(file).await?;
            let locator = adapter.upload_object(bucket, key, &data).await?;
            println!("{}", locator);
        }
        Command::Get { bucket, key } => {
            let body = adapter.fetch_object(bucket, key).await?;
            print!("{}", body);
        }
        Command::Delete { bucket, key } => {
            adapter.delete_object(bucket, key).await?;
            println!("✅ Deleted {}/{}", bucket, key);
        }
        Command::Cost(args) => {
            let query = args.to_query()?;
            let outcome = adapter.query_cost(&query).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if let CostQueryOutcome::Failure(failure) = &outcome {
                eprintln!("💡 {}", failure.message);
                return Ok(EXIT_COST_UNAVAILABLE);
            }
        }
    }

    Ok(0)
}
