use clap::Parser;
use icpscan::core::{export, targets, transport};
use icpscan::utils::{logger, validation::Validate};
use icpscan::{BatchRunner, CliConfig, IcpError, QueryEngine, Retryer, TokenManager};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting icpscan");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&config).await {
        tracing::error!("❌ Batch query failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(config: &CliConfig) -> icpscan::Result<()> {
    let categories = config.categories()?;
    let client = transport::build_client(config.proxy.as_deref())?;

    let targets = targets::parse_targets(&config.target)?;
    if targets.is_empty() {
        return Err(IcpError::Config {
            message: format!("no valid target in '{}'", config.target),
        });
    }
    tracing::info!(
        "querying {} target(s) across {} category(ies)",
        targets.len(),
        categories.len()
    );

    let token_manager = TokenManager::new(client.clone());
    let engine = QueryEngine::new(token_manager, client);
    let mut runner = BatchRunner::new(Retryer::new(engine));

    let report = runner.run(&targets, &categories).await;
    export::write_csv(&report, &config.output)?;

    if report.failures.is_empty() {
        tracing::info!("✅ Batch query completed, results saved to {}", config.output);
    } else {
        tracing::warn!(
            "⚠️ Batch query completed with {} failed target(s), results saved to {}",
            report.failures.len(),
            config.output
        );
    }
    println!("✅ Done, results saved to {}", config.output);
    Ok(())
}
