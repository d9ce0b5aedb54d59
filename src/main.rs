use anyhow::Context;
use clap::Parser;
use rating_monitor::utils::{logger, validation::Validate};
use rating_monitor::{AppConfig, CliArgs, DirectionService, HttpRatingSource, InMemoryStore};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    logger::init_cli_logger(args.verbose, args.json_logs);
    tracing::info!("Starting rating-monitor");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {:#}", e);
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    };

    let store = Arc::new(InMemoryStore::new());
    config
        .seed_store(&store)
        .await
        .context("failed to seed direction catalog")?;

    let source = HttpRatingSource::from_config(&config.source).context("failed to build rating source")?;
    let service = DirectionService::new(
        store.clone(),
        store.clone(),
        store,
        Arc::new(source),
        config.engine_config(),
    );

    let user_id = config.user.id;
    service
        .set_for_user(user_id, &config.selected_directions())
        .await
        .context("failed to store direction selection")?;

    match service.get_for_user_with_rating(user_id).await {
        Ok(result) => {
            let output = if args.pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            println!("{}", output);
            tracing::info!("✅ Rating check completed");
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Rating check failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(2);
        }
    }
}

fn load_config(args: &CliArgs) -> anyhow::Result<AppConfig> {
    let config = AppConfig::from_file(&args.config)
        .with_context(|| format!("failed to read {}", args.config.display()))?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}
