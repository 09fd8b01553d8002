use anyhow::Result;
use payment_rotations::config::AppConfig;
use payment_rotations::repo::rotations_repo::PgRotationStore;
use payment_rotations::service::rotation_service::PaymentRotationService;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .connect(&cfg.database_url)
        .await?;

    let store = PgRotationStore::load(pool, cfg.tables()?).await?;
    let exclusions = cfg.exclusions()?;

    let mut service = PaymentRotationService::new(Arc::new(cfg.column_spec()?), store)?
        .with_zero_ratio_policy(cfg.zero_ratio_policy()?)
        .with_context(cfg.rotation_context());

    let matched = service.rotations(&exclusions).await?.len();
    tracing::info!("{} rotations matched, {} accounts excluded", matched, exclusions.len());

    let checkout = service.checkout_data(&exclusions).await?;
    println!("{}", serde_json::to_string_pretty(&checkout)?);
    Ok(())
}
