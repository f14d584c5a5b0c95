use child_profile_service::config::ProfileConfig;
use child_profile_service::services::init_metrics;
use child_profile_service::startup::Application;
use dotenvy::dotenv;
use service_core::observability::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Fail fast: missing DB_INTERACT_SERVICE_URL must abort startup, not
    // surface at the first proxied request.
    let config = ProfileConfig::from_env().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(&config.log_level);
    init_metrics();

    info!(
        db_interact_url = %config.db_interact.url,
        "Child Profile Service starting up"
    );

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        anyhow::anyhow!("Failed to build application: {}", e)
    })?;

    app.run_until_stopped().await?;

    Ok(())
}
