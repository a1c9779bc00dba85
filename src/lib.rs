pub mod api;
pub mod clock;
pub mod config;
pub mod db;
pub mod models;
pub mod scheduling;

use tracing_subscriber::EnvFilter;

/// Run the service: load config, open the database, serve until ctrl-c.
pub async fn run() -> Result<(), String> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let cfg = config::Config::from_env().map_err(|e| e.to_string())?;

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    // Open once at startup so migrations run before the first request.
    db::open_database(&cfg.database_path).map_err(|e| e.to_string())?;

    let ctx = api::ApiContext::new(cfg.database_path.clone());
    let mut server = api::start_api_server(ctx, cfg.host, cfg.port).await?;

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for shutdown signal: {e}"))?;

    server.shutdown();
    Ok(())
}
