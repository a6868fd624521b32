use blogicum::{AppState, config::AppConfig, create_router, db};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = AppConfig::load()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| settings.log_filter.clone().into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = db::setup_database(&settings).await?;
    let state = AppState::new(pool, settings.clone());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!(addr = %settings.server_addr, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
