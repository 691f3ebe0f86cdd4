use aggregator::config::AggregatorConfig;
use aggregator::router::create_router;
use aggregator::state::AppState;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    tracing::info!("Starting vulnerability snapshot aggregator");

    let config = AggregatorConfig::from_env();
    tracing::info!(
        authenticated = config.nvd_api_key.is_some(),
        lookup_limit = config.nvd_lookup_limit,
        delay_ms = config.nvd_request_delay.as_millis() as u64,
        "per-item lookup pacing configured"
    );

    let addr = config.bind_addr;
    let state = AppState::new(config);
    let app = create_router(state);

    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
