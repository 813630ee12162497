use taskflow_assistant::{api::{start_server, ApiState}, AssistantConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AssistantConfig::from_env()?;

    info!("🚀 TaskFlow Assistant - API Server");
    info!("📍 Port: {}", config.port);
    info!(
        utc_offset = %config.utc_offset,
        reply_base_ms = config.reply_delay.base_ms,
        reply_jitter_ms = config.reply_delay.jitter_ms,
        "Assistant configured"
    );

    let state = ApiState::from_config(&config);

    info!("📡 Starting API server...");

    start_server(state, config.port).await?;

    Ok(())
}
