use anyhow::Result;
use tracing::info;
use travel_translate_gateway::{server, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when variables come from the environment)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("travel_translate_gateway=info".parse()?),
        )
        .init();

    info!("Starting travel translation gateway");

    let config = Config::from_env()?;
    info!(
        port = config.port,
        model = %config.hf_default_model,
        cache_max_entries = config.cache_max_entries.get(),
        "Configuration loaded"
    );

    server::serve(config).await
}
