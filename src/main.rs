use anyhow::Result;
use tracing::info;

use dvoice_docs::config::Config;
use dvoice_docs::server::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dvoice_docs=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!("Starting documentation server");

    // Load configuration from environment
    let config = Config::from_env()?;
    info!(
        "Content from {}, OpenAPI spec {}",
        config.content_dir.display(),
        config.openapi_spec.display()
    );

    // Load content, translations, OpenAPI documents and search indexes
    let state = AppState::load(config)?;

    server::serve(state).await
}
