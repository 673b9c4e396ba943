// GitHub Login Server
//
// Serves the GitHub OAuth2 authorization-code flow on port 3000.
// Usage: github_oauth [host] [port]

use github_oauth::{config, start_server, Settings};
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let host = args.get(1).map(|s| s.as_str()).unwrap_or(config::DEFAULT_HOST);
    let port = args
        .get(2)
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(config::DEFAULT_PORT);

    let settings = Settings::load(Path::new(".env"))
        .map_err(|e| {
            tracing::error!("[ERROR] {}", e);
            e
        })?
        .with_bind(host, port);

    tracing::info!("[OK] GitHub OAuth configured for client {}", settings.credentials.client_id);
    println!("[server is up now ...]");

    start_server(settings).await?;

    Ok(())
}
