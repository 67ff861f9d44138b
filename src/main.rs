//! Telnet Chat Server - Entry Point
//!
//! Loads configuration and runs the server until Ctrl-C.

use std::env;

use tracing_subscriber::EnvFilter;

use telnet_chat::config::{Config, DEFAULT_CONFIG_PATH};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=telnet_chat=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("telnet_chat=info")),
        )
        .init();

    // Get config path from command line or use default
    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = Config::load_or_default(&config_path);
    telnet_chat::run(config).await?;

    Ok(())
}
