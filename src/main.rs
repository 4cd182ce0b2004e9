use tracing::info;

use sharefolder::web::WebServer;
use sharefolder::Config;

#[tokio::main]
async fn main() -> sharefolder::Result<()> {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.validate()?;

    // Initialize logging
    if let Err(e) = sharefolder::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        sharefolder::logging::init_console_only(&config.logging.level);
    }

    info!(
        "sharefolder starting on {}:{}",
        config.server.host, config.server.port
    );

    WebServer::new(&config)?.run().await?;
    Ok(())
}
