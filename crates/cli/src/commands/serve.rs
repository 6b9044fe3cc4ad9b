//! `vitrine serve` — run the gateway HTTP server.

use vitrine_config::AppConfig;

pub async fn run(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load()?;
    if let Some(port) = port {
        config.gateway.port = port;
    }

    vitrine_gateway::start(config).await
}
