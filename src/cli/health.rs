use anyhow::{Result, bail};

use crate::assistant::AssistantClient;
use crate::core::AppConfig;
use crate::origin::resolve_endpoints;

pub async fn run() -> Result<()> {
    super::init_tracing();
    let config = AppConfig::default();
    let endpoints = resolve_endpoints(&config).await;
    let client = AssistantClient::from_endpoints(&endpoints);

    if !client.health().await {
        bail!("Calendar assistant at {} is not healthy", client.base_url());
    }
    println!("Calendar assistant at {} is healthy", client.base_url());
    Ok(())
}
