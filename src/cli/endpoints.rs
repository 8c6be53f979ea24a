use anyhow::Result;

use crate::core::AppConfig;
use crate::origin::resolve_endpoints;

pub async fn run() -> Result<()> {
    super::init_tracing();
    let config = AppConfig::default();
    let endpoints = resolve_endpoints(&config).await;
    println!("{}", serde_json::to_string_pretty(&endpoints)?);
    Ok(())
}
