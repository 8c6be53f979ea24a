use anyhow::{Result, anyhow};
use std::fs;

use crate::core::AppConfig;
use crate::core::db::open_client_db;

pub async fn run(db: bool) -> Result<()> {
    if !db {
        return Err(anyhow!("Missing value for init \"--db\""));
    }

    let config = AppConfig::default();
    println!("Initializing db...");
    fs::create_dir_all(&config.storage_path)
        .unwrap_or_else(|err| println!("Ignoring storage directory create failed: {}", err));
    open_client_db(&config.db_path).await?;
    println!("Finished initializing db at {}", config.db_path);

    Ok(())
}
