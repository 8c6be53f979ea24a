use anyhow::Result;
use calsnap::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
