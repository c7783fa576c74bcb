use anyhow::Context;
use campaign_indexer_server::{run, Settings};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let settings = Settings::new().context("failed to parse config")?;
    run(settings).await
}
