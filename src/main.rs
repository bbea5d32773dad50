//! reviewharvest - guest review harvester for hotel listing pages.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    reviewharvest::cli::run().await
}
