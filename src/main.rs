use anyhow::Result;
use chatrelay::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
