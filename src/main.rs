mod config;

mod init;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    init::main().await
}
