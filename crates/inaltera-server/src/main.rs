use anyhow::Result;

use inaltera_server::{InalteraServer, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let config = match std::env::var("INALTERA_CONFIG") {
        Ok(path) => ServerConfig::load(path)?,
        Err(_) => ServerConfig::default(),
    };

    InalteraServer::new(config).serve().await?;
    Ok(())
}
