use anyhow::Result;

use nomie_server_storage::ConnectionState;

use super::{open_engine, Settings};

pub async fn run_check(settings: &Settings) -> Result<()> {
    let mut engine = open_engine(settings)?;
    let result = engine.init(settings.options.clone()).await;

    match engine.state() {
        ConnectionState::Ready => println!("✅ Connected to Nomie Server"),
        ConnectionState::Unauthorized => println!("❌ Nomie Server rejected the API key"),
        ConnectionState::Unreachable => println!("❌ Nomie Server is unreachable"),
        state => println!("⚠️  Nomie Server not configured ({})", state),
    }

    result?;
    Ok(())
}
