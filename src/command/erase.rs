use anyhow::Result;

use super::{open_credentials, Settings};

pub async fn run_erase(settings: &Settings) -> Result<()> {
    open_credentials(settings)?.clear()?;
    println!("✅ Nomie Server config erased.");
    Ok(())
}
