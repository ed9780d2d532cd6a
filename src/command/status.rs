use anyhow::Result;

use super::{open_credentials, Settings};

pub async fn run_status(settings: &Settings) -> Result<()> {
    let credentials = open_credentials(settings)?.load(None, None);

    match credentials.endpoint_url.as_deref() {
        Some(url) => println!("Server URL: {}", url),
        None => println!("Server URL: (not set)"),
    }
    if credentials.token.is_some() {
        println!("API key:    stored");
    } else {
        println!("API key:    (not set)");
    }

    if !credentials.is_complete() {
        println!("   Run any storage command to enter server settings.");
    }

    Ok(())
}
