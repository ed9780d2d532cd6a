use anyhow::Result;
use serde_json::Value;

use super::{connect, Settings};

pub async fn run_get(settings: &Settings, path: &str) -> Result<()> {
    let engine = connect(settings).await?;
    let document = engine.get(engine.base_path(path)).await;
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

pub async fn run_put(settings: &Settings, path: &str, content: &str) -> Result<()> {
    let document: Value =
        serde_json::from_str(content).unwrap_or_else(|_| Value::String(content.to_string()));

    let engine = connect(settings).await?;
    let reply = engine.put(engine.base_path(path), &document).await?;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}

pub async fn run_list(settings: &Settings, path: Option<&str>) -> Result<()> {
    let engine = connect(settings).await?;
    let files = engine.list(path).await?;
    println!("{}", serde_json::to_string_pretty(&files)?);
    Ok(())
}

pub async fn run_delete(settings: &Settings, path: &str) -> Result<()> {
    let engine = connect(settings).await?;
    let response = engine.delete(engine.base_path(path)).await?;
    let status = response.status();

    if status.is_success() {
        println!("✅ Deleted {} ({})", path, status);
    } else {
        println!("⚠️  Delete of {} answered {}", path, status);
    }
    Ok(())
}
