//! Health command implementation

use anyhow::{bail, Context, Result};
use ferrea_core::{Aggregator, RequestContext, Settings};

/// Probe every configured provider; fails unless all are healthy
pub async fn health(settings: &Settings, json: bool) -> Result<()> {
    let aggregator = Aggregator::from_settings(settings).context("Failed to build providers")?;
    let ctx = RequestContext::generate(settings.app_name.as_str());
    let health = aggregator.check_health(&ctx).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&health)?);
    } else {
        for entity in &health.entities {
            let state = if entity.healthy { "healthy" } else { "unhealthy" };
            println!("{:<12} {}", entity.name, state);
        }
        println!("Status:      {:?}", health.status);
    }

    if !health.status.is_healthy() {
        bail!("One or more providers are unhealthy");
    }
    Ok(())
}
