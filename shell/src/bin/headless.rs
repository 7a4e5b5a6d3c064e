//! Headless notification host.
//!
//! Loads the history file, keeps the center alive until Ctrl-C, then writes
//! the history back.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use notification_shell_lib::NotificationCenter;
use notification_shell_lib::NotificationConfig;
use notification_shell_lib::bridge::FsBridge;
use notification_shell_lib::headless::HeadlessRenderer;
use notification_shell_lib::icon::MarkupIcons;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting notification center (headless mode)");

    let config = NotificationConfig::load()?;
    let center = NotificationCenter::new(
        &config,
        Arc::new(HeadlessRenderer::default()),
        Arc::new(MarkupIcons),
        Arc::new(FsBridge),
    );

    center.parse().await;
    tracing::info!(
        path = %center.history_file().display(),
        entries = center.history_snapshot().len(),
        "Notification center ready"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, saving history");

    if !center.backup().await {
        anyhow::bail!("failed to save {}", center.history_file().display());
    }
    Ok(())
}
