use std::time::Duration;

use application::{CartApp, CartAppConfig};
use config::Config;
use domain::Identity;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env(None);
    tracing::info!(?config, "starting cart sync engine");

    let app = CartApp::start(
        &CartAppConfig {
            cart_api_url: config.cart_api_url.clone(),
            catalog_api_url: config.catalog_api_url.clone(),
            guest_storage_dir: config.guest_storage_dir.clone(),
            save_debounce: Duration::from_millis(config.save_debounce_ms),
            save_timeout: Duration::from_secs(config.save_timeout_secs),
        },
        // Until the identity collaborator reports otherwise, the session
        // is anonymous.
        Identity::guest(),
    )?;

    tokio::signal::ctrl_c().await?;

    // Page-teardown analog: best-effort flush of unsynced changes before
    // the process goes away.
    app.handle.teardown().await?;
    app.task.await?;

    tracing::info!("cart sync engine stopped");
    Ok(())
}
