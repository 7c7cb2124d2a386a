use std::sync::Arc;

use modbot_core::{config::Config, store::StateStore};

#[tokio::main]
async fn main() -> Result<(), modbot_core::Error> {
    modbot_core::logging::init("modbot")?;

    let cfg = Arc::new(Config::load()?);

    // A state file that exists but cannot be read is fatal: refuse to start
    // rather than overwrite admin-curated lists.
    let store = Arc::new(StateStore::open(&cfg.data_file)?);

    modbot_telegram::router::run_polling(cfg, store)
        .await
        .map_err(|e| modbot_core::Error::External(format!("telegram bot failed: {e}")))?;

    tracing::info!("modbot stopped");
    Ok(())
}
