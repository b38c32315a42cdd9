//! quickadd: one free-form Vietnamese or English sentence in, one
//! structured task, event or transaction record out.

pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;
pub mod quota;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. Call once at startup.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("quickadd starting v{}", config::APP_VERSION);
}
