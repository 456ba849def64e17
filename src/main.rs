use std::sync::Arc;

use anyhow::{Error, Result};
use notification_service::{
    api::{AppState, run_api_server},
    clients::mailer::select_transport,
    config::Config,
    dispatcher::{Dispatcher, spawn_retry_sweep},
    queue::RetryQueue,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::load()?;
    init_tracing(&config);

    let mailer = select_transport(&config)?;

    match mailer.verify().await {
        Ok(_) => info!(transport = mailer.name(), "Mail transport verified"),
        Err(e) => warn!(
            transport = mailer.name(),
            error = %e,
            "Mail transport verification failed, continuing startup"
        ),
    }

    let dispatcher = Arc::new(Dispatcher::new(
        mailer,
        Arc::new(RetryQueue::new()),
        config.sender(),
        config.retry_config(),
    ));

    let sweep = spawn_retry_sweep(Arc::clone(&dispatcher));

    let state = Arc::new(AppState { dispatcher });
    let result = run_api_server(&config, state).await;

    sweep.abort();
    info!("Notification service stopped");

    result
}

fn init_tracing(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);

    if config.log_format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}
