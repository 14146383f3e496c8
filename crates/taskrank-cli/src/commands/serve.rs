use std::net::SocketAddr;
use std::sync::Arc;

use taskrank_core::Config;
use taskrank_server::AppState;
use tracing::info;

pub fn run(bind: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let addr: SocketAddr = bind
        .parse()
        .map_err(|e| format!("invalid bind address '{bind}': {e}"))?;

    let state = AppState::from_config(&config)?;
    info!(
        strategy = %state.default_strategy,
        database = %config.database_path()?.display(),
        "starting server"
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(taskrank_server::serve(addr, Arc::new(state)))?;
    Ok(())
}
