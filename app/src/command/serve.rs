use lingua_api::{ApiState, start_http_server};
use lingua_config::Config;
use lingua_core::HistoryStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use super::{build_agent, build_provider, build_store};

/// Longest pause between sweeps of expired conversations.
const MAX_PURGE_INTERVAL: Duration = Duration::from_secs(600);

#[derive(Debug, Clone)]
pub struct ServeInput {
    /// Overrides `server.bind`
    pub bind: Option<String>,
}

/// Runs the HTTP API until Ctrl-C.
///
/// Expired conversations are swept in the background so idle rows do not
/// accumulate in the store.
#[derive(Debug, Clone, Copy)]
pub struct ServeStrategy;

fn spawn_purge_task(
    store: Arc<dyn HistoryStore>,
    every: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match store.purge_expired().await {
                        Ok(0) => {}
                        Ok(purged) => info!("Purged {purged} expired conversations"),
                        Err(e) => warn!("Failed to purge expired conversations: {e}"),
                    }
                }
                _ = async { shutdown_rx.wait_for(|v| *v).await.map(|_| ()) } => break,
            }
        }
    })
}

impl super::CommandStrategy for ServeStrategy {
    type Input = ServeInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        let bind: SocketAddr = input
            .bind
            .as_deref()
            .unwrap_or(&config.server.bind)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address: {e}"))?;

        let provider = build_provider(&config)?;
        let store = build_store(&config).await?;
        let agent = build_agent(&config, provider, Arc::clone(&store))?;
        let state = Arc::new(ApiState::new(agent, config.translate));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let purge = config.history.ttl().map(|ttl| {
            spawn_purge_task(
                Arc::clone(&store),
                ttl.min(MAX_PURGE_INTERVAL),
                shutdown_rx.clone(),
            )
        });

        let (addr, server) = start_http_server(bind, Arc::clone(&state), shutdown_rx).await?;
        println!("🌐 Listening on http://{addr}/api");

        tokio::signal::ctrl_c().await?;
        info!("Shutting down");
        shutdown_tx.send(true)?;

        server.await?;
        state.agent.drain_evals().await;
        if let Some(purge) = purge {
            purge.await?;
        }
        Ok(())
    }
}
