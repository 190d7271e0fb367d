use std::{env, sync::Arc};

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use lfb_api::{HttpApi, StatusBoard};
use lfb_core::{Dashboard, DashboardConfig, WallClock};
use lfb_fetch::{FetcherConfig, HttpFetcher};
use lfb_model::DEFAULT_AGENT_PREFIX;
use lfb_observe::{LoggerConfig, logger_init};

const DEFAULT_LISTEN: &str = "127.0.0.1:8080";

/// Usage: `dashboard [CI_BASE_URL] [LISTEN_ADDR]`
///
/// `LFB_LOG` sets the filter directive, `LFB_LOG_FORMAT` picks `text` or `json`.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 1) Logger
    let level = env::var("LFB_LOG").unwrap_or_else(|_| "info".into());
    let mut log_cfg = LoggerConfig::with_level(level);
    if let Ok(format) = env::var("LFB_LOG_FORMAT") {
        log_cfg.format = format.parse()?;
    }
    logger_init(&log_cfg)?;

    // 2) Configuration
    let mut args = env::args().skip(1);
    let fetch_cfg = args.next().map(FetcherConfig::new).unwrap_or_default();
    let listen = args.next().unwrap_or_else(|| DEFAULT_LISTEN.to_string());

    let config = DashboardConfig {
        agent_prefix: DEFAULT_AGENT_PREFIX.to_string(),
        ..Default::default()
    };
    info!(base_url = %fetch_cfg.base_url, %listen, "configured");

    // 3) Board + page server
    let board = StatusBoard::new();
    let router = HttpApi::new(board.clone()).router();
    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .with_context(|| format!("binding {listen}"))?;

    let shutdown = CancellationToken::new();
    let server = {
        let token = shutdown.clone();
        tokio::spawn(async move {
            let res = axum::serve(listener, router)
                .with_graceful_shutdown(token.cancelled_owned())
                .await;
            if let Err(e) = res {
                error!(error = %e, "page server failed");
            }
        })
    };

    // 4) Scheduler
    let fetcher = Arc::new(HttpFetcher::new(&fetch_cfg)?);
    let dashboard = Dashboard::new(
        config,
        Arc::new(WallClock::new()),
        Arc::new(board),
        fetcher.clone(),
        fetcher,
    )?;
    let scheduler = tokio::spawn(dashboard.run(shutdown.clone()));

    info!("dashboard running, press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;
    info!("shutting down...");

    shutdown.cancel();
    scheduler.await?;
    server.await?;
    Ok(())
}
