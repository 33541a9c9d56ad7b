//! formsync Agent - drains the durable save queue of a prior session
//!
//! Runs the startup-flush path on its own: load the persisted queue,
//! deliver what it can, leave backoff/exhausted jobs in place, and report
//! the outcome. Optionally polls one report to completion when
//! `FORMSYNC_REPORT_ID` is set.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use formsync_core::application::{PollConfig, QueueConfig, ReportPoller, RetryQueue};
use formsync_core::port::connectivity::WatchConnectivityProbe;
use formsync_core::port::id_provider::UuidProvider;
use formsync_core::port::time_provider::SystemTimeProvider;
use formsync_infra_file::FileQueueStore;
use formsync_infra_http::HttpTransport;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_QUEUE_PATH: &str = "~/.formsync/queue.json";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let log_format = std::env::var("FORMSYNC_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("formsync=info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("formsync agent v{} starting...", VERSION);

    // 2. Load configuration
    let base_url = std::env::var("FORMSYNC_API_URL")
        .map_err(|_| anyhow::anyhow!("FORMSYNC_API_URL is not set"))?;
    let token = std::env::var("FORMSYNC_API_TOKEN").ok();
    let queue_path = std::env::var("FORMSYNC_QUEUE_PATH")
        .unwrap_or_else(|_| shellexpand::tilde(DEFAULT_QUEUE_PATH).into_owned());

    info!(queue_path = %queue_path, base_url = %base_url, "Configuration loaded");

    // 3. Setup dependencies (DI wiring)
    let store = Arc::new(FileQueueStore::new(queue_path));
    let transport = Arc::new(HttpTransport::new(base_url, token));
    // The agent only runs when invoked, so it reports itself online; the
    // transport surfaces actual unreachability as per-job failures.
    let probe = Arc::new(WatchConnectivityProbe::new(true));
    let time_provider = Arc::new(SystemTimeProvider);

    let queue = RetryQueue::new(
        store,
        transport.clone(),
        probe,
        Arc::new(UuidProvider),
        time_provider,
        QueueConfig::default(),
    );

    // 4. Drain the queue
    let pending = queue.len().await;
    if pending == 0 {
        info!("Queue is empty, nothing to drain");
    } else {
        info!(pending = pending, "Draining save queue...");
        let outcome = queue.flush().await?;
        info!(
            submitted = outcome.submitted,
            failed = outcome.failed,
            skipped_waiting = outcome.skipped_waiting,
            skipped_exhausted = outcome.skipped_exhausted,
            remaining = outcome.remaining,
            "Drain complete"
        );

        if outcome.skipped_exhausted > 0 {
            warn!(
                stuck = outcome.skipped_exhausted,
                "Jobs exhausted their retry attempts; rerun with FORMSYNC_RESET_EXHAUSTED=1 to retry them"
            );
            if std::env::var("FORMSYNC_RESET_EXHAUSTED").is_ok() {
                let reset = queue.reset_exhausted().await?;
                info!(reset = reset, "Exhausted jobs reset, draining again...");
                queue.flush().await?;
            }
        }
    }

    // 5. Optionally poll one report to completion
    if let Ok(report_id) = std::env::var("FORMSYNC_REPORT_ID") {
        info!(report_id = %report_id, "Polling report...");
        let poller = ReportPoller::new(transport, PollConfig::default());
        let handle = poller
            .poll(&report_id, |progress| info!(progress = progress, "Report progress"))
            .await?;
        info!(url = ?handle.url, "Report ready");
    }

    info!("Done.");
    Ok(())
}
