//! Report polling scenarios: progress reporting, transient fetch errors,
//! and terminal outcomes in one loop.

mod support;

use formsync_core::application::{PollConfig, ReportPoller};
use formsync_core::domain::ReportHandle;
use formsync_core::error::AppError;
use std::sync::Arc;
use support::ScriptedTransport;

fn status(progress: Option<u8>, url: Option<&str>, tag: Option<&str>) -> ReportHandle {
    ReportHandle {
        id: "report-1".to_string(),
        url: url.map(String::from),
        progress,
        status: tag.map(String::from),
    }
}

#[tokio::test(start_paused = true)]
async fn bumpy_generation_run_reaches_the_url() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.script_statuses(vec![
        Ok(status(Some(10), None, None)),
        Err(AppError::Transport("connection reset".to_string())),
        Ok(status(Some(40), None, None)),
        Err(AppError::Transport("connection reset".to_string())),
        Ok(status(Some(40), None, None)),
        Ok(status(Some(100), Some("https://example.com/report.pdf"), None)),
    ]);

    let poller = ReportPoller::new(
        transport,
        PollConfig {
            interval_ms: 1000,
            timeout_ms: 60_000,
        },
    );

    let mut seen = Vec::new();
    let handle = poller.poll("report-1", |p| seen.push(p)).await.unwrap();

    assert_eq!(handle.url.as_deref(), Some("https://example.com/report.pdf"));
    // Fetch errors produce no progress callback; repeats pass through.
    assert_eq!(seen, vec![10, 40, 40, 100]);
}

#[tokio::test(start_paused = true)]
async fn generation_failure_cuts_the_loop_short() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.script_statuses(vec![
        Ok(status(Some(10), None, None)),
        Ok(status(None, None, Some("failed"))),
    ]);

    let poller = ReportPoller::new(transport, PollConfig::default());
    let err = poller.poll("report-1", |_| {}).await.unwrap_err();
    assert!(matches!(err, AppError::ReportFailed));
}

#[tokio::test(start_paused = true)]
async fn stalled_generation_times_out() {
    // Unscripted fetches repeat the last pending status forever.
    let transport = Arc::new(ScriptedTransport::default());
    transport.script_statuses(vec![Ok(status(Some(10), None, None))]);

    let poller = ReportPoller::new(
        transport,
        PollConfig {
            interval_ms: 1000,
            timeout_ms: 5000,
        },
    );

    let err = poller.poll("report-1", |_| {}).await.unwrap_err();
    assert!(matches!(err, AppError::PollTimeout { timeout_ms: 5000 }));
}
