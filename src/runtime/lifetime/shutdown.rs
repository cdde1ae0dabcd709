use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::system::ClockCache;

/// 单个任务超时时间（秒）
const TASK_TIMEOUT_SECS: u64 = 10;

/// 等待 Ctrl+C（Unix 下还包括 SIGTERM）
pub async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => log_ctrl_c(result),
                    _ = sigterm.recv() => info!("SIGTERM received, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                log_ctrl_c(tokio::signal::ctrl_c().await);
            }
        }
    }

    #[cfg(not(unix))]
    log_ctrl_c(tokio::signal::ctrl_c().await);
}

fn log_ctrl_c(result: std::io::Result<()>) {
    match result {
        Ok(()) => info!("Shutdown signal received, stopping background tasks..."),
        Err(e) => warn!(
            "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
            e
        ),
    }
}

/// 停止过期清理任务和时钟
pub async fn stop_background_tasks(
    sweeper_stop: tokio::sync::watch::Sender<bool>,
    sweeper_task: JoinHandle<()>,
    clock: &ClockCache,
) {
    let _ = sweeper_stop.send(true);
    match timeout(Duration::from_secs(TASK_TIMEOUT_SECS), sweeper_task).await {
        Ok(Ok(())) => info!("Expired link sweeper stopped"),
        Ok(Err(e)) => error!("Expired link sweeper exited abnormally: {}", e),
        Err(_) => error!(
            "Expired link sweeper did not stop within {} seconds",
            TASK_TIMEOUT_SECS
        ),
    }

    clock.stop();
}
