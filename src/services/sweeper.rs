//! 过期清理任务
//!
//! 周期性扫描注册表，删除存活时间达到保留窗口的记录。
//! 整次扫描与删除在同一个写锁临界区内完成。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::LinksConfig;
use crate::errors::Result;
use crate::storage::{Registry, SweepReport};
use crate::system::ClockCache;

pub struct ExpirationSweeper {
    registry: Arc<Registry>,
    clock: Arc<ClockCache>,
    /// 保留窗口（秒）
    retention_secs: u32,
    /// 清理周期
    interval: Duration,
}

impl ExpirationSweeper {
    pub fn new(
        registry: Arc<Registry>,
        clock: Arc<ClockCache>,
        retention_secs: u32,
        interval: Duration,
    ) -> Self {
        Self {
            registry,
            clock,
            retention_secs,
            interval,
        }
    }

    pub fn from_config(
        config: &LinksConfig,
        registry: Arc<Registry>,
        clock: Arc<ClockCache>,
    ) -> Self {
        Self::new(
            registry,
            clock,
            config.retention_secs,
            config.sweep_interval(),
        )
    }

    pub fn retention_secs(&self) -> u32 {
        self.retention_secs
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 以时钟缓存的当前值执行一次清理
    pub fn sweep_once(&self) -> SweepReport {
        self.sweep_at(self.clock.now())
    }

    /// 以给定的 `now` 执行一次清理
    ///
    /// 删除所有 `now - created_at >= retention_secs` 的记录。
    pub fn sweep_at(&self, now: u32) -> SweepReport {
        let mut view = self.registry.snapshot_for_sweep();

        let expired: Vec<String> = view
            .iter()
            .filter(|(_, record)| record.is_expired(now, self.retention_secs))
            .map(|(code, _)| code.to_string())
            .collect();

        for code in &expired {
            view.remove(code);
        }

        let report = SweepReport {
            removed: expired.len(),
            remaining: view.len(),
        };
        drop(view);

        if report.removed > 0 {
            info!(
                "Expired link sweep removed {} links ({} remaining)",
                report.removed, report.remaining
            );
        } else {
            debug!("Expired link sweep found nothing ({} links)", report.remaining);
        }

        report
    }

    /// 启动后台清理任务
    ///
    /// 先确保时钟已启动，否则所有记录都会按 `now = 0` 计算。
    /// 第一次清理在一个周期之后执行。
    ///
    /// # Errors
    /// 时钟无法启动（不在 Tokio 运行时中）时返回 `ClockNotStarted`。
    pub fn spawn(self: Arc<Self>) -> Result<SweeperHandle> {
        self.clock.start()?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let interval = self.interval;
        let task = tokio::spawn(self.run(shutdown_rx));

        info!(
            "Expired link sweeper started (interval: {}s)",
            interval.as_secs()
        );

        Ok(SweeperHandle { shutdown_tx, task })
    }

    async fn run(self: Arc<Self>, mut shutdown_rx: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // 跳过立即触发的第一次 tick
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep_once();
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        debug!("Expired link sweeper stopped");
    }
}

/// 后台清理任务的句柄
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// 发送停止信号并等待任务退出
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            warn!("Expired link sweeper exited abnormally: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// 拆分为停止信号和任务句柄，便于运行时监控任务是否意外退出
    pub fn into_parts(self) -> (watch::Sender<bool>, JoinHandle<()>) {
        (self.shutdown_tx, self.task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Record;

    const WINDOW: u32 = 10_800;

    fn sweeper(now: u32) -> (ExpirationSweeper, Arc<Registry>, Arc<ClockCache>) {
        let registry = Arc::new(Registry::new());
        let clock = Arc::new(ClockCache::manual(now));
        let sweeper = ExpirationSweeper::new(
            Arc::clone(&registry),
            Arc::clone(&clock),
            WINDOW,
            Duration::from_secs(1800),
        );
        (sweeper, registry, clock)
    }

    #[test]
    fn test_boundary() {
        let t = 1_700_000_000;
        let (sweeper, registry, _) = sweeper(t);
        registry.insert_if_absent("exact0", Record::new("https://a.com", t - WINDOW));
        registry.insert_if_absent("minus1", Record::new("https://b.com", t - WINDOW + 1));

        let report = sweeper.sweep_once();
        assert_eq!(report, SweepReport { removed: 1, remaining: 1 });
        assert!(registry.get("exact0").is_none());
        assert!(registry.get("minus1").is_some());
    }

    #[test]
    fn test_sweep_empty_registry() {
        let (sweeper, _, _) = sweeper(100);
        assert_eq!(sweeper.sweep_once(), SweepReport::default());
    }

    #[test]
    fn test_future_records_are_kept() {
        let (sweeper, registry, _) = sweeper(100);
        registry.insert_if_absent("future", Record::new("https://a.com", 500));
        assert_eq!(sweeper.sweep_once().removed, 0);
        assert!(registry.contains("future"));
    }

    #[tokio::test]
    async fn test_spawn_and_shutdown() {
        let registry = Arc::new(Registry::new());
        let clock = Arc::new(ClockCache::manual(WINDOW * 2));
        registry.insert_if_absent("old000", Record::new("https://a.com", 0));

        let sweeper = Arc::new(ExpirationSweeper::new(
            Arc::clone(&registry),
            clock,
            WINDOW,
            Duration::from_millis(50),
        ));
        let handle = sweeper.spawn().unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(registry.get("old000").is_none());

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_spawn_starts_clock() {
        let registry = Arc::new(Registry::new());
        let clock = Arc::new(ClockCache::new());
        let sweeper = Arc::new(ExpirationSweeper::new(
            registry,
            Arc::clone(&clock),
            WINDOW,
            Duration::from_secs(3600),
        ));

        let handle = sweeper.spawn().unwrap();
        assert!(clock.is_started());
        assert!(clock.now() > 0);

        handle.shutdown().await;
        clock.stop();
    }
}
