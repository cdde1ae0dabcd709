//! 粗粒度时钟缓存
//!
//! 以秒为单位缓存当前时间，由后台任务每秒刷新一次。
//! 读取只是一次原子 load，不会在调用路径上查询系统时间。
//!
//! 使用前必须调用 [`ClockCache::start`]，否则 [`ClockCache::now`] 返回 0。

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::errors::{LinkError, Result};

/// 刷新间隔
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// 共享的秒级时钟
pub struct ClockCache {
    now: AtomicU32,
    started: AtomicBool,
    start_lock: Mutex<()>,
    /// 手动时钟不会启动后台刷新任务，只能通过 set/advance 推进
    manual: bool,
    shutdown_tx: watch::Sender<bool>,
}

impl ClockCache {
    /// 创建系统时钟（尚未启动）
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            now: AtomicU32::new(0),
            started: AtomicBool::new(false),
            start_lock: Mutex::new(()),
            manual: false,
            shutdown_tx,
        }
    }

    /// 创建手动时钟，初始值为 `initial`，视为已启动
    pub fn manual(initial: u32) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            now: AtomicU32::new(initial),
            started: AtomicBool::new(true),
            start_lock: Mutex::new(()),
            manual: true,
            shutdown_tx,
        }
    }

    /// 返回最近一次缓存的时间戳（秒）
    #[inline]
    pub fn now(&self) -> u32 {
        self.now.load(Ordering::Acquire)
    }

    /// 同 [`now`](Self::now)，但在 `start()` 之前调用时返回 `ClockNotStarted`
    pub fn try_now(&self) -> Result<u32> {
        if !self.started.load(Ordering::Acquire) {
            return Err(LinkError::clock_not_started(
                "ClockCache::start() must be called before reading the clock",
            ));
        }
        Ok(self.now())
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    pub fn is_manual(&self) -> bool {
        self.manual
    }

    /// 启动时钟
    ///
    /// 幂等：只有第一次调用生效。同步写入初始值，然后在当前 Tokio 运行时上
    /// 启动一个每秒刷新的后台任务，直到 [`stop`](Self::stop) 或时钟被释放。
    ///
    /// # Errors
    /// 不在 Tokio 运行时中调用时返回 `ClockNotStarted`。
    pub fn start(self: &Arc<Self>) -> Result<()> {
        if self.started.load(Ordering::Acquire) {
            return Ok(());
        }

        let _guard = self.start_lock.lock();
        if self.started.load(Ordering::Acquire) {
            return Ok(());
        }

        let handle = tokio::runtime::Handle::try_current().map_err(|e| {
            LinkError::clock_not_started(format!(
                "ClockCache requires a Tokio runtime to start its updater: {}",
                e
            ))
        })?;

        self.store(system_timestamp());

        // start() 之前已调用过 stop()：只写入初始值，不启动刷新任务
        if *self.shutdown_tx.borrow() {
            self.started.store(true, Ordering::Release);
            warn!("Clock cache was stopped before start, updater not spawned");
            return Ok(());
        }

        let clock = Arc::downgrade(self);
        let shutdown_rx = self.shutdown_tx.subscribe();
        handle.spawn(Self::updater(clock, shutdown_rx));

        self.started.store(true, Ordering::Release);
        info!("Clock cache started at {}", self.now());
        Ok(())
    }

    /// 停止后台刷新任务，之后的读取返回最后一次缓存的值
    ///
    /// 在 `start()` 之前调用同样生效，之后的 `start()` 不会再启动刷新任务。
    pub fn stop(&self) {
        if self.shutdown_tx.send_replace(true) {
            debug!("Clock cache already stopped");
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// 设置手动时钟的当前值
    pub fn set(&self, timestamp: u32) {
        if !self.manual {
            warn!("Ignoring ClockCache::set on a system clock");
            return;
        }
        self.now.store(timestamp, Ordering::Release);
    }

    /// 推进手动时钟
    pub fn advance(&self, secs: u32) {
        if !self.manual {
            warn!("Ignoring ClockCache::advance on a system clock");
            return;
        }
        // 饱和加法，溢出时停在 u32::MAX 而不是回绕到 0
        let _ = self
            .now
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |now| {
                Some(now.saturating_add(secs))
            });
    }

    /// 只前进不后退，系统时钟回拨时保持旧值
    fn store(&self, timestamp: u32) {
        self.now.fetch_max(timestamp, Ordering::AcqRel);
    }

    async fn updater(clock: Weak<ClockCache>, mut shutdown_rx: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(REFRESH_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(clock) = clock.upgrade() else {
                        break;
                    };
                    clock.store(system_timestamp());
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        debug!("Clock updater stopped");
    }
}

impl Default for ClockCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ClockCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClockCache")
            .field("now", &self.now())
            .field("started", &self.is_started())
            .field("manual", &self.manual)
            .finish()
    }
}

fn system_timestamp() -> u32 {
    chrono::Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32
}
