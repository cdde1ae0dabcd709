//! 并发短码注册表
//!
//! 短码 → 记录的内存映射。查询持有读锁，插入/删除持有写锁。
//! `parking_lot::RwLock` 是公平锁，持续的读不会让写饿死，反之亦然。

use std::collections::HashMap;

use parking_lot::{RwLock, RwLockWriteGuard};
use tracing::trace;

use super::models::Record;

#[derive(Debug, Default)]
pub struct Registry {
    inner: RwLock<HashMap<String, Record>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(HashMap::with_capacity(capacity)),
        }
    }

    /// 仅当短码不存在时插入
    ///
    /// 检查与插入在同一把写锁内完成，两个并发调用者不可能拿到同一个短码。
    /// 返回 `false` 时注册表保持不变。
    pub fn insert_if_absent(&self, code: &str, record: Record) -> bool {
        let mut map = self.inner.write();
        if map.contains_key(code) {
            trace!("Short code already taken: {}", code);
            return false;
        }
        map.insert(code.to_string(), record);
        true
    }

    pub fn get(&self, code: &str) -> Option<Record> {
        self.inner.read().get(code).cloned()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.inner.read().contains_key(code)
    }

    pub fn delete(&self, code: &str) -> Option<Record> {
        self.inner.write().remove(code)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// 获取清理视图
    ///
    /// 返回的视图在整个生命周期内持有写锁，期间所有读写都会等待。
    /// 仅供过期清理使用。
    pub fn snapshot_for_sweep(&self) -> SweepView<'_> {
        SweepView {
            map: self.inner.write(),
        }
    }
}

/// 持有写锁的注册表视图
pub struct SweepView<'a> {
    map: RwLockWriteGuard<'a, HashMap<String, Record>>,
}

impl SweepView<'_> {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.map.iter().map(|(code, record)| (code.as_str(), record))
    }

    pub fn remove(&mut self, code: &str) -> Option<Record> {
        self.map.remove(code)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
