use serde::{Deserialize, Serialize};

/// 短码对应的记录，插入后不可修改，只能被删除
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub resource: String,
    /// 创建时间（秒级 Unix 时间戳，取自 ClockCache）
    pub created_at: u32,
}

impl Record {
    pub fn new(resource: impl Into<String>, created_at: u32) -> Self {
        Self {
            resource: resource.into(),
            created_at,
        }
    }

    /// 相对于 `now` 的存活秒数，时钟早于创建时间时按 0 计算
    #[inline]
    pub fn age(&self, now: u32) -> u32 {
        now.saturating_sub(self.created_at)
    }

    /// 存活时间达到保留窗口即视为过期
    #[inline]
    pub fn is_expired(&self, now: u32, retention_secs: u32) -> bool {
        self.age(now) >= retention_secs
    }
}

/// 单次清理的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: usize,
    pub remaining: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_saturates() {
        let record = Record::new("https://example.com", 100);
        assert_eq!(record.age(150), 50);
        assert_eq!(record.age(50), 0);
    }

    #[test]
    fn test_expiry_boundary() {
        let record = Record::new("https://example.com", 1_000);
        assert!(!record.is_expired(1_000 + 10_799, 10_800));
        assert!(record.is_expired(1_000 + 10_800, 10_800));
    }
}
