//! 时间类型模块
//!
//! 远端接口的过期时间一律使用 Unix 秒，这里提供：
//! - `EpochSecs`: 可序列化的秒级时间戳，用于传输和存储
//! - `Clock`: 取当前时间的入口，便于测试时固定时间

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Add;
use std::time::Duration;

// =========================================================
// EpochSecs - 可传输的时间戳类型
// =========================================================

/// 秒级时间戳
///
/// 内部存储为 `i64`，表示自 Unix 纪元以来的秒数
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct EpochSecs(i64);

impl EpochSecs {
    #[inline]
    pub const fn new(secs: i64) -> Self {
        Self(secs)
    }

    #[inline]
    pub const fn as_secs(&self) -> i64 {
        self.0
    }

    /// 当前时间
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    /// 以 `now` 为基准计算剩余秒数，已过期时返回 0
    pub fn max_age_from(&self, now: EpochSecs) -> i64 {
        (self.0 - now.0).max(0)
    }

    /// 以当前时间为基准计算剩余秒数
    pub fn max_age(&self) -> i64 {
        self.max_age_from(Self::now())
    }

    /// 转换为 chrono 时间（超出范围时返回 None）
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.0, 0)
    }
}

impl From<i64> for EpochSecs {
    fn from(secs: i64) -> Self {
        Self(secs)
    }
}

impl From<EpochSecs> for i64 {
    fn from(ts: EpochSecs) -> Self {
        ts.0
    }
}

impl Add<Duration> for EpochSecs {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0.saturating_add(i64::try_from(rhs.as_secs()).unwrap_or(i64::MAX)))
    }
}

// =========================================================
// Clock - 当前时间来源
// =========================================================

/// 当前时间来源
///
/// Cookie 过期判断依赖它，测试中可替换为固定时间
pub trait Clock {
    fn now(&self) -> EpochSecs;
}

/// 系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> EpochSecs {
        EpochSecs::now()
    }
}

/// 固定时钟
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub EpochSecs);

impl Clock for FixedClock {
    fn now(&self) -> EpochSecs {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_age_clamps_to_zero() {
        let now = EpochSecs::new(1_000);
        assert_eq!(EpochSecs::new(1_600).max_age_from(now), 600);
        assert_eq!(EpochSecs::new(900).max_age_from(now), 0);
    }

    #[test]
    fn test_add_duration() {
        let ts = EpochSecs::new(10) + Duration::from_secs(5);
        assert_eq!(ts.as_secs(), 15);
    }

    #[test]
    fn test_serde_is_transparent() {
        let ts: EpochSecs = serde_json::from_str("1700000000").unwrap();
        assert_eq!(ts.as_secs(), 1_700_000_000);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "1700000000");
    }
}
