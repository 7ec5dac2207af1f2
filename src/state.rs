//! 资源状态
//!
//! 每个资源访问器持有一份 `ResourceState`：加载标记、错误消息、成功消息。
//! 加载标记通过 RAII 守卫管理，提前返回或 panic 时同样会被释放。

use crate::error::{ApiError, Outcome};
use std::cell::{Cell, RefCell};

// =========================================================
// 加载标记
// =========================================================

/// 加载标记
///
/// 内部是计数器：同一访问器上并发的多个操作全部结束后才算加载完成
#[derive(Debug, Default)]
pub struct LoadingFlag {
    active: Cell<u32>,
}

impl LoadingFlag {
    pub fn start(&self) -> LoadingGuard<'_> {
        self.active.set(self.active.get().saturating_add(1));
        LoadingGuard { flag: self }
    }

    pub fn is_loading(&self) -> bool {
        self.active.get() > 0
    }
}

#[must_use = "加载标记在守卫析构时释放"]
#[derive(Debug)]
pub struct LoadingGuard<'a> {
    flag: &'a LoadingFlag,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let active = &self.flag.active;
        active.set(active.get().saturating_sub(1));
    }
}

// =========================================================
// ResourceState
// =========================================================

#[derive(Debug, Default)]
pub struct ResourceState {
    loading: LoadingFlag,
    error: RefCell<Option<String>>,
    success: RefCell<Option<String>>,
}

impl ResourceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始一次操作：清除上一次的消息并置加载标记
    pub fn begin(&self) -> LoadingGuard<'_> {
        self.clear_messages();
        self.loading.start()
    }

    /// 只清除错误消息，用于写操作成功后的重新加载
    pub fn begin_keep_success(&self) -> LoadingGuard<'_> {
        self.error.replace(None);
        self.loading.start()
    }

    /// 只置加载标记，不动消息
    pub fn track(&self) -> LoadingGuard<'_> {
        self.loading.start()
    }

    pub fn clear_error(&self) {
        self.error.replace(None);
    }

    pub fn clear_messages(&self) {
        self.error.replace(None);
        self.success.replace(None);
    }

    pub fn succeed(&self, message: impl Into<String>) {
        self.success.replace(Some(message.into()));
    }

    pub fn fail(&self, message: impl Into<String>) {
        self.error.replace(Some(message.into()));
    }

    /// 记录失败
    ///
    /// 会话失效原样返回给调用方，其余错误转成错误消息
    pub fn reject(&self, err: ApiError, fallback: &str) -> Outcome<()> {
        let err = err.into_expired()?;
        tracing::debug!(error = %err, "request rejected");
        self.fail(err.user_message(fallback));
        Ok(())
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    pub fn success(&self) -> Option<String> {
        self.success.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionExpired;

    #[test]
    fn test_guard_releases_on_drop() {
        let state = ResourceState::new();
        {
            let _outer = state.begin();
            let inner = state.begin();
            assert!(state.is_loading());
            drop(inner);
            assert!(state.is_loading());
        }
        assert!(!state.is_loading());
    }

    #[test]
    fn test_guard_releases_on_panic() {
        let state = ResourceState::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = state.begin();
            panic!("boom");
        }));
        assert!(result.is_err());
        assert!(!state.is_loading());
    }

    #[test]
    fn test_begin_clears_messages() {
        let state = ResourceState::new();
        state.fail("old error");
        state.succeed("old success");

        let _guard = state.begin();
        assert!(state.error().is_none());
        assert!(state.success().is_none());
    }

    #[test]
    fn test_track_keeps_messages() {
        let state = ResourceState::new();
        state.fail("old error");
        state.succeed("old success");

        let guard = state.track();
        assert!(state.is_loading());
        assert_eq!(state.error().as_deref(), Some("old error"));
        assert_eq!(state.success().as_deref(), Some("old success"));
        drop(guard);
        assert!(!state.is_loading());
    }

    #[test]
    fn test_reject_splits_expired() {
        let state = ResourceState::new();
        state
            .reject(ApiError::Validation("bad input".to_string()), "fallback")
            .unwrap();
        assert_eq!(state.error().as_deref(), Some("bad input"));

        let expired = ApiError::from(SessionExpired::new(ApiError::http(401, "")));
        assert!(state.reject(expired, "fallback").is_err());
    }
}
