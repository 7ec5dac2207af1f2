//! 导航模块
//!
//! 客户端只需要在会话失效时跳转到匿名页面，具体怎么跳转由宿主决定。
//! `RouterService` 是不依赖任何 UI 框架的默认实现：只记录当前路由和历史。

use std::cell::RefCell;

/// 导航接口，由宿主注入
pub trait Navigator {
    fn navigate(&self, path: &str);
}

/// 路由服务
///
/// 重复导航到当前路由不会产生新的历史记录
#[derive(Debug)]
pub struct RouterService {
    current: RefCell<String>,
    history: RefCell<Vec<String>>,
}

impl Default for RouterService {
    fn default() -> Self {
        Self::new("/")
    }
}

impl RouterService {
    pub fn new(initial: &str) -> Self {
        Self {
            current: RefCell::new(normalize(initial)),
            history: RefCell::new(Vec::new()),
        }
    }

    pub fn current_route(&self) -> String {
        self.current.borrow().clone()
    }

    /// 已离开的路由，按时间顺序
    pub fn history(&self) -> Vec<String> {
        self.history.borrow().clone()
    }
}

impl Navigator for RouterService {
    fn navigate(&self, path: &str) {
        let target = normalize(path);
        let previous = self.current.replace(target.clone());
        if previous != target {
            tracing::debug!(from = %previous, to = %target, "navigate");
            self.history.borrow_mut().push(previous);
        }
    }
}

fn normalize(path: &str) -> String {
    let path = path.trim();
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigate_records_history() {
        let router = RouterService::new("/orders");
        router.navigate("/");
        router.navigate("/");

        assert_eq!(router.current_route(), "/");
        assert_eq!(router.history(), vec!["/orders".to_string()]);
    }

    #[test]
    fn test_relative_path_is_normalized() {
        let router = RouterService::default();
        router.navigate("products");
        assert_eq!(router.current_route(), "/products");
    }
}
