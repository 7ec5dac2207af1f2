//! 令牌存储模块
//!
//! 令牌同时写入两个位置：
//! - Cookie：服务端渲染的请求只能读到它
//! - 客户端持久存储：仅客户端可见（本地 JSON 文件或内存）
//!
//! 两处写入相互独立，不做事务也不回滚：某一处失败只记录日志，另一处照常写入。

use crate::error::StorageError;
use shopadmin_shared::{AuthTokenData, Clock, DEFAULT_TOKEN_TYPE, EpochSecs, SystemClock};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// =========================================================
// 键定义
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKey {
    AccessToken,
    RefreshToken,
    TokenType,
}

impl TokenKey {
    pub const ALL: [TokenKey; 3] = [
        TokenKey::AccessToken,
        TokenKey::RefreshToken,
        TokenKey::TokenType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKey::AccessToken => "access_token",
            TokenKey::RefreshToken => "refresh_token",
            TokenKey::TokenType => "token_type",
        }
    }
}

// =========================================================
// 存储后端
// =========================================================

/// 单个存储位置
pub trait TokenBackend {
    /// 用于日志
    fn name(&self) -> &'static str;

    fn get(&self, key: &str) -> Option<String>;

    /// `max_age` 为剩余有效秒数，不支持过期的后端可以忽略
    fn set(&self, key: &str, value: &str, max_age: i64) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// 内存存储
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenBackend for MemoryStorage {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str, _max_age: i64) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// 本地 JSON 文件存储，每次写入都整体落盘
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    items: RefCell<BTreeMap<String, String>>,
}

impl JsonFileStorage {
    /// 打开存储文件，文件不存在时视为空
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let items = if path.exists() {
            let text = fs::read_to_string(&path)?;
            if text.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&text)?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            items: RefCell::new(items),
        })
    }

    fn flush(&self) -> Result<(), StorageError> {
        let text = serde_json::to_string_pretty(&*self.items.borrow())?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl TokenBackend for JsonFileStorage {
    fn name(&self) -> &'static str {
        "file"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str, _max_age: i64) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let removed = self.items.borrow_mut().remove(key).is_some();
        if removed { self.flush() } else { Ok(()) }
    }
}

// =========================================================
// Cookie
// =========================================================

#[derive(Debug, Clone, PartialEq)]
struct StoredCookie {
    value: String,
    /// None 表示会话 Cookie（来自请求头，过期时间未知）
    expires_at: Option<EpochSecs>,
    max_age: Option<i64>,
}

/// Cookie 存储
///
/// 固定 `SameSite=Lax`、`Path=/`，`Secure` 跟随生产模式。读取时会丢弃已过期的 Cookie。
pub struct CookieJar {
    secure: bool,
    clock: Box<dyn Clock>,
    cookies: RefCell<BTreeMap<String, StoredCookie>>,
}

impl std::fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieJar")
            .field("secure", &self.secure)
            .field("cookies", &self.cookies.borrow().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CookieJar {
    pub fn new(secure: bool) -> Self {
        Self::with_clock(secure, Box::new(SystemClock))
    }

    pub fn with_clock(secure: bool, clock: Box<dyn Clock>) -> Self {
        Self {
            secure,
            clock,
            cookies: RefCell::new(BTreeMap::new()),
        }
    }

    /// 从请求的 `Cookie` 头恢复（服务端渲染场景）
    pub fn from_header(secure: bool, header: &str) -> Self {
        let jar = Self::new(secure);
        {
            let mut cookies = jar.cookies.borrow_mut();
            for pair in header.split(';') {
                let Some((name, value)) = pair.split_once('=') else {
                    continue;
                };
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                cookies.insert(
                    name.to_string(),
                    StoredCookie {
                        value: value.trim().to_string(),
                        expires_at: None,
                        max_age: None,
                    },
                );
            }
        }
        jar
    }

    /// 当前所有有效 Cookie 的 `Set-Cookie` 头值
    pub fn set_cookie_headers(&self) -> Vec<String> {
        let now = self.clock.now();
        self.cookies
            .borrow()
            .iter()
            .filter(|(_, c)| !c.is_expired(now))
            .map(|(name, c)| self.render(name, c))
            .collect()
    }

    fn render(&self, name: &str, cookie: &StoredCookie) -> String {
        let mut header = format!("{}={}", name, cookie.value);
        if let Some(age) = cookie.max_age {
            header.push_str(&format!("; Max-Age={}", age));
        }
        // 旧客户端不认 Max-Age，同时给出 Expires
        if let Some(at) = cookie.expires_at.and_then(|at| at.to_datetime()) {
            header.push_str(&format!("; Expires={}", at.format("%a, %d %b %Y %H:%M:%S GMT")));
        }
        header.push_str("; Path=/; SameSite=Lax");
        if self.secure {
            header.push_str("; Secure");
        }
        header
    }
}

impl StoredCookie {
    fn is_expired(&self, now: EpochSecs) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

impl TokenBackend for CookieJar {
    fn name(&self) -> &'static str {
        "cookie"
    }

    fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let mut cookies = self.cookies.borrow_mut();
        match cookies.get(key) {
            Some(c) if c.is_expired(now) => {
                cookies.remove(key);
                None
            }
            Some(c) => Some(c.value.clone()),
            None => None,
        }
    }

    fn set(&self, key: &str, value: &str, max_age: i64) -> Result<(), StorageError> {
        let expires_at = self.clock.now() + Duration::from_secs(u64::try_from(max_age).unwrap_or(0));
        self.cookies.borrow_mut().insert(
            key.to_string(),
            StoredCookie {
                value: value.to_string(),
                expires_at: Some(expires_at),
                max_age: Some(max_age),
            },
        );
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.cookies.borrow_mut().remove(key);
        Ok(())
    }
}

// =========================================================
// TokenStore
// =========================================================

/// 进程级令牌存储
///
/// `local` 为 None 时表示服务端上下文（没有客户端持久存储）
pub struct TokenStore {
    cookies: Box<dyn TokenBackend>,
    local: Option<Box<dyn TokenBackend>>,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("cookies", &self.cookies.name())
            .field("local", &self.local.as_ref().map(|l| l.name()))
            .finish()
    }
}

impl TokenStore {
    pub fn new(cookies: Box<dyn TokenBackend>, local: Option<Box<dyn TokenBackend>>) -> Self {
        Self::with_clock(cookies, local, Box::new(SystemClock))
    }

    pub fn with_clock(
        cookies: Box<dyn TokenBackend>,
        local: Option<Box<dyn TokenBackend>>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            cookies,
            local,
            clock,
        }
    }

    /// 客户端上下文：内存 Cookie + 内存本地存储
    pub fn in_memory(secure: bool) -> Self {
        Self::new(
            Box::new(CookieJar::new(secure)),
            Some(Box::new(MemoryStorage::new())),
        )
    }

    fn backends(&self) -> impl Iterator<Item = &dyn TokenBackend> {
        std::iter::once(self.cookies.as_ref()).chain(self.local.as_deref())
    }

    /// 写入完整会话
    ///
    /// 剩余有效期为 0 的令牌不写入，并清除旧值，保证不会留下新旧混杂的会话
    pub fn set(&self, data: &AuthTokenData) {
        let now = self.clock.now();
        let access_max_age = data.access_expires_at.max_age_from(now);
        let refresh_max_age = data.refresh_expires_at.max_age_from(now);
        let token_type = if data.token_type.trim().is_empty() {
            DEFAULT_TOKEN_TYPE
        } else {
            data.token_type.as_str()
        };

        let entries = [
            (TokenKey::AccessToken, data.access_token.as_str(), access_max_age),
            (TokenKey::RefreshToken, data.refresh_token.as_str(), refresh_max_age),
            (TokenKey::TokenType, token_type, refresh_max_age),
        ];

        for backend in self.backends() {
            for (key, value, max_age) in entries {
                let result = if max_age > 0 && !value.is_empty() {
                    backend.set(key.as_str(), value, max_age)
                } else {
                    backend.remove(key.as_str())
                };
                if let Err(e) = result {
                    tracing::warn!(backend = backend.name(), key = key.as_str(), error = %e, "token write failed");
                }
            }
        }
    }

    /// 清除所有令牌
    pub fn clear(&self) {
        for backend in self.backends() {
            for key in TokenKey::ALL {
                if let Err(e) = backend.remove(key.as_str()) {
                    tracing::warn!(backend = backend.name(), key = key.as_str(), error = %e, "token removal failed");
                }
            }
        }
    }

    /// 优先读客户端存储，读不到再读 Cookie
    pub fn get(&self, key: TokenKey) -> Option<String> {
        self.local
            .as_ref()
            .and_then(|local| local.get(key.as_str()))
            .or_else(|| self.cookies.get(key.as_str()))
            .filter(|v| !v.is_empty())
    }

    pub fn access_token(&self) -> Option<String> {
        self.get(TokenKey::AccessToken)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.get(TokenKey::RefreshToken)
    }

    pub fn token_type(&self) -> String {
        self.get(TokenKey::TokenType)
            .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string())
    }

    /// `Authorization` 头的值，没有访问令牌时为 None
    pub fn authorization(&self) -> Option<String> {
        self.access_token()
            .map(|token| format!("{} {}", self.token_type(), token))
    }
}
