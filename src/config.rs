//! 运行时配置 (Runtime Configuration)
//!
//! 从变量源读取配置，读不到就使用默认值。变量源是一个 trait，
//! 生产环境读进程环境变量，测试中注入 HashMap。

use crate::error::ConfigError;
use std::collections::HashMap;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_ANONYMOUS_ROUTE: &str = "/";

const VAR_API_BASE_URL: &str = "SHOPADMIN_API_BASE_URL";
const VAR_ENV: &str = "SHOPADMIN_ENV";
const VAR_TUNNEL_BYPASS: &str = "SHOPADMIN_TUNNEL_BYPASS";
const VAR_ANONYMOUS_ROUTE: &str = "SHOPADMIN_ANONYMOUS_ROUTE";

// =========================================================
// 抽象接口：VarSource
// =========================================================

pub trait VarSource {
    fn var(&self, name: &str) -> Option<String>;
}

/// 生产环境：进程环境变量
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvVarSource;

impl VarSource for EnvVarSource {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl VarSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

// =========================================================
// ClientConfig
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// 已去掉末尾 `/` 的接口根地址
    pub api_base_url: String,
    /// 生产模式：Cookie 带 Secure 标记
    pub production: bool,
    /// 是否附加隧道网关的绕过头
    pub tunnel_bypass: bool,
    /// 会话失效后跳转的匿名落地页
    pub anonymous_route: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

impl ClientConfig {
    /// 非生产模式的默认配置
    pub fn new(api_base_url: &str) -> Self {
        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            production: false,
            tunnel_bypass: true,
            anonymous_route: DEFAULT_ANONYMOUS_ROUTE.to_string(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&EnvVarSource)
    }

    pub fn from_source<S: VarSource + ?Sized>(source: &S) -> Result<Self, ConfigError> {
        let raw_url = source
            .var(VAR_API_BASE_URL)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let raw_url = raw_url.trim().to_string();

        // 只做校验，保留原始写法（Url 会给无路径的地址补 `/`）
        Url::parse(&raw_url).map_err(|e| ConfigError::InvalidBaseUrl {
            value: raw_url.clone(),
            source: e,
        })?;

        let production = source
            .var(VAR_ENV)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("production"));

        // 隧道网关只在非生产环境使用，显式配置优先
        let tunnel_bypass = match source.var(VAR_TUNNEL_BYPASS) {
            Some(v) => parse_bool(VAR_TUNNEL_BYPASS, &v)?,
            None => !production,
        };

        let anonymous_route = source
            .var(VAR_ANONYMOUS_ROUTE)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ANONYMOUS_ROUTE.to_string());

        Ok(Self {
            api_base_url: raw_url.trim_end_matches('/').to_string(),
            production,
            tunnel_bypass,
            anonymous_route,
        })
    }

    /// 拼接接口地址
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.api_base_url, path)
        } else {
            format!("{}/{}", self.api_base_url, path)
        }
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_source(&source(&[])).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert!(!config.production);
        assert!(config.tunnel_bypass);
        assert_eq!(config.anonymous_route, "/");
    }

    #[test]
    fn test_production_disables_bypass_by_default() {
        let config = ClientConfig::from_source(&source(&[
            ("SHOPADMIN_API_BASE_URL", "https://api.shop.example/v1/"),
            ("SHOPADMIN_ENV", "Production"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "https://api.shop.example/v1");
        assert!(config.production);
        assert!(!config.tunnel_bypass);
    }

    #[test]
    fn test_explicit_bypass_wins() {
        let config = ClientConfig::from_source(&source(&[
            ("SHOPADMIN_ENV", "production"),
            ("SHOPADMIN_TUNNEL_BYPASS", "1"),
        ]))
        .unwrap();
        assert!(config.tunnel_bypass);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad_url = ClientConfig::from_source(&source(&[("SHOPADMIN_API_BASE_URL", "not a url")]));
        assert!(matches!(bad_url, Err(ConfigError::InvalidBaseUrl { .. })));

        let bad_bool = ClientConfig::from_source(&source(&[("SHOPADMIN_TUNNEL_BYPASS", "maybe")]));
        assert!(matches!(bad_bool, Err(ConfigError::InvalidBool { .. })));
    }

    #[test]
    fn test_url_join() {
        let config = ClientConfig::new("http://api.test/");
        assert_eq!(config.url("/auth/me"), "http://api.test/auth/me");
        assert_eq!(config.url("auth/me"), "http://api.test/auth/me");
    }
}
