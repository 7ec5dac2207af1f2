//! 响应信封
//!
//! 远端接口的每个响应都包裹在 `{code, message, data, paginate?}` 中。
//! `code` 在不同接口里可能是字符串也可能是数字，统一由 `ApiCode` 承载。

use serde::{Deserialize, Serialize};
use std::fmt;

// =========================================================
// ApiCode
// =========================================================

/// 信封中的业务码（字符串或数字）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiCode {
    Number(i64),
    Text(String),
}

impl ApiCode {
    fn matches(&self, expected: i64) -> bool {
        match self {
            ApiCode::Number(n) => *n == expected,
            ApiCode::Text(s) => s == &expected.to_string(),
        }
    }

    /// `"200"` 或 `200`
    pub fn is_success(&self) -> bool {
        self.matches(200)
    }

    /// `"401"` 或 `401`
    pub fn is_unauthorized(&self) -> bool {
        self.matches(401)
    }
}

impl fmt::Display for ApiCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiCode::Number(n) => write!(f, "{}", n),
            ApiCode::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ApiCode {
    fn from(n: i64) -> Self {
        ApiCode::Number(n)
    }
}

impl From<&str> for ApiCode {
    fn from(s: &str) -> Self {
        ApiCode::Text(s.to_string())
    }
}

// =========================================================
// Paginate
// =========================================================

/// 分页游标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginate {
    pub page: u64,
    pub size: u64,
    pub total: u64,
}

impl Default for Paginate {
    fn default() -> Self {
        Self {
            page: 1,
            size: 10,
            total: 0,
        }
    }
}

impl Paginate {
    /// 响应未携带分页信息时的替代值
    pub fn fallback(size: u64, len: usize) -> Self {
        Self {
            page: 1,
            size,
            total: len as u64,
        }
    }

    /// 总页数：ceil(total / size)，空结果视为 1 页
    pub fn total_pages(&self) -> u64 {
        if self.total == 0 || self.size == 0 {
            return 1;
        }
        self.total.div_ceil(self.size)
    }
}

// =========================================================
// Envelope
// =========================================================

/// 统一响应信封
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub code: ApiCode,
    #[serde(default)]
    pub message: String,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paginate: Option<Paginate>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }

    /// 非空消息
    pub fn message(&self) -> Option<&str> {
        let msg = self.message.trim();
        (!msg.is_empty()).then_some(self.message.as_str())
    }
}

// =========================================================
// FlexNumber
// =========================================================

/// 金额、单价等字段，接口可能返回字符串也可能返回数字
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlexNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Default for FlexNumber {
    fn default() -> Self {
        FlexNumber::Int(0)
    }
}

impl fmt::Display for FlexNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlexNumber::Int(n) => write!(f, "{}", n),
            FlexNumber::Float(n) => write!(f, "{}", n),
            FlexNumber::Text(s) => write!(f, "{}", s),
        }
    }
}
