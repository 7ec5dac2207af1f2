use serde::Deserialize;
use shopadmin_shared::ApiCode;
use thiserror::Error;

// =========================================================
// 失败响应体
// =========================================================

/// 非 2xx 响应体中可识别的部分
///
/// 服务端报错时通常仍返回信封格式，但字段可能缺失，所以全部可选
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<ApiCode>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// 尝试从响应文本解析，非 JSON（如网关错误页）返回 None
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// 客户端错误
///
/// 在传输边界一次性构造，下游只做模式匹配：
/// - `Network`: 连接失败、超时等，没有 HTTP 响应
/// - `Http`: 收到非 2xx 响应
/// - `Decode`: 2xx 但响应体不是合法信封
/// - `Domain`: 信封 code 不是成功码
/// - `Validation`: 本地校验失败，未发出请求
/// - `Expired`: 401 且刷新失败，会话已被清除
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request failed with status {status}")]
    Http {
        status: u16,
        body: Option<ErrorBody>,
    },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("[{code}] {message}")]
    Domain { code: ApiCode, message: String },

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Expired(#[from] SessionExpired),
}

impl ApiError {
    pub fn http(status: u16, body_text: &str) -> Self {
        ApiError::Http {
            status,
            body: ErrorBody::parse(body_text),
        }
    }

    /// 是否应当触发刷新令牌
    ///
    /// 依次检查：传输层状态码、失败响应体中的信封 code
    pub fn is_unauthorized(&self) -> bool {
        match self {
            ApiError::Http { status, body } => {
                *status == 401
                    || body
                        .as_ref()
                        .and_then(|b| b.code.as_ref())
                        .is_some_and(ApiCode::is_unauthorized)
            }
            _ => false,
        }
    }

    /// 面向用户的错误消息
    ///
    /// 优先级：信封消息 -> 传输层消息 -> `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        self.message_candidate()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    fn message_candidate(&self) -> Option<String> {
        match self {
            ApiError::Http { body, .. } => Some(
                body.as_ref()
                    .and_then(ErrorBody::message)
                    .map(str::to_string)
                    .unwrap_or_else(|| self.to_string()),
            ),
            ApiError::Domain { message, .. } => Some(message.clone()),
            ApiError::Validation(message) => Some(message.clone()),
            ApiError::Network(message) | ApiError::Decode(message) => {
                (!message.trim().is_empty()).then(|| self.to_string())
            }
            ApiError::Expired(expired) => expired.cause.message_candidate(),
        }
    }

    /// 拆分出会话失效错误，其余错误原样返回
    pub fn into_expired(self) -> Result<ApiError, SessionExpired> {
        match self {
            ApiError::Expired(expired) => Err(expired),
            other => Ok(other),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

// =========================================================
// 会话失效
// =========================================================

/// 401 后刷新失败：已执行登出并跳转，调用方应中止后续操作
///
/// 这是唯一会穿透到 UI 层的错误
#[derive(Debug, Error)]
#[error("session expired: {cause}")]
pub struct SessionExpired {
    pub cause: Box<ApiError>,
}

impl SessionExpired {
    pub fn new(cause: ApiError) -> Self {
        Self {
            cause: Box::new(cause),
        }
    }
}

/// 资源访问器的返回类型：普通失败已转化为状态字段，只有会话失效会以 Err 返回
pub type Outcome<T> = std::result::Result<T, SessionExpired>;

// =========================================================
// 存储与配置错误
// =========================================================

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid api base url '{value}': {source}")]
    InvalidBaseUrl {
        value: String,
        source: url::ParseError,
    },

    #[error("invalid boolean for {name}: '{value}'")]
    InvalidBool { name: String, value: String },
}
