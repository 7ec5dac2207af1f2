pub mod date;
pub mod envelope;
pub mod models;
pub mod protocol;

pub use chrono;
pub use date::{Clock, EpochSecs, FixedClock, SystemClock};
pub use envelope::{ApiCode, Envelope, FlexNumber, Paginate};
pub use models::*;
pub use protocol::{
    ContactMessageListParams, HttpMethod, ListParams, OrderListParams, QueryParams, ReadStatus,
    SortOrder,
};

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_TUNNEL_BYPASS: &str = "ngrok-skip-browser-warning";
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// 接口路径
pub mod paths {
    pub const LOGIN: &str = "/public/auth/login";
    pub const REFRESH: &str = "/public/auth/refresh";

    pub const STATUSES: &str = "/system/statuses";
    pub const TIERS: &str = "/system/tiers";
    pub const CATEGORIES: &str = "/system/categories";
    pub const PRODUCT_STOCKS: &str = "/system/product_stocks";
    pub const PRODUCTS: &str = "/system/products";
    pub const PAYMENTS: &str = "/system/payments";
    pub const BANKS: &str = "/system/banks";

    pub const ORDERS: &str = "/auth/orders";
    pub const STORAGES: &str = "/auth/storages/";
    pub const MEMBERS: &str = "/auth/members";
    pub const ME: &str = "/auth/me";
    pub const CONTACT_MESSAGES: &str = "/auth/contact-messages";
}

/// 付款凭证在存储服务中的关联类型
pub const PAYMENT_FILE_ENTITY: &str = "PAYMENT_FILE";

/// 超过该长度的 id 只保留末尾字符用于展示
const SHORT_CODE_LEN: usize = 8;

// =========================================================
// 展示辅助
// =========================================================

/// 将 id 转换为便于口头核对的短码，例如 `ORD-1A2B3C4D`
pub fn to_short_code(value: Option<&str>, prefix: &str) -> String {
    let id = value.unwrap_or_default().trim();
    if id.is_empty() {
        return "-".to_string();
    }

    let len = id.chars().count();
    let tail: String = id.chars().skip(len.saturating_sub(SHORT_CODE_LEN)).collect();
    format!("{}-{}", prefix, tail.to_uppercase())
}
