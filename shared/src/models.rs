//! 领域模型 (Domain Models)
//!
//! 字段命名保持与远端接口一致（snake_case），可选字段一律带 `#[serde(default)]`，
//! 以容忍不同接口返回的字段子集。

use crate::date::EpochSecs;
use crate::envelope::FlexNumber;
use serde::{Deserialize, Serialize};
use std::fmt;

// =========================================================
// 认证
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// 登录 / 刷新接口返回的令牌数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthTokenData {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub access_expires_at: EpochSecs,
    #[serde(default)]
    pub refresh_expires_at: EpochSecs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

// =========================================================
// 个人资料
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminProfile {
    pub member_id: String,
    #[serde(default)]
    pub member_no: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub firstname_th: String,
    #[serde(default)]
    pub lastname_th: String,
    #[serde(default)]
    pub firstname_en: String,
    #[serde(default)]
    pub lastname_en: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub actor_is_admin: bool,
    #[serde(default)]
    pub is_acting_as: bool,
    #[serde(default)]
    pub last_login: i64,
    #[serde(default)]
    pub registration: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileData {
    pub firstname_th: String,
    pub lastname_th: String,
    pub firstname_en: String,
    pub lastname_en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordData {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

// =========================================================
// 系统字典
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusItem {
    pub id: String,
    #[serde(default)]
    pub name_th: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusPayload {
    pub name_th: String,
    pub name_en: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierItem {
    pub id: String,
    #[serde(default)]
    pub name_th: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub min_spending: FlexNumber,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub discount_rate: FlexNumber,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierPayload {
    pub name_th: String,
    pub name_en: String,
    pub min_spending: String,
    pub is_active: bool,
    pub discount_rate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryItem {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub name_th: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub name_th: String,
    pub name_en: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankItem {
    pub id: String,
    #[serde(default)]
    pub name_th: String,
    #[serde(default)]
    pub name_abb_th: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub name_abb_en: String,
    #[serde(default)]
    pub is_active: bool,
}

/// 会员绑定的银行账户，`bank_name_*` 由补全层填充
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberBankItem {
    pub id: String,
    #[serde(default)]
    pub member_id: String,
    #[serde(default)]
    pub bank_id: String,
    #[serde(default)]
    pub bank_no: String,
    #[serde(default)]
    pub firstname_th: String,
    #[serde(default)]
    pub lastname_th: String,
    #[serde(default)]
    pub firstname_en: String,
    #[serde(default)]
    pub lastname_en: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub bank_name_th: String,
    #[serde(default)]
    pub bank_name_en: String,
}

// =========================================================
// 商品
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductItem {
    pub id: String,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub name_th: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub product_no: String,
    #[serde(default)]
    pub price: FlexNumber,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPayload {
    pub category_id: String,
    pub name_th: String,
    pub name_en: String,
    pub price: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImageItem {
    pub id: String,
    #[serde(default)]
    pub file_id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImageUploadPayload {
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
    pub file_base64: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetailItem {
    pub id: String,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub dimensions: String,
    #[serde(default)]
    pub weight: FlexNumber,
    #[serde(default)]
    pub care_instructions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetailPayload {
    pub description: String,
    pub material: String,
    pub dimensions: String,
    pub weight: String,
    pub care_instructions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductStockItem {
    pub id: String,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub unit_price: FlexNumber,
    #[serde(default)]
    pub stock_amount: i64,
    #[serde(default)]
    pub remaining: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockAction {
    Increase,
    Decrease,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductStockPayload {
    pub stock_amount: i64,
    pub remaining: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<StockAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustment_qty: Option<i64>,
}

// =========================================================
// 订单
// =========================================================

/// 订单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    RefundRequested,
    Shipping,
    Completed,
    Cancelled,
    /// 服务端新增、客户端尚未识别的状态
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::RefundRequested => "refund_requested",
            OrderStatus::Shipping => "shipping",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Unknown => "unknown",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub order_no: String,
    #[serde(default)]
    pub member_id: String,
    #[serde(default)]
    pub payment_id: String,
    #[serde(default)]
    pub address_id: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub status_summary: Option<String>,
    #[serde(default)]
    pub status_next_step: Option<String>,
    #[serde(default)]
    pub shipping_tracking_no: Option<String>,
    #[serde(default)]
    pub payment_submitted: bool,
    #[serde(default)]
    pub payment_rejected: bool,
    #[serde(default)]
    pub payment_rejection_reason: Option<String>,
    #[serde(default)]
    pub payment_appeal_reason: Option<String>,
    #[serde(default)]
    pub refund_rejection_reason: Option<String>,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
    #[serde(default)]
    pub total_amount: FlexNumber,
    #[serde(default)]
    pub discount_amount: FlexNumber,
    #[serde(default)]
    pub net_amount: FlexNumber,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// 订单明细，`product_name_*` 由补全层填充
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub product_name_th: String,
    #[serde(default)]
    pub product_name_en: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub price_per_unit: FlexNumber,
    #[serde(default)]
    pub total_item_amount: FlexNumber,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTimelineItem {
    #[serde(default)]
    pub action_type: String,
    #[serde(default)]
    pub action_detail: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub action_by: Option<String>,
    #[serde(default)]
    pub from_status: Option<String>,
    #[serde(default)]
    pub to_status: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// PATCH 订单状态时提交的完整载荷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusPayload {
    pub member_id: String,
    pub payment_id: String,
    pub address_id: String,
    pub status: OrderStatus,
    pub shipping_tracking_no: String,
    pub cancel_reason: String,
    pub refund_reason: String,
    pub total_amount: String,
    pub discount_amount: String,
    pub net_amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemPaymentItem {
    pub id: String,
    #[serde(default)]
    pub amount: FlexNumber,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub approved_by: Option<String>,
    #[serde(default)]
    pub approved_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageFileItem {
    pub id: String,
    #[serde(default)]
    pub ref_id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub related_entity: String,
}

/// 订单的付款记录与付款凭证
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPaymentDetail {
    pub payment: Option<SystemPaymentItem>,
    pub slips: Vec<StorageFileItem>,
}

// =========================================================
// 联系消息
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessageItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub send_status: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub send_error: Option<String>,
    #[serde(default)]
    pub sent_at: Option<String>,
    #[serde(default)]
    pub read_at: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactReplyItem {
    pub id: String,
    #[serde(default)]
    pub contact_message_id: String,
    #[serde(default)]
    pub sender_role: String,
    #[serde(default)]
    pub sender_name: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactReplyPayload {
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCount {
    #[serde(default)]
    pub unread: u64,
}
