//! 默认提示文案
//!
//! 服务端没有返回消息时使用。宿主的本地化层可以覆盖这些文案。

/// 通用增删改查文案
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrudMessages {
    pub load_error: &'static str,
    pub create_success: &'static str,
    pub create_error: &'static str,
    pub update_success: &'static str,
    pub update_error: &'static str,
    pub delete_success: &'static str,
    pub delete_error: &'static str,
}

pub const CRUD: CrudMessages = CrudMessages {
    load_error: "ไม่สามารถโหลดข้อมูลได้",
    create_success: "บันทึกข้อมูลสำเร็จ",
    create_error: "บันทึกข้อมูลไม่สำเร็จ",
    update_success: "อัปเดตข้อมูลสำเร็จ",
    update_error: "อัปเดตข้อมูลไม่สำเร็จ",
    delete_success: "ลบข้อมูลสำเร็จ",
    delete_error: "ลบข้อมูลไม่สำเร็จ",
};

pub mod auth {
    pub const LOGIN_SUCCESS: &str = "เข้าสู่ระบบสำเร็จ";
    pub const LOGIN_ERROR: &str = "เข้าสู่ระบบไม่สำเร็จ";
    pub const REQUIRED_FIELDS: &str = "กรุณากรอกอีเมลและรหัสผ่าน";
}

pub mod profile {
    pub const UPDATE_SUCCESS: &str = "บันทึกข้อมูลสำเร็จ";
    pub const UPDATE_ERROR: &str = "บันทึกข้อมูลไม่สำเร็จ";
    pub const PASSWORD_CHANGE_SUCCESS: &str = "เปลี่ยนรหัสผ่านสำเร็จ";
    pub const PASSWORD_CHANGE_ERROR: &str = "เปลี่ยนรหัสผ่านไม่สำเร็จ";
    pub const PASSWORD_MISMATCH: &str = "รหัสผ่านใหม่ไม่ตรงกัน";
}

pub mod stock {
    pub const LOAD_ERROR: &str = "ไม่สามารถโหลดข้อมูลสต็อกได้";
}

pub mod contact {
    pub const LOAD_ERROR: &str = "ไม่สามารถโหลดข้อความติดต่อได้";
    pub const READ_STATUS_ERROR: &str = "อัปเดตสถานะการอ่านไม่สำเร็จ";
    pub const UNREAD_COUNT_ERROR: &str = "ไม่สามารถโหลดจำนวนข้อความที่ยังไม่อ่านได้";
    pub const REPLIES_LOAD_ERROR: &str = "ไม่สามารถโหลดข้อความสนทนาได้";
    pub const REPLY_SEND_ERROR: &str = "ไม่สามารถส่งข้อความได้";
}

pub mod product_image {
    pub const LOAD_ERROR: &str = "โหลดรูปสินค้าไม่สำเร็จ";
    pub const UPLOAD_SUCCESS: &str = "อัปโหลดรูปสำเร็จ";
    pub const UPLOAD_ERROR: &str = "อัปโหลดรูปสินค้าไม่สำเร็จ";
    pub const DELETE_SUCCESS: &str = "ลบรูปสำเร็จ";
    pub const DELETE_ERROR: &str = "ลบรูปสินค้าไม่สำเร็จ";
}

pub mod payment {
    pub const APPROVE_SUCCESS: &str = "อนุมัติการชำระเงินสำเร็จ";
    pub const APPROVE_ERROR: &str = "ไม่สามารถอนุมัติการชำระเงินได้";
    pub const REJECT_SUCCESS: &str = "ไม่อนุมัติการชำระเงินแล้ว";
    pub const REJECT_ERROR: &str = "ไม่สามารถไม่อนุมัติการชำระเงินได้";
}

pub mod order {
    pub const INVALID_TRANSITION: &str = "ไม่สามารถเปลี่ยนสถานะข้ามขั้นตอนได้";
    pub const INVALID_STATUS: &str = "สถานะคำสั่งซื้อไม่ถูกต้อง";
    pub const STATUS_REQUIRED: &str = "กรุณาเลือกสถานะคำสั่งซื้อ";
    pub const INSUFFICIENT_STOCK: &str = "สต๊อกสินค้าไม่เพียงพอสำหรับการจัดส่ง";
}

/// 将订单接口的英文错误转换为本地化文案
///
/// 未识别的消息原样返回，空消息使用 `fallback`
pub fn normalize_order_message(message: &str, fallback: &str) -> String {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return fallback.to_string();
    }

    let lowered = trimmed.to_lowercase();
    let mapped = match lowered.as_str() {
        "invalid status transition" => Some(order::INVALID_TRANSITION),
        "invalid order status" => Some(order::INVALID_STATUS),
        "status is required" => Some(order::STATUS_REQUIRED),
        other if other.starts_with("insufficient stock for product") => {
            Some(order::INSUFFICIENT_STOCK)
        }
        _ => None,
    };

    mapped
        .map(str::to_string)
        .unwrap_or_else(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_order_messages() {
        assert_eq!(
            normalize_order_message("  Invalid Status Transition ", "x"),
            order::INVALID_TRANSITION
        );
        assert_eq!(
            normalize_order_message("insufficient stock for product P-001", "x"),
            order::INSUFFICIENT_STOCK
        );
        assert_eq!(normalize_order_message("status is required", "x"), order::STATUS_REQUIRED);
    }

    #[test]
    fn test_unknown_and_empty_order_messages() {
        assert_eq!(normalize_order_message("order not found", "x"), "order not found");
        assert_eq!(normalize_order_message("   ", "fallback"), "fallback");
    }
}
