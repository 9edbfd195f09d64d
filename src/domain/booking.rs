// ==========================================
// 货运运力撮合系统 - 预订领域模型
// ==========================================
// 红线: 有效预订的 allocated_trucks 之和 =
//       trucks_required - remaining_trucks
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::BookingStatus;

// ==========================================
// Booking - 预订
// ==========================================
// 由被接受的竞价转化而来,消耗货载剩余运力
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: String,          // 预订ID
    pub load_id: String,             // 关联货载
    pub bid_id: String,              // 关联竞价
    pub transporter_id: String,      // 关联承运商
    pub allocated_trucks: i32,       // 分配车辆数 (>=1)
    pub final_rate: f64,             // 成交价 (正数)
    pub status: BookingStatus,       // 预订状态
    pub booked_at: NaiveDateTime,    // 预订时间
}

impl Booking {
    /// 判断是否为有效(未取消)预订
    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }
}
