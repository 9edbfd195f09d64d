// ==========================================
// 货运运力撮合系统 - 货载领域模型
// ==========================================
// 红线: 0 <= remaining_trucks <= trucks_required 任何时刻成立
// 红线: version 每次落库必须严格递增,过期 version 的写入必须失败
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{LoadStatus, WeightUnit};

// ==========================================
// Load - 货载
// ==========================================
// trucks_required 创建后不可变; remaining_trucks 随预订/取消增减
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Load {
    pub load_id: String,            // 货载ID
    pub shipper_id: String,         // 货主ID
    pub pickup_location: String,    // 提货地
    pub delivery_location: String,  // 交货地
    pub weight: f64,                // 货物重量
    pub weight_unit: WeightUnit,    // 重量单位
    pub cargo_type: String,         // 货物类型
    pub pickup_date: NaiveDateTime, // 提货时间
    pub delivery_date: NaiveDateTime, // 交货时间
    pub offered_price: f64,         // 货主报价
    pub trucks_required: i32,       // 所需车辆数 (>=1, 不可变)
    pub remaining_trucks: i32,      // 剩余待分配车辆数
    pub status: LoadStatus,         // 货载状态
    pub version: i64,               // 乐观锁: 并发修订号
    pub date_posted: NaiveDateTime, // 发布时间
}

impl Load {
    /// 已被有效预订消耗的车辆数
    pub fn allocated_trucks(&self) -> i32 {
        self.trucks_required - self.remaining_trucks
    }
}
