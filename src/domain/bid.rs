// ==========================================
// 货运运力撮合系统 - 竞价领域模型
// ==========================================
// 用途: 承运商对货载的报价记录
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::BidStatus;

// ==========================================
// Bid - 竞价
// ==========================================
// 以 ID 引用货载与承运商,不持有对象引用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bid {
    pub bid_id: String,               // 竞价ID
    pub load_id: String,              // 关联货载
    pub transporter_id: String,       // 关联承运商
    pub proposed_rate: f64,           // 报价 (正数)
    pub trucks_offered: i32,          // 承诺车辆数 (>=1)
    pub truck_type: String,           // 车型 (开放字符串,非封闭枚举)
    pub status: BidStatus,            // 竞价状态
    pub submitted_at: NaiveDateTime,  // 提交时间
}
