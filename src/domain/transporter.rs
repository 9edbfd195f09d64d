// ==========================================
// 货运运力撮合系统 - 承运商与车辆台账领域模型
// ==========================================
// 红线: 可用运力以 (承运商, 车型) 跨行求和为准,单行 count 不做下界约束
// 说明: 同一车型允许多行并存 (历史数据形态,不做聚合)
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Transporter - 承运商
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transporter {
    pub transporter_id: String,  // 承运商ID
    pub company_name: String,    // 公司名称
    pub rating: Option<f64>,     // 信用评分 0.0-5.0, None 表示未评分
}

// ==========================================
// Truck - 车辆台账行
// ==========================================
// count 允许为空,读取时按 0 处理
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Truck {
    pub truck_id: String,        // 台账行ID
    pub transporter_id: String,  // 所属承运商
    pub truck_type: String,      // 车型
    pub count: Option<i32>,      // 可用车辆数
}
