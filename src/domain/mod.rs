// ==========================================
// 货运运力撮合系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、业务规则接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod bid;
pub mod booking;
pub mod load;
pub mod transporter;
pub mod types;

// 重导出核心类型
pub use bid::Bid;
pub use booking::Booking;
pub use load::Load;
pub use transporter::{Transporter, Truck};
pub use types::{BidStatus, BookingStatus, LoadAction, LoadStatus, WeightUnit};
