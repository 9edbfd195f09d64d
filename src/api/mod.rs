// ==========================================
// 货运运力撮合系统 - API 层
// ==========================================
// 职责: 编排业务操作,持有事务边界
// 红线: 每个公开操作的全部写入在单个事务内落库,
//       其他调用方不可观察到部分生效的中间态
// ==========================================

pub mod bid_api;
pub mod booking_api;
pub mod error;
pub mod load_api;
pub mod transporter_api;

// 重导出核心类型
pub use bid_api::{BidApi, SubmitBidRequest};
pub use booking_api::{BookingApi, CreateBookingRequest};
pub use error::{ApiError, ApiResult};
pub use load_api::{CreateLoadRequest, LoadApi};
pub use transporter_api::{TransporterApi, TruckSpec};
