// ==========================================
// 货运运力撮合系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// 约定: 跨实体原子操作由 API 层持有事务,
//       各仓储提供 *_tx 关联函数在事务内复用
// ==========================================

pub mod bid_repo;
pub mod booking_repo;
pub mod error;
pub mod load_repo;
pub mod transporter_repo;
pub mod truck_repo;

// 重导出核心仓储
pub use bid_repo::{BidFilter, BidRepository};
pub use booking_repo::BookingRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use load_repo::{LoadFilter, LoadRepository};
pub use transporter_repo::TransporterRepository;
pub use truck_repo::TruckRepository;
