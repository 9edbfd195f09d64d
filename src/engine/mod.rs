// ==========================================
// 货运运力撮合系统 - 引擎层
// ==========================================
// 职责: 实现纯业务规则,无副作用
// 红线: Engine 不拼 SQL, 不访问仓储,
//       所有校验失败必须输出可解释的 reason
// ==========================================

pub mod scoring;
pub mod status_validator;

// 重导出核心引擎
pub use scoring::{ScoredBid, ScoringPolicy};
pub use status_validator::{InvalidTransition, StatusValidator};
