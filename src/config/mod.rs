// ==========================================
// 货运运力撮合系统 - 配置层
// ==========================================
// 职责: 不可变配置值,注入式使用
// 红线: 禁止进程级可变全局状态
// ==========================================

pub mod score_weights;

// 重导出核心配置
pub use score_weights::ScoreWeights;
