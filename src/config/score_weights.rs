// ==========================================
// 货运运力撮合系统 - 竞价评分权重配置
// ==========================================
// 用途: 注入 ScoringPolicy 的不可变权重组
// ==========================================

use serde::{Deserialize, Serialize};

/// 竞价评分权重
///
/// 评分公式:
/// score = price_weight * (1 / proposed_rate)
///       + rating_weight * (rating / max_rating)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// 价格因子权重 (报价越低得分越高)
    pub price_weight: f64,
    /// 评分因子权重 (承运商评分越高得分越高)
    pub rating_weight: f64,
    /// 评分归一化上限 (五星制)
    pub max_rating: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            price_weight: 0.7,
            rating_weight: 0.3,
            max_rating: 5.0,
        }
    }
}
