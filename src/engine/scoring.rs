// ==========================================
// 货运运力撮合系统 - 竞价评分引擎
// ==========================================
// 职责: 对货载的全部竞价打分并排序
// 红线: 纯读取,不过滤竞价状态,
//       已接受/已拒绝的竞价同样参与排名
// ==========================================
// 公式: score = price_weight * (1 / proposed_rate)
//             + rating_weight * (rating / max_rating)
// 约定: 未评分承运商按 0.0 计;
//       报价缺失或非正数时按最大可表示报价计,
//       价格项趋于 0 而不是除零
// ==========================================

use serde::{Deserialize, Serialize};

use crate::config::ScoreWeights;
use crate::domain::bid::Bid;

/// 带评分的竞价 (排名输出)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredBid {
    pub bid: Bid,
    pub score: f64,
}

// ==========================================
// ScoringPolicy - 竞价评分引擎
// ==========================================
pub struct ScoringPolicy {
    weights: ScoreWeights,
}

impl ScoringPolicy {
    /// 构造函数,注入权重配置
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    /// 计算单条竞价的评分
    ///
    /// # 参数
    /// - `proposed_rate`: 报价
    /// - `rating`: 承运商评分,None 表示未评分
    pub fn score(&self, proposed_rate: f64, rating: Option<f64>) -> f64 {
        let rating = rating.unwrap_or(0.0);
        let rate = if proposed_rate > 0.0 && proposed_rate.is_finite() {
            proposed_rate
        } else {
            f64::MAX
        };
        self.weights.price_weight * (1.0 / rate)
            + self.weights.rating_weight * (rating / self.weights.max_rating)
    }

    /// 对竞价列表打分并按评分降序排列
    ///
    /// 稳定排序: 同分竞价保持检索顺序
    pub fn rank(&self, bids: Vec<(Bid, Option<f64>)>) -> Vec<ScoredBid> {
        let mut scored: Vec<ScoredBid> = bids
            .into_iter()
            .map(|(bid, rating)| {
                let score = self.score(bid.proposed_rate, rating);
                ScoredBid { bid, score }
            })
            .collect();

        // sort_by 为稳定排序;score 由有限输入构成,不会出现 NaN
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored
    }
}
