// ==========================================
// 货运运力撮合系统 - 货载管理 API
// ==========================================
// 职责: 货载发布、查询、取消、最优竞价排名
// 红线: trucks_required 创建后不可变
// ==========================================

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::load::Load;
use crate::domain::types::{LoadAction, LoadStatus, WeightUnit};
use crate::engine::scoring::{ScoredBid, ScoringPolicy};
use crate::engine::status_validator::StatusValidator;
use crate::repository::bid_repo::BidRepository;
use crate::repository::load_repo::{LoadFilter, LoadRepository};
use crate::repository::transporter_repo::TransporterRepository;

/// 货载创建请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLoadRequest {
    pub shipper_id: String,
    pub pickup_location: String,
    pub delivery_location: String,
    pub weight: f64,
    pub weight_unit: WeightUnit,
    pub cargo_type: String,
    pub pickup_date: NaiveDateTime,
    pub delivery_date: NaiveDateTime,
    pub offered_price: f64,
    pub trucks_required: i32,
}

// ==========================================
// LoadApi - 货载管理 API
// ==========================================

/// 货载管理API
///
/// 职责:
/// 1. 货载发布 (初始 POSTED, remaining = required)
/// 2. 货载查询 (按ID / 按状态与货主过滤)
/// 3. 货载取消 (状态机守卫 + 乐观锁落库)
/// 4. 最优竞价排名 (委托 ScoringPolicy)
pub struct LoadApi {
    load_repo: Arc<LoadRepository>,
    bid_repo: Arc<BidRepository>,
    transporter_repo: Arc<TransporterRepository>,
    scoring_policy: Arc<ScoringPolicy>,
}

impl LoadApi {
    /// 创建新的LoadApi实例
    pub fn new(
        load_repo: Arc<LoadRepository>,
        bid_repo: Arc<BidRepository>,
        transporter_repo: Arc<TransporterRepository>,
        scoring_policy: Arc<ScoringPolicy>,
    ) -> Self {
        Self {
            load_repo,
            bid_repo,
            transporter_repo,
            scoring_policy,
        }
    }

    /// 发布货载
    ///
    /// 初始状态 POSTED,remaining_trucks = trucks_required,version = 0
    #[instrument(skip(self, request), fields(shipper_id = %request.shipper_id))]
    pub fn create_load(&self, request: CreateLoadRequest) -> ApiResult<Load> {
        if request.trucks_required < 1 {
            return Err(ApiError::ValidationError(format!(
                "trucks_required 必须 >= 1 (当前: {})",
                request.trucks_required
            )));
        }

        let load = Load {
            load_id: Uuid::new_v4().to_string(),
            shipper_id: request.shipper_id,
            pickup_location: request.pickup_location,
            delivery_location: request.delivery_location,
            weight: request.weight,
            weight_unit: request.weight_unit,
            cargo_type: request.cargo_type,
            pickup_date: request.pickup_date,
            delivery_date: request.delivery_date,
            offered_price: request.offered_price,
            trucks_required: request.trucks_required,
            remaining_trucks: request.trucks_required,
            status: LoadStatus::Posted,
            version: 0,
            date_posted: Utc::now().naive_utc(),
        };

        self.load_repo.create(&load)?;
        info!(load_id = %load.load_id, trucks_required = load.trucks_required, "货载已发布");

        Ok(load)
    }

    /// 按ID查询货载
    pub fn get_load_by_id(&self, load_id: &str) -> ApiResult<Load> {
        self.load_repo
            .find_by_id(load_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Load(id={})不存在", load_id)))
    }

    /// 按条件查询货载列表
    pub fn list_loads(
        &self,
        status: Option<LoadStatus>,
        shipper_id: Option<String>,
    ) -> ApiResult<Vec<Load>> {
        let filter = LoadFilter { status, shipper_id };
        Ok(self.load_repo.find_filtered(&filter)?)
    }

    /// 取消货载
    ///
    /// BOOKED 状态下禁止取消;落库携带读取时的 version
    #[instrument(skip(self))]
    pub fn cancel_load(&self, load_id: &str) -> ApiResult<Load> {
        let mut load = self.get_load_by_id(load_id)?;

        StatusValidator::validate_action(load.status, LoadAction::Cancel)?;

        load.status = LoadStatus::Cancelled;
        self.load_repo.update(&load)?;
        load.version += 1;

        info!(load_id = %load.load_id, "货载已取消");
        Ok(load)
    }

    /// 货载的最优竞价排名
    ///
    /// 对该货载的全部竞价打分 (不过滤竞价状态),按评分降序返回。
    /// 承运商缺失评分按 0.0 计。
    #[instrument(skip(self))]
    pub fn get_best_bids(&self, load_id: &str) -> ApiResult<Vec<ScoredBid>> {
        // 货载必须存在
        self.get_load_by_id(load_id)?;

        let bids = self.bid_repo.find_by_load_id(load_id)?;

        let mut with_rating = Vec::with_capacity(bids.len());
        for bid in bids {
            let rating = self
                .transporter_repo
                .find_by_id(&bid.transporter_id)?
                .and_then(|t| t.rating);
            with_rating.push((bid, rating));
        }

        Ok(self.scoring_policy.rank(with_rating))
    }
}
