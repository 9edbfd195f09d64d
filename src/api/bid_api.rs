// ==========================================
// 货运运力撮合系统 - 竞价管理 API
// ==========================================
// 职责: 竞价提交、查询、拒绝
// 说明: 提交时的运力校验是时点读取,不构成预留;
//       并发的预订/竞价接受不受其阻塞
// ==========================================

use chrono::Utc;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::bid::Bid;
use crate::domain::types::{BidStatus, LoadAction, LoadStatus};
use crate::engine::status_validator::StatusValidator;
use crate::repository::bid_repo::{BidFilter, BidRepository};
use crate::repository::load_repo::LoadRepository;
use crate::repository::transporter_repo::TransporterRepository;
use crate::repository::truck_repo::TruckRepository;

/// 竞价提交请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitBidRequest {
    pub load_id: String,
    pub transporter_id: String,
    pub proposed_rate: f64,
    pub trucks_offered: i32,
    pub truck_type: String,
}

// ==========================================
// BidApi - 竞价管理 API
// ==========================================

/// 竞价管理API
///
/// 职责:
/// 1. 竞价提交 (状态机守卫 + 运力时点校验 + 首竞价开闸)
/// 2. 竞价查询 (按ID / 组合过滤)
/// 3. 竞价拒绝 (无守卫,幂等)
pub struct BidApi {
    conn: Arc<Mutex<Connection>>,
    load_repo: Arc<LoadRepository>,
    bid_repo: Arc<BidRepository>,
    transporter_repo: Arc<TransporterRepository>,
    truck_repo: Arc<TruckRepository>,
}

impl BidApi {
    /// 创建新的BidApi实例
    pub fn new(
        conn: Arc<Mutex<Connection>>,
        load_repo: Arc<LoadRepository>,
        bid_repo: Arc<BidRepository>,
        transporter_repo: Arc<TransporterRepository>,
        truck_repo: Arc<TruckRepository>,
    ) -> Self {
        Self {
            conn,
            load_repo,
            bid_repo,
            transporter_repo,
            truck_repo,
        }
    }

    /// 提交竞价
    ///
    /// 流程:
    /// 1. 货载必须存在,且状态允许竞价
    /// 2. 承运商必须存在
    /// 3. 该车型可用车辆总数 >= trucks_offered (时点读取)
    /// 4. 货载为 POSTED 且尚无竞价时,推进为 OPEN_FOR_BIDS
    /// 5. 以 PENDING 状态落库竞价
    ///
    /// 状态推进与竞价落库在同一事务内提交
    #[instrument(skip(self, request), fields(
        load_id = %request.load_id,
        transporter_id = %request.transporter_id
    ))]
    pub fn submit_bid(&self, request: SubmitBidRequest) -> ApiResult<Bid> {
        let mut load = self
            .load_repo
            .find_by_id(&request.load_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Load(id={})不存在", request.load_id)))?;

        StatusValidator::validate_action(load.status, LoadAction::Bid)?;

        self.transporter_repo
            .find_by_id(&request.transporter_id)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Transporter(id={})不存在", request.transporter_id))
            })?;

        let available = self
            .truck_repo
            .available_count(&request.transporter_id, &request.truck_type)?;
        if request.trucks_offered > available {
            return Err(ApiError::InsufficientCapacity {
                context: format!("承运商{}车型{}", request.transporter_id, request.truck_type),
                requested: request.trucks_offered,
                available,
            });
        }

        let bid = Bid {
            bid_id: Uuid::new_v4().to_string(),
            load_id: request.load_id.clone(),
            transporter_id: request.transporter_id.clone(),
            proposed_rate: request.proposed_rate,
            trucks_offered: request.trucks_offered,
            truck_type: request.truck_type,
            status: BidStatus::Pending,
            submitted_at: Utc::now().naive_utc(),
        };

        // 写入阶段: 状态推进 + 竞价落库,单事务
        {
            let mut conn = self
                .conn
                .lock()
                .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
            let tx = conn
                .transaction()
                .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

            if load.status == LoadStatus::Posted {
                let existing = BidRepository::find_by_load_id_tx(&tx, &request.load_id)?;
                if existing.is_empty() {
                    load.status = LoadStatus::OpenForBids;
                    LoadRepository::update_tx(&tx, &load)?;
                }
            }

            BidRepository::create_tx(&tx, &bid)?;

            tx.commit()
                .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;
        }

        info!(bid_id = %bid.bid_id, load_id = %bid.load_id, "竞价已提交");
        Ok(bid)
    }

    /// 按条件查询竞价列表 (纯读取,过滤条件可任意组合)
    pub fn list_bids(
        &self,
        load_id: Option<String>,
        transporter_id: Option<String>,
        status: Option<BidStatus>,
    ) -> ApiResult<Vec<Bid>> {
        let filter = BidFilter {
            load_id,
            transporter_id,
            status,
        };
        Ok(self.bid_repo.find_filtered(&filter)?)
    }

    /// 按ID查询竞价
    pub fn get_bid_by_id(&self, bid_id: &str) -> ApiResult<Bid> {
        self.bid_repo
            .find_by_id(bid_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Bid(id={})不存在", bid_id)))
    }

    /// 拒绝竞价
    ///
    /// 无条件置为 REJECTED 并落库:
    /// - 重复拒绝是幂等的,不报错
    /// - 已接受的竞价同样可被拒绝 (既有行为保留)
    #[instrument(skip(self))]
    pub fn reject_bid(&self, bid_id: &str) -> ApiResult<Bid> {
        let mut bid = self.get_bid_by_id(bid_id)?;

        bid.status = BidStatus::Rejected;
        self.bid_repo.update_status(bid_id, BidStatus::Rejected)?;

        info!(bid_id = %bid.bid_id, "竞价已拒绝");
        Ok(bid)
    }
}
