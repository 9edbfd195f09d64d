// ==========================================
// 货运运力撮合系统 - 预订管理 API
// ==========================================
// 职责: 预订创建、查询、取消
// 红线:
//   1. 写入阶段全部落在单事务内,货载行以版本号 CAS 提交,
//      冲突时事务整体回滚并返回 VersionConflict
//   2. 车辆台账行没有版本戳,台账扣减不参与 CAS;
//      该缺口是既有行为,调用方不得依赖台账的并发精确性
//   3. 取消预订不回退竞价状态;已取消的预订拒绝重复取消,
//      保证台账回补不会发生第二次
// ==========================================

use chrono::Utc;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::booking::Booking;
use crate::domain::types::{BidStatus, BookingStatus, LoadAction, LoadStatus};
use crate::engine::status_validator::StatusValidator;
use crate::repository::bid_repo::{BidFilter, BidRepository};
use crate::repository::booking_repo::BookingRepository;
use crate::repository::load_repo::LoadRepository;
use crate::repository::transporter_repo::TransporterRepository;
use crate::repository::truck_repo::TruckRepository;

/// 预订创建请求
///
/// transporter_id 与 final_rate 由调用方显式给定,
/// 不从竞价反推 (沿用既有请求契约)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub load_id: String,
    pub bid_id: String,
    pub transporter_id: String,
    pub allocated_trucks: i32,
    pub final_rate: f64,
}

// ==========================================
// BookingApi - 预订管理 API
// ==========================================

/// 预订管理API
///
/// 职责:
/// 1. 预订创建 (竞价接受 + 台账扣减 + 货载余量推进)
/// 2. 预订查询
/// 3. 预订取消 (台账回补 + 货载余量回退)
pub struct BookingApi {
    conn: Arc<Mutex<Connection>>,
    load_repo: Arc<LoadRepository>,
    bid_repo: Arc<BidRepository>,
    booking_repo: Arc<BookingRepository>,
    transporter_repo: Arc<TransporterRepository>,
    truck_repo: Arc<TruckRepository>,
}

impl BookingApi {
    /// 创建新的BookingApi实例
    pub fn new(
        conn: Arc<Mutex<Connection>>,
        load_repo: Arc<LoadRepository>,
        bid_repo: Arc<BidRepository>,
        booking_repo: Arc<BookingRepository>,
        transporter_repo: Arc<TransporterRepository>,
        truck_repo: Arc<TruckRepository>,
    ) -> Self {
        Self {
            conn,
            load_repo,
            bid_repo,
            booking_repo,
            transporter_repo,
            truck_repo,
        }
    }

    /// 创建预订 (接受竞价)
    ///
    /// 流程:
    /// 1. 货载必须存在,且状态允许预订
    /// 2. 竞价必须存在且归属该货载
    /// 3. 承运商必须存在
    /// 4. 该货载不得已有被接受的竞价 (单接受竞价规则)
    /// 5. allocated_trucks 在 [1, remaining_trucks] 内
    /// 6. 承运商该车型可用车辆总数 >= allocated_trucks
    /// 7. 事务内: 扣减台账、递减余量、余量归零时推进为 BOOKED、
    ///    CAS 持久化货载、落库 CONFIRMED 预订、竞价置为 ACCEPTED
    ///
    /// 版本冲突时整个事务回滚,返回 VersionConflict
    #[instrument(skip(self, request), fields(
        load_id = %request.load_id,
        bid_id = %request.bid_id
    ))]
    pub fn create_booking(&self, request: CreateBookingRequest) -> ApiResult<Booking> {
        // ---------- 读取阶段 ----------
        let mut load = self
            .load_repo
            .find_by_id(&request.load_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Load(id={})不存在", request.load_id)))?;

        StatusValidator::validate_action(load.status, LoadAction::Book)?;

        let bid = self
            .bid_repo
            .find_by_id(&request.bid_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Bid(id={})不存在", request.bid_id)))?;
        if bid.load_id != request.load_id {
            return Err(ApiError::ValidationError(format!(
                "竞价{}不属于货载{}",
                request.bid_id, request.load_id
            )));
        }

        self.transporter_repo
            .find_by_id(&request.transporter_id)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Transporter(id={})不存在", request.transporter_id))
            })?;

        // 单接受竞价规则: 已有 ACCEPTED 竞价时拒绝再预订
        let accepted = self.bid_repo.find_filtered(&BidFilter {
            load_id: Some(request.load_id.clone()),
            transporter_id: None,
            status: Some(BidStatus::Accepted),
        })?;
        if !accepted.is_empty() {
            return Err(ApiError::InvalidStatusTransition(format!(
                "货载{}已存在被接受的竞价,不能重复预订",
                request.load_id
            )));
        }

        if request.allocated_trucks < 1 {
            return Err(ApiError::ValidationError(format!(
                "分配车辆数必须为正数: {}",
                request.allocated_trucks
            )));
        }
        if request.allocated_trucks > load.remaining_trucks {
            return Err(ApiError::InsufficientCapacity {
                context: format!("货载{}剩余需求", load.load_id),
                requested: request.allocated_trucks,
                available: load.remaining_trucks,
            });
        }

        let available = self
            .truck_repo
            .available_count(&request.transporter_id, &bid.truck_type)?;
        if request.allocated_trucks > available {
            return Err(ApiError::InsufficientCapacity {
                context: format!("承运商{}车型{}", request.transporter_id, bid.truck_type),
                requested: request.allocated_trucks,
                available,
            });
        }

        let booking = Booking {
            booking_id: Uuid::new_v4().to_string(),
            load_id: request.load_id.clone(),
            bid_id: request.bid_id.clone(),
            transporter_id: request.transporter_id.clone(),
            allocated_trucks: request.allocated_trucks,
            final_rate: request.final_rate,
            status: BookingStatus::Confirmed,
            booked_at: Utc::now().naive_utc(),
        };

        // ---------- 写入阶段: 单事务 ----------
        {
            let mut conn = self
                .conn
                .lock()
                .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
            let tx = conn
                .transaction()
                .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

            TruckRepository::deduct_tx(
                &tx,
                &request.transporter_id,
                &bid.truck_type,
                request.allocated_trucks,
            )?;

            load.remaining_trucks -= request.allocated_trucks;
            if load.remaining_trucks == 0 {
                StatusValidator::validate_booked_status(load.remaining_trucks)?;
                load.status = LoadStatus::Booked;
            }

            // 版本不匹配时这里返回 OptimisticLockFailure,
            // tx 随之丢弃,台账扣减一并回滚
            LoadRepository::update_tx(&tx, &load)?;

            BookingRepository::create_tx(&tx, &booking)?;
            BidRepository::update_status_tx(&tx, &request.bid_id, BidStatus::Accepted)?;

            tx.commit()
                .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;
        }

        info!(
            booking_id = %booking.booking_id,
            load_id = %booking.load_id,
            allocated = booking.allocated_trucks,
            "预订已创建"
        );
        Ok(booking)
    }

    /// 按ID查询预订
    pub fn get_booking_by_id(&self, booking_id: &str) -> ApiResult<Booking> {
        self.booking_repo
            .find_by_id(booking_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Booking(id={})不存在", booking_id)))
    }

    /// 查询货载下的全部预订
    pub fn get_bookings_by_load(&self, load_id: &str) -> ApiResult<Vec<Booking>> {
        Ok(self.booking_repo.find_by_load_id(load_id)?)
    }

    /// 取消预订
    ///
    /// 流程 (单事务):
    /// 1. 回补台账 allocated_trucks 辆
    /// 2. 货载余量 += allocated_trucks
    /// 3. BOOKED 货载恰好回到满额需求时回退为 OPEN_FOR_BIDS
    /// 4. CAS 持久化货载,预订置为 CANCELLED
    ///
    /// 已处于 CANCELLED 的预订直接拒绝,回补台账只允许发生一次
    /// 竞价状态不回退,ACCEPTED 的竞价保持原样
    #[instrument(skip(self))]
    pub fn cancel_booking(&self, booking_id: &str) -> ApiResult<Booking> {
        let mut booking = self.get_booking_by_id(booking_id)?;
        if booking.status == BookingStatus::Cancelled {
            warn!(booking_id = %booking.booking_id, "预订已处于CANCELLED,拒绝重复取消");
            return Err(ApiError::InvalidStatusTransition(format!(
                "预订{}已取消,不能重复取消",
                booking.booking_id
            )));
        }

        let mut load = self
            .load_repo
            .find_by_id(&booking.load_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Load(id={})不存在", booking.load_id)))?;

        let bid = self
            .bid_repo
            .find_by_id(&booking.bid_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Bid(id={})不存在", booking.bid_id)))?;

        {
            let mut conn = self
                .conn
                .lock()
                .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
            let tx = conn
                .transaction()
                .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

            TruckRepository::restore_tx(
                &tx,
                &booking.transporter_id,
                &bid.truck_type,
                booking.allocated_trucks,
            )?;

            load.remaining_trucks += booking.allocated_trucks;
            if load.status == LoadStatus::Booked && load.remaining_trucks == load.trucks_required {
                load.status = LoadStatus::OpenForBids;
            }

            LoadRepository::update_tx(&tx, &load)?;
            BookingRepository::update_status_tx(&tx, booking_id, BookingStatus::Cancelled)?;

            tx.commit()
                .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;
        }

        booking.status = BookingStatus::Cancelled;
        info!(
            booking_id = %booking.booking_id,
            load_id = %booking.load_id,
            restored = booking.allocated_trucks,
            "预订已取消"
        );
        Ok(booking)
    }
}
