// ==========================================
// 货运运力撮合系统 - 承运商管理 API
// ==========================================
// 职责: 承运商注册、查询,车辆台账整体替换
// ==========================================

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::transporter::{Transporter, Truck};
use crate::repository::transporter_repo::TransporterRepository;
use crate::repository::truck_repo::TruckRepository;

/// 车辆台账行 (车型 + 数量)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TruckSpec {
    pub truck_type: String,
    pub count: Option<i32>,
}

// ==========================================
// TransporterApi - 承运商管理 API
// ==========================================

/// 承运商管理API
///
/// 职责:
/// 1. 承运商注册 (评级范围校验)
/// 2. 承运商查询
/// 3. 车辆台账整体替换
pub struct TransporterApi {
    transporter_repo: Arc<TransporterRepository>,
    truck_repo: Arc<TruckRepository>,
}

impl TransporterApi {
    /// 创建新的TransporterApi实例
    pub fn new(
        transporter_repo: Arc<TransporterRepository>,
        truck_repo: Arc<TruckRepository>,
    ) -> Self {
        Self {
            transporter_repo,
            truck_repo,
        }
    }

    /// 注册承运商
    ///
    /// rating 可缺省 (未评级按 0 参与评分);给定时必须落在 [0.0, 5.0]
    #[instrument(skip(self, company_name, rating), fields(company = %company_name))]
    pub fn create_transporter(
        &self,
        company_name: String,
        rating: Option<f64>,
    ) -> ApiResult<Transporter> {
        if let Some(r) = rating {
            if !(0.0..=5.0).contains(&r) {
                return Err(ApiError::ValidationError(format!(
                    "承运商评级必须在0.0到5.0之间: {}",
                    r
                )));
            }
        }

        let transporter = Transporter {
            transporter_id: Uuid::new_v4().to_string(),
            company_name,
            rating,
        };
        self.transporter_repo.create(&transporter)?;

        info!(transporter_id = %transporter.transporter_id, "承运商已注册");
        Ok(transporter)
    }

    /// 按ID查询承运商
    pub fn get_transporter_by_id(&self, transporter_id: &str) -> ApiResult<Transporter> {
        self.transporter_repo
            .find_by_id(transporter_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Transporter(id={})不存在", transporter_id)))
    }

    /// 整体替换承运商的车辆台账
    ///
    /// 先删后插,台账行获得新的truck_id;数量为负即拒绝,
    /// 缺省数量按 NULL 落库 (读取侧视为 0)
    #[instrument(skip(self, trucks), fields(rows = trucks.len()))]
    pub fn update_trucks(&self, transporter_id: &str, trucks: Vec<TruckSpec>) -> ApiResult<()> {
        self.get_transporter_by_id(transporter_id)?;

        for spec in &trucks {
            if let Some(n) = spec.count {
                if n < 0 {
                    return Err(ApiError::ValidationError(format!(
                        "车型{}的数量不能为负数: {}",
                        spec.truck_type, n
                    )));
                }
            }
        }

        let rows: Vec<(String, Option<i32>)> = trucks
            .into_iter()
            .map(|s| (s.truck_type, s.count))
            .collect();
        self.truck_repo.replace_all(transporter_id, &rows)?;

        info!(transporter_id = %transporter_id, "车辆台账已替换");
        Ok(())
    }

    /// 查询承运商的车辆台账
    pub fn list_trucks(&self, transporter_id: &str) -> ApiResult<Vec<Truck>> {
        self.get_transporter_by_id(transporter_id)?;
        Ok(self.truck_repo.find_by_transporter(transporter_id)?)
    }
}
