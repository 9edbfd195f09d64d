// ==========================================
// 货运运力撮合系统 - 货载仓储
// ==========================================
// 红线: 货载的每次更新必须携带读取时的 version,
//       过期 version 的写入以乐观锁冲突失败
// ==========================================

use crate::domain::load::Load;
use crate::domain::types::{LoadStatus, WeightUnit};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::sync::{Arc, Mutex};

/// 货载列表过滤条件,全部可选且可组合
#[derive(Debug, Clone, Default)]
pub struct LoadFilter {
    pub status: Option<LoadStatus>,
    pub shipper_id: Option<String>,
}

// ==========================================
// LoadRepository - 货载仓储
// ==========================================
pub struct LoadRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LoadRepository {
    /// 创建新的LoadRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建货载
    pub fn create(&self, load: &Load) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        Self::create_tx(&conn, load)
    }

    /// 创建货载 (事务内复用)
    pub fn create_tx(conn: &Connection, load: &Load) -> RepositoryResult<String> {
        conn.execute(
            r#"INSERT INTO loads (
                load_id, shipper_id, pickup_location, delivery_location,
                weight, weight_unit, cargo_type, pickup_date, delivery_date,
                offered_price, trucks_required, remaining_trucks,
                status, version, date_posted
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &load.load_id,
                &load.shipper_id,
                &load.pickup_location,
                &load.delivery_location,
                &load.weight,
                load.weight_unit.to_db_str(),
                &load.cargo_type,
                &load.pickup_date.format("%Y-%m-%d %H:%M:%S").to_string(),
                &load.delivery_date.format("%Y-%m-%d %H:%M:%S").to_string(),
                &load.offered_price,
                &load.trucks_required,
                &load.remaining_trucks,
                load.status.to_db_str(),
                &load.version,
                &load.date_posted.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        Ok(load.load_id.clone())
    }

    /// 按load_id查询货载
    pub fn find_by_id(&self, load_id: &str) -> RepositoryResult<Option<Load>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, load_id)
    }

    /// 按load_id查询货载 (事务内复用)
    pub fn find_by_id_tx(conn: &Connection, load_id: &str) -> RepositoryResult<Option<Load>> {
        match conn.query_row(
            &format!("{} WHERE load_id = ?", SELECT_LOAD),
            params![load_id],
            map_row,
        ) {
            Ok(load) => Ok(Some(load)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按条件查询货载列表 (按发布时间倒序)
    pub fn find_filtered(&self, filter: &LoadFilter) -> RepositoryResult<Vec<Load>> {
        let conn = self.get_conn()?;

        let mut sql = format!("{} WHERE 1=1", SELECT_LOAD);
        let mut values: Vec<Value> = Vec::new();

        if let Some(status) = filter.status {
            sql.push_str(" AND status = ?");
            values.push(Value::from(status.to_db_str().to_string()));
        }
        if let Some(ref shipper_id) = filter.shipper_id {
            sql.push_str(" AND shipper_id = ?");
            values.push(Value::from(shipper_id.clone()));
        }
        sql.push_str(" ORDER BY date_posted DESC, load_id");

        let mut stmt = conn.prepare(&sql)?;
        let loads = stmt
            .query_map(params_from_iter(values.iter()), map_row)?
            .collect::<Result<Vec<Load>, _>>()?;

        Ok(loads)
    }

    /// 更新货载 (带乐观锁检查)
    ///
    /// # 并发控制
    /// 使用乐观锁 (version字段) 防止并发更新丢失:
    /// 写入条件为读取时的 version,落库时 version + 1
    ///
    /// # 错误
    /// - `RepositoryError::OptimisticLockFailure`: version不匹配 (其他事务已更新)
    /// - `RepositoryError::NotFound`: load_id不存在
    pub fn update(&self, load: &Load) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::update_tx(&conn, load)
    }

    /// 更新货载 (事务内复用,带乐观锁检查)
    pub fn update_tx(conn: &Connection, load: &Load) -> RepositoryResult<()> {
        // 执行更新,带version检查
        let rows_affected = conn.execute(
            r#"UPDATE loads
               SET remaining_trucks = ?, status = ?, version = version + 1
               WHERE load_id = ? AND version = ?"#,
            params![
                &load.remaining_trucks,
                load.status.to_db_str(),
                &load.load_id,
                &load.version,
            ],
        )?;

        // 检查是否更新成功
        if rows_affected == 0 {
            // 判断是记录不存在还是version冲突
            let exists: Result<i64, _> = conn.query_row(
                "SELECT version FROM loads WHERE load_id = ?",
                params![&load.load_id],
                |row| row.get(0),
            );

            match exists {
                Ok(actual_version) => {
                    // 记录存在,但version不匹配 -> 乐观锁冲突
                    return Err(RepositoryError::OptimisticLockFailure {
                        load_id: load.load_id.clone(),
                        expected: load.version,
                        actual: actual_version,
                    });
                }
                Err(_) => {
                    // 记录不存在
                    return Err(RepositoryError::NotFound {
                        entity: "Load".to_string(),
                        id: load.load_id.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// 货载查询字段列表 (与 map_row 对齐)
const SELECT_LOAD: &str = r#"SELECT load_id, shipper_id, pickup_location, delivery_location,
       weight, weight_unit, cargo_type, pickup_date, delivery_date,
       offered_price, trucks_required, remaining_trucks,
       status, version, date_posted
  FROM loads"#;

/// 映射数据库行到Load对象
fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Load> {
    let weight_unit: String = row.get(5)?;
    let status: String = row.get(12)?;
    Ok(Load {
        load_id: row.get(0)?,
        shipper_id: row.get(1)?,
        pickup_location: row.get(2)?,
        delivery_location: row.get(3)?,
        weight: row.get(4)?,
        weight_unit: WeightUnit::from_str(&weight_unit),
        cargo_type: row.get(6)?,
        pickup_date: parse_datetime(row, 7)?,
        delivery_date: parse_datetime(row, 8)?,
        offered_price: row.get(9)?,
        trucks_required: row.get(10)?,
        remaining_trucks: row.get(11)?,
        status: LoadStatus::from_str(&status),
        version: row.get(13)?,
        date_posted: parse_datetime(row, 14)?,
    })
}

/// 解析 TEXT 时间戳列
fn parse_datetime(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let s: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
