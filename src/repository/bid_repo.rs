// ==========================================
// 货运运力撮合系统 - 竞价仓储
// ==========================================
// 说明: 按 rowid 自然序返回,保证检索顺序即提交顺序
// ==========================================

use crate::domain::bid::Bid;
use crate::domain::types::BidStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::sync::{Arc, Mutex};

/// 竞价列表过滤条件,全部可选且可组合
#[derive(Debug, Clone, Default)]
pub struct BidFilter {
    pub load_id: Option<String>,
    pub transporter_id: Option<String>,
    pub status: Option<BidStatus>,
}

// ==========================================
// BidRepository - 竞价仓储
// ==========================================
pub struct BidRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BidRepository {
    /// 创建新的BidRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建竞价
    pub fn create(&self, bid: &Bid) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        Self::create_tx(&conn, bid)
    }

    /// 创建竞价 (事务内复用)
    pub fn create_tx(conn: &Connection, bid: &Bid) -> RepositoryResult<String> {
        conn.execute(
            r#"INSERT INTO bids (
                bid_id, load_id, transporter_id, proposed_rate,
                trucks_offered, truck_type, status, submitted_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &bid.bid_id,
                &bid.load_id,
                &bid.transporter_id,
                &bid.proposed_rate,
                &bid.trucks_offered,
                &bid.truck_type,
                bid.status.to_db_str(),
                &bid.submitted_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        Ok(bid.bid_id.clone())
    }

    /// 按bid_id查询竞价
    pub fn find_by_id(&self, bid_id: &str) -> RepositoryResult<Option<Bid>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, bid_id)
    }

    /// 按bid_id查询竞价 (事务内复用)
    pub fn find_by_id_tx(conn: &Connection, bid_id: &str) -> RepositoryResult<Option<Bid>> {
        match conn.query_row(
            &format!("{} WHERE bid_id = ?", SELECT_BID),
            params![bid_id],
            map_row,
        ) {
            Ok(bid) => Ok(Some(bid)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询货载的全部竞价 (提交顺序)
    pub fn find_by_load_id(&self, load_id: &str) -> RepositoryResult<Vec<Bid>> {
        let conn = self.get_conn()?;
        Self::find_by_load_id_tx(&conn, load_id)
    }

    /// 查询货载的全部竞价 (事务内复用)
    pub fn find_by_load_id_tx(conn: &Connection, load_id: &str) -> RepositoryResult<Vec<Bid>> {
        let mut stmt = conn.prepare(&format!(
            "{} WHERE load_id = ? ORDER BY rowid",
            SELECT_BID
        ))?;
        let bids = stmt
            .query_map(params![load_id], map_row)?
            .collect::<Result<Vec<Bid>, _>>()?;
        Ok(bids)
    }

    /// 按条件查询竞价列表 (提交顺序)
    pub fn find_filtered(&self, filter: &BidFilter) -> RepositoryResult<Vec<Bid>> {
        let conn = self.get_conn()?;

        let mut sql = format!("{} WHERE 1=1", SELECT_BID);
        let mut values: Vec<Value> = Vec::new();

        if let Some(ref load_id) = filter.load_id {
            sql.push_str(" AND load_id = ?");
            values.push(Value::from(load_id.clone()));
        }
        if let Some(ref transporter_id) = filter.transporter_id {
            sql.push_str(" AND transporter_id = ?");
            values.push(Value::from(transporter_id.clone()));
        }
        if let Some(status) = filter.status {
            sql.push_str(" AND status = ?");
            values.push(Value::from(status.to_db_str().to_string()));
        }
        sql.push_str(" ORDER BY rowid");

        let mut stmt = conn.prepare(&sql)?;
        let bids = stmt
            .query_map(params_from_iter(values.iter()), map_row)?
            .collect::<Result<Vec<Bid>, _>>()?;

        Ok(bids)
    }

    /// 更新竞价状态
    pub fn update_status(&self, bid_id: &str, status: BidStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::update_status_tx(&conn, bid_id, status)
    }

    /// 更新竞价状态 (事务内复用)
    pub fn update_status_tx(
        conn: &Connection,
        bid_id: &str,
        status: BidStatus,
    ) -> RepositoryResult<()> {
        let rows_affected = conn.execute(
            "UPDATE bids SET status = ? WHERE bid_id = ?",
            params![status.to_db_str(), bid_id],
        )?;

        if rows_affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Bid".to_string(),
                id: bid_id.to_string(),
            });
        }

        Ok(())
    }
}

/// 竞价查询字段列表 (与 map_row 对齐)
const SELECT_BID: &str = r#"SELECT bid_id, load_id, transporter_id, proposed_rate,
       trucks_offered, truck_type, status, submitted_at
  FROM bids"#;

/// 映射数据库行到Bid对象
fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Bid> {
    let status: String = row.get(6)?;
    let submitted_at: String = row.get(7)?;
    Ok(Bid {
        bid_id: row.get(0)?,
        load_id: row.get(1)?,
        transporter_id: row.get(2)?,
        proposed_rate: row.get(3)?,
        trucks_offered: row.get(4)?,
        truck_type: row.get(5)?,
        status: BidStatus::from_str(&status),
        submitted_at: NaiveDateTime::parse_from_str(&submitted_at, "%Y-%m-%d %H:%M:%S")
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    7,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
    })
}
