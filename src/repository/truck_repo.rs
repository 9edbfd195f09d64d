// ==========================================
// 货运运力撮合系统 - 车辆台账仓储
// ==========================================
// 职责: 承运商按车型的运力台账,扣减/回补/整体替换
// 说明: 同一车型允许多行并存;扣减与回补只作用于
//       台账序(rowid)上第一条匹配行,该行自身不足时
//       可能被写成负数,调用方以车型总量校验为准
// 红线: 台账行不携带并发修订号,读改写之间无锁
// ==========================================

use crate::domain::transporter::Truck;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// TruckRepository - 车辆台账仓储
// ==========================================
pub struct TruckRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TruckRepository {
    /// 创建新的TruckRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询承运商的全部台账行 (台账序)
    pub fn find_by_transporter(&self, transporter_id: &str) -> RepositoryResult<Vec<Truck>> {
        let conn = self.get_conn()?;
        Self::find_by_transporter_tx(&conn, transporter_id)
    }

    /// 查询承运商的全部台账行 (事务内复用)
    pub fn find_by_transporter_tx(
        conn: &Connection,
        transporter_id: &str,
    ) -> RepositoryResult<Vec<Truck>> {
        let mut stmt = conn.prepare(
            r#"SELECT truck_id, transporter_id, truck_type, count
               FROM trucks
               WHERE transporter_id = ?
               ORDER BY rowid"#,
        )?;
        let trucks = stmt
            .query_map(params![transporter_id], map_row)?
            .collect::<Result<Vec<Truck>, _>>()?;
        Ok(trucks)
    }

    /// 某车型的可用车辆总数 (跨行求和,空值按 0 计)
    pub fn available_count(
        &self,
        transporter_id: &str,
        truck_type: &str,
    ) -> RepositoryResult<i32> {
        let conn = self.get_conn()?;
        Self::available_count_tx(&conn, transporter_id, truck_type)
    }

    /// 某车型的可用车辆总数 (事务内复用)
    pub fn available_count_tx(
        conn: &Connection,
        transporter_id: &str,
        truck_type: &str,
    ) -> RepositoryResult<i32> {
        let total: i64 = conn.query_row(
            r#"SELECT COALESCE(SUM(COALESCE(count, 0)), 0)
               FROM trucks
               WHERE transporter_id = ? AND truck_type = ?"#,
            params![transporter_id, truck_type],
            |row| row.get(0),
        )?;
        // SUM 的结果是 i64,台账异常大时不允许静默截断
        i32::try_from(total).map_err(|_| {
            RepositoryError::InternalError(format!(
                "承运商{}车型{}运力总数{}超出 i32 范围",
                transporter_id, truck_type, total
            ))
        })
    }

    /// 扣减运力 (事务内复用)
    ///
    /// 作用于台账序上第一条匹配行: count -= n (空值按 0 计)。
    /// 调用方须先以 available_count 对车型总量校验;
    /// 该行自身不足 n 时仍在该行扣减,可能写成负数。
    ///
    /// # 错误
    /// - `RepositoryError::NotFound`: 无该车型台账行
    pub fn deduct_tx(
        conn: &Connection,
        transporter_id: &str,
        truck_type: &str,
        n: i32,
    ) -> RepositoryResult<()> {
        Self::adjust_first_row_tx(conn, transporter_id, truck_type, -n)
    }

    /// 回补运力 (事务内复用)
    ///
    /// 作用于台账序上第一条匹配行: count += n,与扣减同样的单行语义。
    pub fn restore_tx(
        conn: &Connection,
        transporter_id: &str,
        truck_type: &str,
        n: i32,
    ) -> RepositoryResult<()> {
        Self::adjust_first_row_tx(conn, transporter_id, truck_type, n)
    }

    /// 对第一条匹配行应用增量
    fn adjust_first_row_tx(
        conn: &Connection,
        transporter_id: &str,
        truck_type: &str,
        delta: i32,
    ) -> RepositoryResult<()> {
        let first_row: Option<(String, Option<i32>)> = match conn.query_row(
            r#"SELECT truck_id, count
               FROM trucks
               WHERE transporter_id = ? AND truck_type = ?
               ORDER BY rowid
               LIMIT 1"#,
            params![transporter_id, truck_type],
            |row| Ok((row.get(0)?, row.get(1)?)),
        ) {
            Ok(pair) => Some(pair),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };

        let (truck_id, count) = first_row.ok_or_else(|| RepositoryError::NotFound {
            entity: "Truck".to_string(),
            id: format!("{}/{}", transporter_id, truck_type),
        })?;

        conn.execute(
            "UPDATE trucks SET count = ? WHERE truck_id = ?",
            params![count.unwrap_or(0) + delta, &truck_id],
        )?;

        Ok(())
    }

    /// 整体替换承运商台账
    ///
    /// 删除该承运商的全部既有行,插入新行集 (分配新的行ID),
    /// 在单个事务内完成。
    pub fn replace_all(
        &self,
        transporter_id: &str,
        rows: &[(String, Option<i32>)],
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        Self::replace_all_tx(&tx, transporter_id, rows)?;
        tx.commit()?;
        Ok(())
    }

    /// 整体替换承运商台账 (事务内复用)
    ///
    /// rows: (truck_type, count) 对的列表,插入顺序即台账序
    pub fn replace_all_tx(
        conn: &Connection,
        transporter_id: &str,
        rows: &[(String, Option<i32>)],
    ) -> RepositoryResult<()> {
        conn.execute(
            "DELETE FROM trucks WHERE transporter_id = ?",
            params![transporter_id],
        )?;

        for (truck_type, count) in rows {
            conn.execute(
                r#"INSERT INTO trucks (truck_id, transporter_id, truck_type, count)
                   VALUES (?, ?, ?, ?)"#,
                params![
                    Uuid::new_v4().to_string(),
                    transporter_id,
                    truck_type,
                    count,
                ],
            )?;
        }

        Ok(())
    }
}

/// 映射数据库行到Truck对象
fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Truck> {
    Ok(Truck {
        truck_id: row.get(0)?,
        transporter_id: row.get(1)?,
        truck_type: row.get(2)?,
        count: row.get(3)?,
    })
}
