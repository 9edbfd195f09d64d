// ==========================================
// 货运运力撮合系统 - 承运商仓储
// ==========================================

use crate::domain::transporter::Transporter;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// TransporterRepository - 承运商仓储
// ==========================================
pub struct TransporterRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TransporterRepository {
    /// 创建新的TransporterRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建承运商
    pub fn create(&self, transporter: &Transporter) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO transporters (transporter_id, company_name, rating)
               VALUES (?, ?, ?)"#,
            params![
                &transporter.transporter_id,
                &transporter.company_name,
                &transporter.rating,
            ],
        )?;

        Ok(transporter.transporter_id.clone())
    }

    /// 按transporter_id查询承运商
    pub fn find_by_id(&self, transporter_id: &str) -> RepositoryResult<Option<Transporter>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, transporter_id)
    }

    /// 按transporter_id查询承运商 (事务内复用)
    pub fn find_by_id_tx(
        conn: &Connection,
        transporter_id: &str,
    ) -> RepositoryResult<Option<Transporter>> {
        match conn.query_row(
            r#"SELECT transporter_id, company_name, rating
               FROM transporters
               WHERE transporter_id = ?"#,
            params![transporter_id],
            map_row,
        ) {
            Ok(transporter) => Ok(Some(transporter)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// 映射数据库行到Transporter对象
fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Transporter> {
    Ok(Transporter {
        transporter_id: row.get(0)?,
        company_name: row.get(1)?,
        rating: row.get(2)?,
    })
}
