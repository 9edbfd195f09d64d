// ==========================================
// 货运运力撮合系统 - 预订仓储
// ==========================================

use crate::domain::booking::Booking;
use crate::domain::types::BookingStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// BookingRepository - 预订仓储
// ==========================================
pub struct BookingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BookingRepository {
    /// 创建新的BookingRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建预订
    pub fn create(&self, booking: &Booking) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        Self::create_tx(&conn, booking)
    }

    /// 创建预订 (事务内复用)
    pub fn create_tx(conn: &Connection, booking: &Booking) -> RepositoryResult<String> {
        conn.execute(
            r#"INSERT INTO bookings (
                booking_id, load_id, bid_id, transporter_id,
                allocated_trucks, final_rate, status, booked_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &booking.booking_id,
                &booking.load_id,
                &booking.bid_id,
                &booking.transporter_id,
                &booking.allocated_trucks,
                &booking.final_rate,
                booking.status.to_db_str(),
                &booking.booked_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        Ok(booking.booking_id.clone())
    }

    /// 按booking_id查询预订
    pub fn find_by_id(&self, booking_id: &str) -> RepositoryResult<Option<Booking>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, booking_id)
    }

    /// 按booking_id查询预订 (事务内复用)
    pub fn find_by_id_tx(conn: &Connection, booking_id: &str) -> RepositoryResult<Option<Booking>> {
        match conn.query_row(
            &format!("{} WHERE booking_id = ?", SELECT_BOOKING),
            params![booking_id],
            map_row,
        ) {
            Ok(booking) => Ok(Some(booking)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询货载的全部预订 (预订顺序)
    pub fn find_by_load_id(&self, load_id: &str) -> RepositoryResult<Vec<Booking>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "{} WHERE load_id = ? ORDER BY rowid",
            SELECT_BOOKING
        ))?;
        let bookings = stmt
            .query_map(params![load_id], map_row)?
            .collect::<Result<Vec<Booking>, _>>()?;
        Ok(bookings)
    }

    /// 更新预订状态 (事务内复用)
    pub fn update_status_tx(
        conn: &Connection,
        booking_id: &str,
        status: BookingStatus,
    ) -> RepositoryResult<()> {
        let rows_affected = conn.execute(
            "UPDATE bookings SET status = ? WHERE booking_id = ?",
            params![status.to_db_str(), booking_id],
        )?;

        if rows_affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Booking".to_string(),
                id: booking_id.to_string(),
            });
        }

        Ok(())
    }
}

/// 预订查询字段列表 (与 map_row 对齐)
const SELECT_BOOKING: &str = r#"SELECT booking_id, load_id, bid_id, transporter_id,
       allocated_trucks, final_rate, status, booked_at
  FROM bookings"#;

/// 映射数据库行到Booking对象
fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Booking> {
    let status: String = row.get(6)?;
    let booked_at: String = row.get(7)?;
    Ok(Booking {
        booking_id: row.get(0)?,
        load_id: row.get(1)?,
        bid_id: row.get(2)?,
        transporter_id: row.get(3)?,
        allocated_trucks: row.get(4)?,
        final_rate: row.get(5)?,
        status: BookingStatus::from_str(&status),
        booked_at: NaiveDateTime::parse_from_str(&booked_at, "%Y-%m-%d %H:%M:%S").map_err(
            |e| {
                rusqlite::Error::FromSqlConversionFailure(
                    7,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            },
        )?,
    })
}
