// ==========================================
// 货运运力撮合系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免“部分模块外键开启/部分不开启”
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 统一建表入口，保证库/测试使用同一份 schema
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化数据库 schema（幂等）
///
/// 表结构：
/// - loads: 货载，携带乐观锁 version 字段
/// - transporters: 承运商
/// - trucks: 承运商车辆台账（同一车型允许多行并存）
/// - bids: 竞价
/// - bookings: 预订
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS transporters (
            transporter_id TEXT PRIMARY KEY,
            company_name   TEXT NOT NULL,
            rating         REAL
        );

        CREATE TABLE IF NOT EXISTS trucks (
            truck_id       TEXT PRIMARY KEY,
            transporter_id TEXT NOT NULL REFERENCES transporters(transporter_id),
            truck_type     TEXT NOT NULL,
            count          INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_truck_transporter ON trucks(transporter_id);

        CREATE TABLE IF NOT EXISTS loads (
            load_id           TEXT PRIMARY KEY,
            shipper_id        TEXT NOT NULL,
            pickup_location   TEXT NOT NULL,
            delivery_location TEXT NOT NULL,
            weight            REAL NOT NULL,
            weight_unit       TEXT NOT NULL,
            cargo_type        TEXT NOT NULL,
            pickup_date       TEXT NOT NULL,
            delivery_date     TEXT NOT NULL,
            offered_price     REAL NOT NULL,
            trucks_required   INTEGER NOT NULL,
            remaining_trucks  INTEGER NOT NULL,
            status            TEXT NOT NULL,
            version           INTEGER NOT NULL DEFAULT 0,
            date_posted       TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_load_status ON loads(status);
        CREATE INDEX IF NOT EXISTS idx_load_shipper_id ON loads(shipper_id);

        CREATE TABLE IF NOT EXISTS bids (
            bid_id         TEXT PRIMARY KEY,
            load_id        TEXT NOT NULL REFERENCES loads(load_id),
            transporter_id TEXT NOT NULL REFERENCES transporters(transporter_id),
            proposed_rate  REAL NOT NULL,
            trucks_offered INTEGER NOT NULL,
            truck_type     TEXT NOT NULL,
            status         TEXT NOT NULL,
            submitted_at   TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_bid_load ON bids(load_id);
        CREATE INDEX IF NOT EXISTS idx_bid_transporter ON bids(transporter_id);

        CREATE TABLE IF NOT EXISTS bookings (
            booking_id       TEXT PRIMARY KEY,
            load_id          TEXT NOT NULL REFERENCES loads(load_id),
            bid_id           TEXT NOT NULL REFERENCES bids(bid_id),
            transporter_id   TEXT NOT NULL REFERENCES transporters(transporter_id),
            allocated_trucks INTEGER NOT NULL,
            final_rate       REAL NOT NULL,
            status           TEXT NOT NULL,
            booked_at        TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_booking_load ON bookings(load_id);
        "#,
    )?;
    Ok(())
}
