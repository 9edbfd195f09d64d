// ==========================================
// 货运运力撮合系统 - 日志初始化
// ==========================================
// 工具: tracing + tracing-subscriber (EnvFilter)
// 约定: 库本身只发事件,订阅器由宿主进程装配
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 缺省日志级别 (RUST_LOG 未设置时)
const DEFAULT_FILTER: &str = "info";

/// 初始化宿主进程的日志订阅器
///
/// 过滤器取自 RUST_LOG,例如:
/// `RUST_LOG=debug` 或 `RUST_LOG=freight_broker=trace`
///
/// # 示例
/// ```no_run
/// freight_broker::logging::init();
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// 测试用日志订阅器
///
/// debug 级别,输出接入测试捕获;重复调用安全 (try_init)
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
