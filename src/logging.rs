// ==========================================
// 合同定价引擎 - 日志初始化
// ==========================================
// 工具: tracing + tracing-subscriber
// 级别: RUST_LOG（默认 info）
// 格式: 终端可读格式 / JSON（ORDER_PRICING_LOG_JSON 置位时）
// 红线: 日志写 stderr,stdout 只输出订单结果
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 选择 JSON 日志格式的环境变量
pub const LOG_JSON_ENV: &str = "ORDER_PRICING_LOG_JSON";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// 按环境变量选择格式（值为空、0、false 时视为未设置）
    pub fn from_env() -> Self {
        Self::from_flag(std::env::var(LOG_JSON_ENV).ok().as_deref())
    }

    fn from_flag(flag: Option<&str>) -> Self {
        match flag.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if !v.is_empty() && v != "0" && v != "false" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 初始化日志
///
/// # 示例
/// ```no_run
/// use order_pricing::logging::{self, LogFormat};
/// logging::init(LogFormat::from_env());
/// ```
pub fn init(format: LogFormat) {
    let builder = fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Pretty => builder.with_target(true).with_line_number(true).init(),
        // 带上当前 span（order_ref / material_id 等字段）
        LogFormat::Json => builder.json().with_current_span(true).init(),
    }
}

/// 测试用日志（debug 级别,输出交给测试框架捕获;可重复调用）
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("order_pricing=debug"))
        .with_test_writer()
        .try_init();
}
