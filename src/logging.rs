use std::str::FromStr;

use tracing::Level;

/// 安装 fmt 日志输出；无法识别的级别按 info 处理
pub fn init_tracing(level: &str) {
    let level = Level::from_str(level.trim()).unwrap_or(Level::INFO);
    // 重复初始化（例如测试中）时忽略错误
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
