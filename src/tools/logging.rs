//! 日志初始化
//!
//! 诊断信息通过 `tracing` 输出到stderr，报告文本仍走stdout。

use tracing_subscriber::EnvFilter;

/// 初始化全局 tracing 订阅者
///
/// 优先使用 `RUST_LOG`；未设置时默认 `info`，`verbose` 时为 `debug`。
/// 重复调用是无害的（后续调用被忽略）。
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
