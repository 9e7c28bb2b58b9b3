//! 工具模块集合
//!
//! 包含CLI、文件列表扫描、格式化、渲染等工具模块，支持main.rs的流程控制。

pub mod cli;
pub mod constants;
pub mod formatter;
pub mod logging;
pub mod renderer;
pub mod scanner;
pub mod utils;

// 重新导出主要的公共接口
pub use cli::{AppConfig, build_command, parse_args, show_completion_info, show_startup_info};
pub use formatter::{create_report_header, format_run_summary};
pub use logging::init_tracing;
pub use renderer::{HistogramRenderer, JsonRenderer, TextRenderer};
pub use scanner::{load_file_list, scan_data_files, show_scan_results};
pub use utils::path;
