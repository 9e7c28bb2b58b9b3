//! 命令行接口模块
//!
//! 负责命令行参数解析、配置管理和程序信息展示。

use super::constants::{defaults, parallel_limits};
use crate::error::{AnalysisError, AnalysisResult};
use clap::{Arg, ArgMatches, Command, value_parser};
use std::path::PathBuf;

/// 应用程序版本信息
const VERSION: &str = env!("CARGO_PKG_VERSION");
const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// 应用程序配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 数据文件列表路径（每行一个数据文件）
    pub input_path: PathBuf,

    /// 是否显示详细信息
    pub verbose: bool,

    /// JSON直方图导出路径（可选）
    pub output_path: Option<PathBuf>,

    /// 每批最多事例数
    pub batch_events: usize,

    /// 批次内并行重建线程数（None表示串行）
    pub parallel_threads: Option<usize>,

    /// 预取通道深度（0表示不预取）
    pub prefetch_depth: usize,

    /// 文本图表行数
    pub chart_rows: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("files.txt"),
            verbose: false,
            output_path: None,
            batch_events: defaults::BATCH_EVENTS,
            parallel_threads: None,
            prefetch_depth: defaults::PREFETCH_DEPTH,
            chart_rows: defaults::CHART_ROWS,
        }
    }
}

impl AppConfig {
    /// 是否启用预取
    #[inline]
    pub fn prefetch_enabled(&self) -> bool {
        self.prefetch_depth > 0
    }

    /// 有效并行度（串行为None，1线程视为串行）
    pub fn effective_threads(&self) -> Option<usize> {
        self.parallel_threads
            .map(|n| {
                n.clamp(
                    parallel_limits::MIN_PARALLEL_DEGREE,
                    parallel_limits::MAX_PARALLEL_DEGREE,
                )
            })
            .filter(|&n| n > 1)
    }

    /// 验证配置
    ///
    /// # 错误
    ///
    /// * `InvalidInput` - 批大小或图表行数为0
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.batch_events == 0 {
            return Err(AnalysisError::InvalidInput(
                "--batch-events 必须大于0 / must be positive".to_string(),
            ));
        }
        if self.chart_rows == 0 {
            return Err(AnalysisError::InvalidInput(
                "--chart-rows 必须大于0 / must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// 构建命令行定义
pub fn build_command() -> Command {
    Command::new("tof-mass")
        .version(VERSION)
        .about(DESCRIPTION)
        .author("TOF Mass Team")
        .arg(
            Arg::new("INPUT")
                .help("数据文件列表（每行一个 .jsonl 数据文件或目录） / input file list")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("显示详细处理信息")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("导出直方图为JSON文件")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("batch-events")
                .long("batch-events")
                .help("每批最多事例数")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .default_value(defaults::BATCH_EVENTS.to_string()),
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .short('j')
                .help("批次内并行重建线程数（默认串行，上限16）")
                .value_name("N")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("prefetch")
                .long("prefetch")
                .help("预取批次数（0为关闭）")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .default_value(defaults::PREFETCH_DEPTH.to_string()),
        )
        .arg(
            Arg::new("chart-rows")
                .long("chart-rows")
                .help("终端图表行数")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .default_value(defaults::CHART_ROWS.to_string()),
        )
}

/// 从解析结果创建配置
pub fn config_from_matches(matches: &ArgMatches) -> AnalysisResult<AppConfig> {
    let input_path = matches
        .get_one::<String>("INPUT")
        .map(PathBuf::from)
        .ok_or_else(|| AnalysisError::InvalidInput("缺少输入文件列表 / missing INPUT".to_string()))?;

    let config = AppConfig {
        input_path,
        verbose: matches.get_flag("verbose"),
        output_path: matches.get_one::<String>("output").map(PathBuf::from),
        batch_events: matches
            .get_one::<usize>("batch-events")
            .copied()
            .unwrap_or(defaults::BATCH_EVENTS),
        parallel_threads: matches.get_one::<usize>("threads").copied(),
        prefetch_depth: matches
            .get_one::<usize>("prefetch")
            .copied()
            .unwrap_or(defaults::PREFETCH_DEPTH),
        chart_rows: matches
            .get_one::<usize>("chart-rows")
            .copied()
            .unwrap_or(defaults::CHART_ROWS),
    };

    config.validate()?;
    Ok(config)
}

/// 解析命令行参数并创建配置
///
/// 参数个数错误时由clap打印用法并以非零状态退出，此时尚未读取任何数据。
pub fn parse_args() -> AnalysisResult<AppConfig> {
    config_from_matches(&build_command().get_matches())
}

/// 显示程序启动信息
pub fn show_startup_info(config: &AppConfig) {
    println!("TOF Mass Tool v{VERSION} 启动 / starting");
    println!("{DESCRIPTION}");
    if config.verbose {
        println!(
            "   批大小 / batch size: {} events, 预取 / prefetch: {}, 并行 / threads: {}",
            config.batch_events,
            config.prefetch_depth,
            config.effective_threads().unwrap_or(1)
        );
    }
    println!();
}

/// 显示程序完成信息
pub fn show_completion_info(config: &AppConfig) {
    if config.verbose {
        println!("所有任务处理完成 / all done");
    }
}
