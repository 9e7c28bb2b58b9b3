//! TOF Mass Tool - 主程序入口
//!
//! 纯流程控制器，负责协调各个工具模块完成质量重建任务。

use std::process;
use tof_mass_tool::{
    core::Binning,
    error::{AnalysisError, ErrorCategory},
    processing::{BatchReconstructor, MassPipeline},
    source::{BatchSource, FieldNames, JsonLinesSource, PrefetchSource},
    tools::{self, AppConfig, HistogramRenderer, JsonRenderer, TextRenderer, constants},
};

/// 错误退出码定义
mod exit_codes {
    /// 通用错误
    pub const GENERAL_ERROR: i32 = 1;
    /// 格式/输入错误
    pub const FORMAT_ERROR: i32 = 2;
    /// 计算错误
    pub const CALCULATION_ERROR: i32 = 4;
    /// 资源/并发错误
    pub const RESOURCE_ERROR: i32 = 5;
}

/// 获取错误建议文本
fn get_error_suggestion(error: &AnalysisError) -> &'static str {
    match error {
        AnalysisError::InvalidInput(_) => {
            "检查命令行参数与文件列表内容，使用 --help 查看完整用法 / Check command-line arguments and the file list, use --help to see full usage"
        }
        AnalysisError::ResourceError(_) => {
            "资源不可用，请检查系统资源或重试；可尝试 --prefetch 0 或去掉 --threads / Resource unavailable, retry or try --prefetch 0 / drop --threads"
        }
        _ => match ErrorCategory::from_analysis_error(error) {
            ErrorCategory::Io => {
                "检查文件列表中的路径是否正确，文件是否存在且可读 / Check that listed paths are correct and readable"
            }
            ErrorCategory::Format => {
                "确保数据文件为每行一个事例的JSON Lines，且包含 P/alpha/trackTime/trackLength 字段 / Ensure data files are JSON Lines events with P/alpha/trackTime/trackLength"
            }
            ErrorCategory::Calculation => {
                "直方图计算出现异常，请检查分箱配置 / Histogram calculation failed, check binning"
            }
            ErrorCategory::Other => {
                "请检查输入文件和参数设置 / Please check input files and parameter settings"
            }
        },
    }
}

/// 错误处理和建议
fn handle_error(error: AnalysisError) -> ! {
    let category = ErrorCategory::from_analysis_error(&error);
    eprintln!("[ERROR] 错误 / Error: {error}");
    eprintln!("[INFO] 类别 / Category: {}", category.display_name());
    eprintln!("[INFO] 建议 / Suggestion: {}", get_error_suggestion(&error));

    let exit_code = match &error {
        AnalysisError::InvalidInput(_) => exit_codes::FORMAT_ERROR,
        AnalysisError::ResourceError(_) => exit_codes::RESOURCE_ERROR,
        _ => match category {
            ErrorCategory::Format => exit_codes::FORMAT_ERROR,
            ErrorCategory::Calculation => exit_codes::CALCULATION_ERROR,
            ErrorCategory::Io | ErrorCategory::Other => exit_codes::GENERAL_ERROR,
        },
    };

    process::exit(exit_code);
}

/// 构建批次数据源（可选后台预取）
fn build_source(config: &AppConfig) -> Result<Box<dyn BatchSource>, AnalysisError> {
    let files = tools::load_file_list(&config.input_path)?;
    tools::show_scan_results(config, &files);
    print!("{}", tools::create_report_header(config, &files));

    let source = JsonLinesSource::open(files, FieldNames::default(), config.batch_events)?;
    tracing::debug!(
        files = source.file_count(),
        batch_events = config.batch_events,
        prefetch = config.prefetch_depth,
        "batch source ready"
    );

    if config.prefetch_enabled() {
        let prefetch = PrefetchSource::spawn(source, config.prefetch_depth)?;
        Ok(Box::new(prefetch))
    } else {
        Ok(Box::new(source))
    }
}

/// 构建批次重建器，线程池创建失败时降级为串行
fn build_reconstructor(config: &AppConfig) -> BatchReconstructor {
    match config.effective_threads() {
        None => BatchReconstructor::serial(),
        Some(threads) => BatchReconstructor::parallel(threads).unwrap_or_else(|e| {
            tracing::warn!(
                "并行重建不可用 / parallel reconstruction unavailable: {e}，回退到串行模式 / fallback to serial"
            );
            BatchReconstructor::serial()
        }),
    }
}

/// 应用程序主逻辑（便于测试和复用）
fn run() -> Result<(), AnalysisError> {
    // 1. 解析命令行参数（参数错误时clap直接退出）
    let config = tools::parse_args()?;
    tools::init_tracing(config.verbose);

    // 2. 显示启动信息
    tools::show_startup_info(&config);

    // 3. 构建数据源与流水线
    let mut source = build_source(&config)?;
    let pipeline = MassPipeline::new(build_reconstructor(&config));
    tracing::debug!(
        threads = pipeline.reconstructor().threads(),
        parallel = pipeline.reconstructor().is_parallel(),
        "reconstructor ready"
    );
    let binning = Binning::new(
        constants::histogram::BINS,
        constants::histogram::MASS_MIN,
        constants::histogram::MASS_MAX,
    )?;

    // 4. 逐批处理
    let summary = pipeline.analyze(&mut source, binning)?;

    // 5. 输出结果
    print!("{}", tools::format_run_summary(&summary));
    TextRenderer::stdout(config.chart_rows).render(&summary.histogram)?;

    if let Some(output_path) = &config.output_path {
        JsonRenderer::new(output_path).render(&summary.histogram)?;
    }

    tools::show_completion_info(&config);
    Ok(())
}

fn main() {
    if let Err(error) = run() {
        handle_error(error);
    }
}
