//! 输出格式化模块
//!
//! 负责运行报告头部与运行汇总表的格式化输出。

use super::cli::AppConfig;
use crate::error::ReconstructionError;
use crate::processing::RunSummary;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use std::path::PathBuf;

/// 应用程序版本信息
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 创建报告头部信息
pub fn create_report_header(config: &AppConfig, files: &[PathBuf]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "TOF Mass Tool v{VERSION} / Time-of-Flight Mass Reconstruction\n"
    ));
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    output.push_str(&format!("log date: {now}\n\n"));

    output.push_str(
        "--------------------------------------------------------------------------------\n",
    );
    output.push_str(&format!(
        "File list: {}\nData files: {}\n",
        config.input_path.display(),
        files.len()
    ));
    output.push_str(
        "--------------------------------------------------------------------------------\n\n",
    );

    output
}

/// 格式化运行汇总表
pub fn format_run_summary(summary: &RunSummary) -> String {
    let stats = &summary.stats;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Metric / 指标", "Value / 数值"]);

    add_count_row(&mut table, "Batches / 批次", stats.batches);
    add_count_row(&mut table, "Events / 事例", stats.events);
    add_count_row(&mut table, "Tracks / 径迹", stats.tracks);
    add_count_row(&mut table, "Eligible / 通过过滤", stats.eligible);
    add_count_row(&mut table, "Filtered out / 被过滤", stats.ineligible);
    add_count_row(&mut table, "Accepted / 接受", stats.accepted);

    for reason in ReconstructionError::ALL {
        let count = stats.rejected_for(reason);
        if count > 0 {
            add_count_row(
                &mut table,
                &format!("Rejected: {} / 拒绝", reason.display_name()),
                count,
            );
        }
    }

    add_count_row(&mut table, "Underflow / 下溢", summary.histogram.underflow);
    add_count_row(&mut table, "Overflow / 上溢", summary.histogram.overflow);

    table.add_row(vec![
        Cell::new("Acceptance / 接受率"),
        Cell::new(format!("{:.2}%", stats.acceptance_percent()))
            .set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Elapsed (s) / 耗时"),
        Cell::new(format!("{:.3}", summary.elapsed.as_secs_f64()))
            .set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Throughput (tracks/s) / 吞吐量"),
        Cell::new(format!("{:.0}", summary.tracks_per_second()))
            .set_alignment(CellAlignment::Right),
    ]);

    format!("{table}\n")
}

fn add_count_row(table: &mut Table, name: &str, value: u64) {
    table.add_row(vec![
        Cell::new(name),
        Cell::new(value).set_alignment(CellAlignment::Right),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Binning, MassHistogram};
    use crate::processing::ReconstructionStats;
    use std::time::Duration;

    fn sample_summary() -> RunSummary {
        let mut stats = ReconstructionStats {
            batches: 2,
            events: 10,
            tracks: 30,
            eligible: 20,
            ineligible: 10,
            accepted: 17,
            ..ReconstructionStats::default()
        };
        stats.record_rejection(ReconstructionError::Superluminal);
        stats.record_rejection(ReconstructionError::Superluminal);
        stats.record_rejection(ReconstructionError::ZeroCurvature);

        let mut histogram = MassHistogram::new(Binning::new(10, 0.0, 10.0).unwrap());
        histogram.add(&[1.0, 2.0, 11.0]);

        RunSummary {
            stats,
            histogram: histogram.finalize(),
            elapsed: Duration::from_millis(500),
        }
    }

    #[test]
    fn test_summary_lists_rejection_reasons() {
        let text = format_run_summary(&sample_summary());
        assert!(text.contains("superluminal"));
        assert!(text.contains("zero curvature"));
        assert!(!text.contains("out of domain"));
        assert!(text.contains("85.00%"));
    }

    #[test]
    fn test_header_names_file_list() {
        let config = AppConfig {
            input_path: PathBuf::from("runs/files.txt"),
            ..AppConfig::default()
        };
        let header = create_report_header(&config, &[PathBuf::from("a.jsonl")]);
        assert!(header.contains("runs/files.txt"));
        assert!(header.contains("Data files: 1"));
        assert!(header.contains("log date:"));
    }
}
