//! 直方图渲染模块
//!
//! 最终直方图（counts, edges）的消费端：终端文本图表与JSON导出。

use crate::core::HistogramSnapshot;
use crate::error::{AnalysisResult, format_error};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

/// 应用程序版本信息
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 文本图表中最长bar的字符数
const BAR_WIDTH: usize = 50;

/// 直方图渲染器
///
/// 输入的快照保证边界严格递增且计数非负。
pub trait HistogramRenderer {
    fn render(&mut self, snapshot: &HistogramSnapshot) -> AnalysisResult<()>;
}

/// 终端文本渲染器
///
/// 将直方图重新分箱到至多 `rows` 行，以对数刻度绘制横向bar。
pub struct TextRenderer<W: Write> {
    writer: W,
    rows: usize,
}

impl TextRenderer<std::io::Stdout> {
    pub fn stdout(rows: usize) -> Self {
        Self::new(std::io::stdout(), rows)
    }
}

impl<W: Write> TextRenderer<W> {
    pub fn new(writer: W, rows: usize) -> Self {
        Self {
            writer,
            rows: rows.max(1),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// 对数刻度bar长度：非零计数至少占1格
    fn bar_length(count: u64, max_count: u64) -> usize {
        if count == 0 || max_count == 0 {
            return 0;
        }
        let scale = (1.0 + count as f64).ln() / (1.0 + max_count as f64).ln();
        ((scale * BAR_WIDTH as f64).round() as usize).clamp(1, BAR_WIDTH)
    }
}

impl<W: Write> HistogramRenderer for TextRenderer<W> {
    fn render(&mut self, snapshot: &HistogramSnapshot) -> AnalysisResult<()> {
        let factor = snapshot.bins().div_ceil(self.rows).max(1);
        let view = snapshot.rebin(factor);
        let max_count = view.max_count();

        writeln!(self.writer, "Mass spectrum / 质量谱 (GeV/c², log scale)")?;
        writeln!(
            self.writer,
            "entries: {}  underflow: {}  overflow: {}  non-finite: {}",
            view.entries, view.underflow, view.overflow, view.non_finite
        )?;
        writeln!(
            self.writer,
            "--------------------------------------------------------------------------------"
        )?;

        let last = view.counts.len().saturating_sub(1);
        for (i, &count) in view.counts.iter().enumerate() {
            let bar = "█".repeat(Self::bar_length(count, max_count));
            // 最后一个bin为闭区间
            let close = if i == last { ']' } else { ')' };
            writeln!(
                self.writer,
                "[{:>6.3}, {:>6.3}{close} {:>10} |{bar}",
                view.edges[i],
                view.edges[i + 1],
                count
            )?;
        }

        writeln!(
            self.writer,
            "--------------------------------------------------------------------------------"
        )?;
        self.writer.flush()?;
        Ok(())
    }
}

/// JSON导出内容
#[derive(Serialize)]
struct JsonExport<'a> {
    tool: &'static str,
    version: &'static str,
    generated_at: String,
    #[serde(flatten)]
    histogram: &'a HistogramSnapshot,
}

/// JSON文件渲染器
pub struct JsonRenderer {
    output_path: PathBuf,
}

impl JsonRenderer {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }
}

impl HistogramRenderer for JsonRenderer {
    fn render(&mut self, snapshot: &HistogramSnapshot) -> AnalysisResult<()> {
        let export = JsonExport {
            tool: "tof-mass",
            version: VERSION,
            generated_at: chrono::Local::now().to_rfc3339(),
            histogram: snapshot,
        };

        let json = serde_json::to_string_pretty(&export)
            .map_err(|e| format_error("JSON序列化失败 / JSON serialization failed", e))?;
        std::fs::write(&self.output_path, json)?;
        println!("📄 直方图已保存到 / histogram saved to: {}", self.output_path.display());
        Ok(())
    }
}
