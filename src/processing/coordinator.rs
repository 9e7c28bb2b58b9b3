//! 运行协调器
//!
//! 按数据源顺序逐批处理：过滤 → 重建 → 质量 → 累加到直方图。
//! 跨批次只保留直方图与统计，直方图只在协调线程上写入。

use super::batch::BatchReconstructor;
use super::stats::ReconstructionStats;
use crate::core::{Binning, HistogramSnapshot, MassHistogram, TrackBatch};
use crate::error::AnalysisResult;
use crate::source::BatchSource;
use std::time::{Duration, Instant};

/// 一次完整运行的结果
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// 全部批次的累计统计
    pub stats: ReconstructionStats,

    /// 最终直方图
    pub histogram: HistogramSnapshot,

    /// 总耗时
    pub elapsed: Duration,
}

impl RunSummary {
    /// 每秒处理径迹数
    pub fn tracks_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.stats.tracks as f64 / secs
        } else {
            0.0
        }
    }
}

/// 质量重建流水线
#[derive(Clone, Default)]
pub struct MassPipeline {
    reconstructor: BatchReconstructor,
}

impl MassPipeline {
    pub fn new(reconstructor: BatchReconstructor) -> Self {
        Self { reconstructor }
    }

    pub fn reconstructor(&self) -> &BatchReconstructor {
        &self.reconstructor
    }

    /// 处理单个批次并累加到直方图，返回该批次统计
    pub fn process_batch(
        &self,
        batch: &TrackBatch,
        histogram: &mut MassHistogram,
    ) -> ReconstructionStats {
        let outcome = self.reconstructor.reconstruct(batch);
        histogram.add(&outcome.masses);
        outcome.stats
    }

    /// 消费数据源直到耗尽
    ///
    /// 批次严格顺序处理，第 n+1 批只在第 n 批累加完成后才会被取出
    /// （预取由数据源自身负责）。任何数据源错误立即终止运行，直方图中已累加的内容不做持久化。
    pub fn run<S: BatchSource + ?Sized>(
        &self,
        source: &mut S,
        histogram: &mut MassHistogram,
    ) -> AnalysisResult<ReconstructionStats> {
        let mut total = ReconstructionStats::new();

        while let Some(batch) = source.next_batch()? {
            tracing::info!(
                "Processing entries {}-{}... / 处理事例 {}-{}",
                batch.start,
                batch.end,
                batch.start,
                batch.end
            );

            let stats = self.process_batch(&batch, histogram);
            tracing::debug!(
                tracks = stats.tracks,
                eligible = stats.eligible,
                accepted = stats.accepted,
                rejected = stats.rejected_total(),
                "batch reconstructed"
            );
            total.merge(&stats);
        }

        Ok(total)
    }

    /// 以给定分箱创建直方图，完整运行并生成最终快照
    pub fn analyze<S: BatchSource + ?Sized>(
        &self,
        source: &mut S,
        binning: Binning,
    ) -> AnalysisResult<RunSummary> {
        let start_time = Instant::now();
        let mut histogram = MassHistogram::new(binning);

        let stats = self.run(source, &mut histogram)?;

        for (reason, count) in &stats.rejected {
            tracing::debug!(reason = %reason, count, "tracks rejected");
        }

        Ok(RunSummary {
            stats,
            histogram: histogram.finalize(),
            elapsed: start_time.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TrackSample;
    use crate::error::AnalysisError;
    use crate::source::MemorySource;

    fn unit_momentum_track(event: u64, track: u32, length: f64, tof: f64) -> TrackSample {
        TrackSample {
            event,
            track,
            params: [0.0, 0.0, 0.0, 0.0, 1.0],
            alpha: 0.0,
            track_time: [0.0, 0.0, 0.0, 0.0, tof],
            track_length: length,
        }
    }

    /// 1个事例、2条径迹，其中1条有效（|p| = 1，β = 0.5）
    fn synthetic_batch(event: u64) -> TrackBatch {
        TrackBatch {
            start: event,
            end: event + 1,
            samples: vec![
                unit_momentum_track(event, 0, 300.0, 20_000.0),
                unit_momentum_track(event, 1, 0.0, 20_000.0),
            ],
        }
    }

    fn default_binning() -> Binning {
        Binning::new(1000, 0.0, 10.0).unwrap()
    }

    #[test]
    fn test_two_batch_end_to_end() {
        let mut source = MemorySource::new([synthetic_batch(0), synthetic_batch(1)]);
        let summary = MassPipeline::default()
            .analyze(&mut source, default_binning())
            .unwrap();

        let histogram = &summary.histogram;
        assert_eq!(histogram.counts[173], 2);
        assert_eq!(histogram.entries, 2);
        assert_eq!(
            histogram
                .counts
                .iter()
                .enumerate()
                .filter(|&(i, &c)| i != 173 && c > 0)
                .count(),
            0
        );

        assert_eq!(summary.stats.batches, 2);
        assert_eq!(summary.stats.events, 2);
        assert_eq!(summary.stats.tracks, 4);
        assert_eq!(summary.stats.eligible, 2);
        assert_eq!(summary.stats.accepted, 2);
    }

    #[test]
    fn test_batch_order_does_not_matter() {
        let batch_a = TrackBatch {
            start: 0,
            end: 2,
            samples: vec![
                unit_momentum_track(0, 0, 300.0, 20_000.0),
                unit_momentum_track(1, 0, 300.0, 12_000.0),
            ],
        };
        let batch_b = TrackBatch {
            start: 2,
            end: 3,
            samples: vec![unit_momentum_track(2, 0, 250.0, 30_000.0)],
        };

        let pipeline = MassPipeline::default();
        let ab = pipeline
            .analyze(
                &mut MemorySource::new([batch_a.clone(), batch_b.clone()]),
                default_binning(),
            )
            .unwrap();
        let ba = pipeline
            .analyze(&mut MemorySource::new([batch_b, batch_a]), default_binning())
            .unwrap();

        assert_eq!(ab.histogram, ba.histogram);
        assert_eq!(ab.stats, ba.stats);
    }

    #[test]
    fn test_ineligible_tracks_never_reach_histogram() {
        let batch = TrackBatch {
            start: 0,
            end: 1,
            samples: vec![
                unit_momentum_track(0, 0, 0.0, 20_000.0),
                unit_momentum_track(0, 1, 300.0, 0.0),
                unit_momentum_track(0, 2, -10.0, -10.0),
            ],
        };
        let summary = MassPipeline::default()
            .analyze(&mut MemorySource::new([batch]), default_binning())
            .unwrap();

        assert_eq!(summary.histogram.entries, 0);
        assert_eq!(summary.histogram.overflow + summary.histogram.underflow, 0);
        assert_eq!(summary.stats.ineligible, 3);
        assert_eq!(summary.stats.eligible, 0);
    }

    struct BrokenSource;

    impl BatchSource for BrokenSource {
        fn next_batch(&mut self) -> AnalysisResult<Option<TrackBatch>> {
            Err(AnalysisError::FormatError("missing field".to_string()))
        }
    }

    #[test]
    fn test_source_error_aborts_run() {
        let result = MassPipeline::default().analyze(&mut BrokenSource, default_binning());
        assert!(matches!(result, Err(AnalysisError::FormatError(_))));
    }

    #[test]
    fn test_empty_source_yields_empty_histogram() {
        let summary = MassPipeline::default()
            .analyze(&mut MemorySource::default(), default_binning())
            .unwrap();
        assert_eq!(summary.histogram.entries, 0);
        assert_eq!(summary.histogram.counts.len(), 1000);
        assert_eq!(summary.stats.batches, 0);
    }
}
