//! 批次重建器
//!
//! 对一个批次执行过滤、动量/β/质量重建，输出质量序列与批次统计。
//! 可选使用rayon线程池在批次内并行重建，结果按原始顺序收集。

use super::stats::ReconstructionStats;
use crate::core::{ReconstructedTrack, TrackBatch, TrackSample, reconstruct_track};
use crate::error::{AnalysisError, AnalysisResult, ReconstructionError};
use crate::tools::constants::{defaults, parallel_limits};
use rayon::prelude::*;
use std::sync::Arc;

/// 单批次重建结果
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// 被接受径迹的质量（与通过过滤的径迹同序，跳过被拒绝的径迹）
    pub masses: Vec<f64>,

    /// 批次统计
    pub stats: ReconstructionStats,
}

/// 批次重建器
#[derive(Clone)]
pub struct BatchReconstructor {
    /// Rayon线程池（None表示串行）
    thread_pool: Option<Arc<rayon::ThreadPool>>,

    /// 启用并行所需的最少有效径迹数
    parallel_threshold: usize,
}

impl Default for BatchReconstructor {
    fn default() -> Self {
        Self::serial()
    }
}

impl BatchReconstructor {
    /// 串行重建器
    pub fn serial() -> Self {
        Self {
            thread_pool: None,
            parallel_threshold: defaults::PARALLEL_MIN_TRACKS,
        }
    }

    /// 并行重建器
    ///
    /// 线程数被限制在 [MIN_PARALLEL_DEGREE, MAX_PARALLEL_DEGREE] 内。
    ///
    /// # 错误
    ///
    /// * `ResourceError` - 线程池创建失败
    pub fn parallel(threads: usize) -> AnalysisResult<Self> {
        let threads = threads.clamp(
            parallel_limits::MIN_PARALLEL_DEGREE,
            parallel_limits::MAX_PARALLEL_DEGREE,
        );
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("mass-worker-{i}"))
            .build()
            .map_err(|e| AnalysisError::ResourceError(format!("线程池创建失败: {e}")))?;

        Ok(Self {
            thread_pool: Some(Arc::new(pool)),
            parallel_threshold: defaults::PARALLEL_MIN_TRACKS,
        })
    }

    /// 设置启用并行的最少径迹数
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// 是否为并行模式
    pub fn is_parallel(&self) -> bool {
        self.thread_pool.is_some()
    }

    /// 并行线程数（串行为1）
    pub fn threads(&self) -> usize {
        self.thread_pool
            .as_ref()
            .map(|pool| pool.current_num_threads())
            .unwrap_or(1)
    }

    /// 重建一个批次
    pub fn reconstruct(&self, batch: &TrackBatch) -> BatchOutcome {
        let eligible: Vec<&TrackSample> = batch.eligible().collect();
        let results = self.reconstruct_eligible(&eligible);

        let mut stats = ReconstructionStats {
            batches: 1,
            events: batch.event_count(),
            tracks: batch.track_count() as u64,
            eligible: eligible.len() as u64,
            ineligible: (batch.track_count() - eligible.len()) as u64,
            ..ReconstructionStats::default()
        };

        let mut masses = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(track) => masses.push(track.mass),
                Err(reason) => stats.record_rejection(reason),
            }
        }
        stats.accepted = masses.len() as u64;

        BatchOutcome { masses, stats }
    }

    fn reconstruct_eligible(
        &self,
        eligible: &[&TrackSample],
    ) -> Vec<Result<ReconstructedTrack, ReconstructionError>> {
        match &self.thread_pool {
            Some(pool) if eligible.len() >= self.parallel_threshold => pool.install(|| {
                eligible
                    .par_iter()
                    .map(|sample| reconstruct_track(sample))
                    .collect()
            }),
            _ => eligible
                .iter()
                .map(|sample| reconstruct_track(sample))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(event: u64, track: u32, q_over_pt: f64, length: f64, tof: f64) -> TrackSample {
        TrackSample {
            event,
            track,
            params: [0.0, 0.0, 0.2, 0.1, q_over_pt],
            alpha: 0.4,
            track_time: [0.0, 0.0, 0.0, 0.0, tof],
            track_length: length,
        }
    }

    fn mixed_batch() -> TrackBatch {
        TrackBatch {
            start: 0,
            end: 3,
            samples: vec![
                track(0, 0, 1.0, 300.0, 20_000.0), // 接受
                track(0, 1, 1.0, 0.0, 20_000.0),   // 长度为0
                track(1, 0, 0.0, 300.0, 20_000.0), // 零曲率
                track(1, 1, 1.0, 300.0, 10_000.0), // β = 1
                track(2, 0, 2.0, 300.0, -1.0),     // 时间为负
                track(2, 1, 0.5, 280.0, 15_000.0), // 接受
            ],
        }
    }

    #[test]
    fn test_serial_reconstruction_counts() {
        let outcome = BatchReconstructor::serial().reconstruct(&mixed_batch());
        let stats = &outcome.stats;

        assert_eq!(stats.batches, 1);
        assert_eq!(stats.events, 3);
        assert_eq!(stats.tracks, 6);
        assert_eq!(stats.eligible, 4);
        assert_eq!(stats.ineligible, 2);
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.rejected_for(ReconstructionError::ZeroCurvature), 1);
        assert_eq!(stats.rejected_for(ReconstructionError::Superluminal), 1);
        assert_eq!(outcome.masses.len(), 2);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let mut batch = TrackBatch::new(0);
        for i in 0..5000u64 {
            let q = 0.2 + (i % 37) as f64 * 0.05;
            let tof = 11_000.0 + (i % 101) as f64 * 40.0;
            batch.samples.push(track(i, 0, q, 300.0, tof));
        }
        batch.end = 5000;

        let serial = BatchReconstructor::serial().reconstruct(&batch);
        let parallel = BatchReconstructor::parallel(4)
            .unwrap()
            .with_parallel_threshold(1)
            .reconstruct(&batch);

        assert_eq!(serial.masses, parallel.masses);
        assert_eq!(serial.stats, parallel.stats);
    }

    #[test]
    fn test_parallel_thread_count_is_clamped() {
        let reconstructor = BatchReconstructor::parallel(1000).unwrap();
        assert!(reconstructor.is_parallel());
        assert_eq!(
            reconstructor.threads(),
            parallel_limits::MAX_PARALLEL_DEGREE
        );
        assert_eq!(BatchReconstructor::serial().threads(), 1);
    }

    #[test]
    fn test_empty_batch() {
        let outcome = BatchReconstructor::serial().reconstruct(&TrackBatch::new(7));
        assert!(outcome.masses.is_empty());
        assert_eq!(outcome.stats.events, 0);
        assert_eq!(outcome.stats.batches, 1);
    }
}
