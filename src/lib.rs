//! TOF Mass Reconstruction Tool
//!
//! 基于飞行时间（TOF）探测器数据的粒子质量重建工具。
//! 对每条径迹由螺旋参数重建三维动量，由径迹长度与飞行时间计算速度 β，
//! 再由 m = |p|·√(1-β²)/β 估算质量并累加到质量直方图中。
//!
//! ## 核心特性
//! - 显式的径迹过滤（径迹长度 > 0 且参考层飞行时间 > 0）
//! - 数值边界情况以 `ReconstructionError` 显式拒绝并计数，不传播 NaN/inf
//! - 1000-bin [0, 10] GeV/c² 质量直方图（半开区间，末bin闭合，溢出单独计数）
//! - 按批次惰性读取 JSON Lines 数据，批次不拆分事例
//! - 可选后台预取与rayon批内并行重建

pub mod core;
pub mod error;
pub mod processing;
pub mod source;
pub mod tools;

// 重新导出核心类型
pub use core::{
    Binning, HistogramSnapshot, MassHistogram, Momentum3, ReconstructedTrack, TrackBatch,
    TrackSample,
};
pub use error::{AnalysisError, AnalysisResult, ErrorCategory, ReconstructionError};
pub use processing::{BatchReconstructor, MassPipeline, ReconstructionStats, RunSummary};
pub use source::{BatchSource, FieldNames, JsonLinesSource, MemorySource, PrefetchSource};
