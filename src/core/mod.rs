//! 核心算法模块
//!
//! 包含径迹数据模型、有效性过滤、动量/β/质量重建和质量直方图。

pub mod beta;
pub mod histogram;
pub mod mass;
pub mod momentum;
pub mod track;

// 重新导出公共接口
pub use beta::velocity_fraction;
pub use histogram::{BinSlot, Binning, HistogramSnapshot, MassHistogram};
pub use mass::{ReconstructedTrack, estimate_mass, lorentz_gamma, reconstruct_track};
pub use momentum::{Momentum3, reconstruct_momentum};
pub use track::{TrackBatch, TrackSample};
