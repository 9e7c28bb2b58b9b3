//! 批次处理模块
//!
//! 批次重建（可选rayon并行）、运行统计与逐批协调。

pub mod batch;
pub mod coordinator;
pub mod stats;

// 重新导出公共接口
pub use batch::{BatchOutcome, BatchReconstructor};
pub use coordinator::{MassPipeline, RunSummary};
pub use stats::ReconstructionStats;
