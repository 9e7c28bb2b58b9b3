//! 批次数据源
//!
//! 提供惰性、有限、只进的批次序列。跨多个文件时保持整体顺序，
//! 同一事例的径迹不会拆分到两个批次。

mod jsonl;
mod prefetch;

pub use jsonl::{EventRecord, FieldNames, JsonLinesSource};
pub use prefetch::PrefetchSource;

use crate::core::TrackBatch;
use crate::error::AnalysisResult;
use std::collections::VecDeque;

/// 批次数据源trait
///
/// # 约定
///
/// - `Ok(Some(batch))` - 下一个批次，事例区间与上一批次首尾相接
/// - `Ok(None)` - 数据已耗尽，之后再次调用继续返回 `None`
/// - `Err(_)` - 数据源错误（致命，调用方应终止本次运行）
///
/// 不支持重置或回退。
pub trait BatchSource {
    /// 读取下一个批次
    fn next_batch(&mut self) -> AnalysisResult<Option<TrackBatch>>;
}

impl<S: BatchSource + ?Sized> BatchSource for Box<S> {
    fn next_batch(&mut self) -> AnalysisResult<Option<TrackBatch>> {
        (**self).next_batch()
    }
}

/// 内存批次源（测试与库调用方直接提供批次）
#[derive(Debug, Default)]
pub struct MemorySource {
    batches: VecDeque<TrackBatch>,
}

impl MemorySource {
    pub fn new(batches: impl IntoIterator<Item = TrackBatch>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
        }
    }
}

impl BatchSource for MemorySource {
    fn next_batch(&mut self) -> AnalysisResult<Option<TrackBatch>> {
        Ok(self.batches.pop_front())
    }
}
