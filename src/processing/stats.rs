//! 重建统计模块
//!
//! 记录每个批次及整个运行的事例/径迹计数与按原因分类的拒绝数量。

use crate::error::ReconstructionError;
use std::collections::BTreeMap;

/// 重建统计
///
/// 恒等式：`tracks = eligible + ineligible`，`eligible = accepted + rejected_total()`。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconstructionStats {
    /// 已处理批次数
    pub batches: u64,
    /// 已处理事例数（含零径迹事例）
    pub events: u64,
    /// 径迹总数
    pub tracks: u64,
    /// 通过长度/飞行时间过滤的径迹数
    pub eligible: u64,
    /// 未通过过滤的径迹数
    pub ineligible: u64,
    /// 成功得到质量的径迹数
    pub accepted: u64,
    /// 按原因分类的拒绝计数
    pub rejected: BTreeMap<ReconstructionError, u64>,
}

impl ReconstructionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次重建拒绝
    #[inline]
    pub fn record_rejection(&mut self, reason: ReconstructionError) {
        *self.rejected.entry(reason).or_insert(0) += 1;
    }

    /// 某一原因的拒绝数
    pub fn rejected_for(&self, reason: ReconstructionError) -> u64 {
        self.rejected.get(&reason).copied().unwrap_or(0)
    }

    /// 拒绝总数
    pub fn rejected_total(&self) -> u64 {
        self.rejected.values().sum()
    }

    /// 累加另一份统计
    pub fn merge(&mut self, other: &ReconstructionStats) {
        self.batches += other.batches;
        self.events += other.events;
        self.tracks += other.tracks;
        self.eligible += other.eligible;
        self.ineligible += other.ineligible;
        self.accepted += other.accepted;
        for (&reason, &count) in &other.rejected {
            *self.rejected.entry(reason).or_insert(0) += count;
        }
    }

    /// 接受率（相对于通过过滤的径迹）
    pub fn acceptance_percent(&self) -> f64 {
        if self.eligible == 0 {
            0.0
        } else {
            self.accepted as f64 / self.eligible as f64 * 100.0
        }
    }
}
