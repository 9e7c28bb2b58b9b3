//! 固定分箱质量直方图
//!
//! 运行开始时建立一次分箱（默认1000个等宽bin覆盖[0, 10]），
//! 之后每个批次的质量序列逐元素累加到同一组计数中，计数只增不减。

use crate::error::{AnalysisResult, calculation_error};
use serde::{Deserialize, Serialize};

/// 等宽分箱方案
///
/// 边界与 numpy 一致：`edges[i] = lo + i·(hi-lo)/n`，最后一个边界固定为 `hi`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binning {
    /// bin数量
    pub bins: usize,
    /// 下界
    pub lo: f64,
    /// 上界
    pub hi: f64,
}

impl Binning {
    /// 创建分箱方案
    ///
    /// # 错误
    ///
    /// * `CalculationError` - bin数量为0，或区间为空/非有限
    pub fn new(bins: usize, lo: f64, hi: f64) -> AnalysisResult<Self> {
        if bins == 0 {
            return Err(calculation_error("分箱方案无效 / invalid binning", "bin数量必须大于0"));
        }
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(calculation_error(
                "分箱方案无效 / invalid binning",
                format!("区间 [{lo}, {hi}] 为空或非有限"),
            ));
        }
        Ok(Self { bins, lo, hi })
    }

    /// 计算 bins+1 个边界
    pub fn edges(&self) -> Vec<f64> {
        let step = (self.hi - self.lo) / self.bins as f64;
        let mut edges: Vec<f64> = (0..=self.bins).map(|i| self.lo + step * i as f64).collect();
        edges[self.bins] = self.hi;
        edges
    }
}

/// 单个值的落点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinSlot {
    /// 落入第 i 个bin
    Bin(usize),
    /// 小于下界
    Underflow,
    /// 大于上界
    Overflow,
    /// NaN 或无穷
    NonFinite,
}

/// 运行期质量直方图（唯一的跨批次可变状态）
#[derive(Debug, Clone)]
pub struct MassHistogram {
    binning: Binning,

    /// bins+1 个边界，运行期间不变
    edges: Vec<f64>,

    /// 每个bin的计数
    counts: Vec<u64>,

    /// 小于下界的值数量
    underflow: u64,

    /// 大于上界的值数量
    overflow: u64,

    /// NaN/inf 数量
    non_finite: u64,
}

impl MassHistogram {
    /// 以给定分箱创建空直方图
    pub fn new(binning: Binning) -> Self {
        let edges = binning.edges();
        Self {
            counts: vec![0; binning.bins],
            edges,
            binning,
            underflow: 0,
            overflow: 0,
            non_finite: 0,
        }
    }

    /// 分箱方案
    pub fn binning(&self) -> &Binning {
        &self.binning
    }

    /// bin边界（长度 = bins + 1）
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// bin计数（长度 = bins）
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// 落入任意bin的值总数
    pub fn entries(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn underflow(&self) -> u64 {
        self.underflow
    }

    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    pub fn non_finite(&self) -> u64 {
        self.non_finite
    }

    /// 第 i 个bin的区间 `[lo, hi)`（最后一个bin为闭区间）
    pub fn bin_range(&self, index: usize) -> Option<(f64, f64)> {
        if index < self.counts.len() {
            Some((self.edges[index], self.edges[index + 1]))
        } else {
            None
        }
    }

    /// 定位一个值所在的bin
    ///
    /// 规则：除最后一个bin为闭区间外，其余均为半开区间 `[e_i, e_{i+1})`。
    /// 因此下界值落入第0个bin，上界值落入最后一个bin，超出上界的值不会被截断进最后一个bin。
    pub fn locate(&self, value: f64) -> BinSlot {
        if !value.is_finite() {
            return BinSlot::NonFinite;
        }
        let n = self.counts.len();
        let lo = self.edges[0];
        let hi = self.edges[n];

        if value < lo {
            return BinSlot::Underflow;
        }
        if value > hi {
            return BinSlot::Overflow;
        }
        if value == hi {
            return BinSlot::Bin(n - 1);
        }

        let scaled = (value - lo) / (hi - lo) * n as f64;
        let mut index = (scaled as usize).min(n - 1);

        // 浮点舍入可能偏离一个bin，用实际边界校正
        if value < self.edges[index] {
            index -= 1;
        } else if index + 1 < n && value >= self.edges[index + 1] {
            index += 1;
        }

        BinSlot::Bin(index)
    }

    /// bin下标（区间外或非有限值返回 None）
    pub fn bin_index(&self, value: f64) -> Option<usize> {
        match self.locate(value) {
            BinSlot::Bin(index) => Some(index),
            _ => None,
        }
    }

    /// 将一个批次的质量序列累加到直方图
    pub fn add(&mut self, values: &[f64]) {
        for &value in values {
            match self.locate(value) {
                BinSlot::Bin(index) => self.counts[index] += 1,
                BinSlot::Underflow => self.underflow += 1,
                BinSlot::Overflow => self.overflow += 1,
                BinSlot::NonFinite => self.non_finite += 1,
            }
        }
    }

    /// 合并另一个分箱相同的直方图（逐元素相加，满足交换律）
    ///
    /// # 错误
    ///
    /// * `CalculationError` - 分箱方案不一致
    pub fn merge(&mut self, other: &MassHistogram) -> AnalysisResult<()> {
        if self.binning != other.binning {
            return Err(calculation_error(
                "直方图分箱不一致，无法合并 / histogram binning mismatch",
                format!("{:?} vs {:?}", self.binning, other.binning),
            ));
        }

        for (count, &extra) in self.counts.iter_mut().zip(&other.counts) {
            *count += extra;
        }
        self.underflow += other.underflow;
        self.overflow += other.overflow;
        self.non_finite += other.non_finite;

        Ok(())
    }

    /// 计数最多的bin（全空时返回 None）
    pub fn peak_bin(&self) -> Option<usize> {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
            .map(|(index, _)| index)
    }

    /// 结束累加，生成只读快照
    pub fn finalize(self) -> HistogramSnapshot {
        let entries = self.entries();
        HistogramSnapshot {
            counts: self.counts,
            edges: self.edges,
            entries,
            underflow: self.underflow,
            overflow: self.overflow,
            non_finite: self.non_finite,
        }
    }
}

/// 最终直方图（供渲染器使用）
///
/// 保证 `counts.len() + 1 == edges.len()` 且边界严格递增。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSnapshot {
    pub counts: Vec<u64>,
    pub edges: Vec<f64>,
    pub entries: u64,
    pub underflow: u64,
    pub overflow: u64,
    pub non_finite: u64,
}

impl HistogramSnapshot {
    /// bin数量
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// 最大bin计数
    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// 将相邻 `factor` 个bin合并（末尾不足一组的bin单独成组）
    pub fn rebin(&self, factor: usize) -> HistogramSnapshot {
        let factor = factor.max(1);
        let counts: Vec<u64> = self
            .counts
            .chunks(factor)
            .map(|chunk| chunk.iter().sum())
            .collect();

        let mut edges: Vec<f64> = self.edges.iter().step_by(factor).copied().collect();
        if let Some(&last) = self.edges.last()
            && edges.last() != Some(&last)
        {
            edges.push(last);
        }

        HistogramSnapshot {
            counts,
            edges,
            ..self.clone()
        }
    }
}

impl std::fmt::Display for HistogramSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lo = self.edges.first().copied().unwrap_or(0.0);
        let hi = self.edges.last().copied().unwrap_or(0.0);
        write!(
            f,
            "HistogramSnapshot {{ bins: {}, range: [{lo}, {hi}], entries: {}, underflow: {}, overflow: {}, non_finite: {} }}",
            self.bins(),
            self.entries,
            self.underflow,
            self.overflow,
            self.non_finite
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_histogram() -> MassHistogram {
        MassHistogram::new(Binning::new(1000, 0.0, 10.0).unwrap())
    }

    #[test]
    fn test_histogram_creation() {
        let histogram = default_histogram();
        assert_eq!(histogram.counts().len(), 1000);
        assert_eq!(histogram.edges().len(), 1001);
        assert_eq!(histogram.edges()[0], 0.0);
        assert_eq!(histogram.edges()[1000], 10.0);
        assert_eq!(histogram.entries(), 0);
        assert!(histogram.edges().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_invalid_binning() {
        assert!(Binning::new(0, 0.0, 10.0).is_err());
        assert!(Binning::new(10, 1.0, 1.0).is_err());
        assert!(Binning::new(10, 2.0, 1.0).is_err());
        assert!(Binning::new(10, 0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_boundary_values() {
        let histogram = default_histogram();

        // 下界落入第一个bin，上界落入最后一个bin
        assert_eq!(histogram.locate(0.0), BinSlot::Bin(0));
        assert_eq!(histogram.locate(10.0), BinSlot::Bin(999));

        // 超出上界不截断
        assert_eq!(histogram.locate(10.5), BinSlot::Overflow);
        assert_eq!(histogram.locate(10.000_000_001), BinSlot::Overflow);
        assert_eq!(histogram.locate(-1e-12), BinSlot::Underflow);
        assert_eq!(histogram.locate(f64::NAN), BinSlot::NonFinite);
        assert_eq!(histogram.locate(f64::INFINITY), BinSlot::NonFinite);
    }

    #[test]
    fn test_interior_edges_are_half_open() {
        let histogram = default_histogram();
        for index in [1usize, 17, 173, 500, 998, 999] {
            let edge = histogram.edges()[index];
            assert_eq!(histogram.bin_index(edge), Some(index), "edge {edge}");
        }
        assert_eq!(histogram.bin_index(0.019_999_999), Some(1));
    }

    #[test]
    fn test_bin_index_consistent_with_edges() {
        let histogram = default_histogram();
        let mut value = 0.0;
        while value <= 10.0 {
            let index = histogram.bin_index(value).unwrap();
            let (lo, hi) = histogram.bin_range(index).unwrap();
            assert!(value >= lo);
            assert!(value < hi || index == 999);
            value += 0.003_7;
        }
    }

    #[test]
    fn test_add_counts_and_flows() {
        let mut histogram = default_histogram();
        histogram.add(&[0.0, 1.732, 1.735, 10.0, 10.5, -0.1, f64::NAN]);

        assert_eq!(histogram.counts()[0], 1);
        assert_eq!(histogram.counts()[173], 2);
        assert_eq!(histogram.counts()[999], 1);
        assert_eq!(histogram.entries(), 4);
        assert_eq!(histogram.overflow(), 1);
        assert_eq!(histogram.underflow(), 1);
        assert_eq!(histogram.non_finite(), 1);
    }

    #[test]
    fn test_merge_is_commutative() {
        let batch_a = [0.14, 0.49, 0.94, 0.95, 3.3];
        let batch_b = [0.14, 9.99, 12.0, 0.0];

        let mut ab = default_histogram();
        ab.add(&batch_a);
        ab.add(&batch_b);

        let mut ba = default_histogram();
        ba.add(&batch_b);
        ba.add(&batch_a);

        assert_eq!(ab.counts(), ba.counts());
        assert_eq!(ab.overflow(), ba.overflow());

        let mut part_a = default_histogram();
        part_a.add(&batch_a);
        let mut part_b = default_histogram();
        part_b.add(&batch_b);
        part_b.merge(&part_a).unwrap();
        assert_eq!(part_b.finalize(), ab.finalize());
    }

    #[test]
    fn test_merge_rejects_mismatched_binning() {
        let mut a = default_histogram();
        let b = MassHistogram::new(Binning::new(500, 0.0, 10.0).unwrap());
        assert!(a.merge(&b).is_err());
    }

    #[test]
    fn test_peak_bin() {
        let mut histogram = default_histogram();
        assert_eq!(histogram.peak_bin(), None);
        histogram.add(&[0.938, 0.938, 0.139, 0.493]);
        assert_eq!(histogram.peak_bin(), Some(93));
    }

    #[test]
    fn test_finalize_snapshot() {
        let mut histogram = default_histogram();
        histogram.add(&[1.0, 2.0, 11.0]);
        let snapshot = histogram.finalize();
        assert_eq!(snapshot.counts.len() + 1, snapshot.edges.len());
        assert_eq!(snapshot.entries, 2);
        assert_eq!(snapshot.overflow, 1);
        assert_eq!(snapshot.max_count(), 1);
    }

    #[test]
    fn test_rebin() {
        let mut histogram = default_histogram();
        histogram.add(&[0.005, 0.015, 0.095, 9.995]);
        let rebinned = histogram.finalize().rebin(10);
        assert_eq!(rebinned.bins(), 100);
        assert_eq!(rebinned.edges.len(), 101);
        assert_eq!(rebinned.counts[0], 3);
        assert_eq!(rebinned.counts[99], 1);
        assert_eq!(rebinned.edges[100], 10.0);
    }

    #[test]
    fn test_rebin_uneven_tail() {
        let mut histogram = MassHistogram::new(Binning::new(10, 0.0, 10.0).unwrap());
        histogram.add(&[9.5]);
        let rebinned = histogram.finalize().rebin(3);
        assert_eq!(rebinned.bins(), 4);
        assert_eq!(rebinned.edges, vec![0.0, 3.0, 6.0, 9.0, 10.0]);
        assert_eq!(rebinned.counts[3], 1);
    }
}
