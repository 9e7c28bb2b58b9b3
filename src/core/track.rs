//! 径迹数据模型与有效性过滤
//!
//! 批次以扁平的 `TrackSample` 序列表示，每个样本携带自身的事例/径迹编号，
//! 避免嵌套变长数组带来的索引复杂度。

/// 时间数组中参考层飞行时间的下标
pub const REFERENCE_TIME_INDEX: usize = 4;

/// 单条径迹的原始字段
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSample {
    /// 全局事例序号（跨文件连续编号）
    pub event: u64,

    /// 事例内径迹序号
    pub track: u32,

    /// 局部螺旋参数向量 [Y, Z, sinφ, tanλ, q/pT]
    pub params: [f64; 5],

    /// 局部坐标系倾斜角（弧度）
    pub alpha: f64,

    /// 各探测层的飞行时间（皮秒），下标4为参考层
    pub track_time: [f64; 5],

    /// 径迹长度（厘米）
    pub track_length: f64,
}

impl TrackSample {
    /// 参考层飞行时间（皮秒）
    #[inline]
    pub fn reference_time(&self) -> f64 {
        self.track_time[REFERENCE_TIME_INDEX]
    }

    /// 径迹是否可用于重建
    ///
    /// 要求径迹长度 > 0 且参考层飞行时间 > 0。NaN 不满足任何比较，视为无效。
    #[inline]
    pub fn is_eligible(&self) -> bool {
        self.track_length > 0.0 && self.reference_time() > 0.0
    }
}

/// 一个批次的径迹数据
///
/// 覆盖全局事例区间 `[start, end)`，同一事例的径迹不会跨批次。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackBatch {
    /// 批次第一个事例的全局序号
    pub start: u64,

    /// 批次最后一个事例之后的全局序号
    pub end: u64,

    /// 扁平化的径迹样本（按事例、径迹顺序）
    pub samples: Vec<TrackSample>,
}

impl TrackBatch {
    /// 创建空批次，起点为 `start`
    pub fn new(start: u64) -> Self {
        Self {
            start,
            end: start,
            samples: Vec::new(),
        }
    }

    /// 批次包含的事例数（含零径迹事例）
    #[inline]
    pub fn event_count(&self) -> u64 {
        self.end - self.start
    }

    /// 批次包含的径迹总数
    #[inline]
    pub fn track_count(&self) -> usize {
        self.samples.len()
    }

    /// 通过过滤的径迹，保持原始顺序
    ///
    /// 动量与β都从同一迭代器取值，保证二者对应同一条物理径迹。
    pub fn eligible(&self) -> impl Iterator<Item = &TrackSample> + '_ {
        self.samples.iter().filter(|s| s.is_eligible())
    }

    /// 通过过滤的 (事例, 径迹) 编号
    pub fn eligible_ids(&self) -> Vec<(u64, u32)> {
        self.eligible().map(|s| (s.event, s.track)).collect()
    }
}
