//! 常量和默认配置集中管理
//!
//! 将所有重要常量集中定义，避免"默认值漂移"和重复定义

/// 事例对象中的字段键名
pub mod fields {
    /// 螺旋参数向量 [Y, Z, sinφ, tanλ, q/pT]
    pub const PARAMS: &str = "P";

    /// 局部坐标系倾斜角
    pub const ALPHA: &str = "alpha";

    /// 各探测层飞行时间，最后一个为参考层
    pub const TRACK_TIME: &str = "trackTime";

    /// 径迹长度
    pub const TRACK_LENGTH: &str = "trackLength";

    /// 数据文件扩展名（目录展开时使用）
    pub const DATA_EXTENSION: &str = "jsonl";
}

/// 质量直方图分箱
pub mod histogram {
    /// bin数量
    pub const BINS: usize = 1000;

    /// 质量下界（GeV/c²）
    pub const MASS_MIN: f64 = 0.0;

    /// 质量上界（GeV/c²）
    pub const MASS_MAX: f64 = 10.0;
}

/// 默认配置值
pub mod defaults {
    /// 每批最多事例数
    ///
    /// 控制单批内存占用，与数据集总大小无关
    pub const BATCH_EVENTS: usize = 10_000;

    /// 预取通道深度（0表示不预取）
    pub const PREFETCH_DEPTH: usize = 2;

    /// 文本图表行数（重新分箱后的bin数上限）
    pub const CHART_ROWS: usize = 50;

    /// 批次内启用并行重建的最少有效径迹数
    ///
    /// 径迹过少时线程调度开销超过计算本身
    pub const PARALLEL_MIN_TRACKS: usize = 4096;
}

/// 并发度限制常量
pub mod parallel_limits {
    /// 最小并发度
    pub const MIN_PARALLEL_DEGREE: usize = 1;

    /// 最大并发度
    pub const MAX_PARALLEL_DEGREE: usize = 16;
}
