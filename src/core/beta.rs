//! 速度分数 β 计算
//!
//! β = (径迹长度[m]) / (飞行时间[s]) / c

/// 参考光速（m/s）
///
/// 使用取整值 3e8 而非精确的 299 792 458，保持与既有分析结果逐位一致。
pub const SPEED_OF_LIGHT: f64 = 3e8;

/// 厘米 → 米
pub const CM_PER_M: f64 = 100.0;

/// 皮秒 → 秒
pub const PS_PER_S: f64 = 1e12;

/// 由径迹长度（厘米）与参考层飞行时间（皮秒）计算 β
///
/// 调用方负责只传入已通过过滤的径迹（长度与时间均 > 0），此处不做二次检查。
/// 运算顺序固定为先换算单位、再相除，300 cm / 10000 ps 恰好得到 1.0。
#[inline]
pub fn velocity_fraction(track_length_cm: f64, time_of_flight_ps: f64) -> f64 {
    let distance_m = track_length_cm / CM_PER_M;
    let time_s = time_of_flight_ps / PS_PER_S;
    distance_m / time_s / SPEED_OF_LIGHT
}
