//! 相对论质量估计
//!
//! mass = p / (β·γ)，γ = 1 / sqrt(1 - β²)

use super::beta::velocity_fraction;
use super::momentum::{Momentum3, reconstruct_momentum};
use super::track::TrackSample;
use crate::error::ReconstructionError;

/// 单条径迹的完整重建结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconstructedTrack {
    pub momentum: Momentum3,
    pub beta: f64,
    pub mass: f64,
}

/// 洛伦兹因子 γ = 1 / sqrt(1 - β²)
///
/// β ≥ 1 时无定义，返回 `Superluminal`。
#[inline]
pub fn lorentz_gamma(beta: f64) -> Result<f64, ReconstructionError> {
    if beta >= 1.0 {
        return Err(ReconstructionError::Superluminal);
    }
    Ok(1.0 / (1.0 - beta * beta).sqrt())
}

/// 由总动量大小与 β 估计质量
///
/// # 错误
///
/// * `Superluminal` - β ≥ 1
/// * `NonFinite` - 结果为 NaN/inf（例如 β 为 NaN 或 0）
pub fn estimate_mass(momentum: f64, beta: f64) -> Result<f64, ReconstructionError> {
    let gamma = lorentz_gamma(beta)?;
    let mass = momentum / (beta * gamma);

    if mass.is_finite() {
        Ok(mass)
    } else {
        Err(ReconstructionError::NonFinite)
    }
}

/// 对一条已通过过滤的径迹执行动量、β 与质量重建
///
/// 动量与 β 取自同一个样本，二者天然对应同一条物理径迹。
pub fn reconstruct_track(sample: &TrackSample) -> Result<ReconstructedTrack, ReconstructionError> {
    debug_assert!(sample.is_eligible(), "径迹必须先通过有效性过滤");

    let momentum = reconstruct_momentum(&sample.params, sample.alpha)?;
    let beta = velocity_fraction(sample.track_length, sample.reference_time());
    let mass = estimate_mass(momentum.magnitude(), beta)?;

    Ok(ReconstructedTrack {
        momentum,
        beta,
        mass,
    })
}
