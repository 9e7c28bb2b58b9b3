//! 动量重建
//!
//! 将径迹局部螺旋参数 (sinφ, tanλ, q/pT) 与倾斜角 α 转换为全局坐标系三动量：
//! 先由曲率求横动量，再把局部坐标系绕 z 轴旋转 α。

use crate::error::ReconstructionError;

/// 三动量 (px, py, pz)，单位与 1/|q/pT| 相同（GeV/c）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Momentum3 {
    pub px: f64,
    pub py: f64,
    pub pz: f64,
}

impl Momentum3 {
    /// 横动量 sqrt(px² + py²)
    #[inline]
    pub fn transverse(&self) -> f64 {
        self.px.hypot(self.py)
    }

    /// 总动量 sqrt(px² + py² + pz²)
    #[inline]
    pub fn magnitude(&self) -> f64 {
        (self.px * self.px + self.py * self.py + self.pz * self.pz).sqrt()
    }

    #[inline]
    fn is_finite(&self) -> bool {
        self.px.is_finite() && self.py.is_finite() && self.pz.is_finite()
    }
}

/// 由螺旋参数向量与倾斜角重建动量
///
/// 只使用 `params[2]`（sinφ）、`params[3]`（tanλ）、`params[4]`（q/pT）：
///
/// ```text
/// pt = 1 / |P4|
/// r  = sqrt(1 - P2²)
/// px = pt * (r·cosα - P2·sinα)
/// py = pt * (P2·cosα + r·sinα)
/// pz = pt * P3
/// ```
///
/// # 错误
///
/// * `ZeroCurvature` - P4 为零
/// * `SinPhiOutOfDomain` - |P2| > 1
/// * `NonFinite` - 输入含 NaN/inf 导致结果非有限
pub fn reconstruct_momentum(
    params: &[f64; 5],
    alpha: f64,
) -> Result<Momentum3, ReconstructionError> {
    let sin_phi = params[2];
    let tan_lambda = params[3];
    let q_over_pt = params[4];

    if q_over_pt == 0.0 {
        return Err(ReconstructionError::ZeroCurvature);
    }
    if sin_phi.abs() > 1.0 {
        return Err(ReconstructionError::SinPhiOutOfDomain);
    }

    let pt = 1.0 / q_over_pt.abs();
    let (sn, cs) = alpha.sin_cos();
    let r = (1.0 - sin_phi * sin_phi).sqrt();

    let momentum = Momentum3 {
        px: pt * (r * cs - sin_phi * sn),
        py: pt * (sin_phi * cs + r * sn),
        pz: pt * tan_lambda,
    };

    if !momentum.is_finite() {
        return Err(ReconstructionError::NonFinite);
    }

    Ok(momentum)
}
