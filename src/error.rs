//! 统一错误处理框架
//!
//! 运行级错误（配置、I/O、数据格式、计算、资源）与径迹级重建错误的类型定义。

use std::fmt;
use std::io;
use std::path::Path;

/// 质量分析相关的统一错误类型
#[derive(Debug)]
pub enum AnalysisError {
    /// 输入验证错误（参数、文件列表）
    InvalidInput(String),

    /// 文件I/O错误
    IoError(io::Error),

    /// 数据格式错误（字段缺失、数组形状不符）
    FormatError(String),

    /// 计算异常（直方图分箱不一致等）
    CalculationError(String),

    /// 资源访问错误（线程池、预取线程）
    ResourceError(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvalidInput(msg) => write!(f, "输入验证失败 / invalid input: {msg}"),
            AnalysisError::IoError(err) => write!(f, "文件I/O错误 / I/O error: {err}"),
            AnalysisError::FormatError(msg) => write!(f, "数据格式错误 / format error: {msg}"),
            AnalysisError::CalculationError(msg) => {
                write!(f, "计算异常 / calculation error: {msg}")
            }
            AnalysisError::ResourceError(msg) => {
                write!(f, "资源访问错误 / resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalysisError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for AnalysisError {
    fn from(err: io::Error) -> Self {
        AnalysisError::IoError(err)
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            AnalysisError::IoError(io::Error::other(err))
        } else {
            AnalysisError::FormatError(format!("JSON解析错误: {err}"))
        }
    }
}

/// 分析操作的标准Result类型
pub type AnalysisResult<T> = Result<T, AnalysisError>;

// ==================== 错误转换Helper函数 ====================

/// 创建格式错误的helper函数
#[inline]
pub fn format_error<E: fmt::Display>(context: &str, err: E) -> AnalysisError {
    AnalysisError::FormatError(format!("{context}: {err}"))
}

/// 创建带文件位置的格式错误（`file:line` 形式）
#[inline]
pub fn format_error_at<E: fmt::Display>(path: &Path, line: usize, err: E) -> AnalysisError {
    AnalysisError::FormatError(format!("{}:{line}: {err}", path.display()))
}

/// 创建计算错误的helper函数
#[inline]
pub fn calculation_error<E: fmt::Display>(context: &str, err: E) -> AnalysisError {
    AnalysisError::CalculationError(format!("{context}: {err}"))
}

// ==================== 径迹级重建错误 ====================

/// 单条径迹的重建失败原因
///
/// 数值边界情况不以 NaN/inf 传播，而是显式拒绝该径迹，
/// 以便统计被丢弃的样本数量。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReconstructionError {
    /// 曲率参数 P4 为零，横动量无定义
    ZeroCurvature,
    /// |P2| > 1，局部角正弦超出定义域
    SinPhiOutOfDomain,
    /// β ≥ 1，洛伦兹因子无定义
    Superluminal,
    /// 结果为非有限值（NaN/inf）
    NonFinite,
}

impl ReconstructionError {
    /// 全部原因（用于按固定顺序输出统计）
    pub const ALL: [ReconstructionError; 4] = [
        ReconstructionError::ZeroCurvature,
        ReconstructionError::SinPhiOutOfDomain,
        ReconstructionError::Superluminal,
        ReconstructionError::NonFinite,
    ];

    /// 显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ZeroCurvature => "零曲率 / zero curvature",
            Self::SinPhiOutOfDomain => "|sinφ|>1 / sin(phi) out of domain",
            Self::Superluminal => "β≥1 / superluminal",
            Self::NonFinite => "非有限值 / non-finite",
        }
    }
}

impl fmt::Display for ReconstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::error::Error for ReconstructionError {}

// ==================== 错误分类系统 ====================

/// 错误类别枚举（用于退出码和建议文本）
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum ErrorCategory {
    /// 数据格式相关错误
    Format,
    /// I/O相关错误（文件不存在、权限不足等）
    Io,
    /// 计算相关错误
    Calculation,
    /// 其他未分类错误
    Other,
}

impl ErrorCategory {
    /// 从AnalysisError提取错误类别
    pub fn from_analysis_error(e: &AnalysisError) -> Self {
        match e {
            AnalysisError::FormatError(_) => Self::Format,
            AnalysisError::IoError(_) => Self::Io,
            AnalysisError::CalculationError(_) => Self::Calculation,
            AnalysisError::InvalidInput(_) | AnalysisError::ResourceError(_) => Self::Other,
        }
    }

    /// 获取错误类别的显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Format => "格式错误",
            Self::Io => "I/O错误",
            Self::Calculation => "计算错误",
            Self::Other => "其他错误",
        }
    }
}
