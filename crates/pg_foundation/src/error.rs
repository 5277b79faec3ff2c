// crates/pg_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `PgError` 枚举和 `PgResult` 类型别名，用于整个项目的错误处理。
//!
//! # 设计原则
//!
//! 1. **层次化**: 基础层只定义核心错误，配置错误在 pg_config 中定义
//! 2. **易用性**: 提供便捷的构造方法
//! 3. **致命即返回**: 块网格前置条件违反等致命错误以 `Err` 传播，由驱动终止运行
//!
//! # 示例
//!
//! ```
//! use pg_foundation::error::{PgError, PgResult};
//!
//! fn read_config() -> PgResult<()> {
//!     Err(PgError::config("配置文件格式错误"))
//! }
//! assert!(read_config().is_err());
//! ```

use thiserror::Error;

/// 统一结果类型
pub type PgResult<T> = Result<T, PgError>;

/// Pangu 错误类型
#[derive(Error, Debug)]
pub enum PgError {
    // ========================================================================
    // IO 相关错误
    // ========================================================================

    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 序列化错误
    #[error("序列化错误: {message}")]
    Serialization {
        /// 序列化失败原因
        message: String,
    },

    // ========================================================================
    // 输入与配置错误
    // ========================================================================

    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 数据超出范围
    #[error("数据超出范围: {field}={value}, 期望范围=[{min}, {max}]")]
    OutOfRange {
        /// 字段名
        field: &'static str,
        /// 实际值
        value: f64,
        /// 最小允许值
        min: f64,
        /// 最大允许值
        max: f64,
    },

    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    // ========================================================================
    // 块网格错误
    // ========================================================================

    /// 块更新时缺少自身祖先（状态种子），致命
    #[error("块 {coord:?} 缺少自身祖先，无法继承节点状态")]
    MissingSelfAncestor {
        /// 块基坐标（网格单位）
        coord: [i32; 3],
    },

    /// 块的粒子容量已满，致命
    #[error("块 {coord:?} 粒子数超出容量 {capacity}")]
    BlockOverflow {
        /// 块基坐标（网格单位）
        coord: [i32; 3],
        /// 块容量
        capacity: usize,
    },

    // ========================================================================
    // 数值错误
    // ========================================================================

    /// 密度退化（累加密度为零），属于逻辑不变量违反
    #[error("粒子 {index} 的累加密度为零")]
    DegenerateDensity {
        /// 粒子在其所属集合中的下标
        index: usize,
    },

    /// 内部错误
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl PgError {
    /// 从IO错误创建
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// 从IO错误创建（带源）
    pub fn io_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 序列化错误
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 数据超出范围
    pub fn out_of_range(field: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            field,
            value,
            min,
            max,
        }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 缺少自身祖先
    pub fn missing_self_ancestor(coord: [i32; 3]) -> Self {
        Self::MissingSelfAncestor { coord }
    }

    /// 块溢出
    pub fn block_overflow(coord: [i32; 3], capacity: usize) -> Self {
        Self::BlockOverflow { coord, capacity }
    }

    /// 内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// 是否为致命的块网格前置条件错误
    pub fn is_grid_precondition(&self) -> bool {
        matches!(
            self,
            Self::MissingSelfAncestor { .. } | Self::BlockOverflow { .. }
        )
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl PgError {
    /// 检查值为有限正数
    #[inline]
    pub fn check_positive(field: &'static str, value: f64) -> PgResult<()> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(Self::out_of_range(field, value, f64::MIN_POSITIVE, f64::MAX))
        }
    }
}

// ========================================================================
// 标准库错误转换
// ========================================================================

impl From<std::io::Error> for PgError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// 条件不满足时返回错误
///
/// ```
/// use pg_foundation::{ensure, error::{PgError, PgResult}};
///
/// fn check(n: usize) -> PgResult<()> {
///     ensure!(n > 0, PgError::invalid_input("n 必须为正"));
///     Ok(())
/// }
/// assert!(check(0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err.into());
        }
    };
}
