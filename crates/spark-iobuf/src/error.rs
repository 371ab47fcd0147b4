//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 为缓冲引擎的全部越界、分配失败路径提供集中定义；
//! - 每个变体携带足够的数值上下文（请求量、可用量、边界），便于在组帧失败时直接定位是哪一步写多了。
//!
//! ## 设计要求（What）
//! - 通过 `thiserror::Error` 兼容 `std::error::Error`，可直接交给 `anyhow` 等上层框架；
//! - [`IoBufError::code`] 返回稳定错误码，供日志与告警聚合使用，文案调整不影响告警规则。

use thiserror::Error;

/// 缓冲引擎统一的结果别名。
pub type Result<T, E = IoBufError> = core::result::Result<T, E>;

/// 缓冲引擎的错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：所有位置型操作在修改游标前完成校验，失败即以具名条件返回，避免静默破坏读写指针。
/// - **契约 (What)**：
///   - 错误均为本地、同步产生，引擎内部不做重试；是否“少写一点再试”由决定写入量的上层负责；
///   - 返回错误时缓冲游标保持调用前的状态，但调用方仍应视其为该实例的终止条件，
///     除非显式调用 `clear()` 重置或直接丢弃缓冲。
/// - **设计权衡 (Trade-offs)**：字段全部为 `usize`，保持 `Copy`，错误路径上零分配。
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum IoBufError {
    /// 写入超出固定容量。
    #[error("buffer overflow: requested {requested} byte(s), {available} available")]
    Overflow { requested: usize, available: usize },

    /// 读取超出已写入的数据。
    #[error("buffer underflow: requested {requested} byte(s), {available} readable")]
    Underflow { requested: usize, available: usize },

    /// 绝对位置违反读写游标或容量的顺序约束。
    #[error("invalid position {position} (bound {bound})")]
    InvalidPosition { position: usize, bound: usize },

    /// 无法获得底层存储。
    #[error("failed to allocate a chunk of {capacity} byte(s)")]
    AllocationFailure { capacity: usize },
}

impl IoBufError {
    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            IoBufError::Overflow { .. } => "iobuf.overflow",
            IoBufError::Underflow { .. } => "iobuf.underflow",
            IoBufError::InvalidPosition { .. } => "iobuf.invalid_position",
            IoBufError::AllocationFailure { .. } => "iobuf.allocation_failure",
        }
    }

    pub(crate) fn overflow(requested: usize, available: usize) -> Self {
        IoBufError::Overflow {
            requested,
            available,
        }
    }

    pub(crate) fn underflow(requested: usize, available: usize) -> Self {
        IoBufError::Underflow {
            requested,
            available,
        }
    }

    pub(crate) fn invalid_position(position: usize, bound: usize) -> Self {
        IoBufError::InvalidPosition { position, bound }
    }
}
