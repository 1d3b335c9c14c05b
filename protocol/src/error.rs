//! 错误类型定义

use thiserror::Error;

/// 落子规则错误
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    /// 坐标越界
    #[error("Position out of bounds: ({row}, {col})")]
    OutOfBounds { row: usize, col: usize },

    /// 格子已被占用
    #[error("Cell already marked: ({row}, {col})")]
    Occupied { row: usize, col: usize },

    /// 本局已结束
    #[error("Game is already over")]
    GameOver,
}

/// 规则操作结果类型
pub type Result<T> = std::result::Result<T, MoveError>;
