//! 错误类型定义

use protocol::MoveError;
use thiserror::Error;

/// 控制器拒绝操作的原因
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerError {
    /// 计时器未在运行（未开局、已暂停或已结束）
    #[error("Round clock is not running")]
    ClockNotRunning,

    /// 本局已结束
    #[error("Round is already over")]
    RoundOver,

    /// AI 正在思考
    #[error("AI is still thinking")]
    AiThinking,

    /// 当前轮到 AI
    #[error("It is not a human player's turn")]
    NotHumanTurn,

    /// 落子不合法
    #[error("Illegal move: {0}")]
    IllegalMove(#[from] MoveError),

    /// 控制器已退出
    #[error("Controller has shut down")]
    Closed,
}
