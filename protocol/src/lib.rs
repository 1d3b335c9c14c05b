//! 限时井字棋共享协议库
//!
//! 包含:
//! - 玩家、格子、坐标、棋盘等核心数据结构
//! - 对局状态机（落子合法性、胜负与和棋判定）
//! - 计时器与 AI 事件定义
//! - 协作式取消令牌
//! - 对外暴露的配置常量

mod board;
mod cancel;
mod constants;
mod error;
mod message;
mod player;
mod session;

pub use board::{Board, LINES};
pub use cancel::CancelToken;
pub use constants::*;
pub use error::{MoveError, Result};
pub use message::{AiEvent, Difficulty, GameOutcome, TimerEvent};
pub use player::{Cell, Player, Position};
pub use session::{GameSession, STARTING_PLAYER};
