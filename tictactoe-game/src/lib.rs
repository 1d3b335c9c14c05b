//! 限时井字棋
//!
//! 包含:
//! - 回合计时器
//! - 对局控制器
//! - AI 回合调度
//! - 战绩统计
//! - 设置读写

pub mod ai;
pub mod clock;
pub mod controller;
pub mod error;
pub mod event;
pub mod settings;
pub mod stats;

pub use clock::{ClockConfig, ClockState, RoundClock};
pub use controller::{spawn, spawn_with_strategy, ControllerHandle, DifficultyChange};
pub use error::ControllerError;
pub use event::{GameEvent, SessionSnapshot};
pub use settings::{LogLevel, Settings};
pub use stats::RunningStatistics;
