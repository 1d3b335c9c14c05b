//! 控制器对外发布的事件与状态快照

use std::time::Duration;

use protocol::{AiEvent, Board, Difficulty, GameOutcome, GameSession, Player, TimerEvent};

use crate::clock::ClockState;
use crate::stats::RunningStatistics;

/// 控制器事件，按发生顺序推送给界面
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// 新一局开始
    RoundStarted {
        difficulty: Difficulty,
        ai_player: Option<Player>,
    },
    /// 有一方落子，附带落子后的棋盘
    MoveApplied {
        player: Player,
        row: usize,
        col: usize,
        board: Board,
    },
    /// 计时器事件
    Timer(TimerEvent),
    /// AI 事件
    Ai(AiEvent),
    /// 本局结束，附带更新后的统计
    RoundFinished {
        outcome: GameOutcome,
        elapsed: Duration,
        statistics: RunningStatistics,
    },
}

/// 控制器状态快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session: GameSession,
    pub remaining_secs: u32,
    pub clock_state: ClockState,
    pub ai_pending: bool,
    pub difficulty: Difficulty,
    /// 已设置但要等下一局才生效的难度
    pub pending_difficulty: Option<Difficulty>,
    pub ai_player: Option<Player>,
    pub statistics: RunningStatistics,
}

impl SessionSnapshot {
    /// 轮到人类玩家且可以落子
    pub fn awaiting_human(&self) -> bool {
        self.clock_state == ClockState::Running
            && !self.session.is_finished()
            && !self.ai_pending
            && self.ai_player != Some(self.session.current_player())
    }
}
