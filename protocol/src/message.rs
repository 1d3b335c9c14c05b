//! 消息类型定义
//!
//! 计时器与 AI 通过这些事件向上层汇报，不直接依赖任何界面框架

use serde::{Deserialize, Serialize};

use crate::player::{Player, Position};

/// 对局结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    /// 进行中
    Ongoing,
    /// 某方获胜
    Won(Player),
    /// 和棋
    Draw,
    /// 时间耗尽
    TimedOut,
}

impl GameOutcome {
    /// 是否仍在进行
    pub fn is_ongoing(self) -> bool {
        self == GameOutcome::Ongoing
    }

    /// 获胜方
    pub fn winner(self) -> Option<Player> {
        match self {
            GameOutcome::Won(player) => Some(player),
            _ => None,
        }
    }
}

/// AI 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    /// 简单：随机落子
    Easy,
    /// 中等：规则启发式
    #[default]
    Medium,
    /// 困难：Alpha-Beta 穷举搜索
    Hard,
}

impl Difficulty {
    pub fn display_name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "简单",
            Difficulty::Medium => "中等",
            Difficulty::Hard => "困难",
        }
    }

    /// 所有选项
    pub fn all() -> &'static [Difficulty] {
        &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }

    /// 下一个选项
    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "e" => Ok(Difficulty::Easy),
            "medium" | "m" => Ok(Difficulty::Medium),
            "hard" | "h" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// 计时器事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerEvent {
    /// 开始计时
    Started { remaining_secs: u32 },
    /// 每秒更新
    Tick { remaining_secs: u32 },
    /// 剩余时间到达警告阈值（每次启动只触发一次）
    Warning { remaining_secs: u32 },
    /// 时间耗尽
    Finished,
}

/// AI 事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiEvent {
    /// 开始思考
    ThinkingStarted { player: Player, difficulty: Difficulty },
    /// 思考过程提示
    Progress { message: String },
    /// 已走棋
    MoveCompleted { row: usize, col: usize },
    /// 无法给出走法或内部错误
    Error { message: String },
}

impl AiEvent {
    /// 由坐标构造走棋完成事件
    pub fn move_completed(pos: Position) -> Self {
        AiEvent::MoveCompleted {
            row: pos.row,
            col: pos.col,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_helpers() {
        assert!(GameOutcome::Ongoing.is_ongoing());
        assert!(!GameOutcome::TimedOut.is_ongoing());
        assert_eq!(GameOutcome::Won(Player::B).winner(), Some(Player::B));
        assert_eq!(GameOutcome::Draw.winner(), None);
    }

    #[test]
    fn test_difficulty_cycle() {
        let mut difficulty = Difficulty::Easy;
        for _ in 0..Difficulty::all().len() {
            difficulty = difficulty.next();
        }
        assert_eq!(difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!("Hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(" e ".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert!("brutal".parse::<Difficulty>().is_err());
    }
}
