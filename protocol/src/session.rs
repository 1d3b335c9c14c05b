//! 对局状态机
//!
//! 所有落子都经过 `apply_move`，结果一旦确定即不可变，直到 `reset`

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::constants::CELL_COUNT;
use crate::error::{MoveError, Result};
use crate::message::GameOutcome;
use crate::player::{Cell, Player, Position};

/// 固定的先手方
pub const STARTING_PLAYER: Player = Player::A;

/// 一局游戏的完整状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    board: Board,
    current_player: Player,
    move_count: u8,
    outcome: GameOutcome,
}

impl GameSession {
    /// 创建新对局
    pub fn new() -> Self {
        Self {
            board: Board::empty(),
            current_player: STARTING_PLAYER,
            move_count: 0,
            outcome: GameOutcome::Ongoing,
        }
    }

    /// 落子，失败时状态不变
    pub fn apply_move(&mut self, row: usize, col: usize) -> bool {
        match self.try_apply_move(row, col) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("落子被拒绝: {}", e);
                false
            }
        }
    }

    /// 落子并返回拒绝原因
    pub fn try_apply_move(&mut self, row: usize, col: usize) -> Result<()> {
        let pos = Position::new(row, col).ok_or(MoveError::OutOfBounds { row, col })?;
        if !self.outcome.is_ongoing() {
            return Err(MoveError::GameOver);
        }
        if !self.board.is_empty_at(pos) {
            return Err(MoveError::Occupied { row, col });
        }

        self.board.set(pos, Cell::Mark(self.current_player));
        self.move_count += 1;

        // 只有对局仍在进行时才轮换
        if self.evaluate_outcome().is_ongoing() {
            self.current_player = self.current_player.next();
        }
        Ok(())
    }

    /// 重新判定结果：先查八条线，再查满盘
    pub fn evaluate_outcome(&mut self) -> GameOutcome {
        self.outcome = if let Some(winner) = self.board.winner() {
            GameOutcome::Won(winner)
        } else if self.move_count as usize == CELL_COUNT {
            GameOutcome::Draw
        } else {
            GameOutcome::Ongoing
        };
        self.outcome
    }

    /// 超时强制结束，无论当前结果如何
    pub fn force_time_up(&mut self) {
        self.outcome = GameOutcome::TimedOut;
    }

    /// 回到初始状态
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn move_count(&self) -> u8 {
        self.move_count
    }

    pub fn outcome(&self) -> GameOutcome {
        self.outcome
    }

    /// 对局是否已结束
    pub fn is_finished(&self) -> bool {
        !self.outcome.is_ongoing()
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::LINES;

    fn play(session: &mut GameSession, moves: &[(usize, usize)]) {
        for &(row, col) in moves {
            assert!(session.apply_move(row, col), "move ({}, {}) rejected", row, col);
        }
    }

    #[test]
    fn test_new_session() {
        let session = GameSession::new();
        assert_eq!(session.current_player(), Player::A);
        assert_eq!(session.move_count(), 0);
        assert_eq!(session.outcome(), GameOutcome::Ongoing);
        assert_eq!(session.board(), &Board::empty());
    }

    #[test]
    fn test_alternation() {
        let mut session = GameSession::new();
        play(&mut session, &[(0, 0)]);
        assert_eq!(session.current_player(), Player::B);
        play(&mut session, &[(1, 1)]);
        assert_eq!(session.current_player(), Player::A);
        assert_eq!(session.move_count(), 2);
        assert_eq!(session.board().mark_count(), 2);
    }

    #[test]
    fn test_every_line_wins_for_a() {
        for line in LINES {
            let mut session = GameSession::new();
            // B 的两手落在目标线以外，两子不可能成线
            let b_moves: Vec<usize> = (0..CELL_COUNT).filter(|i| !line.contains(i)).take(2).collect();

            for step in 0..3 {
                let a = Position::from_index(line[step]).unwrap();
                assert!(session.apply_move(a.row, a.col));
                if step < 2 {
                    assert_eq!(session.outcome(), GameOutcome::Ongoing);
                    let b = Position::from_index(b_moves[step]).unwrap();
                    assert!(session.apply_move(b.row, b.col));
                }
            }
            assert_eq!(session.outcome(), GameOutcome::Won(Player::A), "line {:?}", line);
            // 获胜后不再轮换
            assert_eq!(session.current_player(), Player::A);
        }
    }

    #[test]
    fn test_win_for_b() {
        let mut session = GameSession::new();
        play(&mut session, &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (1, 2)]);
        assert_eq!(session.outcome(), GameOutcome::Won(Player::B));
    }

    #[test]
    fn test_draw() {
        let mut session = GameSession::new();
        // X O X / X O O / O X X
        play(
            &mut session,
            &[(0, 0), (0, 1), (0, 2), (1, 1), (1, 0), (1, 2), (2, 1), (2, 0), (2, 2)],
        );
        assert_eq!(session.move_count(), 9);
        assert_eq!(session.outcome(), GameOutcome::Draw);
    }

    #[test]
    fn test_win_on_last_move_is_not_draw() {
        let mut session = GameSession::new();
        // 第 9 手连成主对角线
        play(
            &mut session,
            &[(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (2, 0), (1, 2), (2, 1), (2, 2)],
        );
        assert_eq!(session.outcome(), GameOutcome::Won(Player::A));
    }

    #[test]
    fn test_rejected_moves_leave_state_unchanged() {
        let mut session = GameSession::new();
        play(&mut session, &[(1, 1)]);
        let before = session.clone();

        assert!(!session.apply_move(1, 1));
        assert!(!session.apply_move(3, 0));
        assert!(!session.apply_move(0, 3));
        assert!(!session.apply_move(usize::MAX, 0));
        assert_eq!(session, before);

        assert_eq!(
            session.try_apply_move(1, 1),
            Err(MoveError::Occupied { row: 1, col: 1 })
        );
        assert_eq!(
            session.try_apply_move(5, 5),
            Err(MoveError::OutOfBounds { row: 5, col: 5 })
        );
    }

    #[test]
    fn test_no_moves_after_finish() {
        let mut session = GameSession::new();
        play(&mut session, &[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)]);
        let before = session.clone();
        assert_eq!(session.try_apply_move(2, 2), Err(MoveError::GameOver));
        assert_eq!(session, before);
    }

    #[test]
    fn test_force_time_up_overrides_any_outcome() {
        let mut session = GameSession::new();
        play(&mut session, &[(0, 0)]);
        session.force_time_up();
        assert_eq!(session.outcome(), GameOutcome::TimedOut);
        assert!(!session.apply_move(2, 2));
        assert_eq!(session.move_count(), 1);

        let mut won = GameSession::new();
        play(&mut won, &[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)]);
        won.force_time_up();
        assert_eq!(won.outcome(), GameOutcome::TimedOut);
    }

    #[test]
    fn test_reset_equals_fresh() {
        let mut session = GameSession::new();
        play(&mut session, &[(0, 0), (1, 1), (2, 2)]);
        session.force_time_up();
        session.reset();
        assert_eq!(session, GameSession::new());
    }
}
