//! 中等难度：规则启发式
//!
//! 优先级依次为：立即取胜、封堵对手、占中心、占角、随机

use protocol::{Board, CancelToken, Difficulty, Player, Position};
use rand::seq::SliceRandom;

use crate::search::AiConfig;
use crate::strategy::MoveStrategy;

pub struct HeuristicStrategy {
    config: AiConfig,
}

impl HeuristicStrategy {
    pub fn new(config: AiConfig) -> Self {
        Self { config }
    }

    /// 找到能让 `player` 立即连成三子的空格
    fn find_completing(board: &Board, candidates: &[Position], player: Player) -> Option<Position> {
        candidates
            .iter()
            .copied()
            .find(|&pos| board.completes_line(pos, player))
    }
}

impl MoveStrategy for HeuristicStrategy {
    fn difficulty(&self) -> Difficulty {
        Difficulty::Medium
    }

    fn config(&self) -> &AiConfig {
        &self.config
    }

    fn select_move(&self, board: &Board, me: Player, cancel: &CancelToken) -> Option<Position> {
        if cancel.is_cancelled() || board.winner().is_some() {
            return None;
        }
        let candidates = board.empty_cells();
        if candidates.is_empty() {
            return None;
        }

        if let Some(pos) = Self::find_completing(board, &candidates, me) {
            tracing::trace!("启发式: 取胜 {}", pos);
            return Some(pos);
        }
        if let Some(pos) = Self::find_completing(board, &candidates, me.next()) {
            tracing::trace!("启发式: 封堵 {}", pos);
            return Some(pos);
        }
        if let Some(&center) = candidates.iter().find(|pos| pos.is_center()) {
            return Some(center);
        }

        let mut rng = rand::thread_rng();
        let corners: Vec<Position> = candidates.iter().copied().filter(|pos| pos.is_corner()).collect();
        if let Some(&corner) = corners.choose(&mut rng) {
            return Some(corner);
        }
        candidates.choose(&mut rng).copied()
    }
}
