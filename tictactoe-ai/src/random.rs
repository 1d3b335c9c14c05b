//! 简单难度：在空格中均匀随机落子

use protocol::{Board, CancelToken, Difficulty, Player, Position};
use rand::seq::SliceRandom;

use crate::search::AiConfig;
use crate::strategy::MoveStrategy;

pub struct RandomStrategy {
    config: AiConfig,
}

impl RandomStrategy {
    pub fn new(config: AiConfig) -> Self {
        Self { config }
    }
}

impl MoveStrategy for RandomStrategy {
    fn difficulty(&self) -> Difficulty {
        Difficulty::Easy
    }

    fn config(&self) -> &AiConfig {
        &self.config
    }

    fn select_move(&self, board: &Board, _me: Player, cancel: &CancelToken) -> Option<Position> {
        if cancel.is_cancelled() || board.winner().is_some() {
            return None;
        }
        board.empty_cells().choose(&mut rand::thread_rng()).copied()
    }
}
