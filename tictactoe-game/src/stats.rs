//! 累计战绩

use std::time::Duration;

use protocol::{GameOutcome, Player};
use serde::{Deserialize, Serialize};

/// 多局累计统计，只通过 `record_round` 修改
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningStatistics {
    wins_a: u32,
    wins_b: u32,
    draws: u32,
    timeouts: u32,
    total_rounds: u32,
    cumulative_elapsed: Duration,
}

impl RunningStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一局结果；进行中的对局不计入
    pub fn record_round(&mut self, outcome: GameOutcome, elapsed: Duration) {
        match outcome {
            GameOutcome::Ongoing => {
                tracing::warn!("尝试记录未结束的对局，已忽略");
                return;
            }
            GameOutcome::Won(Player::A) => self.wins_a += 1,
            GameOutcome::Won(Player::B) => self.wins_b += 1,
            GameOutcome::Draw => self.draws += 1,
            GameOutcome::TimedOut => self.timeouts += 1,
        }
        self.total_rounds += 1;
        self.cumulative_elapsed += elapsed;
    }

    pub fn wins(&self, player: Player) -> u32 {
        match player {
            Player::A => self.wins_a,
            Player::B => self.wins_b,
        }
    }

    pub fn draws(&self) -> u32 {
        self.draws
    }

    pub fn timeouts(&self) -> u32 {
        self.timeouts
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn cumulative_elapsed(&self) -> Duration {
        self.cumulative_elapsed
    }

    /// 平均每局用时，尚无对局时为 0
    pub fn average_elapsed(&self) -> Duration {
        if self.total_rounds == 0 {
            Duration::ZERO
        } else {
            self.cumulative_elapsed / self.total_rounds
        }
    }
}
