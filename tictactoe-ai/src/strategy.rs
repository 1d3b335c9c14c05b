//! 走法策略接口与难度工厂

use std::sync::Arc;
use std::time::Duration;

use protocol::{Board, CancelToken, Difficulty, Player, Position};
use rand::Rng;

use crate::heuristic::HeuristicStrategy;
use crate::random::RandomStrategy;
use crate::search::{AiConfig, MinimaxStrategy};

/// 走法选择策略
///
/// 输入是棋盘快照，策略本身不修改任何共享状态
pub trait MoveStrategy: Send + Sync {
    /// 对应的难度
    fn difficulty(&self) -> Difficulty;

    /// 生成配置
    fn config(&self) -> &AiConfig;

    /// 为 `me` 选择一个空格；无空格或对局已分胜负时返回 None
    fn select_move(&self, board: &Board, me: Player, cancel: &CancelToken) -> Option<Position>;

    /// 本次思考的额外延迟（只影响节奏，不影响结果）
    fn think_delay(&self) -> Duration {
        let config = self.config();
        let (min, max) = (config.think_min_ms, config.think_max_ms);
        let ms = if max > min {
            rand::thread_rng().gen_range(min..=max)
        } else {
            min
        };
        Duration::from_millis(ms)
    }

    /// 思考过程中依次发出的提示
    fn progress_messages(&self) -> &'static [&'static str] {
        match self.difficulty() {
            Difficulty::Easy => &["AI 正在随便看看..."],
            Difficulty::Medium => &["AI 正在分析局势..."],
            Difficulty::Hard => &["AI 正在深度计算...", "AI 正在评估所有可能..."],
        }
    }

    /// 两条提示之间的间隔
    fn progress_gap(&self) -> Duration {
        Duration::from_millis(self.config().progress_gap_ms)
    }
}

/// 按配置创建策略实例，每次调用都返回全新实例
pub fn create_strategy(config: AiConfig) -> Arc<dyn MoveStrategy> {
    match config.difficulty {
        Difficulty::Easy => Arc::new(RandomStrategy::new(config)),
        Difficulty::Medium => Arc::new(HeuristicStrategy::new(config)),
        Difficulty::Hard => Arc::new(MinimaxStrategy::new(config)),
    }
}
