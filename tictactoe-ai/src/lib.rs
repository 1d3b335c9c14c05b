//! 井字棋 AI 引擎
//!
//! 包含:
//! - 简单：随机落子
//! - 中等：取胜/封堵/中心/角的规则启发式
//! - 困难：Minimax + Alpha-Beta 穷举搜索（根节点并行）
//! - 难度到策略的工厂

mod heuristic;
mod random;
mod search;
mod strategy;

pub use heuristic::HeuristicStrategy;
pub use random::RandomStrategy;
pub use search::{AiConfig, MinimaxStrategy};
pub use strategy::{create_strategy, MoveStrategy};
