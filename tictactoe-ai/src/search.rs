//! 搜索引擎
//!
//! 实现 Minimax + Alpha-Beta 剪枝，根节点各候选走法并行评估

use std::sync::atomic::{AtomicU64, Ordering};

use protocol::{
    Board, CancelToken, Difficulty, Player, Position, EASY_THINK_MS, HARD_PROGRESS_GAP_MS,
    MAX_SEARCH_DEPTH, MEDIUM_THINK_MS,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::strategy::MoveStrategy;

/// 取胜基准分
const WIN_SCORE: i32 = 10;

/// Alpha-Beta 初始窗口
const INF: i32 = 1000;

/// AI 配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiConfig {
    pub difficulty: Difficulty,
    /// 搜索深度上限，只有困难难度的搜索读取；其余难度不搜索，固定为 0
    pub max_depth: u8,
    /// 思考延迟下限（毫秒）
    pub think_min_ms: u64,
    /// 思考延迟上限（毫秒）
    pub think_max_ms: u64,
    /// 进度提示间隔（毫秒）
    pub progress_gap_ms: u64,
}

impl AiConfig {
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                difficulty,
                max_depth: 0,
                think_min_ms: EASY_THINK_MS.0,
                think_max_ms: EASY_THINK_MS.1,
                progress_gap_ms: 0,
            },
            Difficulty::Medium => Self {
                difficulty,
                max_depth: 0,
                think_min_ms: MEDIUM_THINK_MS.0,
                think_max_ms: MEDIUM_THINK_MS.1,
                progress_gap_ms: 0,
            },
            Difficulty::Hard => Self {
                difficulty,
                max_depth: MAX_SEARCH_DEPTH,
                think_min_ms: 0,
                think_max_ms: 0,
                progress_gap_ms: HARD_PROGRESS_GAP_MS,
            },
        }
    }

    /// 去掉所有人为延迟（测试与无头对局使用）
    pub fn instant(difficulty: Difficulty) -> Self {
        Self {
            think_min_ms: 0,
            think_max_ms: 0,
            progress_gap_ms: 0,
            ..Self::from_difficulty(difficulty)
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::from_difficulty(Difficulty::Medium)
    }
}

/// 单次搜索的上下文，节点计数只属于这一次搜索
struct SearchContext<'a> {
    me: Player,
    cancel: &'a CancelToken,
    nodes: AtomicU64,
}

impl<'a> SearchContext<'a> {
    fn new(me: Player, cancel: &'a CancelToken) -> Self {
        Self {
            me,
            cancel,
            nodes: AtomicU64::new(0),
        }
    }

    fn nodes(&self) -> u64 {
        self.nodes.load(Ordering::Relaxed)
    }
}

/// 困难难度：穷举搜索
pub struct MinimaxStrategy {
    config: AiConfig,
}

impl MinimaxStrategy {
    pub fn new(config: AiConfig) -> Self {
        Self { config }
    }

    /// 对每个空格打分，结果顺序与 `empty_cells` 一致
    pub fn score_moves(&self, board: &Board, me: Player, cancel: &CancelToken) -> Vec<(Position, i32)> {
        self.score_with(board, &SearchContext::new(me, cancel))
    }

    fn score_with(&self, board: &Board, ctx: &SearchContext<'_>) -> Vec<(Position, i32)> {
        board
            .empty_cells()
            .par_iter()
            .map(|&pos| {
                let child = board.with_mark(pos, ctx.me);
                (pos, self.alpha_beta(ctx, &child, 0, false, -INF, INF))
            })
            .collect()
    }

    /// Alpha-Beta 搜索，`depth` 为距根节点的层数
    fn alpha_beta(
        &self,
        ctx: &SearchContext<'_>,
        board: &Board,
        depth: u8,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        ctx.nodes.fetch_add(1, Ordering::Relaxed);

        if ctx.cancel.is_cancelled() {
            return 0;
        }
        let me = ctx.me;
        if board.has_line(me) {
            return WIN_SCORE - depth as i32;
        }
        if board.has_line(me.next()) {
            return depth as i32 - WIN_SCORE;
        }
        if board.is_full() || depth >= self.config.max_depth {
            return 0;
        }

        let mover = if maximizing { me } else { me.next() };
        let mut best = if maximizing { -INF } else { INF };

        for pos in board.empty_cells() {
            let child = board.with_mark(pos, mover);
            let score = self.alpha_beta(ctx, &child, depth + 1, !maximizing, alpha, beta);

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }
            if beta <= alpha {
                break; // 剪枝
            }
        }

        best
    }
}

impl MoveStrategy for MinimaxStrategy {
    fn difficulty(&self) -> Difficulty {
        Difficulty::Hard
    }

    fn config(&self) -> &AiConfig {
        &self.config
    }

    fn select_move(&self, board: &Board, me: Player, cancel: &CancelToken) -> Option<Position> {
        if cancel.is_cancelled() || board.winner().is_some() {
            return None;
        }
        let ctx = SearchContext::new(me, cancel);
        let scores = self.score_with(board, &ctx);
        if cancel.is_cancelled() {
            tracing::debug!("搜索已取消");
            return None;
        }

        // 同分时保留最先遇到的走法
        let mut best: Option<(Position, i32)> = None;
        for (pos, score) in scores {
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((pos, score));
            }
        }

        if let Some((pos, score)) = best {
            tracing::debug!(
                "困难 AI 选择 {}，得分 {}，搜索节点 {}",
                pos,
                score,
                ctx.nodes()
            );
        }
        best.map(|(pos, _)| pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{Cell, GameOutcome, GameSession};

    fn engine() -> MinimaxStrategy {
        MinimaxStrategy::new(AiConfig::instant(Difficulty::Hard))
    }

    fn board_from(layout: &str) -> Board {
        let mut board = Board::empty();
        for (index, c) in layout.chars().filter(|c| !c.is_whitespace()).enumerate() {
            let cell = match c {
                'X' => Cell::Mark(Player::A),
                'O' => Cell::Mark(Player::B),
                _ => Cell::Empty,
            };
            board.set(Position::from_index(index).unwrap(), cell);
        }
        board
    }

    /// 枚举对手的每一种走法，AI 一方用困难策略应对
    fn assert_never_loses(engine: &MinimaxStrategy, session: &GameSession, ai: Player, games: &mut u32) {
        match session.outcome() {
            GameOutcome::Ongoing => {}
            outcome => {
                assert_ne!(outcome, GameOutcome::Won(ai.next()), "AI lost:\n{}", session.board());
                *games += 1;
                return;
            }
        }

        if session.current_player() == ai {
            let pos = engine
                .select_move(session.board(), ai, &CancelToken::new())
                .expect("AI must move on a live board");
            let mut next = session.clone();
            assert!(next.apply_move(pos.row, pos.col));
            assert_never_loses(engine, &next, ai, games);
        } else {
            for pos in session.board().empty_cells() {
                let mut next = session.clone();
                assert!(next.apply_move(pos.row, pos.col));
                assert_never_loses(engine, &next, ai, games);
            }
        }
    }

    #[test]
    fn test_takes_immediate_win() {
        let board = board_from("OO. XX. X..");
        assert_eq!(
            engine().select_move(&board, Player::B, &CancelToken::new()),
            Some(Position::new_unchecked(0, 2))
        );
    }

    #[test]
    fn test_blocks_threat() {
        let board = board_from("XX. .O. ...");
        assert_eq!(
            engine().select_move(&board, Player::B, &CancelToken::new()),
            Some(Position::new_unchecked(0, 2))
        );
    }

    #[test]
    fn test_prefers_faster_win() {
        // O 在 (0,2) 立即取胜，得分 10
        let board = board_from("OO. XX. ..X");
        let scores = engine().score_moves(&board, Player::B, &CancelToken::new());
        let (best, score) = scores.iter().max_by_key(|(_, s)| *s).copied().unwrap();
        assert_eq!(best, Position::new_unchecked(0, 2));
        assert_eq!(score, WIN_SCORE);
    }

    #[test]
    fn test_first_max_wins_ties() {
        // 空棋盘所有走法均为和棋，取第一个
        let engine = engine();
        let scores = engine.score_moves(&Board::empty(), Player::A, &CancelToken::new());
        assert!(scores.iter().all(|&(_, s)| s == 0));
        assert_eq!(
            engine.select_move(&Board::empty(), Player::A, &CancelToken::new()),
            Some(Position::new_unchecked(0, 0))
        );
    }

    #[test]
    fn test_node_count_belongs_to_each_search() {
        let engine = engine();
        let token = CancelToken::new();
        let board = board_from("X.. ... ...");

        let single = SearchContext::new(Player::B, &token);
        engine.score_with(&board, &single);
        assert!(single.nodes() > 0);

        // 并发的两次搜索各自计数，互不叠加
        let (left, right) = std::thread::scope(|scope| {
            let a = scope.spawn(|| {
                let ctx = SearchContext::new(Player::B, &token);
                engine.score_with(&board, &ctx);
                ctx.nodes()
            });
            let b = scope.spawn(|| {
                let ctx = SearchContext::new(Player::B, &token);
                engine.score_with(&board, &ctx);
                ctx.nodes()
            });
            (a.join().unwrap(), b.join().unwrap())
        });
        assert_eq!(left, single.nodes());
        assert_eq!(right, single.nodes());
    }

    #[test]
    fn test_never_loses_moving_second() {
        let engine = engine();
        let mut games = 0;
        assert_never_loses(&engine, &GameSession::new(), Player::B, &mut games);
        assert!(games > 0);
    }

    #[test]
    fn test_never_loses_moving_first() {
        let engine = engine();
        let mut games = 0;
        assert_never_loses(&engine, &GameSession::new(), Player::A, &mut games);
        assert!(games > 0);
    }

    #[test]
    fn test_cancelled_search_returns_none() {
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(engine().select_move(&Board::empty(), Player::A, &token), None);
    }

    #[test]
    fn test_no_move_on_full_or_won_board() {
        let full = board_from("XOX XOO OXX");
        assert_eq!(engine().select_move(&full, Player::A, &CancelToken::new()), None);
        let won = board_from("XXX OO. ...");
        assert_eq!(engine().select_move(&won, Player::B, &CancelToken::new()), None);
    }

    #[test]
    fn test_difficulty_config() {
        let easy = AiConfig::from_difficulty(Difficulty::Easy);
        assert_eq!((easy.think_min_ms, easy.think_max_ms), (500, 1500));

        let medium = AiConfig::from_difficulty(Difficulty::Medium);
        assert_eq!((medium.think_min_ms, medium.think_max_ms), (300, 800));

        let hard = AiConfig::from_difficulty(Difficulty::Hard);
        assert_eq!(hard.max_depth, MAX_SEARCH_DEPTH);
        assert_eq!((easy.max_depth, medium.max_depth), (0, 0));
    }
}
