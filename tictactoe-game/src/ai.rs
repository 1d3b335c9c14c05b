//! AI 回合执行
//!
//! 每个 AI 回合一个异步任务：先发出提示并等待思考延迟，再把搜索放到阻塞线程池，
//! 不占用控制器与计时器所在的执行上下文

use std::sync::Arc;
use std::time::{Duration, Instant};

use protocol::{AiEvent, Board, CancelToken, Player};
use tictactoe_ai::MoveStrategy;
use tokio::sync::mpsc;

/// 带回合编号的 AI 消息，编号不匹配的消息会被控制器丢弃
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiMessage {
    pub generation: u64,
    pub event: AiEvent,
}

/// 启动一个 AI 回合，返回用于取消的令牌
pub fn spawn_ai_turn(
    strategy: Arc<dyn MoveStrategy>,
    board: Board,
    player: Player,
    generation: u64,
    tx: mpsc::UnboundedSender<AiMessage>,
) -> CancelToken {
    let cancel = CancelToken::new();
    tokio::spawn(run_ai_turn(strategy, board, player, generation, cancel.clone(), tx));
    cancel
}

async fn run_ai_turn(
    strategy: Arc<dyn MoveStrategy>,
    board: Board,
    player: Player,
    generation: u64,
    cancel: CancelToken,
    tx: mpsc::UnboundedSender<AiMessage>,
) {
    let send = |event: AiEvent| {
        let _ = tx.send(AiMessage { generation, event });
    };

    tracing::info!("AI 开始思考... 难度: {:?}", strategy.difficulty());
    send(AiEvent::ThinkingStarted {
        player,
        difficulty: strategy.difficulty(),
    });

    for (i, message) in strategy.progress_messages().iter().enumerate() {
        if i > 0 && !sleep_unless_cancelled(strategy.progress_gap(), &cancel).await {
            return;
        }
        send(AiEvent::Progress {
            message: message.to_string(),
        });
    }
    if !sleep_unless_cancelled(strategy.think_delay(), &cancel).await {
        return;
    }

    let started_at = Instant::now();
    let search = {
        let strategy = strategy.clone();
        let cancel = cancel.clone();
        tokio::task::spawn_blocking(move || strategy.select_move(&board, player, &cancel))
    };
    let result = search.await;

    if cancel.is_cancelled() {
        tracing::debug!("AI 回合 {} 已取消，丢弃结果", generation);
        return;
    }

    match result {
        Ok(Some(pos)) => {
            tracing::info!("AI 走棋: {}, 耗时: {:?}", pos, started_at.elapsed());
            send(AiEvent::move_completed(pos));
        }
        Ok(None) => {
            tracing::warn!("AI 无法找到可走的格子");
            send(AiEvent::Error {
                message: "AI 无法找到可走的格子".to_string(),
            });
        }
        Err(e) => {
            tracing::error!("AI 计算任务失败: {}", e);
            send(AiEvent::Error {
                message: format!("AI 计算失败: {}", e),
            });
        }
    }
}

/// 等待指定时长；期间被取消则返回 false
async fn sleep_unless_cancelled(duration: Duration, cancel: &CancelToken) -> bool {
    if duration.is_zero() {
        return !cancel.is_cancelled();
    }
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
