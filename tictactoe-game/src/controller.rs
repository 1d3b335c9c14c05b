//! 对局控制器
//!
//! 单一任务持有对局、计时器与统计，按到达顺序处理命令、计时事件和 AI 结果。
//! 界面通过 `ControllerHandle` 发送命令，通过事件通道与快照观察状态

use std::sync::Arc;

use protocol::{AiEvent, Difficulty, GameSession, Player, TimerEvent};
use tictactoe_ai::{create_strategy, MoveStrategy};
use tokio::sync::{mpsc, oneshot, watch};

use crate::ai::{spawn_ai_turn, AiMessage};
use crate::clock::{ClockSignal, ClockState, RoundClock};
use crate::error::ControllerError;
use crate::event::{GameEvent, SessionSnapshot};
use crate::settings::Settings;
use crate::stats::RunningStatistics;

/// 命令队列容量
const COMMAND_BUFFER: usize = 32;

/// 同一手棋 AI 连续给出非法走法的重试次数，超过后本局按超时结束
const AI_MOVE_RETRIES: u8 = 2;

/// 设置难度的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyChange {
    /// 立即生效
    Applied,
    /// 本局进行中，下一局生效
    Deferred,
}

enum Command {
    StartRound(oneshot::Sender<()>),
    Play {
        row: usize,
        col: usize,
        reply: oneshot::Sender<Result<(), ControllerError>>,
    },
    SetDifficulty {
        difficulty: Difficulty,
        reply: oneshot::Sender<DifficultyChange>,
    },
    Pause(oneshot::Sender<()>),
    Resume(oneshot::Sender<()>),
    ForceTimeUp(oneshot::Sender<()>),
    Shutdown,
}

/// 控制器句柄，可克隆
#[derive(Clone)]
pub struct ControllerHandle {
    commands: mpsc::Sender<Command>,
    snapshot: watch::Receiver<SessionSnapshot>,
}

impl ControllerHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ControllerError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .await
            .map_err(|_| ControllerError::Closed)?;
        rx.await.map_err(|_| ControllerError::Closed)
    }

    /// 开始新一局；进行中的对局会被放弃
    pub async fn start_round(&self) -> Result<(), ControllerError> {
        self.request(Command::StartRound).await
    }

    /// 人类玩家落子
    pub async fn play(&self, row: usize, col: usize) -> Result<(), ControllerError> {
        self.request(|reply| Command::Play { row, col, reply }).await?
    }

    pub async fn set_difficulty(&self, difficulty: Difficulty) -> Result<DifficultyChange, ControllerError> {
        self.request(|reply| Command::SetDifficulty { difficulty, reply })
            .await
    }

    pub async fn pause(&self) -> Result<(), ControllerError> {
        self.request(Command::Pause).await
    }

    pub async fn resume(&self) -> Result<(), ControllerError> {
        self.request(Command::Resume).await
    }

    /// 立即判定本局超时
    pub async fn force_time_up(&self) -> Result<(), ControllerError> {
        self.request(Command::ForceTimeUp).await
    }

    /// 当前累计统计
    pub fn statistics(&self) -> RunningStatistics {
        self.snapshot.borrow().statistics.clone()
    }

    /// 最新状态快照
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// 订阅快照变化
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.clone()
    }

    /// 关闭控制器
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }
}

/// 按设置创建 AI 并启动控制器
pub fn spawn(settings: Settings) -> (ControllerHandle, mpsc::UnboundedReceiver<GameEvent>) {
    let strategy = create_strategy(settings.ai_config(settings.difficulty));
    spawn_with_strategy(settings, strategy)
}

/// 使用指定 AI 策略启动控制器，之后切换难度会替换为内置策略
pub fn spawn_with_strategy(
    settings: Settings,
    strategy: Arc<dyn MoveStrategy>,
) -> (ControllerHandle, mpsc::UnboundedReceiver<GameEvent>) {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (clock_tx, clock_rx) = mpsc::unbounded_channel();
    let (ai_tx, ai_rx) = mpsc::unbounded_channel();

    let (controller, snapshot_rx) = GameController::new(settings, strategy, event_tx, clock_tx, ai_tx);
    tokio::spawn(controller.run(command_rx, clock_rx, ai_rx));

    let handle = ControllerHandle {
        commands: command_tx,
        snapshot: snapshot_rx,
    };
    (handle, event_rx)
}

/// 正在进行的 AI 回合
struct PendingAi {
    generation: u64,
    cancel: protocol::CancelToken,
}

struct GameController {
    settings: Settings,
    session: GameSession,
    clock: RoundClock,
    difficulty: Difficulty,
    pending_difficulty: Option<Difficulty>,
    strategy: Arc<dyn MoveStrategy>,
    stats: RunningStatistics,
    /// 本局已开始且尚未记入统计
    round_live: bool,
    ai_turn: Option<PendingAi>,
    ai_generation: u64,
    /// 本手棋 AI 已被拒绝的次数
    ai_rejections: u8,
    events: mpsc::UnboundedSender<GameEvent>,
    ai_tx: mpsc::UnboundedSender<AiMessage>,
    snapshot: watch::Sender<SessionSnapshot>,
}

impl GameController {
    fn new(
        settings: Settings,
        strategy: Arc<dyn MoveStrategy>,
        events: mpsc::UnboundedSender<GameEvent>,
        clock_tx: mpsc::UnboundedSender<ClockSignal>,
        ai_tx: mpsc::UnboundedSender<AiMessage>,
    ) -> (Self, watch::Receiver<SessionSnapshot>) {
        let clock = RoundClock::new(settings.clock_config(), clock_tx);
        let difficulty = strategy.difficulty();
        let (snapshot, snapshot_rx) = watch::channel(SessionSnapshot {
            session: GameSession::new(),
            remaining_secs: clock.remaining_secs(),
            clock_state: ClockState::Idle,
            ai_pending: false,
            difficulty,
            pending_difficulty: None,
            ai_player: settings.ai_player,
            statistics: RunningStatistics::new(),
        });

        let controller = Self {
            settings,
            session: GameSession::new(),
            clock,
            difficulty,
            pending_difficulty: None,
            strategy,
            stats: RunningStatistics::new(),
            round_live: false,
            ai_turn: None,
            ai_generation: 0,
            ai_rejections: 0,
            events,
            ai_tx,
            snapshot,
        };
        (controller, snapshot_rx)
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut clock_rx: mpsc::UnboundedReceiver<ClockSignal>,
        mut ai_rx: mpsc::UnboundedReceiver<AiMessage>,
    ) {
        tracing::info!("对局控制器已启动");
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(signal) = clock_rx.recv() => {
                    self.on_clock_signal(signal);
                    self.publish();
                }
                Some(message) = ai_rx.recv() => {
                    self.on_ai_message(message);
                    self.publish();
                }
            }
        }

        self.cancel_ai();
        self.clock.stop();
        tracing::info!("对局控制器已退出");
    }

    /// 先发布快照再回复，调用方拿到回复时快照已是最新
    fn handle_command(&mut self, command: Command) {
        match command {
            Command::StartRound(reply) => {
                self.start_round();
                self.publish();
                let _ = reply.send(());
            }
            Command::Play { row, col, reply } => {
                let result = self.human_move(row, col);
                self.publish();
                let _ = reply.send(result);
            }
            Command::SetDifficulty { difficulty, reply } => {
                let change = self.set_difficulty(difficulty);
                self.publish();
                let _ = reply.send(change);
            }
            Command::Pause(reply) => {
                self.pause();
                self.publish();
                let _ = reply.send(());
            }
            Command::Resume(reply) => {
                self.resume();
                self.publish();
                let _ = reply.send(());
            }
            Command::ForceTimeUp(reply) => {
                self.time_up();
                self.publish();
                let _ = reply.send(());
            }
            Command::Shutdown => {}
        }
    }

    fn start_round(&mut self) {
        if self.round_live {
            tracing::info!("放弃未结束的对局");
        }
        self.cancel_ai();
        self.clock.stop();
        if let Some(difficulty) = self.pending_difficulty.take() {
            self.apply_difficulty(difficulty);
        }

        self.session.reset();
        self.ai_rejections = 0;
        self.round_live = true;
        self.clock.start();
        tracing::info!(
            "新一局开始，难度: {}，AI 执: {:?}",
            self.difficulty.display_name(),
            self.settings.ai_player
        );
        self.emit(GameEvent::RoundStarted {
            difficulty: self.difficulty,
            ai_player: self.settings.ai_player,
        });

        self.maybe_trigger_ai();
    }

    fn human_move(&mut self, row: usize, col: usize) -> Result<(), ControllerError> {
        if !self.clock.is_running() {
            return Err(ControllerError::ClockNotRunning);
        }
        if !self.round_live || self.session.is_finished() {
            return Err(ControllerError::RoundOver);
        }
        if self.ai_turn.is_some() {
            return Err(ControllerError::AiThinking);
        }
        let player = self.session.current_player();
        if self.is_ai(player) {
            return Err(ControllerError::NotHumanTurn);
        }

        self.session.try_apply_move(row, col)?;
        tracing::debug!("{} 落子 ({}, {})", player, row, col);
        self.emit(GameEvent::MoveApplied {
            player,
            row,
            col,
            board: *self.session.board(),
        });
        self.after_move();
        Ok(())
    }

    fn after_move(&mut self) {
        if self.session.is_finished() {
            self.finish_round();
        } else {
            self.maybe_trigger_ai();
        }
    }

    fn is_ai(&self, player: Player) -> bool {
        self.settings.ai_player == Some(player)
    }

    fn maybe_trigger_ai(&mut self) {
        let player = self.session.current_player();
        if self.session.is_finished() || !self.is_ai(player) {
            return;
        }
        if self.clock.state() == ClockState::Paused {
            tracing::debug!("已暂停，恢复后再发起 AI 回合");
            return;
        }
        if self.ai_turn.is_some() {
            tracing::warn!("上一个 AI 回合仍在进行，先取消");
            self.cancel_ai();
        }

        self.ai_generation += 1;
        let cancel = spawn_ai_turn(
            self.strategy.clone(),
            *self.session.board(),
            player,
            self.ai_generation,
            self.ai_tx.clone(),
        );
        self.ai_turn = Some(PendingAi {
            generation: self.ai_generation,
            cancel,
        });
    }

    fn cancel_ai(&mut self) {
        if let Some(pending) = self.ai_turn.take() {
            tracing::debug!("取消 AI 回合 {}", pending.generation);
            pending.cancel.cancel();
        }
    }

    fn on_ai_message(&mut self, message: AiMessage) {
        let current = self.ai_turn.as_ref().map(|pending| pending.generation);
        if current != Some(message.generation) {
            tracing::debug!("丢弃过期的 AI 消息 (回合 {})", message.generation);
            return;
        }

        match message.event {
            AiEvent::MoveCompleted { row, col } => {
                self.ai_turn = None;
                if !self.session.outcome().is_ongoing() {
                    tracing::info!("对局已结束，丢弃 AI 走法");
                    return;
                }
                let player = self.session.current_player();
                match self.session.try_apply_move(row, col) {
                    Ok(()) => {
                        self.ai_rejections = 0;
                        self.emit(GameEvent::MoveApplied {
                            player,
                            row,
                            col,
                            board: *self.session.board(),
                        });
                        self.emit(GameEvent::Ai(AiEvent::MoveCompleted { row, col }));
                        self.after_move();
                    }
                    Err(e) => {
                        tracing::error!("AI 走法被拒绝: {}", e);
                        self.emit(GameEvent::Ai(AiEvent::Error {
                            message: format!("AI 走法不合法: {}", e),
                        }));
                        self.ai_rejections += 1;
                        if self.ai_rejections > AI_MOVE_RETRIES {
                            tracing::error!("AI 连续 {} 次给出非法走法，本局按超时结束", self.ai_rejections);
                            self.time_up();
                        } else {
                            tracing::warn!("重新请求 AI 走法 ({}/{})", self.ai_rejections, AI_MOVE_RETRIES);
                            self.maybe_trigger_ai();
                        }
                    }
                }
            }
            AiEvent::Error { message } => {
                self.ai_turn = None;
                tracing::warn!("AI 错误: {}", message);
                self.emit(GameEvent::Ai(AiEvent::Error { message }));
            }
            event => self.emit(GameEvent::Ai(event)),
        }
    }

    /// 暂停冻结整局：计时停止扣减，进行中的 AI 回合被取消
    fn pause(&mut self) {
        self.clock.pause();
        if self.clock.state() == ClockState::Paused && self.ai_turn.is_some() {
            tracing::info!("暂停，取消进行中的 AI 回合");
            self.cancel_ai();
        }
    }

    /// 恢复计时，轮到 AI 时重新发起回合
    fn resume(&mut self) {
        if self.clock.state() != ClockState::Paused {
            return;
        }
        self.clock.resume();
        if self.round_live {
            self.maybe_trigger_ai();
        }
    }

    fn on_clock_signal(&mut self, signal: ClockSignal) {
        if signal.run != self.clock.run_id() || !self.round_live {
            tracing::trace!("丢弃过期的计时事件: {:?}", signal.event);
            return;
        }
        self.emit(GameEvent::Timer(signal.event));
        if signal.event == TimerEvent::Finished {
            tracing::info!("时间到");
            self.time_up();
        }
    }

    fn time_up(&mut self) {
        if !self.round_live {
            tracing::debug!("没有进行中的对局，忽略超时");
            return;
        }
        self.cancel_ai();
        self.session.force_time_up();
        self.finish_round();
    }

    fn finish_round(&mut self) {
        self.cancel_ai();
        let elapsed = self.clock.elapsed();
        self.clock.stop();
        self.round_live = false;

        let outcome = self.session.outcome();
        self.stats.record_round(outcome, elapsed);
        tracing::info!(
            "本局结束: {:?}，用时 {:?}，累计 {} 局",
            outcome,
            elapsed,
            self.stats.total_rounds()
        );
        self.emit(GameEvent::RoundFinished {
            outcome,
            elapsed,
            statistics: self.stats.clone(),
        });
    }

    fn set_difficulty(&mut self, difficulty: Difficulty) -> DifficultyChange {
        if self.round_live {
            tracing::info!("难度将在下一局切换为 {}", difficulty.display_name());
            self.pending_difficulty = Some(difficulty);
            DifficultyChange::Deferred
        } else {
            self.pending_difficulty = None;
            self.apply_difficulty(difficulty);
            DifficultyChange::Applied
        }
    }

    fn apply_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.strategy = create_strategy(self.settings.ai_config(difficulty));
        tracing::info!("AI 难度: {}", difficulty.display_name());
    }

    fn emit(&self, event: GameEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("事件接收端已关闭");
        }
    }

    fn publish(&self) {
        self.snapshot.send_replace(SessionSnapshot {
            session: self.session.clone(),
            remaining_secs: self.clock.remaining_secs(),
            clock_state: self.clock.state(),
            ai_pending: self.ai_turn.is_some(),
            difficulty: self.difficulty,
            pending_difficulty: self.pending_difficulty,
            ai_player: self.settings.ai_player,
            statistics: self.stats.clone(),
        });
    }
}
