//! 回合计时器
//!
//! 独立的后台节拍任务按秒倒计时，剩余时间、暂停标志与状态均为原子量，
//! 任何线程都可以读取

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use protocol::{CancelToken, TimerEvent, ROUND_DURATION_SECS, TICK_INTERVAL, WARNING_THRESHOLD_SECS};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

/// 计时器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    /// 未启动或已停止
    Idle,
    /// 计时中
    Running,
    /// 暂停
    Paused,
    /// 时间耗尽
    Finished,
}

impl ClockState {
    fn to_u8(self) -> u8 {
        match self {
            ClockState::Idle => 0,
            ClockState::Running => 1,
            ClockState::Paused => 2,
            ClockState::Finished => 3,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => ClockState::Running,
            2 => ClockState::Paused,
            3 => ClockState::Finished,
            _ => ClockState::Idle,
        }
    }
}

/// 带运行编号的计时器事件，编号用于丢弃已停止运行的残留事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockSignal {
    pub run: u64,
    pub event: TimerEvent,
}

/// 计时参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockConfig {
    pub duration_secs: u32,
    pub warning_secs: u32,
    pub tick: Duration,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            duration_secs: ROUND_DURATION_SECS,
            warning_secs: WARNING_THRESHOLD_SECS,
            tick: TICK_INTERVAL,
        }
    }
}

#[derive(Debug)]
struct Shared {
    remaining: AtomicU32,
    paused: AtomicBool,
    state: AtomicU8,
    warned: AtomicBool,
}

impl Shared {
    fn new(remaining: u32, state: ClockState) -> Self {
        Self {
            remaining: AtomicU32::new(remaining),
            paused: AtomicBool::new(false),
            state: AtomicU8::new(state.to_u8()),
            warned: AtomicBool::new(false),
        }
    }

    fn state(&self) -> ClockState {
        ClockState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: ClockState) {
        self.state.store(state.to_u8(), Ordering::Release);
    }
}

/// 回合计时器
///
/// 每次启动都换一份新的共享状态，已取消的旧节拍任务无法再影响新一轮
pub struct RoundClock {
    config: ClockConfig,
    shared: Arc<Shared>,
    events: mpsc::UnboundedSender<ClockSignal>,
    run: u64,
    cancel: Option<CancelToken>,
}

impl RoundClock {
    /// 创建计时器，事件发往 `events`
    pub fn new(config: ClockConfig, events: mpsc::UnboundedSender<ClockSignal>) -> Self {
        Self {
            config,
            shared: Arc::new(Shared::new(config.duration_secs, ClockState::Idle)),
            events,
            run: 0,
            cancel: None,
        }
    }

    /// 开始计时；已在计时中则忽略
    pub fn start(&mut self) {
        if matches!(self.state(), ClockState::Running | ClockState::Paused) {
            return;
        }
        self.cancel_task();

        self.run += 1;
        let run = self.run;
        self.shared = Arc::new(Shared::new(self.config.duration_secs, ClockState::Running));

        let _ = self.events.send(ClockSignal {
            run,
            event: TimerEvent::Started {
                remaining_secs: self.config.duration_secs,
            },
        });

        let cancel = CancelToken::new();
        tokio::spawn(tick_loop(
            run,
            self.config,
            self.shared.clone(),
            self.events.clone(),
            cancel.clone(),
        ));
        self.cancel = Some(cancel);
        tracing::debug!("计时器启动 (run {}): {} 秒", run, self.config.duration_secs);
    }

    /// 暂停：节拍继续，但不再扣减
    pub fn pause(&mut self) {
        if self.state() == ClockState::Running {
            self.shared.paused.store(true, Ordering::Release);
            self.shared.set_state(ClockState::Paused);
        }
    }

    /// 恢复计时
    pub fn resume(&mut self) {
        if self.state() == ClockState::Paused {
            self.shared.paused.store(false, Ordering::Release);
            self.shared.set_state(ClockState::Running);
        }
    }

    /// 停止计时，可重复调用
    pub fn stop(&mut self) {
        self.cancel_task();
        if self.state() != ClockState::Idle {
            tracing::debug!("计时器停止，剩余 {} 秒", self.remaining_secs());
        }
        self.shared.paused.store(false, Ordering::Release);
        self.shared.set_state(ClockState::Idle);
    }

    fn cancel_task(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
    }

    pub fn state(&self) -> ClockState {
        self.shared.state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == ClockState::Running
    }

    pub fn remaining_secs(&self) -> u32 {
        self.shared.remaining.load(Ordering::Acquire)
    }

    /// 已用时间 = 总时长 - 剩余时间
    pub fn elapsed(&self) -> Duration {
        Duration::from_secs(u64::from(self.config.duration_secs.saturating_sub(self.remaining_secs())))
    }

    /// 当前运行编号
    pub fn run_id(&self) -> u64 {
        self.run
    }
}

impl Drop for RoundClock {
    fn drop(&mut self) {
        self.cancel_task();
    }
}

/// 节拍循环：每个周期检查取消，暂停时跳过扣减
async fn tick_loop(
    run: u64,
    config: ClockConfig,
    shared: Arc<Shared>,
    events: mpsc::UnboundedSender<ClockSignal>,
    cancel: CancelToken,
) {
    let mut interval = tokio::time::interval_at(Instant::now() + config.tick, config.tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let emit = |event: TimerEvent| {
        let _ = events.send(ClockSignal { run, event });
    };

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::trace!("计时循环退出 (run {})", run);
                return;
            }
            _ = interval.tick() => {}
        }

        if shared.paused.load(Ordering::Acquire) {
            continue;
        }

        // 只有本任务写入剩余时间
        let remaining = shared.remaining.load(Ordering::Acquire).saturating_sub(1);
        shared.remaining.store(remaining, Ordering::Release);
        emit(TimerEvent::Tick {
            remaining_secs: remaining,
        });

        if remaining <= config.warning_secs && !shared.warned.swap(true, Ordering::AcqRel) {
            emit(TimerEvent::Warning {
                remaining_secs: remaining,
            });
        }

        if remaining == 0 {
            shared.set_state(ClockState::Finished);
            emit(TimerEvent::Finished);
            tracing::info!("回合时间耗尽 (run {})", run);
            return;
        }
    }
}
