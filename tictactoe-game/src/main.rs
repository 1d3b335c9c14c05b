use anyhow::{Context, Result};
use protocol::{AiEvent, Board, Difficulty, GameOutcome, Player, TimerEvent};
use tictactoe_game::{ControllerHandle, DifficultyChange, GameEvent, Settings};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "命令: <行> <列> 落子 | n 新一局 | p 暂停 | c 继续 | t 认输超时 | d <easy|medium|hard> 难度 | s 战绩 | h 帮助 | q 退出";

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("tictactoe_game={}", settings.log_level.as_filter()).parse()?)
                .add_directive(format!("tictactoe_ai={}", settings.log_level.as_filter()).parse()?),
        )
        .init();

    info!("限时井字棋启动中...");

    let (handle, mut events) = tictactoe_game::spawn(settings);
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            print_event(&event);
        }
    });

    println!("{}", HELP);
    handle.start_round().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("读取输入失败")? {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => {}
            ["q"] => break,
            ["h"] => println!("{}", HELP),
            ["n"] => handle.start_round().await?,
            ["p"] => handle.pause().await?,
            ["c"] => handle.resume().await?,
            ["t"] => handle.force_time_up().await?,
            ["s"] => print_statistics(&handle),
            ["d", tier] => match tier.parse::<Difficulty>() {
                Ok(difficulty) => match handle.set_difficulty(difficulty).await? {
                    DifficultyChange::Applied => println!("难度: {}", difficulty.display_name()),
                    DifficultyChange::Deferred => {
                        println!("难度将在下一局切换为 {}", difficulty.display_name())
                    }
                },
                Err(e) => println!("{}", e),
            },
            [row, col] => match (row.parse::<usize>(), col.parse::<usize>()) {
                (Ok(row), Ok(col)) => {
                    if let Err(e) = handle.play(row, col).await {
                        println!("无法落子: {}", e);
                    }
                }
                _ => println!("{}", HELP),
            },
            _ => println!("{}", HELP),
        }
    }

    handle.shutdown().await;
    printer.abort();
    info!("再见");
    Ok(())
}

fn print_event(event: &GameEvent) {
    match event {
        GameEvent::RoundStarted { difficulty, ai_player } => {
            match ai_player {
                Some(player) => println!("新一局开始，AI ({}) 执 {}", difficulty.display_name(), player),
                None => println!("新一局开始，双人对战"),
            }
            println!("{}", Board::empty());
        }
        GameEvent::MoveApplied { player, row, col, board } => {
            println!("{} 落子 ({}, {})", player, row, col);
            println!("{}", board);
        }
        GameEvent::Timer(TimerEvent::Warning { remaining_secs }) => {
            println!("注意: 只剩 {} 秒!", remaining_secs)
        }
        GameEvent::Timer(TimerEvent::Tick { remaining_secs }) if remaining_secs % 10 == 0 => {
            println!("剩余 {} 秒", remaining_secs)
        }
        GameEvent::Timer(_) => {}
        GameEvent::Ai(AiEvent::Progress { message }) => println!("{}", message),
        GameEvent::Ai(AiEvent::Error { message }) => println!("AI 出错: {}", message),
        GameEvent::Ai(_) => {}
        GameEvent::RoundFinished { outcome, elapsed, statistics } => {
            match outcome {
                GameOutcome::Won(player) => println!("{} 获胜!", player),
                GameOutcome::Draw => println!("和棋"),
                GameOutcome::TimedOut => println!("时间到!"),
                GameOutcome::Ongoing => {}
            }
            println!(
                "用时 {} 秒，累计 {} 局。输入 n 开始新一局",
                elapsed.as_secs(),
                statistics.total_rounds()
            );
        }
    }
}

fn print_statistics(handle: &ControllerHandle) {
    let stats = handle.statistics();
    println!(
        "A 胜 {} | B 胜 {} | 和 {} | 超时 {} | 共 {} 局 | 平均用时 {:.1} 秒",
        stats.wins(Player::A),
        stats.wins(Player::B),
        stats.draws(),
        stats.timeouts(),
        stats.total_rounds(),
        stats.average_elapsed().as_secs_f64()
    );
}
