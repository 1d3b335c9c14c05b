//! 协议常量定义

use std::time::Duration;

/// 棋盘边长（行数 = 列数）
pub const BOARD_SIZE: usize = 3;

/// 格子总数
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// 每局时长（秒）
pub const ROUND_DURATION_SECS: u32 = 60;

/// 剩余时间警告阈值（秒）
pub const WARNING_THRESHOLD_SECS: u32 = 10;

/// 极小化极大搜索的最大深度（整盘最多 9 步）
pub const MAX_SEARCH_DEPTH: u8 = 9;

/// 计时器节拍间隔（毫秒）
pub const TICK_INTERVAL_MS: u64 = 1000;

/// 简单难度思考时间范围（毫秒）
pub const EASY_THINK_MS: (u64, u64) = (500, 1500);

/// 中等难度思考时间范围（毫秒）
pub const MEDIUM_THINK_MS: (u64, u64) = (300, 800);

/// 困难难度两条进度消息之间的间隔（毫秒）
pub const HARD_PROGRESS_GAP_MS: u64 = 400;

/// 计时器节拍间隔 Duration
pub const TICK_INTERVAL: Duration = Duration::from_millis(TICK_INTERVAL_MS);

/// 每局时长 Duration
pub const ROUND_DURATION: Duration = Duration::from_secs(ROUND_DURATION_SECS as u64);
