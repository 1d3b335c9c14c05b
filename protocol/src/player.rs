//! 玩家、格子与坐标定义

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_SIZE, CELL_COUNT};

/// 玩家
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// 先手方
    A,
    /// 后手方
    B,
}

impl Player {
    /// 轮到下一位玩家
    pub fn next(self) -> Player {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }

    /// 获取玩家在棋盘上的标记
    pub fn mark(self) -> char {
        match self {
            Player::A => 'X',
            Player::B => 'O',
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Player::A => write!(f, "A({})", self.mark()),
            Player::B => write!(f, "B({})", self.mark()),
        }
    }
}

/// 格子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// 空格
    #[default]
    Empty,
    /// 已被某位玩家落子
    Mark(Player),
}

impl Cell {
    /// 是否为空
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// 获取落子玩家
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Mark(player) => Some(player),
        }
    }

    /// 显示字符，空格用 '.'
    pub fn display_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Mark(player) => player.mark(),
        }
    }
}

/// 棋盘坐标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// 行 (0-2)
    pub row: usize,
    /// 列 (0-2)
    pub col: usize,
}

impl Position {
    /// 创建新坐标，越界返回 None
    pub fn new(row: usize, col: usize) -> Option<Self> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// 创建新坐标（不检查边界，内部使用）
    pub const fn new_unchecked(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// 检查坐标是否在棋盘内
    pub fn is_valid(&self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }

    /// 是否为中心格
    pub fn is_center(&self) -> bool {
        self.row == BOARD_SIZE / 2 && self.col == BOARD_SIZE / 2
    }

    /// 是否为角格
    pub fn is_corner(&self) -> bool {
        let edge = |v: usize| v == 0 || v == BOARD_SIZE - 1;
        edge(self.row) && edge(self.col)
    }

    /// 转换为数组索引（行优先）
    pub fn to_index(&self) -> usize {
        self.row * BOARD_SIZE + self.col
    }

    /// 从数组索引转换
    pub fn from_index(index: usize) -> Option<Self> {
        if index < CELL_COUNT {
            Some(Position {
                row: index / BOARD_SIZE,
                col: index % BOARD_SIZE,
            })
        } else {
            None
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
