//! 棋盘状态

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_SIZE, CELL_COUNT};
use crate::player::{Cell, Player, Position};

/// 所有可连成一线的组合，扫描顺序：三行、三列、主对角线、副对角线
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// 3x3 棋盘，索引为 row * 3 + col
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            cells: [Cell::Empty; CELL_COUNT],
        }
    }

    /// 获取指定位置的格子
    pub fn get(&self, pos: Position) -> Option<Cell> {
        if pos.is_valid() {
            Some(self.cells[pos.to_index()])
        } else {
            None
        }
    }

    /// 设置指定位置的格子（不检查规则）
    pub fn set(&mut self, pos: Position, cell: Cell) {
        if pos.is_valid() {
            self.cells[pos.to_index()] = cell;
        }
    }

    /// 检查位置是否为空
    pub fn is_empty_at(&self, pos: Position) -> bool {
        matches!(self.get(pos), Some(Cell::Empty))
    }

    /// 按行优先顺序列出所有空格
    pub fn empty_cells(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_empty())
            .filter_map(|(index, _)| Position::from_index(index))
            .collect()
    }

    /// 已落子数
    pub fn mark_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    /// 棋盘是否已满
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    /// 查找连成三子的玩家（按 LINES 顺序取第一条）
    pub fn winner(&self) -> Option<Player> {
        LINES.iter().find_map(|&[a, b, c]| {
            let player = self.cells[a].player()?;
            (self.cells[b] == self.cells[a] && self.cells[c] == self.cells[a]).then_some(player)
        })
    }

    /// 检查指定玩家是否已连成三子
    pub fn has_line(&self, player: Player) -> bool {
        let mark = Cell::Mark(player);
        LINES
            .iter()
            .any(|line| line.iter().all(|&index| self.cells[index] == mark))
    }

    /// 在副本上落子，原棋盘不变
    pub fn with_mark(&self, pos: Position, player: Player) -> Board {
        let mut scratch = *self;
        scratch.set(pos, Cell::Mark(player));
        scratch
    }

    /// 该玩家在此空格落子能否立即连成三子
    pub fn completes_line(&self, pos: Position, player: Player) -> bool {
        self.is_empty_at(pos) && self.with_mark(pos, player).has_line(player)
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..BOARD_SIZE {
            if row > 0 {
                writeln!(f)?;
            }
            for col in 0..BOARD_SIZE {
                let cell = self.cells[row * BOARD_SIZE + col];
                if col > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", cell.display_char())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(marks: &[(usize, Player)]) -> Board {
        let mut board = Board::empty();
        for &(index, player) in marks {
            board.set(Position::from_index(index).unwrap(), Cell::Mark(player));
        }
        board
    }

    #[test]
    fn test_empty_board() {
        let board = Board::empty();
        assert_eq!(board.mark_count(), 0);
        assert_eq!(board.empty_cells().len(), CELL_COUNT);
        assert!(!board.is_full());
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_every_line_wins() {
        for player in [Player::A, Player::B] {
            for line in LINES {
                let marks: Vec<_> = line.iter().map(|&i| (i, player)).collect();
                let board = board_with(&marks);
                assert_eq!(board.winner(), Some(player), "line {:?}", line);
                assert!(board.has_line(player));
                assert!(!board.has_line(player.next()));
            }
        }
    }

    #[test]
    fn test_mixed_line_not_winning() {
        let board = board_with(&[(0, Player::A), (1, Player::B), (2, Player::A)]);
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_with_mark_leaves_source_untouched() {
        let board = board_with(&[(0, Player::A), (1, Player::A)]);
        let pos = Position::new_unchecked(0, 2);
        assert!(board.completes_line(pos, Player::A));
        assert!(!board.completes_line(pos, Player::B));
        assert!(board.is_empty_at(pos));
        assert_eq!(board.mark_count(), 2);
    }

    #[test]
    fn test_completes_line_requires_empty_cell() {
        let board = board_with(&[(0, Player::A), (1, Player::A), (2, Player::B)]);
        assert!(!board.completes_line(Position::new_unchecked(0, 2), Player::A));
    }

    #[test]
    fn test_display() {
        let board = board_with(&[(0, Player::A), (4, Player::B)]);
        assert_eq!(board.to_string(), "X . .\n. O .\n. . .");
    }

    #[test]
    fn test_out_of_range_get() {
        let board = Board::empty();
        assert_eq!(board.get(Position::new_unchecked(3, 0)), None);
        assert!(!board.is_empty_at(Position::new_unchecked(0, 3)));
    }
}
