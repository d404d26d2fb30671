use std::{
    fmt::{self, Write},
    ops::Range,
};

use itertools::Itertools as _;
use thiserror::Error;

pub mod action;
pub mod direction;
pub mod movegen;

pub use action::{Action, ActionKind, IllegalAction, Undo};
pub use direction::{Direction, ParseTokenError};
pub use movegen::MoveGenOptions;

/// Height of a cell that is not part of the playable board.
pub const UNPLAYABLE: i8 = -1;
/// Capped height: nothing can stand on it or be built on it.
pub const MAX_HEIGHT: i8 = 4;
/// A unit stepping onto this height scores a point for its side.
pub const SCORING_HEIGHT: i8 = 3;

/// Dimensions of one game, fixed by the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameConfig {
    pub size: usize,
    pub units_per_player: usize,
}

impl GameConfig {
    pub fn new(size: usize, units_per_player: usize) -> Self {
        Self {
            size,
            units_per_player,
        }
    }

    pub fn num_units(&self) -> usize {
        2 * self.units_per_player
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Mine,
    Theirs,
}

impl Side {
    pub const fn flip(self) -> Self {
        match self {
            Side::Mine => Side::Theirs,
            Side::Theirs => Side::Mine,
        }
    }

    pub fn units(self, config: &GameConfig) -> Range<usize> {
        match self {
            Side::Mine => 0..config.units_per_player,
            Side::Theirs => config.units_per_player..config.num_units(),
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub height: i8,
    pub unit: Option<usize>,
}

impl Cell {
    pub const UNPLAYABLE: Cell = Cell {
        height: UNPLAYABLE,
        unit: None,
    };

    pub fn is_playable(&self) -> bool {
        self.height != UNPLAYABLE
    }

    /// Climb rule shared by moves and pushes: at most one level up, never onto a cap.
    pub fn is_reachable_from(&self, height: i8) -> bool {
        self.is_playable() && self.height <= height + 1 && self.height < MAX_HEIGHT
    }

    pub fn is_movable(&self, height: i8) -> bool {
        self.is_reachable_from(height) && self.unit.is_none()
    }

    pub fn is_buildable(&self) -> bool {
        self.is_playable() && self.height < MAX_HEIGHT && self.unit.is_none()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("position ({x}, {y}) is outside the {size}x{size} board")]
    OutOfBounds { x: i64, y: i64, size: usize },
    #[error("unit {unit} does not exist in a game with {units} units")]
    UnknownUnit { unit: usize, units: usize },
    #[error("unit {unit} placed on unplayable cell {pos}")]
    UnplayableCell { unit: usize, pos: Pos },
    #[error("unit {unit} placed on cell {pos} already holding unit {other}")]
    CellTaken { unit: usize, other: usize, pos: Pos },
    #[error("expected {size} rows, got {rows}")]
    RowCount { rows: usize, size: usize },
    #[error("row {row} is {len} cells wide, expected {size}")]
    RowWidth { row: usize, len: usize, size: usize },
    #[error("invalid cell {c:?} at {pos}")]
    InvalidCell { c: char, pos: Pos },
    #[error("invalid height {height} at {pos}")]
    InvalidHeight { height: i8, pos: Pos },
}

/// Grid cells, unit positions and per-side score counters.
///
/// Every mutator keeps `units[i] == Some(p)` exactly when `cell(p).unit == Some(i)`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    config: GameConfig,
    cells: Vec<Cell>,
    units: Vec<Option<Pos>>,
    scores: [u32; 2],
}

impl Board {
    /// A board where every cell is unplayable and every unit is off-board.
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            cells: vec![Cell::UNPLAYABLE; config.size * config.size],
            units: vec![None; config.num_units()],
            scores: [0; 2],
        }
    }

    /// Build a board from height rows (`.` unplayable, digits are heights) and unit positions.
    pub fn from_rows<S: AsRef<str>>(
        config: GameConfig,
        rows: &[S],
        units: &[Option<Pos>],
    ) -> Result<Self, BoardError> {
        let size = config.size;
        if rows.len() != size {
            return Err(BoardError::RowCount {
                rows: rows.len(),
                size,
            });
        }

        let mut board = Self::new(config);

        for (y, row) in rows.iter().enumerate() {
            let len = row.as_ref().chars().count();
            if len != size {
                return Err(BoardError::RowWidth { row: y, len, size });
            }

            for (x, c) in row.as_ref().chars().enumerate() {
                let height = match c {
                    '.' => UNPLAYABLE,
                    '0'..='4' => (c as u8 - b'0') as i8,
                    _ => return Err(BoardError::InvalidCell { c, pos: Pos::new(x, y) }),
                };
                board.set_height(Pos::new(x, y), height)?;
            }
        }

        for (unit, &pos) in units.iter().enumerate() {
            board.place_unit(unit, pos)?;
        }

        Ok(board)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn size(&self) -> usize {
        self.config.size
    }

    /// Convert signed protocol coordinates, mapping the `-1 -1` sentinel to `None`.
    pub fn checked_pos(&self, x: i64, y: i64) -> Result<Option<Pos>, BoardError> {
        if x == -1 && y == -1 {
            return Ok(None);
        }

        let size = self.size();
        if x < 0 || y < 0 || x as usize >= size || y as usize >= size {
            return Err(BoardError::OutOfBounds { x, y, size });
        }

        Ok(Some(Pos::new(x as usize, y as usize)))
    }

    pub fn neighbor(&self, pos: Pos, dir: Direction) -> Option<Pos> {
        let (dx, dy) = dir.offset();
        let x = pos.x.checked_add_signed(dx as isize)?;
        let y = pos.y.checked_add_signed(dy as isize)?;
        (x < self.size() && y < self.size()).then_some(Pos::new(x, y))
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let size = self.size();
        (0..size)
            .cartesian_product(0..size)
            .map(|(y, x)| Pos::new(x, y))
    }

    fn index(&self, pos: Pos) -> usize {
        debug_assert!(pos.x < self.size() && pos.y < self.size());
        pos.x + self.size() * pos.y
    }

    pub fn cell(&self, pos: Pos) -> &Cell {
        &self.cells[self.index(pos)]
    }

    pub(crate) fn cell_mut(&mut self, pos: Pos) -> &mut Cell {
        let index = self.index(pos);
        &mut self.cells[index]
    }

    pub fn set_height(&mut self, pos: Pos, height: i8) -> Result<(), BoardError> {
        if !(UNPLAYABLE..=MAX_HEIGHT).contains(&height) {
            return Err(BoardError::InvalidHeight { height, pos });
        }

        let cell = self.cell_mut(pos);
        if height == UNPLAYABLE {
            if let Some(unit) = cell.unit {
                return Err(BoardError::UnplayableCell { unit, pos });
            }
        }

        cell.height = height;
        Ok(())
    }

    /// Move `unit` to `pos`, or take it off the board with `None`.
    pub fn place_unit(&mut self, unit: usize, pos: Option<Pos>) -> Result<(), BoardError> {
        if unit >= self.units.len() {
            return Err(BoardError::UnknownUnit {
                unit,
                units: self.units.len(),
            });
        }

        if let Some(pos) = pos {
            let cell = self.cell(pos);
            if !cell.is_playable() {
                return Err(BoardError::UnplayableCell { unit, pos });
            }
            if let Some(other) = cell.unit.filter(|&other| other != unit) {
                return Err(BoardError::CellTaken { unit, other, pos });
            }
        }

        if let Some(old) = self.units[unit] {
            self.cell_mut(old).unit = None;
        }
        if let Some(pos) = pos {
            self.cell_mut(pos).unit = Some(unit);
        }
        self.units[unit] = pos;

        Ok(())
    }

    pub fn unit(&self, unit: usize) -> Option<Pos> {
        self.units.get(unit).copied().flatten()
    }

    pub fn side_of(&self, unit: usize) -> Side {
        if unit < self.config.units_per_player {
            Side::Mine
        } else {
            Side::Theirs
        }
    }

    /// Active units of `side` with their positions, in index order.
    pub fn active_units(&self, side: Side) -> impl Iterator<Item = (usize, Pos)> + '_ {
        side.units(&self.config)
            .filter_map(|unit| self.unit(unit).map(|pos| (unit, pos)))
    }

    pub fn score(&self, side: Side) -> u32 {
        self.scores[side.index()]
    }

    pub(crate) fn add_score(&mut self, side: Side) {
        self.scores[side.index()] += 1;
    }

    pub(crate) fn remove_score(&mut self, side: Side) {
        debug_assert!(self.scores[side.index()] > 0);
        self.scores[side.index()] -= 1;
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells.iter().chunks(self.size()) {
            f.write_char('[')?;
            for cell in row {
                match cell.unit {
                    Some(unit) => write!(f, " ({:2},{:2})", cell.height, unit)?,
                    None => write!(f, " ({:2}, .)", cell.height)?,
                }
            }
            f.write_str(" ]\n")?;
        }

        write!(
            f,
            "scores: mine={} theirs={}",
            self.score(Side::Mine),
            self.score(Side::Theirs)
        )
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.cells.chunks(self.size()).map(|row| {
            row.iter()
                .map(|cell| match (cell.unit, cell.height) {
                    (Some(unit), _) => char::from(b'A' + (unit % 26) as u8),
                    (None, UNPLAYABLE) => '.',
                    (None, h) => char::from(b'0' + h as u8),
                })
                .collect::<String>()
        });

        write!(f, "{}", rows.format("\n"))
    }
}

pub mod test_utils {
    use rand::{Rng, seq::IteratorRandom as _};

    use super::{Board, GameConfig, MAX_HEIGHT, Pos, UNPLAYABLE};

    /// Random heights with roughly `holes` out of 100 cells unplayable, units on random
    /// free cells below the cap, and `eliminated` units of each side left off-board.
    pub fn random_board(
        rng: &mut impl Rng,
        config: GameConfig,
        holes: u32,
        eliminated: usize,
    ) -> Board {
        let mut board = Board::new(config);

        for pos in board.positions().collect::<Vec<_>>() {
            let height = if rng.random_range(0..100) < holes {
                UNPLAYABLE
            } else {
                rng.random_range(0..=MAX_HEIGHT)
            };
            board.cell_mut(pos).height = height;
        }

        let mut free: Vec<Pos> = board
            .positions()
            .filter(|&pos| board.cell(pos).is_buildable())
            .collect();

        for unit in 0..config.num_units() {
            if unit % config.units_per_player < eliminated {
                continue;
            }

            let Some(index) = (0..free.len()).choose(rng) else {
                break;
            };
            let pos = free.swap_remove(index);
            board
                .place_unit(unit, Some(pos))
                .expect("free cells are playable and empty");
        }

        board
    }

    /// A board of the given size where every cell is playable at height 0.
    pub fn flat_board(config: GameConfig, units: &[Option<Pos>]) -> Board {
        let rows = vec!["0".repeat(config.size); config.size];
        Board::from_rows(config, &rows, units).expect("flat board is valid")
    }
}
