use std::{
    fmt::Display,
    ops::{Add, AddAssign},
};

use crate::board::{Board, Direction, Pos, Side};

/// Score of a position from the point of view of `Side::Mine`; larger is better.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Evaluation(pub i32);

impl Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Evaluation {
    pub const MIN: Self = Evaluation(i32::MIN);
    pub const MAX: Self = Evaluation(i32::MAX);
}

impl Add<i32> for Evaluation {
    type Output = Self;

    fn add(self, rhs: i32) -> Self::Output {
        Self(self.0.saturating_add(rhs))
    }
}

impl AddAssign<i32> for Evaluation {
    fn add_assign(&mut self, rhs: i32) {
        *self = *self + rhs;
    }
}

/// Per point of score difference; dominates everything else.
pub const SCORE_WEIGHT: i32 = 1000;
/// Flat bonus for a unit that can still move.
pub const MOBILE_UNIT_BONUS: i32 = 10000;
/// Per level of the cell a mobile unit stands on.
pub const STANDING_HEIGHT_WEIGHT: i32 = 100;
/// Per movable neighbor, multiplied by `height² + 1`.
pub const NEIGHBOR_WEIGHT: i32 = 10;

pub fn evaluate(board: &Board) -> Evaluation {
    let score_diff = board.score(Side::Mine) as i32 - board.score(Side::Theirs) as i32;
    let mut eval = Evaluation(SCORE_WEIGHT * score_diff);

    for (_, pos) in board.active_units(Side::Mine) {
        eval += unit_mobility(board, pos);
    }

    eval
}

/// Stuck units contribute nothing, whatever they stand on.
fn unit_mobility(board: &Board, pos: Pos) -> i32 {
    let height = board.cell(pos).height;

    let mut movable = 0;
    let mut score = 0;
    for next in Direction::ALL
        .into_iter()
        .filter_map(|dir| board.neighbor(pos, dir))
    {
        let cell = board.cell(next);
        if cell.is_movable(height) {
            movable += 1;
            let h = cell.height as i32;
            score += NEIGHBOR_WEIGHT * (h * h + 1);
        }
    }

    if movable == 0 {
        return 0;
    }

    score + MOBILE_UNIT_BONUS + STANDING_HEIGHT_WEIGHT * height as i32
}
