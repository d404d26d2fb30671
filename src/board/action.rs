use std::{fmt, str::FromStr};

use thiserror::Error;

use super::{Board, Direction, MAX_HEIGHT, ParseTokenError, Pos, SCORING_HEIGHT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Step along `dir1`, then build along `dir2` from the new cell.
    MoveBuild,
    /// Push the unit found along `dir1` one cell further along `dir2`, building where it stood.
    PushBuild,
}

impl ActionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ActionKind::MoveBuild => "MOVE&BUILD",
            ActionKind::PushBuild => "PUSH&BUILD",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MOVE&BUILD" => Ok(ActionKind::MoveBuild),
            "PUSH&BUILD" => Ok(ActionKind::PushBuild),
            _ => Err(ParseTokenError {
                what: "action type",
                token: s.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Action {
    pub kind: ActionKind,
    pub unit: usize,
    pub dir1: Direction,
    pub dir2: Direction,
}

impl Action {
    pub const fn move_build(unit: usize, dir1: Direction, dir2: Direction) -> Self {
        Self {
            kind: ActionKind::MoveBuild,
            unit,
            dir1,
            dir2,
        }
    }

    pub const fn push_build(unit: usize, dir1: Direction, dir2: Direction) -> Self {
        Self {
            kind: ActionKind::PushBuild,
            unit,
            dir1,
            dir2,
        }
    }
}

/// Protocol form: `<TYPE> <unit> <dir1> <dir2>`.
impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.kind, self.unit, self.dir1, self.dir2)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IllegalAction {
    #[error("unit {0} is not on the board")]
    InactiveUnit(usize),
    #[error("{action}: target leaves the board")]
    OffBoard { action: Action },
    #[error("{action}: cell {pos} is not playable")]
    Unplayable { action: Action, pos: Pos },
    #[error("{action}: cell {pos} is occupied")]
    Occupied { action: Action, pos: Pos },
    #[error("{action}: cell {pos} is capped")]
    Capped { action: Action, pos: Pos },
    #[error("{action}: no unit to push at {pos}")]
    NothingToPush { action: Action, pos: Pos },
    #[error("{action}: push direction {} is not adjacent to {}", .action.dir2, .action.dir1)]
    PushDirection { action: Action },
}

/// Everything needed to reverse one [`Board::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Undo {
    MoveBuild {
        unit: usize,
        from: Pos,
        to: Pos,
        build: Pos,
        scored: bool,
    },
    PushBuild {
        pushed: usize,
        from: Pos,
        to: Pos,
    },
}

impl Board {
    fn step(&self, action: Action, pos: Pos, dir: Direction) -> Result<Pos, IllegalAction> {
        let next = self
            .neighbor(pos, dir)
            .ok_or(IllegalAction::OffBoard { action })?;

        if !self.cell(next).is_playable() {
            return Err(IllegalAction::Unplayable { action, pos: next });
        }

        Ok(next)
    }

    /// Apply `action` in place.
    ///
    /// Positions, occupancy and caps are checked before anything is mutated, so an
    /// `Err` leaves the board untouched. Climb limits are not rechecked: move
    /// generation enforces them, and root actions come from the referee.
    pub fn apply(&mut self, action: Action) -> Result<Undo, IllegalAction> {
        let from = self
            .unit(action.unit)
            .ok_or(IllegalAction::InactiveUnit(action.unit))?;

        match action.kind {
            ActionKind::MoveBuild => {
                let to = self.step(action, from, action.dir1)?;
                if self.cell(to).unit.is_some() {
                    return Err(IllegalAction::Occupied { action, pos: to });
                }

                let build = self.step(action, to, action.dir2)?;
                let target = self.cell(build);
                if target.unit.is_some() && build != from {
                    return Err(IllegalAction::Occupied { action, pos: build });
                }
                if target.height >= MAX_HEIGHT {
                    return Err(IllegalAction::Capped { action, pos: build });
                }

                self.cell_mut(from).unit = None;
                self.cell_mut(to).unit = Some(action.unit);
                self.units[action.unit] = Some(to);

                let scored = self.cell(to).height == SCORING_HEIGHT;
                if scored {
                    self.add_score(self.side_of(action.unit));
                }

                self.cell_mut(build).height += 1;

                Ok(Undo::MoveBuild {
                    unit: action.unit,
                    from,
                    to,
                    build,
                    scored,
                })
            }

            ActionKind::PushBuild => {
                if !action.dir1.push_fan().contains(&action.dir2) {
                    return Err(IllegalAction::PushDirection { action });
                }

                let victim_pos = self.step(action, from, action.dir1)?;
                let pushed = self
                    .cell(victim_pos)
                    .unit
                    .ok_or(IllegalAction::NothingToPush {
                        action,
                        pos: victim_pos,
                    })?;
                if self.cell(victim_pos).height >= MAX_HEIGHT {
                    return Err(IllegalAction::Capped {
                        action,
                        pos: victim_pos,
                    });
                }

                let to = self.step(action, victim_pos, action.dir2)?;
                if self.cell(to).unit.is_some() {
                    return Err(IllegalAction::Occupied { action, pos: to });
                }

                let cell = self.cell_mut(victim_pos);
                cell.unit = None;
                cell.height += 1;

                self.cell_mut(to).unit = Some(pushed);
                self.units[pushed] = Some(to);

                Ok(Undo::PushBuild {
                    pushed,
                    from: victim_pos,
                    to,
                })
            }
        }
    }

    /// Exact inverse of the [`Board::apply`] call that produced `undo`.
    ///
    /// Must be called on the board state `apply` left behind: undoing out of order
    /// corrupts the board.
    pub fn undo(&mut self, undo: Undo) {
        match undo {
            Undo::MoveBuild {
                unit,
                from,
                to,
                build,
                scored,
            } => {
                self.cell_mut(build).height -= 1;

                if scored {
                    self.remove_score(self.side_of(unit));
                }

                debug_assert_eq!(self.cell(to).unit, Some(unit));
                self.cell_mut(to).unit = None;
                self.cell_mut(from).unit = Some(unit);
                self.units[unit] = Some(from);
            }

            Undo::PushBuild { pushed, from, to } => {
                debug_assert_eq!(self.cell(to).unit, Some(pushed));
                self.cell_mut(to).unit = None;

                let cell = self.cell_mut(from);
                cell.height -= 1;
                cell.unit = Some(pushed);
                self.units[pushed] = Some(from);
            }
        }
    }
}
