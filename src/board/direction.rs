use std::{fmt, str::FromStr};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid {what} token: {token:?}")]
pub struct ParseTokenError {
    pub what: &'static str,
    pub token: String,
}

/// One of the eight compass directions, in clockwise order starting north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 8]
    }

    /// `(dx, dy)` with `y` growing southwards.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::N => (0, -1),
            Direction::NE => (1, -1),
            Direction::E => (1, 0),
            Direction::SE => (1, 1),
            Direction::S => (0, 1),
            Direction::SW => (-1, 1),
            Direction::W => (-1, 0),
            Direction::NW => (-1, -1),
        }
    }

    /// Rotate by `steps` eighths of a turn, clockwise for positive values.
    pub const fn rotate(self, steps: i32) -> Self {
        Self::from_index((self as i32 + steps).rem_euclid(8) as usize)
    }

    /// The three directions a unit pushed along `self` may be sent in.
    pub const fn push_fan(self) -> [Direction; 3] {
        [self.rotate(-1), self, self.rotate(1)]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::N => "N",
            Direction::NE => "NE",
            Direction::E => "E",
            Direction::SE => "SE",
            Direction::S => "S",
            Direction::SW => "SW",
            Direction::W => "W",
            Direction::NW => "NW",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|dir| dir.as_str() == s)
            .ok_or_else(|| ParseTokenError {
                what: "direction",
                token: s.to_owned(),
            })
    }
}
