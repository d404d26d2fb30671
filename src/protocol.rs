//! Line-oriented turn protocol spoken with the referee.
//!
//! Handshake: `size` then `units_per_player`. Each turn: `size` rows of heights,
//! `2 * units_per_player` lines of `x y` (`-1 -1` for eliminated units), the
//! number of legal actions and then the actions themselves.

use std::{collections::VecDeque, io::BufRead, str::FromStr};

use thiserror::Error;

use crate::board::{Action, ActionKind, Board, BoardError, Direction, GameConfig};

/// Printed instead of an action when there is nothing left to play.
pub const RESIGN: &str = "ACCEPT-DEFEAT";

const MAX_RESERVED_ACTIONS: usize = 256;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("failed to read input")]
    Io(#[from] std::io::Error),
    #[error("unexpected end of input while reading {0}")]
    UnexpectedEof(&'static str),
    #[error("invalid {what}: {token:?}")]
    InvalidToken { what: &'static str, token: String },
    #[error("action references unit {unit}, but the game has {units} units")]
    UnknownUnit { unit: usize, units: usize },
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// One turn as sent by the referee.
#[derive(Debug, Clone)]
pub struct Turn {
    pub board: Board,
    pub legal_actions: Vec<Action>,
}

pub struct InputReader<R> {
    input: R,
    tokens: VecDeque<String>,
}

impl<R: BufRead> InputReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            tokens: VecDeque::new(),
        }
    }

    /// Make sure a token is buffered. Returns `false` at end of input.
    fn fill(&mut self) -> Result<bool, ProtocolError> {
        let mut line = String::new();

        while self.tokens.is_empty() {
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(false);
            }

            log::debug!("< {}", line.trim_end());
            self.tokens
                .extend(line.split_whitespace().map(str::to_owned));
        }

        Ok(true)
    }

    fn token(&mut self, what: &'static str) -> Result<String, ProtocolError> {
        if !self.fill()? {
            return Err(ProtocolError::UnexpectedEof(what));
        }

        self.tokens
            .pop_front()
            .ok_or(ProtocolError::UnexpectedEof(what))
    }

    fn parse<T: FromStr>(&mut self, what: &'static str) -> Result<T, ProtocolError> {
        let token = self.token(what)?;
        token
            .parse()
            .map_err(|_| ProtocolError::InvalidToken { what, token })
    }

    pub fn read_config(&mut self) -> Result<GameConfig, ProtocolError> {
        let size: usize = self.parse("board size")?;
        let units_per_player: usize = self.parse("units per player")?;

        if size == 0 {
            return Err(ProtocolError::InvalidToken {
                what: "board size",
                token: size.to_string(),
            });
        }
        if units_per_player == 0 {
            return Err(ProtocolError::InvalidToken {
                what: "units per player",
                token: units_per_player.to_string(),
            });
        }

        Ok(GameConfig::new(size, units_per_player))
    }

    /// Read the next turn, or `None` if the input ended cleanly between turns.
    pub fn read_turn(&mut self, config: &GameConfig) -> Result<Option<Turn>, ProtocolError> {
        if !self.fill()? {
            return Ok(None);
        }

        let mut rows = Vec::with_capacity(config.size);
        for _ in 0..config.size {
            rows.push(self.token("board row")?);
        }

        let mut board = Board::from_rows(*config, &rows, &[])?;
        for unit in 0..config.num_units() {
            let x: i64 = self.parse("unit x")?;
            let y: i64 = self.parse("unit y")?;
            let pos = board.checked_pos(x, y)?;
            board.place_unit(unit, pos)?;
        }

        let count: usize = self.parse("legal action count")?;
        // Untrusted: only reserve a bounded amount up front.
        let mut legal_actions = Vec::with_capacity(count.min(MAX_RESERVED_ACTIONS));
        for _ in 0..count {
            legal_actions.push(self.read_action(config)?);
        }

        Ok(Some(Turn {
            board,
            legal_actions,
        }))
    }

    fn read_action(&mut self, config: &GameConfig) -> Result<Action, ProtocolError> {
        let kind: ActionKind = self.parse("action type")?;
        let unit: usize = self.parse("unit index")?;
        let dir1: Direction = self.parse("direction")?;
        let dir2: Direction = self.parse("direction")?;

        if unit >= config.num_units() {
            return Err(ProtocolError::UnknownUnit {
                unit,
                units: config.num_units(),
            });
        }

        Ok(Action {
            kind,
            unit,
            dir1,
            dir2,
        })
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;
    use crate::board::{Pos, Side};

    const TURN: &str = "\
5
1
0.000
01000
00000
00000
00003
0 0
4 4
3
MOVE&BUILD 0 E S
MOVE&BUILD 0 S N
PUSH&BUILD 0 SE SE
";

    #[test]
    fn test_read_turn() {
        let mut reader = InputReader::new(Cursor::new(TURN));
        let config = reader.read_config().unwrap();
        assert_eq!(config, GameConfig::new(5, 1));

        let turn = reader.read_turn(&config).unwrap().unwrap();
        assert!(!turn.board.cell(Pos::new(1, 0)).is_playable());
        assert_eq!(turn.board.cell(Pos::new(1, 1)).height, 1);
        assert_eq!(turn.board.cell(Pos::new(4, 4)).height, 3);
        assert_eq!(turn.board.unit(0), Some(Pos::new(0, 0)));
        assert_eq!(turn.board.unit(1), Some(Pos::new(4, 4)));
        assert_eq!(turn.board.score(Side::Mine), 0);

        assert_eq!(turn.legal_actions, [
            Action::move_build(0, Direction::E, Direction::S),
            Action::move_build(0, Direction::S, Direction::N),
            Action::push_build(0, Direction::SE, Direction::SE),
        ]);

        assert!(reader.read_turn(&config).unwrap().is_none());
    }

    #[test]
    fn test_eliminated_unit() {
        let input = "2 1\n00\n00\n-1 -1\n1 1\n0\n";
        let mut reader = InputReader::new(Cursor::new(input));
        let config = reader.read_config().unwrap();
        let turn = reader.read_turn(&config).unwrap().unwrap();

        assert_eq!(turn.board.unit(0), None);
        assert_eq!(turn.board.unit(1), Some(Pos::new(1, 1)));
        assert!(turn.legal_actions.is_empty());
    }

    #[test]
    fn test_truncated_turn() {
        let input = "3\n1\n000\n000\n000\n0 0\n";
        let mut reader = InputReader::new(Cursor::new(input));
        let config = reader.read_config().unwrap();

        let err = reader.read_turn(&config).unwrap_err();
        assert!(matches!(err, ProtocolError::UnexpectedEof("unit x")));
    }

    #[test]
    fn test_malformed_input() {
        let cases = [
            ("3\n1\n00\n000\n000\n", "row 0 is 2 cells wide"),
            ("3\n1\n005\n000\n000\n", "invalid cell"),
            ("3\n1\n000\n000\n000\n5 0\n", "outside the 3x3 board"),
            ("3\n1\n.00\n000\n000\n0 0\n", "unplayable cell"),
            ("3\n1\n000\n000\n000\n0 0\n1 1\nx\n", "invalid legal action count"),
            (
                "3\n1\n000\n000\n000\n0 0\n1 1\n1\nJUMP 0 N S\n",
                "invalid action type",
            ),
            (
                "3\n1\n000\n000\n000\n0 0\n1 1\n1\nMOVE&BUILD 0 UP S\n",
                "invalid direction",
            ),
            (
                "3\n1\n000\n000\n000\n0 0\n1 1\n1\nMOVE&BUILD 2 N S\n",
                "unit 2",
            ),
            (
                "3\n1\n000\n000\n000\n0 0\n1 1\n18446744073709551615\n",
                "end of input while reading action type",
            ),
            (
                "3\n1\n000\n000\n000\n0 0\n1 1\n4000000000\nMOVE&BUILD 0 E W\n",
                "end of input while reading action type",
            ),
        ];

        for (input, message) in cases {
            let mut reader = InputReader::new(Cursor::new(input));
            let config = reader.read_config().unwrap();
            let err = reader.read_turn(&config).unwrap_err();
            assert!(
                err.to_string().contains(message),
                "{input:?}: {err} does not mention {message:?}"
            );
        }
    }

    #[test]
    fn test_invalid_config() {
        for input in ["0 1\n", "5 0\n", "five 1\n", ""] {
            let mut reader = InputReader::new(Cursor::new(input));
            assert!(reader.read_config().is_err(), "{input:?}");
        }
    }
}
