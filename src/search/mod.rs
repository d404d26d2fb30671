use std::{fmt::Display, time::Instant};

use crate::board::{Action, Board};

pub mod alpha_beta;
pub mod eval;
pub mod minimax;

pub use alpha_beta::AlphaBeta;
pub use eval::{Evaluation, evaluate};
pub use minimax::Minimax;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConstraint {
    /// Number of plies to look ahead, at least 1.
    pub depth: u32,
    pub deadline: Option<Instant>,
}

impl SearchConstraint {
    pub fn new(depth: u32) -> Self {
        Self {
            depth,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// An action together with the score the search backed up for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredAction {
    pub action: Action,
    pub eval: Evaluation,
}

impl Display for ScoredAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} => {}", self.action, self.eval)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Algorithm {
    /// In-place apply/undo with alpha-beta cutoffs.
    #[default]
    AlphaBeta,
    /// Clone-per-branch minimax without cutoffs.
    Minimax,
}

pub trait Searcher {
    /// Pick the best of `root_actions` for `Side::Mine`.
    ///
    /// Returns `None` when no root action could be played. The board is left as it was.
    fn search(
        &mut self,
        board: &mut Board,
        root_actions: &[Action],
        constraint: SearchConstraint,
    ) -> Option<ScoredAction>;

    /// Actions applied during the last search.
    fn node_counter(&self) -> u64;

    /// Whether the last search was cut short by its deadline.
    fn timed_out(&self) -> bool;
}

/// Deadline bookkeeping shared by the searchers.
#[derive(Debug, Default)]
pub(crate) struct Clock {
    deadline: Option<Instant>,
    expired: bool,
}

impl Clock {
    pub fn new(deadline: Option<Instant>) -> Self {
        Self {
            deadline,
            expired: false,
        }
    }

    /// Sticky: once expired, stays expired for the rest of the search.
    pub fn expired(&mut self) -> bool {
        if !self.expired {
            self.expired = self.deadline.is_some_and(|deadline| Instant::now() >= deadline);
        }

        self.expired
    }

    pub fn has_expired(&self) -> bool {
        self.expired
    }
}
