use super::{Clock, Evaluation, ScoredAction, SearchConstraint, Searcher, evaluate};
use crate::board::{Action, Board, MoveGenOptions, Side};

/// Exhaustive minimax that copies the board for every branch.
///
/// Slower than [`super::AlphaBeta`] but has no undo to get wrong; it backs up the
/// same scores with the same tie-break.
pub struct Minimax {
    pub movegen: MoveGenOptions,
    pub node_counter: u64,

    max_depth: u32,
    clock: Clock,
}

impl Minimax {
    pub fn new() -> Self {
        Self {
            movegen: MoveGenOptions::default(),
            node_counter: 0,
            max_depth: 1,
            clock: Clock::default(),
        }
    }

    pub fn with_movegen(mut self, movegen: MoveGenOptions) -> Self {
        self.movegen = movegen;
        self
    }

    fn minimax(
        &mut self,
        board: &Board,
        depth: u32,
        side: Side,
        root_actions: &[Action],
    ) -> Option<ScoredAction> {
        let mut generated = Vec::new();
        let actions = if depth == 1 {
            root_actions
        } else {
            board.extend_actions(side, self.movegen, &mut generated);
            &generated[..]
        };

        let indent = 3 * depth as usize;
        let mut best: Option<ScoredAction> = None;

        for &action in actions {
            if best.is_some() && self.clock.expired() {
                break;
            }

            let mut child = board.clone();
            if let Err(err) = child.apply(action) {
                log::warn!("Skipping {action}: {err}");
                continue;
            }
            self.node_counter += 1;

            let eval: Evaluation = if depth >= self.max_depth {
                evaluate(&child)
            } else {
                self.minimax(&child, depth + 1, side.flip(), root_actions)
                    .map_or_else(|| evaluate(&child), |reply| reply.eval)
            };

            let scored = ScoredAction { action, eval };
            log::trace!("{:indent$}{depth}: {scored}", "");

            if best.is_some() && self.clock.has_expired() {
                break;
            }

            let improves = best.is_none_or(|best| match side {
                Side::Mine => eval > best.eval,
                Side::Theirs => eval < best.eval,
            });
            if improves {
                best = Some(scored);
            }
        }

        best
    }
}

impl Searcher for Minimax {
    fn search(
        &mut self,
        board: &mut Board,
        root_actions: &[Action],
        constraint: SearchConstraint,
    ) -> Option<ScoredAction> {
        self.node_counter = 0;
        self.max_depth = constraint.depth.max(1);
        self.clock = Clock::new(constraint.deadline);

        let best = self.minimax(board, 1, Side::Mine, root_actions);
        log::debug!(
            "Minimax depth {}: {} nodes",
            self.max_depth,
            self.node_counter
        );

        best
    }

    fn node_counter(&self) -> u64 {
        self.node_counter
    }

    fn timed_out(&self) -> bool {
        self.clock.has_expired()
    }
}

impl Default for Minimax {
    fn default() -> Self {
        Self::new()
    }
}
