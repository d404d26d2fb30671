use super::{Clock, Evaluation, ScoredAction, SearchConstraint, Searcher, evaluate};
use crate::board::{Action, Board, MoveGenOptions, Side};

/// Depth-limited alpha-beta over a single board mutated in place.
///
/// `Side::Mine` maximizes, `Side::Theirs` minimizes, and both keep the first
/// action seen on ties.
pub struct AlphaBeta {
    /// Disable to get a plain minimax over the same tree.
    pub pruning: bool,
    pub movegen: MoveGenOptions,

    /// Actions applied during the last search.
    pub node_counter: u64,
    /// Cutoffs taken during the last search.
    pub cutoff_counter: u64,

    max_depth: u32,
    clock: Clock,
    buffers: Vec<Vec<Action>>,
}

impl AlphaBeta {
    pub fn new() -> Self {
        Self {
            pruning: true,
            movegen: MoveGenOptions::default(),
            node_counter: 0,
            cutoff_counter: 0,
            max_depth: 1,
            clock: Clock::default(),
            buffers: vec![],
        }
    }

    pub fn with_movegen(mut self, movegen: MoveGenOptions) -> Self {
        self.movegen = movegen;
        self
    }

    pub fn without_pruning(mut self) -> Self {
        self.pruning = false;
        self
    }

    /// Generated actions for `depth`, reusing the buffer of a previous search.
    fn take_buffer(&mut self, depth: u32) -> Vec<Action> {
        let index = depth as usize;
        if self.buffers.len() <= index {
            self.buffers.resize_with(index + 1, Vec::new);
        }

        let mut buffer = std::mem::take(&mut self.buffers[index]);
        buffer.clear();
        buffer
    }

    fn alpha_beta(
        &mut self,
        board: &mut Board,
        depth: u32,
        side: Side,
        mut alpha: Evaluation,
        mut beta: Evaluation,
        root_actions: &[Action],
    ) -> Option<ScoredAction> {
        let mut generated = self.take_buffer(depth);
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

            let undo = match board.apply(action) {
                Ok(undo) => undo,
                Err(err) => {
                    log::warn!("Skipping {action}: {err}");
                    continue;
                }
            };
            self.node_counter += 1;

            let eval = if depth >= self.max_depth {
                evaluate(board)
            } else {
                match self.alpha_beta(board, depth + 1, side.flip(), alpha, beta, root_actions) {
                    Some(reply) => reply.eval,
                    // No continuation for the other side: judge the position as it stands.
                    None => evaluate(board),
                }
            };

            board.undo(undo);
            let scored = ScoredAction { action, eval };
            log::trace!("{:indent$}{depth}: {scored}", "");

            // A subtree cut short by the deadline is only trusted when nothing else is known.
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

            let best_eval = best.map_or(eval, |best| best.eval);
            if self.pruning {
                let cutoff = match side {
                    Side::Mine => beta < best_eval,
                    Side::Theirs => best_eval < alpha,
                };

                if cutoff {
                    self.cutoff_counter += 1;
                    log::debug!("{:indent$}{depth}: cut at {action}, alpha={alpha} beta={beta}", "");
                    break;
                }

                match side {
                    Side::Mine => alpha = alpha.max(best_eval),
                    Side::Theirs => beta = beta.min(best_eval),
                }
            }
        }

        self.buffers[depth as usize] = generated;
        best
    }
}

impl Searcher for AlphaBeta {
    fn search(
        &mut self,
        board: &mut Board,
        root_actions: &[Action],
        constraint: SearchConstraint,
    ) -> Option<ScoredAction> {
        self.node_counter = 0;
        self.cutoff_counter = 0;
        self.max_depth = constraint.depth.max(1);
        self.clock = Clock::new(constraint.deadline);

        let best = self.alpha_beta(
            board,
            1,
            Side::Mine,
            Evaluation::MIN,
            Evaluation::MAX,
            root_actions,
        );

        log::debug!(
            "Alpha-beta depth {}: {} nodes, {} cutoffs{}",
            self.max_depth,
            self.node_counter,
            self.cutoff_counter,
            if self.clock.has_expired() { ", timed out" } else { "" }
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

impl Default for AlphaBeta {
    fn default() -> Self {
        Self::new()
    }
}
