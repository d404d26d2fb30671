use super::{Action, Board, Direction, Pos, Side};

/// Knobs for [`Board::extend_actions`]. None of them changes what counts as legal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveGenOptions {
    /// Skip moves onto a cell from which the unit could not step anywhere afterwards.
    pub prune_dead_ends: bool,
}

impl Board {
    /// Every legal action of `side`, in generation order.
    pub fn possible_actions(&self, side: Side) -> Vec<Action> {
        let mut actions = Vec::new();
        self.extend_actions(side, MoveGenOptions::default(), &mut actions);
        actions
    }

    /// Append the actions of `side` to `out`: units by index, then `dir1`, then `dir2`.
    pub fn extend_actions(&self, side: Side, options: MoveGenOptions, out: &mut Vec<Action>) {
        for (unit, from) in self.active_units(side) {
            let height = self.cell(from).height;

            for dir1 in Direction::ALL {
                let Some(next) = self.neighbor(from, dir1) else {
                    continue;
                };
                let cell = self.cell(next);

                if cell.is_movable(height) {
                    if options.prune_dead_ends && self.is_dead_end(next, from) {
                        continue;
                    }

                    out.extend(
                        Direction::ALL
                            .into_iter()
                            .filter(|&dir2| self.can_build_after_move(next, dir2, from))
                            .map(|dir2| Action::move_build(unit, dir1, dir2)),
                    );
                } else if cell.is_reachable_from(height) && cell.unit.is_some() {
                    out.extend(
                        dir1.push_fan()
                            .into_iter()
                            .filter(|&dir2| {
                                self.neighbor(next, dir2)
                                    .is_some_and(|to| self.cell(to).is_movable(cell.height))
                            })
                            .map(|dir2| Action::push_build(unit, dir1, dir2)),
                    );
                }
            }
        }
    }

    /// Build target check for a unit that left `from` and now stands on `at`.
    fn can_build_after_move(&self, at: Pos, dir: Direction, from: Pos) -> bool {
        let Some(target) = self.neighbor(at, dir) else {
            return false;
        };

        let cell = self.cell(target);
        if target == from {
            cell.is_playable() && cell.height < super::MAX_HEIGHT
        } else {
            cell.is_buildable()
        }
    }

    /// A unit on `at` would have nowhere to go next, counting `vacated` as free.
    fn is_dead_end(&self, at: Pos, vacated: Pos) -> bool {
        let height = self.cell(at).height;

        !Direction::ALL
            .into_iter()
            .filter_map(|dir| self.neighbor(at, dir))
            .any(|next| {
                let cell = self.cell(next);
                if next == vacated {
                    cell.is_reachable_from(height)
                } else {
                    cell.is_movable(height)
                }
            })
    }
}

#[cfg(test)]
mod test {
    use itertools::Itertools as _;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::board::{ActionKind, GameConfig, MAX_HEIGHT, test_utils};
    use Direction::*;

    #[test]
    fn test_corner_count() {
        let units = [Some(Pos::new(0, 0)), Some(Pos::new(4, 4))];
        let board = test_utils::flat_board(GameConfig::new(5, 1), &units);

        let actions = board.possible_actions(Side::Mine);

        // E and S reach 5 build targets each (vacated origin included), SE reaches all 8.
        assert_eq!(actions.len(), 18);
        assert!(actions.iter().all(|a| a.kind == ActionKind::MoveBuild));
        assert_eq!(actions.iter().filter(|a| a.dir1 == SE).count(), 8);
        assert_eq!(actions[0], Action::move_build(0, E, E));
    }

    #[test]
    fn test_generation_order() {
        let units = [
            Some(Pos::new(2, 2)),
            Some(Pos::new(0, 0)),
            Some(Pos::new(4, 4)),
            None,
        ];
        let board = test_utils::flat_board(GameConfig::new(5, 2), &units);
        let actions = board.possible_actions(Side::Mine);

        let keys = actions
            .iter()
            .map(|a| (a.unit, a.dir1, a.dir2))
            .collect_vec();
        let mut sorted = keys.clone();
        sorted.sort();

        assert_eq!(keys, sorted);
        assert!(actions.iter().any(|a| a.unit == 1));
    }

    #[test]
    fn test_push_fan() {
        let units = [Some(Pos::new(1, 1)), Some(Pos::new(2, 1))];
        let board = test_utils::flat_board(GameConfig::new(5, 1), &units);

        let pushes = board
            .possible_actions(Side::Mine)
            .into_iter()
            .filter(|a| a.kind == ActionKind::PushBuild)
            .collect_vec();

        assert_eq!(pushes, [
            Action::push_build(0, E, NE),
            Action::push_build(0, E, E),
            Action::push_build(0, E, SE),
        ]);
    }

    #[test]
    fn test_push_own_unit() {
        let units = [Some(Pos::new(1, 1)), Some(Pos::new(2, 1)), None, None];
        let board = test_utils::flat_board(GameConfig::new(5, 2), &units);

        let pushes = board
            .possible_actions(Side::Mine)
            .into_iter()
            .filter(|a| a.kind == ActionKind::PushBuild)
            .collect_vec();

        assert_eq!(pushes, [
            Action::push_build(0, E, NE),
            Action::push_build(0, E, E),
            Action::push_build(0, E, SE),
            Action::push_build(1, W, SW),
            Action::push_build(1, W, W),
            Action::push_build(1, W, NW),
        ]);
        assert!(board.possible_actions(Side::Theirs).is_empty());
    }

    #[test]
    fn test_push_respects_heights() {
        let rows = ["00000", "00120", "00000", "00000", "00000"];
        let config = GameConfig::new(5, 1);
        let count_pushes = |board: &Board| {
            board
                .possible_actions(Side::Mine)
                .into_iter()
                .filter(|a| a.kind == ActionKind::PushBuild)
                .count()
        };

        // The victim stands on height 1, so the height 2 cell behind it is still reachable.
        let units = [Some(Pos::new(1, 1)), Some(Pos::new(2, 1))];
        let board = Board::from_rows(config, &rows, &units).unwrap();
        assert_eq!(count_pushes(&board), 3);

        // A pusher on height 0 cannot reach a victim standing on height 2.
        let units = [Some(Pos::new(2, 2)), Some(Pos::new(3, 1))];
        let board = Board::from_rows(config, &rows, &units).unwrap();
        assert_eq!(count_pushes(&board), 0);
    }

    #[test]
    fn test_stuck_unit_has_no_actions() {
        let rows = ["040", "444", "000"];
        let units = [Some(Pos::new(0, 0)), None];
        let board = Board::from_rows(GameConfig::new(3, 1), &rows, &units).unwrap();

        assert!(board.possible_actions(Side::Mine).is_empty());
        assert!(board.possible_actions(Side::Theirs).is_empty());
    }

    #[test]
    fn test_soundness() {
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..300 {
            let board = test_utils::random_board(&mut rng, GameConfig::new(6, 2), 15, 0);

            for side in [Side::Mine, Side::Theirs] {
                for action in board.possible_actions(side) {
                    assert_eq!(board.side_of(action.unit), side);

                    let from = board.unit(action.unit).unwrap();
                    let height = board.cell(from).height;
                    let next = board.neighbor(from, action.dir1).unwrap();
                    let cell = board.cell(next);

                    assert!(cell.is_playable());
                    assert!(cell.height <= height + 1 && cell.height < MAX_HEIGHT);

                    let target = board.neighbor(next, action.dir2).unwrap();
                    let target_cell = board.cell(target);
                    assert!(target_cell.is_playable());
                    assert!(target_cell.height < MAX_HEIGHT);

                    match action.kind {
                        ActionKind::MoveBuild => {
                            assert_eq!(cell.unit, None);
                            assert!(target_cell.unit.is_none() || target == from);
                        }
                        ActionKind::PushBuild => {
                            assert!(cell.unit.is_some());
                            assert!(action.dir1.push_fan().contains(&action.dir2));
                            assert_eq!(target_cell.unit, None);
                            assert!(target_cell.height <= cell.height + 1);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_dead_end_pruning_only_narrows() {
        let mut rng = StdRng::seed_from_u64(5);
        let options = MoveGenOptions {
            prune_dead_ends: true,
        };

        for _ in 0..200 {
            let board = test_utils::random_board(&mut rng, GameConfig::new(5, 1), 20, 0);

            let all = board.possible_actions(Side::Mine);
            let mut pruned = Vec::new();
            board.extend_actions(Side::Mine, options, &mut pruned);

            assert!(pruned.iter().all(|a| all.contains(a)));
        }
    }

    #[test]
    fn test_dead_end_pruning_skips_trap() {
        // Moving E drops onto a cell ringed by caps, too low to climb back out.
        let rows = ["0444", "0304", "0444", "...."];
        let units = [Some(Pos::new(1, 1)), None];
        let board = Board::from_rows(GameConfig::new(4, 1), &rows, &units).unwrap();

        let all = board.possible_actions(Side::Mine);
        assert!(all.iter().any(|a| a.dir1 == E));

        let mut pruned = Vec::new();
        let options = MoveGenOptions {
            prune_dead_ends: true,
        };
        board.extend_actions(Side::Mine, options, &mut pruned);

        assert!(pruned.iter().all(|a| a.dir1 != E));
        assert_eq!(
            pruned.len(),
            all.iter().filter(|a| a.dir1 != E).count()
        );
    }
}
