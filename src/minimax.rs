//! Exhaustive minimax search over the game tree.
//!
//! Utility is always seen from X: `+1` X wins, `-1` O wins, `0` draw. A
//! child's value therefore is the value of the move leading to it, on every
//! level, for both sides.

use crate::{Move, Player, Position};
use rayon::prelude::*;
use tracing::{debug, warn};

/// Result of [`best_move`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SearchResult {
    /// Move to play. `None` if the position is already terminal.
    pub best_move: Option<Move>,
    /// Game value under optimal play of both sides.
    pub utility: i32,
}

/// Move together with its value.
type Candidate = (Move, i32);

/// Picks the final move among all scored candidates.
///
/// The better value wins. On equal values a corner or the center replaces
/// the held move, unless the held move already is the center.
fn select(mover: Player, candidates: &[Candidate]) -> Option<Candidate> {
    let better_score: fn(i32, i32) -> bool = match mover {
        Player::X => |new, best| new > best,
        Player::O => |new, best| new < best,
    };

    let (&first, rest) = candidates.split_first()?;
    Some(rest.iter().fold(first, |best, &candidate| {
        let (mv, score) = candidate;
        let (best_mv, best_score) = best;
        if better_score(score, best_score)
            || (score == best_score && mv.is_corner_or_center() && !best_mv.is_center())
        {
            candidate
        } else {
            best
        }
    }))
}

/// Scans candidates in order and stops at the first one the mover can not
/// improve on. Falls back to [`select`].
fn choose(mover: Player, candidates: &[Candidate]) -> Option<Candidate> {
    let target = mover.winning_utility();
    candidates
        .iter()
        .copied()
        .find(|&(_, score)| score == target)
        .or_else(|| select(mover, candidates))
}

/// Splits the children of `position` into terminal ones, which are scored
/// right away, and the rest, which need a deeper search.
fn expand(position: &Position) -> (Vec<Candidate>, Vec<(Move, Position)>) {
    let mut scored = Vec::new();
    let mut deferred = Vec::new();
    for mv in position.empty_cells() {
        let child = position.place(mv);
        if child.is_terminal() {
            scored.push((mv, child.utility()));
        } else {
            deferred.push((mv, child));
        }
    }
    (scored, deferred)
}

/// Recursive minimax logic including the early exit on winning moves.
///
/// Returns `None` only for terminal positions.
fn minimax(position: &Position) -> Option<Candidate> {
    let mover = position.player_to_move();
    let target = mover.winning_utility();

    let (mut candidates, deferred) = expand(position);
    // Terminal children first: an immediate win ends the search here.
    if let Some(&win) = candidates.iter().find(|&&(_, score)| score == target) {
        return Some(win);
    }

    for (mv, child) in deferred {
        let score = child_score(&child);
        if score == target {
            return Some((mv, score));
        }
        candidates.push((mv, score));
    }

    select(mover, &candidates)
}

/// Value of a non-terminal child position.
fn child_score(child: &Position) -> i32 {
    minimax(child).map_or_else(|| child.utility(), |(_, score)| score)
}

fn terminal_result(position: &Position) -> SearchResult {
    warn!(?position, "search started on a terminal position");
    SearchResult {
        best_move: None,
        utility: position.utility(),
    }
}

/// Returns the optimal move for [`Position::player_to_move`] and the value of
/// the position.
///
/// Callers are expected to check [`Position::is_terminal`] first; a terminal
/// position yields no move and its own utility.
///
/// Ties between moves of equal value are broken deterministically: corners
/// and the center are preferred over edges, the center is kept once chosen,
/// and otherwise the first move in row-major order wins.
#[must_use]
pub fn best_move(position: &Position) -> SearchResult {
    if position.is_terminal() {
        return terminal_result(position);
    }

    let result = minimax(position).map_or_else(
        || terminal_result(position),
        |(mv, utility)| SearchResult {
            best_move: Some(mv),
            utility,
        },
    );
    debug!(player = %position.player_to_move(), ?result, "search finished");
    result
}

/// Same as [`best_move`], but the subtrees below the root are searched on the
/// rayon thread pool.
///
/// The selection runs over the same ordered candidates as the sequential
/// search, so both functions always agree.
#[must_use]
pub fn best_move_parallel(position: &Position) -> SearchResult {
    if position.is_terminal() {
        return terminal_result(position);
    }

    let mover = position.player_to_move();
    let (mut candidates, deferred) = expand(position);
    if candidates
        .iter()
        .all(|&(_, score)| score != mover.winning_utility())
    {
        candidates.par_extend(
            deferred
                .par_iter()
                .map(|(mv, child)| (*mv, child_score(child))),
        );
    }

    let result = choose(mover, &candidates).map_or_else(
        || terminal_result(position),
        |(mv, utility)| SearchResult {
            best_move: Some(mv),
            utility,
        },
    );
    debug!(player = %mover, ?result, "parallel search finished");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tests::{board, reachable_positions};
    use crate::initial_position;
    use std::collections::HashMap;

    /// Plain memoised minimax without early exit or tie-break.
    fn reference_value(position: Position, memo: &mut HashMap<Position, i32>) -> i32 {
        if let Some(&value) = memo.get(&position) {
            return value;
        }

        let value = if position.is_terminal() {
            position.utility()
        } else {
            let values: Vec<i32> = position
                .empty_cells()
                .map(|mv| reference_value(position.apply_move(mv).unwrap(), memo))
                .collect();
            match position.player_to_move() {
                Player::X => values.into_iter().max(),
                Player::O => values.into_iter().min(),
            }
            .unwrap()
        };
        memo.insert(position, value);
        value
    }

    #[test]
    fn test_initial_position_is_draw() {
        let position = initial_position();
        let result = best_move(&position);
        assert_eq!(
            result,
            SearchResult {
                best_move: Some(Move::CENTER),
                utility: 0
            }
        );

        // the opponent can not force a win afterwards
        let next = position.apply_move(Move::CENTER).unwrap();
        assert_eq!(best_move(&next).utility, 0);
    }

    #[test]
    fn test_search_is_deterministic() {
        let position = initial_position();
        let first = best_move(&position);
        assert_eq!(first, best_move(&position));
        assert_eq!(first, best_move_parallel(&position));
    }

    #[test]
    fn test_self_play_is_draw() {
        let mut position = initial_position();
        while !position.is_terminal() {
            let result = best_move(&position);
            assert_eq!(result.utility, 0);
            position = position.apply_move(result.best_move.unwrap()).unwrap();
        }
        assert_eq!(position.winner(), None);
        assert!(position.legal_moves().is_empty());
    }

    #[test]
    fn test_complete_own_line() {
        let position = board(["XX.", ".O.", "..O"]);
        assert_eq!(position.player_to_move(), Player::X);
        assert_eq!(
            best_move(&position),
            SearchResult {
                best_move: Some(Move::new(0, 2)),
                utility: 1
            }
        );
    }

    #[test]
    fn test_block_opponent_row() {
        // one O mark less: O is to move and has to block
        let position = board(["XX.", ".O.", "..."]);
        assert_eq!(position.player_to_move(), Player::O);
        assert_eq!(
            best_move(&position),
            SearchResult {
                best_move: Some(Move::new(0, 2)),
                utility: 0
            }
        );
    }

    #[test]
    fn test_block_opponent_diagonal() {
        let position = board([".XO", ".O.", "..X"]);
        assert_eq!(position.player_to_move(), Player::X);
        let result = best_move(&position);
        assert_eq!(
            result,
            SearchResult {
                best_move: Some(Move::new(2, 0)),
                utility: 0
            }
        );

        // every other move loses
        for mv in position.empty_cells().filter(|&mv| mv != Move::new(2, 0)) {
            let next = position.apply_move(mv).unwrap();
            assert_eq!(best_move(&next).utility, -1, "{mv}");
        }
    }

    #[test]
    fn test_early_exit_takes_first_win() {
        // X wins with (0, 2) and with (2, 0)
        let position = board(["XX.", "X.O", ".OO"]);
        assert_eq!(
            best_move(&position),
            SearchResult {
                best_move: Some(Move::new(0, 2)),
                utility: 1
            }
        );

        let position = board(["XX.", "OO.", "X.."]);
        assert_eq!(position.player_to_move(), Player::O);
        assert_eq!(
            best_move(&position),
            SearchResult {
                best_move: Some(Move::new(1, 2)),
                utility: -1
            }
        );
    }

    #[test]
    fn test_terminal_position_has_no_move() {
        let won = board(["XXX", "OO.", "..."]);
        let expected = SearchResult {
            best_move: None,
            utility: 1,
        };
        assert_eq!(best_move(&won), expected);
        assert_eq!(best_move_parallel(&won), expected);

        let draw = board(["XOX", "XOO", "OXX"]);
        assert_eq!(
            best_move(&draw),
            SearchResult {
                best_move: None,
                utility: 0
            }
        );
    }

    #[test]
    fn test_matches_reference_solver() {
        let mut memo = HashMap::new();
        for position in reachable_positions() {
            let marks = position.marks(Player::X) + position.marks(Player::O);
            if position.is_terminal() || marks < 4 {
                continue;
            }

            let result = best_move(&position);
            assert_eq!(
                result.utility,
                reference_value(position, &mut memo),
                "{position:?}"
            );

            let next = position.apply_move(result.best_move.unwrap()).unwrap();
            assert_eq!(
                reference_value(next, &mut memo),
                result.utility,
                "{position:?}"
            );
            assert_eq!(best_move_parallel(&position), result, "{position:?}");
        }
    }

    #[test]
    fn test_select_prefers_better_score() {
        let candidates = [(Move::CENTER, 0), (Move::new(0, 1), 1), (Move::new(2, 2), -1)];
        assert_eq!(select(Player::X, &candidates), Some((Move::new(0, 1), 1)));
        assert_eq!(select(Player::O, &candidates), Some((Move::new(2, 2), -1)));
        assert_eq!(select(Player::X, &[]), None);
    }

    #[test]
    fn test_select_tie_break() {
        let edge_a = Move::new(0, 1);
        let edge_b = Move::new(1, 0);
        let corner_a = Move::new(0, 0);
        let corner_b = Move::new(2, 2);

        // center is kept against later corners
        assert_eq!(
            select(Player::X, &[(Move::CENTER, 0), (corner_a, 0), (corner_b, 0)]),
            Some((Move::CENTER, 0))
        );
        // a later corner displaces an earlier one
        assert_eq!(
            select(Player::O, &[(corner_a, 0), (corner_b, 0)]),
            Some((corner_b, 0))
        );
        // center displaces a corner
        assert_eq!(
            select(Player::X, &[(corner_a, 0), (Move::CENTER, 0)]),
            Some((Move::CENTER, 0))
        );
        // preferred fields displace edges, edges never displace anything
        assert_eq!(
            select(Player::X, &[(edge_a, 0), (corner_a, 0), (edge_b, 0)]),
            Some((corner_a, 0))
        );
        assert_eq!(
            select(Player::O, &[(edge_a, 0), (edge_b, 0)]),
            Some((edge_a, 0))
        );
        // a tie-break never beats a better score
        assert_eq!(
            select(Player::O, &[(edge_a, -1), (Move::CENTER, 0)]),
            Some((edge_a, -1))
        );
    }

    #[test]
    fn test_choose_stops_at_winning_move() {
        let candidates = [(Move::new(0, 1), 1), (Move::CENTER, 1)];
        assert_eq!(choose(Player::X, &candidates), Some((Move::new(0, 1), 1)));
        // not winning for O: regular selection
        assert_eq!(choose(Player::O, &candidates), Some((Move::CENTER, 1)));
    }
}
