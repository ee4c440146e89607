//! Tic-tac-toe with a perfect computer player.
//!
//! [`Position`] models the 3x3 board: whose turn it is, which moves are
//! legal, who won. [`best_move`] searches the complete game tree below a
//! position and returns the optimal move together with the game value.
//!
//! ```
//! use tictactoe_rs::{Move, Player, best_move, initial_position};
//!
//! let position = initial_position()
//!     .apply_move(Move::new(0, 0))?
//!     .apply_move(Move::CENTER)?
//!     .apply_move(Move::new(0, 1))?
//!     .apply_move(Move::new(2, 2))?;
//! assert_eq!(position.player_to_move(), Player::X);
//!
//! let result = best_move(&position);
//! assert_eq!(result.best_move, Some(Move::new(0, 2)));
//! assert_eq!(result.utility, 1);
//! # Ok::<(), tictactoe_rs::GameError>(())
//! ```
#![deny(
    clippy::all,
    clippy::nursery,
    clippy::must_use_candidate,
    // clippy::restriction,
    // clippy::pedantic
)]
// now allow a few rules which are denied by the above statement
#![allow(clippy::redundant_pub_crate)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::all)]

mod game;
mod minimax;

pub use game::{Cell, GameError, Move, Player, Position, SIZE, initial_position};
pub use minimax::{SearchResult, best_move, best_move_parallel};
