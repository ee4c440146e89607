//! Game logic and game board.

use core::str::FromStr;
use derive_more::{Display, Error};
use std::collections::BTreeSet;

/// Number of rows and columns of the board.
pub const SIZE: usize = 3;

/// All lines that win the game: rows, columns, diagonals.
const LINES: [[(usize, usize); SIZE]; 8] = [
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// Errors of the board model. Only [`GameError::InvalidMove`] can happen
/// during play.
#[derive(Debug, Display, Error, PartialOrd, PartialEq, Clone, Copy, Eq)]
pub enum GameError {
    /// Cell is occupied or outside of the board.
    #[display("invalid move ({row}, {col}): cell is occupied or off the board")]
    InvalidMove { row: usize, col: usize },
    /// Mark counts break the X-moves-first alternation.
    #[display("unbalanced position: X={x}, O={o} (X must equal O or lead by one)")]
    UnbalancedPosition { x: usize, o: usize },
    #[display("invalid move format, expected \"row col\"")]
    InvalidMoveFormat,
}

#[derive(Copy, Clone, PartialOrd, Ord, PartialEq, Eq, Hash, Debug, Display)]
pub enum Player {
    /// Moves first. Wins with utility `+1`.
    X,
    /// Moves second. Wins with utility `-1`.
    O,
}

impl Player {
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }

    /// Utility of a position won by this player.
    #[must_use]
    pub const fn winning_utility(self) -> i32 {
        match self {
            Self::X => 1,
            Self::O => -1,
        }
    }
}

/// Content of a single field. `None` is empty.
pub type Cell = Option<Player>;

/// Coordinate of a field, zero-based.
///
/// Moves order row-major, so collections of moves iterate the same way on
/// every platform.
#[derive(Copy, Clone, PartialOrd, Ord, PartialEq, Eq, Hash, Debug, Display)]
#[display("({row}, {col})")]
pub struct Move {
    pub row: usize,
    pub col: usize,
}

impl Move {
    pub const CENTER: Self = Self::new(1, 1);

    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    #[must_use]
    pub const fn is_center(self) -> bool {
        self.row == Self::CENTER.row && self.col == Self::CENTER.col
    }

    /// Returns whether the move targets one of the four corners or the center.
    #[must_use]
    pub const fn is_corner_or_center(self) -> bool {
        matches!((self.row, self.col), (0 | 2, 0 | 2)) || self.is_center()
    }
}

impl FromStr for Move {
    type Err = GameError;

    /// Parses `"row col"` or `"row,col"`. Range is checked on application.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty());

        let (Some(row), Some(col), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(GameError::InvalidMoveFormat);
        };
        let row = row.parse().map_err(|_| GameError::InvalidMoveFormat)?;
        let col = col.parse().map_err(|_| GameError::InvalidMoveFormat)?;
        Ok(Self::new(row, col))
    }
}

/// Snapshot of the board.
///
/// Positions are plain values: applying a move returns a new position and
/// leaves the old one untouched. Whose turn it is follows from the marks on
/// the board, so X and O counts always differ by at most one in favour of X.
#[derive(Debug, PartialOrd, Ord, PartialEq, Clone, Copy, Eq, Hash)]
pub struct Position(
    /*
     * Board: rows --> col --> field
     * (row=0,col=0) <==> top left of game board
     */
    [[Cell; SIZE]; SIZE],
);

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

/// The empty board, X to move.
#[must_use]
pub const fn initial_position() -> Position {
    Position::new()
}

impl Position {
    #[must_use]
    pub const fn new() -> Self {
        Self([[None; SIZE]; SIZE])
    }

    /// Builds an arbitrary position, e.g. a puzzle setup.
    ///
    /// Fails if the mark counts could not have come from alternating play
    /// with X starting.
    pub fn try_from_rows(rows: [[Cell; SIZE]; SIZE]) -> Result<Self, GameError> {
        let position = Self(rows);
        let x = position.marks(Player::X);
        let o = position.marks(Player::O);
        if x == o || x == o + 1 {
            Ok(position)
        } else {
            Err(GameError::UnbalancedPosition { x, o })
        }
    }

    #[must_use]
    pub const fn rows(&self) -> &[[Cell; SIZE]; SIZE] {
        &self.0
    }

    /// Returns the field at `mv`, or `None` if `mv` is off the board.
    #[must_use]
    pub fn cell(&self, mv: Move) -> Option<Cell> {
        self.0.get(mv.row)?.get(mv.col).copied()
    }

    /// Number of marks `player` has on the board.
    #[must_use]
    pub fn marks(&self, player: Player) -> usize {
        self.0
            .iter()
            .flatten()
            .filter(|&&cell| cell == Some(player))
            .count()
    }

    /// X moves whenever both sides have the same number of marks.
    #[must_use]
    pub fn player_to_move(&self) -> Player {
        if self.marks(Player::X) == self.marks(Player::O) {
            Player::X
        } else {
            Player::O
        }
    }

    /// Emits the empty fields in row-major order.
    pub fn empty_cells(&self) -> impl Iterator<Item = Move> {
        (0..SIZE)
            .flat_map(|row| (0..SIZE).map(move |col| Move::new(row, col)))
            .filter(move |mv| self.0[mv.row][mv.col].is_none())
    }

    /// All moves that are legal in this position.
    ///
    /// Does not look at [`Self::winner`]; a won position may still have empty
    /// fields.
    #[must_use]
    pub fn legal_moves(&self) -> BTreeSet<Move> {
        self.empty_cells().collect()
    }

    /// Places the mark of [`Self::player_to_move`] at `mv`.
    pub fn apply_move(&self, mv: Move) -> Result<Self, GameError> {
        match self.cell(mv) {
            Some(None) => Ok(self.place(mv)),
            _ => Err(GameError::InvalidMove {
                row: mv.row,
                col: mv.col,
            }),
        }
    }

    /// Like [`Self::apply_move`] for fields known to be empty.
    #[must_use]
    pub(crate) fn place(&self, mv: Move) -> Self {
        debug_assert!(self.0[mv.row][mv.col].is_none());

        let mut next = *self;
        next.0[mv.row][mv.col] = Some(self.player_to_move());
        next
    }

    /// Owner of the first complete line, scanning rows, columns, diagonals.
    #[must_use]
    pub fn winner(&self) -> Option<Player> {
        LINES.into_iter().find_map(|line| {
            let [a, b, c] = line.map(|(row, col)| self.0[row][col]);
            if a.is_some() && a == b && b == c {
                a
            } else {
                None
            }
        })
    }

    /// Returns whether the game is over, i.e., someone won or the board is full.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.winner().is_some() || self.empty_cells().next().is_none()
    }

    /// `+1` if X won, `-1` if O won, `0` otherwise.
    ///
    /// Only meaningful on terminal positions.
    #[must_use]
    pub fn utility(&self) -> i32 {
        self.winner().map_or(0, Player::winning_utility)
    }
}
