//! Core domain types for tic-tac-toe.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// Number of cells on the board.
pub const CELL_COUNT: usize = 9;

/// Symbol a player places on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Symbol {
    /// Symbol X (opens a fresh session).
    X,
    /// Symbol O.
    O,
}

impl Symbol {
    /// Returns the opposing symbol.
    pub fn opponent(self) -> Self {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }

    /// Maps the wire-level `isXNext` flag to a symbol.
    pub fn from_is_x_next(is_x_next: bool) -> Self {
        if is_x_next { Symbol::X } else { Symbol::O }
    }

    /// Whether this is symbol X.
    pub fn is_x(self) -> bool {
        self == Symbol::X
    }
}

/// A square on the board.
///
/// Serialized as `""`, `"x"` or `"o"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Square {
    /// Empty square.
    Empty,
    /// Square occupied by a symbol.
    Occupied(Symbol),
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        match square {
            Square::Empty => String::new(),
            Square::Occupied(symbol) => symbol.to_string(),
        }
    }
}

/// A cell value that is none of `""`, `"x"`, `"o"`.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Invalid cell value: {:?}", value)]
pub struct InvalidSquare {
    /// The rejected value.
    pub value: String,
}

impl TryFrom<String> for Square {
    type Error = InvalidSquare;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "" => Ok(Square::Empty),
            "x" => Ok(Square::Occupied(Symbol::X)),
            "o" => Ok(Square::Occupied(Symbol::O)),
            _ => Err(InvalidSquare { value }),
        }
    }
}

/// 3x3 board, squares in row-major order (0-8).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    squares: [Square; CELL_COUNT],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            squares: [Square::Empty; CELL_COUNT],
        }
    }

    /// Gets the square at the given index, `None` when out of bounds.
    pub fn get(&self, index: usize) -> Option<Square> {
        self.squares.get(index).copied()
    }

    /// Places a symbol on an empty square.
    ///
    /// Returns `false` and leaves the board untouched when the index is out
    /// of bounds or the square is already occupied.
    pub fn place(&mut self, index: usize, symbol: Symbol) -> bool {
        match self.squares.get_mut(index) {
            Some(square @ Square::Empty) => {
                *square = Square::Occupied(symbol);
                true
            }
            _ => false,
        }
    }

    /// Clears every square.
    pub fn clear(&mut self) {
        self.squares = [Square::Empty; CELL_COUNT];
    }

    /// Number of occupied squares.
    pub fn occupied(&self) -> usize {
        self.squares.iter().filter(|s| **s != Square::Empty).count()
    }

    /// Builds a board from row-major squares.
    pub fn from_squares(squares: [Square; CELL_COUNT]) -> Self {
        Self { squares }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
