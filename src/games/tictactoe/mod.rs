mod rules;
mod types;

pub use rules::{WinLine, WinResult, check_winner, is_full};
pub use types::{Board, CELL_COUNT, InvalidSquare, Square, Symbol};
