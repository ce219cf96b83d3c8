//! Game rules for tic-tac-toe.
//!
//! Pure functions for evaluating a board. Rules are separated from board
//! storage so the turn engine can compose them.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::{WinLine, WinResult, check_winner};
