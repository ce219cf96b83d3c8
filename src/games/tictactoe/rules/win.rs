//! Win detection logic for tic-tac-toe.

use super::super::{Board, Square, Symbol};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One of the eight winning lines, labelled the way clients draw the
/// strike-through.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WinLine {
    /// Top row.
    H1,
    /// Middle row.
    H2,
    /// Bottom row.
    H3,
    /// Left column.
    V1,
    /// Center column.
    V2,
    /// Right column.
    V3,
    /// Diagonal from top-left.
    X1,
    /// Diagonal from top-right.
    X2,
}

impl WinLine {
    /// Lines in evaluation order. The first complete line wins ties.
    pub const ALL: [WinLine; 8] = [
        WinLine::H1,
        WinLine::H2,
        WinLine::H3,
        WinLine::V1,
        WinLine::V2,
        WinLine::V3,
        WinLine::X1,
        WinLine::X2,
    ];

    /// Board indices covered by this line.
    pub fn cells(self) -> [usize; 3] {
        match self {
            WinLine::H1 => [0, 1, 2],
            WinLine::H2 => [3, 4, 5],
            WinLine::H3 => [6, 7, 8],
            WinLine::V1 => [0, 3, 6],
            WinLine::V2 => [1, 4, 7],
            WinLine::V3 => [2, 5, 8],
            WinLine::X1 => [0, 4, 8],
            WinLine::X2 => [2, 4, 6],
        }
    }
}

/// A detected win: who is credited and which line completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinResult {
    /// Symbol credited with the win.
    pub winner: Symbol,
    /// Completed line.
    pub class_name: WinLine,
}

/// Checks if there is a completed line on the board.
///
/// With `invert` set the win is credited to the opponent of the symbol that
/// completed the line. Move legality is unaffected.
#[instrument(skip(board))]
pub fn check_winner(board: &Board, invert: bool) -> Option<WinResult> {
    for line in WinLine::ALL {
        let [a, b, c] = line.cells();
        let sq = board.get(a);
        if sq == board.get(b) && sq == board.get(c) {
            if let Some(Square::Occupied(symbol)) = sq {
                let winner = if invert { symbol.opponent() } else { symbol };
                return Some(WinResult {
                    winner,
                    class_name: line,
                });
            }
        }
    }

    None
}
