//! Draw detection logic for tic-tac-toe.

use super::super::{Board, CELL_COUNT};
use tracing::{instrument, trace};

/// Whether every cell holds a symbol. Without a completed line the round
/// is drawn.
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    let occupied = board.occupied();
    trace!(occupied, "Counted occupied cells");
    occupied == CELL_COUNT
}

#[cfg(test)]
mod tests {
    use super::super::super::Symbol;
    use super::super::win::check_winner;
    use super::*;

    fn is_draw(board: &Board) -> bool {
        is_full(board) && check_winner(board, false).is_none()
    }

    #[test]
    fn test_empty_board_not_full() {
        let board = Board::new();
        assert!(!is_full(&board));
    }

    #[test]
    fn test_partial_board_not_full() {
        let mut board = Board::new();
        board.place(4, Symbol::X);
        assert!(!is_full(&board));
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        // X O X
        // X O O
        // O X X
        let mut board = Board::new();
        for (index, symbol) in [
            (0, Symbol::X),
            (1, Symbol::O),
            (2, Symbol::X),
            (3, Symbol::X),
            (4, Symbol::O),
            (5, Symbol::O),
            (6, Symbol::O),
            (7, Symbol::X),
            (8, Symbol::X),
        ] {
            board.place(index, symbol);
        }
        assert!(is_full(&board));
        assert!(is_draw(&board));
    }
}
