//! Properties of the win detector over exhaustive boards.

use tictactoe_relay::{Board, CELL_COUNT, Square, Symbol, WinLine, check_winner};

/// Every board reachable by filling cells with "", "x" or "o".
fn all_boards() -> impl Iterator<Item = Board> {
    (0..3u32.pow(CELL_COUNT as u32)).map(|mut code| {
        let mut squares = [Square::Empty; CELL_COUNT];
        for square in squares.iter_mut() {
            *square = match code % 3 {
                0 => Square::Empty,
                1 => Square::Occupied(Symbol::X),
                _ => Square::Occupied(Symbol::O),
            };
            code /= 3;
        }
        Board::from_squares(squares)
    })
}

fn has_complete_line(board: &Board) -> bool {
    WinLine::ALL.iter().any(|line| {
        let [a, b, c] = line.cells();
        board.get(a) != Some(Square::Empty)
            && board.get(a) == board.get(b)
            && board.get(a) == board.get(c)
    })
}

#[test]
fn test_evaluation_is_deterministic() {
    for board in all_boards().step_by(97) {
        assert_eq!(check_winner(&board, false), check_winner(&board, false));
        assert_eq!(check_winner(&board, true), check_winner(&board, true));
    }
}

#[test]
fn test_none_exactly_when_no_line_complete() {
    for board in all_boards() {
        assert_eq!(check_winner(&board, false).is_some(), has_complete_line(&board));
    }
}

#[test]
fn test_invert_negates_attribution_on_same_line() {
    for board in all_boards() {
        match (check_winner(&board, false), check_winner(&board, true)) {
            (Some(normal), Some(inverted)) => {
                assert_eq!(inverted.winner, normal.winner.opponent());
                assert_eq!(inverted.class_name, normal.class_name);
            }
            (None, None) => {}
            other => panic!("invert changed whether a line is complete: {other:?}"),
        }
    }
}

#[test]
fn test_cleared_board_never_wins() {
    let mut board = Board::new();
    for index in 0..CELL_COUNT {
        board.place(index, Symbol::X);
    }
    assert!(check_winner(&board, false).is_some());
    board.clear();
    assert_eq!(check_winner(&board, false), None);
}
