//! Turn engine: move, reset, skip and new-game transitions.
//!
//! Every transition is a plain synchronous mutation of one [`Session`]. The
//! engine never reports invalid moves; they are dropped.

use crate::error::{RelayError, RelayErrorKind};
use crate::games::tictactoe::{Symbol, WinResult, check_winner, is_full};
use crate::session::{ConnectionId, Session, SessionStore, SessionView};
use tracing::{debug, info, instrument, warn};

/// Phase of the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Accepting moves.
    AwaitingMove,
    /// Board just cleared by a reset; accepting moves.
    JustReset,
    /// A line was completed (or the board filled up). Moves are dropped
    /// until the board is cleared.
    RoundOver {
        /// Credited win, `None` for a drawn round.
        win: Option<WinResult>,
    },
}

impl Phase {
    /// Whether a move may be played in this phase.
    pub fn accepts_moves(self) -> bool {
        !matches!(self, Phase::RoundOver { .. })
    }
}

/// What a state broadcast reports about the change that produced it.
///
/// A reset never carries a winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    /// A move was applied; `win` is the result of evaluating the new board.
    Move {
        /// Win produced by this move.
        win: Option<WinResult>,
    },
    /// The board was cleared and the opening move handed over.
    Reset,
    /// The board was cleared and the turn forced by the caller.
    Skip,
}

impl StateChange {
    /// Win reported by this change.
    pub fn win(self) -> Option<WinResult> {
        match self {
            StateChange::Move { win } => win,
            StateChange::Reset | StateChange::Skip => None,
        }
    }

    /// Whether this change is a reset.
    pub fn is_reset(self) -> bool {
        self == StateChange::Reset
    }
}

/// Result of an accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// State after the move.
    pub view: SessionView,
    /// Win detected on the updated board.
    pub win: Option<WinResult>,
}

impl Session {
    /// Places the next symbol on `index`.
    ///
    /// Returns `None` without touching state when the round is over or the
    /// cell is occupied or out of range.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn play(&mut self, index: usize, invert: bool) -> Option<Option<WinResult>> {
        if !self.phase.accepts_moves() {
            debug!(phase = ?self.phase, "Move dropped: round is over");
            return None;
        }

        let symbol = self.next;
        if !self.board.place(index, symbol) {
            debug!(%symbol, "Move dropped: cell occupied or out of range");
            return None;
        }
        self.next = symbol.opponent();

        let win = check_winner(&self.board, invert);
        match win {
            Some(result) => {
                self.scores.credit(result.winner);
                self.phase = Phase::RoundOver { win };
                info!(
                    winner = %result.winner,
                    line = %result.class_name,
                    invert,
                    x = self.scores.x,
                    o = self.scores.o,
                    "Round won"
                );
            }
            None if is_full(&self.board) => {
                self.phase = Phase::RoundOver { win: None };
                info!("Round drawn");
            }
            None => self.phase = Phase::AwaitingMove,
        }

        debug!(%symbol, next = %self.next, "Move applied");
        Some(win)
    }

    /// Clears the board and hands the opening move to the other symbol.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn reset_round(&mut self) {
        self.board.clear();
        self.next = self.next.opponent();
        self.phase = Phase::JustReset;
        info!(next = %self.next, "Round reset");
    }

    /// Clears the board, zeroes the scores and forces the next symbol.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn skip_to(&mut self, next: Symbol) {
        self.board.clear();
        self.next = next;
        self.scores = Default::default();
        self.phase = Phase::AwaitingMove;
        info!(%next, "Turn skipped");
    }
}

/// Applies turn transitions to sessions held by a [`SessionStore`].
#[derive(Debug)]
pub struct TurnEngine<'a> {
    store: &'a mut SessionStore,
}

impl<'a> TurnEngine<'a> {
    /// Wraps a store.
    pub fn new(store: &'a mut SessionStore) -> Self {
        Self { store }
    }

    /// Applies a move. Unknown sessions and illegal moves are no-ops.
    #[instrument(skip(self))]
    pub fn apply_move(&mut self, session_id: &str, index: usize, invert: bool) -> Option<MoveOutcome> {
        let Some(session) = self.store.get_mut(session_id) else {
            debug!(session_id, "Move dropped: no such session");
            return None;
        };
        let win = session.play(index, invert)?;
        Some(MoveOutcome {
            view: session.view(),
            win,
        })
    }

    /// Clears the board and flips the turn. Unknown sessions are a no-op.
    #[instrument(skip(self))]
    pub fn apply_reset(&mut self, session_id: &str) -> Option<SessionView> {
        let Some(session) = self.store.get_mut(session_id) else {
            debug!(session_id, "Reset dropped: no such session");
            return None;
        };
        session.reset_round();
        Some(session.view())
    }

    /// Clears the board, zeroes scores and forces the next symbol.
    #[instrument(skip(self))]
    pub fn apply_skip(&mut self, session_id: &str, next: Symbol) -> Result<SessionView, RelayError> {
        let session = self.store.get_mut(session_id).ok_or_else(|| {
            warn!(session_id, "Skip rejected: no such session");
            RelayError::new(RelayErrorKind::SessionNotFound(session_id.to_string()))
        })?;
        session.skip_to(next);
        Ok(session.view())
    }

    /// Replaces the session wholesale with a fresh one, X to move.
    #[instrument(skip(self), fields(connection_id = %connection))]
    pub fn start_new(&mut self, session_id: &str, connection: ConnectionId) -> SessionView {
        self.store.reset(session_id, connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::{Square, WinLine};

    fn store_with_session() -> (SessionStore, String) {
        let mut store = SessionStore::new();
        let id = store.create(ConnectionId::from(1));
        store.join(&id, ConnectionId::from(2)).unwrap();
        (store, id)
    }

    #[test]
    fn test_moves_alternate_symbols() {
        let (mut store, id) = store_with_session();
        let mut engine = TurnEngine::new(&mut store);

        let first = engine.apply_move(&id, 4, false).unwrap();
        assert_eq!(*first.view.next(), Symbol::O);
        let second = engine.apply_move(&id, 0, false).unwrap();
        assert_eq!(*second.view.next(), Symbol::X);
        assert_eq!(second.view.board().get(4), Some(Square::Occupied(Symbol::X)));
        assert_eq!(second.view.board().get(0), Some(Square::Occupied(Symbol::O)));
    }

    #[test]
    fn test_occupied_cell_is_noop() {
        let (mut store, id) = store_with_session();
        let mut engine = TurnEngine::new(&mut store);
        engine.apply_move(&id, 4, false).unwrap();

        assert!(engine.apply_move(&id, 4, false).is_none());
        assert_eq!(store.get(&id).unwrap().next(), Symbol::O);
    }

    #[test]
    fn test_out_of_range_and_unknown_session_are_noops() {
        let (mut store, id) = store_with_session();
        let mut engine = TurnEngine::new(&mut store);
        assert!(engine.apply_move(&id, 9, false).is_none());
        assert!(engine.apply_move("missing", 0, false).is_none());
        assert!(engine.apply_reset("missing").is_none());
    }

    #[test]
    fn test_win_scores_once_per_round() {
        let (mut store, id) = store_with_session();
        let mut engine = TurnEngine::new(&mut store);
        for index in [0, 4, 1, 5] {
            assert!(engine.apply_move(&id, index, false).unwrap().win.is_none());
        }
        let outcome = engine.apply_move(&id, 2, false).unwrap();
        assert_eq!(
            outcome.win,
            Some(WinResult {
                winner: Symbol::X,
                class_name: WinLine::H1
            })
        );
        assert_eq!(outcome.view.scores().x, 1);

        // Round over: further moves are dropped and cannot score again.
        assert!(engine.apply_move(&id, 8, false).is_none());
        assert_eq!(store.get(&id).unwrap().scores().x, 1);
    }

    #[test]
    fn test_reset_flips_turn_and_keeps_scores() {
        let (mut store, id) = store_with_session();
        let mut engine = TurnEngine::new(&mut store);
        for index in [0, 4, 1, 5, 2] {
            engine.apply_move(&id, index, false);
        }
        let before = store.get(&id).unwrap().next();

        let view = TurnEngine::new(&mut store).apply_reset(&id).unwrap();
        assert_eq!(*view.next(), before.opponent());
        assert_eq!(view.board().occupied(), 0);
        assert_eq!(*view.phase(), Phase::JustReset);
        assert_eq!(view.scores().x, 1);
        assert!(check_winner(view.board(), false).is_none());
    }

    #[test]
    fn test_drawn_round_is_over() {
        let (mut store, id) = store_with_session();
        let mut engine = TurnEngine::new(&mut store);
        // X O X / X O O / O X X
        for index in [0, 1, 2, 4, 3, 5, 7, 6, 8] {
            assert!(engine.apply_move(&id, index, false).unwrap().win.is_none());
        }
        assert_eq!(
            store.get(&id).unwrap().phase(),
            Phase::RoundOver { win: None }
        );
    }

    #[test]
    fn test_skip_forces_turn_and_zeroes_scores() {
        let (mut store, id) = store_with_session();
        let mut engine = TurnEngine::new(&mut store);
        for index in [0, 4, 1, 5, 2] {
            engine.apply_move(&id, index, false);
        }
        let view = engine.apply_skip(&id, Symbol::O).unwrap();
        assert_eq!(*view.next(), Symbol::O);
        assert_eq!(view.scores().x, 0);
        assert_eq!(view.board().occupied(), 0);
    }

    #[test]
    fn test_skip_unknown_session_reports_error() {
        let mut store = SessionStore::new();
        let err = TurnEngine::new(&mut store)
            .apply_skip("missing", Symbol::X)
            .unwrap_err();
        assert_eq!(err.kind, RelayErrorKind::SessionNotFound("missing".into()));
    }

    #[test]
    fn test_start_new_resets_everything() {
        let (mut store, id) = store_with_session();
        let mut engine = TurnEngine::new(&mut store);
        for index in [0, 4, 1, 5, 2] {
            engine.apply_move(&id, index, false);
        }
        let view = engine.start_new(&id, ConnectionId::from(2));
        assert_eq!(*view.next(), Symbol::X);
        assert_eq!(view.scores().x, 0);
        assert_eq!(view.board().occupied(), 0);
        assert_eq!(*view.members(), 2);
    }
}
