//! Session store for two-player relay games.
//!
//! Sessions only record which connections are members; the transport owns
//! the connections themselves.

use crate::engine::Phase;
use crate::error::{RelayError, RelayErrorKind};
use crate::games::tictactoe::{Board, Symbol};
use derive_getters::Getters;
use derive_more::{Display, From};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a game session.
pub type SessionId = String;

/// Maximum number of members in a session.
pub const MAX_MEMBERS: usize = 2;

/// Length of generated session identifiers.
pub const SESSION_ID_LEN: usize = 7;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque identifier of a live connection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize,
)]
#[display("conn-{}", _0)]
pub struct ConnectionId(u64);

/// Cumulative wins per symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    /// Rounds credited to X.
    pub x: u32,
    /// Rounds credited to O.
    pub o: u32,
}

impl Scores {
    /// Adds one win for the given symbol.
    pub fn credit(&mut self, symbol: Symbol) {
        match symbol {
            Symbol::X => self.x += 1,
            Symbol::O => self.o += 1,
        }
    }
}

/// One isolated two-player game.
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) id: SessionId,
    pub(crate) members: Vec<ConnectionId>,
    pub(crate) board: Board,
    pub(crate) next: Symbol,
    pub(crate) phase: Phase,
    pub(crate) scores: Scores,
}

impl Session {
    /// Creates a fresh session: empty board, X to move, no score.
    #[instrument(skip(members), fields(members = members.len()))]
    pub fn new(id: SessionId, members: Vec<ConnectionId>) -> Self {
        debug!(session_id = %id, "Creating new game session");
        Self {
            id,
            members,
            board: Board::new(),
            next: Symbol::X,
            phase: Phase::AwaitingMove,
            scores: Scores::default(),
        }
    }

    /// Session identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current members in join order.
    pub fn members(&self) -> &[ConnectionId] {
        &self.members
    }

    /// Whether the connection is a member.
    pub fn has_member(&self, connection: ConnectionId) -> bool {
        self.members.contains(&connection)
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Symbol that moves next.
    pub fn next(&self) -> Symbol {
        self.next
    }

    /// Current round phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Cumulative scores.
    pub fn scores(&self) -> Scores {
        self.scores
    }

    /// Read-only snapshot of the shared state.
    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id.clone(),
            board: self.board.clone(),
            next: self.next,
            phase: self.phase,
            scores: self.scores,
            members: self.members.len(),
        }
    }
}

/// Snapshot of a session's board, turn and score state.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct SessionView {
    /// Session identifier.
    id: SessionId,
    /// Board contents.
    board: Board,
    /// Symbol that moves next.
    next: Symbol,
    /// Round phase.
    phase: Phase,
    /// Cumulative scores.
    scores: Scores,
    /// Number of members.
    members: usize,
}

impl SessionView {
    /// Wire-level turn flag.
    pub fn is_x_next(&self) -> bool {
        self.next.is_x()
    }
}

/// Generates a short base-36 identifier.
#[instrument(skip(rng))]
pub fn generate_session_id<R: Rng>(rng: &mut R) -> SessionId {
    (0..SESSION_ID_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Owns every live session, keyed by identifier.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<SessionId, Session>,
}

impl SessionStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session store");
        Self::default()
    }

    /// Creates a session with `connection` as its sole member.
    ///
    /// Identifiers are regenerated until one is free, so `create` never
    /// replaces a live session.
    #[instrument(skip(self), fields(connection_id = %connection))]
    pub fn create(&mut self, connection: ConnectionId) -> SessionId {
        let mut rng = rand::rng();
        let id = loop {
            let candidate = generate_session_id(&mut rng);
            if !self.sessions.contains_key(&candidate) {
                break candidate;
            }
            warn!(session_id = %candidate, "Generated session id already in use, retrying");
        };

        self.sessions
            .insert(id.clone(), Session::new(id.clone(), vec![connection]));
        info!(session_id = %id, "Created new session");
        id
    }

    /// Adds `connection` to an existing session with room for it.
    ///
    /// A connection that is already a member is not added twice.
    #[instrument(skip(self), fields(connection_id = %connection))]
    pub fn join(
        &mut self,
        session_id: &str,
        connection: ConnectionId,
    ) -> Result<SessionView, RelayError> {
        let Some(session) = self.sessions.get_mut(session_id) else {
            warn!(session_id, "Join rejected: no such session");
            return Err(RelayError::new(RelayErrorKind::SessionUnavailable));
        };

        if session.has_member(connection) {
            debug!(session_id, "Connection already a member");
            return Ok(session.view());
        }

        if session.members.len() >= MAX_MEMBERS {
            warn!(session_id, "Join rejected: session full");
            return Err(RelayError::new(RelayErrorKind::SessionUnavailable));
        }

        session.members.push(connection);
        info!(session_id, members = session.members.len(), "Connection joined session");
        Ok(session.view())
    }

    /// Looks up a session.
    pub fn get(&self, session_id: &str) -> Option<&Session> {
        self.sessions.get(session_id)
    }

    /// Looks up a session for mutation.
    pub(crate) fn get_mut(&mut self, session_id: &str) -> Option<&mut Session> {
        self.sessions.get_mut(session_id)
    }

    /// Members of a session, empty when it does not exist.
    pub fn members(&self, session_id: &str) -> Vec<ConnectionId> {
        self.sessions
            .get(session_id)
            .map(|s| s.members.clone())
            .unwrap_or_default()
    }

    /// Removes `connection` from every session and drops sessions left empty.
    ///
    /// Returns the identifiers of the dropped sessions.
    #[instrument(skip(self), fields(connection_id = %connection))]
    pub fn remove_member(&mut self, connection: ConnectionId) -> Vec<SessionId> {
        let mut emptied = Vec::new();
        for (id, session) in self.sessions.iter_mut() {
            let before = session.members.len();
            session.members.retain(|m| *m != connection);
            if session.members.len() != before {
                debug!(session_id = %id, remaining = session.members.len(), "Removed member");
            }
            if session.members.is_empty() {
                emptied.push(id.clone());
            }
        }

        for id in &emptied {
            self.sessions.remove(id);
            info!(session_id = %id, "Session destroyed: no members left");
        }
        emptied
    }

    /// Replaces the session stored under `session_id` with a fresh one.
    ///
    /// The requester becomes the first member. Members of the replaced
    /// session keep their seat, up to the member limit, so they still
    /// receive the session's broadcasts.
    #[instrument(skip(self), fields(connection_id = %connection))]
    pub fn reset(&mut self, session_id: &str, connection: ConnectionId) -> SessionView {
        let mut members = vec![connection];
        if let Some(previous) = self.sessions.remove(session_id) {
            members.extend(previous.members.into_iter().filter(|m| *m != connection));
            members.truncate(MAX_MEMBERS);
        }

        let session = Session::new(session_id.to_string(), members);
        let view = session.view();
        info!(session_id, members = session.members.len(), "Session replaced in place");
        self.sessions.insert(session.id.clone(), session);
        view
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is live.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(n: u64) -> ConnectionId {
        ConnectionId::from(n)
    }

    #[test]
    fn test_generated_id_is_base36() {
        let id = generate_session_id(&mut rand::rng());
        assert_eq!(id.len(), SESSION_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_create_registers_sole_member() {
        let mut store = SessionStore::new();
        let id = store.create(conn(1));
        let session = store.get(&id).unwrap();
        assert_eq!(session.members(), &[conn(1)]);
        assert_eq!(session.next(), Symbol::X);
        assert_eq!(session.scores(), Scores::default());
    }

    #[test]
    fn test_join_third_member_rejected() {
        let mut store = SessionStore::new();
        let id = store.create(conn(1));
        store.join(&id, conn(2)).unwrap();
        let err = store.join(&id, conn(3)).unwrap_err();
        assert_eq!(err.kind, RelayErrorKind::SessionUnavailable);
        assert_eq!(store.members(&id), vec![conn(1), conn(2)]);
    }

    #[test]
    fn test_join_unknown_session_rejected() {
        let mut store = SessionStore::new();
        let err = store.join("nope", conn(1)).unwrap_err();
        assert_eq!(err.kind, RelayErrorKind::SessionUnavailable);
    }

    #[test]
    fn test_rejoin_does_not_duplicate() {
        let mut store = SessionStore::new();
        let id = store.create(conn(1));
        let view = store.join(&id, conn(1)).unwrap();
        assert_eq!(*view.members(), 1);
    }

    #[test]
    fn test_remove_member_is_safe_without_sessions() {
        let mut store = SessionStore::new();
        assert!(store.remove_member(conn(9)).is_empty());
    }

    #[test]
    fn test_remove_member_drops_empty_sessions_only() {
        let mut store = SessionStore::new();
        let solo = store.create(conn(1));
        let pair = store.create(conn(1));
        store.join(&pair, conn(2)).unwrap();

        let dropped = store.remove_member(conn(1));
        assert_eq!(dropped, vec![solo.clone()]);
        assert!(store.get(&solo).is_none());
        assert_eq!(store.members(&pair), vec![conn(2)]);
    }

    #[test]
    fn test_reset_keeps_existing_members() {
        let mut store = SessionStore::new();
        let id = store.create(conn(1));
        store.join(&id, conn(2)).unwrap();

        let view = store.reset(&id, conn(2));
        assert_eq!(*view.members(), 2);
        assert_eq!(store.members(&id), vec![conn(2), conn(1)]);
    }

    #[test]
    fn test_reset_creates_missing_session() {
        let mut store = SessionStore::new();
        let view = store.reset("fixed01", conn(4));
        assert_eq!(view.id(), "fixed01");
        assert_eq!(*view.next(), Symbol::X);
        assert_eq!(store.get("fixed01").unwrap().view(), view);
        assert_eq!(store.members("fixed01"), vec![conn(4)]);
    }
}
