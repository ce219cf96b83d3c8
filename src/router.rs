//! Broadcast router: turns each inbound signal into outbound events and
//! their recipients.

use crate::engine::{StateChange, TurnEngine};
use crate::error::{RelayError, RelayErrorKind};
use crate::games::tictactoe::Symbol;
use crate::protocol::{
    ChatBroadcast, ChatRequest, ClientEvent, ConfirmationRequest, GameStatePayload,
    MakeMoveRequest, NewGamePayload, ServerEvent, SkipTurnRequest,
};
use crate::session::{ConnectionId, SessionStore};
use tracing::{debug, info, instrument, warn};

/// One outbound event and the connections it is delivered to.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    /// Recipients, each receiving the identical event.
    pub recipients: Vec<ConnectionId>,
    /// Event to deliver.
    pub event: ServerEvent,
}

impl Dispatch {
    /// Event addressed to a single connection.
    pub fn to_sender(sender: ConnectionId, event: ServerEvent) -> Self {
        Self {
            recipients: vec![sender],
            event,
        }
    }

    /// Event addressed to every member of a session.
    pub fn to_session(members: Vec<ConnectionId>, event: ServerEvent) -> Self {
        Self {
            recipients: members,
            event,
        }
    }

    /// Error event addressed to the originating connection.
    pub fn rejection(sender: ConnectionId, error: &RelayError) -> Self {
        Self::to_sender(sender, ServerEvent::Error(error.client_message()))
    }
}

/// Relay state plus signal dispatch.
///
/// Every handler runs to completion before the next signal is processed;
/// callers serialize access.
#[derive(Debug, Default)]
pub struct Relay {
    store: SessionStore,
}

impl Relay {
    /// Creates a relay with an empty session store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating relay");
        Self::with_store(SessionStore::new())
    }

    /// Creates a relay around an existing store.
    pub fn with_store(store: SessionStore) -> Self {
        Self { store }
    }

    /// Session store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Decodes a text frame and handles it.
    ///
    /// Undecodable frames are reported to the sender only.
    #[instrument(skip(self, frame), fields(connection_id = %sender))]
    pub fn handle_frame(&mut self, sender: ConnectionId, frame: &str) -> Vec<Dispatch> {
        match serde_json::from_str::<ClientEvent>(frame) {
            Ok(event) => self.handle(sender, event),
            Err(e) => {
                let error = RelayError::from(e);
                warn!(error = %error, "Rejected malformed frame");
                vec![Dispatch::rejection(sender, &error)]
            }
        }
    }

    /// Handles one inbound signal.
    #[instrument(skip(self, event), fields(connection_id = %sender, event = event.name()))]
    pub fn handle(&mut self, sender: ConnectionId, event: ClientEvent) -> Vec<Dispatch> {
        debug!("Handling signal");
        let result = match event {
            ClientEvent::CreateGame => Ok(self.create_game(sender)),
            ClientEvent::JoinGame(game_id) => self.join_game(sender, &game_id),
            ClientEvent::MakeMove(req) => Ok(self.make_move(req)),
            ClientEvent::SkipTurn(req) => self.skip_turn(req),
            ClientEvent::Clear(req) => self.confirmation(req, ServerEvent::ConfirmClear),
            ClientEvent::ChangeRules(req) => self.confirmation(req, ServerEvent::ConfirmChange),
            ClientEvent::ChangeRulesConfirm(game_id) => {
                self.to_existing(&game_id, ServerEvent::RulesChanged)
            }
            ClientEvent::NewGame(game_id) => Ok(self.new_game(sender, &game_id)),
            ClientEvent::SendMessage(req) => self.send_message(req),
        };

        result.unwrap_or_else(|error| {
            warn!(error = %error, "Signal rejected");
            vec![Dispatch::rejection(sender, &error)]
        })
    }

    /// Drops a departed connection from every session.
    #[instrument(skip(self), fields(connection_id = %connection))]
    pub fn disconnect(&mut self, connection: ConnectionId) {
        let destroyed = self.store.remove_member(connection);
        info!(destroyed = destroyed.len(), "Connection departed");
    }

    fn create_game(&mut self, sender: ConnectionId) -> Vec<Dispatch> {
        let game_id = self.store.create(sender);
        vec![Dispatch::to_sender(sender, ServerEvent::GameCreated(game_id))]
    }

    fn join_game(&mut self, sender: ConnectionId, game_id: &str) -> Result<Vec<Dispatch>, RelayError> {
        let view = self.store.join(game_id, sender)?;
        Ok(vec![Dispatch::to_session(
            self.store.members(game_id),
            ServerEvent::GameState(GameStatePayload::joined(&view)),
        )])
    }

    fn make_move(&mut self, req: MakeMoveRequest) -> Vec<Dispatch> {
        let mut engine = TurnEngine::new(&mut self.store);
        let (view, change) = if req.reset {
            match engine.apply_reset(&req.game_id) {
                Some(view) => (view, StateChange::Reset),
                None => return Vec::new(),
            }
        } else {
            let Some(index) = req.cell() else {
                debug!(index = ?req.index, "Move dropped: unusable index");
                return Vec::new();
            };
            match engine.apply_move(&req.game_id, index, req.invert) {
                Some(outcome) => (outcome.view, StateChange::Move { win: outcome.win }),
                None => return Vec::new(),
            }
        };

        vec![Dispatch::to_session(
            self.store.members(&req.game_id),
            ServerEvent::GameState(GameStatePayload::after(&view, change)),
        )]
    }

    fn skip_turn(&mut self, req: SkipTurnRequest) -> Result<Vec<Dispatch>, RelayError> {
        let next = Symbol::from_is_x_next(req.is_x_next);
        let view = TurnEngine::new(&mut self.store).apply_skip(&req.game_id, next)?;
        let members = self.store.members(&req.game_id);
        Ok(vec![
            Dispatch::to_session(
                members.clone(),
                ServerEvent::GameState(GameStatePayload::after(&view, StateChange::Skip)),
            ),
            Dispatch::to_session(members, ServerEvent::TurnSkipped),
        ])
    }

    fn confirmation(
        &self,
        req: ConfirmationRequest,
        event: fn(serde_json::Value) -> ServerEvent,
    ) -> Result<Vec<Dispatch>, RelayError> {
        self.to_existing(&req.game_id, event(req.player))
    }

    fn new_game(&mut self, sender: ConnectionId, game_id: &str) -> Vec<Dispatch> {
        let view = TurnEngine::new(&mut self.store).start_new(game_id, sender);
        vec![Dispatch::to_session(
            self.store.members(game_id),
            ServerEvent::SetNewGame(NewGamePayload::fresh(&view)),
        )]
    }

    fn send_message(&mut self, req: ChatRequest) -> Result<Vec<Dispatch>, RelayError> {
        self.to_existing(
            &req.game_id,
            ServerEvent::Broadcast(ChatBroadcast {
                message: req.message,
                host: req.host,
            }),
        )
    }

    /// Broadcasts `event` to a session, rejecting unknown identifiers.
    fn to_existing(&self, game_id: &str, event: ServerEvent) -> Result<Vec<Dispatch>, RelayError> {
        let session = self.store.get(game_id).ok_or_else(|| {
            RelayError::new(RelayErrorKind::SessionNotFound(game_id.to_string()))
        })?;
        Ok(vec![Dispatch::to_session(session.members().to_vec(), event)])
    }
}
