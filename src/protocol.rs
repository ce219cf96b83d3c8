//! Wire protocol: named events carried as JSON text frames.
//!
//! Every frame is an envelope `{"event": <name>, "data": <payload>}`;
//! events without a payload omit `data`.

use crate::engine::StateChange;
use crate::games::tictactoe::{Board, CELL_COUNT, WinResult};
use crate::session::{SessionId, SessionView};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Payload of `makeMove`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeMoveRequest {
    /// Target session.
    pub game_id: SessionId,
    /// Cell index (0-8, row-major), as sent by the client.
    ///
    /// Kept undecoded so an unusable index drops the move instead of
    /// rejecting the frame.
    #[serde(default)]
    pub index: Option<serde_json::Value>,
    /// Clear the board instead of playing `index`.
    #[serde(default)]
    pub reset: bool,
    /// Credit completed lines to the opponent.
    #[serde(default)]
    pub invert: bool,
}

impl MakeMoveRequest {
    /// Board cell addressed by `index`, `None` unless it names one of the
    /// nine cells.
    ///
    /// Integers and their canonical decimal strings are accepted.
    pub fn cell(&self) -> Option<usize> {
        let index = match self.index.as_ref()? {
            serde_json::Value::Number(n) => usize::try_from(n.as_u64()?).ok()?,
            serde_json::Value::String(s) => {
                let parsed: usize = s.parse().ok()?;
                (parsed.to_string() == *s).then_some(parsed)?
            }
            _ => return None,
        };
        (index < CELL_COUNT).then_some(index)
    }
}

/// Payload of `skipTurn`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipTurnRequest {
    /// Target session.
    pub game_id: SessionId,
    /// Whether X moves next.
    pub is_x_next: bool,
}

/// Payload of `clear` and `changeRules`: a request awaiting the other
/// member's confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRequest {
    /// Target session.
    pub game_id: SessionId,
    /// Requester label, relayed verbatim.
    #[serde(default)]
    pub player: serde_json::Value,
}

/// Payload of `send-message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Target session.
    pub game_id: SessionId,
    /// Message text.
    pub message: String,
    /// Sender label, relayed verbatim.
    #[serde(default)]
    pub host: serde_json::Value,
}

/// Signals sent by a connected participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Open a new session.
    #[serde(rename = "createGame")]
    CreateGame,
    /// Join an existing session.
    #[serde(rename = "joinGame")]
    JoinGame(SessionId),
    /// Play a cell, or reset the round.
    #[serde(rename = "makeMove")]
    MakeMove(MakeMoveRequest),
    /// Clear the board and force whose turn it is.
    #[serde(rename = "skipTurn")]
    SkipTurn(SkipTurnRequest),
    /// Ask the session to confirm clearing.
    #[serde(rename = "clear")]
    Clear(ConfirmationRequest),
    /// Ask the session to confirm a rule change.
    #[serde(rename = "changeRules")]
    ChangeRules(ConfirmationRequest),
    /// Confirm a rule change.
    #[serde(rename = "changeRulesConfirm")]
    ChangeRulesConfirm(SessionId),
    /// Replace the session with a fresh one.
    #[serde(rename = "newGame")]
    NewGame(SessionId),
    /// Chat message for the session.
    #[serde(rename = "send-message")]
    SendMessage(ChatRequest),
}

impl ClientEvent {
    /// Event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::CreateGame => "createGame",
            ClientEvent::JoinGame(_) => "joinGame",
            ClientEvent::MakeMove(_) => "makeMove",
            ClientEvent::SkipTurn(_) => "skipTurn",
            ClientEvent::Clear(_) => "clear",
            ClientEvent::ChangeRules(_) => "changeRules",
            ClientEvent::ChangeRulesConfirm(_) => "changeRulesConfirm",
            ClientEvent::NewGame(_) => "newGame",
            ClientEvent::SendMessage(_) => "send-message",
        }
    }
}

/// The `checkWinner` field: a win result, or `false` when there is none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckWinner(pub Option<WinResult>);

impl Serialize for CheckWinner {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Some(win) => win.serialize(serializer),
            None => serializer.serialize_bool(false),
        }
    }
}

impl<'de> Deserialize<'de> for CheckWinner {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Win(WinResult),
            Flag(bool),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Win(win) => Ok(CheckWinner(Some(win))),
            Repr::Flag(false) => Ok(CheckWinner(None)),
            Repr::Flag(true) => Err(serde::de::Error::custom(
                "checkWinner must be a win result or false",
            )),
        }
    }
}

/// Payload of `gameState`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatePayload {
    /// Board cells.
    pub cell: Board,
    /// Whether X moves next.
    pub is_x_next: bool,
    /// Win produced by the change, absent on join.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_winner: Option<CheckWinner>,
    /// Whether the change was a reset, absent on join.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset: Option<bool>,
    /// Score of X.
    pub x: u32,
    /// Score of O.
    pub o: u32,
}

impl GameStatePayload {
    /// State sent to the session when a member joins.
    pub fn joined(view: &SessionView) -> Self {
        Self {
            cell: view.board().clone(),
            is_x_next: view.is_x_next(),
            check_winner: None,
            reset: None,
            x: view.scores().x,
            o: view.scores().o,
        }
    }

    /// State sent to the session after a move, reset or skip.
    pub fn after(view: &SessionView, change: StateChange) -> Self {
        Self {
            cell: view.board().clone(),
            is_x_next: view.is_x_next(),
            check_winner: Some(CheckWinner(change.win())),
            reset: Some(change.is_reset()),
            x: view.scores().x,
            o: view.scores().o,
        }
    }
}

/// Payload of `setNewGame`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGamePayload {
    /// Board cells.
    pub cell: Board,
    /// Whether X moves next.
    pub is_x_next: bool,
    /// Always `false` for a fresh session.
    pub check_winner: CheckWinner,
}

impl NewGamePayload {
    /// Fresh session state.
    pub fn fresh(view: &SessionView) -> Self {
        Self {
            cell: view.board().clone(),
            is_x_next: view.is_x_next(),
            check_winner: CheckWinner(None),
        }
    }
}

/// Payload of `broadcast`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatBroadcast {
    /// Message text.
    pub message: String,
    /// Sender label.
    pub host: serde_json::Value,
}

/// Events emitted by the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// A session was created for the sender.
    #[serde(rename = "gameCreated")]
    GameCreated(SessionId),
    /// Shared board, turn and score state.
    #[serde(rename = "gameState")]
    GameState(GameStatePayload),
    /// A signal from this connection was rejected.
    #[serde(rename = "error")]
    Error(String),
    /// The turn was skipped.
    #[serde(rename = "turnSkipped")]
    TurnSkipped,
    /// A member asked to clear the board.
    #[serde(rename = "confirmClear")]
    ConfirmClear(serde_json::Value),
    /// A member asked to change the rules.
    #[serde(rename = "confirmChange")]
    ConfirmChange(serde_json::Value),
    /// The rule change was confirmed.
    #[serde(rename = "rulesChanged")]
    RulesChanged,
    /// The session was replaced by a fresh one.
    #[serde(rename = "setNewGame")]
    SetNewGame(NewGamePayload),
    /// Chat message.
    #[serde(rename = "broadcast")]
    Broadcast(ChatBroadcast),
}

impl ServerEvent {
    /// Event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::GameCreated(_) => "gameCreated",
            ServerEvent::GameState(_) => "gameState",
            ServerEvent::Error(_) => "error",
            ServerEvent::TurnSkipped => "turnSkipped",
            ServerEvent::ConfirmClear(_) => "confirmClear",
            ServerEvent::ConfirmChange(_) => "confirmChange",
            ServerEvent::RulesChanged => "rulesChanged",
            ServerEvent::SetNewGame(_) => "setNewGame",
            ServerEvent::Broadcast(_) => "broadcast",
        }
    }
}
