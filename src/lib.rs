//! Tic-tac-toe relay library - shared state for two remote players
//!
//! Keeps the board, turn and score of each two-player session consistent
//! across both participants and relays a handful of signalling messages
//! (chat, rule-change confirmation, turn skip, reset).
//!
//! # Architecture
//!
//! - **Games**: board model and win detection (with an inverted "misère" mode)
//! - **Session**: store of live sessions keyed by short base-36 ids
//! - **Engine**: move, reset, skip and new-game transitions
//! - **Router**: maps inbound signals to outbound events and recipients
//! - **Transport**: WebSocket connection lifecycle on top of axum
//!
//! # Example
//!
//! ```
//! use tictactoe_relay::{ClientEvent, ConnectionId, Relay, ServerEvent};
//!
//! let mut relay = Relay::new();
//! let out = relay.handle(ConnectionId::from(1), ClientEvent::CreateGame);
//! assert!(matches!(out[0].event, ServerEvent::GameCreated(_)));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod engine;
mod error;
mod games;
mod protocol;
mod router;
mod server;
mod session;
mod transport;

// Crate-level exports - Configuration
pub use config::{ConfigError, RelayConfig};

// Crate-level exports - Errors
pub use error::{RelayError, RelayErrorKind};

// Crate-level exports - Game types (tic-tac-toe)
pub use games::tictactoe::{
    Board, CELL_COUNT, InvalidSquare, Square, Symbol, WinLine, WinResult, check_winner, is_full,
};

// Crate-level exports - Sessions and turn engine
pub use engine::{MoveOutcome, Phase, StateChange, TurnEngine};
pub use session::{
    ConnectionId, MAX_MEMBERS, SESSION_ID_LEN, Scores, Session, SessionId, SessionStore,
    SessionView, generate_session_id,
};

// Crate-level exports - Wire protocol and routing
pub use protocol::{
    ChatBroadcast, ChatRequest, CheckWinner, ClientEvent, ConfirmationRequest, GameStatePayload,
    MakeMoveRequest, NewGamePayload, ServerEvent, SkipTurnRequest,
};
pub use router::{Dispatch, Relay};

// Crate-level exports - Transport and server
pub use server::{serve, serve_listener};
pub use transport::{ConnectionRegistry, ConnectionSender, Hub, build_router, run_connection};
