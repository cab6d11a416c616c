//! # Last Card
//!
//! Server-authoritative rooms for a two-player, UNO-style card game.
//!
//! Each room is an isolated actor owning one table: the deck, both
//! hands, the turn, a deal-acknowledgment barrier, and a single turn
//! clock that runs either the human inactivity timeout or the computer
//! opponent's think delay, never both. Transports feed player intents
//! into a [`Lobby`] and forward the per-player views it pushes back.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lastcard::prelude::*;
//!
//! # async fn run() -> Result<(), LastCardError> {
//! init_tracing("info");
//! let lobby = Lobby::new(RoomConfig::default());
//! let (tx, mut views) = tokio::sync::mpsc::unbounded_channel();
//!
//! let reply = lobby.dispatch(PlayerId(1), Intent::CreateRoom, &tx).await?;
//! // reply: Some(ServerMessage::RoomJoined { code, seat })
//! // views: ServerMessage::State { .. } after every change
//! # let _ = (reply, views.recv().await);
//! # Ok(())
//! # }
//! ```

mod error;
mod lobby;
mod logging;

pub use error::LastCardError;
pub use lobby::Lobby;
pub use logging::init_tracing;

pub use lastcard_clock as clock;
pub use lastcard_engine as engine;
pub use lastcard_protocol as protocol;
pub use lastcard_room as room;

pub mod prelude {
    pub use crate::{LastCardError, Lobby, init_tracing};
    pub use lastcard_protocol::{
        Action, Card, CardId, CardKind, Codec, Color, Difficulty, Intent, JsonCodec, Phase,
        PlayerId, PlayerView, RoomCode, Seat, ServerMessage,
    };
    pub use lastcard_room::{PlayerSender, RoomConfig};
}
