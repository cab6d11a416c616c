//! Messages exchanged with clients.
//!
//! - [`Intent`]: what a client asks for (client → server).
//! - [`Action`]: the subset of intents that target one existing room.
//! - [`PlayerView`]: one recipient's picture of a room (server → client).
//! - [`ServerMessage`]: everything the server pushes to a connection.
//!
//! All enums are internally tagged by `"type"` with kebab-case names, so
//! a play looks like:
//!
//! ```json
//! { "type": "play-card", "code": "K7QX2", "card_id": 41, "chosen_color": "blue" }
//! ```

use serde::{Deserialize, Serialize};

use crate::{Card, CardId, Color, Difficulty, Effect, Phase, RoomCode, Seat};

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// A named player intent, as delivered by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Intent {
    /// Open a new room and take seat 0.
    CreateRoom,

    /// Open a new room against the computer opponent. Dealing starts
    /// immediately.
    CreateComputerRoom {
        #[serde(default)]
        difficulty: Difficulty,
    },

    /// Take the free seat in an existing room.
    JoinRoom { code: RoomCode },

    /// "My deal-in animation for this generation is done."
    DealAcknowledged { code: RoomCode, generation: u64 },

    PlayCard {
        code: RoomCode,
        card_id: CardId,
        /// Required when the card is a wild.
        #[serde(default)]
        chosen_color: Option<Color>,
    },

    DrawCard { code: RoomCode },

    CallLastCard { code: RoomCode },

    /// The connection is gone. Ends every match the player is in.
    Disconnect,
}

impl Intent {
    /// Splits a room-scoped intent into its target room and action.
    ///
    /// Returns `None` for intents that create, join, or leave rooms.
    pub fn into_room_action(self) -> Option<(RoomCode, Action)> {
        match self {
            Self::DealAcknowledged { code, generation } => {
                Some((code, Action::AcknowledgeDeal { generation }))
            }
            Self::PlayCard {
                code,
                card_id,
                chosen_color,
            } => Some((
                code,
                Action::PlayCard {
                    card_id,
                    chosen_color,
                },
            )),
            Self::DrawCard { code } => Some((code, Action::DrawCard)),
            Self::CallLastCard { code } => Some((code, Action::CallLastCard)),
            Self::CreateRoom
            | Self::CreateComputerRoom { .. }
            | Self::JoinRoom { .. }
            | Self::Disconnect => None,
        }
    }
}

/// An in-room move by a seated player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Action {
    AcknowledgeDeal { generation: u64 },
    PlayCard {
        card_id: CardId,
        chosen_color: Option<Color>,
    },
    DrawCard,
    CallLastCard,
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// What a recipient knows about the other seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentInfo {
    pub computer: bool,
    pub difficulty: Option<Difficulty>,
}

/// One recipient's view of a room.
///
/// Each human seat gets its own view after every state change. The
/// opponent's hand is reduced to a count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub code: RoomCode,
    /// The recipient's own seat.
    pub seat: Seat,
    pub generation: u64,
    pub phase: Phase,
    /// Milliseconds since the UNIX epoch of the last state-affecting event.
    pub updated_at: u64,
    pub effect: Option<Effect>,
    pub hand: Vec<Card>,
    pub opponent_card_count: usize,
    pub discard_top: Option<Card>,
    pub draw_pile_count: usize,
    pub turn: Option<Seat>,
    pub game_over: bool,
    pub winner: Option<Seat>,
    pub message: String,
    /// `None` while the second seat is empty.
    pub opponent: Option<OpponentInfo>,
}

impl PlayerView {
    /// Whether it is the recipient's move.
    pub fn is_my_turn(&self) -> bool {
        self.turn == Some(self.seat)
    }
}

/// Everything the server pushes to a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Reply to create/join: the room code and the seat taken.
    RoomJoined { code: RoomCode, seat: Seat },

    /// Fresh room state for this recipient.
    State { view: PlayerView },

    /// An intent from this connection was rejected. Nobody else sees it.
    Error { message: String },
}
