//! Error types for the room layer.

use lastcard_engine::RuleError;
use lastcard_protocol::{PlayerId, RoomCode};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No live room has this code.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// Both seats are taken, or the match already started.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// The player already holds a seat in a live room.
    #[error("player {0} is already in room {1}")]
    AlreadyInRoom(PlayerId, RoomCode),

    #[error("player {0} is not in a room")]
    NotInRoom(PlayerId),

    /// The room's command channel is full or closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),

    /// The table refused the move.
    #[error(transparent)]
    Rule(#[from] RuleError),
}
