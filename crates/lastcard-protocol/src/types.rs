//! Identity and table-shape types shared by every layer.
//!
//! These are the small value types that appear both in the engine's
//! bookkeeping and on the wire: who a player is, which room they are in,
//! which seat they hold, and what phase the match is in.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a connected human player.
///
/// Owned by the transport layer; rooms only record it. Serialized as a
/// plain number (`#[serde(transparent)]`), so `PlayerId(42)` is `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// The short shareable code that names a room, e.g. `"K7QX2"`.
///
/// Codes are the registry key for live rooms. They are only unique among
/// rooms that currently exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(pub String);

impl RoomCode {
    /// Wraps a code, normalising it to upper case so clients can type
    /// it in either case.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Seats
// ---------------------------------------------------------------------------

/// One of the two player slots at a table.
///
/// Serialized as the seat index (`0` or `1`) because that is what the
/// client uses to lay out "you" and "opponent".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    /// Both seats, in dealing order.
    pub const ALL: [Seat; 2] = [Seat::First, Seat::Second];

    /// The seat across the table.
    pub fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }

    /// Index into per-seat arrays.
    pub fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

impl From<Seat> for u8 {
    fn from(seat: Seat) -> u8 {
        seat.index() as u8
    }
}

impl TryFrom<u8> for Seat {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::First),
            1 => Ok(Self::Second),
            other => Err(format!("seat index out of range: {other}")),
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seat {}", self.index())
    }
}

/// Who sits in a seat.
///
/// The computer opponent is a sentinel rather than a fake player id, so
/// every rule that asks "who is acting?" gets a closed answer. Both
/// variants go through the same play/draw/timeout entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "kebab-case")]
pub enum Occupant {
    Human(PlayerId),
    Computer,
}

impl Occupant {
    pub fn is_computer(&self) -> bool {
        matches!(self, Self::Computer)
    }

    /// The player id, if this is a human seat.
    pub fn player_id(&self) -> Option<PlayerId> {
        match self {
            Self::Human(pid) => Some(*pid),
            Self::Computer => None,
        }
    }
}

impl fmt::Display for Occupant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Human(pid) => write!(f, "{pid}"),
            Self::Computer => f.write_str("Computer"),
        }
    }
}

/// Strength tier of the computer opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => f.write_str("easy"),
            Self::Medium => f.write_str("medium"),
            Self::Hard => f.write_str("hard"),
        }
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The lifecycle phase of a match.
///
/// ```text
/// Waiting → Dealing → Playing → GameOver
/// ```
///
/// - **Waiting**: room exists, second seat empty.
/// - **Dealing**: both seats filled, hands dealt, clients animating the
///   deal. No turn timer runs.
/// - **Playing**: every occupied seat acknowledged the deal; turns run.
/// - **GameOver**: terminal. Someone emptied their hand or a player left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Waiting,
    Dealing,
    Playing,
    #[serde(rename = "gameover")]
    GameOver,
}

impl Phase {
    /// Returns `true` if a second player may still take a seat.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` once the match has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::GameOver)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => f.write_str("waiting"),
            Self::Dealing => f.write_str("dealing"),
            Self::Playing => f.write_str("playing"),
            Self::GameOver => f.write_str("gameover"),
        }
    }
}

/// A one-shot visual effect the client should play for the latest move.
///
/// Set when the move happens, cleared by the next mutation of the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    #[serde(rename = "wild4")]
    WildDrawFour,
}
