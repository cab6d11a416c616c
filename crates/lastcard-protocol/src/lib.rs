//! Wire protocol for Last Card.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Identity & table types** ([`PlayerId`], [`RoomCode`], [`Seat`],
//!   [`Occupant`], [`Phase`]) shared by every layer.
//! - **Cards** ([`Card`], [`CardKind`], [`Color`]).
//! - **Messages** ([`Intent`], [`Action`], [`PlayerView`],
//!   [`ServerMessage`]).
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages
//!   become bytes.
//!
//! It knows nothing about rules or rooms; the engine and room crates
//! build on these types.

mod card;
mod codec;
mod error;
mod message;
mod types;

pub use card::{Card, CardId, CardKind, Color};
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use message::{Action, Intent, OpponentInfo, PlayerView, ServerMessage};
pub use types::{Difficulty, Effect, Occupant, Phase, PlayerId, RoomCode, Seat};
