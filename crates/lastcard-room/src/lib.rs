//! Room lifecycle management for Last Card.
//!
//! Each room runs as an isolated Tokio task (actor model) owning one
//! [`Table`](lastcard_engine::Table) and one turn clock.
//!
//! # Key types
//!
//! - [`RoomManager`]: creates/destroys rooms, routes players
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomInfo`]: metadata snapshot of a room
//! - [`RoomConfig`]: timeouts, think times, mailbox size, code length

mod config;
mod error;
mod manager;
mod room;

pub use config::{RoomConfig, ThinkTime};
pub use error::RoomError;
pub use manager::RoomManager;
pub use room::{PlayerSender, RoomHandle, RoomInfo};
