//! Rules engine for Last Card.
//!
//! Pure and synchronous: no tasks, no timers. A [`Table`] is driven by
//! method calls and reports which alarm should run next through
//! [`Table::next_step`]; the room actor owns the clock.
//!
//! # Key types
//!
//! - [`Table`]: one match: seats, hands, piles, phase, turn
//! - [`Piles`]: draw and discard piles with recycling
//! - [`RuleError`]: why a move was refused
//! - [`Decision`]: what the computer opponent chose

mod computer;
mod deck;
mod error;
mod rules;
mod table;
mod view;

pub use computer::{Choice, Decision, decide, pick_color};
pub use deck::{DECK_SIZE, Piles, build_deck, shuffle};
pub use error::RuleError;
pub use rules::{can_play, describe};
pub use table::{HAND_SIZE, LAST_CARD_LIMIT, NextStep, PENALTY_CARDS, Table};
