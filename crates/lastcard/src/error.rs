//! Unified error type for the Last Card workspace.

use lastcard_engine::RuleError;
use lastcard_protocol::ProtocolError;
use lastcard_room::RoomError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum LastCardError {
    /// Bytes that are not a valid intent, or a reply that failed to encode.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, full, unavailable).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A move the table refused.
    #[error(transparent)]
    Rule(#[from] RuleError),
}

impl LastCardError {
    /// The rule violation behind this error, wherever it was raised.
    pub fn rule(&self) -> Option<&RuleError> {
        match self {
            Self::Rule(e) | Self::Room(RoomError::Rule(e)) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use lastcard_protocol::{PlayerId, RoomCode};

    use super::*;

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let lastcard_err: LastCardError = err.into();
        assert!(matches!(lastcard_err, LastCardError::Protocol(_)));
        assert!(lastcard_err.to_string().contains("bad"));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::NotFound(RoomCode::new("ABCDE"));
        let lastcard_err: LastCardError = err.into();
        assert!(matches!(lastcard_err, LastCardError::Room(_)));
        assert_eq!(lastcard_err.to_string(), "room ABCDE not found");
    }

    #[test]
    fn test_rule_found_through_room_error() {
        let err: LastCardError = RoomError::Rule(RuleError::NotYourTurn).into();
        assert_eq!(err.rule(), Some(&RuleError::NotYourTurn));
        assert_eq!(err.to_string(), "it is not your turn");

        let err: LastCardError = RoomError::NotInRoom(PlayerId(4)).into();
        assert_eq!(err.rule(), None);
    }
}
