//! Error types for the rules engine.

use lastcard_protocol::{CardId, Phase};

/// Why a move was refused.
///
/// Every variant is recoverable and local to the actor who tried the
/// move: the table is left exactly as it was and nobody else is told.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// The match is not in a phase that accepts moves.
    #[error("the game is not in progress (currently {0})")]
    NotPlaying(Phase),

    #[error("the game is over")]
    GameOver,

    /// The actor holds no seat at this table.
    #[error("you are not seated at this table")]
    NotSeated,

    /// The actor already holds a seat at this table.
    #[error("you are already seated at this table")]
    AlreadySeated,

    /// Both seats are taken, or dealing has already begun.
    #[error("the table is full")]
    RoomFull,

    #[error("it is not your turn")]
    NotYourTurn,

    #[error("card {0} is not in your hand")]
    CardNotInHand(CardId),

    /// A wild card was played without naming a color.
    #[error("choose a color for the wild card")]
    ColorRequired,

    #[error("{card} cannot be played on {top}")]
    IllegalPlay { card: String, top: String },

    /// Last card may only be called with two or fewer cards in hand.
    #[error("cannot call last card while holding {0} cards")]
    TooManyCards(usize),

    /// The computer was asked to move when it does not hold the turn.
    #[error("it is not the computer's turn")]
    NotComputerTurn,
}
