//! Room configuration.

use std::time::Duration;

use lastcard_protocol::Difficulty;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration shared by every room a manager creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// How long a human may hold the turn before it passes.
    pub turn_timeout: Duration,

    /// Base think delay for the computer opponent, per tier.
    pub think_time: ThinkTime,

    /// Upper bound of the random delay added to every computer think.
    pub think_jitter: Duration,

    /// Capacity of each room actor's command mailbox.
    pub channel_size: usize,

    /// Length of generated room codes.
    pub code_length: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            turn_timeout: Duration::from_secs(30),
            think_time: ThinkTime::default(),
            think_jitter: Duration::from_millis(400),
            channel_size: 64,
            code_length: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// ThinkTime
// ---------------------------------------------------------------------------

/// Computer think delays. Harder tiers answer faster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThinkTime {
    pub easy: Duration,
    pub medium: Duration,
    pub hard: Duration,
}

impl Default for ThinkTime {
    fn default() -> Self {
        Self {
            easy: Duration::from_millis(1600),
            medium: Duration::from_millis(1100),
            hard: Duration::from_millis(700),
        }
    }
}

impl ThinkTime {
    pub fn for_difficulty(&self, difficulty: Difficulty) -> Duration {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}
