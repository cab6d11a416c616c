//! Single-slot turn clock for Last Card rooms.
//!
//! A room has two time pressures: the human inactivity timeout and the
//! computer's think delay. They must never run together, so the clock
//! has exactly one slot. Arming replaces whatever was armed before.
//!
//! Each alarm carries a guard value `G` captured at arm time (the room
//! uses seat + deal generation). When the alarm fires the guard comes
//! back to the caller, which re-validates it against current state and
//! bails if the world moved on.
//!
//! # Integration
//!
//! The clock sits inside the room actor's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle command, re-arm */ }
//!         alarm = clock.wait() => { /* check alarm.guard, act, re-arm */ }
//!     }
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::trace;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Clock settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockConfig {
    /// Upper bound (exclusive) of the random delay added by
    /// [`TurnClock::arm_with_jitter`]. Zero disables jitter.
    pub jitter_max: Duration,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            jitter_max: Duration::from_millis(400),
        }
    }
}

impl ClockConfig {
    /// A config with no jitter, for exact timing.
    pub fn exact() -> Self {
        Self {
            jitter_max: Duration::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Alarms
// ---------------------------------------------------------------------------

/// Which time pressure an alarm represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlarmKind {
    /// A human held the turn too long.
    TurnTimeout,
    /// The computer's think delay elapsed; it should move now.
    ComputerThink,
}

/// A fired alarm, returned by [`TurnClock::wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alarm<G> {
    pub kind: AlarmKind,
    /// The value captured when the alarm was armed.
    pub guard: G,
}

#[derive(Debug, Clone, Copy)]
struct Slot<G> {
    kind: AlarmKind,
    guard: G,
    deadline: Instant,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Counters for a clock's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClockMetrics {
    /// Times an alarm was armed (including replacements).
    pub armed: u64,
    /// Times a pending alarm was cancelled, explicitly or by replacement.
    pub disarmed: u64,
    /// Times an alarm fired.
    pub fired: u64,
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// One-shot, single-slot alarm clock. One per room actor.
#[derive(Debug)]
pub struct TurnClock<G> {
    config: ClockConfig,
    slot: Option<Slot<G>>,
    metrics: ClockMetrics,
}

impl<G: Copy> TurnClock<G> {
    pub fn new(config: ClockConfig) -> Self {
        Self {
            config,
            slot: None,
            metrics: ClockMetrics::default(),
        }
    }

    /// Arms an alarm that fires `after` from now, replacing any pending
    /// alarm.
    pub fn arm(&mut self, kind: AlarmKind, guard: G, after: Duration) {
        if self.slot.is_some() {
            self.metrics.disarmed += 1;
        }
        self.slot = Some(Slot {
            kind,
            guard,
            deadline: Instant::now() + after,
        });
        self.metrics.armed += 1;
        trace!(?kind, after = ?after, "clock armed");
    }

    /// Like [`arm`](Self::arm), plus a uniform random delay in
    /// `[0, jitter_max)`.
    pub fn arm_with_jitter(&mut self, kind: AlarmKind, guard: G, base: Duration) {
        let jitter = if self.config.jitter_max.is_zero() {
            Duration::ZERO
        } else {
            let max_us = u64::try_from(self.config.jitter_max.as_micros()).unwrap_or(u64::MAX);
            Duration::from_micros(rand::rng().random_range(0..max_us.max(1)))
        };
        self.arm(kind, guard, base + jitter);
    }

    /// Cancels the pending alarm, if any.
    pub fn disarm(&mut self) {
        if let Some(slot) = self.slot.take() {
            self.metrics.disarmed += 1;
            trace!(kind = ?slot.kind, "clock disarmed");
        }
    }

    /// The pending alarm's kind and guard.
    pub fn armed(&self) -> Option<(AlarmKind, G)> {
        self.slot.map(|slot| (slot.kind, slot.guard))
    }

    pub fn is_armed(&self) -> bool {
        self.slot.is_some()
    }

    /// Time left before the pending alarm fires.
    pub fn remaining(&self) -> Option<Duration> {
        self.slot
            .map(|slot| slot.deadline.saturating_duration_since(Instant::now()))
    }

    /// Waits for the pending alarm and returns it, leaving the clock
    /// disarmed.
    ///
    /// While disarmed this future pends forever; `tokio::select!` keeps
    /// serving its other branches. Dropping the future before it
    /// completes leaves the alarm armed.
    pub async fn wait(&mut self) -> Alarm<G> {
        let Some(slot) = self.slot else {
            std::future::pending::<()>().await;
            unreachable!()
        };

        time::sleep_until(slot.deadline).await;

        self.slot = None;
        self.metrics.fired += 1;
        trace!(kind = ?slot.kind, "clock fired");
        Alarm {
            kind: slot.kind,
            guard: slot.guard,
        }
    }

    pub fn metrics(&self) -> &ClockMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }
}

impl<G: Copy> Default for TurnClock<G> {
    fn default() -> Self {
        Self::new(ClockConfig::default())
    }
}
