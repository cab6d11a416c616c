//! Room actor: an isolated Tokio task that owns one table.
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. The task serializes every command and every
//! clock firing, so the table never sees two mutations at once.

use std::collections::HashMap;

use lastcard_clock::{Alarm, AlarmKind, ClockConfig, TurnClock};
use lastcard_engine::{NextStep, RuleError, Table};
use lastcard_protocol::{
    Action, Difficulty, Occupant, Phase, PlayerId, RoomCode, Seat, ServerMessage,
};
use tokio::sync::{mpsc, oneshot};

use crate::{RoomConfig, RoomError};

/// Channel sender for delivering server messages to a player's
/// connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    /// Seat a human player.
    Join {
        player_id: PlayerId,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<Seat, RoomError>>,
    },

    /// Apply an in-room move.
    Act {
        player_id: PlayerId,
        action: Action,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// A member's connection is gone. Ends the match and stops the actor.
    Disconnect {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    Info {
        reply: oneshot::Sender<RoomInfo>,
    },

    Shutdown,
}

/// A snapshot of room metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub code: RoomCode,
    pub phase: Phase,
    pub generation: u64,
    /// Human players, in seat order.
    pub players: Vec<PlayerId>,
    /// The computer's tier, for computer matches.
    pub computer: Option<Difficulty>,
    pub turn: Option<Seat>,
    pub winner: Option<Seat>,
    /// The alarm currently running, if any.
    pub alarm: Option<AlarmKind>,
}

/// Handle to a running room actor.
///
/// Cheap to clone; the `RoomManager` holds one per room.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl std::fmt::Debug for RoomCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Join { player_id, .. } => write!(f, "Join({player_id})"),
            Self::Act {
                player_id, action, ..
            } => write!(f, "Act({player_id}, {action:?})"),
            Self::Disconnect { player_id, .. } => write!(f, "Disconnect({player_id})"),
            Self::Info { .. } => f.write_str("Info"),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    async fn request<T>(
        &self,
        command: RoomCommand,
        reply_rx: oneshot::Receiver<T>,
    ) -> Result<T, RoomError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Seats a human player and returns their seat.
    pub async fn join(&self, player_id: PlayerId, sender: PlayerSender) -> Result<Seat, RoomError> {
        let (reply, reply_rx) = oneshot::channel();
        self.request(
            RoomCommand::Join {
                player_id,
                sender,
                reply,
            },
            reply_rx,
        )
        .await?
    }

    /// Applies an in-room move on behalf of a player.
    pub async fn act(&self, player_id: PlayerId, action: Action) -> Result<(), RoomError> {
        let (reply, reply_rx) = oneshot::channel();
        self.request(
            RoomCommand::Act {
                player_id,
                action,
                reply,
            },
            reply_rx,
        )
        .await?
    }

    /// Reports a member's disconnect. The actor stops afterwards.
    pub async fn disconnect(&self, player_id: PlayerId) -> Result<(), RoomError> {
        let (reply, reply_rx) = oneshot::channel();
        self.request(RoomCommand::Disconnect { player_id, reply }, reply_rx)
            .await?
    }

    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply, reply_rx) = oneshot::channel();
        self.request(RoomCommand::Info { reply }, reply_rx).await
    }

    /// Tells the room to stop without ending the match for anyone.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Whether the actor task has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// What an alarm was armed for: a seat in one deal generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Guard {
    seat: Seat,
    generation: u64,
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    code: RoomCode,
    config: RoomConfig,
    table: Table,
    clock: TurnClock<Guard>,
    /// Per-player outbound channels.
    senders: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop until shutdown, disconnect, or every handle
    /// is dropped.
    async fn run(mut self) {
        tracing::info!(room = %self.code, "room actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    if !self.handle_command(cmd) {
                        break;
                    }
                }
                alarm = self.clock.wait() => self.handle_alarm(alarm),
            }
        }

        self.clock.disarm();
        tracing::info!(room = %self.code, "room actor stopped");
    }

    /// Returns `false` when the actor should stop.
    fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Join {
                player_id,
                sender,
                reply,
            } => {
                let result = self.handle_join(player_id, sender);
                let _ = reply.send(result);
            }
            RoomCommand::Act {
                player_id,
                action,
                reply,
            } => {
                let result = self.handle_action(player_id, action);
                let _ = reply.send(result);
            }
            RoomCommand::Disconnect { player_id, reply } => {
                let result = self.handle_disconnect(player_id);
                let stop = result.is_ok();
                let _ = reply.send(result);
                return !stop;
            }
            RoomCommand::Info { reply } => {
                let _ = reply.send(self.info());
            }
            RoomCommand::Shutdown => {
                tracing::info!(room = %self.code, "room shutting down");
                return false;
            }
        }
        true
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<Seat, RoomError> {
        let seat = self.table.seat_human(player_id).map_err(|e| match e {
            RuleError::RoomFull => RoomError::RoomFull(self.code.clone()),
            RuleError::AlreadySeated => RoomError::AlreadyInRoom(player_id, self.code.clone()),
            other => RoomError::Rule(other),
        })?;
        self.senders.insert(player_id, sender);
        tracing::info!(
            room = %self.code,
            %player_id,
            %seat,
            phase = %self.table.phase(),
            "player joined"
        );
        self.after_change();
        Ok(seat)
    }

    fn handle_action(&mut self, player_id: PlayerId, action: Action) -> Result<(), RoomError> {
        let who = Occupant::Human(player_id);
        let moved = matches!(action, Action::PlayCard { .. } | Action::DrawCard);
        let result = match action {
            Action::AcknowledgeDeal { generation } => self.table.acknowledge_deal(&who, generation),
            Action::PlayCard {
                card_id,
                chosen_color,
            } => self.table.play_card(&who, card_id, chosen_color).map(|()| true),
            Action::DrawCard => self.table.draw_card(&who).map(|()| true),
            Action::CallLastCard => self.table.call_last_card(&who).map(|()| true),
        };

        match result {
            Ok(true) => {
                // A card moved by the turn holder restarts their clock.
                if moved {
                    self.clock.disarm();
                }
                self.after_change();
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(reason) => {
                tracing::debug!(
                    room = %self.code,
                    %player_id,
                    ?action,
                    %reason,
                    "action rejected"
                );
                Err(reason.into())
            }
        }
    }

    fn handle_disconnect(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        if !self.table.abandon(&Occupant::Human(player_id)) {
            return Err(RoomError::NotInRoom(player_id));
        }
        self.senders.remove(&player_id);
        self.clock.disarm();
        self.broadcast();
        tracing::info!(room = %self.code, %player_id, "player disconnected, room closing");
        Ok(())
    }

    fn handle_alarm(&mut self, alarm: Alarm<Guard>) {
        let Guard { seat, generation } = alarm.guard;
        if generation != self.table.generation() {
            tracing::debug!(
                room = %self.code,
                kind = ?alarm.kind,
                generation,
                current = self.table.generation(),
                "stale alarm ignored"
            );
            return;
        }

        match alarm.kind {
            AlarmKind::TurnTimeout => {
                if self.table.expire_turn(seat) {
                    tracing::info!(room = %self.code, %seat, "turn timed out");
                    self.after_change();
                }
            }
            AlarmKind::ComputerThink => {
                if self.table.next_step() != NextStep::ComputerThink(seat) {
                    tracing::debug!(room = %self.code, %seat, "stale computer think ignored");
                    return;
                }
                match self.table.computer_turn() {
                    Ok(()) => self.after_change(),
                    Err(reason) => {
                        tracing::warn!(room = %self.code, %reason, "computer move refused");
                        self.rearm();
                    }
                }
            }
        }
    }

    /// Pushes fresh views, then picks the one alarm the new state needs.
    fn after_change(&mut self) {
        self.broadcast();
        self.rearm();
    }

    /// Arms the alarm `next_step` calls for. A pending alarm with the
    /// same kind and guard keeps its deadline, so changes that leave the
    /// turn where it was cannot postpone a timeout or a computer move.
    fn rearm(&mut self) {
        let generation = self.table.generation();
        let (kind, seat) = match self.table.next_step() {
            NextStep::Idle => {
                self.clock.disarm();
                return;
            }
            NextStep::HumanTimeout(seat) => (AlarmKind::TurnTimeout, seat),
            NextStep::ComputerThink(seat) => (AlarmKind::ComputerThink, seat),
        };
        let guard = Guard { seat, generation };
        if self.clock.armed() == Some((kind, guard)) {
            tracing::trace!(room = %self.code, ?kind, %seat, "alarm already pending");
            return;
        }

        match kind {
            AlarmKind::TurnTimeout => self.clock.arm(kind, guard, self.config.turn_timeout),
            AlarmKind::ComputerThink => {
                let difficulty = self.table.difficulty().unwrap_or_default();
                self.clock.arm_with_jitter(
                    kind,
                    guard,
                    self.config.think_time.for_difficulty(difficulty),
                );
            }
        }
    }

    /// Sends each human their own view. Silently drops if a receiver is
    /// gone.
    fn broadcast(&self) {
        for (player_id, view) in self.table.human_views() {
            let Some(sender) = self.senders.get(&player_id) else {
                continue;
            };
            if sender.send(ServerMessage::State { view }).is_err() {
                tracing::warn!(room = %self.code, %player_id, "player channel closed");
            }
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            code: self.code.clone(),
            phase: self.table.phase(),
            generation: self.table.generation(),
            players: self.table.humans().map(|(_, pid)| pid).collect(),
            computer: self.table.difficulty(),
            turn: self.table.turn(),
            winner: self.table.winner(),
            alarm: self.clock.armed().map(|(kind, _)| kind),
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
///
/// With `computer` set, the second seat is taken by the computer
/// opponent before anyone joins, so the first human to join starts the
/// deal.
pub(crate) fn spawn_room(
    code: RoomCode,
    config: RoomConfig,
    computer: Option<Difficulty>,
) -> Result<RoomHandle, RoomError> {
    let (tx, rx) = mpsc::channel(config.channel_size.max(1));

    let mut table = Table::new(code.clone());
    if let Some(difficulty) = computer {
        table.attach_computer(difficulty)?;
    }

    let clock = TurnClock::new(ClockConfig {
        jitter_max: config.think_jitter,
    });
    let actor = RoomActor {
        code: code.clone(),
        config,
        table,
        clock,
        senders: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    Ok(RoomHandle { code, sender: tx })
}
