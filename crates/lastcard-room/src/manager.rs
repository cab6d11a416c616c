//! Room manager: creates, tracks, and routes players to rooms.

use std::collections::HashMap;

use lastcard_protocol::{Action, Difficulty, PlayerId, RoomCode, Seat};
use rand::Rng;

use crate::room::spawn_room;
use crate::{PlayerSender, RoomConfig, RoomError, RoomHandle, RoomInfo};

/// Characters used in room codes. Omits `0`, `O`, `1` and `I` so codes
/// read back unambiguously.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Manages all live rooms and tracks which player is in which room.
///
/// This is the entry point for room operations from the lobby.
pub struct RoomManager {
    config: RoomConfig,

    /// Live rooms, keyed by code.
    rooms: HashMap<RoomCode, RoomHandle>,

    /// Maps each player to the room they're currently in.
    /// A player can be in at most ONE room at a time.
    player_rooms: HashMap<PlayerId, RoomCode>,
}

impl RoomManager {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            config,
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Opens a new room and seats `player_id` in it.
    pub async fn create_room(
        &mut self,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<(RoomCode, Seat), RoomError> {
        self.open(player_id, sender, None).await
    }

    /// Opens a new room against the computer opponent. Dealing starts as
    /// soon as `player_id` is seated.
    pub async fn create_computer_room(
        &mut self,
        player_id: PlayerId,
        difficulty: Difficulty,
        sender: PlayerSender,
    ) -> Result<(RoomCode, Seat), RoomError> {
        self.open(player_id, sender, Some(difficulty)).await
    }

    async fn open(
        &mut self,
        player_id: PlayerId,
        sender: PlayerSender,
        computer: Option<Difficulty>,
    ) -> Result<(RoomCode, Seat), RoomError> {
        self.release_finished(player_id).await?;

        let code = self.generate_code();
        let handle = spawn_room(code.clone(), self.config.clone(), computer)?;
        self.rooms.insert(code.clone(), handle.clone());
        tracing::info!(room = %code, ?computer, "room created");

        match handle.join(player_id, sender).await {
            Ok(seat) => {
                self.player_rooms.insert(player_id, code.clone());
                Ok((code, seat))
            }
            Err(e) => {
                self.rooms.remove(&code);
                let _ = handle.shutdown().await;
                Err(e)
            }
        }
    }

    /// Seats a player in an existing room.
    ///
    /// Enforces the "one room at a time" invariant.
    pub async fn join_room(
        &mut self,
        player_id: PlayerId,
        code: &RoomCode,
        sender: PlayerSender,
    ) -> Result<Seat, RoomError> {
        self.release_finished(player_id).await?;

        let handle = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        let seat = handle.join(player_id, sender).await?;
        self.player_rooms.insert(player_id, code.clone());
        Ok(seat)
    }

    /// Routes an in-room move to the player's room.
    pub async fn act(
        &self,
        player_id: PlayerId,
        code: &RoomCode,
        action: Action,
    ) -> Result<(), RoomError> {
        self.route(player_id, code)?.act(player_id, action).await
    }

    /// Returns a handle to `code` if `player_id` is a member of it.
    ///
    /// Callers holding the manager behind a lock can clone the handle
    /// out and release the lock before awaiting the room.
    pub fn route(&self, player_id: PlayerId, code: &RoomCode) -> Result<RoomHandle, RoomError> {
        let handle = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        if self.player_rooms.get(&player_id) != Some(code) {
            return Err(RoomError::NotInRoom(player_id));
        }
        Ok(handle.clone())
    }

    /// Ends the player's match, notifies the other seat, and removes the
    /// room from the registry.
    pub async fn disconnect(&mut self, player_id: PlayerId) -> Result<RoomCode, RoomError> {
        let code = self
            .player_rooms
            .get(&player_id)
            .cloned()
            .ok_or(RoomError::NotInRoom(player_id))?;

        if let Some(handle) = self.rooms.remove(&code) {
            if let Err(e) = handle.disconnect(player_id).await {
                tracing::warn!(
                    room = %code,
                    %player_id,
                    error = %e,
                    "room did not acknowledge disconnect"
                );
            }
        }

        self.player_rooms.retain(|_, c| *c != code);
        tracing::info!(room = %code, %player_id, "room destroyed");
        Ok(code)
    }

    /// Returns info about a specific room.
    pub async fn room_info(&self, code: &RoomCode) -> Result<RoomInfo, RoomError> {
        let handle = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        handle.info().await
    }

    /// Returns the code of the room a player is currently in, if any.
    pub fn player_room(&self, player_id: &PlayerId) -> Option<&RoomCode> {
        self.player_rooms.get(player_id)
    }

    /// Returns the number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Lists all live room codes.
    pub fn room_codes(&self) -> Vec<RoomCode> {
        self.rooms.keys().cloned().collect()
    }

    /// Lets a player whose match is over start or join another one.
    ///
    /// A finished room stays up (showing the result) until a member
    /// leaves it; moving on counts as leaving. A player still in a live
    /// match is refused.
    async fn release_finished(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        let Some(current) = self.player_rooms.get(&player_id).cloned() else {
            return Ok(());
        };
        let finished = match self.rooms.get(&current) {
            Some(handle) => handle
                .info()
                .await
                .map(|info| info.phase.is_terminal())
                .unwrap_or(true),
            None => true,
        };
        if !finished {
            return Err(RoomError::AlreadyInRoom(player_id, current));
        }
        self.disconnect(player_id).await.map(|_| ())
    }

    fn generate_code(&self) -> RoomCode {
        let mut rng = rand::rng();
        let length = self.config.code_length.max(1);
        loop {
            let code: String = (0..length)
                .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
                .collect();
            let code = RoomCode(code);
            if !self.rooms.contains_key(&code) {
                return code;
            }
            tracing::debug!(room = %code, "room code collision, regenerating");
        }
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
