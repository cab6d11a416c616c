//! The lobby: where a transport hands over player intents.
//!
//! A transport owns connections and player identity. For each inbound
//! intent it calls [`Lobby::dispatch`] (or [`Lobby::dispatch_bytes`]
//! with the raw frame) together with that connection's outbound channel.
//! Room views arrive on the channel; the return value is the direct
//! reply to this intent, if there is one.

use lastcard_protocol::{Codec, Intent, JsonCodec, PlayerId, RoomCode, ServerMessage};
use lastcard_room::{PlayerSender, RoomConfig, RoomError, RoomManager};
use tokio::sync::Mutex;

use crate::LastCardError;

/// Shared entry point for every connection. Wrap in an `Arc` to share
/// across connection tasks.
pub struct Lobby<C: Codec = JsonCodec> {
    rooms: Mutex<RoomManager>,
    codec: C,
}

impl Lobby<JsonCodec> {
    pub fn new(config: RoomConfig) -> Self {
        Self::with_codec(config, JsonCodec)
    }
}

impl Default for Lobby<JsonCodec> {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}

impl<C: Codec> Lobby<C> {
    pub fn with_codec(config: RoomConfig, codec: C) -> Self {
        Self {
            rooms: Mutex::new(RoomManager::new(config)),
            codec,
        }
    }

    /// Routes one intent from `player_id`.
    ///
    /// Returns `Some(RoomJoined)` for create/join, `None` for everything
    /// else. A refused intent comes back as `Err` and nobody else hears
    /// about it.
    pub async fn dispatch(
        &self,
        player_id: PlayerId,
        intent: Intent,
        sender: &PlayerSender,
    ) -> Result<Option<ServerMessage>, LastCardError> {
        tracing::debug!(%player_id, ?intent, "intent received");

        match intent {
            Intent::CreateRoom => {
                let (code, seat) = self
                    .rooms
                    .lock()
                    .await
                    .create_room(player_id, sender.clone())
                    .await?;
                Ok(Some(ServerMessage::RoomJoined { code, seat }))
            }
            Intent::CreateComputerRoom { difficulty } => {
                let (code, seat) = self
                    .rooms
                    .lock()
                    .await
                    .create_computer_room(player_id, difficulty, sender.clone())
                    .await?;
                Ok(Some(ServerMessage::RoomJoined { code, seat }))
            }
            Intent::JoinRoom { code } => {
                let code = normalize(code);
                let seat = self
                    .rooms
                    .lock()
                    .await
                    .join_room(player_id, &code, sender.clone())
                    .await?;
                Ok(Some(ServerMessage::RoomJoined { code, seat }))
            }
            Intent::Disconnect => {
                match self.rooms.lock().await.disconnect(player_id).await {
                    Ok(_) | Err(RoomError::NotInRoom(_)) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            }
            room_scoped => {
                let Some((code, action)) = room_scoped.into_room_action() else {
                    return Ok(None);
                };
                let code = normalize(code);
                // Release the registry before waiting on the room.
                let handle = self.rooms.lock().await.route(player_id, &code)?;
                handle.act(player_id, action).await?;
                Ok(None)
            }
        }
    }

    /// Decodes a raw intent, dispatches it, and encodes the reply.
    ///
    /// Malformed input and refused intents both become an encoded
    /// `error` message for this connection only. `Err` is returned only
    /// if the reply itself cannot be encoded.
    pub async fn dispatch_bytes(
        &self,
        player_id: PlayerId,
        data: &[u8],
        sender: &PlayerSender,
    ) -> Result<Option<Vec<u8>>, LastCardError> {
        let reply = match self.codec.decode::<Intent>(data) {
            Ok(intent) => match self.dispatch(player_id, intent, sender).await {
                Ok(reply) => reply,
                Err(e) => Some(rejection(player_id, &e)),
            },
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "failed to decode intent");
                Some(ServerMessage::Error {
                    message: e.to_string(),
                })
            }
        };

        reply
            .map(|msg| self.codec.encode(&msg))
            .transpose()
            .map_err(LastCardError::from)
    }

    /// Ends whatever match the player is in; for transports to call when
    /// a connection drops without a `disconnect` intent.
    pub async fn disconnect(&self, player_id: PlayerId) {
        if let Err(e) = self.dispatch(player_id, Intent::Disconnect, &closed_sender()).await {
            tracing::warn!(%player_id, error = %e, "disconnect cleanup failed");
        }
    }

    /// Number of live rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.room_count()
    }

    /// The room a player is currently seated in.
    pub async fn player_room(&self, player_id: PlayerId) -> Option<RoomCode> {
        self.rooms.lock().await.player_room(&player_id).cloned()
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }
}

fn normalize(code: RoomCode) -> RoomCode {
    RoomCode::new(code.0)
}

fn rejection(player_id: PlayerId, error: &LastCardError) -> ServerMessage {
    tracing::debug!(%player_id, %error, "intent rejected");
    ServerMessage::Error {
        message: error.to_string(),
    }
}

/// A sender whose receiver is already gone, for intents that never
/// seat anyone.
fn closed_sender() -> PlayerSender {
    tokio::sync::mpsc::unbounded_channel().0
}
