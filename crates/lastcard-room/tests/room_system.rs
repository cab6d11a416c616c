//! Integration tests for room actors and the room manager.
//!
//! Time is paused, so a `sleep` past the turn timeout fires the room's
//! clock deterministically.

use std::time::Duration;

use lastcard_clock::AlarmKind;
use lastcard_engine::RuleError;
use lastcard_protocol::{
    Action, Difficulty, Phase, PlayerId, PlayerView, RoomCode, Seat, ServerMessage,
};
use lastcard_room::{PlayerSender, RoomConfig, RoomError, RoomManager};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

fn pid(id: u64) -> PlayerId {
    PlayerId(id)
}

fn channel() -> (PlayerSender, mpsc::UnboundedReceiver<ServerMessage>) {
    mpsc::unbounded_channel()
}

/// Creates a dummy player sender (receiver is dropped immediately).
fn dummy_sender() -> PlayerSender {
    mpsc::unbounded_channel().0
}

/// Every view waiting in a player's channel, oldest first.
fn drain(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Vec<PlayerView> {
    let mut views = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        if let ServerMessage::State { view } = msg {
            views.push(view);
        }
    }
    views
}

struct Match {
    mgr: RoomManager,
    code: RoomCode,
    rx1: mpsc::UnboundedReceiver<ServerMessage>,
    rx2: mpsc::UnboundedReceiver<ServerMessage>,
}

/// Two humans seated and dealt, not yet acknowledged.
async fn dealt_match() -> Match {
    let mut mgr = RoomManager::default();
    let (tx1, rx1) = channel();
    let (tx2, rx2) = channel();
    let (code, _) = mgr.create_room(pid(1), tx1).await.unwrap();
    mgr.join_room(pid(2), &code, tx2).await.unwrap();
    Match { mgr, code, rx1, rx2 }
}

/// Two humans in the playing phase, channels drained.
async fn playing_match() -> Match {
    let mut m = dealt_match().await;
    let generation = m.mgr.room_info(&m.code).await.unwrap().generation;
    for player in [pid(1), pid(2)] {
        m.mgr
            .act(player, &m.code, Action::AcknowledgeDeal { generation })
            .await
            .unwrap();
    }
    drain(&mut m.rx1);
    drain(&mut m.rx2);
    m
}

fn player_at(seat: Seat) -> PlayerId {
    match seat {
        Seat::First => pid(1),
        Seat::Second => pid(2),
    }
}

// =========================================================================
// Creating and joining
// =========================================================================

#[tokio::test]
async fn test_create_room_seats_creator_first() {
    let mut mgr = RoomManager::default();
    let (code, seat) = mgr.create_room(pid(1), dummy_sender()).await.unwrap();

    assert_eq!(seat, Seat::First);
    assert_eq!(code.as_str().len(), 5);
    assert!(code.as_str().chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    assert_eq!(mgr.room_count(), 1);
    assert_eq!(mgr.player_room(&pid(1)), Some(&code));

    let info = mgr.room_info(&code).await.unwrap();
    assert_eq!(info.phase, Phase::Waiting);
    assert_eq!(info.players, vec![pid(1)]);
    assert_eq!(info.alarm, None);
}

#[tokio::test]
async fn test_create_room_codes_are_unique() {
    let mut mgr = RoomManager::new(RoomConfig {
        code_length: 2,
        ..RoomConfig::default()
    });
    for i in 0..50 {
        mgr.create_room(pid(i), dummy_sender()).await.unwrap();
    }
    let mut codes = mgr.room_codes();
    codes.sort();
    codes.dedup();
    assert_eq!(codes.len(), 50);
}

#[tokio::test]
async fn test_join_room_deals_to_both_players() {
    let mut m = dealt_match().await;

    let first = drain(&mut m.rx1);
    let second = drain(&mut m.rx2);
    let last1 = first.last().unwrap();
    let last2 = second.last().unwrap();

    assert_eq!(last1.phase, Phase::Dealing);
    assert_eq!(last1.generation, 1);
    assert_eq!(last1.seat, Seat::First);
    assert_eq!(last2.seat, Seat::Second);
    assert_eq!(last1.hand.len(), 7);
    assert_eq!(last1.opponent_card_count, 7);
    assert_eq!(last1.message, last2.message);

    let info = m.mgr.room_info(&m.code).await.unwrap();
    assert_eq!(info.alarm, None, "no timer runs while dealing");
}

#[tokio::test]
async fn test_join_room_lowercase_code_finds_room() {
    let mut mgr = RoomManager::default();
    let (code, _) = mgr.create_room(pid(1), dummy_sender()).await.unwrap();
    let typed = RoomCode::new(code.as_str().to_lowercase());
    assert_eq!(mgr.join_room(pid(2), &typed, dummy_sender()).await.unwrap(), Seat::Second);
}

#[tokio::test]
async fn test_join_room_not_found() {
    let mut mgr = RoomManager::default();
    let result = mgr.join_room(pid(1), &RoomCode::new("NOPE1"), dummy_sender()).await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}

#[tokio::test]
async fn test_join_room_full() {
    let mut m = dealt_match().await;
    let result = m.mgr.join_room(pid(3), &m.code, dummy_sender()).await;
    assert!(matches!(result, Err(RoomError::RoomFull(_))));
    assert_eq!(m.mgr.player_room(&pid(3)), None);
}

#[tokio::test]
async fn test_player_in_live_match_cannot_open_another() {
    let mut m = dealt_match().await;
    let result = m.mgr.create_room(pid(1), dummy_sender()).await;
    assert!(matches!(result, Err(RoomError::AlreadyInRoom(_, _))));
    assert_eq!(m.mgr.room_count(), 1);
}

// =========================================================================
// Deal acknowledgment
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_both_acks_start_play_and_arm_timeout() {
    let mut m = dealt_match().await;
    let generation = m.mgr.room_info(&m.code).await.unwrap().generation;

    m.mgr
        .act(pid(1), &m.code, Action::AcknowledgeDeal { generation })
        .await
        .unwrap();
    let info = m.mgr.room_info(&m.code).await.unwrap();
    assert_eq!(info.phase, Phase::Dealing);
    assert_eq!(info.alarm, None);

    m.mgr
        .act(pid(2), &m.code, Action::AcknowledgeDeal { generation })
        .await
        .unwrap();
    let info = m.mgr.room_info(&m.code).await.unwrap();
    assert_eq!(info.phase, Phase::Playing);
    assert_eq!(info.alarm, Some(AlarmKind::TurnTimeout));

    let last = drain(&mut m.rx1).pop().unwrap();
    assert_eq!(last.phase, Phase::Playing);
}

#[tokio::test]
async fn test_stale_ack_is_ignored_without_broadcast() {
    let mut m = dealt_match().await;
    drain(&mut m.rx1);
    drain(&mut m.rx2);

    m.mgr
        .act(pid(1), &m.code, Action::AcknowledgeDeal { generation: 0 })
        .await
        .unwrap();

    assert!(drain(&mut m.rx1).is_empty());
    assert!(drain(&mut m.rx2).is_empty());
    assert_eq!(m.mgr.room_info(&m.code).await.unwrap().phase, Phase::Dealing);
}

// =========================================================================
// Moves and timeouts
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_out_of_turn_move_rejected_privately() {
    let mut m = playing_match().await;
    let holder = m.mgr.room_info(&m.code).await.unwrap().turn.unwrap();
    let waiting = player_at(holder.other());

    let result = m.mgr.act(waiting, &m.code, Action::DrawCard).await;
    assert!(matches!(result, Err(RoomError::Rule(RuleError::NotYourTurn))));
    assert!(drain(&mut m.rx1).is_empty());
    assert!(drain(&mut m.rx2).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_act_from_outsider_rejected() {
    let m = playing_match().await;
    let result = m.mgr.act(pid(9), &m.code, Action::DrawCard).await;
    assert!(matches!(result, Err(RoomError::NotInRoom(_))));
}

#[tokio::test(start_paused = true)]
async fn test_draw_broadcasts_to_both_players() {
    let mut m = playing_match().await;
    let holder = m.mgr.room_info(&m.code).await.unwrap().turn.unwrap();

    m.mgr
        .act(player_at(holder), &m.code, Action::DrawCard)
        .await
        .unwrap();

    let v1 = drain(&mut m.rx1);
    let v2 = drain(&mut m.rx2);
    assert_eq!(v1.len(), 1);
    assert_eq!(v2.len(), 1);
    assert!(v1[0].message.contains("drew"));
}

#[tokio::test(start_paused = true)]
async fn test_turn_timeout_passes_turn() {
    let mut m = playing_match().await;
    let holder = m.mgr.room_info(&m.code).await.unwrap().turn.unwrap();

    tokio::time::sleep(Duration::from_secs(31)).await;

    let info = m.mgr.room_info(&m.code).await.unwrap();
    assert_eq!(info.turn, Some(holder.other()));
    assert_eq!(info.alarm, Some(AlarmKind::TurnTimeout), "next holder gets a fresh timeout");

    let views = drain(&mut m.rx1);
    assert_eq!(views.len(), 1);
    assert!(views[0].message.ends_with("turn expired"));
    drain(&mut m.rx2);
}

#[tokio::test(start_paused = true)]
async fn test_move_before_timeout_resets_it() {
    let mut m = playing_match().await;
    let holder = m.mgr.room_info(&m.code).await.unwrap().turn.unwrap();

    tokio::time::sleep(Duration::from_secs(20)).await;
    m.mgr
        .act(player_at(holder), &m.code, Action::DrawCard)
        .await
        .unwrap();
    let after_draw = m.mgr.room_info(&m.code).await.unwrap().turn;

    // 20 s later the old deadline has long passed, the new one has not.
    tokio::time::sleep(Duration::from_secs(20)).await;
    let info = m.mgr.room_info(&m.code).await.unwrap();
    assert_eq!(info.turn, after_draw);
    assert!(drain(&mut m.rx1).iter().all(|v| !v.message.ends_with("turn expired")));
}

// =========================================================================
// Computer rooms
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_computer_room_deals_on_creation() {
    let mut mgr = RoomManager::default();
    let (tx, mut rx) = channel();
    let (code, seat) = mgr
        .create_computer_room(pid(1), Difficulty::Hard, tx)
        .await
        .unwrap();

    assert_eq!(seat, Seat::First);
    let info = mgr.room_info(&code).await.unwrap();
    assert_eq!(info.phase, Phase::Dealing);
    assert_eq!(info.players, vec![pid(1)]);
    assert_eq!(info.computer, Some(Difficulty::Hard));

    let view = drain(&mut rx).pop().unwrap();
    let opponent = view.opponent.unwrap();
    assert!(opponent.computer);
    assert_eq!(opponent.difficulty, Some(Difficulty::Hard));
}

#[tokio::test(start_paused = true)]
async fn test_computer_room_arms_exactly_one_alarm() {
    let mut mgr = RoomManager::default();
    let (code, _) = mgr
        .create_computer_room(pid(1), Difficulty::Medium, dummy_sender())
        .await
        .unwrap();
    mgr.act(pid(1), &code, Action::AcknowledgeDeal { generation: 1 })
        .await
        .unwrap();

    let info = mgr.room_info(&code).await.unwrap();
    assert_eq!(info.phase, Phase::Playing);
    let expected = match info.turn.unwrap() {
        Seat::First => AlarmKind::TurnTimeout,
        Seat::Second => AlarmKind::ComputerThink,
    };
    assert_eq!(info.alarm, Some(expected));
}

#[tokio::test(start_paused = true)]
async fn test_computer_eventually_moves() {
    let mut mgr = RoomManager::default();
    let (tx, mut rx) = channel();
    let (code, _) = mgr
        .create_computer_room(pid(1), Difficulty::Easy, tx)
        .await
        .unwrap();
    mgr.act(pid(1), &code, Action::AcknowledgeDeal { generation: 1 })
        .await
        .unwrap();

    // Worst case: the human times out (30 s), then the computer thinks
    // (easy: 1.6 s + up to 0.4 s).
    tokio::time::sleep(Duration::from_secs(33)).await;

    let views = drain(&mut rx);
    assert!(
        views
            .iter()
            .any(|v| v.message.starts_with("Computer") && !v.message.contains("goes first")),
        "messages: {:?}",
        views.iter().map(|v| &v.message).collect::<Vec<_>>()
    );
}

// =========================================================================
// Disconnect
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_disconnect_ends_match_and_removes_room() {
    let mut m = playing_match().await;

    let code = m.mgr.disconnect(pid(1)).await.unwrap();
    assert_eq!(code, m.code);

    let last = drain(&mut m.rx2).pop().unwrap();
    assert_eq!(last.phase, Phase::GameOver);
    assert!(last.game_over);
    assert_eq!(last.winner, Some(Seat::Second));

    assert_eq!(m.mgr.room_count(), 0);
    assert_eq!(m.mgr.player_room(&pid(1)), None);
    assert_eq!(m.mgr.player_room(&pid(2)), None);
    assert!(matches!(m.mgr.room_info(&m.code).await, Err(RoomError::NotFound(_))));
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_stops_timers() {
    let mut m = playing_match().await;
    m.mgr.disconnect(pid(2)).await.unwrap();
    drain(&mut m.rx1);

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(drain(&mut m.rx1).is_empty(), "no timeout after game over");
}

#[tokio::test]
async fn test_disconnect_not_in_room() {
    let mut mgr = RoomManager::default();
    let result = mgr.disconnect(pid(1)).await;
    assert!(matches!(result, Err(RoomError::NotInRoom(_))));
}

#[tokio::test]
async fn test_waiting_room_closes_when_creator_leaves() {
    let mut mgr = RoomManager::default();
    let (code, _) = mgr.create_room(pid(1), dummy_sender()).await.unwrap();
    mgr.disconnect(pid(1)).await.unwrap();

    assert_eq!(mgr.room_count(), 0);
    let result = mgr.join_room(pid(2), &code, dummy_sender()).await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}
