//! The table: authoritative state of one match and its phase machine.
//!
//! A [`Table`] owns everything about a match: seats, hands, piles, whose
//! turn it is, the deal generation and its acknowledgments, last-card
//! calls, and the latest feed message. Every operation either applies
//! completely or returns a [`RuleError`] leaving the table untouched.
//!
//! Timers are not stored here. After each change the room actor asks
//! [`Table::next_step`] which single alarm (if any) should be running.

use std::time::{SystemTime, UNIX_EPOCH};

use lastcard_protocol::{
    Card, CardId, CardKind, Color, Difficulty, Effect, Occupant, Phase, PlayerId, RoomCode, Seat,
};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::computer::{self, Choice};
use crate::deck::Piles;
use crate::rules::{can_play, describe};
use crate::RuleError;

/// Cards dealt to each seat.
pub const HAND_SIZE: usize = 7;

/// Cards drawn for reaching one card without calling it.
pub const PENALTY_CARDS: usize = 2;

/// Last card may be called at this hand size or below.
pub const LAST_CARD_LIMIT: usize = 2;

/// Which alarm should be running for the current state.
///
/// At most one is ever requested, which is what keeps the human timeout
/// and the computer's think time mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Nothing to schedule: not playing, or the game is over.
    Idle,
    /// A human holds the turn; start their inactivity timeout.
    HumanTimeout(Seat),
    /// The computer holds the turn; start its think delay.
    ComputerThink(Seat),
}

/// One match between two seats.
#[derive(Debug)]
pub struct Table {
    code: RoomCode,
    seats: [Option<Occupant>; 2],
    hands: [Vec<Card>; 2],
    piles: Piles,
    phase: Phase,
    turn: Option<Seat>,
    /// Incremented on every deal; stale acknowledgments carry an old value.
    generation: u64,
    acknowledged: [bool; 2],
    called_last_card: [bool; 2],
    winner: Option<Seat>,
    message: String,
    updated_at: u64,
    effect: Option<Effect>,
    computer: Option<Difficulty>,
    rng: StdRng,
}

impl Table {
    /// Creates an empty table in `Waiting`, seeded from the OS.
    pub fn new(code: RoomCode) -> Self {
        Self::with_rng(code, StdRng::from_os_rng())
    }

    /// Creates an empty table with a caller-provided RNG.
    pub fn with_rng(code: RoomCode, rng: StdRng) -> Self {
        Self {
            code,
            seats: [None, None],
            hands: [Vec::new(), Vec::new()],
            piles: Piles::default(),
            phase: Phase::Waiting,
            turn: None,
            generation: 0,
            acknowledged: [false; 2],
            called_last_card: [false; 2],
            winner: None,
            message: "Waiting for an opponent".to_string(),
            updated_at: now_millis(),
            effect: None,
            computer: None,
            rng,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turn(&self) -> Option<Seat> {
        self.turn
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn winner(&self) -> Option<Seat> {
        self.winner
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn updated_at(&self) -> u64 {
        self.updated_at
    }

    pub fn effect(&self) -> Option<Effect> {
        self.effect
    }

    /// The computer's tier, if this is a computer match.
    pub fn difficulty(&self) -> Option<Difficulty> {
        self.computer
    }

    pub fn occupant(&self, seat: Seat) -> Option<Occupant> {
        self.seats[seat.index()]
    }

    /// The seat held by `who`, if any.
    pub fn seat_of(&self, who: &Occupant) -> Option<Seat> {
        Seat::ALL
            .into_iter()
            .find(|seat| self.seats[seat.index()].as_ref() == Some(who))
    }

    pub fn hand(&self, seat: Seat) -> &[Card] {
        &self.hands[seat.index()]
    }

    pub fn discard_top(&self) -> Option<&Card> {
        self.piles.top()
    }

    pub fn draw_pile_len(&self) -> usize {
        self.piles.draw_len()
    }

    pub fn discard_len(&self) -> usize {
        self.piles.discard_len()
    }

    /// Every card the table is holding, across hands and piles.
    pub fn card_count(&self) -> usize {
        self.hands.iter().map(Vec::len).sum::<usize>()
            + self.piles.draw_len()
            + self.piles.discard_len()
    }

    pub fn has_called_last_card(&self, seat: Seat) -> bool {
        self.called_last_card[seat.index()]
    }

    pub fn has_acknowledged(&self, seat: Seat) -> bool {
        self.acknowledged[seat.index()]
    }

    /// Human seats and their players, in seat order.
    pub fn humans(&self) -> impl Iterator<Item = (Seat, PlayerId)> + '_ {
        Seat::ALL.into_iter().filter_map(|seat| {
            self.seats[seat.index()]
                .and_then(|o| o.player_id())
                .map(|pid| (seat, pid))
        })
    }

    /// Which alarm the room should run next.
    pub fn next_step(&self) -> NextStep {
        if self.phase != Phase::Playing {
            return NextStep::Idle;
        }
        let Some(seat) = self.turn else {
            return NextStep::Idle;
        };
        match self.seats[seat.index()] {
            Some(Occupant::Human(_)) => NextStep::HumanTimeout(seat),
            Some(Occupant::Computer) => NextStep::ComputerThink(seat),
            None => NextStep::Idle,
        }
    }

    // -----------------------------------------------------------------------
    // Seating and dealing
    // -----------------------------------------------------------------------

    /// Seats a human in the first free seat. Filling the table deals.
    pub fn seat_human(&mut self, player: PlayerId) -> Result<Seat, RuleError> {
        let who = Occupant::Human(player);
        if self.seat_of(&who).is_some() {
            return Err(RuleError::AlreadySeated);
        }
        if !self.phase.is_joinable() {
            return Err(RuleError::RoomFull);
        }
        let seat = self.free_seat().ok_or(RuleError::RoomFull)?;
        self.seats[seat.index()] = Some(who);
        tracing::info!(room = %self.code, %player, %seat, "player seated");

        if self.free_seat().is_none() {
            self.deal();
        } else {
            self.post(format!("{who} opened the table, waiting for an opponent"));
        }
        Ok(seat)
    }

    /// Puts the computer opponent in the second seat.
    ///
    /// Deals at once if the first seat is already held.
    pub fn attach_computer(&mut self, difficulty: Difficulty) -> Result<Seat, RuleError> {
        if !self.phase.is_joinable() || self.seats[Seat::Second.index()].is_some() {
            return Err(RuleError::RoomFull);
        }
        self.seats[Seat::Second.index()] = Some(Occupant::Computer);
        self.computer = Some(difficulty);
        tracing::info!(room = %self.code, %difficulty, "computer opponent attached");

        if self.free_seat().is_none() {
            self.deal();
        }
        Ok(Seat::Second)
    }

    fn free_seat(&self) -> Option<Seat> {
        Seat::ALL
            .into_iter()
            .find(|seat| self.seats[seat.index()].is_none())
    }

    fn deal(&mut self) {
        self.generation += 1;
        self.acknowledged = [false; 2];
        self.called_last_card = [false; 2];
        self.winner = None;
        self.effect = None;
        self.piles = Piles::shuffled(&mut self.rng);
        self.hands = [Vec::new(), Vec::new()];

        for _ in 0..HAND_SIZE {
            for seat in Seat::ALL {
                if self.seats[seat.index()].is_none() {
                    continue;
                }
                if let Some(card) = self.piles.draw_one(&mut self.rng) {
                    self.hands[seat.index()].push(card);
                }
            }
        }

        if let Some(mut first) = self.piles.draw_one(&mut self.rng) {
            if first.is_wild() {
                first.color = Color::ALL.choose(&mut self.rng).copied();
            }
            self.piles.discard(first);
        }

        self.turn = Some(if self.rng.random_bool(0.5) {
            Seat::First
        } else {
            Seat::Second
        });

        for seat in Seat::ALL {
            if self.seats[seat.index()] == Some(Occupant::Computer) {
                self.acknowledged[seat.index()] = true;
            }
        }

        self.phase = Phase::Dealing;
        tracing::info!(
            room = %self.code,
            generation = self.generation,
            "cards dealt"
        );
        self.post("Dealing cards...".to_string());
    }

    /// Records that a seat finished its deal-in animation.
    ///
    /// Returns `Ok(false)` when the acknowledgment is ignored: wrong
    /// phase, an old generation, or a repeat. Once every occupied seat
    /// has acknowledged, play starts.
    pub fn acknowledge_deal(&mut self, who: &Occupant, generation: u64) -> Result<bool, RuleError> {
        let seat = self.seat_of(who).ok_or(RuleError::NotSeated)?;
        if self.phase != Phase::Dealing || generation != self.generation {
            tracing::debug!(
                room = %self.code,
                %seat,
                generation,
                current = self.generation,
                phase = %self.phase,
                "stale deal acknowledgment ignored"
            );
            return Ok(false);
        }
        if self.acknowledged[seat.index()] {
            return Ok(false);
        }
        self.acknowledged[seat.index()] = true;

        let all_in = Seat::ALL
            .into_iter()
            .filter(|s| self.seats[s.index()].is_some())
            .all(|s| self.acknowledged[s.index()]);
        if all_in {
            self.phase = Phase::Playing;
            let starter = self.turn.map(|s| self.name(s)).unwrap_or_default();
            tracing::info!(room = %self.code, generation, "play started");
            self.post(format!("{starter} goes first"));
        } else {
            self.post(format!("{} is ready", self.name(seat)));
        }
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Moves
    // -----------------------------------------------------------------------

    /// Plays a card from the actor's hand.
    pub fn play_card(
        &mut self,
        who: &Occupant,
        card_id: CardId,
        chosen_color: Option<Color>,
    ) -> Result<(), RuleError> {
        let seat = self.turn_holder(who)?;
        self.resolve_play(seat, card_id, chosen_color, false)
    }

    /// Draws one card; a drawn card that can go straight onto the
    /// discard pile (and is not wild) is played automatically.
    pub fn draw_card(&mut self, who: &Occupant) -> Result<(), RuleError> {
        let seat = self.turn_holder(who)?;
        self.called_last_card[seat.index()] = false;
        self.effect = None;

        let Some(card) = self.piles.draw_one(&mut self.rng) else {
            self.turn = Some(seat.other());
            tracing::debug!(room = %self.code, %seat, "draw impossible, deck exhausted");
            self.post(format!("No cards left to draw, {} passes", self.name(seat)));
            return Ok(());
        };

        let playable = !card.is_wild() && can_play(Some(&card), self.piles.top());
        self.hands[seat.index()].push(card);
        if playable {
            tracing::debug!(
                room = %self.code,
                %seat,
                card = %describe(&card),
                "auto-playing drawn card"
            );
            return self.resolve_play(seat, card.id, None, true);
        }

        self.turn = Some(seat.other());
        tracing::debug!(room = %self.code, %seat, "drew a card, turn passes");
        self.post(format!("{} drew a card", self.name(seat)));
        Ok(())
    }

    /// Declares "last card", waiving the next penalty check.
    pub fn call_last_card(&mut self, who: &Occupant) -> Result<(), RuleError> {
        self.require_playing()?;
        let seat = self.seat_of(who).ok_or(RuleError::NotSeated)?;
        let held = self.hands[seat.index()].len();
        if held > LAST_CARD_LIMIT {
            return Err(RuleError::TooManyCards(held));
        }
        self.called_last_card[seat.index()] = true;
        self.effect = None;
        self.post(format!("{} called last card!", self.name(seat)));
        Ok(())
    }

    /// Lets the computer take its turn through the normal entry points.
    pub fn computer_turn(&mut self) -> Result<(), RuleError> {
        let who = Occupant::Computer;
        let difficulty = self.computer.ok_or(RuleError::NotComputerTurn)?;
        let seat = self.seat_of(&who).ok_or(RuleError::NotComputerTurn)?;
        if self.phase != Phase::Playing || self.turn != Some(seat) {
            return Err(RuleError::NotComputerTurn);
        }

        let decision = computer::decide(
            &self.hands[seat.index()],
            self.piles.top(),
            difficulty,
            &mut self.rng,
        );
        tracing::debug!(room = %self.code, ?decision, "computer decided");

        if decision.call_last_card {
            self.call_last_card(&who)?;
        }
        match decision.choice {
            Choice::Play {
                card_id,
                chosen_color,
            } => self.play_card(&who, card_id, chosen_color),
            Choice::Draw => self.draw_card(&who),
        }
    }

    /// Passes the turn away from `guarded` if it still holds it.
    ///
    /// Returns `false` (and changes nothing) when the timeout is stale:
    /// the turn already moved, or the game is not being played.
    pub fn expire_turn(&mut self, guarded: Seat) -> bool {
        if self.phase != Phase::Playing || self.turn != Some(guarded) {
            tracing::debug!(room = %self.code, %guarded, "stale turn timeout ignored");
            return false;
        }
        self.effect = None;
        self.turn = Some(guarded.other());
        tracing::debug!(room = %self.code, seat = %guarded, "turn expired");
        self.post(format!("{}'s turn expired", self.name(guarded)));
        true
    }

    /// Ends the match because `who` left. The other seat, if it was in a
    /// live game, wins.
    ///
    /// Returns `false` if `who` is not seated here.
    pub fn abandon(&mut self, who: &Occupant) -> bool {
        let Some(seat) = self.seat_of(who) else {
            return false;
        };
        if self.phase == Phase::GameOver {
            return true;
        }
        if matches!(self.phase, Phase::Dealing | Phase::Playing) {
            self.winner = Some(seat.other());
        }
        self.phase = Phase::GameOver;
        self.effect = None;
        tracing::info!(room = %self.code, %seat, "player left, game over");
        self.post(format!("{} left the game", self.name(seat)));
        true
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    fn require_playing(&self) -> Result<(), RuleError> {
        match self.phase {
            Phase::Playing => Ok(()),
            Phase::GameOver => Err(RuleError::GameOver),
            other => Err(RuleError::NotPlaying(other)),
        }
    }

    fn turn_holder(&self, who: &Occupant) -> Result<Seat, RuleError> {
        self.require_playing()?;
        let seat = self.seat_of(who).ok_or(RuleError::NotSeated)?;
        if self.turn != Some(seat) {
            return Err(RuleError::NotYourTurn);
        }
        Ok(seat)
    }

    fn resolve_play(
        &mut self,
        seat: Seat,
        card_id: CardId,
        chosen_color: Option<Color>,
        drawn: bool,
    ) -> Result<(), RuleError> {
        let hand = &self.hands[seat.index()];
        let pos = hand
            .iter()
            .position(|c| c.id == card_id)
            .ok_or(RuleError::CardNotInHand(card_id))?;
        let mut card = hand[pos];

        if card.is_wild() {
            card.color = Some(chosen_color.ok_or(RuleError::ColorRequired)?);
        } else if !can_play(Some(&card), self.piles.top()) {
            return Err(RuleError::IllegalPlay {
                card: describe(&card),
                top: self
                    .piles
                    .top()
                    .map(describe)
                    .unwrap_or_else(|| "nothing".to_string()),
            });
        }

        // Validated; from here on the play always applies.
        self.hands[seat.index()].remove(pos);
        self.piles.discard(card);
        self.effect = (card.kind == CardKind::WildDrawFour).then_some(Effect::WildDrawFour);

        let name = self.name(seat);
        let verb = if drawn { "drew and played" } else { "played" };
        let mut message = format!("{name} {verb} {}", describe(&card));
        tracing::debug!(room = %self.code, %seat, card = %describe(&card), "card played");

        // Penalty before the win check: reaching one card uncalled costs two.
        let called = std::mem::take(&mut self.called_last_card[seat.index()]);
        if self.hands[seat.index()].len() == 1 && !called {
            let penalty = self.draw_into(seat, PENALTY_CARDS);
            message.push_str(&format!(" but forgot to call last card (+{penalty})"));
        }

        if self.hands[seat.index()].is_empty() {
            self.phase = Phase::GameOver;
            self.winner = Some(seat);
            tracing::info!(room = %self.code, %seat, "game won");
            message.push_str(&format!(". {name} wins!"));
            self.post(message);
            return Ok(());
        }

        let opponent = seat.other();
        let penalty = card.kind.draw_penalty();
        if penalty > 0 {
            let got = self.draw_into(opponent, penalty);
            message.push_str(&format!(", {} draws {got}", self.name(opponent)));
        }

        // Two players: every action card keeps the turn, numbers pass it.
        if card.kind.is_number() {
            self.turn = Some(opponent);
        } else {
            self.turn = Some(seat);
            message.push_str(&format!(", {name} goes again"));
        }
        self.post(message);
        Ok(())
    }

    /// Draws up to `count` cards into a seat's hand; returns how many
    /// actually arrived. Any draw consumes that seat's last-card call.
    fn draw_into(&mut self, seat: Seat, count: usize) -> usize {
        self.called_last_card[seat.index()] = false;
        let mut drawn = 0;
        for _ in 0..count {
            let Some(card) = self.piles.draw_one(&mut self.rng) else {
                break;
            };
            self.hands[seat.index()].push(card);
            drawn += 1;
        }
        drawn
    }

    fn name(&self, seat: Seat) -> String {
        match self.seats[seat.index()] {
            Some(occupant) => occupant.to_string(),
            None => "empty seat".to_string(),
        }
    }

    fn post(&mut self, message: String) {
        self.message = message;
        self.updated_at = now_millis();
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
