//! Computer opponent policy.
//!
//! [`decide`] only *chooses*. The table applies the choice through the
//! same `call_last_card` / `play_card` / `draw_card` entry points a
//! human uses, so there is exactly one rules path.
//!
//! Tiers:
//!
//! | tier   | call last card (hand of 2) | card choice                 |
//! |--------|----------------------------|-----------------------------|
//! | easy   | 35%                        | uniform over legal cards    |
//! | medium | 70%                        | scored                      |
//! | hard   | always                     | scored, favours action cards|

use lastcard_protocol::{Card, CardId, CardKind, Color, Difficulty};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::rules::can_play;

/// Weight per card already held in the played card's color.
const COLOR_DENSITY_WEIGHT: f64 = 3.0;

/// Extra score for any non-number card on hard.
const HARD_ACTION_BONUS: f64 = 10.0;

/// What the computer will do with its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Play {
        card_id: CardId,
        chosen_color: Option<Color>,
    },
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Call "last card" before acting.
    pub call_last_card: bool,
    pub choice: Choice,
}

/// Chooses the computer's move for the given hand and discard top.
pub fn decide<R: Rng + ?Sized>(
    hand: &[Card],
    top: Option<&Card>,
    difficulty: Difficulty,
    rng: &mut R,
) -> Decision {
    let call_last_card = hand.len() == 2 && rng.random_bool(call_probability(difficulty));

    let legal: Vec<&Card> = hand.iter().filter(|c| can_play(Some(c), top)).collect();
    let picked = match difficulty {
        Difficulty::Easy => legal.choose(rng).copied(),
        Difficulty::Medium | Difficulty::Hard => legal
            .iter()
            .map(|card| {
                let jitter: f64 = rng.random();
                (score(card, hand, difficulty) + jitter, *card)
            })
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, card)| card),
    };

    let choice = match picked {
        Some(card) => Choice::Play {
            card_id: card.id,
            chosen_color: card.is_wild().then(|| pick_color(hand, rng)),
        },
        None => Choice::Draw,
    };

    Decision {
        call_last_card,
        choice,
    }
}

fn call_probability(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Easy => 0.35,
        Difficulty::Medium => 0.7,
        Difficulty::Hard => 1.0,
    }
}

fn score(card: &Card, hand: &[Card], difficulty: Difficulty) -> f64 {
    let base = match card.kind {
        CardKind::WildDrawFour => 40.0,
        CardKind::DrawTwo => 35.0,
        CardKind::Skip | CardKind::Reverse => 25.0,
        CardKind::Wild => 10.0,
        CardKind::Number(_) => 0.0,
    };
    let density = card
        .color
        .map(|color| hand.iter().filter(|c| c.color == Some(color)).count() as f64)
        .unwrap_or(0.0);
    let hard_bonus = if difficulty == Difficulty::Hard && !card.kind.is_number() {
        HARD_ACTION_BONUS
    } else {
        0.0
    };
    base + COLOR_DENSITY_WEIGHT * density + hard_bonus
}

/// The color held most often, ties broken uniformly at random.
pub fn pick_color<R: Rng + ?Sized>(hand: &[Card], rng: &mut R) -> Color {
    let mut counts = [0usize; 4];
    for color in hand.iter().filter(|c| !c.is_wild()).filter_map(|c| c.color) {
        counts[color.index()] += 1;
    }
    let best = counts.iter().copied().max().unwrap_or(0);
    let tied: Vec<Color> = Color::ALL
        .into_iter()
        .filter(|c| counts[c.index()] == best)
        .collect();
    tied.choose(rng).copied().unwrap_or(Color::Red)
}
