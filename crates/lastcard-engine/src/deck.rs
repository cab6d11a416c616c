//! Deck construction, shuffling, and the draw/discard piles.

use lastcard_protocol::{Card, CardId, CardKind, Color};
use rand::Rng;
use rand::seq::SliceRandom;

/// Cards in a complete deck.
pub const DECK_SIZE: usize = 108;

/// Wild and wild-draw-four cards in a deck, each.
const WILDS_PER_KIND: usize = 4;

/// Builds the canonical 108-card deck in a fixed order.
///
/// Per color: one 0, two each of 1–9, two Skip, two Reverse, two
/// Draw-Two (25 × 4 = 100), then four Wild and four Wild-Draw-Four.
/// Ids run from 0 in build order, so they are unique within the deck.
pub fn build_deck() -> Vec<Card> {
    let mut kinds = Vec::with_capacity(DECK_SIZE);
    for color in Color::ALL {
        kinds.push((Some(color), CardKind::Number(0)));
        for value in 1..=9 {
            kinds.push((Some(color), CardKind::Number(value)));
            kinds.push((Some(color), CardKind::Number(value)));
        }
        for action in [CardKind::Skip, CardKind::Reverse, CardKind::DrawTwo] {
            kinds.push((Some(color), action));
            kinds.push((Some(color), action));
        }
    }
    for kind in [CardKind::Wild, CardKind::WildDrawFour] {
        kinds.extend(std::iter::repeat_n((None, kind), WILDS_PER_KIND));
    }

    let deck: Vec<Card> = kinds
        .into_iter()
        .enumerate()
        .map(|(i, (color, kind))| Card::new(CardId(i as u16), color, kind))
        .collect();
    debug_assert_eq!(deck.len(), DECK_SIZE);
    deck
}

/// Uniform in-place permutation (Fisher–Yates).
pub fn shuffle<R: Rng + ?Sized>(cards: &mut [Card], rng: &mut R) {
    cards.shuffle(rng);
}

/// The draw pile and discard pile of one table.
///
/// Both are stacks: the top of the draw pile and the top of the discard
/// pile are the last elements.
#[derive(Debug, Clone, Default)]
pub struct Piles {
    draw: Vec<Card>,
    discard: Vec<Card>,
}

impl Piles {
    /// A freshly built and shuffled draw pile with an empty discard.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut draw = build_deck();
        shuffle(&mut draw, rng);
        Self {
            draw,
            discard: Vec::new(),
        }
    }

    /// Takes the top card of the draw pile.
    ///
    /// When the draw pile is empty, everything under the discard top is
    /// shuffled into a new draw pile first. Returns `None` when even that
    /// yields nothing; callers treat this as "no draw possible".
    pub fn draw_one<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Card> {
        if self.draw.is_empty() {
            self.recycle(rng);
        }
        self.draw.pop()
    }

    fn recycle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.discard.len() <= 1 {
            return;
        }
        let top = self.discard.split_off(self.discard.len() - 1);
        let mut recycled = std::mem::replace(&mut self.discard, top);
        // Wilds go back in colorless; they pick a color again when replayed.
        for card in recycled.iter_mut().filter(|c| c.is_wild()) {
            card.color = None;
        }
        shuffle(&mut recycled, rng);
        tracing::debug!(cards = recycled.len(), "recycled discard pile into draw pile");
        self.draw = recycled;
    }

    pub fn discard(&mut self, card: Card) {
        self.discard.push(card);
    }

    /// The card currently showing on the discard pile.
    pub fn top(&self) -> Option<&Card> {
        self.discard.last()
    }

    pub fn draw_len(&self) -> usize {
        self.draw.len()
    }

    pub fn discard_len(&self) -> usize {
        self.discard.len()
    }

    #[cfg(test)]
    pub(crate) fn from_parts(draw: Vec<Card>, discard: Vec<Card>) -> Self {
        Self { draw, discard }
    }
}
