//! Card definitions.
//!
//! A card is an immutable value: an id that is unique within one deck,
//! an optional color, and a kind. Only wild kinds may be colorless, and
//! they take on a color the moment they are played.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a card, unique within a single deck instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u16);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Yellow,
    Green,
    Blue,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Yellow, Color::Green, Color::Blue];

    /// Index into per-color arrays.
    pub fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Yellow => 1,
            Self::Green => 2,
            Self::Blue => 3,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => f.write_str("red"),
            Self::Yellow => f.write_str("yellow"),
            Self::Green => f.write_str("green"),
            Self::Blue => f.write_str("blue"),
        }
    }
}

/// What a card does.
///
/// Adjacently tagged on the wire: `{"type": "number", "value": 7}` or
/// `{"type": "skip"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum CardKind {
    Number(u8),
    Skip,
    Reverse,
    #[serde(rename = "draw2")]
    DrawTwo,
    Wild,
    #[serde(rename = "wild4")]
    WildDrawFour,
}

impl CardKind {
    /// Wild and wild-draw-four.
    pub fn is_wild(&self) -> bool {
        matches!(self, Self::Wild | Self::WildDrawFour)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// Cards an opponent must draw when this is played.
    pub fn draw_penalty(&self) -> usize {
        match self {
            Self::DrawTwo => 2,
            Self::WildDrawFour => 4,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    /// `None` only for a wild card that has not been played yet.
    pub color: Option<Color>,
    pub kind: CardKind,
}

impl Card {
    pub fn new(id: CardId, color: Option<Color>, kind: CardKind) -> Self {
        Self { id, color, kind }
    }

    pub fn is_wild(&self) -> bool {
        self.kind.is_wild()
    }

    /// Face value of a number card.
    pub fn value(&self) -> Option<u8> {
        match self.kind {
            CardKind::Number(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_json_format() {
        let card = Card::new(CardId(12), Some(Color::Red), CardKind::Number(7));
        let json = serde_json::to_value(card).unwrap();
        assert_eq!(json["id"], 12);
        assert_eq!(json["color"], "red");
        assert_eq!(json["kind"]["type"], "number");
        assert_eq!(json["kind"]["value"], 7);
    }

    #[test]
    fn test_unplayed_wild_has_null_color() {
        let card = Card::new(CardId(100), None, CardKind::WildDrawFour);
        let json = serde_json::to_value(card).unwrap();
        assert!(json["color"].is_null());
        assert_eq!(json["kind"]["type"], "wild4");
    }

    #[test]
    fn test_card_kind_predicates() {
        assert!(CardKind::Wild.is_wild());
        assert!(CardKind::WildDrawFour.is_wild());
        assert!(!CardKind::Skip.is_wild());
        assert!(CardKind::Number(0).is_number());
        assert_eq!(CardKind::DrawTwo.draw_penalty(), 2);
        assert_eq!(CardKind::WildDrawFour.draw_penalty(), 4);
        assert_eq!(CardKind::Reverse.draw_penalty(), 0);
    }

    #[test]
    fn test_card_value_only_for_numbers() {
        let seven = Card::new(CardId(1), Some(Color::Blue), CardKind::Number(7));
        let skip = Card::new(CardId(2), Some(Color::Blue), CardKind::Skip);
        assert_eq!(seven.value(), Some(7));
        assert_eq!(skip.value(), None);
    }
}
