//! Legality and description of plays. Pure functions, no table state.

use lastcard_protocol::{Card, CardKind};

/// Whether `card` may be played on `top`.
///
/// Wilds are always legal. Anything else must share the top's color,
/// or be a number of equal value, or be the same action kind. With
/// nothing to compare against, nothing is legal.
pub fn can_play(card: Option<&Card>, top: Option<&Card>) -> bool {
    let (Some(card), Some(top)) = (card, top) else {
        return false;
    };
    if card.is_wild() {
        return true;
    }
    if card.color.is_some() && card.color == top.color {
        return true;
    }
    match (card.kind, top.kind) {
        (CardKind::Number(a), CardKind::Number(b)) => a == b,
        (a, b) => !a.is_number() && a == b,
    }
}

/// Feed text for a card, e.g. `red 7`, `blue draw two`, `wild (green)`.
pub fn describe(card: &Card) -> String {
    let color = card.color.map(|c| c.to_string());
    match (card.kind, color) {
        (CardKind::Number(v), Some(color)) => format!("{color} {v}"),
        (CardKind::Skip, Some(color)) => format!("{color} skip"),
        (CardKind::Reverse, Some(color)) => format!("{color} reverse"),
        (CardKind::DrawTwo, Some(color)) => format!("{color} draw two"),
        (CardKind::Wild, Some(color)) => format!("wild ({color})"),
        (CardKind::WildDrawFour, Some(color)) => format!("wild draw four ({color})"),
        (CardKind::Wild, None) => "wild".to_string(),
        (CardKind::WildDrawFour, None) => "wild draw four".to_string(),
        // Colored kinds always carry a color; keep the text stable anyway.
        (CardKind::Number(v), None) => format!("{v}"),
        (CardKind::Skip, None) => "skip".to_string(),
        (CardKind::Reverse, None) => "reverse".to_string(),
        (CardKind::DrawTwo, None) => "draw two".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use lastcard_protocol::{CardId, Color};

    use super::*;

    fn card(color: Option<Color>, kind: CardKind) -> Card {
        Card::new(CardId(0), color, kind)
    }

    #[test]
    fn test_can_play_same_color() {
        let top = card(Some(Color::Red), CardKind::Number(7));
        let skip = card(Some(Color::Red), CardKind::Skip);
        assert!(can_play(Some(&skip), Some(&top)));
        assert!(can_play(Some(&top), Some(&skip)), "symmetric under equal color");
    }

    #[test]
    fn test_can_play_same_number_other_color() {
        let top = card(Some(Color::Red), CardKind::Number(7));
        let blue7 = card(Some(Color::Blue), CardKind::Number(7));
        let blue8 = card(Some(Color::Blue), CardKind::Number(8));
        assert!(can_play(Some(&blue7), Some(&top)));
        assert!(!can_play(Some(&blue8), Some(&top)));
    }

    #[test]
    fn test_can_play_same_action_other_color() {
        let top = card(Some(Color::Green), CardKind::DrawTwo);
        let d2 = card(Some(Color::Yellow), CardKind::DrawTwo);
        let skip = card(Some(Color::Yellow), CardKind::Skip);
        assert!(can_play(Some(&d2), Some(&top)));
        assert!(can_play(Some(&top), Some(&d2)), "symmetric under equal action kind");
        assert!(!can_play(Some(&skip), Some(&top)));
    }

    #[test]
    fn test_can_play_number_never_matches_action_by_kind() {
        let top = card(Some(Color::Green), CardKind::Skip);
        let zero = card(Some(Color::Red), CardKind::Number(0));
        assert!(!can_play(Some(&zero), Some(&top)));
    }

    #[test]
    fn test_can_play_wilds_always_legal() {
        let top = card(Some(Color::Blue), CardKind::Number(3));
        assert!(can_play(Some(&card(None, CardKind::Wild)), Some(&top)));
        assert!(can_play(Some(&card(None, CardKind::WildDrawFour)), Some(&top)));
    }

    #[test]
    fn test_can_play_on_colored_wild_top_matches_color() {
        let top = card(Some(Color::Yellow), CardKind::WildDrawFour);
        assert!(can_play(Some(&card(Some(Color::Yellow), CardKind::Number(1))), Some(&top)));
        assert!(!can_play(Some(&card(Some(Color::Red), CardKind::Number(1))), Some(&top)));
    }

    #[test]
    fn test_can_play_absent_argument_is_false() {
        let c = card(Some(Color::Red), CardKind::Number(1));
        let wild = card(None, CardKind::Wild);
        assert!(!can_play(Some(&c), None));
        assert!(!can_play(Some(&wild), None));
        assert!(!can_play(None, Some(&c)));
        assert!(!can_play(None, None));
    }

    #[test]
    fn test_describe_is_stable() {
        assert_eq!(describe(&card(Some(Color::Red), CardKind::Number(7))), "red 7");
        assert_eq!(describe(&card(Some(Color::Blue), CardKind::DrawTwo)), "blue draw two");
        assert_eq!(describe(&card(Some(Color::Green), CardKind::Wild)), "wild (green)");
        assert_eq!(describe(&card(None, CardKind::WildDrawFour)), "wild draw four");
    }
}
