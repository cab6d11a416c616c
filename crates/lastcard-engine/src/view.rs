//! Per-recipient projection of a table.

use lastcard_protocol::{Occupant, OpponentInfo, PlayerId, PlayerView, Seat};

use crate::Table;

impl Table {
    /// The room as the holder of `seat` sees it: their own hand in full,
    /// the opponent's hand as a count.
    pub fn view_for(&self, seat: Seat) -> PlayerView {
        let other = seat.other();
        let opponent = self.occupant(other).map(|occupant| OpponentInfo {
            computer: occupant.is_computer(),
            difficulty: match occupant {
                Occupant::Computer => self.difficulty(),
                Occupant::Human(_) => None,
            },
        });

        PlayerView {
            code: self.code().clone(),
            seat,
            generation: self.generation(),
            phase: self.phase(),
            updated_at: self.updated_at(),
            effect: self.effect(),
            hand: self.hand(seat).to_vec(),
            opponent_card_count: self.hand(other).len(),
            discard_top: self.discard_top().copied(),
            draw_pile_count: self.draw_pile_len(),
            turn: self.turn(),
            game_over: self.phase().is_terminal(),
            winner: self.winner(),
            message: self.message().to_string(),
            opponent,
        }
    }

    /// One view per human seat. The computer never receives one.
    pub fn human_views(&self) -> Vec<(PlayerId, PlayerView)> {
        self.humans()
            .map(|(seat, player)| (player, self.view_for(seat)))
            .collect()
    }
}
