pub mod hand;

use crate::rules::{self, NextStep, RoundStatus, RuleViolation};
use crate::scoring::{recommend, WeightTable};
use crate::{Label, Outcome, Side};
use thiserror::Error;
use tracing::debug;

use self::hand::Hand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RoundError {
    #[error("the round is already complete")]
    Complete,
    #[error("the round is invalid: {0}")]
    Invalid(RuleViolation),
    #[error("the {} hand already holds 3 cards", .0.name())]
    HandFull(Side),
}

/// The cards entered for the current round. Cards are only accepted for the
/// side the drawing rule asks for, so a round built through `deal` is always
/// in progress or complete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Round {
    player: Hand,
    banker: Hand,
}

impl Round {
    pub fn new() -> Round {
        Round {
            player: Hand::new(),
            banker: Hand::new(),
        }
    }

    /// Builds a round from cards entered elsewhere, e.g. to check a finished
    /// round. The result may well be invalid.
    pub fn from_hands(player: &[Label], banker: &[Label]) -> Result<Round, RoundError> {
        let player = Hand::from_cards(player).ok_or(RoundError::HandFull(Side::Player))?;
        let banker = Hand::from_cards(banker).ok_or(RoundError::HandFull(Side::Banker))?;
        Ok(Round { player, banker })
    }

    /// Deals a card to whichever side the drawing rule names next. Returns
    /// that side.
    pub fn deal(&mut self, card: Label) -> Result<Side, RoundError> {
        let side = match self.next_step() {
            NextStep::NeedCard(side, _) => side,
            NextStep::Complete(_) => {
                debug!(card = card.symbol(), "card refused, round complete");
                return Err(RoundError::Complete);
            }
            NextStep::Invalid(violation) => {
                debug!(card = card.symbol(), %violation, "card refused, round invalid");
                return Err(RoundError::Invalid(violation));
            }
        };
        if !self.hand_mut(side).receive_card(card) {
            return Err(RoundError::HandFull(side));
        }
        Ok(side)
    }

    /// Takes back the most recently dealt card.
    pub fn undo(&mut self) -> Option<(Side, Label)> {
        let side = rules::last_dealt_side(self.player.get_cards(), self.banker.get_cards())?;
        self.hand_mut(side).remove_card().map(|card| (side, card))
    }

    pub fn clear(&mut self) {
        self.player.clear();
        self.banker.clear();
    }

    pub fn next_step(&self) -> NextStep {
        rules::next_step(self.player.get_cards(), self.banker.get_cards())
    }

    pub fn status(&self) -> RoundStatus {
        rules::validate(self.player.get_cards(), self.banker.get_cards())
    }

    /// Winner of the round, once the round is valid and complete.
    pub fn outcome(&self) -> Option<Outcome> {
        if !self.status().is_valid() {
            return None;
        }
        Some(rules::winner(
            self.player.get_cards(),
            self.banker.get_cards(),
        ))
    }

    /// The table slot of the card the rule asks for: 1, 2 and 5 on the player
    /// side, 3, 4 and 6 on the banker side. A banker third card after player
    /// stood takes slot 5.
    pub fn next_position(&self) -> Option<u8> {
        let side = match self.next_step() {
            NextStep::NeedCard(side, _) => side,
            _ => return None,
        };
        let position = match (side, self.player.len(), self.banker.len()) {
            (Side::Player, 0, _) => 1,
            (Side::Player, 1, _) => 2,
            (Side::Player, _, _) => 5,
            (Side::Banker, _, 0) => 3,
            (Side::Banker, _, 1) => 4,
            (Side::Banker, player_cards, _) if player_cards >= 3 => 6,
            (Side::Banker, _, _) => 5,
        };
        Some(position)
    }

    pub fn score(&self, weights: &WeightTable) -> i64 {
        weights.score(self.all_cards())
    }

    /// Recommendation for the next round, or None before any card is dealt.
    pub fn recommendation(&self, weights: &WeightTable) -> Option<Side> {
        if self.is_empty() {
            return None;
        }
        Some(recommend(self.score(weights)))
    }

    pub fn all_cards(&self) -> impl Iterator<Item = &Label> {
        self.player.get_cards().iter().chain(self.banker.get_cards())
    }

    pub fn get_player_cards(&self) -> &[Label] {
        self.player.get_cards()
    }

    pub fn get_banker_cards(&self) -> &[Label] {
        self.banker.get_cards()
    }

    pub fn number_of_cards(&self) -> usize {
        self.player.len() + self.banker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.number_of_cards() == 0
    }

    fn hand_mut(&mut self, side: Side) -> &mut Hand {
        match side {
            Side::Player => &mut self.player,
            Side::Banker => &mut self.banker,
        }
    }
}
