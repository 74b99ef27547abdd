use crate::rules::{hand_total, MAX_HAND_CARDS};
use crate::Label;

/// The cards of one side. Never holds more than 3 cards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Label>,
}

impl Hand {
    pub fn new() -> Hand {
        Hand {
            cards: Vec::with_capacity(MAX_HAND_CARDS),
        }
    }

    /// Builds a hand from already dealt cards. Returns None if there are more
    /// than 3 of them.
    pub fn from_cards(cards: &[Label]) -> Option<Hand> {
        if cards.len() > MAX_HAND_CARDS {
            return None;
        }
        Some(Hand {
            cards: cards.to_vec(),
        })
    }

    /// Receives a card. Returns false and leaves the hand untouched if it is
    /// already full.
    pub fn receive_card(&mut self, card: Label) -> bool {
        if self.is_full() {
            return false;
        }
        self.cards.push(card);
        true
    }

    pub fn remove_card(&mut self) -> Option<Label> {
        self.cards.pop()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    pub fn get_cards(&self) -> &[Label] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.cards.len() >= MAX_HAND_CARDS
    }

    pub fn get_total(&self) -> u8 {
        hand_total(&self.cards)
    }
}
