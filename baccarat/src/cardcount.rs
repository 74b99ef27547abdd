use crate::Label;
use std::ops::{AddAssign, Index, SubAssign};
use strum::IntoEnumIterator;

/// Cards of each label in one 52-card deck: sixteen tens and faces, four of
/// every other point value.
pub const DECK_COMPOSITION: [u16; 10] = [16, 4, 4, 4, 4, 4, 4, 4, 4, 4];

/// This provides a container to store the numbers of each card label, with
/// the total kept alongside. Counts saturate at `u16::MAX`; the total is wide
/// enough to always equal their sum.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CardCount {
    counts: [u16; 10],
    total: u32,
}

impl CardCount {
    pub fn new(counts: &[u16; 10]) -> CardCount {
        let mut card_count = CardCount {
            counts: *counts,
            total: 0,
        };

        card_count.propagate_counts();

        card_count
    }

    pub fn empty() -> CardCount {
        Self::new(&[0; 10])
    }

    pub fn per_deck() -> CardCount {
        Self::new(&DECK_COMPOSITION)
    }

    pub fn with_number_of_decks(number_of_decks: u8) -> CardCount {
        Self::per_deck().scaled(number_of_decks)
    }

    /// Multiplies every count, e.g. to turn a per-deck composition into a shoe.
    pub fn scaled(&self, number_of_decks: u8) -> CardCount {
        let mut counts = self.counts;
        for count in counts.iter_mut() {
            *count = count.saturating_mul(number_of_decks as u16);
        }
        Self::new(&counts)
    }

    /// Adds a card of the given label. Returns false if that count is
    /// already at `u16::MAX`.
    pub fn add_card(&mut self, label: Label) -> bool {
        let count = &mut self.counts[label.index()];
        if *count == u16::MAX {
            return false;
        }
        *count += 1;
        self.total += 1;
        true
    }

    /// Removes a card of the given label. Counts never go below 0; returns
    /// false if there was no such card left.
    pub fn remove_card(&mut self, label: Label) -> bool {
        let count = &mut self.counts[label.index()];
        if *count == 0 {
            return false;
        }
        *count -= 1;
        self.total -= 1;
        true
    }

    pub fn get_total(&self) -> u32 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn get_proportion(&self, label: Label) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.counts[label.index()] as f64 / self.total as f64
    }

    pub fn iter(&self) -> impl Iterator<Item = (Label, u16)> + '_ {
        Label::iter().map(move |label| (label, self.counts[label.index()]))
    }

    fn propagate_counts(&mut self) {
        self.total = self.counts.iter().map(|&c| c as u32).sum();
    }
}

/// Removes the cards of `rhs`, flooring each count at 0.
impl SubAssign<&CardCount> for CardCount {
    fn sub_assign(&mut self, rhs: &CardCount) {
        for i in 0..self.counts.len() {
            self.counts[i] = self.counts[i].saturating_sub(rhs.counts[i]);
        }
        self.propagate_counts();
    }
}

impl AddAssign<&CardCount> for CardCount {
    fn add_assign(&mut self, rhs: &CardCount) {
        for i in 0..self.counts.len() {
            self.counts[i] = self.counts[i].saturating_add(rhs.counts[i]);
        }
        self.propagate_counts();
    }
}

impl Index<Label> for CardCount {
    type Output = u16;
    fn index(&self, label: Label) -> &Self::Output {
        &self.counts[label.index()]
    }
}

impl FromIterator<Label> for CardCount {
    fn from_iter<T: IntoIterator<Item = Label>>(iter: T) -> Self {
        let mut card_count = CardCount::empty();
        for label in iter {
            card_count.add_card(label);
        }
        card_count
    }
}

impl<'a> FromIterator<&'a Label> for CardCount {
    fn from_iter<T: IntoIterator<Item = &'a Label>>(iter: T) -> Self {
        iter.into_iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_composition() {
        let deck = CardCount::per_deck();
        assert_eq!(deck.get_total(), 52);
        assert_eq!(deck[Label::Zero], 16);
        assert_eq!(deck[Label::Nine], 4);

        let shoe = CardCount::with_number_of_decks(8);
        assert_eq!(shoe.get_total(), 416);
        assert_eq!(shoe[Label::Zero], 128);
        assert_eq!(shoe[Label::Ace], 32);
    }

    #[test]
    fn remove_card_floors_at_zero() {
        let mut card_count = CardCount::new(&[0, 1, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert!(card_count.remove_card(Label::Ace));
        assert!(!card_count.remove_card(Label::Ace));
        assert!(!card_count.remove_card(Label::Five));
        assert_eq!(card_count[Label::Ace], 0);
        assert!(card_count.is_empty());
    }

    #[test]
    fn test_card_count_add_sub_assign() {
        let mut cc1 = CardCount::new(&[1, 2, 3, 0, 0, 0, 0, 0, 5, 6]);
        assert_eq!(cc1.get_total(), 17);
        let cc2: CardCount = [Label::Zero, Label::Zero, Label::Two, Label::Nine]
            .iter()
            .collect();
        cc1 -= &cc2;
        assert_eq!(cc1[Label::Zero], 0);
        assert_eq!(cc1[Label::Two], 2);
        assert_eq!(cc1[Label::Nine], 5);
        assert_eq!(cc1.get_total(), 14);
        cc1 += &cc2;
        assert_eq!(cc1.get_total(), 18);
        assert_eq!(cc1[Label::Zero], 2);
    }

    #[test]
    fn total_matches_counts_for_large_compositions() {
        let mut card_count = CardCount::new(&[u16::MAX; 10]);
        assert_eq!(card_count.get_total(), 10 * u16::MAX as u32);
        assert!(!card_count.add_card(Label::Ace));
        assert_eq!(card_count.get_total(), 10 * u16::MAX as u32);

        let scaled = CardCount::per_deck().scaled(u8::MAX);
        assert_eq!(scaled[Label::Zero], 16 * 255);
        assert_eq!(scaled.get_total(), 52 * 255);

        let mut sum = CardCount::new(&[60_000; 10]);
        sum += &CardCount::new(&[10_000; 10]);
        assert_eq!(sum[Label::Nine], u16::MAX);
        let total: u32 = sum.iter().map(|(_, count)| count as u32).sum();
        assert_eq!(sum.get_total(), total);
    }

    #[test]
    fn proportions() {
        let deck = CardCount::per_deck();
        assert_eq!(deck.get_proportion(Label::Zero), 16.0 / 52.0);
        assert_eq!(CardCount::empty().get_proportion(Label::Ace), 0.0);
        let sum: f64 = deck.iter().map(|(label, _)| deck.get_proportion(label)).sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }
}
