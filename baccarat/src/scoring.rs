use crate::{CardCount, Label, Side};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Index, RangeInclusive};
use strum::IntoEnumIterator;

/// Default weights, indexed by card point (`0`, `A`, `2`, ..., `9`).
pub const DEFAULT_WEIGHTS: [i32; 10] = [1, 4, 6, 9, 19, -12, -18, -12, -6, -1];

/// A weight for every card label. Owned by the caller and passed to scoring
/// and simulation as a plain value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Label, i32>", into = "BTreeMap<Label, i32>")]
pub struct WeightTable {
    weights: [i32; 10],
}

impl Default for WeightTable {
    fn default() -> Self {
        WeightTable::new(DEFAULT_WEIGHTS)
    }
}

impl WeightTable {
    pub fn new(weights: [i32; 10]) -> WeightTable {
        WeightTable { weights }
    }

    /// Builds a table from explicit entries. Labels without an entry weigh 0.
    pub fn from_entries<I: IntoIterator<Item = (Label, i32)>>(entries: I) -> WeightTable {
        WeightTable::new([0; 10]).with_overrides(entries)
    }

    pub fn with_overrides<I: IntoIterator<Item = (Label, i32)>>(mut self, entries: I) -> Self {
        for (label, weight) in entries {
            self.set(label, weight);
        }
        self
    }

    pub fn weight(&self, label: Label) -> i32 {
        self.weights[label.index()]
    }

    pub fn set(&mut self, label: Label, weight: i32) {
        self.weights[label.index()] = weight;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Label, i32)> + '_ {
        Label::iter().map(move |label| (label, self.weight(label)))
    }

    /// Sum of the weights of the given cards. Summed as `i64`, so no run of
    /// `i32` weights can overflow it.
    pub fn score<'a, I: IntoIterator<Item = &'a Label>>(&self, cards: I) -> i64 {
        cards.into_iter().map(|&card| self.weight(card) as i64).sum()
    }

    /// Lowest and highest score any `number_of_cards` cards taken from `shoe`
    /// can reach. None if the shoe holds fewer cards than that.
    pub fn score_range(&self, shoe: &CardCount, number_of_cards: u16) -> Option<RangeInclusive<i64>> {
        if shoe.get_total() < number_of_cards as u32 {
            return None;
        }
        let mut labels: Vec<Label> = Label::iter().collect();
        labels.sort_by_key(|&label| self.weight(label));
        let lowest = self.greedy_sum(shoe, number_of_cards, labels.iter());
        let highest = self.greedy_sum(shoe, number_of_cards, labels.iter().rev());
        Some(lowest..=highest)
    }

    fn greedy_sum<'a, I: Iterator<Item = &'a Label>>(
        &self,
        shoe: &CardCount,
        number_of_cards: u16,
        labels: I,
    ) -> i64 {
        let mut left = number_of_cards;
        let mut sum = 0;
        for &label in labels {
            let taken = left.min(shoe[label]);
            sum += self.weight(label) as i64 * taken as i64;
            left -= taken;
        }
        sum
    }
}

impl Index<Label> for WeightTable {
    type Output = i32;
    fn index(&self, label: Label) -> &Self::Output {
        &self.weights[label.index()]
    }
}

impl From<BTreeMap<Label, i32>> for WeightTable {
    fn from(entries: BTreeMap<Label, i32>) -> Self {
        WeightTable::from_entries(entries)
    }
}

impl From<WeightTable> for BTreeMap<Label, i32> {
    fn from(table: WeightTable) -> Self {
        table.iter().collect()
    }
}

/// Banker on a non-negative score, player otherwise.
pub fn recommend(score: i64) -> Side {
    if score >= 0 {
        Side::Banker
    } else {
        Side::Player
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights() {
        let weights = WeightTable::default();
        assert_eq!(weights.weight(Label::Zero), 1);
        assert_eq!(weights.weight(Label::Ace), 4);
        assert_eq!(weights.weight(Label::Four), 19);
        assert_eq!(weights[Label::Six], -18);
        assert_eq!(weights.weight(Label::Nine), -1);
    }

    #[test]
    fn missing_entries_weigh_zero() {
        let weights = WeightTable::from_entries([(Label::Ace, 7)]);
        assert_eq!(weights.weight(Label::Ace), 7);
        assert_eq!(weights.weight(Label::Nine), 0);
        assert_eq!(weights.score(&[Label::Ace, Label::Nine, Label::Zero]), 7);
    }

    #[test]
    fn recommendation_folds_zero_into_banker() {
        assert_eq!(recommend(0), Side::Banker);
        assert_eq!(recommend(12), Side::Banker);
        assert_eq!(recommend(-1), Side::Player);
    }

    #[test]
    fn score_range_respects_composition() {
        let weights = WeightTable::default();
        let shoe = CardCount::with_number_of_decks(1);
        // Lowest: four 6s (-18) and two of 5 or 7 (-12). Highest: four 4s (19) and two 3s (9).
        assert_eq!(weights.score_range(&shoe, 6), Some(-96..=94));
        assert_eq!(weights.score_range(&CardCount::empty(), 1), None);
    }

    #[test]
    fn extreme_weights_do_not_overflow() {
        let weights = WeightTable::new([i32::MAX; 10]);
        let cards = [Label::Ace, Label::Two, Label::Three, Label::Four, Label::Five, Label::Six];
        assert_eq!(weights.score(&cards), 6 * i32::MAX as i64);
        assert_eq!(recommend(weights.score(&cards)), Side::Banker);

        let weights = WeightTable::new([i32::MIN; 10]);
        assert_eq!(weights.score(&cards), 6 * i32::MIN as i64);
        let range = weights
            .score_range(&CardCount::with_number_of_decks(8), 6)
            .unwrap();
        assert_eq!(range, 6 * i32::MIN as i64..=6 * i32::MIN as i64);
    }
}
