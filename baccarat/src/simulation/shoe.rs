use crate::{CardCount, Label};

use rand::Rng;
use strum::IntoEnumIterator;

/// A shoe of which only the composition is known. Every card still in the
/// shoe is equally likely to come next.
#[derive(Debug, Clone)]
pub struct Shoe {
    card_count: CardCount,
}

impl Shoe {
    pub fn new(card_count: CardCount) -> Shoe {
        Shoe { card_count }
    }

    /// Draws a card without replacement. Returns None if the shoe is empty.
    ///
    /// A uniform index over the remaining cards falls into the bucket of
    /// exactly one label, whose count is then decremented.
    pub fn deal_card<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Label> {
        let total = self.card_count.get_total();
        if total == 0 {
            return None;
        }

        let mut index = rng.gen_range(0..total);
        for label in Label::iter() {
            let count = self.card_count[label] as u32;
            if index < count {
                self.card_count.remove_card(label);
                return Some(label);
            }
            index -= count;
        }
        None
    }

    pub fn get_card_count(&self) -> &CardCount {
        &self.card_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn dealing_exhausts_exactly_the_composition() {
        let composition = CardCount::new(&[3, 0, 2, 0, 0, 1, 0, 0, 0, 4]);
        let mut shoe = Shoe::new(composition.clone());
        let mut rng = StdRng::seed_from_u64(7);

        let mut dealt = CardCount::empty();
        while let Some(label) = shoe.deal_card(&mut rng) {
            dealt.add_card(label);
        }
        assert_eq!(dealt, composition);
        assert!(shoe.get_card_count().is_empty());
        assert_eq!(shoe.deal_card(&mut rng), None);
    }

    #[test]
    fn exhausted_label_is_never_drawn_again() {
        let mut shoe = Shoe::new(CardCount::new(&[0, 1, 0, 0, 0, 0, 0, 0, 0, 50]));
        let mut rng = StdRng::seed_from_u64(11);
        let mut aces = 0;
        for _ in 0..51 {
            if shoe.deal_card(&mut rng) == Some(Label::Ace) {
                aces += 1;
            }
        }
        assert_eq!(aces, 1);
    }

    #[test]
    fn full_counts_are_drawn_evenly() {
        let composition = CardCount::new(&[0, u16::MAX, u16::MAX, 0, 0, 0, 0, 0, 0, 0]);
        let mut rng = StdRng::seed_from_u64(5);
        let mut aces = 0;
        let runs = 10_000;
        for _ in 0..runs {
            let mut shoe = Shoe::new(composition.clone());
            match shoe.deal_card(&mut rng) {
                Some(Label::Ace) => aces += 1,
                Some(Label::Two) => {}
                other => panic!("unexpected draw {:?}", other),
            }
        }
        let rate = aces as f64 / runs as f64;
        assert!((rate - 0.5).abs() < 0.03);
    }

    #[test]
    fn draws_follow_the_composition() {
        let composition = CardCount::with_number_of_decks(8);
        let mut rng = StdRng::seed_from_u64(2024);
        let mut zeros = 0;
        let runs = 20_000;
        for _ in 0..runs {
            let mut shoe = Shoe::new(composition.clone());
            if shoe.deal_card(&mut rng) == Some(Label::Zero) {
                zeros += 1;
            }
        }
        let rate = zeros as f64 / runs as f64;
        assert!((rate - composition.get_proportion(Label::Zero)).abs() < 0.02);
    }
}
