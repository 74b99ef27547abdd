pub mod cardcount;
pub mod round;
pub mod rules;
pub mod scoring;
pub mod simulation;

use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use strum_macros::EnumIter;
use thiserror::Error;

pub use cardcount::CardCount;
pub use round::{Round, RoundError};
pub use rules::{
    last_dealt_side, next_step, validate, winner, Completion, NextStep, RoundState, RoundStatus,
    RuleViolation,
};
pub use scoring::{recommend, WeightTable};
pub use simulation::{simulate, SimulationConfig, SimulationError, SimulationResult};

/// A card as the calculator sees it. Only the baccarat point value matters, so
/// tens and face cards all share the `0` label.
///
/// Variants are declared in point order, so the discriminant is the point
/// value and also the index used by `CardCount` and `WeightTable`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    Serialize_enum_str,
    Deserialize_enum_str,
)]
pub enum Label {
    #[serde(rename = "0")]
    Zero,
    #[serde(rename = "A")]
    Ace,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
}

impl Label {
    pub fn point(&self) -> u8 {
        *self as u8
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Label::Zero => "0",
            Label::Ace => "A",
            Label::Two => "2",
            Label::Three => "3",
            Label::Four => "4",
            Label::Five => "5",
            Label::Six => "6",
            Label::Seven => "7",
            Label::Eight => "8",
            Label::Nine => "9",
        }
    }

    /// Parses one of the 10 card symbols. Anything else is rejected here so
    /// that the rule engine never sees a malformed card.
    pub fn from_symbol(symbol: &str) -> Result<Label, LabelError> {
        symbol
            .trim()
            .parse()
            .map_err(|_| LabelError::Unknown(symbol.to_string()))
    }
}

/// Parses a list of card symbols separated by commas and/or whitespace.
pub fn parse_labels(input: &str) -> Result<Vec<Label>, LabelError> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(Label::from_symbol)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("unknown card label {0:?}, expected one of 0 A 2 3 4 5 6 7 8 9")]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_enum_str, Deserialize_enum_str)]
pub enum Side {
    #[serde(rename = "player")]
    Player,
    #[serde(rename = "banker")]
    Banker,
}

impl Side {
    pub fn name(&self) -> &'static str {
        match self {
            Side::Player => "player",
            Side::Banker => "banker",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_enum_str, Deserialize_enum_str)]
pub enum Outcome {
    #[serde(rename = "player")]
    Player,
    #[serde(rename = "banker")]
    Banker,
    #[serde(rename = "tie")]
    Tie,
}

impl Outcome {
    pub fn name(&self) -> &'static str {
        match self {
            Outcome::Player => "player",
            Outcome::Banker => "banker",
            Outcome::Tie => "tie",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn points_follow_labels() {
        let points: Vec<u8> = Label::iter().map(|l| l.point()).collect();
        assert_eq!(points, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(Label::Ace.symbol(), "A");
    }

    #[test]
    fn symbols_round_trip_through_parse() {
        for label in Label::iter() {
            assert_eq!(Label::from_symbol(label.symbol()), Ok(label));
        }
    }

    #[test]
    fn malformed_labels_are_rejected() {
        assert!(Label::from_symbol("10").is_err());
        assert!(Label::from_symbol("K").is_err());
        assert!(Label::from_symbol("").is_err());
        assert_eq!(
            parse_labels("8, A x"),
            Err(LabelError::Unknown(String::from("x")))
        );
    }

    #[test]
    fn parse_label_lists() {
        assert_eq!(
            parse_labels("0,A 9").unwrap(),
            vec![Label::Zero, Label::Ace, Label::Nine]
        );
        assert!(parse_labels("  ").unwrap().is_empty());
    }
}
