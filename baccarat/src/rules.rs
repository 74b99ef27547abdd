//! The drawing rule of a standard baccarat round, expressed as a state machine
//! over the cards dealt so far.
//!
//! A round is never stored. Every query replays the two hands through the
//! machine in the canonical dealing order: player, banker, player, banker,
//! then the third cards the rule calls for.

mod drawing;

pub use drawing::{
    banker_should_draw, banker_should_draw_after_player_stood, is_natural, player_should_draw,
};

use crate::{Label, Outcome, Side};
use std::cmp::Ordering;
use std::fmt;

pub const MAX_HAND_CARDS: usize = 3;
pub const MIN_ROUND_CARDS: usize = 4;
pub const MAX_ROUND_CARDS: usize = 6;

/// Sum of the card points, modulo 10.
pub fn hand_total(cards: &[Label]) -> u8 {
    let sum: u32 = cards.iter().map(|c| c.point() as u32).sum();
    (sum % 10) as u8
}

/// Total of the first two cards of a hand.
///
/// Panics if the hand holds fewer than 2 cards.
pub fn two_card_total(cards: &[Label]) -> u8 {
    hand_total(&cards[..2])
}

/// How a round reached its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Natural,
    BothStand,
    /// Player drew a third card and banker stood.
    BankerStands,
    /// Player stood and banker drew a third card.
    BankerDrewAfterPlayerStood,
    BothDrew,
}

impl Completion {
    pub fn message(&self) -> &'static str {
        match self {
            Completion::Natural => "natural 8 or 9, the round is over",
            Completion::BothStand => "both sides stand on 6 or 7, the round is over",
            Completion::BankerStands => "banker stands, the round is over with 5 cards",
            Completion::BankerDrewAfterPlayerStood => {
                "banker drew a third card, the round is over with 5 cards"
            }
            Completion::BothDrew => "sixth card dealt, the round is over",
        }
    }
}

/// Why a sequence of cards cannot be a standard round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleViolation {
    TooManyCards,
    OutOfOrder,
    DrawAfterNatural,
    PlayerMustStand,
    PlayerMustDrawFirst,
    BankerMustStandAfterPlayerStood,
    BankerMustStand,
    CardCount,
}

impl RuleViolation {
    pub fn message(&self) -> &'static str {
        match self {
            RuleViolation::TooManyCards => "a hand holds at most 3 cards",
            RuleViolation::OutOfOrder => {
                "cards are out of order, deal player, banker, player, banker"
            }
            RuleViolation::DrawAfterNatural => "no card may be drawn after a natural 8 or 9",
            RuleViolation::PlayerMustStand => {
                "player stands on 6 or 7 and must not take a third card"
            }
            RuleViolation::PlayerMustDrawFirst => {
                "player draws on 0 to 5 and takes the third card before banker"
            }
            RuleViolation::BankerMustStandAfterPlayerStood => {
                "banker stands on 6 or 7 when player stands"
            }
            RuleViolation::BankerMustStand => "banker must stand against this player third card",
            RuleViolation::CardCount => "a round holds 4 to 6 cards",
        }
    }
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// States of the round acceptor. The `Awaiting*` states name the one side
/// allowed to receive the next card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    AwaitingPlayer1,
    AwaitingBanker1,
    AwaitingPlayer2,
    AwaitingBanker2,
    AwaitingPlayerThird,
    AwaitingBankerThird,
    Complete(Completion),
    Invalid(RuleViolation),
}

impl RoundState {
    /// Replays both hands through the machine.
    pub fn of(player: &[Label], banker: &[Label]) -> RoundState {
        if player.len() > MAX_HAND_CARDS || banker.len() > MAX_HAND_CARDS {
            return RoundState::Invalid(RuleViolation::TooManyCards);
        }

        let (mut dealt_player, mut dealt_banker) = (0, 0);
        let mut state = RoundState::AwaitingPlayer1;
        loop {
            match state.expected_side() {
                Some(Side::Player) if dealt_player < player.len() => dealt_player += 1,
                Some(Side::Banker) if dealt_banker < banker.len() => dealt_banker += 1,
                _ => break,
            }
            state = state.advance(&player[..dealt_player], &banker[..dealt_banker]);
        }

        if dealt_player < player.len() {
            RoundState::Invalid(state.reject(Side::Player))
        } else if dealt_banker < banker.len() {
            RoundState::Invalid(state.reject(Side::Banker))
        } else {
            state
        }
    }

    pub fn expected_side(&self) -> Option<Side> {
        match self {
            RoundState::AwaitingPlayer1
            | RoundState::AwaitingPlayer2
            | RoundState::AwaitingPlayerThird => Some(Side::Player),
            RoundState::AwaitingBanker1
            | RoundState::AwaitingBanker2
            | RoundState::AwaitingBankerThird => Some(Side::Banker),
            RoundState::Complete(_) | RoundState::Invalid(_) => None,
        }
    }

    /// Transition taken once the expected side has received its card.
    /// `player` and `banker` hold every card dealt so far, including it.
    fn advance(self, player: &[Label], banker: &[Label]) -> RoundState {
        match self {
            RoundState::AwaitingPlayer1 => RoundState::AwaitingBanker1,
            RoundState::AwaitingBanker1 => RoundState::AwaitingPlayer2,
            RoundState::AwaitingPlayer2 => RoundState::AwaitingBanker2,
            RoundState::AwaitingBanker2 => {
                let player_total = two_card_total(player);
                let banker_total = two_card_total(banker);
                // A natural on either side settles the round before any draw.
                if is_natural(player_total) || is_natural(banker_total) {
                    RoundState::Complete(Completion::Natural)
                } else if player_should_draw(player_total) {
                    RoundState::AwaitingPlayerThird
                } else if banker_should_draw_after_player_stood(banker_total) {
                    RoundState::AwaitingBankerThird
                } else {
                    RoundState::Complete(Completion::BothStand)
                }
            }
            RoundState::AwaitingPlayerThird => {
                if banker_should_draw(two_card_total(banker), player[2]) {
                    RoundState::AwaitingBankerThird
                } else {
                    RoundState::Complete(Completion::BankerStands)
                }
            }
            RoundState::AwaitingBankerThird => {
                if player.len() == MAX_HAND_CARDS {
                    RoundState::Complete(Completion::BothDrew)
                } else {
                    RoundState::Complete(Completion::BankerDrewAfterPlayerStood)
                }
            }
            RoundState::Complete(_) | RoundState::Invalid(_) => self,
        }
    }

    /// The violation committed when `side` holds a card this state does not
    /// allow it to receive.
    fn reject(self, side: Side) -> RuleViolation {
        match (self, side) {
            (RoundState::AwaitingPlayer1, _)
            | (RoundState::AwaitingBanker1, _)
            | (RoundState::AwaitingPlayer2, _)
            | (RoundState::AwaitingBanker2, _) => RuleViolation::OutOfOrder,
            (RoundState::AwaitingPlayerThird, _) => RuleViolation::PlayerMustDrawFirst,
            (RoundState::AwaitingBankerThird, _) => RuleViolation::PlayerMustStand,
            (RoundState::Complete(Completion::Natural), _) => RuleViolation::DrawAfterNatural,
            (RoundState::Complete(Completion::BothStand), Side::Player) => {
                RuleViolation::PlayerMustStand
            }
            (RoundState::Complete(Completion::BothStand), Side::Banker) => {
                RuleViolation::BankerMustStandAfterPlayerStood
            }
            (RoundState::Complete(Completion::BankerStands), _) => RuleViolation::BankerMustStand,
            (RoundState::Complete(Completion::BankerDrewAfterPlayerStood), _) => {
                RuleViolation::PlayerMustStand
            }
            (RoundState::Complete(Completion::BothDrew), _) => RuleViolation::TooManyCards,
            (RoundState::Invalid(violation), _) => violation,
        }
    }

    fn need_card_message(&self) -> &'static str {
        match self {
            RoundState::AwaitingPlayer1 => "deal the first player card",
            RoundState::AwaitingBanker1 => "deal the first banker card",
            RoundState::AwaitingPlayer2 => "deal the second player card",
            RoundState::AwaitingBanker2 => "deal the second banker card",
            RoundState::AwaitingPlayerThird => "player draws a third card",
            RoundState::AwaitingBankerThird => "banker draws a third card",
            RoundState::Complete(_) | RoundState::Invalid(_) => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    NeedCard(Side, &'static str),
    Complete(Completion),
    Invalid(RuleViolation),
}

impl NextStep {
    pub fn message(&self) -> &'static str {
        match self {
            NextStep::NeedCard(_, message) => *message,
            NextStep::Complete(completion) => completion.message(),
            NextStep::Invalid(violation) => violation.message(),
        }
    }
}

impl From<RoundState> for NextStep {
    fn from(state: RoundState) -> Self {
        match state {
            RoundState::Complete(completion) => NextStep::Complete(completion),
            RoundState::Invalid(violation) => NextStep::Invalid(violation),
            awaiting => match awaiting.expected_side() {
                Some(side) => NextStep::NeedCard(side, awaiting.need_card_message()),
                None => NextStep::Invalid(RuleViolation::OutOfOrder),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStatus {
    Incomplete(&'static str),
    Invalid(RuleViolation),
    Valid(Completion),
}

impl RoundStatus {
    pub fn message(&self) -> &'static str {
        match self {
            RoundStatus::Incomplete(message) => *message,
            RoundStatus::Invalid(violation) => violation.message(),
            RoundStatus::Valid(completion) => completion.message(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, RoundStatus::Valid(_))
    }
}

/// What the round needs next: a card for one side, nothing more, or a reset.
pub fn next_step(player: &[Label], banker: &[Label]) -> NextStep {
    RoundState::of(player, banker).into()
}

pub fn validate(player: &[Label], banker: &[Label]) -> RoundStatus {
    let total_cards = player.len() + banker.len();
    match next_step(player, banker) {
        NextStep::Invalid(violation) => RoundStatus::Invalid(violation),
        NextStep::Complete(completion) => {
            if (MIN_ROUND_CARDS..=MAX_ROUND_CARDS).contains(&total_cards) {
                RoundStatus::Valid(completion)
            } else {
                RoundStatus::Invalid(RuleViolation::CardCount)
            }
        }
        NextStep::NeedCard(_, message) => {
            if total_cards < MIN_ROUND_CARDS {
                RoundStatus::Incomplete("finish the four opening cards first")
            } else {
                RoundStatus::Incomplete(message)
            }
        }
    }
}

/// The side that received the most recent card, if any card has been dealt.
pub fn last_dealt_side(player: &[Label], banker: &[Label]) -> Option<Side> {
    if player.is_empty() && banker.is_empty() {
        return None;
    }
    if player.len() > banker.len() {
        Some(Side::Player)
    } else {
        Some(Side::Banker)
    }
}

/// Compares the final totals. Only meaningful for a complete round.
pub fn winner(player: &[Label], banker: &[Label]) -> Outcome {
    match hand_total(player).cmp(&hand_total(banker)) {
        Ordering::Greater => Outcome::Player,
        Ordering::Less => Outcome::Banker,
        Ordering::Equal => Outcome::Tie,
    }
}
