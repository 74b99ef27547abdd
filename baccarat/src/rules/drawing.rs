use crate::Label;

/// A two-card total of 8 or 9 ends the round for both sides.
pub fn is_natural(two_card_total: u8) -> bool {
    two_card_total >= 8
}

/// Player draws on 0-5 and stands on 6 or 7.
pub fn player_should_draw(player_total: u8) -> bool {
    player_total <= 5
}

/// Banker draws on 0-5 when player stood on two cards.
pub fn banker_should_draw_after_player_stood(banker_total: u8) -> bool {
    banker_total <= 5
}

/// Third-card rule for the banker once player has taken a third card.
pub fn banker_should_draw(banker_total: u8, player_third_card: Label) -> bool {
    let third = player_third_card.point();
    match banker_total {
        0..=2 => true,
        3 => third != 8,
        4 => (2..=7).contains(&third),
        5 => (4..=7).contains(&third),
        6 => third == 6 || third == 7,
        _ => false,
    }
}
