use crate::card::Card;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The total of a hand together with whether an ace is still being counted as 11.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandValue {
    pub total: u32,
    pub soft: bool,
}

impl HandValue {
    pub fn is_bust(&self) -> bool {
        self.total > 21
    }
}

/// Computes the value of `cards`. Aces start at 11 and are demoted to 1, one at a time,
/// while the total is over 21.
pub fn hand_value(cards: &[Card]) -> HandValue {
    let mut total: u32 = cards.iter().map(|c| c.value() as u32).sum();
    let mut high_aces = cards.iter().filter(|c| c.is_ace()).count();
    while total > 21 && high_aces > 0 {
        total -= 10;
        high_aces -= 1;
    }
    HandValue {
        total,
        soft: high_aces > 0,
    }
}

/// Who a hand belongs to: the dealer, or the player sitting in a given seat.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Seat {
    Dealer,
    Player(usize),
}

impl Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Seat::Dealer => write!(f, "dealer"),
            Seat::Player(i) => write!(f, "seat {}", i + 1),
        }
    }
}

/// A hand in play during a single round. The owner is referenced by seat, the table holds the agents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hand {
    pub owner: Seat,
    pub cards: Vec<Card>,
    pub wager: u32,
    pub split: bool,
}

impl Hand {
    /// Associated method to create a two card hand as dealt at the start of a round.
    pub fn new(owner: Seat, first: Card, second: Card, wager: u32) -> Hand {
        Hand {
            owner,
            cards: vec![first, second],
            wager,
            split: false,
        }
    }

    pub fn value(&self) -> HandValue {
        hand_value(&self.cards)
    }

    /// A natural is an ace and a ten valued card as the first two cards of a hand that was not split.
    pub fn is_natural(&self) -> bool {
        !self.split
            && self.cards.len() == 2
            && self.cards.iter().any(|c| c.is_ace())
            && self.value().total == 21
    }
}

impl Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for card in self.cards.iter() {
            write!(f, "{} ", card)?;
        }
        write!(f, "[{}]", self.value().total)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::card::{Rank, Suit};

    fn cards(ranks: &[Rank]) -> Vec<Card> {
        ranks.iter().map(|r| Card::new(Suit::Clubs, *r)).collect()
    }

    #[test]
    fn test_soft_seventeen() {
        let value = hand_value(&cards(&[Rank::Ace, Rank::Six]));
        assert_eq!(value, HandValue { total: 17, soft: true });
    }

    #[test]
    fn test_ace_demoted() {
        let value = hand_value(&cards(&[Rank::Ace, Rank::Six, Rank::Five]));
        assert_eq!(value, HandValue { total: 12, soft: false });
    }

    #[test]
    fn test_multiple_aces() {
        let value = hand_value(&cards(&[Rank::Ace, Rank::Ace]));
        assert_eq!(value, HandValue { total: 12, soft: true });
        let value = hand_value(&cards(&[Rank::Ace, Rank::Ace, Rank::Nine, Rank::King]));
        assert_eq!(value, HandValue { total: 21, soft: false });
        let value = hand_value(&cards(&[Rank::King, Rank::Queen, Rank::Two]));
        assert_eq!(value, HandValue { total: 22, soft: false });
        assert!(value.is_bust());
    }

    #[test]
    fn test_long_hand_total_is_exact() {
        let ranks = [Rank::King; 30];
        let value = hand_value(&cards(&ranks));
        assert_eq!(value, HandValue { total: 300, soft: false });
        assert!(value.is_bust());

        let mut ranks = vec![Rank::Ace; 40];
        ranks.push(Rank::Nine);
        assert_eq!(hand_value(&cards(&ranks)).total, 49);
    }

    #[test]
    fn test_natural() {
        let c = cards(&[Rank::Ace, Rank::King]);
        let mut hand = Hand::new(Seat::Player(0), c[0], c[1], 10);
        assert_eq!(hand.value().total, 21);
        assert!(hand.is_natural());

        hand.split = true;
        assert!(!hand.is_natural());
    }

    #[test]
    fn test_three_card_twenty_one_is_not_natural() {
        let c = cards(&[Rank::Seven, Rank::Seven, Rank::Seven]);
        let mut hand = Hand::new(Seat::Dealer, c[0], c[1], 0);
        hand.cards.push(c[2]);
        assert_eq!(hand.value().total, 21);
        assert!(!hand.is_natural());
    }
}
