use crate::game::agent::Action;
use crate::game::table::Outcome;
use blackjack_lib::{Card, Seat};
use log::Level;
use serde::Serialize;
use std::fmt::Display;

/// Notifications a table emits while a round is played. Each carries the verbosity it is
/// logged at so listeners can filter the same way the logger does.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TableEvent {
    ShoeRebuilt {
        cards: usize,
    },
    WagerPlaced {
        seat: Seat,
        name: String,
        amount: u32,
        count: i32,
    },
    CardDealt {
        seat: Seat,
        card: Card,
        count: i32,
    },
    ActionTaken {
        seat: Seat,
        action: Action,
        cards: Vec<Card>,
        total: u32,
    },
    Bust {
        seat: Seat,
        total: u32,
    },
    HandSettled {
        seat: Seat,
        name: String,
        outcome: Outcome,
        wager: u32,
        payout: i64,
        balance: i64,
    },
}

impl TableEvent {
    pub fn level(&self) -> Level {
        match self {
            TableEvent::CardDealt { .. } | TableEvent::ActionTaken { .. } => Level::Trace,
            TableEvent::ShoeRebuilt { .. }
            | TableEvent::WagerPlaced { .. }
            | TableEvent::Bust { .. }
            | TableEvent::HandSettled { .. } => Level::Debug,
        }
    }
}

fn cards_to_string(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<String>>()
        .join(" ")
}

impl Display for TableEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableEvent::ShoeRebuilt { cards } => {
                write!(f, "new shoe of {} cards, count reset to 0", cards)
            }
            TableEvent::WagerPlaced {
                seat,
                name,
                amount,
                count,
            } => write!(f, "{} ({}) bets {}, the count is {}", name, seat, amount, count),
            TableEvent::CardDealt { seat, card, count } => {
                write!(f, "{} receives {}, the count is {}", seat, card, count)
            }
            TableEvent::ActionTaken {
                seat,
                action,
                cards,
                total,
            } => write!(
                f,
                "{} chooses to {} on {} [{}]",
                seat,
                action,
                cards_to_string(cards),
                total
            ),
            TableEvent::Bust { seat, total } => write!(f, "{} is bust with {}", seat, total),
            TableEvent::HandSettled {
                seat,
                name,
                outcome,
                wager,
                payout,
                balance,
            } => write!(
                f,
                "{} ({}) {} on a wager of {}, receives {}, new balance is {}",
                name, seat, outcome, wager, payout, balance
            ),
        }
    }
}

/// Trait for anything that wants to follow a table's events, closures included.
pub trait TableObserver: Send {
    fn notify(&mut self, event: &TableEvent);
}

impl<F> TableObserver for F
where
    F: FnMut(&TableEvent) + Send,
{
    fn notify(&mut self, event: &TableEvent) {
        self(event)
    }
}
