use blackjack_lib::Card;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;

/// The actions an agent may take on its turn.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Action {
    Stand,
    Hit,
    Double,
    Split,
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Action::Stand => "stand",
            Action::Hit => "hit",
            Action::Double => "double down",
            Action::Split => "split",
        };
        write!(f, "{}", name)
    }
}

/// Signal returned when a balance mutation leaves the balance at or below zero.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("balance fell to {balance}")]
pub struct Bankrupt {
    pub balance: i64,
}

/// Struct that keeps an agent's balance along with how much money has moved in and out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bankroll {
    balance: i64,
    cash_in: i64,
    cash_out: i64,
}

impl Bankroll {
    pub fn new(balance: i64) -> Bankroll {
        Bankroll {
            balance,
            cash_in: 0,
            cash_out: 0,
        }
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub fn cash_in(&self) -> i64 {
        self.cash_in
    }

    pub fn cash_out(&self) -> i64 {
        self.cash_out
    }

    /// Ratio of money won back to money staked. `None` until something has been staked.
    pub fn cash_in_out_ratio(&self) -> Option<f64> {
        if self.cash_out == 0 {
            None
        } else {
            Some(self.cash_in as f64 / self.cash_out as f64)
        }
    }

    /// Method that applies `delta` to the balance and records it as cash in or cash out.
    /// The change is always applied; if the balance ends at or below zero the caller gets `Err(Bankrupt)`.
    pub fn adjust(&mut self, delta: i64) -> Result<i64, Bankrupt> {
        if delta > 0 {
            self.cash_in += delta;
        } else {
            self.cash_out -= delta;
        }
        self.balance += delta;
        if self.balance <= 0 {
            return Err(Bankrupt {
                balance: self.balance,
            });
        }
        Ok(self.balance)
    }
}

/// The contract every participant at the table fulfils.
///
/// The table asks for a wager at the start of a round, then asks for an action until the
/// hand's turn is over, and asks for a double down wager whenever the agent doubles.
/// `count` is always the shoe's running count at the moment of asking.
pub trait Agent: Send {
    fn name(&self) -> &str;

    fn bankroll(&self) -> &Bankroll;

    fn bankroll_mut(&mut self) -> &mut Bankroll;

    /// Required method, the amount to stake on a new round.
    fn propose_wager(&mut self, count: i32) -> u32;

    /// Required method, how to play `cards` given the dealer's face up card.
    fn decide_action(&mut self, cards: &[Card], up_card: Card) -> Action;

    /// Required method, the extra amount to stake when doubling down on `cards`.
    fn propose_double_wager(&mut self, cards: &[Card], count: i32) -> u32;

    fn balance(&self) -> i64 {
        self.bankroll().balance()
    }

    fn adjust_balance(&mut self, delta: i64) -> Result<i64, Bankrupt> {
        self.bankroll_mut().adjust(delta)
    }
}
