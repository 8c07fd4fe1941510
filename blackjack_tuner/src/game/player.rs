use crate::game::agent::{Action, Agent, Bankroll};
use crate::game::strategy::{BasicStrategy, WagerPolicy};
use blackjack_lib::Card;
use std::fmt::Display;

/// Struct for a simulated player that plays basic strategy and sizes its wagers from the count.
#[derive(Debug, Clone)]
pub struct CountingAgent {
    name: String,
    bankroll: Bankroll,
    strategy: BasicStrategy,
    policy: WagerPolicy,
    last_wager: u32,
}

impl CountingAgent {
    /// Associated function to create a new `CountingAgent` with a starting balance of `bankroll`.
    pub fn new<S: Into<String>>(name: S, bankroll: i64, policy: WagerPolicy) -> CountingAgent {
        CountingAgent {
            name: name.into(),
            bankroll: Bankroll::new(bankroll),
            strategy: BasicStrategy::new(),
            policy,
            last_wager: 0,
        }
    }

    pub fn policy(&self) -> &WagerPolicy {
        &self.policy
    }

    /// The most recent regular wager this agent proposed, 0 before the first round.
    pub fn last_wager(&self) -> u32 {
        self.last_wager
    }
}

impl Agent for CountingAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn bankroll(&self) -> &Bankroll {
        &self.bankroll
    }

    fn bankroll_mut(&mut self) -> &mut Bankroll {
        &mut self.bankroll
    }

    fn propose_wager(&mut self, count: i32) -> u32 {
        let wager = self.policy.wager(count, self.bankroll.balance());
        self.last_wager = wager;
        wager
    }

    fn decide_action(&mut self, cards: &[Card], up_card: Card) -> Action {
        self.strategy.decide(cards, up_card)
    }

    /// Same sizing as a regular wager, but never more than the last regular wager.
    fn propose_double_wager(&mut self, _cards: &[Card], count: i32) -> u32 {
        self.policy
            .wager(count, self.bankroll.balance())
            .min(self.last_wager)
    }
}

impl Display for CountingAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (balance {}, base wager {}, count scalar {})",
            self.name,
            self.bankroll.balance(),
            self.policy.base_wager,
            self.policy.count_scalar
        )
    }
}
