use crate::game::agent::{Action, Agent, Bankroll};
use blackjack_lib::{hand_value, Card};

/// The house. Plays its hand by fixed rules and never wagers.
#[derive(Debug, Clone)]
pub struct DealerAgent {
    hit_soft_seventeen: bool,
    bankroll: Bankroll,
}

impl DealerAgent {
    /// Associated method to create a new dealer, `hit_soft_seventeen` decides whether the
    /// dealer draws on a soft 17.
    pub fn new(hit_soft_seventeen: bool) -> DealerAgent {
        DealerAgent {
            hit_soft_seventeen,
            bankroll: Bankroll::new(0),
        }
    }

    pub fn hits_soft_seventeen(&self) -> bool {
        self.hit_soft_seventeen
    }
}

impl Agent for DealerAgent {
    fn name(&self) -> &str {
        "Dealer"
    }

    fn bankroll(&self) -> &Bankroll {
        &self.bankroll
    }

    fn bankroll_mut(&mut self) -> &mut Bankroll {
        &mut self.bankroll
    }

    fn propose_wager(&mut self, _count: i32) -> u32 {
        panic!("the dealer does not wager");
    }

    /// Hit below 17, hit a soft 17 only when configured to, otherwise stand.
    fn decide_action(&mut self, cards: &[Card], _up_card: Card) -> Action {
        let value = hand_value(cards);
        if value.total < 17 {
            Action::Hit
        } else if value.total == 17 && value.soft && self.hit_soft_seventeen {
            Action::Hit
        } else {
            Action::Stand
        }
    }

    fn propose_double_wager(&mut self, _cards: &[Card], _count: i32) -> u32 {
        panic!("the dealer does not double down");
    }
}
