use crate::config::TableConfig;
use crate::error::{ConfigError, GameError};
use crate::game::agent::{Action, Agent};
use crate::game::dealer::DealerAgent;
use crate::game::event::{TableEvent, TableObserver};
use blackjack_lib::{Card, Hand, Seat, Shoe, SimRng};
use log::Level;
use rand::SeedableRng;
use serde::Serialize;
use std::fmt::Display;

/// How a single player hand fared against the dealer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
pub enum Outcome {
    DealerBust,
    Natural,
    NaturalPush,
    Win,
    Push,
    Loss,
}

impl Outcome {
    /// Associated method that settles `hand` against the dealer's final hand.
    /// The rules are checked in order and the first match wins.
    pub fn settle(hand: &Hand, dealer: &Hand) -> Outcome {
        let total = hand.value().total;
        let dealer_total = dealer.value().total;
        let dealer_natural = dealer.is_natural();

        if dealer_total > 21 && total <= 21 {
            Outcome::DealerBust
        } else if hand.is_natural() {
            if dealer_natural {
                Outcome::NaturalPush
            } else {
                Outcome::Natural
            }
        } else if total > dealer_total && total <= 21 {
            Outcome::Win
        } else if total == dealer_total && !dealer_natural {
            Outcome::Push
        } else {
            Outcome::Loss
        }
    }

    /// The amount returned to the player for a hand with `wager` riding on it, stake included.
    pub fn payout(&self, wager: u32) -> i64 {
        let wager = wager as i64;
        match self {
            Outcome::DealerBust | Outcome::Win => wager * 2,
            Outcome::Natural => wager * 5 / 2,
            Outcome::NaturalPush | Outcome::Push => wager,
            Outcome::Loss => 0,
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Outcome::DealerBust => "wins, the dealer is bust",
            Outcome::Natural => "wins with blackjack",
            Outcome::NaturalPush => "pushes, both have blackjack",
            Outcome::Win => "beats the dealer",
            Outcome::Push => "ties the dealer",
            Outcome::Loss => "loses to the dealer",
        };
        write!(f, "{}", text)
    }
}

/// Struct for a blackjack table: owns the shoe, the dealer and the seated players, and plays rounds.
pub struct Table {
    pub(crate) config: TableConfig,
    shoe: Shoe,
    dealer: DealerAgent,
    pub(crate) players: Vec<Box<dyn Agent>>,
    observers: Vec<Box<dyn TableObserver>>,
    rounds_played: u64,
}

impl Table {
    /// Associated method for building a new table with a freshly built shoe drawing from `rng`.
    pub fn new(config: TableConfig, rng: SimRng) -> Result<Table, ConfigError> {
        config.validate()?;
        let shoe = Shoe::new(config.num_decks, config.counting_scheme, rng);
        Ok(Table::with_shoe(config, shoe))
    }

    /// Same as `Table::new`, seeding the table's random stream from `seed`.
    pub fn seeded(config: TableConfig, seed: u64) -> Result<Table, ConfigError> {
        Table::new(config, SimRng::seed_from_u64(seed))
    }

    /// Associated method for a table that deals from an existing `shoe`.
    pub fn with_shoe(config: TableConfig, shoe: Shoe) -> Table {
        Table {
            dealer: DealerAgent::new(config.hit_soft_seventeen),
            config,
            shoe,
            players: Vec::new(),
            observers: Vec::new(),
            rounds_played: 0,
        }
    }

    /// Seats `agent` at the next free seat and returns the seat index. Players act in seat order.
    pub fn add_player(&mut self, agent: Box<dyn Agent>) -> usize {
        self.players.push(agent);
        self.players.len() - 1
    }

    /// Registers an observer that receives every event the table emits.
    pub fn observe<O: TableObserver + 'static>(&mut self, observer: O) {
        self.observers.push(Box::new(observer));
    }

    pub fn player(&self, seat: usize) -> Option<&dyn Agent> {
        self.players.get(seat).map(|p| p.as_ref())
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn rounds_played(&self) -> u64 {
        self.rounds_played
    }

    /// Method that plays one full round: wagers, the deal, every player hand (splits included),
    /// the dealer's hand, then settlement.
    ///
    /// Returns whether another round can be played. A player going broke ends the round early
    /// with `GameError::OutOfMoney`.
    pub fn play_round(&mut self) -> Result<bool, GameError> {
        if self.shoe.cards_left() < self.config.reshuffle_threshold {
            self.shoe.rebuild();
            let cards = self.shoe.cards_left();
            self.emit(TableEvent::ShoeRebuilt { cards });
        }

        // Each player stakes and is dealt two cards before the next player; the dealer goes last.
        let mut hands: Vec<Hand> = Vec::with_capacity(self.players.len() * 2);
        for i in 0..self.players.len() {
            let seat = Seat::Player(i);
            let count = self.shoe.running_count();
            let wager = self.players[i].propose_wager(count);
            if self.observing(Level::Debug) {
                let name = self.players[i].name().to_string();
                self.emit(TableEvent::WagerPlaced {
                    seat,
                    name,
                    amount: wager,
                    count,
                });
            }
            self.charge(seat, wager)?;
            let first = self.deal(seat);
            let second = self.deal(seat);
            hands.push(Hand::new(seat, first, second, wager));
        }
        let first = self.deal(Seat::Dealer);
        let second = self.deal(Seat::Dealer);
        let up_card = first;

        let mut i = 0;
        while i < hands.len() {
            self.play_hand(&mut hands, i, up_card)?;
            i += 1;
        }

        let mut house = vec![Hand::new(Seat::Dealer, first, second, 0)];
        self.play_hand(&mut house, 0, up_card)?;
        let dealer_hand = &house[0];

        for hand in hands.iter() {
            let outcome = Outcome::settle(hand, dealer_hand);
            let payout = outcome.payout(hand.wager);
            if payout > 0 {
                self.credit(hand.owner, payout)?;
            }
            if self.observing(Level::Debug) {
                let agent = self.agent(hand.owner);
                let event = TableEvent::HandSettled {
                    seat: hand.owner,
                    name: agent.name().to_string(),
                    outcome,
                    wager: hand.wager,
                    payout,
                    balance: agent.balance(),
                };
                self.emit(event);
            }
        }

        self.rounds_played += 1;
        Ok(!self.players.is_empty())
    }

    /// Drives the hand at `idx` through its turn. Splitting inserts the new hand right after
    /// the current one, so it is played out before any later hand.
    ///
    /// Split legality is the agent's business: any two cards may be split.
    fn play_hand(
        &mut self,
        hands: &mut Vec<Hand>,
        idx: usize,
        up_card: Card,
    ) -> Result<(), GameError> {
        let seat = hands[idx].owner;
        loop {
            let action = self.agent_mut(seat).decide_action(&hands[idx].cards, up_card);
            if self.observing(Level::Trace) {
                self.emit(TableEvent::ActionTaken {
                    seat,
                    action,
                    cards: hands[idx].cards.clone(),
                    total: hands[idx].value().total,
                });
            }

            match action {
                Action::Stand => return Ok(()),
                Action::Hit => {
                    let card = self.deal(seat);
                    hands[idx].cards.push(card);
                }
                Action::Double => {
                    let count = self.shoe.running_count();
                    let extra = self
                        .agent_mut(seat)
                        .propose_double_wager(&hands[idx].cards, count);
                    hands[idx].wager = hands[idx].wager.saturating_add(extra);
                    self.charge(seat, extra)?;
                    let card = self.deal(seat);
                    hands[idx].cards.push(card);
                    self.check_bust(&hands[idx]);
                    return Ok(());
                }
                Action::Split => {
                    let moved = hands[idx].cards.remove(1);
                    let replacement = self.deal(seat);
                    let wager = hands[idx].wager;
                    let new_hand = Hand {
                        owner: seat,
                        cards: vec![moved, replacement],
                        wager,
                        split: true,
                    };
                    self.charge(seat, wager)?;
                    hands[idx].split = true;
                    hands.insert(idx + 1, new_hand);
                    let card = self.deal(seat);
                    hands[idx].cards.insert(1, card);
                }
            }

            if self.check_bust(&hands[idx]) {
                return Ok(());
            }
        }
    }

    fn check_bust(&mut self, hand: &Hand) -> bool {
        let value = hand.value();
        if value.is_bust() {
            self.emit(TableEvent::Bust {
                seat: hand.owner,
                total: value.total,
            });
        }
        value.is_bust()
    }

    fn deal(&mut self, seat: Seat) -> Card {
        let rebuilds = self.shoe.rebuilds();
        let card = self.shoe.deal_next();
        if self.shoe.rebuilds() != rebuilds && self.observing(Level::Debug) {
            // Ran dry mid-round; the dealt card came from the new shoe.
            let cards = self.shoe.cards_left() + 1;
            self.emit(TableEvent::ShoeRebuilt { cards });
        }
        if self.observing(Level::Trace) {
            let count = self.shoe.running_count();
            self.emit(TableEvent::CardDealt { seat, card, count });
        }
        card
    }

    fn charge(&mut self, seat: Seat, amount: u32) -> Result<(), GameError> {
        self.transfer(seat, -(amount as i64))
    }

    fn credit(&mut self, seat: Seat, amount: i64) -> Result<(), GameError> {
        self.transfer(seat, amount)
    }

    fn transfer(&mut self, seat: Seat, delta: i64) -> Result<(), GameError> {
        let result = self.agent_mut(seat).adjust_balance(delta);
        result.map(|_| ()).map_err(|bankrupt| GameError::OutOfMoney {
            seat,
            name: self.agent(seat).name().to_string(),
            balance: bankrupt.balance,
        })
    }

    fn agent(&self, seat: Seat) -> &dyn Agent {
        match seat {
            Seat::Dealer => &self.dealer,
            Seat::Player(i) => self.players[i].as_ref(),
        }
    }

    fn agent_mut(&mut self, seat: Seat) -> &mut dyn Agent {
        match seat {
            Seat::Dealer => &mut self.dealer,
            Seat::Player(i) => self.players[i].as_mut(),
        }
    }

    fn observing(&self, level: Level) -> bool {
        !self.observers.is_empty() || log::log_enabled!(level)
    }

    fn emit(&mut self, event: TableEvent) {
        log::log!(event.level(), "{}", event);
        for observer in self.observers.iter_mut() {
            observer.notify(&event);
        }
    }
}
