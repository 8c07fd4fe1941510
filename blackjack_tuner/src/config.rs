use crate::error::ConfigError;
use blackjack_lib::CountingScheme;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;

/// Shoes are rebuilt before a round once fewer than this many cards remain.
pub const RESHUFFLE_THRESHOLD: usize = 25;

/// Struct for the rules and shoe of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    pub num_decks: u32,
    pub counting_scheme: CountingScheme,
    pub hit_soft_seventeen: bool,
    pub reshuffle_threshold: usize,
    /// Pause between rounds, purely cosmetic.
    pub round_delay: Option<Duration>,
}

impl TableConfig {
    /// Associated method for returning a new `TableConfigBuilder` object.
    pub fn new() -> TableConfigBuilder {
        TableConfigBuilder {
            num_decks: None,
            counting_scheme: None,
            hit_soft_seventeen: None,
            reshuffle_threshold: None,
            round_delay: None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_decks == 0 {
            return Err(ConfigError::NoDecks);
        }
        Ok(())
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig::new().build()
    }
}

/// Struct to implement builder pattern for `TableConfig`
pub struct TableConfigBuilder {
    num_decks: Option<u32>,
    counting_scheme: Option<CountingScheme>,
    hit_soft_seventeen: Option<bool>,
    reshuffle_threshold: Option<usize>,
    round_delay: Option<Duration>,
}

impl TableConfigBuilder {
    /// Method for choosing the number of decks in the shoe.
    pub fn num_decks(&mut self, decks: u32) -> &mut Self {
        self.num_decks = Some(decks);
        self
    }

    /// Method for choosing the counting system the shoe keeps its running count with.
    pub fn counting_scheme(&mut self, scheme: CountingScheme) -> &mut Self {
        self.counting_scheme = Some(scheme);
        self
    }

    /// Method for setting whether the dealer must hit soft seventeens, default is true.
    pub fn hit_soft_seventeen(&mut self, hit: bool) -> &mut Self {
        self.hit_soft_seventeen = Some(hit);
        self
    }

    /// Method for setting how few cards may remain before the shoe is rebuilt at the start of a round.
    pub fn reshuffle_threshold(&mut self, cards: usize) -> &mut Self {
        self.reshuffle_threshold = Some(cards);
        self
    }

    pub fn round_delay(&mut self, delay: Duration) -> &mut Self {
        self.round_delay = Some(delay);
        self
    }

    /// Method for building a `TableConfig` object, unset fields take their defaults.
    pub fn build(&mut self) -> TableConfig {
        TableConfig {
            num_decks: self.num_decks.unwrap_or(6),
            counting_scheme: self.counting_scheme.unwrap_or(CountingScheme::HiLo),
            hit_soft_seventeen: self.hit_soft_seventeen.unwrap_or(true),
            reshuffle_threshold: self.reshuffle_threshold.unwrap_or(RESHUFFLE_THRESHOLD),
            round_delay: self.round_delay,
        }
    }
}

/// Struct for one bounded game: the table, a single counting agent and the caps that end it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub table: TableConfig,
    pub bankroll: i64,
    pub base_wager: u32,
    pub count_scalar: f32,
    pub count_cap: f32,
    pub hand_limit: u64,
    pub cash_limit: i64,
}

impl SessionConfig {
    /// Associated method for returning a new `SessionConfigBuilder` object.
    pub fn new() -> SessionConfigBuilder {
        SessionConfigBuilder {
            table: None,
            bankroll: None,
            base_wager: None,
            count_scalar: None,
            count_cap: None,
            hand_limit: None,
            cash_limit: None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.table.validate()?;
        if self.bankroll <= 0 {
            return Err(ConfigError::Bankroll(self.bankroll));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig::new().build()
    }
}

/// Struct to implement builder pattern for `SessionConfig`
pub struct SessionConfigBuilder {
    table: Option<TableConfig>,
    bankroll: Option<i64>,
    base_wager: Option<u32>,
    count_scalar: Option<f32>,
    count_cap: Option<f32>,
    hand_limit: Option<u64>,
    cash_limit: Option<i64>,
}

impl SessionConfigBuilder {
    pub fn table(&mut self, table: TableConfig) -> &mut Self {
        self.table = Some(table);
        self
    }

    /// Method for changing the starting balance of the player.
    pub fn bankroll(&mut self, bankroll: i64) -> &mut Self {
        self.bankroll = Some(bankroll);
        self
    }

    pub fn base_wager(&mut self, wager: u32) -> &mut Self {
        self.base_wager = Some(wager);
        self
    }

    /// Method for setting how strongly the running count scales the wager.
    pub fn count_scalar(&mut self, scalar: f32) -> &mut Self {
        self.count_scalar = Some(scalar);
        self
    }

    pub fn count_cap(&mut self, cap: f32) -> &mut Self {
        self.count_cap = Some(cap);
        self
    }

    /// Method for setting the maximum number of rounds played.
    pub fn hand_limit(&mut self, hands: u64) -> &mut Self {
        self.hand_limit = Some(hands);
        self
    }

    /// Method for setting the balance at which the player walks away.
    pub fn cash_limit(&mut self, cash: i64) -> &mut Self {
        self.cash_limit = Some(cash);
        self
    }

    pub fn build(&mut self) -> SessionConfig {
        SessionConfig {
            table: self.table.clone().unwrap_or_default(),
            bankroll: self.bankroll.unwrap_or(100_000),
            base_wager: self.base_wager.unwrap_or(10),
            count_scalar: self.count_scalar.unwrap_or(2.0),
            count_cap: self.count_cap.unwrap_or(9999.0),
            hand_limit: self.hand_limit.unwrap_or(u64::MAX),
            cash_limit: self.cash_limit.unwrap_or(i64::MAX),
        }
    }
}

/// Struct for the genetic search: population size, gene ranges, and the session every chromosome is scored by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub population_size: usize,
    pub bankroll: i64,
    pub hand_limit: u64,
    pub cash_limit: i64,
    pub mutation_rate: f64,
    pub count_scalar_range: RangeInclusive<u32>,
    pub base_wager_range: RangeInclusive<u32>,
    pub count_cap: f32,
    pub table: TableConfig,
    /// Score each generation's chromosomes on the rayon thread pool.
    pub parallel: bool,
}

impl OptimizerConfig {
    /// Associated method for returning a new `OptimizerConfigBuilder` object.
    pub fn new() -> OptimizerConfigBuilder {
        OptimizerConfigBuilder {
            population_size: None,
            bankroll: None,
            hand_limit: None,
            cash_limit: None,
            mutation_rate: None,
            count_scalar_range: None,
            base_wager_range: None,
            count_cap: None,
            table: None,
            parallel: None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.table.validate()?;
        if self.population_size < 2 {
            return Err(ConfigError::PopulationTooSmall(self.population_size));
        }
        if self.bankroll <= 0 {
            return Err(ConfigError::Bankroll(self.bankroll));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::MutationRate(self.mutation_rate));
        }
        for (gene, range) in [
            ("count scalar", &self.count_scalar_range),
            ("base wager", &self.base_wager_range),
        ] {
            if range.is_empty() {
                return Err(ConfigError::EmptyGeneRange {
                    gene,
                    min: *range.start(),
                    max: *range.end(),
                });
            }
        }
        Ok(())
    }

    /// The bounded session a chromosome with these genes is scored by.
    pub fn session(&self, scheme: CountingScheme, count_scalar: u32, base_wager: u32) -> SessionConfig {
        let mut table = self.table.clone();
        table.counting_scheme = scheme;
        SessionConfig::new()
            .table(table)
            .bankroll(self.bankroll)
            .base_wager(base_wager)
            .count_scalar(count_scalar as f32)
            .count_cap(self.count_cap)
            .hand_limit(self.hand_limit)
            .cash_limit(self.cash_limit)
            .build()
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig::new().build()
    }
}

/// Struct to implement builder pattern for `OptimizerConfig`
pub struct OptimizerConfigBuilder {
    population_size: Option<usize>,
    bankroll: Option<i64>,
    hand_limit: Option<u64>,
    cash_limit: Option<i64>,
    mutation_rate: Option<f64>,
    count_scalar_range: Option<RangeInclusive<u32>>,
    base_wager_range: Option<RangeInclusive<u32>>,
    count_cap: Option<f32>,
    table: Option<TableConfig>,
    parallel: Option<bool>,
}

impl OptimizerConfigBuilder {
    /// Method for setting the number of chromosomes in every generation.
    pub fn population_size(&mut self, size: usize) -> &mut Self {
        self.population_size = Some(size);
        self
    }

    /// Method for setting the starting balance of every scored session.
    pub fn bankroll(&mut self, bankroll: i64) -> &mut Self {
        self.bankroll = Some(bankroll);
        self
    }

    pub fn hand_limit(&mut self, hands: u64) -> &mut Self {
        self.hand_limit = Some(hands);
        self
    }

    /// Method for setting the balance that ends a scored session early, defaults to 100 times the bankroll.
    pub fn cash_limit(&mut self, cash: i64) -> &mut Self {
        self.cash_limit = Some(cash);
        self
    }

    /// Method for setting the probability that any single gene of an offspring is redrawn at random.
    pub fn mutation_rate(&mut self, rate: f64) -> &mut Self {
        self.mutation_rate = Some(rate);
        self
    }

    pub fn count_scalar_range(&mut self, range: RangeInclusive<u32>) -> &mut Self {
        self.count_scalar_range = Some(range);
        self
    }

    pub fn base_wager_range(&mut self, range: RangeInclusive<u32>) -> &mut Self {
        self.base_wager_range = Some(range);
        self
    }

    pub fn count_cap(&mut self, cap: f32) -> &mut Self {
        self.count_cap = Some(cap);
        self
    }

    /// Method for setting the table rules. The counting scheme is overridden per chromosome.
    pub fn table(&mut self, table: TableConfig) -> &mut Self {
        self.table = Some(table);
        self
    }

    pub fn parallel(&mut self, parallel: bool) -> &mut Self {
        self.parallel = Some(parallel);
        self
    }

    pub fn build(&mut self) -> OptimizerConfig {
        let bankroll = self.bankroll.unwrap_or(5000);
        OptimizerConfig {
            population_size: self.population_size.unwrap_or(50),
            bankroll,
            hand_limit: self.hand_limit.unwrap_or(10_000),
            cash_limit: self.cash_limit.unwrap_or(bankroll.saturating_mul(100)),
            mutation_rate: self.mutation_rate.unwrap_or(1.0 / 500.0),
            count_scalar_range: self.count_scalar_range.clone().unwrap_or(1..=20),
            base_wager_range: self.base_wager_range.clone().unwrap_or(5..=54),
            count_cap: self.count_cap.unwrap_or(9999.0),
            table: self.table.clone().unwrap_or_default(),
            parallel: self.parallel.unwrap_or(false),
        }
    }
}
