use blackjack_lib::Seat;
use thiserror::Error;

/// Errors that stop a game in progress.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// A player's balance fell to zero or below. Recoverable: the session that owns the table
    /// records the final balance and stops.
    #[error("{name} ({seat}) has run out of money, balance is {balance}")]
    OutOfMoney {
        seat: Seat,
        name: String,
        balance: i64,
    },
    #[error("no players are seated at the table")]
    NoPlayers,
}

/// Errors raised while validating table or optimizer configurations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("a shoe needs at least one deck")]
    NoDecks,
    #[error("a population needs at least 2 chromosomes, got {0}")]
    PopulationTooSmall(usize),
    #[error("the {gene} gene range {min}..={max} is empty")]
    EmptyGeneRange {
        gene: &'static str,
        min: u32,
        max: u32,
    },
    #[error("mutation rate must lie within [0, 1], got {0}")]
    MutationRate(f64),
    #[error("starting bankroll must be positive, got {0}")]
    Bankroll(i64),
}

/// Any failure from configuring and running a simulation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TunerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Game(#[from] GameError),
}
