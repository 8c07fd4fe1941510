//! Card counting blackjack simulation and a genetic tuner for counting strategies.
//!
//! A [`Table`] plays rounds between seated [`Agent`]s and a fixed rule dealer. A
//! [`CountingAgent`] plays basic strategy and sizes its wagers from the running count; the
//! [`Optimizer`] searches for the counting scheme, count scalar and base wager that leave such
//! an agent with the largest balance after a bounded session.

pub mod config;
pub mod error;
pub mod game;
pub mod genetics;
pub mod write;

pub mod prelude {
    pub use super::config::{
        OptimizerConfig, OptimizerConfigBuilder, SessionConfig, SessionConfigBuilder, TableConfig,
        TableConfigBuilder,
    };
    pub use super::error::{ConfigError, GameError, TunerError};
    pub use super::game::prelude::*;
    pub use super::genetics::{
        evaluate, Chromosome, GenerationSummary, Generations, Genes, Optimizer,
    };
    pub use super::write::{write_generations, write_report, OutputFormat, WriteError};
    pub use blackjack_lib::{CountingScheme, SimRng};
}

pub use prelude::*;
