//! Module that focuses on playing blackjack: the agents seated at a table, the round engine that
//!  deals and settles their hands, and the driver that plays a bounded game to completion.

pub mod agent;
pub mod dealer;
pub mod event;
pub mod player;
pub mod session;
pub mod strategy;
pub mod table;

pub mod prelude {
    pub use crate::game::agent::{Action, Agent, Bankroll, Bankrupt};
    pub use crate::game::dealer::DealerAgent;
    pub use crate::game::event::{TableEvent, TableObserver};
    pub use crate::game::player::CountingAgent;
    pub use crate::game::session::{run_session, GameReport, StopReason};
    pub use crate::game::strategy::{BasicStrategy, HandCategory, WagerPolicy};
    pub use crate::game::table::{Outcome, Table};
}

pub use prelude::*;
