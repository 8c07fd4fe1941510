//! Cards, shoes and hand valuation for blackjack simulations.
//!
//! Nothing in this crate knows about players or strategies. A [`Shoe`] deals cards and keeps a
//! running count under a [`CountingScheme`]; [`hand_value`] scores a set of cards; a [`Hand`]
//! records who holds which cards and how much is riding on them.

pub mod card;
pub mod hand;
pub mod shoe;

pub mod prelude {
    pub use crate::card::{Card, Deck, Rank, Suit};
    pub use crate::hand::{hand_value, Hand, HandValue, Seat};
    pub use crate::shoe::{CountingScheme, ParseSchemeError, Shoe, SimRng};
}

pub use prelude::*;
