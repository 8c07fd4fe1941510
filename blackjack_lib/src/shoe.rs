use crate::card::{Card, Deck, Rank};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// The random stream type threaded through every shoe, table and optimizer.
pub type SimRng = ChaCha8Rng;

/// The card counting systems a shoe can keep a running count for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CountingScheme {
    HiLo,
    HiOptI,
    HiOptII,
    KO,
    OmegaII,
    ZenCount,
    None,
}

// Columns are 2, 3, 4, 5, 6, 7, 8, 9, ten/face, ace.
const HI_LO: [i32; 10] = [1, 1, 1, 1, 1, 0, 0, 0, -1, -1];
const HI_OPT_I: [i32; 10] = [0, 1, 1, 1, 1, 0, 0, 0, -1, 0];
const HI_OPT_II: [i32; 10] = [1, 1, 2, 2, 1, 1, 0, 0, -2, 0];
const KNOCK_OUT: [i32; 10] = [1, 1, 1, 1, 1, 1, 0, 0, -1, -1];
const OMEGA_II: [i32; 10] = [1, 1, 2, 2, 2, 1, 0, -1, -2, 0];
const ZEN_COUNT: [i32; 10] = [1, 1, 2, 2, 2, 1, 0, 0, -2, -1];
const UNCOUNTED: [i32; 10] = [0; 10];

impl CountingScheme {
    pub const ALL: [CountingScheme; 7] = [
        CountingScheme::HiLo,
        CountingScheme::HiOptI,
        CountingScheme::HiOptII,
        CountingScheme::KO,
        CountingScheme::OmegaII,
        CountingScheme::ZenCount,
        CountingScheme::None,
    ];

    fn weights(&self) -> &'static [i32; 10] {
        match self {
            CountingScheme::HiLo => &HI_LO,
            CountingScheme::HiOptI => &HI_OPT_I,
            CountingScheme::HiOptII => &HI_OPT_II,
            CountingScheme::KO => &KNOCK_OUT,
            CountingScheme::OmegaII => &OMEGA_II,
            CountingScheme::ZenCount => &ZEN_COUNT,
            CountingScheme::None => &UNCOUNTED,
        }
    }

    /// How much a dealt card of `rank` moves the running count under this scheme.
    pub fn weight(&self, rank: Rank) -> i32 {
        self.weights()[rank.index()]
    }
}

impl Display for CountingScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CountingScheme::HiLo => "HiLo",
            CountingScheme::HiOptI => "HiOptI",
            CountingScheme::HiOptII => "HiOptII",
            CountingScheme::KO => "KO",
            CountingScheme::OmegaII => "OmegaII",
            CountingScheme::ZenCount => "ZenCount",
            CountingScheme::None => "None",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("counting scheme `{0}` not recognized")]
pub struct ParseSchemeError(pub String);

impl FromStr for CountingScheme {
    type Err = ParseSchemeError;

    /// Parses a scheme name, ignoring case, spaces and dashes, so `hi-opt-ii` and `HiOptII` agree.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(|c| c.to_lowercase())
            .collect();
        CountingScheme::ALL
            .into_iter()
            .find(|scheme| scheme.to_string().to_lowercase() == normalized)
            .ok_or_else(|| ParseSchemeError(s.to_string()))
    }
}

/// Struct that models a dealing shoe: several decks merged into one ordered supply with a running count.
///
/// The front of `cards` is the next card dealt. The shoe never runs dry from the caller's
/// point of view: dealing from an empty shoe rebuilds it and carries on, and every rebuild
/// resets the running count to zero. Deciding when to rebuild early (e.g. below a cut card
/// threshold) is left to whoever owns the shoe.
#[derive(Debug, Clone)]
pub struct Shoe {
    cards: VecDeque<Card>,
    num_decks: u32,
    scheme: CountingScheme,
    running_count: i32,
    rebuilds: u64,
    rng: SimRng,
}

impl Shoe {
    /// Associated method for building a freshly shuffled shoe of `num_decks` decks.
    /// `rng` becomes the shoe's private random stream for this and every later rebuild.
    ///
    /// Panics if `num_decks` is zero.
    pub fn new(num_decks: u32, scheme: CountingScheme, rng: SimRng) -> Shoe {
        assert!(num_decks > 0, "a shoe needs at least one deck");
        let mut shoe = Shoe {
            cards: VecDeque::with_capacity(52 * num_decks as usize),
            num_decks,
            scheme,
            running_count: 0,
            rebuilds: 0,
            rng,
        };
        shoe.rebuild();
        shoe
    }

    /// Associated method for a shoe that deals `cards` in the given order before falling back
    /// to regular rebuilds of `num_decks` decks. Useful for replaying a known sequence.
    pub fn from_cards<I>(cards: I, num_decks: u32, scheme: CountingScheme, rng: SimRng) -> Shoe
    where
        I: IntoIterator<Item = Card>,
    {
        assert!(num_decks > 0, "a shoe needs at least one deck");
        Shoe {
            cards: cards.into_iter().collect(),
            num_decks,
            scheme,
            running_count: 0,
            rebuilds: 0,
            rng,
        }
    }

    /// Method that discards whatever is left and rebuilds the shoe. Each deck is shuffled on its
    /// own and appended, then the combined shoe is shuffled again. The running count restarts at 0.
    pub fn rebuild(&mut self) {
        self.cards.clear();
        let mut deck = Deck::new();
        for _ in 0..self.num_decks {
            deck.shuffle(&mut self.rng);
            self.cards.extend(deck.cards().iter().copied());
        }
        self.cards.make_contiguous().shuffle(&mut self.rng);
        self.running_count = 0;
        self.rebuilds += 1;
        log::trace!(
            "rebuilt shoe with {} decks counted by {}",
            self.num_decks,
            self.scheme
        );
    }

    /// Method that deals the front card and folds it into the running count.
    pub fn deal_next(&mut self) -> Card {
        loop {
            if let Some(card) = self.cards.pop_front() {
                self.running_count += self.scheme.weight(card.rank);
                return card;
            }
            // Depleted: the count restarts with the new shoe, visible through `rebuilds`.
            self.rebuild();
        }
    }

    pub fn cards_left(&self) -> usize {
        self.cards.len()
    }

    pub fn running_count(&self) -> i32 {
        self.running_count
    }

    /// How many times the shoe has been rebuilt, the initial build of [`Shoe::new`] included.
    /// Callers compare it across [`Shoe::deal_next`] to notice a rebuild forced by depletion.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn num_decks(&self) -> u32 {
        self.num_decks
    }

    pub fn scheme(&self) -> CountingScheme {
        self.scheme
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::card::Suit;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn card(rank: Rank) -> Card {
        Card::new(Suit::Spades, rank)
    }

    #[test]
    fn test_new_shoe_holds_every_card_of_every_deck() {
        let shoe = Shoe::new(6, CountingScheme::HiLo, SimRng::seed_from_u64(1));
        assert_eq!(shoe.cards_left(), 6 * 52);
        assert_eq!(shoe.running_count(), 0);
        assert_eq!(shoe.rebuilds(), 1);

        let mut tally: HashMap<Card, usize> = HashMap::new();
        for c in shoe.cards.iter() {
            *tally.entry(*c).or_default() += 1;
        }
        assert_eq!(tally.len(), 52);
        assert!(tally.values().all(|n| *n == 6));
    }

    #[test]
    fn test_running_count_follows_scheme() {
        let cards = vec![
            card(Rank::Two),
            card(Rank::Five),
            card(Rank::King),
            card(Rank::Ace),
            card(Rank::Seven),
            card(Rank::Four),
        ];
        let mut shoe = Shoe::from_cards(
            cards.clone(),
            1,
            CountingScheme::HiOptII,
            SimRng::seed_from_u64(0),
        );
        let mut expected = 0;
        for c in cards {
            assert_eq!(shoe.deal_next(), c);
            expected += CountingScheme::HiOptII.weight(c.rank);
            assert_eq!(shoe.running_count(), expected);
        }
        // 1 + 2 - 2 + 0 + 1 + 2
        assert_eq!(expected, 4);
    }

    #[test]
    fn test_depletion_rebuilds_and_resets_count() {
        let mut shoe = Shoe::from_cards(
            vec![card(Rank::Two), card(Rank::Three)],
            2,
            CountingScheme::HiLo,
            SimRng::seed_from_u64(3),
        );
        shoe.deal_next();
        shoe.deal_next();
        assert_eq!(shoe.running_count(), 2);
        assert_eq!(shoe.cards_left(), 0);
        assert_eq!(shoe.rebuilds(), 0);

        let next = shoe.deal_next();
        assert_eq!(shoe.rebuilds(), 1);
        assert_eq!(shoe.cards_left(), 2 * 52 - 1);
        assert_eq!(shoe.running_count(), CountingScheme::HiLo.weight(next.rank));
    }

    #[test]
    fn test_rebuilds_counts_explicit_and_forced() {
        let mut shoe = Shoe::new(1, CountingScheme::HiLo, SimRng::seed_from_u64(5));
        shoe.rebuild();
        assert_eq!(shoe.rebuilds(), 2);
        for _ in 0..52 {
            shoe.deal_next();
        }
        assert_eq!(shoe.rebuilds(), 2);
        shoe.deal_next();
        assert_eq!(shoe.rebuilds(), 3);
        assert_eq!(shoe.cards_left(), 51);
    }

    #[test]
    fn test_balanced_schemes_net_to_zero_over_a_deck() {
        for scheme in [CountingScheme::HiLo, CountingScheme::HiOptI, CountingScheme::OmegaII] {
            let mut shoe = Shoe::new(1, scheme, SimRng::seed_from_u64(11));
            for _ in 0..52 {
                shoe.deal_next();
            }
            assert_eq!(shoe.running_count(), 0, "{scheme} is not balanced");
        }
        // KO is unbalanced: +4 per deck.
        let mut shoe = Shoe::new(1, CountingScheme::KO, SimRng::seed_from_u64(11));
        for _ in 0..52 {
            shoe.deal_next();
        }
        assert_eq!(shoe.running_count(), 4);
    }

    #[test]
    fn test_same_seed_same_shoe() {
        let mut a = Shoe::new(4, CountingScheme::ZenCount, SimRng::seed_from_u64(42));
        let mut b = Shoe::new(4, CountingScheme::ZenCount, SimRng::seed_from_u64(42));
        for _ in 0..500 {
            assert_eq!(a.deal_next(), b.deal_next());
            assert_eq!(a.running_count(), b.running_count());
        }
    }

    #[test]
    fn test_scheme_parsing() {
        assert_eq!("hilo".parse::<CountingScheme>(), Ok(CountingScheme::HiLo));
        assert_eq!("Hi-Opt-II".parse::<CountingScheme>(), Ok(CountingScheme::HiOptII));
        assert_eq!("zen count".parse::<CountingScheme>(), Ok(CountingScheme::ZenCount));
        assert_eq!("none".parse::<CountingScheme>(), Ok(CountingScheme::None));
        assert!("wong halves".parse::<CountingScheme>().is_err());
        for scheme in CountingScheme::ALL {
            assert_eq!(scheme.to_string().parse::<CountingScheme>(), Ok(scheme));
        }
    }
}
