use crate::game::agent::Action;
use blackjack_lib::{hand_value, Card, Rank};

const S: Action = Action::Stand;
const H: Action = Action::Hit;
const D: Action = Action::Double;
const P: Action = Action::Split;

// Basic strategy for a six deck shoe, dealer hits soft 17, double after split allowed,
// any equal pair may be split, no surrender. Columns are the dealer's up card 2..=10, Ace.

/// Rows are the paired rank 2..=10, Ace.
const PAIR_CHART: [[Action; 10]; 10] = [
    [P, P, P, P, P, P, H, H, H, H],
    [P, P, P, P, P, P, H, H, H, H],
    [H, H, H, P, P, H, H, H, H, H],
    [D, D, D, D, D, D, D, D, H, H],
    [P, P, P, P, P, H, H, H, H, H],
    [P, P, P, P, P, P, H, H, H, H],
    [P, P, P, P, P, P, P, P, P, P],
    [P, P, P, P, P, S, P, P, S, S],
    [S, S, S, S, S, S, S, S, S, S],
    [P, P, P, P, P, P, P, P, P, P],
];

/// Rows are the card held alongside the ace, 2..=10, Ace.
const SOFT_CHART: [[Action; 10]; 10] = [
    [H, H, H, D, D, H, H, H, H, H],
    [H, H, H, D, D, H, H, H, H, H],
    [H, H, D, D, D, H, H, H, H, H],
    [H, H, D, D, D, H, H, H, H, H],
    [H, D, D, D, D, H, H, H, H, H],
    [D, D, D, D, D, S, S, H, H, H],
    [S, S, S, S, D, S, S, S, S, S],
    [S, S, S, S, S, S, S, S, S, S],
    [S, S, S, S, S, S, S, S, S, S],
    [S, S, S, S, S, S, S, S, S, S],
];

/// Rows are the hard total 2..=21.
const HARD_CHART: [[Action; 10]; 20] = [
    [H, H, H, H, H, H, H, H, H, H],
    [H, H, H, H, H, H, H, H, H, H],
    [H, H, H, H, H, H, H, H, H, H],
    [H, H, H, H, H, H, H, H, H, H],
    [H, H, H, H, H, H, H, H, H, H],
    [H, H, H, H, H, H, H, H, H, H],
    [H, H, H, H, H, H, H, H, H, H],
    [H, D, D, D, D, H, H, H, H, H],
    [D, D, D, D, D, D, D, D, H, H],
    [D, D, D, D, D, D, D, D, D, D],
    [H, H, S, S, S, H, H, H, H, H],
    [S, S, S, S, S, H, H, H, H, H],
    [S, S, S, S, S, H, H, H, H, H],
    [S, S, S, S, S, H, H, H, H, H],
    [S, S, S, S, S, H, H, H, H, H],
    [S, S, S, S, S, S, S, S, S, S],
    [S, S, S, S, S, S, S, S, S, S],
    [S, S, S, S, S, S, S, S, S, S],
    [S, S, S, S, S, S, S, S, S, S],
    [S, S, S, S, S, S, S, S, S, S],
];

/// Which basic strategy chart a hand is looked up in.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HandCategory {
    /// Two cards of the same rank.
    Pair(Rank),
    /// Two cards, one of them an ace counted as 11; holds the other card's rank.
    Soft(Rank),
    /// Anything else, by total.
    Hard(u32),
}

impl HandCategory {
    /// Associated method that classifies `cards`. Pairs take precedence over soft hands, and
    /// hands of three or more cards are always looked up by their total.
    pub fn of(cards: &[Card]) -> HandCategory {
        let value = hand_value(cards);
        match cards {
            [first, second] if first.rank == second.rank => HandCategory::Pair(first.rank),
            [first, second] if value.soft => {
                let companion = if first.is_ace() { second } else { first };
                HandCategory::Soft(companion.rank)
            }
            _ => HandCategory::Hard(value.total),
        }
    }
}

/// Struct that encapsulates the lookup tables for playing by strict basic strategy.
/// Only the player's cards and the dealer's face up card are needed to decide.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicStrategy;

impl BasicStrategy {
    pub fn new() -> BasicStrategy {
        BasicStrategy
    }

    /// Method for deciding how to play `cards` against the dealer's `up_card`.
    pub fn decide(&self, cards: &[Card], up_card: Card) -> Action {
        let column = up_card.rank.index();
        match HandCategory::of(cards) {
            HandCategory::Pair(rank) => PAIR_CHART[rank.index()][column],
            HandCategory::Soft(rank) => SOFT_CHART[rank.index()][column],
            HandCategory::Hard(total) => {
                let row = (total.clamp(2, 21) - 2) as usize;
                HARD_CHART[row][column]
            }
        }
    }
}

pub const MIN_WAGER: i64 = 10;
pub const MAX_WAGER: i64 = 5000;
/// The wager multiplier grows by one for each full or partial step of this much balance.
pub const BALANCE_STEP: f64 = 100_000.0;

/// Struct that sizes wagers from the running count.
///
/// `amount = base + floor(min(count, count_cap) * count_scalar * base)`, multiplied by
/// `ceil(balance / 100000)` and clamped to the table limits of 10 and 5000.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WagerPolicy {
    pub base_wager: u32,
    pub count_scalar: f32,
    pub count_cap: f32,
}

impl WagerPolicy {
    pub fn new(base_wager: u32, count_scalar: f32, count_cap: f32) -> WagerPolicy {
        WagerPolicy {
            base_wager,
            count_scalar,
            count_cap,
        }
    }

    pub fn wager(&self, count: i32, balance: i64) -> u32 {
        let base = self.base_wager as i64;
        let modifier = (count as f32).min(self.count_cap) * self.count_scalar;
        let mut amount = base.saturating_add((modifier * self.base_wager as f32).floor() as i64);
        let multiplier = (balance as f64 / BALANCE_STEP).ceil() as i64;
        amount = amount.saturating_mul(multiplier);
        amount.clamp(MIN_WAGER, MAX_WAGER) as u32
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use blackjack_lib::Suit;

    const UP_CARDS: [Rank; 10] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Ace,
    ];

    fn card(rank: Rank) -> Card {
        Card::new(Suit::Hearts, rank)
    }

    fn hand(ranks: &[Rank]) -> Vec<Card> {
        ranks.iter().map(|r| card(*r)).collect()
    }

    #[test]
    fn test_eights_always_split() {
        let strategy = BasicStrategy::new();
        let eights = hand(&[Rank::Eight, Rank::Eight]);
        for up in UP_CARDS {
            assert_eq!(strategy.decide(&eights, card(up)), Action::Split);
        }
    }

    #[test]
    fn test_tens_always_stand() {
        let strategy = BasicStrategy::new();
        for pair in [[Rank::Ten, Rank::Ten], [Rank::King, Rank::King]] {
            for up in UP_CARDS {
                assert_eq!(strategy.decide(&hand(&pair), card(up)), Action::Stand);
            }
        }
        // Mixed ten valued cards are not a pair, they stand as a hard 20.
        assert_eq!(
            HandCategory::of(&hand(&[Rank::Jack, Rank::Queen])),
            HandCategory::Hard(20)
        );
    }

    #[test]
    fn test_classification() {
        assert_eq!(
            HandCategory::of(&hand(&[Rank::Ace, Rank::Ace])),
            HandCategory::Pair(Rank::Ace)
        );
        assert_eq!(
            HandCategory::of(&hand(&[Rank::Six, Rank::Ace])),
            HandCategory::Soft(Rank::Six)
        );
        assert_eq!(
            HandCategory::of(&hand(&[Rank::Ace, Rank::Two, Rank::Three])),
            HandCategory::Hard(16)
        );
        assert_eq!(
            HandCategory::of(&hand(&[Rank::Nine, Rank::Seven])),
            HandCategory::Hard(16)
        );
    }

    #[test]
    fn test_chart_lookups() {
        let strategy = BasicStrategy::new();
        // Hard 11 doubles against everything in this ruleset.
        assert_eq!(
            strategy.decide(&hand(&[Rank::Six, Rank::Five]), card(Rank::Ace)),
            Action::Double
        );
        // Hard 12 stands against 4 through 6 only.
        let twelve = hand(&[Rank::Ten, Rank::Two]);
        assert_eq!(strategy.decide(&twelve, card(Rank::Three)), Action::Hit);
        assert_eq!(strategy.decide(&twelve, card(Rank::Four)), Action::Stand);
        assert_eq!(strategy.decide(&twelve, card(Rank::Seven)), Action::Hit);
        // Soft 18 against 2 doubles, against 9 hits.
        let soft_eighteen = hand(&[Rank::Ace, Rank::Seven]);
        assert_eq!(strategy.decide(&soft_eighteen, card(Rank::Two)), Action::Double);
        assert_eq!(strategy.decide(&soft_eighteen, card(Rank::Nine)), Action::Hit);
        // Nines stand against 7, 10 and ace.
        let nines = hand(&[Rank::Nine, Rank::Nine]);
        assert_eq!(strategy.decide(&nines, card(Rank::Seven)), Action::Stand);
        assert_eq!(strategy.decide(&nines, card(Rank::Queen)), Action::Stand);
        assert_eq!(strategy.decide(&nines, card(Rank::Eight)), Action::Split);
        // Fives are played as a hard 10.
        let fives = hand(&[Rank::Five, Rank::Five]);
        assert_eq!(strategy.decide(&fives, card(Rank::Nine)), Action::Double);
        assert_eq!(strategy.decide(&fives, card(Rank::Ten)), Action::Hit);
        // A natural stands.
        assert_eq!(
            strategy.decide(&hand(&[Rank::Ace, Rank::King]), card(Rank::Six)),
            Action::Stand
        );
    }

    #[test]
    fn test_wager_formula() {
        let policy = WagerPolicy::new(10, 2.0, 9999.0);
        assert_eq!(policy.wager(0, 5000), 10);
        // 10 + floor(3 * 2 * 10)
        assert_eq!(policy.wager(3, 5000), 70);
        // Negative counts floor towards minus infinity before clamping.
        assert_eq!(policy.wager(-1, 5000), 10);
        // Balances above 100000 scale the wager.
        assert_eq!(policy.wager(3, 150_000), 140);
        // The count cap limits the modifier.
        let capped = WagerPolicy::new(10, 2.0, 1.0);
        assert_eq!(capped.wager(50, 5000), 30);
        // Fractional scalars floor.
        let fractional = WagerPolicy::new(25, 0.3, 9999.0);
        assert_eq!(fractional.wager(1, 5000), 32);
    }

    #[test]
    fn test_wager_always_within_table_limits() {
        let scalars = [-1000.0f32, -3.5, -0.1, 0.0, 0.25, 1.0, 7.0, 1e6];
        let counts = [i32::MIN, -500, -7, -1, 0, 1, 9, 500, i32::MAX];
        let balances = [-50, 0, 1, 99_999, 100_001, 10_000_000];
        for scalar in scalars {
            for count in counts {
                for balance in balances {
                    for base in [0u32, 5, 10, 1000, u32::MAX] {
                        let wager = WagerPolicy::new(base, scalar, 9999.0).wager(count, balance);
                        assert!((10..=5000).contains(&wager), "{wager} out of range");
                    }
                }
            }
        }
    }
}
