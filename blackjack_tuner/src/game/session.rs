use crate::config::SessionConfig;
use crate::error::{GameError, TunerError};
use crate::game::player::CountingAgent;
use crate::game::strategy::WagerPolicy;
use crate::game::table::Table;
use blackjack_lib::{Seat, SimRng};
use serde::Serialize;
use std::fmt::Display;
use std::thread;

/// Why a game stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StopReason {
    HandLimit,
    CashLimit,
    Bankrupt { seat: Seat, name: String },
    TableEmpty,
}

impl Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::HandLimit => write!(f, "hand limit reached"),
            StopReason::CashLimit => write!(f, "cash limit reached"),
            StopReason::Bankrupt { seat, name } => write!(f, "{} ({}) went bankrupt", name, seat),
            StopReason::TableEmpty => write!(f, "no one left to play"),
        }
    }
}

/// The final state of the player in the first seat once a game is over.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameReport {
    pub name: String,
    pub balance: i64,
    pub cash_in: i64,
    pub cash_out: i64,
    pub cash_ratio: Option<f64>,
    pub hands_played: u64,
    pub stop: StopReason,
}

impl Display for GameReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const WIDTH: usize = 60;
        const TEXT_WIDTH: usize = "cash in / cash out".len() + 10;
        const NUM_WIDTH: usize = WIDTH - TEXT_WIDTH;
        let ratio = match self.cash_ratio {
            Some(ratio) => format!("{:.3}", ratio),
            None => String::from("-"),
        };
        write!(
            f,
            "{:-^WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {}",
            format!(" {} ", self.name),
            "final balance",
            self.balance,
            "hands played",
            self.hands_played,
            "cash in",
            self.cash_in,
            "cash out",
            self.cash_out,
            "cash in / cash out",
            ratio,
            "stopped because",
            self.stop.to_string(),
            "-".repeat(WIDTH)
        )
    }
}

impl Table {
    /// Method that plays rounds until `hand_limit` rounds have been played, the first seat's
    /// balance reaches `cash_limit`, or a player goes bankrupt, and reports on the first seat.
    ///
    /// Limits are checked before every round. A bankruptcy ends the game normally with
    /// `StopReason::Bankrupt`; only an empty table is an error.
    pub fn run_game(&mut self, hand_limit: u64, cash_limit: i64) -> Result<GameReport, GameError> {
        if self.players.is_empty() {
            return Err(GameError::NoPlayers);
        }

        let mut hands_played = 0;
        let stop = loop {
            // Both caps are checked before a round starts, so exactly `hand_limit` rounds are played.
            if hands_played >= hand_limit {
                break StopReason::HandLimit;
            }
            if self.players[0].balance() >= cash_limit {
                break StopReason::CashLimit;
            }
            match self.play_round() {
                Ok(true) => hands_played += 1,
                Ok(false) => break StopReason::TableEmpty,
                Err(GameError::OutOfMoney { seat, name, balance }) => {
                    hands_played += 1;
                    log::debug!("{} ({}) is out of money with {}", name, seat, balance);
                    break StopReason::Bankrupt { seat, name };
                }
                Err(e) => return Err(e),
            }
            if let Some(delay) = self.config.round_delay {
                thread::sleep(delay);
            }
        };

        let player = &self.players[0];
        let bankroll = player.bankroll();
        Ok(GameReport {
            name: player.name().to_string(),
            balance: bankroll.balance(),
            cash_in: bankroll.cash_in(),
            cash_out: bankroll.cash_out(),
            cash_ratio: bankroll.cash_in_out_ratio(),
            hands_played,
            stop,
        })
    }
}

/// Function that plays one bounded game with a single counting agent, the table drawing from `rng`.
pub fn run_session(config: &SessionConfig, rng: SimRng) -> Result<GameReport, TunerError> {
    config.validate()?;
    let mut table = Table::new(config.table.clone(), rng)?;
    let policy = WagerPolicy::new(config.base_wager, config.count_scalar, config.count_cap);
    table.add_player(Box::new(CountingAgent::new(
        "AI Player",
        config.bankroll,
        policy,
    )));
    let report = table.run_game(config.hand_limit, config.cash_limit)?;
    log::info!(
        "session over after {} hands with a balance of {}: {}",
        report.hands_played,
        report.balance,
        report.stop
    );
    Ok(report)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::TableConfig;
    use crate::error::ConfigError;
    use crate::game::agent::{Action, Agent, Bankroll};
    use blackjack_lib::Card;
    use rand::SeedableRng;

    /// Bets a fixed amount and always stands.
    struct Stander {
        bankroll: Bankroll,
        wager: u32,
    }

    impl Agent for Stander {
        fn name(&self) -> &str {
            "Stander"
        }

        fn bankroll(&self) -> &Bankroll {
            &self.bankroll
        }

        fn bankroll_mut(&mut self) -> &mut Bankroll {
            &mut self.bankroll
        }

        fn propose_wager(&mut self, _count: i32) -> u32 {
            self.wager
        }

        fn decide_action(&mut self, _cards: &[Card], _up_card: Card) -> Action {
            Action::Stand
        }

        fn propose_double_wager(&mut self, _cards: &[Card], _count: i32) -> u32 {
            self.wager
        }
    }

    fn table_with(balance: i64, wager: u32) -> Table {
        let mut table = Table::seeded(TableConfig::default(), 11).unwrap();
        table.add_player(Box::new(Stander {
            bankroll: Bankroll::new(balance),
            wager,
        }));
        table
    }

    #[test]
    fn test_empty_table_is_an_error() {
        let mut table = Table::seeded(TableConfig::default(), 1).unwrap();
        assert_eq!(table.run_game(10, 1000), Err(GameError::NoPlayers));
    }

    #[test]
    fn test_hand_limit_is_exact() {
        let mut table = table_with(1_000_000, 10);
        let report = table.run_game(37, i64::MAX).unwrap();
        assert_eq!(report.hands_played, 37);
        assert_eq!(report.stop, StopReason::HandLimit);
        assert_eq!(table.rounds_played(), 37);
        assert_eq!(report.cash_out, 37 * 10);
    }

    #[test]
    fn test_cash_limit_checked_before_first_round() {
        let mut table = table_with(500, 10);
        let report = table.run_game(100, 500).unwrap();
        assert_eq!(report.hands_played, 0);
        assert_eq!(report.stop, StopReason::CashLimit);
        assert_eq!(report.balance, 500);
    }

    #[test]
    fn test_bankruptcy_ends_the_game() {
        // A stake of the whole balance leaves nothing behind on the first wager.
        let mut table = table_with(50, 50);
        let report = table.run_game(1000, i64::MAX).unwrap();
        assert_eq!(report.hands_played, 1);
        assert_eq!(report.balance, 0);
        assert_eq!(
            report.stop,
            StopReason::Bankrupt {
                seat: Seat::Player(0),
                name: String::from("Stander")
            }
        );
    }

    #[test]
    fn test_sessions_reproduce_from_a_seed() {
        let config = SessionConfig::new().hand_limit(500).build();
        let a = run_session(&config, SimRng::seed_from_u64(42)).unwrap();
        let b = run_session(&config, SimRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.name, "AI Player");
    }

    #[test]
    fn test_invalid_session_is_rejected() {
        let config = SessionConfig::new().bankroll(-5).build();
        assert!(matches!(
            run_session(&config, SimRng::seed_from_u64(0)),
            Err(TunerError::Config(ConfigError::Bankroll(-5)))
        ));
    }
}
