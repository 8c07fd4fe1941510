use blackjack_tuner::prelude::*;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use std::io;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for every random draw, a random one is picked and logged when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Play one bounded game with a counting agent and report how it ended
    Simulate {
        /// Number of decks in the shoe
        #[arg(long, default_value_t = 6)]
        decks: u32,
        /// Counting scheme, one of HiLo, HiOptI, HiOptII, KO, OmegaII, ZenCount, None
        #[arg(long, default_value = "HiLo")]
        scheme: CountingScheme,
        /// Let the dealer stand on soft 17
        #[arg(long)]
        stand_soft_seventeen: bool,
        #[arg(long, default_value_t = 100_000)]
        bankroll: i64,
        #[arg(long, default_value_t = 10)]
        base_wager: u32,
        #[arg(long, default_value_t = 2.0)]
        count_scalar: f32,
        #[arg(long, default_value_t = 9999.0)]
        count_cap: f32,
        /// Maximum number of rounds
        #[arg(short = 'n', long)]
        hands: Option<u64>,
        /// Stop once the balance reaches this much
        #[arg(long)]
        cash_limit: Option<i64>,
        /// Pause between rounds, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// Breed generations of counting strategies and report each one
    Optimize {
        /// Number of generations bred after the first
        #[arg(short = 'g', long, default_value_t = 10)]
        generations: usize,
        #[arg(short, long, default_value_t = 50)]
        population: usize,
        #[arg(long, default_value_t = 5000)]
        bankroll: i64,
        /// Maximum number of rounds per scoring session
        #[arg(short = 'n', long, default_value_t = 10_000)]
        hands: u64,
        #[arg(long, default_value_t = 1.0 / 500.0)]
        mutation_rate: f64,
        #[arg(long, default_value_t = 6)]
        decks: u32,
        /// Score chromosomes on all cores
        #[arg(long)]
        parallel: bool,
    },
}

fn run(args: Args, seed: u64) -> Result<(), WriteError> {
    let stdout = io::stdout().lock();
    match args.command {
        Commands::Simulate {
            decks,
            scheme,
            stand_soft_seventeen,
            bankroll,
            base_wager,
            count_scalar,
            count_cap,
            hands,
            cash_limit,
            delay_ms,
        } => {
            let mut table = TableConfig::new();
            table
                .num_decks(decks)
                .counting_scheme(scheme)
                .hit_soft_seventeen(!stand_soft_seventeen);
            if let Some(ms) = delay_ms {
                table.round_delay(Duration::from_millis(ms));
            }
            let mut session = SessionConfig::new();
            session
                .table(table.build())
                .bankroll(bankroll)
                .base_wager(base_wager)
                .count_scalar(count_scalar)
                .count_cap(count_cap);
            if let Some(hands) = hands {
                session.hand_limit(hands);
            }
            if let Some(cash) = cash_limit {
                session.cash_limit(cash);
            }
            let report = run_session(&session.build(), SimRng::seed_from_u64(seed))?;
            write_report(&report, args.format, stdout)
        }
        Commands::Optimize {
            generations,
            population,
            bankroll,
            hands,
            mutation_rate,
            decks,
            parallel,
        } => {
            let config = OptimizerConfig::new()
                .population_size(population)
                .bankroll(bankroll)
                .hand_limit(hands)
                .mutation_rate(mutation_rate)
                .table(TableConfig::new().num_decks(decks).build())
                .parallel(parallel)
                .build();
            let mut optimizer = Optimizer::seeded(config, seed)?;
            let first = optimizer.summary();
            let summaries =
                std::iter::once(Ok(first)).chain(optimizer.generations().take(generations));
            write_generations(summaries, args.format, stdout)?;
            log::info!("fittest chromosome: {}", optimizer.fittest());
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("using seed {}", seed);

    match run(args, seed) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
