//! Genetic search over counting agent parameters.
//!
//! A chromosome's genes configure a counting agent; its fitness is the balance the agent ends a
//! bounded session with. Every chromosome is scored on its own random stream, seeded from the
//! optimizer's stream before scoring starts, so a run is reproducible from one seed whether the
//! scoring happens sequentially or on the rayon thread pool.

use crate::config::OptimizerConfig;
use crate::error::TunerError;
use crate::game::session::run_session;
use blackjack_lib::{CountingScheme, SimRng};
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::{Duration, Instant};

/// The tunable parameters of a counting agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genes {
    pub scheme: CountingScheme,
    pub count_scalar: u32,
    pub base_wager: u32,
}

impl Genes {
    /// Associated method that draws every gene uniformly from its configured range.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, config: &OptimizerConfig) -> Genes {
        Genes {
            scheme: random_scheme(rng),
            count_scalar: rng.gen_range(config.count_scalar_range.clone()),
            base_wager: rng.gen_range(config.base_wager_range.clone()),
        }
    }

    /// Associated method that breeds a child from two parents. Each gene comes from either parent
    /// with equal odds, unless it mutates into a fresh random value.
    pub fn crossover<R: Rng + ?Sized>(
        a: &Genes,
        b: &Genes,
        rng: &mut R,
        config: &OptimizerConfig,
    ) -> Genes {
        let rate = config.mutation_rate;
        Genes {
            scheme: inherit(rng, rate, a.scheme, b.scheme, random_scheme),
            count_scalar: inherit(rng, rate, a.count_scalar, b.count_scalar, |rng| {
                rng.gen_range(config.count_scalar_range.clone())
            }),
            base_wager: inherit(rng, rate, a.base_wager, b.base_wager, |rng| {
                rng.gen_range(config.base_wager_range.clone())
            }),
        }
    }
}

fn random_scheme<R: Rng + ?Sized>(rng: &mut R) -> CountingScheme {
    CountingScheme::ALL[rng.gen_range(0..CountingScheme::ALL.len())]
}

fn inherit<T, R, F>(rng: &mut R, mutation_rate: f64, a: T, b: T, fresh: F) -> T
where
    R: Rng + ?Sized,
    F: FnOnce(&mut R) -> T,
{
    if rng.gen_bool(mutation_rate) {
        fresh(rng)
    } else if rng.gen_bool(0.5) {
        a
    } else {
        b
    }
}

/// A scored set of genes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chromosome {
    pub genes: Genes,
    pub fitness: f64,
    pub balance: i64,
    pub hands_played: u64,
    /// Wall clock time the scoring session took. Recorded only, it plays no part in selection.
    pub elapsed: Duration,
    /// Seed of the random stream the chromosome was scored on.
    pub seed: u64,
}

impl Display for Chromosome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} with count scalar {} and base wager {}, fitness {:.0} after {} hands",
            self.genes.scheme,
            self.genes.count_scalar,
            self.genes.base_wager,
            self.fitness,
            self.hands_played
        )
    }
}

/// Function that scores `genes` by running one bounded session on a stream seeded with `seed`.
pub fn evaluate(genes: Genes, seed: u64, config: &OptimizerConfig) -> Result<Chromosome, TunerError> {
    let session = config.session(genes.scheme, genes.count_scalar, genes.base_wager);
    let start = Instant::now();
    let report = run_session(&session, SimRng::seed_from_u64(seed))?;
    Ok(Chromosome {
        genes,
        fitness: report.balance as f64,
        balance: report.balance,
        hands_played: report.hands_played,
        elapsed: start.elapsed(),
        seed,
    })
}

fn evaluate_all(
    config: &OptimizerConfig,
    candidates: Vec<(Genes, u64)>,
) -> Result<Vec<Chromosome>, TunerError> {
    if config.parallel {
        candidates
            .into_par_iter()
            .map(|(genes, seed)| evaluate(genes, seed, config))
            .collect()
    } else {
        candidates
            .into_iter()
            .map(|(genes, seed)| evaluate(genes, seed, config))
            .collect()
    }
}

/// Averages and the best chromosome of one generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationSummary {
    pub generation: u64,
    pub average_balance: f64,
    pub average_elapsed_ms: f64,
    pub average_fitness: f64,
    pub average_base_wager: f64,
    pub average_count_scalar: f64,
    pub best: Chromosome,
}

impl GenerationSummary {
    /// Associated method that summarises a non-empty `population`.
    pub fn of(generation: u64, population: &[Chromosome]) -> GenerationSummary {
        let n = population.len() as f64;
        let average = |f: fn(&Chromosome) -> f64| population.iter().map(f).sum::<f64>() / n;
        let best = population.iter().skip(1).fold(&population[0], |best, c| {
            if c.fitness > best.fitness {
                c
            } else {
                best
            }
        });
        GenerationSummary {
            generation,
            average_balance: average(|c| c.balance as f64),
            average_elapsed_ms: average(|c| c.elapsed.as_secs_f64() * 1000.0),
            average_fitness: average(|c| c.fitness),
            average_base_wager: average(|c| c.genes.base_wager as f64),
            average_count_scalar: average(|c| c.genes.count_scalar as f64),
            best: best.clone(),
        }
    }
}

impl Display for GenerationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const WIDTH: usize = 80;
        const TEXT_WIDTH: usize = "average count scalar".len() + 20;
        const NUM_WIDTH: usize = WIDTH - TEXT_WIDTH;
        let header = format!(" generation {} ", self.generation);
        write!(
            f,
            "{:-^WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
            best: {}\n\
            {}",
            header,
            "average balance",
            self.average_balance,
            "average time (ms)",
            self.average_elapsed_ms,
            "average fitness",
            self.average_fitness,
            "average base wager",
            self.average_base_wager,
            "average count scalar",
            self.average_count_scalar,
            self.best,
            "-".repeat(WIDTH)
        )
    }
}

/// Struct that runs the generational loop: tournament selection of pairs, crossover with
/// mutation, and wholesale replacement of the population by the bred pool.
pub struct Optimizer {
    config: OptimizerConfig,
    rng: SimRng,
    population: Vec<Chromosome>,
    generation: u64,
    fittest: Chromosome,
}

impl Optimizer {
    /// Associated method that validates `config` and scores a random first generation.
    pub fn new(config: OptimizerConfig, mut rng: SimRng) -> Result<Optimizer, TunerError> {
        config.validate()?;
        let candidates = (0..config.population_size)
            .map(|_| (Genes::random(&mut rng, &config), rng.gen::<u64>()))
            .collect();
        let population = evaluate_all(&config, candidates)?;
        let summary = GenerationSummary::of(1, &population);
        log::info!(
            "generation 1 scored, average balance {:.2}",
            summary.average_balance
        );
        Ok(Optimizer {
            config,
            rng,
            population,
            generation: 1,
            fittest: summary.best,
        })
    }

    /// Same as `Optimizer::new`, seeding the optimizer's random stream from `seed`.
    pub fn seeded(config: OptimizerConfig, seed: u64) -> Result<Optimizer, TunerError> {
        Optimizer::new(config, SimRng::seed_from_u64(seed))
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn population(&self) -> &[Chromosome] {
        &self.population
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The fittest chromosome seen in any generation so far.
    pub fn fittest(&self) -> &Chromosome {
        &self.fittest
    }

    /// Summary of the current population.
    pub fn summary(&self) -> GenerationSummary {
        GenerationSummary::of(self.generation, &self.population)
    }

    /// Method that breeds, scores and installs the next generation, returning its summary.
    ///
    /// The breeding pool is filled two offspring at a time; with an odd population the last
    /// surplus offspring is dropped. The current population is only replaced once every
    /// offspring has been scored.
    pub fn step(&mut self) -> Result<GenerationSummary, TunerError> {
        let size = self.population.len();
        let mut pool = Vec::with_capacity(size + 1);
        while pool.len() < size {
            let a = self.tournament();
            let b = self.tournament();
            for _ in 0..2 {
                let genes = Genes::crossover(
                    &self.population[a].genes,
                    &self.population[b].genes,
                    &mut self.rng,
                    &self.config,
                );
                pool.push((genes, self.rng.gen::<u64>()));
            }
        }
        pool.truncate(size);

        let next = evaluate_all(&self.config, pool)?;
        self.population = next;
        self.generation += 1;

        let summary = self.summary();
        if summary.best.fitness > self.fittest.fitness {
            log::debug!("new fittest chromosome: {}", summary.best);
            self.fittest = summary.best.clone();
        }
        log::info!(
            "generation {} scored, average balance {:.2}, best {}",
            summary.generation,
            summary.average_balance,
            summary.best
        );
        Ok(summary)
    }

    /// An endless iterator over generations, each item the summary of a newly bred generation.
    pub fn generations(&mut self) -> Generations<'_> {
        Generations { optimizer: self }
    }

    /// Draws two distinct members and returns the index of the fitter one.
    fn tournament(&mut self) -> usize {
        let n = self.population.len();
        let first = self.rng.gen_range(0..n);
        let mut second = self.rng.gen_range(0..n - 1);
        if second >= first {
            second += 1;
        }
        self.fitter(first, second)
    }

    /// Ties go to `second`.
    fn fitter(&self, first: usize, second: usize) -> usize {
        if self.population[first].fitness > self.population[second].fitness {
            first
        } else {
            second
        }
    }
}

/// Iterator returned by `Optimizer::generations`, it never ends on its own.
pub struct Generations<'a> {
    optimizer: &'a mut Optimizer,
}

impl Iterator for Generations<'_> {
    type Item = Result<GenerationSummary, TunerError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.optimizer.step())
    }
}
