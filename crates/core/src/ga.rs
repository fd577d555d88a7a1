//! Genetic algorithm framework.
//!
//! Defines the domain-facing traits ([`Individual`], [`GaProblem`]) and a
//! generational runner with elitism and tournament selection. Crossover and
//! mutation live on the problem, so an individual can stay a plain data type
//! while the operators get access to the problem instance (panel, kerf and
//! piece table).

use rand::prelude::*;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the genetic algorithm.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaConfig {
    /// Population size.
    pub population_size: usize,
    /// Maximum number of generations.
    pub max_generations: u32,
    /// Probability of producing a child by crossover instead of cloning.
    pub crossover_rate: f64,
    /// Number of elite individuals to preserve each generation.
    pub elite_count: usize,
    /// Tournament size for selection.
    pub tournament_size: usize,
    /// Maximum time limit (None = unlimited).
    pub time_limit: Option<Duration>,
    /// Stagnation generations before early stop (None = never).
    pub stagnation_limit: Option<u32>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 500,
            crossover_rate: 0.85,
            elite_count: 5,
            tournament_size: 3,
            time_limit: None,
            stagnation_limit: Some(50),
        }
    }
}

impl GaConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size.max(2);
        self
    }

    /// Sets the maximum generations.
    pub fn with_max_generations(mut self, gen: u32) -> Self {
        self.max_generations = gen;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the elite count.
    pub fn with_elite_count(mut self, count: usize) -> Self {
        self.elite_count = count;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size.max(1);
        self
    }

    /// Sets the time limit.
    pub fn with_time_limit(mut self, duration: Duration) -> Self {
        self.time_limit = Some(duration);
        self
    }

    /// Sets or clears the stagnation limit.
    pub fn with_stagnation_limit(mut self, limit: Option<u32>) -> Self {
        self.stagnation_limit = limit;
        self
    }
}

/// A member of the population.
pub trait Individual: Clone + Send + Sync {
    /// Returns the fitness of this individual (higher is better).
    fn fitness(&self) -> f64;
}

/// Problem-specific GA operations.
pub trait GaProblem: Send + Sync {
    /// The individual type for this problem.
    type Individual: Individual;

    /// Creates an initial population.
    fn initialize_population<R: Rng + ?Sized>(&self, size: usize, rng: &mut R) -> Vec<Self::Individual>;

    /// Evaluates the fitness of an individual.
    fn evaluate(&self, individual: &mut Self::Individual);

    /// Evaluates multiple individuals in parallel.
    fn evaluate_parallel(&self, individuals: &mut [Self::Individual]) {
        individuals.par_iter_mut().for_each(|ind| {
            self.evaluate(ind);
        });
    }

    /// Combines two parents into a child.
    fn crossover<R: Rng + ?Sized>(
        &self,
        a: &Self::Individual,
        b: &Self::Individual,
        rng: &mut R,
    ) -> Self::Individual;

    /// Mutates a child in place.
    fn mutate<R: Rng + ?Sized>(&self, individual: &mut Self::Individual, rng: &mut R);

    /// Returns true when `best` is good enough to stop early.
    fn is_satisfied(&self, _best: &Self::Individual) -> bool {
        false
    }

    /// Called after each generation.
    fn on_generation(&self, _generation: u32, _best: &Self::Individual, _population: &[Self::Individual]) {}
}

/// Result of a GA run.
#[derive(Debug, Clone)]
pub struct GaResult<I: Individual> {
    /// The best individual found.
    pub best: I,
    /// Final generation reached.
    pub generations: u32,
    /// Total elapsed time.
    pub elapsed: Duration,
    /// Whether the problem reported itself satisfied.
    pub target_reached: bool,
    /// Fitness history (best fitness per generation).
    pub history: Vec<f64>,
}

/// Generational genetic algorithm runner.
pub struct GaRunner<P: GaProblem> {
    config: GaConfig,
    problem: P,
}

impl<P: GaProblem> GaRunner<P> {
    /// Creates a new GA runner.
    pub fn new(config: GaConfig, problem: P) -> Self {
        Self { config, problem }
    }

    /// The problem being solved.
    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// Runs the genetic algorithm with a specific RNG.
    ///
    /// Returns `None` if the problem produced an empty population.
    pub fn run_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<GaResult<P::Individual>> {
        let start = Instant::now();
        let mut history = Vec::new();
        let size = self.config.population_size.max(1);

        let mut population = self.problem.initialize_population(size, rng);
        self.problem.evaluate_parallel(&mut population);
        sort_descending(&mut population);

        let mut best = population.first()?.clone();
        let mut best_fitness = best.fitness();
        let mut stagnation_count = 0u32;
        let mut generation = 0u32;
        let mut target_reached = false;

        while generation < self.config.max_generations {
            if let Some(limit) = self.config.time_limit {
                if start.elapsed() >= limit {
                    log::debug!("GA time limit reached at generation {}", generation);
                    break;
                }
            }

            if self.problem.is_satisfied(&best) {
                target_reached = true;
                break;
            }

            history.push(best_fitness);

            let elite = self.config.elite_count.min(population.len());
            let mut new_population: Vec<P::Individual> = Vec::with_capacity(size);
            new_population.extend(population.iter().take(elite).cloned());

            let mut children: Vec<P::Individual> = Vec::with_capacity(size.saturating_sub(elite));
            while children.len() + new_population.len() < size {
                let parent1 = self.tournament_select(&population, rng);
                let parent2 = self.tournament_select(&population, rng);

                let mut child = if rng.gen::<f64>() < self.config.crossover_rate {
                    self.problem.crossover(parent1, parent2, rng)
                } else {
                    parent1.clone()
                };
                self.problem.mutate(&mut child, rng);
                children.push(child);
            }

            self.problem.evaluate_parallel(&mut children);
            new_population.extend(children);
            sort_descending(&mut new_population);

            let new_best_fitness = new_population[0].fitness();
            if new_best_fitness > best_fitness {
                best = new_population[0].clone();
                best_fitness = new_best_fitness;
                stagnation_count = 0;
            } else {
                stagnation_count += 1;
            }

            self.problem.on_generation(generation, &best, &new_population);
            log::debug!(
                "GA generation {}: best fitness {:.4}",
                generation,
                best_fitness
            );

            population = new_population;
            generation += 1;

            if let Some(limit) = self.config.stagnation_limit {
                if stagnation_count >= limit {
                    break;
                }
            }
        }

        history.push(best_fitness);
        if !target_reached && self.problem.is_satisfied(&best) {
            target_reached = true;
        }

        Some(GaResult {
            best,
            generations: generation,
            elapsed: start.elapsed(),
            target_reached,
            history,
        })
    }

    fn tournament_select<'a, R: Rng + ?Sized>(
        &self,
        population: &'a [P::Individual],
        rng: &mut R,
    ) -> &'a P::Individual {
        let mut best_idx = rng.gen_range(0..population.len());

        for _ in 1..self.config.tournament_size {
            let idx = rng.gen_range(0..population.len());
            if population[idx].fitness() > population[best_idx].fitness() {
                best_idx = idx;
            }
        }

        &population[best_idx]
    }
}

fn sort_descending<I: Individual>(population: &mut [I]) {
    population.sort_by(|a, b| {
        b.fitness()
            .partial_cmp(&a.fitness())
            .unwrap_or(Ordering::Equal)
    });
}
