//! Monte Carlo estimate of the next round's score, drawn without replacement
//! from what is left of the shoe.

pub mod shoe;

use crate::{CardCount, Label, WeightTable};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use thiserror::Error;
use tracing::{debug, trace};

use self::shoe::Shoe;

/// Cards dealt per simulated round.
pub const CARDS_PER_ROUND: u16 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    pub number_of_decks: u8,
    pub iterations: u32,
    /// 0 means one thread per available core.
    pub number_of_threads: usize,
    /// Seeds every thread's generator for reproducible results. Without it
    /// each thread seeds itself from the OS.
    pub seed: Option<u64>,
}

impl SimulationConfig {
    pub fn new(number_of_decks: u8, iterations: u32) -> Self {
        Self {
            number_of_decks,
            iterations,
            number_of_threads: 1,
            seed: None,
        }
    }

    pub fn with_threads(mut self, number_of_threads: usize) -> Self {
        self.number_of_threads = number_of_threads;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub runs: u32,
    pub banker_wins: u32,
    pub player_wins: u32,
    pub banker_rate: f64,
    /// Complement of `banker_rate`, so the two always add up to 1. It differs
    /// from `player_wins / runs` by at most `f64::EPSILON`.
    pub player_rate: f64,
    pub avg_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("insufficient shoe: {remaining} cards left, a round needs {}", CARDS_PER_ROUND)]
    InsufficientShoe { remaining: u32 },
    #[error("simulation cancelled before any run completed")]
    Cancelled,
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    runs: u32,
    banker_wins: u32,
    player_wins: u32,
    score_sum: i128,
}

impl Tally {
    fn record(&mut self, score: i64) {
        self.runs += 1;
        if score >= 0 {
            self.banker_wins += 1;
        } else {
            self.player_wins += 1;
        }
        self.score_sum += score as i128;
    }

    fn merge(&mut self, other: &Tally) {
        self.runs += other.runs;
        self.banker_wins += other.banker_wins;
        self.player_wins += other.player_wins;
        self.score_sum += other.score_sum;
    }

    fn into_result(self) -> SimulationResult {
        let runs = self.runs as f64;
        let banker_rate = self.banker_wins as f64 / runs;
        SimulationResult {
            runs: self.runs,
            banker_wins: self.banker_wins,
            player_wins: self.player_wins,
            banker_rate,
            player_rate: 1.0 - banker_rate,
            avg_score: self.score_sum as f64 / runs,
        }
    }
}

/// Simulates with standard 52-card decks.
///
/// # Panics
///
/// Panics if `config.iterations` is 0.
pub fn simulate(
    config: &SimulationConfig,
    removed_cards: &[Label],
    weights: &WeightTable,
) -> Result<SimulationResult, SimulationError> {
    simulate_with_composition(&CardCount::per_deck(), config, removed_cards, weights)
}

/// # Panics
///
/// Panics if `config.iterations` is 0.
pub fn simulate_with_composition(
    composition_per_deck: &CardCount,
    config: &SimulationConfig,
    removed_cards: &[Label],
    weights: &WeightTable,
) -> Result<SimulationResult, SimulationError> {
    let never = AtomicBool::new(false);
    simulate_cancellable(composition_per_deck, config, removed_cards, weights, &never)
}

/// Runs the simulation, checking `cancel` between runs. A cancelled
/// simulation reports the runs completed so far.
///
/// The base shoe is `composition_per_deck` times the number of decks, minus
/// one card per entry of `removed_cards` (floored at 0). Every run deals 6
/// cards from its own copy of the base shoe.
///
/// # Panics
///
/// Panics if `config.iterations` is 0.
pub fn simulate_cancellable(
    composition_per_deck: &CardCount,
    config: &SimulationConfig,
    removed_cards: &[Label],
    weights: &WeightTable,
    cancel: &AtomicBool,
) -> Result<SimulationResult, SimulationError> {
    assert!(config.iterations > 0, "iterations must be positive");

    let mut base = composition_per_deck.scaled(config.number_of_decks);
    base -= &removed_cards.iter().collect::<CardCount>();
    if base.get_total() < CARDS_PER_ROUND as u32 {
        return Err(SimulationError::InsufficientShoe {
            remaining: base.get_total(),
        });
    }

    let number_of_threads = resolve_number_of_threads(config.number_of_threads)
        .min(config.iterations as usize);
    debug!(
        decks = config.number_of_decks,
        removed = removed_cards.len(),
        remaining = base.get_total(),
        iterations = config.iterations,
        threads = number_of_threads,
        "starting shoe simulation"
    );

    let tally = thread::scope(|scope| {
        let handles: Vec<_> = (0..number_of_threads)
            .map(|thread_index| {
                let runs = runs_for_thread(config.iterations, number_of_threads, thread_index);
                let base = &base;
                scope.spawn(move || {
                    let mut rng = thread_rng_for(config.seed, thread_index);
                    trace!(thread_index, runs, "simulation thread started");
                    run_batch(base, weights, runs, &mut rng, cancel)
                })
            })
            .collect();

        let mut tally = Tally::default();
        for handle in handles {
            match handle.join() {
                Ok(partial) => tally.merge(&partial),
                Err(payload) => std::panic::resume_unwind(payload),
            }
        }
        tally
    });

    if tally.runs == 0 {
        return Err(SimulationError::Cancelled);
    }
    let result = tally.into_result();
    debug!(
        runs = result.runs,
        banker_rate = result.banker_rate,
        avg_score = result.avg_score,
        "shoe simulation finished"
    );
    Ok(result)
}

fn run_batch<R: Rng + ?Sized>(
    base: &CardCount,
    weights: &WeightTable,
    runs: u32,
    rng: &mut R,
    cancel: &AtomicBool,
) -> Tally {
    let mut tally = Tally::default();
    for _ in 0..runs {
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        let mut shoe = Shoe::new(base.clone());
        let score: Option<i64> = (0..CARDS_PER_ROUND)
            .map(|_| shoe.deal_card(rng).map(|card| weights.weight(card) as i64))
            .sum();
        if let Some(score) = score {
            tally.record(score);
        }
    }
    tally
}

fn resolve_number_of_threads(number_of_threads: usize) -> usize {
    if number_of_threads == 0 {
        match thread::available_parallelism() {
            Ok(n) => n.get(),
            Err(_) => 1,
        }
    } else {
        number_of_threads
    }
}

/// Splits `iterations` as evenly as possible, earlier threads taking the
/// remainder.
fn runs_for_thread(iterations: u32, number_of_threads: usize, thread_index: usize) -> u32 {
    let number_of_threads = number_of_threads as u32;
    let share = iterations / number_of_threads;
    let extra = (thread_index as u32) < iterations % number_of_threads;
    share + extra as u32
}

fn thread_rng_for(seed: Option<u64>, thread_index: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(thread_index as u64)),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_partition_every_run() {
        let config = SimulationConfig::new(1, 1000).with_seed(42);
        let weights = WeightTable::default();
        let result = simulate(&config, &[], &weights).unwrap();
        assert_eq!(result.runs, 1000);
        assert_eq!(result.banker_wins + result.player_wins, 1000);
        assert_eq!(result.banker_rate + result.player_rate, 1.0);

        let range = weights
            .score_range(&CardCount::with_number_of_decks(1), CARDS_PER_ROUND)
            .unwrap();
        assert!(result.avg_score >= *range.start() as f64);
        assert!(result.avg_score <= *range.end() as f64);
    }

    #[test]
    fn every_run_starts_from_a_fresh_shoe() {
        // Exactly 6 cards: every run must deal all of them, once each.
        let composition = CardCount::new(&[0, 0, 0, 0, 3, 3, 0, 0, 0, 0]);
        let config = SimulationConfig::new(1, 500).with_seed(1);
        let result =
            simulate_with_composition(&composition, &config, &[], &WeightTable::default())
                .unwrap();
        // 3 * 19 + 3 * -12
        assert_eq!(result.avg_score, 21.0);
        assert_eq!(result.banker_rate, 1.0);
        assert_eq!(result.player_rate, 0.0);
    }

    #[test]
    fn removed_cards_leave_the_shoe() {
        // Without the removed 4s only 5s remain.
        let composition = CardCount::new(&[0, 0, 0, 0, 2, 6, 0, 0, 0, 0]);
        let config = SimulationConfig::new(1, 200).with_seed(3);
        let result = simulate_with_composition(
            &composition,
            &config,
            &[Label::Four, Label::Four, Label::Four],
            &WeightTable::default(),
        )
        .unwrap();
        assert_eq!(result.avg_score, -72.0);
        assert_eq!(result.player_wins, 200);
    }

    #[test]
    fn insufficient_shoe_is_an_error() {
        let composition = CardCount::new(&[2, 1, 1, 1, 1, 0, 0, 0, 0, 0]);
        let config = SimulationConfig::new(1, 1000);
        let result =
            simulate_with_composition(&composition, &config, &[Label::Ace], &WeightTable::default());
        assert_eq!(
            result,
            Err(SimulationError::InsufficientShoe { remaining: 5 })
        );
    }

    #[test]
    fn seeded_simulation_is_reproducible() {
        let config = SimulationConfig::new(8, 5000).with_threads(4).with_seed(99);
        let removed = [Label::Eight, Label::Ace, Label::Nine, Label::Two];
        let weights = WeightTable::default();
        let first = simulate(&config, &removed, &weights).unwrap();
        let second = simulate(&config, &removed, &weights).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.runs, 5000);
    }

    #[test]
    fn large_weights_do_not_overflow_a_run() {
        let config = SimulationConfig::new(1, 100).with_threads(2).with_seed(1);
        let weights = WeightTable::new([1_000_000_000; 10]);
        let result = simulate(&config, &[], &weights).unwrap();
        assert_eq!(result.avg_score, 6_000_000_000.0);
        assert_eq!(result.banker_wins, 100);

        let weights = WeightTable::new([i32::MIN; 10]);
        let result = simulate(&config, &[], &weights).unwrap();
        assert_eq!(result.avg_score, 6.0 * i32::MIN as f64);
        assert_eq!(result.player_wins, 100);
    }

    #[test]
    fn player_rate_matches_player_wins() {
        let config = SimulationConfig::new(8, 3000).with_threads(3).with_seed(17);
        let result = simulate(&config, &[], &WeightTable::default()).unwrap();
        let direct = result.player_wins as f64 / result.runs as f64;
        assert!((result.player_rate - direct).abs() <= f64::EPSILON);
    }

    #[test]
    fn threads_never_outnumber_iterations() {
        let config = SimulationConfig::new(1, 3).with_threads(16).with_seed(5);
        let result = simulate(&config, &[], &WeightTable::default()).unwrap();
        assert_eq!(result.runs, 3);
    }

    #[test]
    fn runs_are_split_across_threads() {
        let runs: Vec<u32> = (0..3).map(|i| runs_for_thread(10, 3, i)).collect();
        assert_eq!(runs, vec![4, 3, 3]);
    }

    #[test]
    fn cancelled_before_start() {
        let cancel = AtomicBool::new(true);
        let config = SimulationConfig::new(8, 1000);
        let result = simulate_cancellable(
            &CardCount::per_deck(),
            &config,
            &[],
            &WeightTable::default(),
            &cancel,
        );
        assert_eq!(result, Err(SimulationError::Cancelled));
    }

    #[test]
    #[should_panic]
    fn zero_iterations_should_panic() {
        let config = SimulationConfig::new(1, 0);
        let _ = simulate(&config, &[], &WeightTable::default());
    }
}
