#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting poop spawn commands.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use roomba_cleanup_core::{CellCoord, Command, Event, GameConfig, GameStatus};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    spawn_interval: Duration,
    spawn_chance: f32,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided cadence, chance and seed.
    ///
    /// The chance is clamped into `0.0..=1.0`; a NaN chance never spawns.
    #[must_use]
    pub fn new(spawn_interval: Duration, spawn_chance: f32, rng_seed: u64) -> Self {
        let spawn_chance = if spawn_chance.is_nan() {
            0.0
        } else {
            spawn_chance.clamp(0.0, 1.0)
        };
        Self {
            spawn_interval,
            spawn_chance,
            rng_seed,
        }
    }

    /// Derives the spawning parameters from a game configuration.
    #[must_use]
    pub fn from_game(config: &GameConfig) -> Self {
        // Decorrelate from the trash layout, which is seeded from the same value.
        Self::new(
            config.spawn_interval(),
            config.spawn_chance(),
            config.rng_seed().rotate_left(17) ^ 0x00c0_ffee,
        )
    }
}

/// Pure system that rolls for poop tiles while a round is in play.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: Duration,
    spawn_chance: f32,
    accumulator: Duration,
    rng: ChaCha8Rng,
    status: GameStatus,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            spawn_chance: config.spawn_chance,
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            status: GameStatus::Playing,
        }
    }

    /// Consumes events and the current free cells to emit spawn commands.
    ///
    /// `unoccupied` must list every cell free of roomba, trash and poop. Each
    /// full spawn interval yields one roll; successful rolls pick distinct
    /// cells uniformly at random.
    pub fn handle(&mut self, events: &[Event], unoccupied: &[CellCoord], out: &mut Vec<Command>) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::StatusChanged { status } => self.status = *status,
                Event::GameRestarted { .. } => {
                    self.accumulator = Duration::ZERO;
                    accumulated = Duration::ZERO;
                }
                Event::TimeAdvanced { dt } => accumulated = accumulated.saturating_add(*dt),
                _ => {}
            }
        }

        if self.status != GameStatus::Playing {
            self.accumulator = Duration::ZERO;
            return;
        }

        if self.spawn_interval.is_zero() || accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        let rolls = self.resolve_spawn_rolls();

        let mut candidates = unoccupied.to_vec();
        for _ in 0..rolls {
            if !self.roll() {
                continue;
            }

            if candidates.is_empty() {
                log::debug!("spawn roll succeeded but the floor is full");
                break;
            }

            let index = self.rng.gen_range(0..candidates.len());
            let cell = candidates.swap_remove(index);
            out.push(Command::SpawnPoop { cell });
        }
    }

    fn resolve_spawn_rolls(&mut self) -> usize {
        if self.spawn_interval.is_zero() {
            return 0;
        }

        let mut rolls = 0;
        while self.accumulator >= self.spawn_interval {
            self.accumulator -= self.spawn_interval;
            rolls += 1;
        }
        rolls
    }

    fn roll(&mut self) -> bool {
        self.rng.gen::<f32>() < self.spawn_chance
    }
}
