#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Roomba Cleanup experience.

mod simulation;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use roomba_cleanup_core::{
    GameConfig, GridSize, DEFAULT_COLUMNS, DEFAULT_ROWS, DEFAULT_RNG_SEED, DEFAULT_SPAWN_CHANCE,
    DEFAULT_SPAWN_INTERVAL, DEFAULT_TRASH_COUNT, WINDOW_TITLE,
};
use roomba_cleanup_rendering::{palette, GridPresentation, Presentation, RenderingBackend, Scene};
use roomba_cleanup_rendering_macroquad::MacroquadBackend;

use crate::simulation::Simulation;

/// Command-line arguments accepted by the Roomba Cleanup binary.
#[derive(Debug, Parser)]
#[command(
    name = "roomba-cleanup",
    about = "Steer a roomba around the floor, collecting trash and avoiding poop."
)]
struct CliArgs {
    /// Number of columns on the floor.
    #[arg(long, default_value_t = DEFAULT_COLUMNS)]
    columns: u32,
    /// Number of rows on the floor.
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    rows: u32,
    /// Trash tiles scattered at the start of every round.
    #[arg(long, default_value_t = DEFAULT_TRASH_COUNT)]
    trash: u32,
    /// Milliseconds between poop spawn rolls.
    #[arg(long, default_value_t = DEFAULT_SPAWN_INTERVAL.as_millis() as u64)]
    spawn_interval_ms: u64,
    /// Probability in 0.0..=1.0 that a spawn roll drops poop.
    #[arg(long, default_value_t = DEFAULT_SPAWN_CHANCE)]
    spawn_chance: f32,
    /// Seed for trash layout and poop spawns; derived from the clock when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long, overrides_with = "no_vsync")]
    vsync: bool,
    /// Render as fast as possible.
    #[arg(long = "no-vsync", overrides_with = "vsync")]
    no_vsync: bool,
}

impl CliArgs {
    fn game_config(&self, fallback_seed: u64) -> GameConfig {
        GameConfig::new(GridSize::new(self.columns, self.rows))
            .with_trash_count(self.trash)
            .with_spawn_interval(Duration::from_millis(self.spawn_interval_ms))
            .with_spawn_chance(self.spawn_chance)
            .with_rng_seed(self.seed.unwrap_or(fallback_seed))
    }

    fn vsync_enabled(&self) -> bool {
        self.vsync || !self.no_vsync
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|elapsed| u64::try_from(elapsed.as_nanos()).ok())
        .unwrap_or(DEFAULT_RNG_SEED)
}

/// Entry point for the Roomba Cleanup command-line interface.
fn main() -> Result<()> {
    env_logger::init();

    let args = CliArgs::parse();
    let config = args.game_config(clock_seed());
    config.validate().context("invalid game configuration")?;
    log::info!("using rng seed {}", config.rng_seed());

    let grid = GridPresentation::new(
        config.grid().columns(),
        config.grid().rows(),
        GridPresentation::DEFAULT_CELL_LENGTH,
        palette::FLOOR,
        palette::GRID_LINE,
    )
    .context("failed to describe the floor grid")?;

    let mut simulation = Simulation::new(config);
    let mut scene = Scene::new(grid, config.grid().center());
    simulation.populate_scene(&mut scene);

    let presentation = Presentation::new(WINDOW_TITLE, palette::FLOOR, scene);

    MacroquadBackend::new()
        .with_vsync(args.vsync_enabled())
        .run(presentation, move |dt, input, scene| {
            simulation.advance(dt, input);
            simulation.populate_scene(scene);
        })
        .context("rendering backend exited with an error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomba_cleanup_core::ConfigError;

    #[test]
    fn defaults_match_standard_game() {
        let args = CliArgs::try_parse_from(["roomba-cleanup"]).expect("no arguments parse");
        let config = args.game_config(DEFAULT_RNG_SEED);

        assert_eq!(config, GameConfig::default());
        assert!(args.vsync_enabled());
    }

    #[test]
    fn flags_override_configuration() {
        let args = CliArgs::try_parse_from([
            "roomba-cleanup",
            "--columns",
            "8",
            "--rows",
            "6",
            "--trash",
            "5",
            "--spawn-interval-ms",
            "400",
            "--spawn-chance",
            "0.5",
            "--seed",
            "42",
            "--no-vsync",
        ])
        .expect("valid arguments parse");
        let config = args.game_config(7);

        assert_eq!(config.grid(), GridSize::new(8, 6));
        assert_eq!(config.trash_count(), 5);
        assert_eq!(config.spawn_interval(), Duration::from_millis(400));
        assert!((config.spawn_chance() - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.rng_seed(), 42);
        assert!(!args.vsync_enabled());
    }

    #[test]
    fn later_vsync_flag_wins() {
        let args = CliArgs::try_parse_from(["roomba-cleanup", "--no-vsync", "--vsync"])
            .expect("valid arguments parse");

        assert!(args.vsync_enabled());
    }

    #[test]
    fn omitted_seed_uses_fallback() {
        let args = CliArgs::try_parse_from(["roomba-cleanup"]).expect("no arguments parse");

        assert_eq!(args.game_config(99).rng_seed(), 99);
    }

    #[test]
    fn invalid_spawn_chance_fails_validation() {
        let args = CliArgs::try_parse_from(["roomba-cleanup", "--spawn-chance", "1.5"])
            .expect("value parses as f32");

        assert!(args.game_config(1).validate().is_err());
    }

    #[test]
    fn zero_spawn_interval_fails_validation() {
        let args = CliArgs::try_parse_from(["roomba-cleanup", "--spawn-interval-ms", "0"])
            .expect("value parses as u64");

        assert_eq!(
            args.game_config(1).validate(),
            Err(ConfigError::ZeroSpawnInterval)
        );
    }

    #[test]
    fn oversized_grid_fails_validation() {
        let args = CliArgs::try_parse_from([
            "roomba-cleanup",
            "--columns",
            "4294967295",
            "--rows",
            "4294967295",
        ])
        .expect("values parse as u32");

        assert!(matches!(
            args.game_config(1).validate(),
            Err(ConfigError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn empty_grid_fails_validation() {
        let args = CliArgs::try_parse_from(["roomba-cleanup", "--columns", "0"])
            .expect("value parses as u32");

        assert!(args.game_config(1).validate().is_err());
    }
}
