#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Roomba Cleanup engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Title shown by adapters that open a window.
pub const WINDOW_TITLE: &str = "Roomba Cleanup";

/// Number of grid columns used when no override is supplied.
pub const DEFAULT_COLUMNS: u32 = 14;
/// Number of grid rows used when no override is supplied.
pub const DEFAULT_ROWS: u32 = 14;
/// Number of trash tiles scattered at the start of each round.
pub const DEFAULT_TRASH_COUNT: u32 = 24;
/// Cadence at which the spawning system rolls for a new poop tile.
pub const DEFAULT_SPAWN_INTERVAL: Duration = Duration::from_millis(1_300);
/// Probability that a single spawn roll produces a poop tile.
pub const DEFAULT_SPAWN_CHANCE: f32 = 0.26;
/// Seed used when the adapter does not supply one.
pub const DEFAULT_RNG_SEED: u64 = 0x5eed_c1ea_4aa5_7a11;
/// Largest number of cells a playable grid may contain.
pub const MAX_CELL_COUNT: u64 = u16::MAX as u64;

/// Lifecycle of a single round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// The roomba is cleaning and accepts movement input.
    Playing,
    /// Every trash tile was collected.
    Won,
    /// The roomba drove into poop.
    Lost,
}

impl GameStatus {
    /// Reports whether the round has ended and only a restart is accepted.
    #[must_use]
    pub const fn is_over(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the game configuration and starts a fresh round.
    ConfigureGame {
        /// Configuration the world should adopt.
        config: GameConfig,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the roomba move a single cell in the given direction.
    MoveRoomba {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that a poop tile appear at the provided cell.
    SpawnPoop {
        /// Cell that should receive the poop tile.
        cell: CellCoord,
    },
    /// Requests that the world reset the roomba, trash and poop for a new round.
    Restart,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the roomba moved between two cells.
    RoombaMoved {
        /// Cell the roomba occupied before moving.
        from: CellCoord,
        /// Cell the roomba occupies after completing the move.
        to: CellCoord,
    },
    /// Reports that a move request was ignored.
    MoveBlocked {
        /// Direction of the ignored move.
        direction: Direction,
    },
    /// Confirms that the roomba picked up a trash tile.
    TrashCollected {
        /// Cell the trash tile occupied.
        cell: CellCoord,
        /// Number of trash tiles still on the floor.
        remaining: u32,
    },
    /// Confirms that a poop tile appeared on the floor.
    PoopSpawned {
        /// Cell that received the poop tile.
        cell: CellCoord,
    },
    /// Reports that a poop spawn request was rejected.
    PoopRejected {
        /// Cell provided in the spawn request.
        cell: CellCoord,
        /// Specific reason the spawn failed.
        reason: SpawnRejection,
    },
    /// Announces that the round entered a new status.
    StatusChanged {
        /// Status that became active after processing commands.
        status: GameStatus,
    },
    /// Confirms that a new round started.
    GameRestarted {
        /// Index of the round that just began.
        round: u32,
    },
}

/// Reasons a poop spawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnRejection {
    /// The requested cell lies beyond the configured grid bounds.
    OutOfBounds,
    /// The requested cell already holds the roomba, trash or poop.
    Occupied,
    /// The round already ended.
    GameOver,
}

/// Cardinal movement directions available to the roomba.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Returns the neighbouring cell in `direction`, or `None` when the step
    /// would leave the grid.
    #[must_use]
    pub fn step(self, direction: Direction, size: GridSize) -> Option<CellCoord> {
        let next = match direction {
            Direction::North => CellCoord::new(self.column, self.row.checked_sub(1)?),
            Direction::South => CellCoord::new(self.column, self.row.checked_add(1)?),
            Direction::West => CellCoord::new(self.column.checked_sub(1)?, self.row),
            Direction::East => CellCoord::new(self.column.checked_add(1)?, self.row),
        };
        size.contains(next).then_some(next)
    }
}

/// Dimensions of the playable grid measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    columns: u32,
    rows: u32,
}

impl GridSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub const fn cell_count(&self) -> u64 {
        self.columns as u64 * self.rows as u64
    }

    /// Reports whether `cell` lies within the grid bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Cell the roomba occupies at the start of every round.
    #[must_use]
    pub const fn center(&self) -> CellCoord {
        CellCoord::new(self.columns / 2, self.rows / 2)
    }

    /// Iterates every cell in row-major order.
    pub fn cells(self) -> impl Iterator<Item = CellCoord> {
        let columns = self.columns;
        (0..self.rows)
            .flat_map(move |row| (0..columns).map(move |column| CellCoord::new(column, row)))
    }
}

/// Tuning parameters for a game session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    grid: GridSize,
    trash_count: u32,
    spawn_interval: Duration,
    spawn_chance: f32,
    rng_seed: u64,
}

impl GameConfig {
    /// Creates a configuration using the default tuning on the provided grid.
    #[must_use]
    pub const fn new(grid: GridSize) -> Self {
        Self {
            grid,
            trash_count: DEFAULT_TRASH_COUNT,
            spawn_interval: DEFAULT_SPAWN_INTERVAL,
            spawn_chance: DEFAULT_SPAWN_CHANCE,
            rng_seed: DEFAULT_RNG_SEED,
        }
    }

    /// Overrides the number of trash tiles placed at the start of each round.
    #[must_use]
    pub const fn with_trash_count(mut self, trash_count: u32) -> Self {
        self.trash_count = trash_count;
        self
    }

    /// Overrides the cadence of poop spawn rolls.
    #[must_use]
    pub const fn with_spawn_interval(mut self, spawn_interval: Duration) -> Self {
        self.spawn_interval = spawn_interval;
        self
    }

    /// Overrides the probability that a spawn roll succeeds.
    #[must_use]
    pub const fn with_spawn_chance(mut self, spawn_chance: f32) -> Self {
        self.spawn_chance = spawn_chance;
        self
    }

    /// Overrides the seed feeding every random decision.
    #[must_use]
    pub const fn with_rng_seed(mut self, rng_seed: u64) -> Self {
        self.rng_seed = rng_seed;
        self
    }

    /// Dimensions of the playable grid.
    #[must_use]
    pub const fn grid(&self) -> GridSize {
        self.grid
    }

    /// Requested number of trash tiles per round.
    #[must_use]
    pub const fn trash_count(&self) -> u32 {
        self.trash_count
    }

    /// Trash tiles actually placed, limited to the cells left free once the
    /// roomba stands on its start cell.
    #[must_use]
    pub fn effective_trash_count(&self) -> u32 {
        let free_cells = self.grid.cell_count().saturating_sub(1);
        u32::try_from(free_cells).map_or(self.trash_count, |free| self.trash_count.min(free))
    }

    /// Cadence of poop spawn rolls.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Probability that a single spawn roll succeeds.
    #[must_use]
    pub const fn spawn_chance(&self) -> f32 {
        self.spawn_chance
    }

    /// Seed feeding every random decision.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    /// Checks that the configuration describes a playable game.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.columns() == 0 || self.grid.rows() == 0 {
            return Err(ConfigError::EmptyGrid {
                columns: self.grid.columns(),
                rows: self.grid.rows(),
            });
        }

        if self.grid.cell_count() > MAX_CELL_COUNT {
            return Err(ConfigError::GridTooLarge {
                columns: self.grid.columns(),
                rows: self.grid.rows(),
            });
        }

        if self.spawn_interval.is_zero() {
            return Err(ConfigError::ZeroSpawnInterval);
        }

        if !(0.0..=1.0).contains(&self.spawn_chance) {
            return Err(ConfigError::SpawnChanceOutOfRange {
                chance: self.spawn_chance,
            });
        }

        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(GridSize::new(DEFAULT_COLUMNS, DEFAULT_ROWS))
    }
}

/// Reasons a [`GameConfig`] fails validation.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The grid has no cells for the roomba to stand on.
    #[error("grid must have at least one column and one row (received {columns}x{rows})")]
    EmptyGrid {
        /// Provided column count.
        columns: u32,
        /// Provided row count.
        rows: u32,
    },
    /// The grid holds more than [`MAX_CELL_COUNT`] cells.
    #[error(
        "grid of {columns}x{rows} cells exceeds the limit of {limit} cells",
        limit = MAX_CELL_COUNT
    )]
    GridTooLarge {
        /// Provided column count.
        columns: u32,
        /// Provided row count.
        rows: u32,
    },
    /// Poop spawn rolls need a non-zero cadence.
    #[error("spawn interval must be greater than zero")]
    ZeroSpawnInterval,
    /// The spawn chance is not a probability.
    #[error("spawn chance must lie within 0.0..=1.0 (received {chance})")]
    SpawnChanceOutOfRange {
        /// Provided spawn chance.
        chance: f32,
    },
}
