#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Roomba Cleanup.

use std::time::Duration;

use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use roomba_cleanup_core::{
    CellCoord, Command, Direction, Event, GameConfig, GameStatus, GridSize, SpawnRejection,
};

const ROUND_SEED_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

/// Represents the authoritative Roomba Cleanup world state.
#[derive(Debug)]
pub struct World {
    config: GameConfig,
    status: GameStatus,
    round: u32,
    roomba: CellCoord,
    floor: FloorGrid,
    trash_remaining: u32,
    poop_count: u32,
    elapsed: Duration,
}

impl World {
    /// Creates a new world using the default configuration, ready for play.
    #[must_use]
    pub fn new() -> Self {
        let config = GameConfig::default();
        let mut world = Self {
            config,
            status: GameStatus::Playing,
            round: 0,
            roomba: config.grid().center(),
            floor: FloorGrid::new(config.grid()),
            trash_remaining: 0,
            poop_count: 0,
            elapsed: Duration::ZERO,
        };
        let mut discarded = Vec::new();
        world.start_round(&mut discarded);
        world
    }

    fn start_round(&mut self, out_events: &mut Vec<Event>) {
        let grid = self.config.grid();
        self.roomba = grid.center();
        self.floor = FloorGrid::new(grid);
        self.poop_count = 0;
        self.elapsed = Duration::ZERO;

        let trash = scatter_trash(&self.config, self.round);
        for cell in &trash {
            self.floor.set(*cell, Some(Tile::Trash));
        }
        self.trash_remaining = self.config.effective_trash_count();

        log::info!(
            "round {} started on a {}x{} grid with {} trash tiles",
            self.round,
            grid.columns(),
            grid.rows(),
            self.trash_remaining
        );
        out_events.push(Event::GameRestarted { round: self.round });

        let status = if self.trash_remaining == 0 {
            GameStatus::Won
        } else {
            GameStatus::Playing
        };
        self.set_status(status, out_events);
    }

    fn set_status(&mut self, status: GameStatus, out_events: &mut Vec<Event>) {
        if self.status == status {
            return;
        }

        log::debug!("status {:?} -> {:?}", self.status, status);
        self.status = status;
        out_events.push(Event::StatusChanged { status });
    }

    fn move_roomba(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        if self.status.is_over() {
            out_events.push(Event::MoveBlocked { direction });
            return;
        }

        let from = self.roomba;
        let Some(to) = from.step(direction, self.config.grid()) else {
            out_events.push(Event::MoveBlocked { direction });
            return;
        };

        self.roomba = to;
        out_events.push(Event::RoombaMoved { from, to });
        self.resolve_roomba_tile(out_events);
    }

    fn resolve_roomba_tile(&mut self, out_events: &mut Vec<Event>) {
        let cell = self.roomba;
        match self.floor.get(cell) {
            Some(Tile::Poop) => {
                log::info!(
                    "roomba hit poop at ({}, {}) in round {}",
                    cell.column(),
                    cell.row(),
                    self.round
                );
                self.set_status(GameStatus::Lost, out_events);
            }
            Some(Tile::Trash) => {
                self.floor.set(cell, None);
                self.trash_remaining = self.trash_remaining.saturating_sub(1);
                out_events.push(Event::TrashCollected {
                    cell,
                    remaining: self.trash_remaining,
                });

                if self.trash_remaining == 0 {
                    log::info!(
                        "round {} cleaned after {:.1}s",
                        self.round,
                        self.elapsed.as_secs_f32()
                    );
                    self.set_status(GameStatus::Won, out_events);
                }
            }
            None => {}
        }
    }

    fn spawn_poop(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let rejection = if self.status.is_over() {
            Some(SpawnRejection::GameOver)
        } else if !self.config.grid().contains(cell) {
            Some(SpawnRejection::OutOfBounds)
        } else if self.is_occupied(cell) {
            Some(SpawnRejection::Occupied)
        } else {
            None
        };

        if let Some(reason) = rejection {
            log::debug!(
                "poop spawn at ({}, {}) rejected: {:?}",
                cell.column(),
                cell.row(),
                reason
            );
            out_events.push(Event::PoopRejected { cell, reason });
            return;
        }

        self.floor.set(cell, Some(Tile::Poop));
        self.poop_count = self.poop_count.saturating_add(1);
        out_events.push(Event::PoopSpawned { cell });
    }

    fn is_occupied(&self, cell: CellCoord) -> bool {
        cell == self.roomba || self.floor.get(cell).is_some()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGame { config } => {
            if let Err(error) = config.validate() {
                log::warn!("ignoring invalid game configuration: {error}");
                return;
            }

            world.config = config;
            world.round = 0;
            world.start_round(out_events);
        }
        Command::Tick { dt } => {
            if world.status == GameStatus::Playing {
                world.elapsed = world.elapsed.saturating_add(dt);
            }
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::MoveRoomba { direction } => world.move_roomba(direction, out_events),
        Command::SpawnPoop { cell } => world.spawn_poop(cell, out_events),
        Command::Restart => {
            if !world.status.is_over() {
                log::debug!("restart ignored while round {} is in play", world.round);
                return;
            }

            world.round = world.round.saturating_add(1);
            world.start_round(out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Tile, World};
    use roomba_cleanup_core::{CellCoord, GameStatus, GridSize};

    /// Dimensions of the playable grid.
    #[must_use]
    pub fn grid_size(world: &World) -> GridSize {
        world.config.grid()
    }

    /// Current status of the round.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        world.status
    }

    /// Index of the current round; zero for the first round after configuration.
    #[must_use]
    pub fn round(world: &World) -> u32 {
        world.round
    }

    /// Cell currently occupied by the roomba.
    #[must_use]
    pub fn roomba_cell(world: &World) -> CellCoord {
        world.roomba
    }

    /// Cells holding trash, in row-major order.
    #[must_use]
    pub fn trash_cells(world: &World) -> Vec<CellCoord> {
        world.floor.cells_holding(Tile::Trash)
    }

    /// Cells holding poop, in row-major order.
    #[must_use]
    pub fn poop_cells(world: &World) -> Vec<CellCoord> {
        world.floor.cells_holding(Tile::Poop)
    }

    /// Number of trash tiles still on the floor.
    #[must_use]
    pub fn trash_remaining(world: &World) -> u32 {
        world.trash_remaining
    }

    /// Number of poop tiles on the floor.
    #[must_use]
    pub fn poop_count(world: &World) -> u32 {
        world.poop_count
    }

    /// Enumerates the cells free of roomba, trash and poop in row-major order.
    #[must_use]
    pub fn unoccupied_cells(world: &World) -> Vec<CellCoord> {
        world
            .config
            .grid()
            .cells()
            .filter(|cell| !world.is_occupied(*cell))
            .collect()
    }

    /// One-line summary suitable for a status bar.
    #[must_use]
    pub fn status_line(world: &World) -> String {
        match world.status {
            GameStatus::Playing => format!(
                "Trash remaining: {} | Poop on floor: {}",
                world.trash_remaining, world.poop_count
            ),
            GameStatus::Won => "You cleaned everything! Press R to play again.".to_owned(),
            GameStatus::Lost => "You hit poop. Game over! Press R to restart.".to_owned(),
        }
    }

    /// Large banner shown over the grid once the round ends.
    #[must_use]
    pub fn banner(world: &World) -> Option<&'static str> {
        match world.status {
            GameStatus::Playing => None,
            GameStatus::Won => Some("ALL CLEAN!"),
            GameStatus::Lost => Some("GAME OVER"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tile {
    Trash,
    Poop,
}

#[derive(Clone, Debug)]
struct FloorGrid {
    size: GridSize,
    cells: Vec<Option<Tile>>,
}

impl FloorGrid {
    fn new(size: GridSize) -> Self {
        let capacity = usize::try_from(size.cell_count()).unwrap_or(0);
        Self {
            size,
            cells: vec![None; capacity],
        }
    }

    fn get(&self, cell: CellCoord) -> Option<Tile> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    fn set(&mut self, cell: CellCoord, tile: Option<Tile>) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = tile;
            }
        }
    }

    fn cells_holding(&self, tile: Tile) -> Vec<CellCoord> {
        self.size
            .cells()
            .filter(|cell| self.get(*cell) == Some(tile))
            .collect()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.size.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.size.columns()).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

fn round_seed(config: &GameConfig, round: u32) -> u64 {
    config
        .rng_seed()
        .wrapping_add(u64::from(round).wrapping_mul(ROUND_SEED_STRIDE))
}

fn scatter_trash(config: &GameConfig, round: u32) -> Vec<CellCoord> {
    let grid = config.grid();
    let start = grid.center();
    let mut cells: Vec<CellCoord> = grid.cells().filter(|cell| *cell != start).collect();

    let mut rng = ChaCha8Rng::seed_from_u64(round_seed(config, round));
    cells.shuffle(&mut rng);

    let target = usize::try_from(config.effective_trash_count()).unwrap_or(usize::MAX);
    cells.truncate(target);
    cells
}
