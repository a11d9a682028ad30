//! Frame-driven orchestration of the world and its systems.

use std::{mem, time::Duration};

use roomba_cleanup_core::{Command, Event, GameConfig};
use roomba_cleanup_rendering::{FrameInput, Scene, TileKind, TilePresentation};
use roomba_cleanup_system_movement::{Movement, PlayerInput};
use roomba_cleanup_system_spawning::{Config as SpawningConfig, Spawning};
use roomba_cleanup_world::{self as world, query, World};

/// Controls hint rendered beneath the status line.
pub(crate) const HINT_LINE: &str = "Move: Arrow Keys or WASD | Clean all trash, avoid poop";

/// Owns the authoritative world together with the systems that drive it.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    movement: Movement,
    spawning: Spawning,
    /// Events the movement system has not observed yet.
    pending_events: Vec<Event>,
}

impl Simulation {
    /// Builds a simulation whose first round follows `config`.
    pub(crate) fn new(config: GameConfig) -> Self {
        let mut world = World::new();
        let mut pending_events = Vec::new();
        world::apply(
            &mut world,
            Command::ConfigureGame { config },
            &mut pending_events,
        );

        let mut spawning = Spawning::new(SpawningConfig::from_game(&config));
        let mut ignored = Vec::new();
        spawning.handle(
            &pending_events,
            &query::unoccupied_cells(&world),
            &mut ignored,
        );

        Self {
            world,
            movement: Movement::new(),
            spawning,
            pending_events,
        }
    }

    /// Advances the simulation by one frame.
    pub(crate) fn advance(&mut self, dt: Duration, input: FrameInput) {
        let mut events = mem::take(&mut self.pending_events);
        let carried = events.len();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let mut commands = Vec::new();
        self.movement.handle(
            &events,
            PlayerInput::new(input.direction, input.restart),
            &mut commands,
        );
        let seen_by_movement = events.len();
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, &mut events);
        }

        let unoccupied = query::unoccupied_cells(&self.world);
        self.spawning.handle(&events[carried..], &unoccupied, &mut commands);
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, &mut events);
        }

        self.pending_events = events.split_off(seen_by_movement);
    }

    /// Writes the current world state into `scene`.
    pub(crate) fn populate_scene(&self, scene: &mut Scene) {
        scene.tiles.clear();
        scene.tiles.extend(
            query::trash_cells(&self.world)
                .into_iter()
                .map(|cell| TilePresentation::new(cell, TileKind::Trash)),
        );
        scene.tiles.extend(
            query::poop_cells(&self.world)
                .into_iter()
                .map(|cell| TilePresentation::new(cell, TileKind::Poop)),
        );
        scene.roomba = TilePresentation::new(query::roomba_cell(&self.world), TileKind::Roomba);
        scene.status_line = query::status_line(&self.world);
        if scene.hint_line != HINT_LINE {
            scene.hint_line = HINT_LINE.to_owned();
        }
        scene.banner = query::banner(&self.world).map(str::to_owned);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomba_cleanup_core::{CellCoord, Direction, GameStatus, GridSize};
    use roomba_cleanup_rendering::{palette, GridPresentation};

    fn scene_for(config: &GameConfig) -> Scene {
        let grid = GridPresentation::new(
            config.grid().columns(),
            config.grid().rows(),
            GridPresentation::DEFAULT_CELL_LENGTH,
            palette::FLOOR,
            palette::GRID_LINE,
        )
        .expect("valid grid");
        Scene::new(grid, config.grid().center())
    }

    fn press(direction: Direction) -> FrameInput {
        FrameInput {
            direction: Some(direction),
            restart: false,
        }
    }

    fn restart() -> FrameInput {
        FrameInput {
            direction: None,
            restart: true,
        }
    }

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn new_simulation_presents_full_round() {
        let config = GameConfig::default();
        let simulation = Simulation::new(config);
        let mut scene = scene_for(&config);

        simulation.populate_scene(&mut scene);

        assert_eq!(scene.tiles.len(), 24);
        assert!(scene
            .tiles
            .iter()
            .all(|tile| tile.kind == TileKind::Trash));
        assert_eq!(
            (scene.roomba.column, scene.roomba.row),
            (7, 7),
            "roomba starts at the centre"
        );
        assert_eq!(scene.status_line, "Trash remaining: 24 | Poop on floor: 0");
        assert_eq!(scene.hint_line, HINT_LINE);
        assert!(scene.banner.is_none());
    }

    #[test]
    fn collecting_all_trash_wins_and_restart_resets_round() {
        // The roomba starts at (0, 1) and the only trash tile sits at (0, 0).
        let config = GameConfig::new(GridSize::new(1, 2))
            .with_trash_count(1)
            .with_spawn_chance(0.0);
        let mut simulation = Simulation::new(config);
        let mut scene = scene_for(&config);

        simulation.advance(FRAME, press(Direction::North));
        simulation.populate_scene(&mut scene);
        assert_eq!(query::status(&simulation.world), GameStatus::Won);
        assert_eq!(scene.banner.as_deref(), Some("ALL CLEAN!"));
        assert_eq!(
            scene.status_line,
            "You cleaned everything! Press R to play again."
        );

        simulation.advance(FRAME, press(Direction::South));
        assert_eq!(
            query::roomba_cell(&simulation.world),
            CellCoord::new(0, 0),
            "movement is frozen after the round ends"
        );

        simulation.advance(FRAME, restart());
        simulation.populate_scene(&mut scene);
        assert_eq!(query::status(&simulation.world), GameStatus::Playing);
        assert_eq!(query::round(&simulation.world), 1);
        assert_eq!(query::roomba_cell(&simulation.world), CellCoord::new(0, 1));
        assert_eq!(scene.tiles.len(), 1);
        assert!(scene.banner.is_none());

        simulation.advance(FRAME, press(Direction::North));
        assert_eq!(query::status(&simulation.world), GameStatus::Won);
    }

    #[test]
    fn driving_into_spawned_poop_loses() {
        // A 3x1 floor with one trash tile leaves exactly one free cell for poop.
        let config = GameConfig::new(GridSize::new(3, 1))
            .with_trash_count(1)
            .with_spawn_interval(Duration::from_millis(1))
            .with_spawn_chance(1.0);
        let mut simulation = Simulation::new(config);
        let mut scene = scene_for(&config);

        simulation.advance(Duration::from_millis(10), FrameInput::default());
        let poop = query::poop_cells(&simulation.world);
        assert_eq!(poop.len(), 1, "the only free cell should hold poop");
        assert_ne!(poop[0], query::roomba_cell(&simulation.world));

        let direction = if poop[0].column() == 0 {
            Direction::West
        } else {
            Direction::East
        };
        simulation.advance(Duration::ZERO, press(direction));
        simulation.populate_scene(&mut scene);

        assert_eq!(query::status(&simulation.world), GameStatus::Lost);
        assert_eq!(scene.banner.as_deref(), Some("GAME OVER"));
        assert_eq!(
            scene.status_line,
            "You hit poop. Game over! Press R to restart."
        );

        simulation.advance(FRAME, restart());
        assert_eq!(query::poop_count(&simulation.world), 0);
        assert_eq!(query::trash_remaining(&simulation.world), 1);
    }

    #[test]
    fn finished_round_never_requests_spawns() {
        let config = GameConfig::new(GridSize::new(3, 3))
            .with_trash_count(0)
            .with_spawn_interval(Duration::from_millis(10))
            .with_spawn_chance(1.0);
        let mut simulation = Simulation::new(config);
        assert_eq!(query::status(&simulation.world), GameStatus::Won);

        for _ in 0..10 {
            simulation.advance(Duration::from_millis(100), FrameInput::default());
        }

        assert_eq!(query::poop_count(&simulation.world), 0);
        assert!(simulation
            .pending_events
            .iter()
            .all(|event| !matches!(event, Event::PoopRejected { .. })));
    }

    #[test]
    fn identical_seeds_replay_identically() {
        let config = GameConfig::new(GridSize::new(9, 9))
            .with_trash_count(12)
            .with_spawn_interval(Duration::from_millis(200))
            .with_spawn_chance(0.5)
            .with_rng_seed(0x0bad_5eed);
        let script = [
            Direction::East,
            Direction::East,
            Direction::North,
            Direction::West,
            Direction::South,
            Direction::South,
        ];

        let run = || {
            let mut simulation = Simulation::new(config);
            for (frame, direction) in script.iter().cycle().take(40).enumerate() {
                let input = if frame % 3 == 0 {
                    press(*direction)
                } else {
                    FrameInput::default()
                };
                simulation.advance(Duration::from_millis(90), input);
            }
            (
                query::roomba_cell(&simulation.world),
                query::trash_cells(&simulation.world),
                query::poop_cells(&simulation.world),
                query::status(&simulation.world),
            )
        };

        assert_eq!(run(), run());
    }
}
