#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Roomba Cleanup.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.

use anyhow::{ensure, Result};
use glam::Vec2;
use macroquad::input::{is_key_pressed, KeyCode};
use roomba_cleanup_core::Direction;
use roomba_cleanup_rendering::{
    Color, FrameInput, GridPresentation, Presentation, RenderingBackend, Scene, TilePresentation,
};
use std::time::Duration;

/// Border around the grid, in world units, left free on every side of the window.
const WINDOW_MARGIN: f32 = 12.0;

/// Font size of the status and hint lines at a scale of 1.0.
const HUD_FONT_SIZE: f32 = 20.0;

/// Font size of the end-of-round banner at a scale of 1.0.
const BANNER_FONT_SIZE: f32 = 48.0;

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
    /// `Up` or `W`.
    up: bool,
    /// `Down` or `S`.
    down: bool,
    /// `Left` or `A`.
    left: bool,
    /// `Right` or `D`.
    right: bool,
    /// `R` starts a new round once the current one has ended.
    restart: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let quit_requested = is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q);
        let up = is_key_pressed(KeyCode::Up) || is_key_pressed(KeyCode::W);
        let down = is_key_pressed(KeyCode::Down) || is_key_pressed(KeyCode::S);
        let left = is_key_pressed(KeyCode::Left) || is_key_pressed(KeyCode::A);
        let right = is_key_pressed(KeyCode::Right) || is_key_pressed(KeyCode::D);
        let restart = is_key_pressed(KeyCode::R);

        Self {
            quit_requested,
            up,
            down,
            left,
            right,
            restart,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self { swap_interval } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: window_dimension(scene.grid.width() + 2.0 * WINDOW_MARGIN)?,
            window_height: window_dimension(scene.total_height() + 2.0 * WINDOW_MARGIN)?,
            window_resizable: true,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        log::info!(
            "opening {}x{} window",
            config.window_width,
            config.window_height
        );

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    log::info!("quit requested");
                    break;
                }

                macroquad::window::clear_background(background);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = gather_frame_input_from_observations(
                    keyboard.up,
                    keyboard.down,
                    keyboard.left,
                    keyboard.right,
                    keyboard.restart,
                );

                update_scene(frame_dt, frame_input, &mut scene);

                let metrics = SceneMetrics::from_scene(
                    &scene,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );

                draw_floor(&scene, &metrics);
                draw_grid_lines(&scene, &metrics);
                for tile in &scene.tiles {
                    draw_tile(tile, &metrics);
                }
                draw_tile(&scene.roomba, &metrics);
                if let Some(banner) = scene.banner.as_deref() {
                    draw_banner(banner, &scene, &metrics);
                }
                draw_hud(&scene, &metrics);

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Converts a window length in world units into the pixel count requested from the platform.
fn window_dimension(length: f32) -> Result<i32> {
    ensure!(
        length.is_finite() && length >= 1.0 && length <= i32::MAX as f32,
        "window dimension {length} cannot be requested from the platform"
    );
    Ok(length.ceil() as i32)
}

#[derive(Clone, Copy, Debug)]
struct SceneMetrics {
    grid: GridPresentation,
    scale: f32,
    grid_offset_x: f32,
    grid_offset_y: f32,
    grid_width_scaled: f32,
    grid_height_scaled: f32,
    cell_step: f32,
    tile_step: f32,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let grid = scene.grid;
        let world_width = grid.width() + 2.0 * WINDOW_MARGIN;
        let world_height = scene.total_height() + 2.0 * WINDOW_MARGIN;
        let scale =
            (screen_width / world_width).min(screen_height / world_height).max(0.0);

        let offset_x = ((screen_width - world_width * scale) * 0.5).max(0.0);
        let offset_y = ((screen_height - world_height * scale) * 0.5).max(0.0);

        Self {
            grid,
            scale,
            grid_offset_x: offset_x + WINDOW_MARGIN * scale,
            grid_offset_y: offset_y + WINDOW_MARGIN * scale,
            grid_width_scaled: grid.width() * scale,
            grid_height_scaled: grid.height() * scale,
            cell_step: grid.cell_length * scale,
            tile_step: grid.tile_length() * scale,
        }
    }

    /// Screen position of the upper-left corner of the inset tile drawn in a cell.
    fn tile_origin(&self, column: u32, row: u32) -> Vec2 {
        let inset = (self.cell_step - self.tile_step) * 0.5;
        Vec2::new(self.grid_offset_x, self.grid_offset_y)
            + self.grid.cell_origin(column, row) * self.scale
            + Vec2::splat(inset)
    }

    /// Screen position of the centre of the grid.
    fn grid_center(&self) -> Vec2 {
        Vec2::new(
            self.grid_offset_x + self.grid_width_scaled * 0.5,
            self.grid_offset_y + self.grid_height_scaled * 0.5,
        )
    }

    /// Baseline of the HUD line with the given index.
    fn hud_baseline(&self, line: usize) -> f32 {
        self.grid_offset_y + self.grid_height_scaled + (line as f32 + 1.0) * 24.0 * self.scale
    }

    fn font_size(&self, base: f32) -> u16 {
        (base * self.scale).round().clamp(1.0, f32::from(u16::MAX)) as u16
    }
}

/// Resolves the keys pressed this frame into at most one movement direction.
fn gather_frame_input_from_observations(
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    restart: bool,
) -> FrameInput {
    let direction = [
        (up, Direction::North),
        (down, Direction::South),
        (left, Direction::West),
        (right, Direction::East),
    ]
    .into_iter()
    .find_map(|(pressed, direction)| pressed.then_some(direction));

    FrameInput { direction, restart }
}

fn draw_floor(scene: &Scene, metrics: &SceneMetrics) {
    macroquad::shapes::draw_rectangle(
        metrics.grid_offset_x,
        metrics.grid_offset_y,
        metrics.grid_width_scaled,
        metrics.grid_height_scaled,
        to_macroquad_color(scene.grid.floor_color),
    );
}

fn draw_grid_lines(scene: &Scene, metrics: &SceneMetrics) {
    let grid = scene.grid;
    let line_color = to_macroquad_color(grid.line_color);

    for column in 0..=grid.columns {
        let x = metrics.grid_offset_x + column as f32 * metrics.cell_step;
        macroquad::shapes::draw_line(
            x,
            metrics.grid_offset_y,
            x,
            metrics.grid_offset_y + metrics.grid_height_scaled,
            1.0,
            line_color,
        );
    }

    for row in 0..=grid.rows {
        let y = metrics.grid_offset_y + row as f32 * metrics.cell_step;
        macroquad::shapes::draw_line(
            metrics.grid_offset_x,
            y,
            metrics.grid_offset_x + metrics.grid_width_scaled,
            y,
            1.0,
            line_color,
        );
    }
}

fn draw_tile(tile: &TilePresentation, metrics: &SceneMetrics) {
    let origin = metrics.tile_origin(tile.column, tile.row);
    macroquad::shapes::draw_rectangle(
        origin.x,
        origin.y,
        metrics.tile_step,
        metrics.tile_step,
        to_macroquad_color(tile.color),
    );
}

fn draw_banner(banner: &str, scene: &Scene, metrics: &SceneMetrics) {
    macroquad::shapes::draw_rectangle(
        metrics.grid_offset_x,
        metrics.grid_offset_y,
        metrics.grid_width_scaled,
        metrics.grid_height_scaled,
        to_macroquad_color(scene.grid.floor_color.with_alpha(0.7)),
    );

    let font_size = metrics.font_size(BANNER_FONT_SIZE);
    let dimensions = macroquad::text::measure_text(banner, None, font_size, 1.0);
    let center = metrics.grid_center();
    macroquad::text::draw_text(
        banner,
        center.x - dimensions.width * 0.5,
        center.y + dimensions.offset_y * 0.5,
        f32::from(font_size),
        to_macroquad_color(roomba_cleanup_rendering::palette::TEXT),
    );
}

fn draw_hud(scene: &Scene, metrics: &SceneMetrics) {
    let font_size = f32::from(metrics.font_size(HUD_FONT_SIZE));
    let text_color = to_macroquad_color(roomba_cleanup_rendering::palette::TEXT);

    for (line, text) in [&scene.status_line, &scene.hint_line].into_iter().enumerate() {
        if text.is_empty() {
            continue;
        }
        macroquad::text::draw_text(
            text,
            metrics.grid_offset_x,
            metrics.hud_baseline(line),
            font_size,
            text_color,
        );
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomba_cleanup_core::CellCoord;
    use roomba_cleanup_rendering::palette;

    fn base_scene(columns: u32, rows: u32) -> Scene {
        let grid = GridPresentation::new(
            columns,
            rows,
            GridPresentation::DEFAULT_CELL_LENGTH,
            palette::FLOOR,
            palette::GRID_LINE,
        )
        .expect("valid grid");
        Scene::new(grid, CellCoord::new(columns / 2, rows / 2))
    }

    fn native_size(scene: &Scene) -> (f32, f32) {
        (
            scene.grid.width() + 2.0 * WINDOW_MARGIN,
            scene.total_height() + 2.0 * WINDOW_MARGIN,
        )
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() <= 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn scene_metrics_match_world_units_at_native_size() {
        let scene = base_scene(14, 14);
        let (width, height) = native_size(&scene);
        let metrics = SceneMetrics::from_scene(&scene, width, height);

        assert_close(metrics.scale, 1.0);
        assert_close(metrics.grid_offset_x, WINDOW_MARGIN);
        assert_close(metrics.grid_offset_y, WINDOW_MARGIN);
        assert_close(metrics.grid_width_scaled, 14.0 * 38.0);
        assert_close(metrics.cell_step, 38.0);
        assert_close(metrics.tile_step, 30.0);
    }

    #[test]
    fn scene_metrics_centre_grid_in_wide_window() {
        let scene = base_scene(4, 4);
        let (width, height) = native_size(&scene);
        let metrics = SceneMetrics::from_scene(&scene, width * 3.0, height);

        assert_close(metrics.scale, 1.0);
        assert_close(metrics.grid_offset_x, width + WINDOW_MARGIN);
        assert_close(metrics.grid_center().x, width * 1.5);
    }

    #[test]
    fn scene_metrics_shrink_to_fit_small_window() {
        let scene = base_scene(10, 10);
        let (width, height) = native_size(&scene);
        let metrics = SceneMetrics::from_scene(&scene, width * 0.5, height * 0.5);

        assert_close(metrics.scale, 0.5);
        assert!(metrics.hud_baseline(1) <= height * 0.5);
    }

    #[test]
    fn tile_origin_applies_inset() {
        let scene = base_scene(5, 5);
        let (width, height) = native_size(&scene);
        let metrics = SceneMetrics::from_scene(&scene, width, height);

        let origin = metrics.tile_origin(2, 3);
        assert_close(origin.x, WINDOW_MARGIN + 2.0 * 38.0 + GridPresentation::TILE_INSET);
        assert_close(origin.y, WINDOW_MARGIN + 3.0 * 38.0 + GridPresentation::TILE_INSET);
    }

    #[test]
    fn tile_origin_follows_scale() {
        let scene = base_scene(5, 5);
        let (width, height) = native_size(&scene);
        let half = SceneMetrics::from_scene(&scene, width * 0.5, height * 0.5);

        let origin = half.tile_origin(4, 1);
        let expected = scene.grid.cell_origin(4, 1) * 0.5
            + Vec2::splat(WINDOW_MARGIN * 0.5 + GridPresentation::TILE_INSET * 0.5);
        assert_close(origin.x, expected.x);
        assert_close(origin.y, expected.y);
    }

    #[test]
    fn hud_lines_sit_below_grid() {
        let scene = base_scene(6, 6);
        let (width, height) = native_size(&scene);
        let metrics = SceneMetrics::from_scene(&scene, width, height);
        let grid_bottom = metrics.grid_offset_y + metrics.grid_height_scaled;

        assert!(metrics.hud_baseline(0) > grid_bottom);
        assert!(metrics.hud_baseline(1) > metrics.hud_baseline(0));
        assert!(metrics.hud_baseline(1) <= grid_bottom + Scene::HUD_HEIGHT);
    }

    #[test]
    fn single_key_maps_to_direction() {
        let input = gather_frame_input_from_observations(false, false, true, false, false);
        assert_eq!(input.direction, Some(Direction::West));
        assert!(!input.restart);

        let input = gather_frame_input_from_observations(false, true, false, false, false);
        assert_eq!(input.direction, Some(Direction::South));
    }

    #[test]
    fn simultaneous_keys_resolve_up_down_left_right() {
        let input = gather_frame_input_from_observations(true, true, true, true, false);
        assert_eq!(input.direction, Some(Direction::North));

        let input = gather_frame_input_from_observations(false, true, true, true, false);
        assert_eq!(input.direction, Some(Direction::South));

        let input = gather_frame_input_from_observations(false, false, true, true, false);
        assert_eq!(input.direction, Some(Direction::West));
    }

    #[test]
    fn restart_passes_through_without_direction() {
        let input = gather_frame_input_from_observations(false, false, false, false, true);
        assert_eq!(
            input,
            FrameInput {
                direction: None,
                restart: true,
            }
        );
    }

    #[test]
    fn window_dimension_rejects_unrepresentable_lengths() {
        assert_eq!(window_dimension(556.4).expect("valid length"), 557);
        assert!(window_dimension(f32::NAN).is_err());
        assert!(window_dimension(0.0).is_err());
        assert!(window_dimension(f32::INFINITY).is_err());
    }

    #[test]
    fn colours_convert_channel_for_channel() {
        let converted = to_macroquad_color(palette::ROOMBA.with_alpha(0.5));
        assert_close(converted.r, palette::ROOMBA.red);
        assert_close(converted.g, palette::ROOMBA.green);
        assert_close(converted.b, palette::ROOMBA.blue);
        assert_close(converted.a, 0.5);
    }
}
