#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Roomba Cleanup adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use roomba_cleanup_core::{CellCoord, Direction};
use std::time::Duration;
use thiserror::Error;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self::new(
            red as f32 / 255.0,
            green as f32 / 255.0,
            blue as f32 / 255.0,
            1.0,
        )
    }

    /// Returns the same color with the provided alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self::new(self.red, self.green, self.blue, alpha)
    }
}

/// Palette used by the standard presentation.
pub mod palette {
    use super::Color;

    /// Floor colour behind every cell.
    pub const FLOOR: Color = Color::from_rgb_u8(0xf3, 0xf4, 0xf6);
    /// Grid line colour.
    pub const GRID_LINE: Color = Color::from_rgb_u8(0xd1, 0xd5, 0xdb);
    /// Roomba tile colour.
    pub const ROOMBA: Color = Color::from_rgb_u8(0x25, 0x63, 0xeb);
    /// Trash tile colour.
    pub const TRASH: Color = Color::from_rgb_u8(0xf5, 0x9e, 0x0b);
    /// Poop tile colour.
    pub const POOP: Color = Color::from_rgb_u8(0x7c, 0x3f, 0x00);
    /// Text colour for status lines and banners.
    pub const TEXT: Color = Color::from_rgb_u8(0x11, 0x18, 0x27);
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Direction pressed on this frame; at most one per frame.
    pub direction: Option<Direction>,
    /// Whether the adapter detected a restart press on this frame.
    pub restart: bool,
}

/// Describes the square-celled grid that adapters render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single cell expressed in world units.
    pub cell_length: f32,
    /// Fill colour of empty cells.
    pub floor_color: Color,
    /// Color used when drawing grid lines.
    pub line_color: Color,
}

impl GridPresentation {
    /// Default side length of a cell in world units.
    pub const DEFAULT_CELL_LENGTH: f32 = 38.0;

    /// Inset applied to every tile so grid lines stay visible.
    pub const TILE_INSET: f32 = 4.0;

    /// Creates a new grid descriptor.
    ///
    /// Returns an error when `cell_length` is not a positive finite number.
    pub fn new(
        columns: u32,
        rows: u32,
        cell_length: f32,
        floor_color: Color,
        line_color: Color,
    ) -> Result<Self, RenderingError> {
        if !cell_length.is_finite() || cell_length <= 0.0 {
            return Err(RenderingError::InvalidCellLength { cell_length });
        }

        Ok(Self {
            columns,
            rows,
            cell_length,
            floor_color,
            line_color,
        })
    }

    /// Calculates the total width of the grid.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_length
    }

    /// Calculates the total height of the grid.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_length
    }

    /// Upper-left corner of a cell in world units.
    #[must_use]
    pub fn cell_origin(&self, column: u32, row: u32) -> Vec2 {
        Vec2::new(column as f32, row as f32) * self.cell_length
    }

    /// Size of the inset square a tile occupies inside its cell.
    #[must_use]
    pub fn tile_length(&self) -> f32 {
        (self.cell_length - 2.0 * Self::TILE_INSET).max(self.cell_length * 0.5)
    }
}

/// Entities that occupy a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// The player-controlled roomba.
    Roomba,
    /// A collectible trash tile.
    Trash,
    /// A hazard tile.
    Poop,
}

/// Single occupied cell rendered as an inset filled square.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TilePresentation {
    /// Zero-based column index of the cell.
    pub column: u32,
    /// Zero-based row index of the cell.
    pub row: u32,
    /// Entity drawn in the cell.
    pub kind: TileKind,
    /// Fill colour of the tile.
    pub color: Color,
}

impl TilePresentation {
    /// Creates a tile for `kind` at `cell` using the standard palette.
    #[must_use]
    pub const fn new(cell: CellCoord, kind: TileKind) -> Self {
        let color = match kind {
            TileKind::Roomba => palette::ROOMBA,
            TileKind::Trash => palette::TRASH,
            TileKind::Poop => palette::POOP,
        };
        Self {
            column: cell.column(),
            row: cell.row(),
            kind,
            color,
        }
    }
}

/// Scene description combining the grid, its inhabitants and the HUD text.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Grid that composes the play area.
    pub grid: GridPresentation,
    /// Trash and poop tiles currently on the floor.
    pub tiles: Vec<TilePresentation>,
    /// The roomba, drawn above every other tile.
    pub roomba: TilePresentation,
    /// Status line shown beneath the grid.
    pub status_line: String,
    /// Controls hint shown beneath the status line.
    pub hint_line: String,
    /// Large message centred on the grid once the round ends.
    pub banner: Option<String>,
}

impl Scene {
    /// Height reserved beneath the grid for the status and hint lines.
    pub const HUD_HEIGHT: f32 = 64.0;

    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(grid: GridPresentation, roomba: CellCoord) -> Self {
        Self {
            grid,
            tiles: Vec::new(),
            roomba: TilePresentation::new(roomba, TileKind::Roomba),
            status_line: String::new(),
            hint_line: String::new(),
            banner: None,
        }
    }

    /// Height of the entire scene including the HUD.
    #[must_use]
    pub fn total_height(&self) -> f32 {
        self.grid.height() + Self::HUD_HEIGHT
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Roomba Cleanup scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame delta,
    /// per-frame input captured by the adapter, and may mutate the scene before
    /// it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum RenderingError {
    /// Cells must have a positive size.
    #[error("cell_length must be a positive finite number (received {cell_length})")]
    InvalidCellLength {
        /// Provided cell length that failed validation.
        cell_length: f32,
    },
}
