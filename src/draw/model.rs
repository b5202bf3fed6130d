use serde::{Deserialize, Serialize};

/// Canvas-local pixel coordinate. May lie outside the surface; rasterization clips.
pub type Point = (i32, i32);

/// Brush sizes offered by the toolbar.
pub const BRUSH_SIZE_PRESETS: [u32; 5] = [2, 5, 10, 15, 20];

pub const DEFAULT_BRUSH_SIZE: u32 = 5;
pub const MAX_BRUSH_SIZE: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const GRID: Self = Self::rgb(0xe0, 0xe0, 0xe0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub fn to_rgba_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_rgba_array(color: [u8; 4]) -> Self {
        Self::rgba(color[0], color[1], color[2], color[3])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    #[default]
    Draw,
    Erase,
}

impl DrawMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Draw => Self::Erase,
            Self::Erase => Self::Draw,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Draw => "Draw",
            Self::Erase => "Erase",
        }
    }
}

/// Brush parameters captured when a stroke starts. Later tool changes do not
/// affect a stroke already in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrushParams {
    pub color: Color,
    pub size: u32,
    pub mode: DrawMode,
    /// Background at stroke start; what an erase stroke paints.
    pub erase_color: Color,
}

impl BrushParams {
    /// Color this brush puts on the surface.
    pub fn ink(&self) -> Color {
        match self.mode {
            DrawMode::Draw => self.color,
            DrawMode::Erase => self.erase_color,
        }
    }
}

/// Current tool configuration. Not part of history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolState {
    pub brush_color: Color,
    pub brush_size: u32,
    pub mode: DrawMode,
    pub background: Color,
    pub show_grid: bool,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            brush_color: Color::BLACK,
            brush_size: DEFAULT_BRUSH_SIZE,
            mode: DrawMode::Draw,
            background: Color::WHITE,
            show_grid: false,
        }
    }
}

impl ToolState {
    pub fn brush(&self) -> BrushParams {
        BrushParams {
            color: self.brush_color,
            size: self.brush_size.clamp(1, MAX_BRUSH_SIZE),
            mode: self.mode,
            erase_color: self.background,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stroke {
    pub brush: BrushParams,
    pub points: Vec<Point>,
}
