use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::draw::model::{Color, DrawMode, ToolState, DEFAULT_BRUSH_SIZE, MAX_BRUSH_SIZE};
use crate::draw::surface::MAX_DIMENSION;

pub const DEFAULT_EXPORT_FILE_NAME: &str = "drawing.png";

const MIN_GRID_SPACING: u32 = 4;
const MIN_HISTORY_LIMIT: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrawSettings {
    #[serde(default = "default_canvas_width")]
    pub canvas_width: u32,
    #[serde(default = "default_canvas_height")]
    pub canvas_height: u32,
    #[serde(default = "default_brush_color")]
    pub brush_color: Color,
    #[serde(default = "default_brush_size")]
    pub brush_size: u32,
    #[serde(default)]
    pub mode: DrawMode,
    #[serde(default = "default_background")]
    pub background: Color,
    #[serde(default)]
    pub show_grid: bool,
    #[serde(default = "default_grid_spacing")]
    pub grid_spacing: u32,
    #[serde(default = "default_grid_color")]
    pub grid_color: Color,
    #[serde(default)]
    pub history_limit: Option<usize>,
    #[serde(default = "default_export_file_name")]
    pub export_file_name: String,
    #[serde(default)]
    pub timestamped_exports: bool,
    #[serde(default)]
    pub export_folder: Option<PathBuf>,
    #[serde(default = "default_notification_seconds")]
    pub notification_seconds: u64,
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_canvas_width() -> u32 {
    600
}

fn default_canvas_height() -> u32 {
    400
}

fn default_brush_color() -> Color {
    Color::BLACK
}

fn default_brush_size() -> u32 {
    DEFAULT_BRUSH_SIZE
}

fn default_background() -> Color {
    Color::WHITE
}

fn default_grid_spacing() -> u32 {
    50
}

fn default_grid_color() -> Color {
    Color::GRID
}

fn default_export_file_name() -> String {
    DEFAULT_EXPORT_FILE_NAME.to_owned()
}

fn default_notification_seconds() -> u64 {
    3
}

impl Default for DrawSettings {
    fn default() -> Self {
        Self {
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            brush_color: default_brush_color(),
            brush_size: default_brush_size(),
            mode: DrawMode::Draw,
            background: default_background(),
            show_grid: false,
            grid_spacing: default_grid_spacing(),
            grid_color: default_grid_color(),
            history_limit: None,
            export_file_name: default_export_file_name(),
            timestamped_exports: false,
            export_folder: None,
            notification_seconds: default_notification_seconds(),
            debug_logging: false,
            log_file: None,
        }
    }
}

impl DrawSettings {
    pub fn tool_state(&self) -> ToolState {
        ToolState {
            brush_color: self.brush_color,
            brush_size: self.brush_size,
            mode: self.mode,
            background: self.background,
            show_grid: self.show_grid,
        }
    }

    /// Copies the tool fields back so they persist across launches.
    pub fn remember_tool_state(&mut self, tool: &ToolState) {
        self.brush_color = tool.brush_color;
        self.brush_size = tool.brush_size;
        self.mode = tool.mode;
        self.background = tool.background;
        self.show_grid = tool.show_grid;
    }

    /// Repairs values a hand-edited file may carry. Returns whether anything
    /// changed.
    pub fn sanitize(&mut self) -> bool {
        let before = self.clone();

        if self.canvas_width == 0 || self.canvas_width > MAX_DIMENSION {
            self.canvas_width = default_canvas_width();
        }
        if self.canvas_height == 0 || self.canvas_height > MAX_DIMENSION {
            self.canvas_height = default_canvas_height();
        }
        self.brush_size = self.brush_size.clamp(1, MAX_BRUSH_SIZE);
        if self.grid_spacing < MIN_GRID_SPACING {
            self.grid_spacing = default_grid_spacing();
        }
        if let Some(limit) = self.history_limit.as_mut() {
            *limit = (*limit).max(MIN_HISTORY_LIMIT);
        }
        if self.export_file_name.trim().is_empty() {
            self.export_file_name = default_export_file_name();
        }
        if self.notification_seconds == 0 {
            self.notification_seconds = default_notification_seconds();
        }

        *self != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip_draw_settings() {
        let settings = DrawSettings::default();
        let json = serde_json::to_string(&settings).expect("serialize draw settings");
        let decoded: DrawSettings = serde_json::from_str(&json).expect("deserialize draw settings");
        assert_eq!(decoded, settings);
    }

    #[test]
    fn defaults_match_drawing_pad() {
        let settings = DrawSettings::default();
        assert_eq!((settings.canvas_width, settings.canvas_height), (600, 400));
        assert_eq!(settings.brush_color, Color::BLACK);
        assert_eq!(settings.brush_size, 5);
        assert_eq!(settings.background, Color::WHITE);
        assert_eq!(settings.grid_spacing, 50);
        assert_eq!(settings.grid_color, Color::rgb(0xe0, 0xe0, 0xe0));
        assert_eq!(settings.export_file_name, "drawing.png");
        assert_eq!(settings.notification_seconds, 3);
        assert_eq!(settings.history_limit, None);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let decoded: DrawSettings = serde_json::from_value(serde_json::json!({
            "brush_size": 15,
            "mode": "erase"
        }))
        .expect("deserialize partial settings");

        assert_eq!(decoded.brush_size, 15);
        assert_eq!(decoded.mode, DrawMode::Erase);
        assert_eq!(decoded.canvas_width, 600);
        assert_eq!(decoded.export_file_name, DEFAULT_EXPORT_FILE_NAME);
    }

    #[test]
    fn sanitize_repairs_out_of_range_values() {
        let mut settings = DrawSettings {
            canvas_width: 0,
            canvas_height: MAX_DIMENSION + 1,
            brush_size: 0,
            grid_spacing: 1,
            history_limit: Some(0),
            export_file_name: "  ".to_owned(),
            notification_seconds: 0,
            ..DrawSettings::default()
        };

        assert!(settings.sanitize());
        assert_eq!((settings.canvas_width, settings.canvas_height), (600, 400));
        assert_eq!(settings.brush_size, 1);
        assert_eq!(settings.grid_spacing, 50);
        assert_eq!(settings.history_limit, Some(2));
        assert_eq!(settings.export_file_name, DEFAULT_EXPORT_FILE_NAME);
        assert_eq!(settings.notification_seconds, 3);

        assert!(!settings.sanitize());
    }

    #[test]
    fn tool_state_roundtrips_through_settings() {
        let mut settings = DrawSettings::default();
        let mut tool = settings.tool_state();
        tool.brush_size = 20;
        tool.show_grid = true;
        tool.mode = DrawMode::Erase;

        settings.remember_tool_state(&tool);
        assert_eq!(settings.tool_state(), tool);
    }
}
