use crate::draw::codec::FormatError;
use crate::draw::history::HistoryLog;
use crate::draw::messages::{Notification, CANVAS_CLEARED, IMAGE_IMPORTED};
use crate::draw::model::{Color, DrawMode, Point, ToolState, MAX_BRUSH_SIZE};
use crate::draw::render::DirtyRect;
use crate::draw::settings::DrawSettings;
use crate::draw::stroke::StrokeSession;
use crate::draw::surface::{Surface, SurfaceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridStyle {
    pub spacing: u32,
    pub color: Color,
}

impl Default for GridStyle {
    fn default() -> Self {
        Self {
            spacing: 50,
            color: Color::GRID,
        }
    }
}

/// Owns the surface, its history and the in-progress stroke, and exposes the
/// operations a toolbar and a pointer need.
///
/// Every edit that changes pixels outside a live stroke (stroke end, clear,
/// import) commits exactly one history entry. Operations that replace the
/// surface wholesale finish the pending stroke first.
#[derive(Debug, Clone)]
pub struct DrawSession {
    surface: Surface,
    history: HistoryLog,
    stroke: StrokeSession,
    tool: ToolState,
    grid: GridStyle,
    history_limit: Option<usize>,
    revision: u64,
}

impl DrawSession {
    pub fn new(
        width: u32,
        height: u32,
        tool: ToolState,
        history_limit: Option<usize>,
    ) -> Result<Self, SurfaceError> {
        let surface = Surface::initialize(width, height, tool.background)?;
        let history = HistoryLog::with_limit(surface.to_encoded_image(), history_limit);
        tracing::debug!(width, height, ?history_limit, "draw session created");
        Ok(Self {
            surface,
            history,
            stroke: StrokeSession::new(),
            tool,
            grid: GridStyle::default(),
            history_limit,
            revision: 0,
        })
    }

    pub fn from_settings(settings: &DrawSettings) -> Result<Self, SurfaceError> {
        let mut session = Self::new(
            settings.canvas_width,
            settings.canvas_height,
            settings.tool_state(),
            settings.history_limit,
        )?;
        session.grid = GridStyle {
            spacing: settings.grid_spacing,
            color: settings.grid_color,
        };
        Ok(session)
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn tool(&self) -> &ToolState {
        &self.tool
    }

    pub fn grid(&self) -> GridStyle {
        self.grid
    }

    /// Bumped on every pixel change; lets a view skip re-uploading unchanged frames.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_stroking(&self) -> bool {
        self.stroke.is_active()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo() || self.stroke.is_active()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn set_brush_color(&mut self, color: Color) {
        self.tool.brush_color = color;
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.tool.brush_size = size.clamp(1, MAX_BRUSH_SIZE);
    }

    pub fn set_mode(&mut self, mode: DrawMode) {
        self.tool.mode = mode;
    }

    pub fn toggle_mode(&mut self) -> DrawMode {
        self.tool.mode = self.tool.mode.toggled();
        self.tool.mode
    }

    /// Changes the color used by erase and clear. Existing pixels keep their
    /// color until the next clear.
    pub fn set_background(&mut self, color: Color) {
        self.tool.background = color;
        self.surface.set_background(color);
    }

    pub fn set_grid_visible(&mut self, visible: bool) {
        self.tool.show_grid = visible;
    }

    pub fn toggle_grid(&mut self) -> bool {
        self.tool.show_grid = !self.tool.show_grid;
        self.tool.show_grid
    }

    pub fn begin_stroke(&mut self, point: Point) -> bool {
        self.stroke.begin(point, self.tool.brush())
    }

    pub fn extend_stroke(&mut self, point: Point) -> Option<DirtyRect> {
        let dirty = self.stroke.extend(point, &mut self.surface)?;
        self.revision += 1;
        Some(dirty)
    }

    /// Finishes the active stroke and commits it. Returns the history
    /// sequence number, or `None` when no stroke was active.
    pub fn end_stroke(&mut self) -> Option<u64> {
        let stroke = self.stroke.end(&mut self.surface)?;
        self.revision += 1;
        let seq = self.history.commit(self.surface.to_encoded_image());
        tracing::debug!(
            seq,
            points = stroke.points.len(),
            mode = stroke.brush.mode.label(),
            size = stroke.brush.size,
            "stroke committed"
        );
        Some(seq)
    }

    fn finish_pending_stroke(&mut self) {
        if self.stroke.is_active() {
            tracing::debug!("finishing pending stroke before replacing surface");
            self.end_stroke();
        }
    }

    pub fn undo(&mut self) -> bool {
        self.finish_pending_stroke();
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        if let Err(err) = self.surface.load_encoded_image(&snapshot) {
            tracing::error!(%err, "failed to restore undo snapshot");
            self.history.redo();
            return false;
        }
        self.revision += 1;
        tracing::debug!(cursor = self.history.cursor(), "undo");
        true
    }

    pub fn redo(&mut self) -> bool {
        self.finish_pending_stroke();
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        if let Err(err) = self.surface.load_encoded_image(&snapshot) {
            tracing::error!(%err, "failed to restore redo snapshot");
            self.history.undo();
            return false;
        }
        self.revision += 1;
        tracing::debug!(cursor = self.history.cursor(), "redo");
        true
    }

    /// Fills the surface with the current background and records the result.
    pub fn clear(&mut self) -> Notification {
        self.finish_pending_stroke();
        self.surface.clear(self.tool.background);
        self.revision += 1;
        let seq = self.history.commit(self.surface.to_encoded_image());
        tracing::info!(seq, "canvas cleared");
        Notification::success(CANVAS_CLEARED)
    }

    /// Replaces the surface with one of the new size holding the old top-left
    /// region. History restarts from the resized surface.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        if self.surface.size() == (width, height) {
            return Ok(());
        }
        self.finish_pending_stroke();
        let resized = self.surface.resized(width, height)?;
        let previous = self.surface.size();
        self.surface = resized;
        self.history = HistoryLog::with_limit(self.surface.to_encoded_image(), self.history_limit);
        self.revision += 1;
        tracing::info!(?previous, width, height, "canvas resized");
        Ok(())
    }

    pub fn export_png(&self) -> Result<Vec<u8>, image::ImageError> {
        self.surface.export_png()
    }

    /// Loads a raw pixel encoding of the current canvas size. On error the
    /// surface and history are unchanged.
    pub fn import_raw(&mut self, bytes: &[u8]) -> Result<Notification, FormatError> {
        let (width, height) = self.surface.size();
        let imported = Surface::import_raw(bytes, width, height, self.tool.background)?;
        Ok(self.replace_surface(imported, "raw"))
    }

    pub fn import_png(&mut self, bytes: &[u8]) -> Result<Notification, FormatError> {
        let (width, height) = self.surface.size();
        let imported = Surface::import_png(bytes, width, height, self.tool.background)?;
        Ok(self.replace_surface(imported, "png"))
    }

    fn replace_surface(&mut self, imported: Surface, format: &'static str) -> Notification {
        self.finish_pending_stroke();
        self.surface = imported;
        self.revision += 1;
        let seq = self.history.commit(self.surface.to_encoded_image());
        tracing::info!(seq, format, "image imported");
        Notification::success(IMAGE_IMPORTED)
    }

    /// Pixels to present, with the grid overlaid when it is enabled.
    pub fn display_frame(&self) -> Vec<u8> {
        let grid = self
            .tool
            .show_grid
            .then_some((self.grid.spacing, self.grid.color));
        self.surface.display_frame(grid)
    }
}
