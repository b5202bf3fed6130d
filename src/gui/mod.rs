mod toolbar;

pub use toolbar::{from_color32, to_color32, Toolbar, ToolbarAction};

use crate::draw::input::{
    map_key_event, CanvasRect, InputCommand, KeyCode, KeyEvent, KeyModifiers, PointerAdapter,
    PointerEvent, PointerPhase,
};
use crate::draw::messages::{Notification, NotificationKind};
use crate::draw::save;
use crate::draw::session::DrawSession;
use crate::draw::settings::DrawSettings;
use crate::draw::settings_store;
use eframe::egui::{self, Color32, PointerButton, Pos2, Rect, Sense, TextureOptions};
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use std::path::{Path, PathBuf};

/// Runs one toolbar or keyboard command against the session. Returns the
/// notification to show, if any.
pub fn apply_command(
    session: &mut DrawSession,
    settings: &DrawSettings,
    command: InputCommand,
) -> Option<Notification> {
    match command {
        InputCommand::Undo => {
            session.undo();
            None
        }
        InputCommand::Redo => {
            session.redo();
            None
        }
        InputCommand::Clear => Some(session.clear()),
        InputCommand::Save => Some(save::save_drawing(session, settings)),
        InputCommand::ToggleGrid => {
            session.toggle_grid();
            None
        }
        InputCommand::ToggleMode => {
            session.toggle_mode();
            None
        }
    }
}

pub fn apply_toolbar_action(
    session: &mut DrawSession,
    settings: &DrawSettings,
    action: ToolbarAction,
) -> Option<Notification> {
    match action {
        ToolbarAction::BrushColor(color) => session.set_brush_color(color),
        ToolbarAction::BrushSize(size) => session.set_brush_size(size),
        ToolbarAction::Mode(mode) => session.set_mode(mode),
        ToolbarAction::Background(color) => session.set_background(color),
        ToolbarAction::Command(command) => return apply_command(session, settings, command),
        ToolbarAction::Import(path) => return Some(save::import_drawing(session, Path::new(&path))),
    }
    None
}

/// Imports the first dropped file. Extra files are skipped with an info note,
/// since the canvas holds one image.
pub fn import_dropped(session: &mut DrawSession, paths: &[PathBuf]) -> Vec<Notification> {
    let Some((first, rest)) = paths.split_first() else {
        return Vec::new();
    };
    let mut notes = vec![save::import_drawing(session, first)];
    if !rest.is_empty() {
        tracing::info!(skipped = rest.len(), "ignoring extra dropped files");
        notes.push(Notification::info(format!(
            "Only {} was imported; {} other file(s) ignored",
            first.display(),
            rest.len()
        )));
    }
    notes
}

fn key_code(key: egui::Key) -> KeyCode {
    match key {
        egui::Key::Z => KeyCode::Z,
        egui::Key::Y => KeyCode::Y,
        egui::Key::S => KeyCode::S,
        egui::Key::G => KeyCode::G,
        egui::Key::E => KeyCode::E,
        egui::Key::Delete => KeyCode::Delete,
        _ => KeyCode::Other,
    }
}

fn touch_phase(phase: egui::TouchPhase) -> PointerPhase {
    match phase {
        egui::TouchPhase::Start => PointerPhase::Down,
        egui::TouchPhase::Move => PointerPhase::Move,
        egui::TouchPhase::End => PointerPhase::Up,
        egui::TouchPhase::Cancel => PointerPhase::Leave,
    }
}

fn toast_kind(kind: NotificationKind) -> ToastKind {
    match kind {
        NotificationKind::Success => ToastKind::Success,
        NotificationKind::Error => ToastKind::Error,
        NotificationKind::Info => ToastKind::Info,
    }
}

pub struct PadApp {
    settings: DrawSettings,
    session: DrawSession,
    pointer: PointerAdapter,
    toolbar: Toolbar,
    toasts: Toasts,
    texture: Option<egui::TextureHandle>,
    uploaded: Option<(u64, bool)>,
    last_canvas_area: Option<(u32, u32)>,
}

impl PadApp {
    pub fn new(settings: DrawSettings, session: DrawSession) -> Self {
        Self {
            settings,
            session,
            pointer: PointerAdapter::new(),
            toolbar: Toolbar::default(),
            toasts: Toasts::new().anchor(egui::Align2::RIGHT_TOP, [10.0, 10.0]),
            texture: None,
            uploaded: None,
            last_canvas_area: None,
        }
    }

    fn notify(&mut self, notification: Notification) {
        self.toasts.add(Toast {
            text: notification.message.into(),
            kind: toast_kind(notification.kind),
            options: ToastOptions::default()
                .duration_in_seconds(self.settings.notification_seconds as f64),
        });
    }

    fn run(&mut self, command: InputCommand) {
        if let Some(note) = apply_command(&mut self.session, &self.settings, command) {
            self.notify(note);
        }
        if !self.session.is_stroking() {
            self.pointer.release();
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let keys: Vec<KeyEvent> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } => Some(KeyEvent {
                        key: key_code(*key),
                        modifiers: KeyModifiers {
                            ctrl: modifiers.command,
                            shift: modifiers.shift,
                        },
                    }),
                    _ => None,
                })
                .collect()
        });
        for command in keys.into_iter().filter_map(map_key_event) {
            self.run(command);
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });
        if dropped.is_empty() {
            return;
        }
        for note in import_dropped(&mut self.session, &dropped) {
            self.notify(note);
        }
        self.pointer.release();
    }

    /// Follows the central area so a window resize keeps the top-left drawing.
    fn fit_canvas(&mut self, available: egui::Vec2) {
        let area = (available.x.max(1.0) as u32, available.y.max(1.0) as u32);
        let Some(previous) = self.last_canvas_area.replace(area) else {
            return;
        };
        if previous == area {
            return;
        }
        if let Err(err) = self.session.resize(area.0, area.1) {
            tracing::warn!(%err, "canvas resize rejected");
        }
        self.pointer.release();
    }

    fn upload_frame(&mut self, ctx: &egui::Context) -> egui::TextureId {
        let key = (self.session.revision(), self.session.tool().show_grid);
        let (width, height) = self.session.surface().size();
        let stale = self.uploaded != Some(key) || self.texture.is_none();

        if stale {
            let size = [width as usize, height as usize];
            let image = egui::ColorImage::from_rgba_unmultiplied(size, &self.session.display_frame());
            match self.texture.as_mut() {
                Some(texture) => texture.set(image, TextureOptions::NEAREST),
                None => {
                    self.texture = Some(ctx.load_texture("canvas", image, TextureOptions::NEAREST))
                }
            }
            self.uploaded = Some(key);
        }
        match self.texture.as_ref() {
            Some(texture) => texture.id(),
            None => egui::TextureId::default(),
        }
    }

    fn canvas_ui(&mut self, ui: &mut egui::Ui) {
        self.fit_canvas(ui.available_size());
        let (width, height) = self.session.surface().size();

        let desired = egui::vec2(width as f32, height as f32);
        let (response, painter) = ui.allocate_painter(desired, Sense::click_and_drag());
        let bounds = response.rect;
        let rect = CanvasRect {
            left: bounds.min.x,
            top: bounds.min.y,
            width: bounds.width(),
            height: bounds.height(),
        };

        let touches: Vec<PointerEvent> = ui.ctx().input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Touch { id, phase, pos, .. } => {
                        let phase = touch_phase(*phase);
                        if phase == PointerPhase::Down && !bounds.contains(*pos) {
                            return None;
                        }
                        Some(PointerEvent::touch(id.0, phase, (pos.x, pos.y)))
                    }
                    _ => None,
                })
                .collect()
        });

        if touches.is_empty() {
            self.mouse_events(&response, bounds, rect);
        } else {
            for event in touches {
                self.pointer.handle(event, rect, &mut self.session);
            }
        }

        let texture = self.upload_frame(ui.ctx());
        painter.image(
            texture,
            bounds,
            Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0)),
            Color32::WHITE,
        );
    }

    fn mouse_events(&mut self, response: &egui::Response, bounds: Rect, rect: CanvasRect) {
        let pos = response.interact_pointer_pos();
        let at = |p: Pos2| (p.x, p.y);

        if response.drag_started_by(PointerButton::Primary) {
            if let Some(p) = pos {
                self.pointer
                    .handle(PointerEvent::mouse(PointerPhase::Down, at(p)), rect, &mut self.session);
            }
        }
        if response.dragged_by(PointerButton::Primary) && self.pointer.is_tracking() {
            if let Some(p) = pos {
                let phase = if bounds.contains(p) {
                    PointerPhase::Move
                } else {
                    PointerPhase::Leave
                };
                self.pointer
                    .handle(PointerEvent::mouse(phase, at(p)), rect, &mut self.session);
            }
        }
        if response.drag_stopped_by(PointerButton::Primary) && self.pointer.is_tracking() {
            let p = pos.map(at).unwrap_or((rect.left, rect.top));
            self.pointer
                .handle(PointerEvent::mouse(PointerPhase::Up, p), rect, &mut self.session);
        }
        if response.clicked_by(PointerButton::Primary) {
            if let Some(p) = pos {
                self.pointer
                    .handle(PointerEvent::mouse(PointerPhase::Down, at(p)), rect, &mut self.session);
                self.pointer
                    .handle(PointerEvent::mouse(PointerPhase::Up, at(p)), rect, &mut self.session);
            }
        }
    }
}

impl eframe::App for PadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keys(ctx);
        self.handle_dropped_files(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            let actions = self.toolbar.ui(ui, &self.session);
            for action in actions {
                if let Some(note) = apply_toolbar_action(&mut self.session, &self.settings, action)
                {
                    self.notify(note);
                }
            }
            if !self.session.is_stroking() {
                self.pointer.release();
            }
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| self.canvas_ui(ui));

        self.toasts.show(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.settings.remember_tool_state(self.session.tool());
        match settings_store::save(&self.settings) {
            Ok(path) => tracing::debug!(path = %path.display(), "draw settings saved"),
            Err(err) => tracing::warn!(error = %format!("{err:#}"), "failed to save draw settings"),
        }
    }
}
