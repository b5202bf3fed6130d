use crate::draw::input::InputCommand;
use crate::draw::model::{Color, DrawMode, BRUSH_SIZE_PRESETS};
use crate::draw::session::DrawSession;
use eframe::egui::{self, Color32};

/// What the user asked for in one frame of the toolbar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarAction {
    BrushColor(Color),
    BrushSize(u32),
    Mode(DrawMode),
    Background(Color),
    Command(InputCommand),
    Import(String),
}

pub fn to_color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

pub fn from_color32(color: Color32) -> Color {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    Color::rgba(r, g, b, a)
}

#[derive(Debug, Default)]
pub struct Toolbar {
    import_path: String,
}

impl Toolbar {
    pub fn ui(&mut self, ui: &mut egui::Ui, session: &DrawSession) -> Vec<ToolbarAction> {
        let mut actions = Vec::new();
        let tool = *session.tool();

        ui.horizontal_wrapped(|ui| {
            ui.label("Color");
            let mut brush = to_color32(tool.brush_color);
            if ui.color_edit_button_srgba(&mut brush).changed() {
                actions.push(ToolbarAction::BrushColor(from_color32(brush)));
            }

            ui.separator();
            ui.label("Size");
            for size in BRUSH_SIZE_PRESETS {
                if ui
                    .selectable_label(tool.brush_size == size, size.to_string())
                    .clicked()
                {
                    actions.push(ToolbarAction::BrushSize(size));
                }
            }

            ui.separator();
            for mode in [DrawMode::Draw, DrawMode::Erase] {
                if ui.selectable_label(tool.mode == mode, mode.label()).clicked() {
                    actions.push(ToolbarAction::Mode(mode));
                }
            }

            ui.separator();
            ui.label("Background");
            let mut background = to_color32(tool.background);
            if ui.color_edit_button_srgba(&mut background).changed() {
                actions.push(ToolbarAction::Background(from_color32(background)));
            }
            if ui.selectable_label(tool.show_grid, "Grid").clicked() {
                actions.push(ToolbarAction::Command(InputCommand::ToggleGrid));
            }

            ui.separator();
            if ui
                .add_enabled(session.can_undo(), egui::Button::new("Undo"))
                .clicked()
            {
                actions.push(ToolbarAction::Command(InputCommand::Undo));
            }
            if ui
                .add_enabled(session.can_redo(), egui::Button::new("Redo"))
                .clicked()
            {
                actions.push(ToolbarAction::Command(InputCommand::Redo));
            }
            if ui.button("Clear").clicked() {
                actions.push(ToolbarAction::Command(InputCommand::Clear));
            }
            if ui.button("Save").clicked() {
                actions.push(ToolbarAction::Command(InputCommand::Save));
            }

            ui.separator();
            ui.add(
                egui::TextEdit::singleline(&mut self.import_path)
                    .hint_text("image path")
                    .desired_width(160.0),
            );
            if ui
                .add_enabled(!self.import_path.trim().is_empty(), egui::Button::new("Import"))
                .clicked()
            {
                actions.push(ToolbarAction::Import(self.import_path.trim().to_owned()));
            }
        });

        actions
    }
}
