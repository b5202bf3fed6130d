use drawing_pad::draw::{settings_store, DrawSession, DrawSettings};
use drawing_pad::gui::PadApp;
use drawing_pad::logging;

use anyhow::Context;
use eframe::egui;

const TOOLBAR_ALLOWANCE: f32 = 48.0;

fn main() -> anyhow::Result<()> {
    let (settings, load_error) = match settings_store::load() {
        Ok(settings) => (settings, None),
        Err(err) => (DrawSettings::default(), Some(err)),
    };
    logging::init(settings.debug_logging, settings.log_file.clone());
    if let Some(err) = load_error {
        tracing::warn!(error = %format!("{err:#}"), "using default draw settings");
    }

    let session = DrawSession::from_settings(&settings).context("create drawing surface")?;
    tracing::info!(
        width = settings.canvas_width,
        height = settings.canvas_height,
        "starting drawing pad"
    );

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([
                settings.canvas_width as f32,
                settings.canvas_height as f32 + TOOLBAR_ALLOWANCE,
            ])
            .with_min_inner_size([320.0, 240.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Drawing Pad",
        native_options,
        Box::new(move |_cc| Box::new(PadApp::new(settings, session))),
    )
    .map_err(|err| anyhow::anyhow!("run drawing pad window: {err}"))
}
