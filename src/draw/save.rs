use crate::draw::codec::RAW_MAGIC;
use crate::draw::messages::{Notification, IMAGE_SAVED};
use crate::draw::session::DrawSession;
use crate::draw::settings::DrawSettings;
use anyhow::{anyhow, Context, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

pub const DRAW_EXPORT_SUBDIR: &str = "drawings";

const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

pub fn exe_relative_output_folder_from_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(DRAW_EXPORT_SUBDIR))
}

/// Configured folder, else the user's pictures folder, else next to the executable.
pub fn resolve_output_folder(settings: &DrawSettings) -> Result<PathBuf> {
    if let Some(folder) = settings.export_folder.as_ref() {
        return Ok(folder.clone());
    }
    if let Some(pictures) = dirs_next::picture_dir() {
        return Ok(pictures.join(DRAW_EXPORT_SUBDIR));
    }
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    exe_relative_output_folder_from_path(&exe_path)
}

pub fn ensure_output_folder(folder: &Path) -> Result<()> {
    fs::create_dir_all(folder)
        .with_context(|| format!("create drawing output folder {}", folder.display()))
}

pub fn timestamped_stem(now: chrono::DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

/// `drawing.png` stays as is, or becomes `drawing_20260102_030405.png`.
pub fn build_filename(base: &str, timestamp: Option<chrono::DateTime<Local>>) -> String {
    let base = base.trim();
    let stem = base
        .strip_suffix(".png")
        .or_else(|| base.strip_suffix(".PNG"))
        .unwrap_or(base);
    match timestamp {
        Some(now) => format!("{}_{}.png", stem, timestamped_stem(now)),
        None => format!("{stem}.png"),
    }
}

pub fn export_path(settings: &DrawSettings, now: chrono::DateTime<Local>) -> Result<PathBuf> {
    let folder = resolve_output_folder(settings)?;
    let timestamp = settings.timestamped_exports.then_some(now);
    Ok(folder.join(build_filename(&settings.export_file_name, timestamp)))
}

/// Encodes the surface first, then writes; a failed write never touches the session.
pub fn write_png(session: &DrawSession, path: &Path) -> Result<()> {
    let bytes = session.export_png().context("encode drawing as png")?;
    if let Some(parent) = path.parent() {
        ensure_output_folder(parent)?;
    }
    fs::write(path, bytes).with_context(|| format!("write drawing {}", path.display()))?;
    tracing::info!(path = %path.display(), "drawing saved");
    Ok(())
}

pub fn save_drawing(session: &DrawSession, settings: &DrawSettings) -> Notification {
    let result = export_path(settings, Local::now()).and_then(|path| write_png(session, &path));
    match result {
        Ok(()) => Notification::success(IMAGE_SAVED),
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "failed to save drawing");
            Notification::error(format!("Save failed: {err:#}"))
        }
    }
}

/// Reads `path` and imports it as PNG or raw pixels depending on its header.
pub fn load_image_file(session: &mut DrawSession, path: &Path) -> Result<Notification> {
    let bytes = fs::read(path).with_context(|| format!("read image {}", path.display()))?;
    let imported = if bytes.starts_with(PNG_SIGNATURE) {
        session.import_png(&bytes)
    } else if bytes.starts_with(RAW_MAGIC) {
        session.import_raw(&bytes)
    } else {
        return Err(anyhow!("{} is neither a png nor a raw drawing", path.display()));
    };
    imported.with_context(|| format!("import image {}", path.display()))
}

pub fn import_drawing(session: &mut DrawSession, path: &Path) -> Notification {
    match load_image_file(session, path) {
        Ok(notification) => notification,
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "import rejected");
            Notification::error(format!("Import failed: {err:#}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::messages::NotificationKind;
    use crate::draw::model::ToolState;
    use chrono::TimeZone;

    fn fixed_time() -> chrono::DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 1, 2, 3, 4, 5)
            .single()
            .expect("date time")
    }

    fn pad() -> DrawSession {
        DrawSession::new(8, 8, ToolState::default(), None).expect("session")
    }

    #[test]
    fn exe_relative_output_folder_is_sibling_of_exe() {
        let exe = Path::new("/tmp/myapp/bin/drawing_pad");
        let output = exe_relative_output_folder_from_path(exe).expect("output path");
        assert_eq!(output, Path::new("/tmp/myapp/bin").join(DRAW_EXPORT_SUBDIR));
    }

    #[test]
    fn filename_builder_handles_extension_and_timestamp() {
        assert_eq!(build_filename("drawing.png", None), "drawing.png");
        assert_eq!(build_filename("sketch", None), "sketch.png");
        assert_eq!(
            build_filename("drawing.png", Some(fixed_time())),
            "drawing_20260102_030405.png"
        );
    }

    #[test]
    fn configured_folder_wins() {
        let settings = DrawSettings {
            export_folder: Some(PathBuf::from("/tmp/exports")),
            ..DrawSettings::default()
        };
        let path = export_path(&settings, fixed_time()).expect("path");
        assert_eq!(path, Path::new("/tmp/exports/drawing.png"));
    }

    #[test]
    fn save_writes_decodable_png() {
        let dir = tempfile::tempdir().expect("temp dir");
        let settings = DrawSettings {
            export_folder: Some(dir.path().join("out")),
            ..DrawSettings::default()
        };
        let mut session = pad();
        session.begin_stroke((1, 1));
        session.extend_stroke((6, 6));
        session.end_stroke();

        let note = save_drawing(&session, &settings);
        assert_eq!(note.kind, NotificationKind::Success);
        assert_eq!(note.message, "Image saved!");

        let bytes = std::fs::read(dir.path().join("out/drawing.png")).expect("read png");
        let mut reloaded = pad();
        reloaded.import_png(&bytes).expect("import");
        assert_eq!(reloaded.surface().pixels(), session.surface().pixels());
    }

    #[test]
    fn save_failure_becomes_error_notification() {
        let dir = tempfile::tempdir().expect("temp dir");
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"file").expect("write blocker");
        let settings = DrawSettings {
            export_folder: Some(blocker),
            ..DrawSettings::default()
        };

        let session = pad();
        let history_len = session.history().len();
        let note = save_drawing(&session, &settings);
        assert!(note.is_error());
        assert!(note.message.starts_with("Save failed"));
        assert_eq!(session.history().len(), history_len);
    }

    #[test]
    fn import_detects_png_and_raw() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut source = pad();
        source.begin_stroke((0, 0));
        source.extend_stroke((7, 0));
        source.end_stroke();

        let png_path = dir.path().join("a.png");
        std::fs::write(&png_path, source.export_png().expect("png")).expect("write png");
        let raw_path = dir.path().join("a.raw");
        std::fs::write(&raw_path, source.surface().to_encoded_image().as_bytes())
            .expect("write raw");

        let mut target = pad();
        assert!(!import_drawing(&mut target, &png_path).is_error());
        assert_eq!(target.surface().pixels(), source.surface().pixels());

        let mut target = pad();
        assert!(!import_drawing(&mut target, &raw_path).is_error());
        assert_eq!(target.surface().pixels(), source.surface().pixels());
    }

    #[test]
    fn import_of_unknown_file_is_rejected_without_changes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").expect("write");

        let mut session = pad();
        let before = session.surface().clone();
        let note = import_drawing(&mut session, &path);
        assert!(note.is_error());
        assert_eq!(session.surface(), &before);
        assert_eq!(session.history().len(), 1);
    }
}
