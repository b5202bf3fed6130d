use crate::draw::model::Point;
use crate::draw::render::DirtyRect;
use crate::draw::session::DrawSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// The pointer left the canvas or the platform cancelled the touch.
    Leave,
}

/// Mouse and touch input in one shape. `position` is in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub source: PointerSource,
    pub pointer_id: u64,
    pub phase: PointerPhase,
    pub position: (f32, f32),
}

impl PointerEvent {
    pub fn mouse(phase: PointerPhase, position: (f32, f32)) -> Self {
        Self {
            source: PointerSource::Mouse,
            pointer_id: 0,
            phase,
            position,
        }
    }

    pub fn touch(pointer_id: u64, phase: PointerPhase, position: (f32, f32)) -> Self {
        Self {
            source: PointerSource::Touch,
            pointer_id,
            phase,
            position,
        }
    }
}

/// Where the canvas is shown, in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl CanvasRect {
    /// Maps a view position onto surface pixels. The result may lie outside
    /// the surface; rasterization clips it.
    pub fn to_local(self, position: (f32, f32), surface_size: (u32, u32)) -> Point {
        let scale_x = if self.width > 0.0 {
            surface_size.0 as f32 / self.width
        } else {
            1.0
        };
        let scale_y = if self.height > 0.0 {
            surface_size.1 as f32 / self.height
        } else {
            1.0
        };
        (
            ((position.0 - self.left) * scale_x).floor() as i32,
            ((position.1 - self.top) * scale_y).floor() as i32,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    Ignored,
    Started,
    Painted(DirtyRect),
    Committed(u64),
}

/// Routes pointer events into a [`DrawSession`], letting one pointer own the
/// stroke from down to up. Other pointers are ignored until it lifts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerAdapter {
    owner: Option<(PointerSource, u64)>,
}

impl PointerAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracking(&self) -> bool {
        self.owner.is_some()
    }

    pub fn handle(
        &mut self,
        event: PointerEvent,
        rect: CanvasRect,
        session: &mut DrawSession,
    ) -> PointerOutcome {
        let key = (event.source, event.pointer_id);
        let point = rect.to_local(event.position, session.surface().size());

        match event.phase {
            PointerPhase::Down => {
                if self.owner.is_some() {
                    return PointerOutcome::Ignored;
                }
                if !session.begin_stroke(point) {
                    return PointerOutcome::Ignored;
                }
                self.owner = Some(key);
                PointerOutcome::Started
            }
            PointerPhase::Move => {
                if self.owner != Some(key) {
                    return PointerOutcome::Ignored;
                }
                match session.extend_stroke(point) {
                    Some(dirty) => PointerOutcome::Painted(dirty),
                    None => PointerOutcome::Ignored,
                }
            }
            PointerPhase::Up | PointerPhase::Leave => {
                if self.owner != Some(key) {
                    return PointerOutcome::Ignored;
                }
                self.owner = None;
                if event.phase == PointerPhase::Up {
                    session.extend_stroke(point);
                }
                match session.end_stroke() {
                    Some(seq) => PointerOutcome::Committed(seq),
                    None => PointerOutcome::Ignored,
                }
            }
        }
    }

    /// Forgets the owning pointer without touching the session, used after the
    /// session finished the stroke on its own (undo, resize, import).
    pub fn release(&mut self) {
        self.owner = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Z,
    Y,
    S,
    G,
    E,
    Delete,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModifiers {
    pub ctrl: bool,
    pub shift: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    Undo,
    Redo,
    Save,
    ToggleGrid,
    ToggleMode,
    Clear,
}

pub fn map_key_event(event: KeyEvent) -> Option<InputCommand> {
    match (event.key, event.modifiers) {
        (KeyCode::Z, KeyModifiers { ctrl: true, shift: false }) => Some(InputCommand::Undo),
        (KeyCode::Z, KeyModifiers { ctrl: true, shift: true }) => Some(InputCommand::Redo),
        (KeyCode::Y, KeyModifiers { ctrl: true, .. }) => Some(InputCommand::Redo),
        (KeyCode::S, KeyModifiers { ctrl: true, .. }) => Some(InputCommand::Save),
        (KeyCode::G, KeyModifiers { ctrl: false, .. }) => Some(InputCommand::ToggleGrid),
        (KeyCode::E, KeyModifiers { ctrl: false, .. }) => Some(InputCommand::ToggleMode),
        (KeyCode::Delete, _) => Some(InputCommand::Clear),
        _ => None,
    }
}
