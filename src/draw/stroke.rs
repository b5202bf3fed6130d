use crate::draw::model::{BrushParams, Point, Stroke};
use crate::draw::render::DirtyRect;
use crate::draw::surface::Surface;

/// One pointer-down-to-pointer-up gesture. Segments are rasterized as soon as
/// they are known so the canvas shows the stroke while it is drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrokeSession {
    active: Option<Stroke>,
}

impl StrokeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&Stroke> {
        self.active.as_ref()
    }

    /// Starts a path at `point`. Returns `false` (and changes nothing) when a
    /// stroke is already in progress.
    pub fn begin(&mut self, point: Point, brush: BrushParams) -> bool {
        if self.active.is_some() {
            tracing::warn!(?point, "ignoring stroke start while another stroke is active");
            return false;
        }
        self.active = Some(Stroke {
            brush,
            points: vec![point],
        });
        true
    }

    /// Appends `point` and paints the segment from the previous point.
    pub fn extend(&mut self, point: Point, surface: &mut Surface) -> Option<DirtyRect> {
        let stroke = self.active.as_mut()?;
        let last = stroke.points.last().copied()?;
        if last == point {
            return None;
        }
        stroke.points.push(point);
        surface.paint_segment(last, point, stroke.brush.ink(), stroke.brush.size)
    }

    /// Finishes the stroke. A stroke that never moved leaves a single dab.
    /// Returns the completed stroke, or `None` if no stroke was active.
    pub fn end(&mut self, surface: &mut Surface) -> Option<Stroke> {
        let stroke = self.active.take()?;
        if stroke.points.len() == 1 {
            surface.paint_path(&stroke.points, stroke.brush.ink(), stroke.brush.size);
        }
        Some(stroke)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::{Color, DrawMode};

    fn brush(size: u32) -> BrushParams {
        BrushParams {
            color: Color::BLACK,
            size,
            mode: DrawMode::Draw,
            erase_color: Color::WHITE,
        }
    }

    fn surface() -> Surface {
        Surface::initialize(8, 8, Color::WHITE).expect("surface")
    }

    #[test]
    fn begin_records_point_without_painting() {
        let mut canvas = surface();
        let before = canvas.clone();
        let mut session = StrokeSession::new();
        assert!(session.begin((2, 2), brush(3)));
        assert_eq!(canvas, before);
        assert_eq!(session.active().map(|s| s.points.clone()), Some(vec![(2, 2)]));
        assert_eq!(session.extend((2, 2), &mut canvas), None);
        assert_eq!(canvas, before);
    }

    #[test]
    fn extend_paints_immediately() {
        let mut canvas = surface();
        let mut session = StrokeSession::new();
        session.begin((0, 0), brush(1));
        let dirty = session.extend((3, 0), &mut canvas);
        assert!(dirty.is_some());
        assert_eq!(canvas.pixel(3, 0), Some(Color::BLACK));
        assert!(session.is_active());
    }

    #[test]
    fn extend_and_end_without_begin_are_noops() {
        let mut canvas = surface();
        let before = canvas.clone();
        let mut session = StrokeSession::new();
        assert_eq!(session.extend((1, 1), &mut canvas), None);
        assert_eq!(session.end(&mut canvas), None);
        assert_eq!(canvas, before);
    }

    #[test]
    fn second_begin_is_ignored_while_active() {
        let mut session = StrokeSession::new();
        assert!(session.begin((0, 0), brush(1)));
        assert!(!session.begin((5, 5), brush(9)));
        assert_eq!(session.active().map(|s| s.brush.size), Some(1));
    }

    #[test]
    fn tap_leaves_a_dab() {
        let mut canvas = surface();
        let mut session = StrokeSession::new();
        session.begin((4, 4), brush(3));
        let stroke = session.end(&mut canvas).expect("stroke");
        assert_eq!(stroke.points, vec![(4, 4)]);
        assert_eq!(canvas.pixel(4, 4), Some(Color::BLACK));
        assert_eq!(canvas.pixel(5, 4), Some(Color::BLACK));
        assert!(!session.is_active());
    }

    #[test]
    fn brush_is_captured_at_stroke_start() {
        let mut canvas = surface();
        let mut session = StrokeSession::new();
        session.begin((0, 7), brush(1));
        session.extend((7, 7), &mut canvas);
        let stroke = session.end(&mut canvas).expect("stroke");
        assert_eq!(stroke.brush, brush(1));
        assert_eq!(stroke.points, vec![(0, 7), (7, 7)]);
        assert_eq!(canvas.pixel(0, 6), Some(Color::WHITE));
    }

    #[test]
    fn erase_keeps_the_background_it_started_with() {
        let mut canvas = surface();
        canvas.apply_stroke(&[(0, 3), (7, 3)], Color::BLACK, 1, DrawMode::Draw);

        let mut session = StrokeSession::new();
        session.begin(
            (0, 3),
            BrushParams {
                mode: DrawMode::Erase,
                ..brush(1)
            },
        );
        session.extend((3, 3), &mut canvas);
        canvas.set_background(Color::rgb(0, 0, 255));
        session.extend((7, 3), &mut canvas);
        session.end(&mut canvas);

        for x in 0..8 {
            assert_eq!(canvas.pixel(x, 3), Some(Color::WHITE));
        }
    }
}
