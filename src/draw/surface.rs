use crate::draw::codec::{self, DecodeError, FormatError, Snapshot};
use crate::draw::model::{Color, DrawMode, Point};
use crate::draw::render::{self, DirtyRect};

/// Largest accepted width or height in pixels.
pub const MAX_DIMENSION: u32 = 16_384;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("invalid surface dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Fixed-size RGBA8 pixel grid owned by one drawing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    background: Color,
    pixels: Vec<u8>,
}

impl Surface {
    pub fn initialize(width: u32, height: u32, background: Color) -> Result<Self, SurfaceError> {
        let len = checked_len(width, height)?;
        let mut pixels = vec![0u8; len];
        render::fill_rgba(&mut pixels, background);
        Ok(Self {
            width,
            height,
            background,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Color painted by erase strokes and by [`Surface::clear`].
    pub fn background(&self) -> Color {
        self.background
    }

    /// Changes the erase color without repainting existing pixels.
    pub fn set_background(&mut self, background: Color) {
        self.background = background;
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.pixels[idx..idx + 4];
        Some(Color::rgba(px[0], px[1], px[2], px[3]))
    }

    fn stroke_color(&self, color: Color, mode: DrawMode) -> Color {
        match mode {
            DrawMode::Draw => color,
            DrawMode::Erase => self.background,
        }
    }

    /// Paints `points` as one connected path. Returns the touched area.
    pub fn apply_stroke(
        &mut self,
        points: &[Point],
        color: Color,
        brush_size: u32,
        mode: DrawMode,
    ) -> Option<DirtyRect> {
        let ink = self.stroke_color(color, mode);
        self.paint_path(points, ink, brush_size)
    }

    /// Like [`Surface::apply_stroke`] with the ink already resolved, so erase
    /// strokes can keep the background they started with.
    pub fn paint_path(
        &mut self,
        points: &[Point],
        ink: Color,
        brush_size: u32,
    ) -> Option<DirtyRect> {
        render::draw_polyline(
            points,
            ink,
            brush_size,
            &mut self.pixels,
            self.width,
            self.height,
        )?
        .clamp(self.width, self.height)
    }

    /// Paints the single segment `from -> to`; used for live stroke preview.
    pub fn paint_segment(
        &mut self,
        from: Point,
        to: Point,
        ink: Color,
        brush_size: u32,
    ) -> Option<DirtyRect> {
        render::draw_segment(
            from,
            to,
            ink,
            brush_size,
            &mut self.pixels,
            self.width,
            self.height,
        )
        .clamp(self.width, self.height)
    }

    pub fn clear(&mut self, background: Color) {
        self.background = background;
        render::fill_rgba(&mut self.pixels, background);
    }

    pub fn to_encoded_image(&self) -> Snapshot {
        Snapshot::from_bytes(codec::encode_raw(self.width, self.height, &self.pixels))
    }

    /// Replaces all pixels from a snapshot of a same-sized surface. On error
    /// the surface is left untouched.
    pub fn load_encoded_image(&mut self, data: &Snapshot) -> Result<(), DecodeError> {
        let pixels = codec::decode_raw_sized(data.as_bytes(), self.width, self.height)?;
        self.pixels.copy_from_slice(pixels);
        Ok(())
    }

    pub fn export_png(&self) -> Result<Vec<u8>, image::ImageError> {
        codec::encode_png(self.width, self.height, &self.pixels)
    }

    /// Builds a new surface from a raw encoding produced by
    /// [`Surface::to_encoded_image`], validated against the expected size.
    pub fn import_raw(
        bytes: &[u8],
        expected_width: u32,
        expected_height: u32,
        background: Color,
    ) -> Result<Self, FormatError> {
        let raw = codec::decode_raw(bytes)?;
        Self::from_decoded(
            raw.width,
            raw.height,
            raw.pixels.to_vec(),
            expected_width,
            expected_height,
            background,
        )
    }

    pub fn import_png(
        bytes: &[u8],
        expected_width: u32,
        expected_height: u32,
        background: Color,
    ) -> Result<Self, FormatError> {
        let (width, height, pixels) = codec::decode_png(bytes)?;
        Self::from_decoded(
            width,
            height,
            pixels,
            expected_width,
            expected_height,
            background,
        )
    }

    fn from_decoded(
        width: u32,
        height: u32,
        pixels: Vec<u8>,
        expected_width: u32,
        expected_height: u32,
        background: Color,
    ) -> Result<Self, FormatError> {
        if width != expected_width || height != expected_height {
            return Err(FormatError::DimensionMismatch {
                width: expected_width,
                height: expected_height,
                found_width: width,
                found_height: height,
            });
        }
        Ok(Self {
            width,
            height,
            background,
            pixels,
        })
    }

    /// Returns a new surface of the given size holding the overlapping
    /// top-left region of this one; uncovered area gets the background.
    pub fn resized(&self, width: u32, height: u32) -> Result<Self, SurfaceError> {
        let mut next = Self::initialize(width, height, self.background)?;
        let next_size = next.size();
        render::blit_overlap(&self.pixels, self.size(), &mut next.pixels, next_size);
        Ok(next)
    }

    /// Surface pixels plus view-only overlays, ready to hand to a window.
    pub fn display_frame(&self, grid: Option<(u32, Color)>) -> Vec<u8> {
        let mut frame = self.pixels.clone();
        if let Some((spacing, color)) = grid {
            render::overlay_grid(&mut frame, self.width, self.height, spacing, color);
        }
        frame
    }
}

fn checked_len(width: u32, height: u32) -> Result<usize, SurfaceError> {
    let invalid = SurfaceError::InvalidDimensions { width, height };
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(invalid);
    }
    codec::rgba_len(width, height).ok_or(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(width: u32, height: u32) -> Surface {
        Surface::initialize(width, height, Color::WHITE).expect("surface")
    }

    fn ink_pixels(surface: &Surface) -> Vec<(u32, u32)> {
        let mut out = Vec::new();
        for y in 0..surface.height() {
            for x in 0..surface.width() {
                if surface.pixel(x, y) != Some(surface.background()) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn initialize_fills_background_and_rejects_empty_sizes() {
        let surface = white(3, 2);
        assert!(surface
            .pixels()
            .chunks_exact(4)
            .all(|px| px == [255, 255, 255, 255]));

        assert_eq!(
            Surface::initialize(0, 4, Color::WHITE).unwrap_err(),
            SurfaceError::InvalidDimensions {
                width: 0,
                height: 4
            }
        );
        assert!(Surface::initialize(4, MAX_DIMENSION + 1, Color::WHITE).is_err());
    }

    #[test]
    fn l_shaped_stroke_is_continuous() {
        let mut surface = white(12, 12);
        surface.apply_stroke(&[(0, 0), (10, 0), (10, 10)], Color::BLACK, 1, DrawMode::Draw);

        let ink = ink_pixels(&surface);
        let mut expected: Vec<(u32, u32)> = (0..=10).map(|x| (x, 0)).collect();
        expected.extend((1..=10).map(|y| (10, y)));
        expected.sort_by_key(|&(x, y)| (y, x));
        assert_eq!(ink, expected);
    }

    #[test]
    fn erase_paints_background_color() {
        let mut surface = white(8, 8);
        surface.apply_stroke(&[(0, 4), (7, 4)], Color::BLACK, 3, DrawMode::Draw);
        surface.apply_stroke(&[(0, 4), (7, 4)], Color::BLACK, 3, DrawMode::Erase);
        assert!(ink_pixels(&surface).is_empty());
    }

    #[test]
    fn erase_after_background_change_uses_new_background() {
        let mut surface = white(6, 6);
        surface.apply_stroke(&[(0, 2), (5, 2)], Color::BLACK, 1, DrawMode::Draw);

        let blue = Color::rgb(0, 0, 255);
        surface.set_background(blue);
        surface.apply_stroke(&[(0, 2), (5, 2)], Color::BLACK, 1, DrawMode::Erase);

        // Erasing yields the new background, even though white was under the ink.
        assert_eq!(surface.pixel(3, 2), Some(blue));
        assert_eq!(surface.pixel(3, 3), Some(Color::WHITE));
    }

    #[test]
    fn stroke_from_saturated_coordinates_stays_on_canvas() {
        let mut surface = white(8, 8);
        let dirty = surface
            .apply_stroke(&[(-1, 0), (i32::MAX, 0)], Color::BLACK, 1, DrawMode::Draw)
            .expect("dirty");
        assert_eq!((dirty.x, dirty.width), (0, 8));
        assert_eq!(ink_pixels(&surface).len(), 8);

        let mut surface = white(8, 8);
        let below = [(i32::MIN, 20), (i32::MAX, 20)];
        assert_eq!(
            surface.apply_stroke(&below, Color::BLACK, 4, DrawMode::Draw),
            None
        );
        assert!(ink_pixels(&surface).is_empty());
    }

    #[test]
    fn empty_stroke_leaves_surface_untouched() {
        let mut surface = white(4, 4);
        let before = surface.clone();
        assert_eq!(
            surface.apply_stroke(&[], Color::BLACK, 5, DrawMode::Draw),
            None
        );
        assert_eq!(surface, before);
    }

    #[test]
    fn encoded_image_roundtrip_is_pixel_identical() {
        let mut surface = white(16, 9);
        surface.apply_stroke(&[(1, 1), (14, 7), (3, 8)], Color::rgb(9, 80, 200), 4, DrawMode::Draw);
        let snapshot = surface.to_encoded_image();
        let drawn = surface.clone();

        surface.clear(Color::WHITE);
        surface.load_encoded_image(&snapshot).expect("load snapshot");
        assert_eq!(surface, drawn);
        assert_eq!(surface.to_encoded_image(), snapshot);
    }

    #[test]
    fn load_encoded_image_from_other_size_fails_atomically() {
        let mut surface = white(4, 4);
        surface.apply_stroke(&[(0, 0), (3, 3)], Color::BLACK, 1, DrawMode::Draw);
        let before = surface.clone();

        let other = white(5, 4).to_encoded_image();
        let err = surface.load_encoded_image(&other).unwrap_err();
        assert!(matches!(err, DecodeError::DimensionMismatch { .. }));
        assert_eq!(surface, before);

        let garbage = Snapshot::from_bytes(vec![1, 2, 3]);
        assert!(surface.load_encoded_image(&garbage).is_err());
        assert_eq!(surface, before);
    }

    #[test]
    fn import_raw_validates_dimensions() {
        let source = white(4, 4);
        let bytes = source.to_encoded_image();

        let imported =
            Surface::import_raw(bytes.as_bytes(), 4, 4, Color::WHITE).expect("import raw");
        assert_eq!(imported, source);

        let err = Surface::import_raw(bytes.as_bytes(), 8, 8, Color::WHITE).unwrap_err();
        assert!(matches!(
            err,
            FormatError::DimensionMismatch {
                found_width: 4,
                found_height: 4,
                ..
            }
        ));
        assert!(matches!(
            Surface::import_raw(b"junk", 4, 4, Color::WHITE).unwrap_err(),
            FormatError::Raw(_)
        ));
    }

    #[test]
    fn exported_png_imports_back_to_same_pixels() {
        let mut surface = white(10, 6);
        surface.apply_stroke(&[(2, 2), (8, 3)], Color::rgb(250, 10, 10), 3, DrawMode::Draw);
        let png = surface.export_png().expect("png");
        let imported = Surface::import_png(&png, 10, 6, Color::WHITE).expect("import png");
        assert_eq!(imported.pixels(), surface.pixels());
    }

    #[test]
    fn resized_keeps_top_left_content() {
        let mut surface = white(4, 4);
        surface.apply_stroke(&[(0, 0), (3, 0)], Color::BLACK, 1, DrawMode::Draw);
        let grown = surface.resized(6, 2).expect("resize");
        assert_eq!(grown.size(), (6, 2));
        assert_eq!(grown.pixel(3, 0), Some(Color::BLACK));
        assert_eq!(grown.pixel(4, 0), Some(Color::WHITE));
        assert_eq!(grown.pixel(0, 1), Some(Color::WHITE));

        let shrunk = grown.resized(2, 1).expect("shrink");
        assert_eq!(shrunk.pixels(), &[0, 0, 0, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn display_frame_overlays_grid_without_touching_surface() {
        let surface = white(12, 12);
        let frame = surface.display_frame(Some((5, Color::GRID)));
        let idx = (12 + 5) * 4;
        assert_eq!(&frame[idx..idx + 4], &Color::GRID.to_rgba_array());
        assert_eq!(surface.pixel(5, 1), Some(Color::WHITE));
    }
}
