//! Software rasterization into tightly packed RGBA8 buffers.
//!
//! Strokes stamp round dabs along each segment, so caps and joins are round.
//! Segments at least [`WIDE_STROKE_THRESHOLD`] wide are filled as capsules
//! over their bounding box instead.

use crate::draw::model::{Color, Point};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

/// Stroke width from which segments are rasterized as capsules.
pub const WIDE_STROKE_THRESHOLD: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DirtyRect {
    pub fn from_points(a: Point, b: Point, pad: i32) -> Self {
        let pad = i64::from(pad);
        let min_x = i64::from(a.0.min(b.0)) - pad;
        let max_x = i64::from(a.0.max(b.0)) + pad;
        let min_y = i64::from(a.1.min(b.1)) - pad;
        let max_y = i64::from(a.1.max(b.1)) + pad;
        Self::from_span(min_x, min_y, max_x + 1, max_y + 1)
    }

    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width: width as i32,
            height: height as i32,
        }
    }

    /// Builds a rect from half-open `[min, max)` bounds, saturating each edge.
    fn from_span(min_x: i64, min_y: i64, max_x: i64, max_y: i64) -> Self {
        let x = saturate(min_x);
        let y = saturate(min_y);
        Self {
            x,
            y,
            width: (saturate(max_x) - x).max(1),
            height: (saturate(max_y) - y).max(1),
        }
    }

    fn right(self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    fn bottom(self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    pub fn union(self, other: DirtyRect) -> DirtyRect {
        Self::from_span(
            i64::from(self.x.min(other.x)),
            i64::from(self.y.min(other.y)),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    pub fn clamp(self, width: u32, height: u32) -> Option<DirtyRect> {
        let max_w = i64::from(width);
        let max_h = i64::from(height);
        let x0 = i64::from(self.x).clamp(0, max_w);
        let y0 = i64::from(self.y).clamp(0, max_h);
        let x1 = self.right().clamp(0, max_w);
        let y1 = self.bottom().clamp(0, max_h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(DirtyRect {
            x: x0 as i32,
            y: y0 as i32,
            width: (x1 - x0) as i32,
            height: (y1 - y0) as i32,
        })
    }
}

/// Rect edges stay within this distance of the origin so that `x + width`
/// always fits an `i32`. Surfaces are far smaller.
const COORD_LIMIT: i64 = (i32::MAX / 2) as i64;

fn saturate(value: i64) -> i32 {
    value.clamp(-COORD_LIMIT, COORD_LIMIT) as i32
}

/// Pixels a dab of `stroke_width` reaches from its center point.
fn brush_reach(stroke_width: u32) -> i32 {
    (stroke_width / 2) as i32
}

/// Odd widths center the dab on a pixel; even widths center it on the corner
/// shared with the pixels above and to the left. Coverage is tested in doubled
/// coordinates, so the offset is 1 for even widths and 0 for odd ones.
fn center_bias(stroke_width: u32) -> i64 {
    i64::from(stroke_width % 2 == 0)
}

pub fn segment_dirty_bounds(start: Point, end: Point, stroke_width: u32) -> DirtyRect {
    DirtyRect::from_points(start, end, brush_reach(stroke_width) + 1)
}

pub fn fill_rgba(pixels: &mut [u8], color: Color) {
    let rgba = color.to_rgba_array();
    for px in pixels.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

/// Draws `points` as connected segments. A lone point becomes a single dab.
/// Returns the (unclamped) area touched, or `None` for an empty path.
pub fn draw_polyline(
    points: &[Point],
    color: Color,
    stroke_width: u32,
    pixels: &mut [u8],
    width: u32,
    height: u32,
) -> Option<DirtyRect> {
    let first = *points.first()?;
    let stroke_width = stroke_width.max(1);
    if points.len() == 1 {
        let mask = get_brush_mask(stroke_width);
        stamp(&mask, to_wide(first), color.to_rgba_array(), pixels, width, height);
        return Some(segment_dirty_bounds(first, first, stroke_width));
    }

    let mut dirty: Option<DirtyRect> = None;
    for segment in points.windows(2) {
        let rect = draw_segment(segment[0], segment[1], color, stroke_width, pixels, width, height);
        dirty = Some(dirty.map_or(rect, |d| d.union(rect)));
    }
    dirty
}

pub fn draw_segment(
    start: Point,
    end: Point,
    color: Color,
    stroke_width: u32,
    pixels: &mut [u8],
    width: u32,
    height: u32,
) -> DirtyRect {
    let stroke_width = stroke_width.max(1);
    match select_segment_render_path(start, end, stroke_width) {
        SegmentRenderPath::DenseStamp => {
            draw_segment_dense_stamped(start, end, color, stroke_width, pixels, width, height)
        }
        SegmentRenderPath::CapsuleRaster => {
            draw_segment_capsule(start, end, color, stroke_width, pixels, width, height)
        }
    }
    segment_dirty_bounds(start, end, stroke_width)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentRenderPath {
    DenseStamp,
    CapsuleRaster,
}

fn select_segment_render_path(start: Point, end: Point, stroke_width: u32) -> SegmentRenderPath {
    if stroke_width < WIDE_STROKE_THRESHOLD {
        return SegmentRenderPath::DenseStamp;
    }

    let dx = i64::from(end.0) - i64::from(start.0);
    let dy = i64::from(end.1) - i64::from(start.1);
    if dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy)) <= 2 {
        SegmentRenderPath::DenseStamp
    } else {
        SegmentRenderPath::CapsuleRaster
    }
}

fn to_wide(point: Point) -> (i64, i64) {
    (i64::from(point.0), i64::from(point.1))
}

/// Clips `start -> end` to the inclusive box `min..=max` (Liang-Barsky).
/// Returns `None` when the segment misses the box.
fn clip_segment(
    start: (i64, i64),
    end: (i64, i64),
    min: (i64, i64),
    max: (i64, i64),
) -> Option<((i64, i64), (i64, i64))> {
    let inside = |p: (i64, i64)| p.0 >= min.0 && p.0 <= max.0 && p.1 >= min.1 && p.1 <= max.1;
    if inside(start) && inside(end) {
        return Some((start, end));
    }

    let (x0, y0) = (start.0 as f64, start.1 as f64);
    let dx = end.0 as f64 - x0;
    let dy = end.1 as f64 - y0;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    let edges = [
        (-dx, x0 - min.0 as f64),
        (dx, max.0 as f64 - x0),
        (-dy, y0 - min.1 as f64),
        (dy, max.1 as f64 - y0),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| ((x0 + dx * t).round() as i64, (y0 + dy * t).round() as i64);
    Some((at(t0), at(t1)))
}

/// Bresenham walk stamping a dab on every visited pixel, clipped to the
/// surface grown by the brush reach.
fn draw_segment_dense_stamped(
    start: Point,
    end: Point,
    color: Color,
    stroke_width: u32,
    pixels: &mut [u8],
    width: u32,
    height: u32,
) {
    let reach = i64::from(brush_reach(stroke_width)) + 1;
    let Some(((mut x0, mut y0), (x1, y1))) = clip_segment(
        to_wide(start),
        to_wide(end),
        (-reach, -reach),
        (i64::from(width) - 1 + reach, i64::from(height) - 1 + reach),
    ) else {
        return;
    };

    let mask = get_brush_mask(stroke_width);
    let rgba = color.to_rgba_array();
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        stamp(&mask, (x0, y0), rgba, pixels, width, height);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Fills every pixel whose center lies within `stroke_width / 2` of the
/// segment, visiting only the clamped bounding box.
fn draw_segment_capsule(
    start: Point,
    end: Point,
    color: Color,
    stroke_width: u32,
    pixels: &mut [u8],
    width: u32,
    height: u32,
) {
    let Some(clip) = segment_dirty_bounds(start, end, stroke_width).clamp(width, height) else {
        return;
    };

    let bias = center_bias(stroke_width) as f64;
    let limit = f64::from(stroke_width) * f64::from(stroke_width);
    let a = (2.0 * f64::from(start.0), 2.0 * f64::from(start.1));
    let b = (2.0 * f64::from(end.0), 2.0 * f64::from(end.1));
    for y in clip.y..(clip.y + clip.height) {
        for x in clip.x..(clip.x + clip.width) {
            let sample = (2.0 * f64::from(x) + bias, 2.0 * f64::from(y) + bias);
            if point_segment_distance_sq(sample, a, b) <= limit {
                set_pixel_rgba(pixels, width, height, x, y, color);
            }
        }
    }
}

fn point_segment_distance_sq(point: (f64, f64), start: (f64, f64), end: (f64, f64)) -> f64 {
    let (px, py) = point;
    let (x0, y0) = start;
    let vx = end.0 - x0;
    let vy = end.1 - y0;
    let wx = px - x0;
    let wy = py - y0;
    let len_sq = vx * vx + vy * vy;
    if len_sq <= f64::EPSILON {
        return wx * wx + wy * wy;
    }
    let t = ((wx * vx + wy * vy) / len_sq).clamp(0.0, 1.0);
    let dx = px - (x0 + vx * t);
    let dy = py - (y0 + vy * t);
    dx * dx + dy * dy
}

#[derive(Clone)]
struct BrushMask {
    rows: Vec<BrushMaskRow>,
}

#[derive(Clone, Copy)]
struct BrushMaskRow {
    dy: i64,
    min_dx: i64,
    max_dx: i64,
}

fn brush_mask_cache() -> &'static Mutex<HashMap<u32, BrushMask>> {
    static CACHE: OnceLock<Mutex<HashMap<u32, BrushMask>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Disc of diameter `stroke_width`: a pixel at offset `(dx, dy)` is covered
/// when its center lies within `stroke_width / 2` of the dab center.
fn get_brush_mask(stroke_width: u32) -> BrushMask {
    let cache = brush_mask_cache();
    if let Ok(guard) = cache.lock() {
        if let Some(mask) = guard.get(&stroke_width) {
            return mask.clone();
        }
    }

    let reach = i64::from(brush_reach(stroke_width));
    let bias = center_bias(stroke_width);
    let limit = i64::from(stroke_width) * i64::from(stroke_width);
    let covered = |dx: i64, dy: i64| {
        let sx = 2 * dx + bias;
        let sy = 2 * dy + bias;
        sx * sx + sy * sy <= limit
    };

    let mut rows = Vec::with_capacity((reach * 2 + 1) as usize);
    for dy in -reach..=reach {
        let mut covered_dx = (-reach..=reach).filter(|&dx| covered(dx, dy));
        if let Some(min_dx) = covered_dx.next() {
            let max_dx = covered_dx.last().unwrap_or(min_dx);
            rows.push(BrushMaskRow { dy, min_dx, max_dx });
        }
    }
    let mask = BrushMask { rows };
    if let Ok(mut guard) = cache.lock() {
        guard.insert(stroke_width, mask.clone());
    }
    mask
}

/// Stamps one dab of `mask` centered on `center`, clipped to the surface.
fn stamp(
    mask: &BrushMask,
    center: (i64, i64),
    rgba: [u8; 4],
    pixels: &mut [u8],
    width: u32,
    height: u32,
) {
    let max_x = i64::from(width) - 1;
    let max_y = i64::from(height) - 1;

    for row in &mask.rows {
        let y = center.1 + row.dy;
        if y < 0 || y > max_y {
            continue;
        }
        let x0 = (center.0 + row.min_dx).max(0);
        let x1 = (center.0 + row.max_dx).min(max_x);
        if x0 > x1 {
            continue;
        }
        let row_base = y as usize * width as usize * 4;
        for x in x0..=x1 {
            let idx = row_base + x as usize * 4;
            pixels[idx..idx + 4].copy_from_slice(&rgba);
        }
    }
}

fn set_pixel_rgba(pixels: &mut [u8], width: u32, height: u32, x: i32, y: i32, color: Color) {
    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
        return;
    }
    let idx = (y as usize * width as usize + x as usize) * 4;
    if idx + 3 >= pixels.len() {
        return;
    }
    pixels[idx..idx + 4].copy_from_slice(&color.to_rgba_array());
}

/// Paints 1px grid lines every `spacing` pixels, skipping the outer edges.
pub fn overlay_grid(pixels: &mut [u8], width: u32, height: u32, spacing: u32, color: Color) {
    if spacing == 0 {
        return;
    }
    let rgba = color.to_rgba_array();
    for y in 0..height {
        let on_row = y > 0 && y % spacing == 0;
        for x in 0..width {
            if on_row || (x > 0 && x % spacing == 0) {
                let idx = (y as usize * width as usize + x as usize) * 4;
                pixels[idx..idx + 4].copy_from_slice(&rgba);
            }
        }
    }
}

/// Copies the overlapping top-left region of `src` into `dst`.
pub fn blit_overlap(src: &[u8], src_size: (u32, u32), dst: &mut [u8], dst_size: (u32, u32)) {
    let copy_w = src_size.0.min(dst_size.0) as usize * 4;
    let rows = src_size.1.min(dst_size.1) as usize;
    let src_stride = src_size.0 as usize * 4;
    let dst_stride = dst_size.0 as usize * 4;
    for row in 0..rows {
        let s = row * src_stride;
        let d = row * dst_stride;
        dst[d..d + copy_w].copy_from_slice(&src[s..s + copy_w]);
    }
}
