use tiny_skia::{
    FillRule, LineCap, Paint, Path, PathBuilder, Pixmap, PixmapPaint, PremultipliedColorU8, Stroke, Transform,
};

use crate::video::types::Frame;

/// Control point offset for a quarter circle drawn as one cubic
const KAPPA: f32 = 0.552_284_8;

/// Axis-aligned rectangle in canvas pixels, `[x0, x1) x [y0, y1)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Rectangle of size `w x h` centred on `(cx, cy)`
    pub fn centered(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self::new(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    fn inset(&self, d: f32) -> Self {
        Self::new(self.x0 + d, self.y0 + d, self.x1 - d, self.y1 - d)
    }

    fn to_skia(self) -> Option<tiny_skia::Rect> {
        tiny_skia::Rect::from_ltrb(self.x0, self.y0, self.x1, self.y1)
    }

    /// Outline with quarter-circle corners, radius clamped to half the short side
    fn rounded_path(&self, radius: f32) -> Option<Path> {
        if self.width() <= 0.0 || self.height() <= 0.0 {
            return None;
        }
        let r = radius.min(self.width() / 2.0).min(self.height() / 2.0).max(0.0);
        if r == 0.0 {
            return self.to_skia().map(PathBuilder::from_rect);
        }

        let Rect { x0, y0, x1, y1 } = *self;
        let k = r * (1.0 - KAPPA);
        let mut pb = PathBuilder::new();
        pb.move_to(x0 + r, y0);
        pb.line_to(x1 - r, y0);
        pb.cubic_to(x1 - k, y0, x1, y0 + k, x1, y0 + r);
        pb.line_to(x1, y1 - r);
        pb.cubic_to(x1, y1 - k, x1 - k, y1, x1 - r, y1);
        pb.line_to(x0 + r, y1);
        pb.cubic_to(x0 + k, y1, x0, y1 - k, x0, y1 - r);
        pb.line_to(x0, y0 + r);
        pb.cubic_to(x0, y0 + k, x0 + k, y0, x0 + r, y0);
        pb.close();
        pb.finish()
    }
}

fn solid(color: [u8; 4], anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
    paint.anti_alias = anti_alias;
    paint
}

fn mul_div255(a: u8, b: u8) -> u8 {
    ((a as u32 * b as u32 + 127) / 255) as u8
}

/// Transparent RGBA layer the overlays draw on before compositing
///
/// Shapes are rasterised by tiny-skia with source-over blending, so
/// overlapping semi-transparent shapes accumulate like stacked acetate.
#[derive(Clone)]
pub struct OverlayCanvas {
    pixmap: Pixmap,
}

impl OverlayCanvas {
    /// `None` when the size is zero or too large to allocate
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Pixmap::new(width, height).map(|pixmap| Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight-alpha RGBA at `(x, y)`; transparent outside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixmap
            .pixel(x, y)
            .map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .unwrap_or([0; 4])
    }

    /// True when nothing has been drawn
    pub fn is_blank(&self) -> bool {
        self.pixmap.pixels().iter().all(|p| p.alpha() == 0)
    }

    /// Hard-edged rectangle fill, snapped to whole pixels
    pub fn fill_rect(&mut self, rect: Rect, color: [u8; 4]) {
        let snapped = Rect::new(rect.x0.round(), rect.y0.round(), rect.x1.round(), rect.y1.round());
        if snapped.width() <= 0.0 || snapped.height() <= 0.0 {
            return;
        }
        if let Some(r) = snapped.to_skia() {
            self.pixmap.fill_rect(r, &solid(color, false), Transform::identity(), None);
        }
    }

    pub fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: [u8; 4]) {
        if let Some(path) = rect.rounded_path(radius) {
            self.fill(&path, color);
        }
    }

    /// Inner outline of a rounded rectangle, `width` pixels thick
    pub fn stroke_rounded_rect(&mut self, rect: Rect, radius: f32, width: f32, color: [u8; 4]) {
        let half = width / 2.0;
        if let Some(path) = rect.inset(half).rounded_path(radius - half) {
            let stroke = Stroke { width, ..Stroke::default() };
            self.pixmap
                .stroke_path(&path, &solid(color, true), &stroke, Transform::identity(), None);
        }
    }

    /// Ellipse inscribed in `rect`
    pub fn fill_ellipse(&mut self, rect: Rect, color: [u8; 4]) {
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return;
        }
        if let Some(path) = rect.to_skia().and_then(PathBuilder::from_oval) {
            self.fill(&path, color);
        }
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: [u8; 4]) {
        if let Some(path) = PathBuilder::from_circle(cx, cy, radius) {
            self.fill(&path, color);
        }
    }

    /// Straight line of the given thickness with square caps
    pub fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: [u8; 4]) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.0, from.1);
        pb.line_to(to.0, to.1);
        let Some(path) = pb.finish() else {
            return;
        };

        let stroke = Stroke {
            width,
            line_cap: LineCap::Square,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &solid(color, true), &stroke, Transform::identity(), None);
    }

    /// Draw a coverage mask (e.g. rasterised text) in `color` with its top-left at `(x, y)`
    pub fn draw_mask(&mut self, x: i32, y: i32, width: usize, mask: &[u8], color: [u8; 4]) {
        if width == 0 || mask.len() < width {
            return;
        }
        let height = mask.len() / width;
        let Some(mut stamp) = Pixmap::new(width as u32, height as u32) else {
            return;
        };

        for (px, &m) in stamp.pixels_mut().iter_mut().zip(mask) {
            let a = mul_div255(color[3], m);
            if a == 0 {
                continue;
            }
            let premul = |c: u8| mul_div255(c, a);
            if let Some(p) = PremultipliedColorU8::from_rgba(premul(color[0]), premul(color[1]), premul(color[2]), a) {
                *px = p;
            }
        }

        self.pixmap
            .draw_pixmap(x, y, stamp.as_ref(), &PixmapPaint::default(), Transform::identity(), None);
    }

    fn fill(&mut self, path: &Path, color: [u8; 4]) {
        self.pixmap
            .fill_path(path, &solid(color, true), FillRule::Winding, Transform::identity(), None);
    }

    /// Alpha-blend onto `frame`: `out = bg * (1 - a) + overlay * a`
    pub fn composite_onto(&self, frame: &mut Frame) {
        debug_assert_eq!((frame.width(), frame.height()), (self.width(), self.height()));

        for (dst, src) in frame.as_raw_mut().chunks_exact_mut(3).zip(self.pixmap.pixels()) {
            let a = src.alpha() as u32;
            if a == 0 {
                continue;
            }
            // Stored premultiplied, so the source term is already `c * a`
            let premul = [src.red(), src.green(), src.blue()];
            for c in 0..3 {
                let v = dst[c] as u32 * (255 - a) + premul[c] as u32 * 255;
                dst[c] = ((v + 127) / 255) as u8;
            }
        }
    }
}
