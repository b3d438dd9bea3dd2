use super::canvas::Canvas;
use crate::sim::{Point, Rgb, Stage};

/// Scale from world units to canvas pixels. Axes scale independently, so
/// circles come out as ellipses on narrow terminals; that matches how the
/// pond is framed anyway.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub sx: f64,
    pub sy: f64,
}

impl Viewport {
    pub fn fit(stage: &Stage, canvas: &Canvas) -> Self {
        Viewport {
            sx: canvas.width as f64 / stage.width,
            sy: canvas.height as f64 / stage.height,
        }
    }

    pub fn to_px(&self, p: Point) -> (f64, f64) {
        (p.x * self.sx, p.y * self.sy)
    }

    /// World position of a pixel's center.
    pub fn to_world(&self, x: i64, y: i64) -> Point {
        Point::new((x as f64 + 0.5) / self.sx, (y as f64 + 0.5) / self.sy)
    }

    /// Half a pixel in world units along the coarser axis.
    fn half_pixel(&self) -> f64 {
        0.5 / self.sx.min(self.sy)
    }
}

/// Primitive drawing in world coordinates.
pub struct Painter<'a> {
    pub canvas: &'a mut Canvas,
    pub view: Viewport,
}

impl<'a> Painter<'a> {
    pub fn new(canvas: &'a mut Canvas, view: Viewport) -> Self {
        Painter { canvas, view }
    }

    pub fn line(&mut self, a: Point, b: Point, rgb: Rgb, alpha: f64) {
        let (x0, y0) = self.view.to_px(a);
        let (x1, y1) = self.view.to_px(b);
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as usize;
        let mut last = None;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let px = (x0 + (x1 - x0) * t).floor() as i64;
            let py = (y0 + (y1 - y0) * t).floor() as i64;
            // Don't blend the same pixel twice.
            if last != Some((px, py)) {
                self.canvas.blend(px, py, rgb, alpha);
                last = Some((px, py));
            }
        }
    }

    pub fn polyline(&mut self, points: &[Point], rgb: Rgb, alpha: f64) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], rgb, alpha);
        }
    }

    /// Filled disc. A disc smaller than a pixel still marks its center pixel.
    pub fn fill_circle(&mut self, center: Point, radius: f64, rgb: Rgb, alpha: f64) {
        let mut drawn = false;
        self.for_pixels_near(center, radius, |canvas, x, y, world| {
            if world.distance(center) <= radius {
                canvas.blend(x, y, rgb, alpha);
                drawn = true;
            }
        });
        if !drawn {
            let (px, py) = self.view.to_px(center);
            self.canvas.blend(px.floor() as i64, py.floor() as i64, rgb, alpha);
        }
    }

    /// Circle outline `width` world units thick, never thinner than a pixel.
    pub fn ring(&mut self, center: Point, radius: f64, width: f64, rgb: Rgb, alpha: f64) {
        let half = (width / 2.0).max(self.view.half_pixel());
        self.for_pixels_near(center, radius + half, |canvas, x, y, world| {
            if (world.distance(center) - radius).abs() <= half {
                canvas.blend(x, y, rgb, alpha);
            }
        });
    }

    /// Filled polygon (even-odd rule).
    pub fn polygon(&mut self, points: &[Point], rgb: Rgb) {
        if points.len() < 3 {
            self.polyline(points, rgb, 1.0);
            return;
        }
        let (min_x, max_x, min_y, max_y) = points.iter().fold(
            (f64::MAX, f64::MIN, f64::MAX, f64::MIN),
            |(a, b, c, d), p| (a.min(p.x), b.max(p.x), c.min(p.y), d.max(p.y)),
        );
        let (px0, py0) = self.view.to_px(Point::new(min_x, min_y));
        let (px1, py1) = self.view.to_px(Point::new(max_x, max_y));
        for y in py0.floor() as i64..=py1.ceil() as i64 {
            for x in px0.floor() as i64..=px1.ceil() as i64 {
                if inside(points, self.view.to_world(x, y)) {
                    self.canvas.set(x, y, rgb);
                }
            }
        }
        // Outline keeps slivers thinner than a pixel visible.
        self.polyline(points, rgb, 1.0);
        self.line(points[points.len() - 1], points[0], rgb, 1.0);
    }

    fn for_pixels_near(&mut self, center: Point, radius: f64, mut f: impl FnMut(&mut Canvas, i64, i64, Point)) {
        let (cx, cy) = self.view.to_px(center);
        let rx = radius * self.view.sx;
        let ry = radius * self.view.sy;
        for y in (cy - ry).floor() as i64..=(cy + ry).ceil() as i64 {
            for x in (cx - rx).floor() as i64..=(cx + rx).ceil() as i64 {
                let world = self.view.to_world(x, y);
                f(&mut *self.canvas, x, y, world);
            }
        }
    }
}

fn inside(points: &[Point], p: Point) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}
