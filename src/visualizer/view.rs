//! View window and the math <-> pixel coordinate transform.

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 10.0;

/// Half the visible x-span at zoom 1.
const BASE_HALF_WIDTH: f64 = 8.0;
/// Half the visible y-span at zoom 1.
const BASE_HALF_HEIGHT: f64 = 5.0;

/// A point in either math or pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Visible math-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Left edge.
    pub x_min: f64,
    /// Right edge.
    pub x_max: f64,
    /// Bottom edge.
    pub y_min: f64,
    /// Top edge.
    pub y_max: f64,
}

impl Bounds {
    /// Horizontal span.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Vertical span.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Whether `y` lies inside the vertical range.
    pub fn contains_y(&self, y: f64) -> bool {
        y >= self.y_min && y <= self.y_max
    }

    /// Whether `x` lies inside the horizontal range.
    pub fn contains_x(&self, x: f64) -> bool {
        x >= self.x_min && x <= self.x_max
    }
}

/// Pan/zoom state of the visualizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewWindow {
    pan_x: f64,
    pan_y: f64,
    zoom: f64,
}

impl Default for ViewWindow {
    fn default() -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 1.0,
        }
    }
}

impl ViewWindow {
    /// Create a window centered on `(pan_x, pan_y)` at the given zoom.
    pub fn new(pan_x: f64, pan_y: f64, zoom: f64) -> Self {
        Self {
            pan_x,
            pan_y,
            zoom: clamp_zoom(zoom),
        }
    }

    /// Current zoom factor.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Current center.
    pub fn center(&self) -> Point {
        Point::new(self.pan_x, self.pan_y)
    }

    /// Visible math-space rectangle.
    pub fn bounds(&self) -> Bounds {
        let half_w = BASE_HALF_WIDTH / self.zoom;
        let half_h = BASE_HALF_HEIGHT / self.zoom;
        Bounds {
            x_min: self.pan_x - half_w,
            x_max: self.pan_x + half_w,
            y_min: self.pan_y - half_h,
            y_max: self.pan_y + half_h,
        }
    }

    /// Move the center by a fraction of the visible span.
    pub fn pan_by(&mut self, dx_frac: f64, dy_frac: f64) {
        let bounds = self.bounds();
        self.pan_x += dx_frac * bounds.width();
        self.pan_y += dy_frac * bounds.height();
    }

    /// Multiply the zoom factor, keeping it inside the allowed range.
    pub fn zoom_by(&mut self, factor: f64) {
        if factor.is_finite() && factor > 0.0 {
            self.zoom = clamp_zoom(self.zoom * factor);
        }
    }

    /// Back to the origin at zoom 1.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        1.0
    }
}

/// Affine mapping between a view window and a pixel grid.
///
/// Pixel space has its origin in the top-left corner and grows downwards,
/// so math "up" maps to a decreasing row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    bounds: Bounds,
    width: f64,
    height: f64,
}

impl Viewport {
    /// Build a viewport for a window rendered onto `width` x `height` pixels.
    pub fn new(window: &ViewWindow, width: f64, height: f64) -> Self {
        Self {
            bounds: window.bounds(),
            width: sanitize_extent(width),
            height: sanitize_extent(height),
        }
    }

    /// Visible math-space rectangle.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Pixel width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Pixel height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Math units per pixel along x.
    pub fn x_step(&self) -> f64 {
        self.bounds.width() / self.width
    }

    /// Math -> pixel.
    pub fn to_pixel(&self, p: Point) -> Point {
        let b = &self.bounds;
        Point::new(
            (p.x - b.x_min) / b.width() * self.width,
            (b.y_max - p.y) / b.height() * self.height,
        )
    }

    /// Pixel -> math.
    pub fn to_math(&self, p: Point) -> Point {
        let b = &self.bounds;
        Point::new(
            b.x_min + p.x / self.width * b.width(),
            b.y_max - p.y / self.height * b.height(),
        )
    }
}

fn sanitize_extent(extent: f64) -> f64 {
    if extent.is_finite() {
        extent.max(1.0)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() <= epsilon * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn forward_then_inverse_recovers_point() {
        let windows = [
            ViewWindow::default(),
            ViewWindow::new(3.5, -2.0, MIN_ZOOM),
            ViewWindow::new(-120.0, 40.0, MAX_ZOOM),
            ViewWindow::new(0.25, 0.75, 2.7),
        ];
        let points = [
            Point::new(0.0, 0.0),
            Point::new(1.5, -3.25),
            Point::new(-7.9, 4.9),
            Point::new(1e3, -1e3),
        ];

        for window in &windows {
            let viewport = Viewport::new(window, 640.0, 360.0);
            for &p in &points {
                let back = viewport.to_math(viewport.to_pixel(p));
                assert!(approx_eq(back.x, p.x, 1e-9), "x: {} vs {}", back.x, p.x);
                assert!(approx_eq(back.y, p.y, 1e-9), "y: {} vs {}", back.y, p.y);
            }
        }
    }

    #[test]
    fn vertical_axis_is_inverted() {
        let viewport = Viewport::new(&ViewWindow::default(), 160.0, 100.0);
        let top_left = viewport.to_pixel(Point::new(-8.0, 5.0));
        let bottom_right = viewport.to_pixel(Point::new(8.0, -5.0));
        assert!(approx_eq(top_left.x, 0.0, 1e-12));
        assert!(approx_eq(top_left.y, 0.0, 1e-12));
        assert!(approx_eq(bottom_right.x, 160.0, 1e-12));
        assert!(approx_eq(bottom_right.y, 100.0, 1e-12));

        let higher = viewport.to_pixel(Point::new(0.0, 1.0));
        let lower = viewport.to_pixel(Point::new(0.0, -1.0));
        assert!(higher.y < lower.y);
    }

    #[test]
    fn zoom_stays_clamped() {
        let mut window = ViewWindow::default();
        for _ in 0..100 {
            window.zoom_by(1.25);
        }
        assert_eq!(window.zoom(), MAX_ZOOM);
        for _ in 0..200 {
            window.zoom_by(0.8);
        }
        assert_eq!(window.zoom(), MIN_ZOOM);

        window.zoom_by(f64::NAN);
        window.zoom_by(0.0);
        assert_eq!(window.zoom(), MIN_ZOOM);

        assert_eq!(ViewWindow::new(0.0, 0.0, f64::INFINITY).zoom(), 1.0);
    }

    #[test]
    fn bounds_never_degenerate() {
        let window = ViewWindow::new(0.0, 0.0, 1e12);
        let bounds = window.bounds();
        assert!(bounds.width() > 0.0);
        assert!(bounds.height() > 0.0);

        let viewport = Viewport::new(&window, 0.0, f64::NAN);
        assert_eq!(viewport.width(), 1.0);
        assert_eq!(viewport.height(), 1.0);
        let p = viewport.to_pixel(Point::new(0.0, 0.0));
        assert!(p.x.is_finite() && p.y.is_finite());
    }

    #[test]
    fn pan_moves_by_fraction_of_span() {
        let mut window = ViewWindow::default();
        window.pan_by(0.1, -0.1);
        let center = window.center();
        assert!(approx_eq(center.x, 1.6, 1e-12));
        assert!(approx_eq(center.y, -1.0, 1e-12));

        window.reset();
        assert_eq!(window, ViewWindow::default());
    }
}
