//! Lesson rendering into pixel-space draw commands.
//!
//! `Scene::render` is a pure function of the lesson, the selected function
//! and the viewport: the same inputs always produce the same command list.

use std::f64::consts::TAU;

use super::functions::FunctionEntry;
use super::lesson::Lesson;
use super::view::{Bounds, Point, Viewport};

/// Secants are drawn only while the step is larger than this.
const SECANT_EPS: f64 = 1e-3;
/// Half length (in x) of tangent lines.
const TANGENT_REACH: f64 = 2.0;
/// Number of secants in the tangent lesson.
const SECANT_COUNT: u32 = 5;
/// Segments used to approximate the unit circle.
const CIRCLE_SEGMENTS: usize = 96;
/// Aim for roughly this many grid cells across the view.
const GRID_TARGET: f64 = 10.0;

/// Semantic color of a draw command, mapped to the palette by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ink {
    /// Background grid.
    Grid,
    /// Coordinate axes.
    Axis,
    /// The selected function.
    Curve,
    /// The derivative of the selected function.
    Derivative,
    /// Tangent lines.
    Tangent,
    /// Secant lines.
    Secant,
    /// Highlighted point.
    Point,
    /// Moving point approaching a limit.
    Approach,
    /// Sine curve and projection.
    Sine,
    /// Cosine curve and projection.
    Cosine,
    /// Helper lines.
    Guide,
    /// Plain text.
    Text,
}

/// A single drawing primitive, in pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Straight segment.
    Line {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
        /// Color role.
        ink: Ink,
    },
    /// Connected run of curve samples.
    Polyline {
        /// Sample points, at least two.
        points: Vec<Point>,
        /// Color role.
        ink: Ink,
    },
    /// Point marker.
    Marker {
        /// Marker position.
        at: Point,
        /// Color role.
        ink: Ink,
    },
    /// Text anchored at a position.
    Label {
        /// Anchor position.
        at: Point,
        /// Label text.
        text: String,
        /// Color role.
        ink: Ink,
    },
    /// Text line in the readout corner; readouts stack in emission order.
    Readout {
        /// Readout text.
        text: String,
        /// Color role.
        ink: Ink,
    },
}

/// Rendered lesson.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    /// Commands in painting order.
    pub commands: Vec<DrawCommand>,
}

impl Scene {
    /// Render a lesson onto a viewport.
    pub fn render(lesson: &Lesson, function: &FunctionEntry, viewport: &Viewport) -> Self {
        let mut builder = SceneBuilder {
            viewport,
            bounds: viewport.bounds(),
            commands: Vec::new(),
        };

        builder.grid();
        builder.axes();

        match *lesson {
            Lesson::Derivative { x } => builder.derivative(function, x),
            Lesson::Limit { x, h } => builder.limit(function, x, h),
            Lesson::Tangent { x, h } => builder.tangent(function, x, h),
            Lesson::UnitCircle { angle } => builder.unit_circle(angle),
            Lesson::Wave {
                amplitude,
                frequency,
                phase,
                time,
            } => builder.wave(amplitude, frequency, phase, time),
        }

        Scene {
            commands: builder.commands,
        }
    }

    /// Readout lines in display order.
    pub fn readouts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Readout { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Line segments drawn with the given ink.
    pub fn lines(&self, ink: Ink) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.commands.iter().filter_map(move |cmd| match cmd {
            DrawCommand::Line { from, to, ink: i } if *i == ink => Some((*from, *to)),
            _ => None,
        })
    }
}

struct SceneBuilder<'a> {
    viewport: &'a Viewport,
    bounds: Bounds,
    commands: Vec<DrawCommand>,
}

impl SceneBuilder<'_> {
    fn grid(&mut self) {
        let b = self.bounds;
        let step_x = nice_step(b.width() / GRID_TARGET);
        let step_y = nice_step(b.height() / GRID_TARGET);

        let mut k = (b.x_min / step_x).ceil();
        while k * step_x <= b.x_max {
            let x = k * step_x;
            if k != 0.0 {
                self.segment(Point::new(x, b.y_min), Point::new(x, b.y_max), Ink::Grid);
            }
            k += 1.0;
        }

        let mut k = (b.y_min / step_y).ceil();
        while k * step_y <= b.y_max {
            let y = k * step_y;
            if k != 0.0 {
                self.segment(Point::new(b.x_min, y), Point::new(b.x_max, y), Ink::Grid);
            }
            k += 1.0;
        }
    }

    fn axes(&mut self) {
        let b = self.bounds;
        if b.contains_y(0.0) {
            self.segment(Point::new(b.x_min, 0.0), Point::new(b.x_max, 0.0), Ink::Axis);
            self.label(Point::new(b.x_max - b.width() * 0.03, 0.0), "x", Ink::Axis);
        }
        if b.contains_x(0.0) {
            self.segment(Point::new(0.0, b.y_min), Point::new(0.0, b.y_max), Ink::Axis);
            self.label(Point::new(0.0, b.y_max - b.height() * 0.03), "y", Ink::Axis);
        }
    }

    fn derivative(&mut self, function: &FunctionEntry, x: f64) {
        self.curve(|x| function.eval(x), Ink::Curve);
        self.curve(|x| function.derivative(x), Ink::Derivative);

        let y = function.eval(x);
        if !y.is_finite() {
            self.readout(format!("f({:.2}) is undefined", x), Ink::Text);
            return;
        }

        let slope = function.derivative(x);
        self.tangent_line(x, y, slope, Ink::Tangent);
        self.marker(Point::new(x, y), Ink::Point);

        self.readout(format!("f'({:.2}) = {:.2}", x, slope), Ink::Tangent);
        self.readout(format!("({:.2}, {:.2})", x, y), Ink::Point);
    }

    fn limit(&mut self, function: &FunctionEntry, x: f64, h: f64) {
        self.curve(|x| function.eval(x), Ink::Curve);

        let target_y = function.eval(x);
        if !target_y.is_finite() {
            self.readout(format!("f({:.2}) is undefined", x), Ink::Text);
            return;
        }

        let approach_x = x + h;
        let approach_y = function.eval(approach_x);

        if h.abs() > SECANT_EPS && approach_y.is_finite() {
            let slope = (approach_y - target_y) / h;
            let x1 = x.min(approach_x) - 1.0;
            let x2 = x.max(approach_x) + 1.0;
            self.segment(
                Point::new(x1, target_y + slope * (x1 - x)),
                Point::new(x2, target_y + slope * (x2 - x)),
                Ink::Secant,
            );
            self.readout(format!("secant slope = {:.3}", slope), Ink::Secant);
        }

        if approach_y.is_finite() {
            self.marker(Point::new(approach_x, approach_y), Ink::Approach);
        }
        self.marker(Point::new(x, target_y), Ink::Point);

        self.readout(format!("h = {:.3}", h), Ink::Approach);
        self.readout(
            format!("lim h→0: {:.3}", function.derivative(x)),
            Ink::Tangent,
        );
    }

    fn tangent(&mut self, function: &FunctionEntry, x: f64, h: f64) {
        self.curve(|x| function.eval(x), Ink::Curve);

        let y = function.eval(x);
        if !y.is_finite() {
            self.readout(format!("f({:.2}) is undefined", x), Ink::Text);
            return;
        }

        for i in 1..=SECANT_COUNT {
            let step = h * f64::from(i) / f64::from(SECANT_COUNT);
            if step.abs() <= SECANT_EPS {
                continue;
            }
            let secant_y = function.eval(x + step);
            if secant_y.is_finite() {
                self.tangent_line(x, y, (secant_y - y) / step, Ink::Secant);
            }
        }

        let slope = function.derivative(x);
        self.tangent_line(x, y, slope, Ink::Tangent);
        self.marker(Point::new(x, y), Ink::Point);

        self.readout(format!("tangent slope = {:.3}", slope), Ink::Tangent);
    }

    fn unit_circle(&mut self, angle: f64) {
        let circle = (0..=CIRCLE_SEGMENTS).map(|i| {
            let t = TAU * i as f64 / CIRCLE_SEGMENTS as f64;
            Point::new(t.cos(), t.sin())
        });
        self.path(circle, Ink::Curve);

        let (sin, cos) = angle.sin_cos();
        let tip = Point::new(cos, sin);
        self.segment(Point::new(0.0, 0.0), tip, Ink::Guide);
        self.segment(Point::new(cos, 0.0), tip, Ink::Sine);
        self.segment(Point::new(0.0, 0.0), Point::new(cos, 0.0), Ink::Cosine);
        self.marker(tip, Ink::Point);

        self.readout(format!("θ = {:.2}", angle), Ink::Text);
        self.readout(format!("sin(θ) = {:.3}", sin), Ink::Sine);
        self.readout(format!("cos(θ) = {:.3}", cos), Ink::Cosine);
    }

    fn wave(&mut self, amplitude: f64, frequency: f64, phase: f64, time: f64) {
        let sine = |x: f64| amplitude * (frequency * x + phase).sin();
        let cosine = |x: f64| amplitude * (frequency * x + phase).cos();
        self.curve(sine, Ink::Sine);
        self.curve(cosine, Ink::Cosine);

        let b = self.bounds;
        let probe = b.x_min + (time - b.x_min).rem_euclid(b.width());
        self.segment(Point::new(probe, b.y_min), Point::new(probe, b.y_max), Ink::Guide);
        self.marker(Point::new(probe, sine(probe)), Ink::Sine);
        self.marker(Point::new(probe, cosine(probe)), Ink::Cosine);

        self.readout(format!("A = {:.2}", amplitude), Ink::Text);
        self.readout(format!("f = {:.2}", frequency), Ink::Text);
        self.readout(format!("φ = {:.2}", phase), Ink::Text);
    }

    /// Line through `(x, y)` with the given slope, spanning `x ± TANGENT_REACH`.
    fn tangent_line(&mut self, x: f64, y: f64, slope: f64, ink: Ink) {
        if !slope.is_finite() {
            return;
        }
        self.segment(
            Point::new(x - TANGENT_REACH, y - slope * TANGENT_REACH),
            Point::new(x + TANGENT_REACH, y + slope * TANGENT_REACH),
            ink,
        );
    }

    /// Sample `f` once per pixel column, breaking the line at gaps.
    fn curve(&mut self, f: impl Fn(f64) -> f64, ink: Ink) {
        let x_min = self.bounds.x_min;
        let step = self.viewport.x_step();
        let columns = self.viewport.width().ceil() as usize;
        let samples = (0..=columns).map(|i| {
            let x = x_min + i as f64 * step;
            Point::new(x, f(x))
        });
        self.path(samples, ink);
    }

    /// Emit polylines from math-space samples, skipping invalid or
    /// off-screen samples without bridging the gap.
    fn path(&mut self, samples: impl Iterator<Item = Point>, ink: Ink) {
        let b = self.bounds;
        let mut run: Vec<Point> = Vec::new();
        for p in samples {
            let visible = p.x.is_finite()
                && p.y.is_finite()
                && b.contains_x(p.x)
                && b.contains_y(p.y);
            if visible {
                run.push(self.viewport.to_pixel(p));
            } else {
                self.flush(&mut run, ink);
            }
        }
        self.flush(&mut run, ink);
    }

    fn flush(&mut self, run: &mut Vec<Point>, ink: Ink) {
        if run.len() >= 2 {
            self.commands.push(DrawCommand::Polyline {
                points: std::mem::take(run),
                ink,
            });
        } else {
            run.clear();
        }
    }

    fn segment(&mut self, from: Point, to: Point, ink: Ink) {
        let from = self.viewport.to_pixel(from);
        let to = self.viewport.to_pixel(to);
        if let Some((from, to)) = clip_segment(from, to, self.viewport.width(), self.viewport.height())
        {
            self.commands.push(DrawCommand::Line { from, to, ink });
        }
    }

    fn marker(&mut self, at: Point, ink: Ink) {
        if self.bounds.contains_x(at.x) && self.bounds.contains_y(at.y) {
            self.commands.push(DrawCommand::Marker {
                at: self.viewport.to_pixel(at),
                ink,
            });
        }
    }

    fn label(&mut self, at: Point, text: &str, ink: Ink) {
        self.commands.push(DrawCommand::Label {
            at: self.viewport.to_pixel(at),
            text: text.to_string(),
            ink,
        });
    }

    fn readout(&mut self, text: String, ink: Ink) {
        self.commands.push(DrawCommand::Readout { text, ink });
    }
}

/// Round a raw grid spacing up to 1, 2 or 5 times a power of ten.
fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Clip a segment to the `[0, width] x [0, height]` pixel rectangle
/// (Liang–Barsky).
fn clip_segment(a: Point, b: Point, width: f64, height: f64) -> Option<(Point, Point)> {
    if !(a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite()) {
        return None;
    }
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;

    for (p, q) in [(-dx, a.x), (dx, width - a.x), (-dy, a.y), (dy, height - a.y)] {
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

    Some((
        Point::new(a.x + t0 * dx, a.y + t0 * dy),
        Point::new(a.x + t1 * dx, a.y + t1 * dy),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualizer::functions::{by_name, CATALOG};
    use crate::visualizer::lesson::LessonKind;
    use crate::visualizer::view::ViewWindow;

    fn viewport() -> Viewport {
        Viewport::new(&ViewWindow::default(), 320.0, 200.0)
    }

    fn slope_of(viewport: &Viewport, (from, to): (Point, Point)) -> f64 {
        let a = viewport.to_math(from);
        let b = viewport.to_math(to);
        (b.y - a.y) / (b.x - a.x)
    }

    #[test]
    fn quadratic_derivative_example() {
        let quadratic = by_name("quadratic").unwrap();
        let vp = viewport();
        let scene = Scene::render(&Lesson::Derivative { x: 2.0 }, quadratic, &vp);

        let readouts: Vec<&str> = scene.readouts().collect();
        assert_eq!(readouts, vec!["f'(2.00) = 2.00", "(2.00, 1.00)"]);

        let marker = scene
            .commands
            .iter()
            .find_map(|cmd| match cmd {
                DrawCommand::Marker { at, ink: Ink::Point } => Some(vp.to_math(*at)),
                _ => None,
            })
            .expect("point marker");
        assert!((marker.x - 2.0).abs() < 1e-9);
        assert!((marker.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn tangent_slope_matches_derivative() {
        let vp = viewport();
        for function in &CATALOG {
            for &x in &[-1.5, 0.5, 1.0, 2.0, 3.0] {
                let y = function.eval(x);
                let scene = Scene::render(&Lesson::Derivative { x }, function, &vp);
                let tangents: Vec<_> = scene.lines(Ink::Tangent).collect();

                if !y.is_finite() {
                    assert!(tangents.is_empty(), "{} at {}", function.name, x);
                    continue;
                }
                if !vp.bounds().contains_y(y) {
                    continue;
                }
                assert_eq!(tangents.len(), 1, "{} at {}", function.name, x);
                let slope = slope_of(&vp, tangents[0]);
                let expected = function.derivative(x);
                assert!(
                    (slope - expected).abs() < 1e-6 * expected.abs().max(1.0),
                    "{} at {}: drawn {} vs f' {}",
                    function.name,
                    x,
                    slope,
                    expected
                );
            }
        }
    }

    #[test]
    fn curve_breaks_outside_domain() {
        let log = by_name("logarithm").unwrap();
        let vp = viewport();
        let scene = Scene::render(&Lesson::Derivative { x: -1.0 }, log, &vp);

        assert!(scene.readouts().any(|r| r.contains("undefined")));
        for cmd in &scene.commands {
            if let DrawCommand::Polyline { points, ink } = cmd {
                assert!(points.len() >= 2);
                for p in points {
                    let m = vp.to_math(*p);
                    assert!(vp.bounds().contains_y(m.y));
                    if *ink == Ink::Curve {
                        assert!(m.x > 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn undefined_point_skips_markers_in_limit_and_tangent() {
        let log = by_name("logarithm").unwrap();
        let vp = viewport();
        let lessons = [
            Lesson::Limit { x: -1.0, h: 1.5 },
            Lesson::Tangent { x: -1.0, h: 1.5 },
        ];

        for lesson in &lessons {
            let scene = Scene::render(lesson, log, &vp);
            assert!(
                scene.readouts().any(|r| r.contains("undefined")),
                "{:?}",
                lesson
            );
            assert!(
                !scene
                    .commands
                    .iter()
                    .any(|cmd| matches!(cmd, DrawCommand::Marker { .. })),
                "{:?}",
                lesson
            );
            assert_eq!(scene.lines(Ink::Tangent).count(), 0, "{:?}", lesson);
            assert_eq!(scene.lines(Ink::Secant).count(), 0, "{:?}", lesson);
        }
    }

    #[test]
    fn steep_curve_is_split_into_runs() {
        let exp = by_name("exponential").unwrap();
        let vp = Viewport::new(&ViewWindow::new(0.0, 0.0, 0.5), 320.0, 200.0);
        let scene = Scene::render(&Lesson::Derivative { x: 0.0 }, exp, &vp);
        let top = vp.bounds().y_max;
        for cmd in &scene.commands {
            if let DrawCommand::Polyline { points, .. } = cmd {
                for p in points {
                    assert!(vp.to_math(*p).y <= top + 1e-9);
                }
            }
        }
    }

    #[test]
    fn wave_samples_stay_within_amplitude() {
        let vp = viewport();
        let cubic = &CATALOG[0];
        for &(amplitude, frequency, phase, time) in
            &[(1.0, 1.0, 0.0, 0.0), (2.5, 0.3, 1.2, 7.35), (0.4, 3.0, 6.28, 123.0)]
        {
            let lesson = Lesson::Wave {
                amplitude,
                frequency,
                phase,
                time,
            };
            let scene = Scene::render(&lesson, cubic, &vp);
            let mut checked = 0;
            for cmd in &scene.commands {
                let points: Vec<Point> = match cmd {
                    DrawCommand::Polyline { points, ink: Ink::Sine | Ink::Cosine } => {
                        points.clone()
                    },
                    DrawCommand::Marker { at, ink: Ink::Sine | Ink::Cosine } => vec![*at],
                    _ => continue,
                };
                for p in points {
                    let y = vp.to_math(p).y;
                    assert!(y.abs() <= amplitude + 1e-9, "{} exceeds {}", y, amplitude);
                    checked += 1;
                }
            }
            assert!(checked > 0);
        }
    }

    #[test]
    fn limit_draws_secant_until_step_vanishes() {
        let cubic = &CATALOG[0];
        let vp = viewport();

        let scene = Scene::render(&Lesson::Limit { x: 1.0, h: 0.5 }, cubic, &vp);
        assert_eq!(scene.lines(Ink::Secant).count(), 1);
        let expected = (cubic.eval(1.5) - cubic.eval(1.0)) / 0.5;
        let drawn = slope_of(&vp, scene.lines(Ink::Secant).next().unwrap());
        assert!((drawn - expected).abs() < 1e-6);

        let scene = Scene::render(&Lesson::Limit { x: 1.0, h: 1e-3 }, cubic, &vp);
        assert_eq!(scene.lines(Ink::Secant).count(), 0);
        assert!(scene.readouts().any(|r| r == "lim h→0: 0.300"));
    }

    #[test]
    fn tangent_lesson_draws_secant_family() {
        let vp = viewport();
        let scene = Scene::render(&Lesson::Tangent { x: 0.0, h: 1.0 }, &CATALOG[0], &vp);
        assert_eq!(scene.lines(Ink::Secant).count(), 5);
        assert_eq!(scene.lines(Ink::Tangent).count(), 1);
    }

    #[test]
    fn unit_circle_projections_follow_angle() {
        let vp = viewport();
        let angle = 1.0_f64;
        let scene = Scene::render(&Lesson::UnitCircle { angle }, &CATALOG[0], &vp);
        let (from, to) = scene.lines(Ink::Sine).next().expect("sine projection");
        let a = vp.to_math(from);
        let b = vp.to_math(to);
        assert!((a.x - angle.cos()).abs() < 1e-9);
        assert!((b.y - angle.sin()).abs() < 1e-9);
        assert!(scene.readouts().any(|r| r == "sin(θ) = 0.841"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let vp = viewport();
        for kind in LessonKind::ALL {
            let lesson = Lesson::defaults(kind);
            let first = Scene::render(&lesson, &CATALOG[2], &vp);
            let second = Scene::render(&lesson, &CATALOG[2], &vp);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn clipping_keeps_segments_on_screen() {
        let clipped = clip_segment(Point::new(-10.0, 5.0), Point::new(110.0, 5.0), 100.0, 10.0)
            .unwrap();
        assert_eq!(clipped.0, Point::new(0.0, 5.0));
        assert_eq!(clipped.1, Point::new(100.0, 5.0));

        assert!(clip_segment(Point::new(-5.0, -5.0), Point::new(-1.0, -1.0), 10.0, 10.0).is_none());
        assert!(clip_segment(Point::new(0.0, f64::NAN), Point::new(1.0, 1.0), 10.0, 10.0).is_none());
    }

    #[test]
    fn nice_steps() {
        assert_eq!(nice_step(1.6), 2.0);
        assert!((nice_step(0.9) - 1.0).abs() < 1e-12);
        assert_eq!(nice_step(3.0), 5.0);
        assert!((nice_step(0.016) - 0.02).abs() < 1e-12);
        assert_eq!(nice_step(0.0), 1.0);
    }
}
