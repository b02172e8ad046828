//! Visualization lessons and their parameters.

use std::f64::consts::TAU;

/// Smallest step size the limit lesson decays to.
pub const H_FLOOR: f64 = 1e-3;

const DEFAULT_X: f64 = 2.0;
const DEFAULT_H: f64 = 1.0;
const ANGLE_STEP: f64 = 0.05;
const H_DECAY: f64 = 0.97;
const WAVE_STEP: f64 = 0.05;

/// Which lesson is shown, without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LessonKind {
    /// Function, derivative and tangent line.
    #[default]
    Derivative,
    /// Secant line approaching the tangent.
    Limit,
    /// Family of secants converging on the tangent.
    Tangent,
    /// Unit circle with sine/cosine projections.
    UnitCircle,
    /// Sine and cosine waves.
    Wave,
}

impl LessonKind {
    /// All lessons, in cycling order.
    pub const ALL: [LessonKind; 5] = [
        LessonKind::Derivative,
        LessonKind::Limit,
        LessonKind::Tangent,
        LessonKind::UnitCircle,
        LessonKind::Wave,
    ];

    /// Get the next lesson in cycle.
    pub fn next(self) -> Self {
        match self {
            LessonKind::Derivative => LessonKind::Limit,
            LessonKind::Limit => LessonKind::Tangent,
            LessonKind::Tangent => LessonKind::UnitCircle,
            LessonKind::UnitCircle => LessonKind::Wave,
            LessonKind::Wave => LessonKind::Derivative,
        }
    }

    /// Get display name.
    pub fn name(self) -> &'static str {
        match self {
            LessonKind::Derivative => "Derivative",
            LessonKind::Limit => "Limits",
            LessonKind::Tangent => "Tangent",
            LessonKind::UnitCircle => "Unit Circle",
            LessonKind::Wave => "Waves",
        }
    }

    /// Whether the lesson plots the selected function.
    pub fn uses_function(self) -> bool {
        matches!(
            self,
            LessonKind::Derivative | LessonKind::Limit | LessonKind::Tangent
        )
    }
}

/// An adjustable lesson parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// Evaluation point.
    X,
    /// Secant step size.
    H,
    /// Unit circle angle.
    Angle,
    /// Wave amplitude.
    Amplitude,
    /// Wave frequency.
    Frequency,
    /// Wave phase.
    Phase,
}

impl Param {
    /// Get display name.
    pub fn name(self) -> &'static str {
        match self {
            Param::X => "x",
            Param::H => "h",
            Param::Angle => "θ",
            Param::Amplitude => "A",
            Param::Frequency => "f",
            Param::Phase => "φ",
        }
    }

    /// Slider range and step.
    fn range(self) -> (f64, f64, f64) {
        match self {
            Param::X => (-5.0, 5.0, 0.1),
            Param::H => (H_FLOOR, 2.0, 0.05),
            Param::Angle => (0.0, TAU, 0.1),
            Param::Amplitude => (0.1, 3.0, 0.1),
            Param::Frequency => (0.1, 3.0, 0.1),
            Param::Phase => (0.0, 6.28, 0.1),
        }
    }
}

/// A lesson together with its own parameter set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lesson {
    /// Function, its derivative and the tangent at `x`.
    Derivative {
        /// Evaluation point.
        x: f64,
    },
    /// Secant through `x` and `x + h`; `h` shrinks while animating.
    Limit {
        /// Evaluation point.
        x: f64,
        /// Step size.
        h: f64,
    },
    /// Secants with steps `h·i/5` converging on the tangent at `x`.
    Tangent {
        /// Evaluation point.
        x: f64,
        /// Largest step size.
        h: f64,
    },
    /// Point on the unit circle at `angle`.
    UnitCircle {
        /// Angle in radians, kept in `[0, 2π)`.
        angle: f64,
    },
    /// `A·sin(f·x + φ)` and `A·cos(f·x + φ)` with a moving probe.
    Wave {
        /// Amplitude.
        amplitude: f64,
        /// Angular frequency.
        frequency: f64,
        /// Phase offset.
        phase: f64,
        /// Probe position, advanced by the clock.
        time: f64,
    },
}

impl Default for Lesson {
    fn default() -> Self {
        Self::defaults(LessonKind::default())
    }
}

impl Lesson {
    /// Default parameters for a lesson.
    pub fn defaults(kind: LessonKind) -> Self {
        match kind {
            LessonKind::Derivative => Lesson::Derivative { x: DEFAULT_X },
            LessonKind::Limit => Lesson::Limit {
                x: DEFAULT_X,
                h: DEFAULT_H,
            },
            LessonKind::Tangent => Lesson::Tangent {
                x: DEFAULT_X,
                h: DEFAULT_H,
            },
            LessonKind::UnitCircle => Lesson::UnitCircle { angle: 0.0 },
            LessonKind::Wave => Lesson::Wave {
                amplitude: 1.0,
                frequency: 1.0,
                phase: 0.0,
                time: 0.0,
            },
        }
    }

    /// The lesson tag.
    pub fn kind(&self) -> LessonKind {
        match self {
            Lesson::Derivative { .. } => LessonKind::Derivative,
            Lesson::Limit { .. } => LessonKind::Limit,
            Lesson::Tangent { .. } => LessonKind::Tangent,
            Lesson::UnitCircle { .. } => LessonKind::UnitCircle,
            Lesson::Wave { .. } => LessonKind::Wave,
        }
    }

    /// Switch to another lesson, carrying over `x` and `h` where both use them.
    pub fn switch_to(&self, kind: LessonKind) -> Self {
        let mut next = Self::defaults(kind);
        for param in next.params() {
            if let Some(value) = self.get(*param) {
                next.set(*param, value);
            }
        }
        next
    }

    /// Parameters the user can adjust for this lesson.
    pub fn params(&self) -> &'static [Param] {
        match self {
            Lesson::Derivative { .. } => &[Param::X],
            Lesson::Limit { .. } | Lesson::Tangent { .. } => &[Param::X, Param::H],
            Lesson::UnitCircle { .. } => &[Param::Angle],
            Lesson::Wave { .. } => &[Param::Amplitude, Param::Frequency, Param::Phase],
        }
    }

    /// Current value of a parameter, if the lesson has it.
    pub fn get(&self, param: Param) -> Option<f64> {
        match (*self, param) {
            (Lesson::Derivative { x }, Param::X)
            | (Lesson::Limit { x, .. }, Param::X)
            | (Lesson::Tangent { x, .. }, Param::X) => Some(x),
            (Lesson::Limit { h, .. }, Param::H) | (Lesson::Tangent { h, .. }, Param::H) => Some(h),
            (Lesson::UnitCircle { angle }, Param::Angle) => Some(angle),
            (Lesson::Wave { amplitude, .. }, Param::Amplitude) => Some(amplitude),
            (Lesson::Wave { frequency, .. }, Param::Frequency) => Some(frequency),
            (Lesson::Wave { phase, .. }, Param::Phase) => Some(phase),
            _ => None,
        }
    }

    /// Set a parameter, clamped to its slider range. Ignored if absent.
    pub fn set(&mut self, param: Param, value: f64) {
        if !value.is_finite() {
            return;
        }
        let (min, max, _) = param.range();
        let value = if param == Param::Angle {
            value.rem_euclid(TAU)
        } else {
            value.clamp(min, max)
        };
        match (self, param) {
            (Lesson::Derivative { x }, Param::X)
            | (Lesson::Limit { x, .. }, Param::X)
            | (Lesson::Tangent { x, .. }, Param::X) => *x = value,
            (Lesson::Limit { h, .. }, Param::H) | (Lesson::Tangent { h, .. }, Param::H) => {
                *h = value
            },
            (Lesson::UnitCircle { angle }, Param::Angle) => *angle = value,
            (Lesson::Wave { amplitude, .. }, Param::Amplitude) => *amplitude = value,
            (Lesson::Wave { frequency, .. }, Param::Frequency) => *frequency = value,
            (Lesson::Wave { phase, .. }, Param::Phase) => *phase = value,
            _ => {},
        }
    }

    /// Move a parameter by `steps` slider steps.
    pub fn nudge(&mut self, param: Param, steps: f64) {
        if let Some(current) = self.get(param) {
            let (_, _, step) = param.range();
            self.set(param, current + steps * step);
        }
    }

    /// Apply one animation frame.
    pub fn advance(&mut self) {
        match self {
            Lesson::Derivative { .. } | Lesson::Tangent { .. } => {},
            Lesson::Limit { h, .. } => *h = (*h * H_DECAY).max(H_FLOOR),
            Lesson::UnitCircle { angle } => *angle = (*angle + ANGLE_STEP).rem_euclid(TAU),
            Lesson::Wave { time, .. } => *time += WAVE_STEP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switching_keeps_shared_parameters() {
        let mut lesson = Lesson::defaults(LessonKind::Limit);
        lesson.set(Param::X, -1.5);
        lesson.set(Param::H, 0.4);

        let tangent = lesson.switch_to(LessonKind::Tangent);
        assert_eq!(tangent, Lesson::Tangent { x: -1.5, h: 0.4 });

        let derivative = tangent.switch_to(LessonKind::Derivative);
        assert_eq!(derivative, Lesson::Derivative { x: -1.5 });

        let wave = derivative.switch_to(LessonKind::Wave);
        assert_eq!(wave, Lesson::defaults(LessonKind::Wave));
    }

    #[test]
    fn parameters_clamp_to_slider_range() {
        let mut lesson = Lesson::defaults(LessonKind::Wave);
        lesson.set(Param::Amplitude, 10.0);
        lesson.set(Param::Frequency, -3.0);
        assert_eq!(lesson.get(Param::Amplitude), Some(3.0));
        assert_eq!(lesson.get(Param::Frequency), Some(0.1));

        lesson.set(Param::X, 1.0);
        assert_eq!(lesson.get(Param::X), None);

        lesson.set(Param::Amplitude, f64::NAN);
        assert_eq!(lesson.get(Param::Amplitude), Some(3.0));
    }

    #[test]
    fn angle_wraps_instead_of_clamping() {
        let mut lesson = Lesson::UnitCircle { angle: TAU - 0.01 };
        lesson.advance();
        let angle = lesson.get(Param::Angle).unwrap();
        assert!(angle >= 0.0 && angle < 0.05, "angle = {}", angle);

        lesson.nudge(Param::Angle, -1.0);
        let angle = lesson.get(Param::Angle).unwrap();
        assert!(angle > TAU - 0.1 && angle < TAU);
    }

    #[test]
    fn limit_step_decays_to_floor() {
        let mut lesson = Lesson::Limit { x: 0.0, h: 2.0 };
        let mut previous = 2.0;
        for _ in 0..50 {
            lesson.advance();
            let h = lesson.get(Param::H).unwrap();
            assert!(h < previous);
            previous = h;
        }
        for _ in 0..1000 {
            lesson.advance();
        }
        assert_eq!(lesson.get(Param::H), Some(H_FLOOR));
    }

    #[test]
    fn static_lessons_ignore_frames() {
        let mut lesson = Lesson::Derivative { x: 1.2 };
        lesson.advance();
        assert_eq!(lesson, Lesson::Derivative { x: 1.2 });
    }
}
