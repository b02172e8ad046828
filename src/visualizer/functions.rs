//! Built-in function catalog.

/// A real function of one variable together with its derivative.
///
/// Functions with a restricted domain return NaN outside of it instead of
/// panicking, so curve sampling can treat every invalid point the same way.
#[derive(Debug, Clone, Copy)]
pub struct FunctionEntry {
    /// Short name used in the UI.
    pub name: &'static str,
    /// Human-readable formula of `f`.
    pub formula: &'static str,
    /// Human-readable formula of `f'`.
    pub derivative_formula: &'static str,
    f: fn(f64) -> f64,
    df: fn(f64) -> f64,
}

impl FunctionEntry {
    /// Evaluate `f(x)`.
    pub fn eval(&self, x: f64) -> f64 {
        (self.f)(x)
    }

    /// Evaluate `f'(x)`.
    pub fn derivative(&self, x: f64) -> f64 {
        (self.df)(x)
    }
}

fn cubic(x: f64) -> f64 {
    0.1 * x * x * x - 0.5 * x * x + x + 1.0
}

fn cubic_prime(x: f64) -> f64 {
    0.3 * x * x - x + 1.0
}

fn quadratic(x: f64) -> f64 {
    x * x - 2.0 * x + 1.0
}

fn quadratic_prime(x: f64) -> f64 {
    2.0 * x - 2.0
}

fn ln(x: f64) -> f64 {
    if x > 0.0 {
        x.ln()
    } else {
        f64::NAN
    }
}

fn ln_prime(x: f64) -> f64 {
    if x > 0.0 {
        1.0 / x
    } else {
        f64::NAN
    }
}

/// All selectable functions, in cycling order.
pub const CATALOG: [FunctionEntry; 5] = [
    FunctionEntry {
        name: "cubic",
        formula: "f(x) = 0.1x³ - 0.5x² + x + 1",
        derivative_formula: "f'(x) = 0.3x² - x + 1",
        f: cubic,
        df: cubic_prime,
    },
    FunctionEntry {
        name: "quadratic",
        formula: "f(x) = x² - 2x + 1",
        derivative_formula: "f'(x) = 2x - 2",
        f: quadratic,
        df: quadratic_prime,
    },
    FunctionEntry {
        name: "sine",
        formula: "f(x) = sin x",
        derivative_formula: "f'(x) = cos x",
        f: f64::sin,
        df: f64::cos,
    },
    FunctionEntry {
        name: "exponential",
        formula: "f(x) = eˣ",
        derivative_formula: "f'(x) = eˣ",
        f: f64::exp,
        df: f64::exp,
    },
    FunctionEntry {
        name: "logarithm",
        formula: "f(x) = ln x",
        derivative_formula: "f'(x) = 1/x",
        f: ln,
        df: ln_prime,
    },
];

/// Look up a catalog entry by name.
pub fn by_name(name: &str) -> Option<&'static FunctionEntry> {
    CATALOG.iter().find(|entry| entry.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivatives_agree_with_central_difference() {
        let h = 1e-6;
        for entry in &CATALOG {
            for &x in &[0.3, 1.0, 2.0, 3.7] {
                let numeric = (entry.eval(x + h) - entry.eval(x - h)) / (2.0 * h);
                let exact = entry.derivative(x);
                assert!(
                    (numeric - exact).abs() < 1e-4,
                    "{} at {}: numeric {} vs exact {}",
                    entry.name,
                    x,
                    numeric,
                    exact
                );
            }
        }
    }

    #[test]
    fn logarithm_reports_nan_outside_domain() {
        let log = by_name("logarithm").unwrap();
        assert!(log.eval(0.0).is_nan());
        assert!(log.eval(-2.5).is_nan());
        assert!(log.derivative(-1.0).is_nan());
        assert_eq!(log.eval(1.0), 0.0);
    }

    #[test]
    fn quadratic_matches_worked_example() {
        let q = by_name("Quadratic").unwrap();
        assert_eq!(q.eval(2.0), 1.0);
        assert_eq!(q.derivative(2.0), 2.0);
    }
}
