//! Shared formatting utilities for UI components.

/// Format a byte count as a short human-readable size.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Format an axis bound with smart precision.
pub fn format_axis_label(val: f64) -> String {
    if !val.is_finite() {
        return if val.is_nan() {
            "NaN".to_string()
        } else if val.is_sign_positive() {
            "+Inf".to_string()
        } else {
            "-Inf".to_string()
        };
    }
    let abs_val = val.abs();
    if abs_val < 1e-9 {
        "0".to_string()
    } else if !(1e-2..1e4).contains(&abs_val) {
        format!("{:.1e}", val)
    } else if abs_val >= 100.0 {
        format!("{:.0}", val)
    } else {
        format!("{:.2}", val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_scale_through_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(10 * 1024 * 1024), "10.0 MB");
        assert_eq!(format_bytes(4_700_000_000), "4.4 GB");
    }

    #[test]
    fn axis_labels() {
        assert_eq!(format_axis_label(0.0), "0");
        assert_eq!(format_axis_label(-8.0), "-8.00");
        assert_eq!(format_axis_label(250.0), "250");
        assert_eq!(format_axis_label(f64::NAN), "NaN");
        assert_eq!(format_axis_label(80000.0), "8.0e4");
    }
}
