//! Human-editable timestamps
//!
//! `H:MM:SS`, `MM:SS` or `SS`, with optional decimals, in the shortest form
//! that fits and without a leading zero on the leftmost field.

/// Decimals beyond this are not representable in the integer arithmetic below.
const MAX_DECIMALS: usize = 9;

/// Seconds in whole units of `10^-decimals`.
fn to_units(secs: f64, decimals: usize) -> (u64, u64) {
    let scale = 10u64.pow(decimals.min(MAX_DECIMALS) as u32);
    ((secs.max(0.0) * scale as f64).round() as u64, scale)
}

/// Round seconds to the precision a timestamp with `decimals` shows.
pub fn round_secs(secs: f64, decimals: usize) -> f64 {
    let (units, scale) = to_units(secs, decimals);
    units as f64 / scale as f64
}

/// Format seconds as a display timestamp.
///
/// The value is rounded to the requested precision before it is split into
/// fields, so 59.6s at zero decimals reads `1:00`, never `60`.
pub fn format_timestamp(secs: f64, decimals: usize) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    let (units, scale) = to_units(secs, decimals);

    let whole = units / scale;
    let frac = units % scale;
    let hours = whole / 3600;
    let minutes = (whole % 3600) / 60;
    let seconds = whole % 60;

    let sec_field = if decimals == 0 {
        format!("{:02}", seconds)
    } else {
        format!("{:02}.{:0width$}", seconds, frac, width = decimals)
    };

    let ts = if hours > 0 {
        format!("{:02}:{:02}:{}", hours, minutes, sec_field)
    } else if minutes > 0 {
        format!("{:02}:{}", minutes, sec_field)
    } else {
        sec_field
    };

    match ts.strip_prefix('0') {
        Some(rest) => rest.to_string(),
        None => ts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_only() {
        assert_eq!(format_timestamp(5.0, 0), "5");
        assert_eq!(format_timestamp(42.0, 0), "42");
        assert_eq!(format_timestamp(0.0, 0), "0");
    }

    #[test]
    fn test_minutes() {
        assert_eq!(format_timestamp(65.0, 0), "1:05");
        assert_eq!(format_timestamp(754.0, 0), "12:34");
    }

    #[test]
    fn test_hours() {
        assert_eq!(format_timestamp(3725.0, 0), "1:02:05");
        assert_eq!(format_timestamp(3600.0, 0), "1:00:00");
        assert_eq!(format_timestamp(36000.0, 0), "10:00:00");
    }

    #[test]
    fn test_decimals() {
        assert_eq!(format_timestamp(5.25, 2), "5.25");
        assert_eq!(format_timestamp(0.0, 1), "0.0");
        assert_eq!(format_timestamp(62.5, 1), "1:02.5");
        assert_eq!(format_timestamp(12.0, 1), "12.0");
    }

    #[test]
    fn test_rounding_carries_into_minutes() {
        assert_eq!(format_timestamp(59.6, 0), "1:00");
        assert_eq!(format_timestamp(119.96, 1), "2:00.0");
    }

    #[test]
    fn test_round_secs_matches_display() {
        assert_eq!(round_secs(57.5, 0), 58.0);
        assert_eq!(round_secs(10.25, 1), 10.3);
        assert_eq!(round_secs(-1.0, 2), 0.0);
        assert_eq!(format_timestamp(round_secs(59.6, 0), 0), format_timestamp(59.6, 0));
    }

    #[test]
    fn test_negative_clamped() {
        assert_eq!(format_timestamp(-3.0, 0), "0");
    }
}
