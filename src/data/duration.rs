//! Millisecond counts rendered as "D days, H hours, M minutes, S seconds".

const MS_PER_SECOND: u64 = 1_000;
const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

/// Whole days/hours/minutes/seconds in `ms`; sub-second remainders are truncated.
fn components(ms: u64) -> (u64, u64, u64, u64) {
    let total = ms / MS_PER_SECOND;
    (
        total / SECONDS_PER_DAY,
        total % SECONDS_PER_DAY / SECONDS_PER_HOUR,
        total % SECONDS_PER_HOUR / SECONDS_PER_MINUTE,
        total % SECONDS_PER_MINUTE,
    )
}

/// Every component is always present, zero or not.
pub fn format_duration(ms: u64) -> String {
    let (d, h, m, s) = components(ms);
    format!("{d} days, {h} hours, {m} minutes, {s} seconds")
}

/// Reproduces the older dashboard output.
///
/// Hours, minutes and seconds are rendered as two-digit fields and then every
/// `'0'` character is removed from them, not only leading zeros: 10 minutes
/// prints as "1 minutes". A field that ends up empty is left out.
pub fn format_duration_legacy(ms: u64) -> String {
    let (d, h, m, s) = components(ms);
    let mut parts = vec![format!("{d} days")];
    for (value, unit) in [(h, "hours"), (m, "minutes"), (s, "seconds")] {
        let digits = format!("{value:02}").replace('0', "");
        if !digits.is_empty() {
            parts.push(format!("{digits} {unit}"));
        }
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_all_components() {
        assert_eq!(format_duration(3_725_000), "0 days, 1 hours, 2 minutes, 5 seconds");
        assert_eq!(format_duration(0), "0 days, 0 hours, 0 minutes, 0 seconds");
        assert_eq!(
            format_duration(2 * 86_400_000 + 999),
            "2 days, 0 hours, 0 minutes, 0 seconds"
        );
    }

    #[test]
    fn legacy_matches_when_no_zero_digits() {
        assert_eq!(
            format_duration_legacy(3_725_000),
            "0 days, 1 hours, 2 minutes, 5 seconds"
        );
    }

    #[test]
    fn legacy_removes_zero_digits_inside_values() {
        // 10 minutes exactly: hours and seconds vanish, "10" loses its zero.
        assert_eq!(format_duration_legacy(600_000), "0 days, 1 minutes");
        // 1 day, 10 h, 20 min, 30 s.
        let ms = (86_400 + 10 * 3_600 + 20 * 60 + 30) * 1_000;
        assert_eq!(
            format_duration_legacy(ms),
            "1 days, 1 hours, 2 minutes, 3 seconds"
        );
        assert_eq!(format_duration(ms), "1 days, 10 hours, 20 minutes, 30 seconds");
    }

    #[test]
    fn legacy_keeps_days_even_when_zero() {
        assert_eq!(format_duration_legacy(0), "0 days");
        assert_eq!(format_duration_legacy(10 * 86_400_000), "10 days");
    }
}
