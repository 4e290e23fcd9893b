//! Human-readable time strings for logs and summaries.

/// `HH:MM:SS`, flooring fractions and clamping negatives to zero.
pub fn format_hms(seconds: f64) -> String {
    let s = whole_secs(seconds);
    format!("{:02}:{:02}:{:02}", s / 3600, (s / 60) % 60, s % 60)
}

/// `45s`, `2m`, or `2m 05s`.
pub fn format_short(seconds: f64) -> String {
    let s = whole_secs(seconds);
    let (m, r) = (s / 60, s % 60);
    match (m, r) {
        (0, _) => format!("{s}s"),
        (_, 0) => format!("{m}m"),
        _      => format!("{m}m {r:02}s"),
    }
}

fn whole_secs(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    }
}
