/// Placeholder shown where a duration cannot be computed.
pub const EM_DASH: &str = "—";

/// Formats a millisecond duration for display.
///
/// Components truncate toward zero, they never round: `>= 1h` renders as
/// `{h}h {m}m`, `>= 1m` as `{m}m {s}s`, anything else as `{s}s`. Negative
/// input renders the em-dash placeholder.
pub fn format_duration_ms(ms: i64) -> String {
    if ms < 0 {
        return EM_DASH.to_string();
    }

    let total_secs = ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Formats a 0..1 rate as a percentage with one decimal.
pub fn format_rate(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}
