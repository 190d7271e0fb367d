const UNITS: [(i64, &str); 3] = [(86_400, "day"), (3_600, "hour"), (60, "minute")];

/// Coarse "N units ago" description of the time between `start` and `end`
/// (unix seconds).
///
/// Anything under a minute, including a negative span, is `"just now"`.
/// The unit count is truncated, never rounded.
pub fn describe(start: f64, end: f64) -> String {
    let diff = (end - start).floor() as i64;

    let Some((threshold, unit)) = UNITS.into_iter().find(|(t, _)| diff >= *t) else {
        return "just now".to_string();
    };
    let units = diff / threshold;
    let plural = if units > 1 { "s" } else { "" };
    format!("{units} {unit}{plural} ago")
}
