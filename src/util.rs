use std::time::Duration;

/// User-Agent attached to outbound requests when configuration sets none.
pub const DEFAULT_USER_AGENT: &str = concat!("guardia-probe/", env!("CARGO_PKG_VERSION"));

/// Parse a duration string like "30s", "500ms", "1.5m" or "2h45m".
///
/// Accepts one or more `<decimal><unit>` segments with units
/// ns, us, µs, ms, s, m, h. Returns `None` for anything malformed,
/// including a bare number without a unit.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let mut rest = input.trim();
    if rest.is_empty() {
        return None;
    }

    let mut total = Duration::ZERO;
    while !rest.is_empty() {
        let number_end = rest.find(|c: char| !c.is_ascii_digit() && c != '.')?;
        if number_end == 0 {
            return None;
        }
        let value: f64 = rest[..number_end].parse().ok()?;
        rest = &rest[number_end..];

        // "ms"/"us"/"ns" before the bare "s"/"m" units
        let (unit_len, nanos_per_unit) = if rest.starts_with("ns") {
            (2, 1.0)
        } else if rest.starts_with("us") {
            (2, 1_000.0)
        } else if rest.starts_with("µs") {
            ("µs".len(), 1_000.0)
        } else if rest.starts_with("ms") {
            (2, 1_000_000.0)
        } else if rest.starts_with('s') {
            (1, 1_000_000_000.0)
        } else if rest.starts_with('m') {
            (1, 60.0 * 1_000_000_000.0)
        } else if rest.starts_with('h') {
            (1, 3_600.0 * 1_000_000_000.0)
        } else {
            return None;
        };
        rest = &rest[unit_len..];

        total += Duration::from_nanos((value * nanos_per_unit) as u64);
    }

    Some(total)
}
