// Parsing for human-written intervals in the config file.
//
// Accepts the compact forms ("30s", "5m", "2h", "1d", "250ms"), the verbose
// forms ("30 seconds", "5 minutes") and a bare number, which is read as
// milliseconds.

use std::time::Duration;

/// Parse a duration string like "5m", "30 seconds" or "90000".
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    if let Ok(millis) = input.parse::<u64>() {
        return Some(Duration::from_millis(millis));
    }

    if let Some(duration) = parse_compact_format(&input) {
        return Some(duration);
    }

    parse_verbose_format(&input)
}

/// Parse compact formats like "250ms", "30s", "5m", "2h", "1d"
fn parse_compact_format(input: &str) -> Option<Duration> {
    // "ms" has to be checked before the single-letter suffixes
    if let Some(num) = input.strip_suffix("ms") {
        let millis: u64 = num.trim().parse().ok()?;
        return Some(Duration::from_millis(millis));
    }

    let (num_str, multiplier) = if let Some(num) = input.strip_suffix('s') {
        (num, 1u64)
    } else if let Some(num) = input.strip_suffix('m') {
        (num, 60)
    } else if let Some(num) = input.strip_suffix('h') {
        (num, 3600)
    } else if let Some(num) = input.strip_suffix('d') {
        (num, 86400)
    } else if let Some(num) = input.strip_suffix('w') {
        (num, 604800)
    } else {
        return None;
    };

    let number: u64 = num_str.trim().parse().ok()?;
    Some(Duration::from_secs(number.checked_mul(multiplier)?))
}

/// Parse verbose formats like "30 minutes", "2 hours", "1 day"
fn parse_verbose_format(input: &str) -> Option<Duration> {
    let parts: Vec<&str> = input.split_whitespace().collect();

    if parts.len() != 2 {
        return None;
    }

    let number: u64 = parts[0].parse().ok()?;

    if matches!(parts[1], "millisecond" | "milliseconds" | "msec" | "msecs") {
        return Some(Duration::from_millis(number));
    }

    let multiplier = match parts[1] {
        "second" | "seconds" | "sec" | "secs" => 1,
        "minute" | "minutes" | "min" | "mins" => 60,
        "hour" | "hours" | "hr" | "hrs" => 3600,
        "day" | "days" => 86400,
        "week" | "weeks" => 604800,
        _ => return None,
    };

    Some(Duration::from_secs(number.checked_mul(multiplier)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_units() {
        assert_eq!(parse_duration("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_duration("5m"), Some(Duration::from_secs(300)));
        assert_eq!(parse_duration("2h"), Some(Duration::from_secs(7200)));
        assert_eq!(parse_duration("1d"), Some(Duration::from_secs(86400)));
        assert_eq!(parse_duration("250ms"), Some(Duration::from_millis(250)));
    }

    #[test]
    fn verbose_units_and_bare_millis() {
        assert_eq!(parse_duration("10 minutes"), Some(Duration::from_secs(600)));
        assert_eq!(parse_duration("1 Hour"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_duration("90000"), Some(Duration::from_secs(90)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("soon"), None);
        assert_eq!(parse_duration("5 fortnights"), None);
        assert_eq!(parse_duration("-5m"), None);
    }
}
