// src/config/duration.rs

use std::time::Duration;

/// Parse a duration such as `"500ms"`, `"3s"`, `"2m"` or `"1h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let text = s.trim();
    let split = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (digits, unit) = text.split_at(split);

    if digits.is_empty() {
        return Err(format!("duration '{text}' must start with a number"));
    }
    if unit.is_empty() {
        return Err(format!("duration '{text}' needs a unit (ms, s, m or h)"));
    }

    let value: u64 = digits
        .parse()
        .map_err(|e| format!("duration '{text}': {e}"))?;

    let secs_per_unit = match unit.trim().to_ascii_lowercase().as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        other => return Err(format!("duration '{text}': unknown unit '{other}'")),
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{text}' overflows"))
}
