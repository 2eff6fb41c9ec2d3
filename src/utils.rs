use serde_json::Value;

/// Parse ISO8601 duration string (PT1H2M3S) to total seconds
pub fn parse_iso8601_duration_to_seconds(duration_str: &str) -> i64 {
    if duration_str.is_empty() {
        return 0;
    }

    // Simple parser for PT format (PT1H2M3S)
    let Some(duration_part) = duration_str.strip_prefix("PT") else {
        return 0;
    };

    let mut total_seconds = 0.0;
    let mut current_number = String::new();

    for ch in duration_part.chars() {
        if ch.is_ascii_digit() || ch == '.' {
            current_number.push(ch);
        } else {
            if let Ok(num) = current_number.parse::<f64>() {
                match ch {
                    'H' => total_seconds += num * 3600.0, // Hours
                    'M' => total_seconds += num * 60.0,   // Minutes
                    'S' => total_seconds += num,          // Seconds
                    _ => {}
                }
            }
            current_number.clear();
        }
    }

    total_seconds as i64
}

/// The Data API serializes statistics counts as strings ("12345"); accept
/// either a JSON string or a JSON number, otherwise None.
pub fn count_value(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        Some(n)
    } else if let Some(s) = value.as_str() {
        s.parse().ok()
    } else {
        None
    }
}

pub fn string_value(value: &Value) -> Option<String> {
    value.as_str().map(|s| s.to_string())
}
