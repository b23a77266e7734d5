// Relative time descriptions.
// Turns epoch timestamps into phrases like "3 hours ago" or "tomorrow".

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

const UNITS: [(i64, &str); 6] = [
    (MINUTE, "minute"),
    (HOUR, "hour"),
    (DAY, "day"),
    (WEEK, "week"),
    (MONTH, "month"),
    (YEAR, "year"),
];

/// Describe `timestamp` relative to `now` (both epoch seconds).
///
/// Picks the largest unit not exceeding the distance and rounds to it.
pub fn relative_time(timestamp: i64, now: i64) -> String {
    let diff = timestamp - now;

    let (size, unit) = UNITS
        .iter()
        .take_while(|(size, _)| diff.abs() >= *size)
        .last()
        .copied()
        .unwrap_or((1, "second"));

    let amount = (diff as f64 / size as f64).round() as i64;
    phrase(amount, unit)
}

fn phrase(amount: i64, unit: &str) -> String {
    // Calendar units get words for the adjacent period
    let calendar = matches!(unit, "day" | "week" | "month" | "year");
    match amount {
        0 if unit == "second" => return "now".to_string(),
        -1 if unit == "day" => return "yesterday".to_string(),
        1 if unit == "day" => return "tomorrow".to_string(),
        -1 if calendar => return format!("last {unit}"),
        1 if calendar => return format!("next {unit}"),
        _ => {}
    }

    let count = amount.abs();
    let plural = if count == 1 { "" } else { "s" };
    if amount < 0 {
        format!("{count} {unit}{plural} ago")
    } else {
        format!("in {count} {unit}{plural}")
    }
}
