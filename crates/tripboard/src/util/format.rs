use jiff::Timestamp;
use jiff::tz::TimeZone;
use tripboard_core::dates::format_date;

/// Group digits in threes: `1200` -> `1,200`
fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut result = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a price in euros, e.g. `€ 1,200`
pub fn format_price(value: u64) -> String {
    format!("€ {}", thousands(value))
}

/// Short day label used for day groups and trip dates, e.g. `MAR 18`
pub fn day_label(ts: Timestamp, tz: &TimeZone) -> String {
    format_date(ts, "%b %d", tz).to_uppercase()
}

pub fn clock_label(ts: Timestamp, tz: &TimeZone) -> String {
    format_date(ts, "%H:%M", tz)
}

/// Cities visited in order; three or fewer are listed, longer trips show
/// only the ends.
pub fn trip_route<'a>(cities: impl IntoIterator<Item = &'a str>) -> String {
    let mut route: Vec<&str> = Vec::new();
    for city in cities {
        if city.is_empty() || route.last() == Some(&city) {
            continue;
        }
        route.push(city);
    }
    match route.as_slice() {
        [] => String::new(),
        [first, .., last] if route.len() > 3 => format!("{first} - ... - {last}"),
        _ => route.join(" - "),
    }
}

/// Date span of the whole trip: `MAR 18 - 20` or `MAR 30 - APR 02`
pub fn trip_dates(start: Timestamp, end: Timestamp, tz: &TimeZone) -> String {
    let from = day_label(start, tz);
    let to = day_label(end, tz);
    if from == to {
        return from;
    }
    let same_month = format_date(start, "%Y%m", tz) == format_date(end, "%Y%m", tz);
    if same_month {
        format!("{from} - {}", format_date(end, "%d", tz))
    } else {
        format!("{from} - {to}")
    }
}
