//! Человекочитаемые даты: «2 hours ago», «Yesterday», «Dec 4, 2025».

use std::fmt::Display;

use chrono::{DateTime, Duration, TimeZone};

/// Дата поста, если сервер её не прислал.
pub const MISSING_POST_DATE: &str = "Jan 1, 2025";
/// Дата комментария, если сервер её не прислал.
pub const MISSING_COMMENT_DATE: &str = "Just now";

/// Дата относительно `now`: для сегодняшних «N minutes ago», для вчерашних
/// «Yesterday», иначе `Dec 4, 2025`.
pub fn format_date<Tz>(date: &DateTime<Tz>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let day = date.date_naive();
    let today = now.date_naive();
    if day == today {
        return format_relative(date, now);
    }
    if today.pred_opt() == Some(day) {
        return "Yesterday".to_string();
    }
    date.format("%b %-d, %Y").to_string()
}

/// Дата и время: `Dec 4, 2025 at 3:30 PM`.
pub fn format_date_time<Tz>(date: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    date.format("%b %-d, %Y at %-I:%M %p").to_string()
}

/// Относительное время: `about 2 hours ago`, `in 5 minutes`.
pub fn format_relative<Tz: TimeZone>(date: &DateTime<Tz>, now: &DateTime<Tz>) -> String {
    let delta = now.clone().signed_duration_since(date.clone());
    let distance = describe(delta.abs());
    if delta < Duration::zero() {
        format!("in {distance}")
    } else {
        format!("{distance} ago")
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

fn describe(delta: Duration) -> String {
    let seconds = delta.num_seconds();
    let minutes = (seconds + 30) / 60;
    match minutes {
        0 => "less than a minute".to_string(),
        1..45 => plural(minutes, "minute"),
        45..90 => "about 1 hour".to_string(),
        90..1440 => format!("about {}", plural((minutes + 30) / 60, "hour")),
        1440..43200 => plural((minutes + 720) / 1440, "day"),
        43200..525600 => plural((minutes + 21600) / 43200, "month"),
        _ => format!("about {}", plural(minutes / 525600, "year")),
    }
}
