use chrono::{DateTime, Local, Utc};

use hanzi_review_lib::review::{format_interval, is_due};
use hanzi_review_lib::{Grade, ReviewItem, Timestamp};

/// ANSI color codes
#[allow(dead_code)]
pub struct Color;

#[allow(dead_code)]
impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
}

pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

pub fn grade_color(grade: Grade) -> &'static str {
    match grade {
        Grade::Again => Color::RED,
        Grade::Hard => Color::YELLOW,
        Grade::Good => Color::GREEN,
        Grade::Easy => Color::CYAN,
    }
}

/// Local date and time for an epoch-millisecond timestamp
pub fn format_timestamp(ms: Timestamp) -> String {
    match DateTime::<Utc>::from_timestamp_millis(ms) {
        Some(dt) => dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => "?".to_string(),
    }
}

/// "new", "due", or the time until the next review
pub fn format_next_review(item: &ReviewItem, now: Timestamp) -> String {
    match item.scheduled_at() {
        None => "new".to_string(),
        Some(_) if is_due(item.next_review_at, now) => "due".to_string(),
        Some(at) => {
            let days = (at - now) / hanzi_review_lib::review::DAY_MS;
            format!("in {}", format_interval(days.max(1)))
        }
    }
}

pub fn percent(p: f64) -> String {
    format!("{:>3.0}%", p * 100.0)
}
