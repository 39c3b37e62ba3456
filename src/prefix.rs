use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;

pub const PREFIX_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

///the namespace for this run's objects, from local time truncated to the second
pub fn build_prefix() -> String {
    format_prefix(&Local::now())
}

pub fn format_prefix<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    time.format(PREFIX_FORMAT).to_string()
}
