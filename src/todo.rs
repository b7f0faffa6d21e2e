// todo.rs

use chrono::{Datelike, Local, Weekday};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A todo as the server owns it. Never edited locally.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TodoItem {
    #[serde(alias = "_id", deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub day: String,
    #[serde(default)]
    pub complete: bool,
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("unsupported todo id: {}", other))),
    }
}

/// The new-todo form contents, sent as the body of `POST /todos`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub struct NewTodoDraft {
    pub name: String,
    pub description: String,
    pub day: String,
    pub complete: bool,
}

impl NewTodoDraft {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.description.is_empty() && self.day.is_empty() && !self.complete
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Text field behind `field`, `None` for the checkbox.
    pub fn text_mut(&mut self, field: DraftField) -> Option<&mut String> {
        match field {
            DraftField::Name => Some(&mut self.name),
            DraftField::Description => Some(&mut self.description),
            DraftField::Day => Some(&mut self.day),
            DraftField::Complete => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DraftField {
    Name,
    Description,
    Day,
    Complete,
}

impl DraftField {
    pub const ALL: [DraftField; 4] = [
        DraftField::Name,
        DraftField::Description,
        DraftField::Day,
        DraftField::Complete,
    ];

    pub fn next(self) -> Self {
        match self {
            DraftField::Name => DraftField::Description,
            DraftField::Description => DraftField::Day,
            DraftField::Day => DraftField::Complete,
            DraftField::Complete => DraftField::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            DraftField::Name => DraftField::Complete,
            DraftField::Description => DraftField::Name,
            DraftField::Day => DraftField::Description,
            DraftField::Complete => DraftField::Day,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DraftField::Name => "Name",
            DraftField::Description => "Description",
            DraftField::Day => "Day",
            DraftField::Complete => "Complete",
        }
    }
}

fn parse_weekday_name(s: &str) -> Option<Weekday> {
    match s {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thur" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn today() -> &'static str {
    weekday_name(Local::now().weekday())
}

/// Canonicalizes user-typed days against `today`. Unknown input is kept
/// as typed (trimmed) since the server decides what a day is.
pub fn normalize_day_from(input: &str, today: Weekday) -> String {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();
    match lower.as_str() {
        "today" => weekday_name(today).to_string(),
        "tomorrow" | "tmr" => weekday_name(today.succ()).to_string(),
        other => match parse_weekday_name(other) {
            Some(day) => weekday_name(day).to_string(),
            None => trimmed.to_string(),
        },
    }
}

pub fn normalize_day(input: &str) -> String {
    normalize_day_from(input, Local::now().weekday())
}
