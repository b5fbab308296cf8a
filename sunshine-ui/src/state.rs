use core::fmt::Write as _;

use time::{Month, OffsetDateTime, Weekday};

use crate::icon::Icon;

/// Capacity of a temperature string, in bytes.
pub const TEMPERATURE_LEN: usize = 16;

pub type Temperature = heapless::String<TEMPERATURE_LEN>;
pub type TimeText = heapless::String<8>;
pub type DateText = heapless::String<24>;

/// Everything the face shows. Written by the sync listener and the clock, read when painting.
#[derive(Clone, Default)]
pub struct RenderState {
    time_text: TimeText,
    date_text: DateText,
    high: Option<Temperature>,
    low: Option<Temperature>,
    icon: Option<Icon>,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_high(&mut self, high: &str) {
        self.high = Some(truncated(high));
    }

    pub fn set_low(&mut self, low: &str) {
        self.low = Some(truncated(low));
    }

    pub fn set_icon(&mut self, icon: Icon) {
        self.icon = Some(icon);
    }

    pub fn high(&self) -> Option<&str> {
        self.high.as_deref()
    }

    pub fn low(&self) -> Option<&str> {
        self.low.as_deref()
    }

    pub fn icon(&self) -> Option<&Icon> {
        self.icon.as_ref()
    }

    /// High and low together, or nothing if either is still missing.
    pub fn temperature(&self) -> Option<(&str, &str)> {
        match (&self.high, &self.low) {
            (Some(high), Some(low)) => Some((high.as_str(), low.as_str())),
            _ => None,
        }
    }

    pub fn time_text(&self) -> &str {
        &self.time_text
    }

    pub fn date_text(&self) -> &str {
        &self.date_text
    }

    /// Re-derive the time and date strings from local wall-clock time.
    ///
    /// Time is `H:MM` without seconds, date is `EEE, MMM d yyyy`.
    pub fn refresh_clock(&mut self, now: OffsetDateTime) {
        self.time_text.clear();
        // Both strings fit their buffers for any representable date.
        let _ = write!(self.time_text, "{}:{:02}", now.hour(), now.minute());

        self.date_text.clear();
        let _ = write!(
            self.date_text,
            "{}, {} {} {}",
            weekday_abbrev(now.weekday()),
            month_abbrev(now.month()),
            now.day(),
            now.year()
        );
    }
}

fn truncated(text: &str) -> Temperature {
    let mut end = text.len().min(TEMPERATURE_LEN);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = Temperature::new();
    let _ = out.push_str(&text[..end]);
    out
}

fn weekday_abbrev(day: Weekday) -> &'static str {
    match day {
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tue",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thu",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
        Weekday::Sunday => "Sun",
    }
}

fn month_abbrev(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}
