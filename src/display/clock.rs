//! Clock digits, greeting and date label.

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::settings::record::{ClockFormat, SettingsRecord};

/// Number of digit slots (`HHMMSS`).
pub const DIGIT_SLOTS: usize = 6;

/// One rendering of the clock area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockFace {
    /// `HHMMSS`, always six ASCII digits.
    pub digits: String,
    pub show_seconds: bool,
    pub greeting: String,
    /// e.g. `Friday, October 17`.
    pub date: String,
}

impl ClockFace {
    /// Face for the current local time.
    #[must_use]
    pub fn now(record: &SettingsRecord) -> Self {
        Self::at(&Local::now().naive_local(), record)
    }

    /// Face for `time`. Test mode freezes the digits at zero; the greeting
    /// and date still follow `time`.
    #[must_use]
    pub fn at(time: &NaiveDateTime, record: &SettingsRecord) -> Self {
        let digits = if record.test_mode {
            "000000".to_string()
        } else {
            let hours = display_hour(time.hour(), record.clock_format);
            format!("{hours:02}{:02}{:02}", time.minute(), time.second())
        };
        Self {
            digits,
            show_seconds: record.show_seconds,
            greeting: greeting(time.hour(), record.greeting_name.as_deref()),
            date: date_label(&time.date()),
        }
    }

    /// `HH:MM`, or `HH:MM:SS` when seconds are shown.
    #[must_use]
    pub fn time_text(&self) -> String {
        let d = &self.digits;
        if self.show_seconds {
            format!("{}:{}:{}", &d[0..2], &d[2..4], &d[4..6])
        } else {
            format!("{}:{}", &d[0..2], &d[2..4])
        }
    }

    /// Slots whose digit differs from `previous`; every slot when there is
    /// no previous face.
    #[must_use]
    pub fn changed_digits(&self, previous: Option<&Self>) -> Vec<usize> {
        let Some(previous) = previous else {
            return (0..DIGIT_SLOTS).collect();
        };
        self.digits
            .bytes()
            .zip(previous.digits.bytes())
            .enumerate()
            .filter_map(|(slot, (now, before))| (now != before).then_some(slot))
            .collect()
    }
}

/// Hour as displayed: unchanged for 24h, `1..=12` for 12h.
#[must_use]
pub const fn display_hour(hour: u32, format: ClockFormat) -> u32 {
    match format {
        ClockFormat::TwentyFourHour => hour,
        ClockFormat::TwelveHour => match hour % 12 {
            0 => 12,
            h => h,
        },
    }
}

/// Time-of-day greeting, with the name appended when set.
#[must_use]
pub fn greeting(hour: u32, name: Option<&str>) -> String {
    let base = match hour {
        0..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    };
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("{base}, {name}"),
        None => base.to_string(),
    }
}

/// `Weekday, Month D`.
#[must_use]
pub fn date_label(date: &NaiveDate) -> String {
    date.format("%A, %B %-d").to_string()
}
