//! Wall-clock primitives for weekly timetables.
//!
//! A timetable slot is a weekday plus a half-open `[start, end)` range of
//! wall-clock minutes. Dates never appear here: every assignment repeats
//! weekly for the whole term.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Minute-granularity time of day, rendered as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Build from hour and minute. Returns `None` when out of range.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Minutes elapsed since midnight.
    pub fn minutes_since_midnight(&self) -> u32 {
        self.0.hour() * 60 + self.0.minute()
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }
}

impl From<NaiveTime> for ClockTime {
    /// Seconds and sub-seconds are dropped.
    fn from(t: NaiveTime) -> Self {
        Self(NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or(t))
    }
}

impl From<ClockTime> for NaiveTime {
    fn from(t: ClockTime) -> Self {
        t.0
    }
}

impl FromStr for ClockTime {
    type Err = String;

    /// Accepts `HH:MM` and the `HH:MM:SS` form SQL `TIME` columns emit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        NaiveTime::parse_from_str(s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
            .map(ClockTime::from)
            .map_err(|e| format!("invalid time of day '{}': {}", s, e))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Teaching day. Serialized as 1 (Monday) through 6 (Saturday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    pub const ALL: [Weekday; 6] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    pub fn number(&self) -> u8 {
        match self {
            Weekday::Monday => 1,
            Weekday::Tuesday => 2,
            Weekday::Wednesday => 3,
            Weekday::Thursday => 4,
            Weekday::Friday => 5,
            Weekday::Saturday => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
        }
    }
}

impl TryFrom<u8> for Weekday {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Weekday::ALL
            .get((n as usize).wrapping_sub(1))
            .copied()
            .ok_or_else(|| format!("day of week must be between 1 and 6, got {}", n))
    }
}

impl TryFrom<i16> for Weekday {
    type Error = String;

    fn try_from(n: i16) -> Result<Self, Self::Error> {
        u8::try_from(n)
            .map_err(|_| format!("day of week must be between 1 and 6, got {}", n))
            .and_then(Weekday::try_from)
    }
}

impl From<Weekday> for u8 {
    fn from(day: Weekday) -> Self {
        day.number()
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One weekly occurrence: a day and a half-open `[start, end)` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSlot {
    pub day: Weekday,
    pub start: ClockTime,
    pub end: ClockTime,
}

impl TimeSlot {
    pub fn new(day: Weekday, start: ClockTime, end: ClockTime) -> Self {
        Self { day, start, end }
    }

    /// A slot must have positive length.
    pub fn is_well_formed(&self) -> bool {
        self.start < self.end
    }

    /// Length of the slot in hours; zero for degenerate slots.
    pub fn duration_hours(&self) -> f64 {
        if !self.is_well_formed() {
            return 0.0;
        }
        let minutes = self.end.minutes_since_midnight() - self.start.minutes_since_midnight();
        minutes as f64 / 60.0
    }

    /// Two slots collide when they fall on the same day and their intervals intersect.
    pub fn collides_with(&self, other: &TimeSlot) -> bool {
        self.day == other.day
            && crate::services::overlap::intervals_overlap(
                (self.start, self.end),
                (other.start, other.end),
            )
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-{}", self.day, self.start, self.end)
    }
}
