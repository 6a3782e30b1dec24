use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Years a booking date may carry. Stored dates stay four digits wide so
/// text comparison in SQL matches calendar order.
pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

/// Half-open time range `[start, end)` occupied by an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    /// `None` when the end falls outside the representable calendar.
    pub fn starting_at(start: NaiveDateTime, duration_minutes: i32) -> Option<Self> {
        let end = start.checked_add_signed(Duration::minutes(duration_minutes as i64))?;
        Some(Self { start, end })
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Opening hours of the clinic and the grid appointments start on.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessHours {
    open: NaiveTime,
    close: NaiveTime,
    slot_minutes: u32,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(8, 0, 0).expect("08:00 is a valid time"),
            close: NaiveTime::from_hms_opt(18, 0, 0).expect("18:00 is a valid time"),
            slot_minutes: 30,
        }
    }
}

impl BusinessHours {
    pub fn new(open: NaiveTime, close: NaiveTime, slot_minutes: u32) -> anyhow::Result<Self> {
        anyhow::ensure!(open < close, "opening time {open} must be before closing time {close}");
        anyhow::ensure!(slot_minutes > 0, "slot length must be positive");
        Ok(Self {
            open,
            close,
            slot_minutes,
        })
    }

    pub fn opens_at(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.open)
    }

    pub fn closes_at(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.close)
    }

    /// Every grid-aligned start time in `[open, close)` on `date`.
    pub fn candidate_starts(&self, date: NaiveDate) -> Vec<NaiveDateTime> {
        let step = Duration::minutes(self.slot_minutes as i64);
        let close = self.closes_at(date);

        let mut starts = vec![];
        let mut current = self.opens_at(date);
        while current < close {
            starts.push(current);
            current += step;
        }
        starts
    }

    /// An interval fits when it ends no later than closing time on the day it starts.
    pub fn fits(&self, interval: &Interval) -> bool {
        interval.end <= self.closes_at(interval.start.date())
    }

    pub fn to_human_readable(&self) -> String {
        format!(
            "{}-{}",
            self.open.format(TIME_FORMAT),
            self.close.format(TIME_FORMAT)
        )
    }
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .ok()
        .filter(|d| (MIN_YEAR..=MAX_YEAR).contains(&d.year()))
}

pub fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), TIME_FORMAT).ok()
}
