//! Wall-clock appointment slots.

use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

const SLOT_TIME_FORMAT: &str = "%H:%M";

/// Errors raised when parsing a [`TimeSlot`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotValidationError {
    /// A bound was not a zero-padded `HH:MM` string.
    #[error("{field} must be a wall-clock time formatted as HH:MM, got {value:?}")]
    InvalidTime {
        /// Which bound failed.
        field: &'static str,
        /// Raw input.
        value: String,
    },
    /// The slot does not move forward in time.
    #[error("slot start {start} must be before end {end}")]
    EmptyRange {
        /// Start bound.
        start: String,
        /// End bound.
        end: String,
    },
}

/// A start/end pair within a single calendar day.
///
/// The slot duration is not constrained here; callers decide what a bookable
/// window looks like.
///
/// # Examples
/// ```
/// use telecare::domain::TimeSlot;
///
/// let slot = TimeSlot::parse("09:00", "10:00").expect("valid slot");
/// assert_eq!(slot.start_time(), "09:00");
/// assert!(TimeSlot::parse("10:00", "09:00").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TimeSlotDto", into = "TimeSlotDto")]
pub struct TimeSlot {
    start: NaiveTime,
    end: NaiveTime,
}

fn parse_bound(field: &'static str, value: &str) -> Result<NaiveTime, SlotValidationError> {
    let invalid = || SlotValidationError::InvalidTime {
        field,
        value: value.to_owned(),
    };
    if value.len() != 5 {
        return Err(invalid());
    }
    NaiveTime::parse_from_str(value, SLOT_TIME_FORMAT).map_err(|_| invalid())
}

impl TimeSlot {
    /// Parse `HH:MM` bounds.
    pub fn parse(start: &str, end: &str) -> Result<Self, SlotValidationError> {
        let start_time = parse_bound("startTime", start)?;
        let end_time = parse_bound("endTime", end)?;
        Self::new(start_time, end_time)
    }

    /// Build a slot from parsed times.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, SlotValidationError> {
        if start >= end {
            return Err(SlotValidationError::EmptyRange {
                start: start.format(SLOT_TIME_FORMAT).to_string(),
                end: end.format(SLOT_TIME_FORMAT).to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Start bound.
    pub const fn start(&self) -> NaiveTime {
        self.start
    }

    /// End bound.
    pub const fn end(&self) -> NaiveTime {
        self.end
    }

    /// Start bound formatted as `HH:MM`.
    pub fn start_time(&self) -> String {
        self.start.format(SLOT_TIME_FORMAT).to_string()
    }

    /// End bound formatted as `HH:MM`.
    pub fn end_time(&self) -> String {
        self.end.format(SLOT_TIME_FORMAT).to_string()
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_time(), self.end_time())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeSlotDto {
    start_time: String,
    end_time: String,
}

impl TryFrom<TimeSlotDto> for TimeSlot {
    type Error = SlotValidationError;

    fn try_from(value: TimeSlotDto) -> Result<Self, Self::Error> {
        Self::parse(&value.start_time, &value.end_time)
    }
}

impl From<TimeSlot> for TimeSlotDto {
    fn from(value: TimeSlot) -> Self {
        Self {
            start_time: value.start_time(),
            end_time: value.end_time(),
        }
    }
}
