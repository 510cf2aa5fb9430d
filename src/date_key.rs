//! Canonical `YYYY-MM-DD` date keys.
//!
//! A [`DateKey`] is the sole identity of a day's task list. Months are
//! 0-indexed everywhere in the API (0 = January) and 1-indexed only inside
//! the string form.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const KEY_LEN: usize = 10;
/// Largest year a key can hold.
pub const MAX_YEAR: i32 = 9999;

/// A validated calendar date in its canonical key form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Build a key from a year, 0-indexed month and 1-indexed day.
    pub fn encode(year: i32, month0: u32, day: u32) -> Result<Self> {
        if !(0..=MAX_YEAR).contains(&year) {
            return Err(Error::MalformedKey(format!(
                "year {year} cannot be written as four digits"
            )));
        }
        NaiveDate::from_ymd_opt(year, month0 + 1, day)
            .map(DateKey)
            .ok_or_else(|| {
                Error::MalformedKey(format!(
                    "{year:04}-{:02}-{day:02} is not a calendar date",
                    month0 + 1
                ))
            })
    }

    /// Parse a canonical key string.
    pub fn parse(key: &str) -> Result<Self> {
        let (year, month0, day) = decode(key)?;
        Self::encode(year, month0, day)
    }

    /// Key for a date already known to be valid.
    ///
    /// Dates past year 9999 are not representable and are rejected.
    pub fn from_date(date: NaiveDate) -> Result<Self> {
        Self::encode(date.year(), date.month0(), date.day())
    }

    /// Key for the local current date.
    pub fn today() -> Result<Self> {
        Self::from_date(Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month0(&self) -> u32 {
        self.0.month0()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// The `(year, month0, day)` triple this key encodes.
    pub fn parts(&self) -> (i32, u32, u32) {
        (self.year(), self.month0(), self.day())
    }
}

/// Encode a triple as a key string.
pub fn encode(year: i32, month0: u32, day: u32) -> Result<String> {
    DateKey::encode(year, month0, day).map(|key| key.to_string())
}

/// Decode a key string into `(year, month0, day)`.
///
/// Only the fixed-width `DDDD-DD-DD` form is accepted, and it must name a
/// real calendar date.
pub fn decode(key: &str) -> Result<(i32, u32, u32)> {
    let malformed = || Error::MalformedKey(key.to_string());

    let bytes = key.as_bytes();
    if bytes.len() != KEY_LEN || bytes[4] != b'-' || bytes[7] != b'-' {
        return Err(malformed());
    }
    let all_digits = bytes
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != 4 && *idx != 7)
        .all(|(_, b)| b.is_ascii_digit());
    if !all_digits {
        return Err(malformed());
    }

    let year: i32 = key[0..4].parse().map_err(|_| malformed())?;
    let month: u32 = key[5..7].parse().map_err(|_| malformed())?;
    let day: u32 = key[8..10].parse().map_err(|_| malformed())?;
    if month == 0 || NaiveDate::from_ymd_opt(year, month, day).is_none() {
        return Err(malformed());
    }
    Ok((year, month - 1, day))
}

/// Number of days in a 0-indexed month.
pub fn days_in_month(year: i32, month0: u32) -> Result<u32> {
    if month0 > 11 {
        return Err(Error::InvalidArgument(format!(
            "month {month0} out of range (expected 0-11)"
        )));
    }
    let first_of_next = if month0 == 11 {
        year.checked_add(1).and_then(|next| NaiveDate::from_ymd_opt(next, 1, 1))
    } else {
        NaiveDate::from_ymd_opt(year, month0 + 2, 1)
    };
    first_of_next
        .and_then(|date| date.pred_opt())
        .map(|date| date.day())
        .ok_or_else(|| Error::InvalidArgument(format!("year {year} out of range")))
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day()
        )
    }
}

impl FromStr for DateKey {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        DateKey::parse(s)
    }
}

impl TryFrom<String> for DateKey {
    type Error = Error;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        DateKey::parse(&value)
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}
