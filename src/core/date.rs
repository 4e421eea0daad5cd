//! UTC datetime without timezone dependencies.
//!
//! Front matter dates are parsed into [`DateTimeUtc`], which orders
//! chronologically and treats the all-zero value as "unset".
//!
//! # Accepted formats
//!
//! - `YYYY-MM-DD`
//! - `YYYY-MM-DDTHH:MM:SSZ`
//! - `YYYY-MM-DD HH:MM:SS`

use std::fmt;

use anyhow::{Result, bail};
use serde::{Serialize, Serializer};

/// UTC datetime without timezone complexity.
///
/// Field order matches significance, so the derived `Ord` is chronological.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTimeUtc {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTimeUtc {
    /// The unset date.
    pub const ZERO: Self = Self::new(0, 0, 0, 0, 0, 0);

    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    pub const fn from_ymd(year: u16, month: u8, day: u8) -> Self {
        Self::new(year, month, day, 0, 0, 0)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Parse one of the accepted formats. Surrounding whitespace and quotes
    /// left over from loosely typed front matter are ignored.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.trim().trim_matches('"').as_bytes();

        if bytes.len() < 10 {
            return None;
        }

        let year = parse_u16(&bytes[0..4])?;
        if bytes[4] != b'-' {
            return None;
        }
        let month = parse_u8(&bytes[5..7])?;
        if bytes[7] != b'-' {
            return None;
        }
        let day = parse_u8(&bytes[8..10])?;

        let (hour, minute, second) = match bytes.len() {
            10 => (0, 0, 0),
            19 | 20 => {
                let sep_ok = matches!(bytes[10], b'T' | b' ');
                let zone_ok = bytes.len() == 19 || bytes[19] == b'Z';
                if !sep_ok || !zone_ok || bytes[13] != b':' || bytes[16] != b':' {
                    return None;
                }
                (
                    parse_u8(&bytes[11..13])?,
                    parse_u8(&bytes[14..16])?,
                    parse_u8(&bytes[17..19])?,
                )
            }
            _ => return None,
        };

        let dt = Self::new(year, month, day, hour, minute, second);
        dt.validate().ok()?;
        Some(dt)
    }

    pub fn validate(&self) -> Result<()> {
        let Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        } = *self;

        if !(1..=12).contains(&month) {
            bail!("month is invalid: {month}");
        }

        let max_days = Self::days_in_month(year, month);
        if day == 0 || day > max_days {
            bail!("day is invalid: {day}");
        }
        if hour > 23 {
            bail!("hour is invalid: {hour}");
        }
        if minute > 59 {
            bail!("minute is invalid: {minute}");
        }
        if second > 59 {
            bail!("second is invalid: {second}");
        }

        Ok(())
    }

    #[inline]
    #[allow(clippy::manual_is_multiple_of)] // Manual impl for const fn
    const fn is_leap_year(year: u16) -> bool {
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    #[inline]
    const fn days_in_month(year: u16, month: u8) -> u8 {
        match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if Self::is_leap_year(year) => 29,
            2 => 28,
            _ => 0,
        }
    }

    /// Format as RFC 3339: `YYYY-MM-DDTHH:MM:SSZ`
    pub fn to_rfc3339(self) -> String {
        format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

impl fmt::Display for DateTimeUtc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("-");
        }
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl Serialize for DateTimeUtc {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_zero() {
            serializer.serialize_none()
        } else {
            serializer.serialize_str(&self.to_rfc3339())
        }
    }
}

/// Parse 2-digit ASCII number
#[inline]
fn parse_u8(bytes: &[u8]) -> Option<u8> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = bytes[0].wrapping_sub(b'0');
    let d2 = bytes[1].wrapping_sub(b'0');
    if d1 > 9 || d2 > 9 {
        return None;
    }
    Some(d1 * 10 + d2)
}

/// Parse 4-digit ASCII number
#[inline]
fn parse_u16(bytes: &[u8]) -> Option<u16> {
    if bytes.len() != 4 {
        return None;
    }
    let mut result = 0u16;
    for &b in bytes {
        let d = b.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        result = result * 10 + u16::from(d);
    }
    Some(result)
}
