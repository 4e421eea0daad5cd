//! Page dates read from front matter.

use serde::Serialize;
use serde_json::Value;

use crate::core::{DateTimeUtc, JsonMap};

/// Published / updated / expiry dates of a page.
///
/// Unset dates are [`DateTimeUtc::ZERO`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Dates {
    pub date: DateTimeUtc,
    pub lastmod: DateTimeUtc,
    pub publish_date: DateTimeUtc,
    pub expiry_date: DateTimeUtc,
}

impl Dates {
    /// Read `date`, `lastmod`, `publishdate` and `expirydate` from a params map
    /// whose keys are already lower-cased.
    ///
    /// `date` falls back to `publishdate`, `lastmod` falls back to `date`.
    /// Returns the dates plus the keys whose values could not be parsed.
    pub fn from_params(params: &JsonMap) -> (Self, Vec<&'static str>) {
        let mut invalid = Vec::new();
        let mut read = |key: &'static str| match params.get(key) {
            None | Some(Value::Null) => DateTimeUtc::ZERO,
            Some(Value::String(s)) => DateTimeUtc::parse(s).unwrap_or_else(|| {
                invalid.push(key);
                DateTimeUtc::ZERO
            }),
            Some(_) => {
                invalid.push(key);
                DateTimeUtc::ZERO
            }
        };

        let publish_date = read("publishdate");
        let expiry_date = read("expirydate");
        let mut date = read("date");
        let mut lastmod = read("lastmod");

        if date.is_zero() {
            date = publish_date;
        }
        if lastmod.is_zero() {
            lastmod = date;
        }

        let dates = Self {
            date,
            lastmod,
            publish_date,
            expiry_date,
        };
        (dates, invalid)
    }

    /// Fill unset `date` / `lastmod` from `other`.
    pub fn or(self, other: Dates) -> Self {
        Self {
            date: if self.date.is_zero() { other.date } else { self.date },
            lastmod: if self.lastmod.is_zero() {
                other.lastmod
            } else {
                self.lastmod
            },
            ..self
        }
    }

    /// Fold a member page into a section aggregate: earliest nonzero `date`,
    /// latest `lastmod`.
    pub fn absorb(&mut self, member: &Dates) {
        if !member.date.is_zero() && (self.date.is_zero() || member.date < self.date) {
            self.date = member.date;
        }
        if member.lastmod > self.lastmod {
            self.lastmod = member.lastmod;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: serde_json::Value) -> JsonMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_dates_defaults() {
        let (dates, invalid) = Dates::from_params(&params(json!({ "date": "2012-01-01" })));
        assert!(invalid.is_empty());
        assert_eq!(dates.date, DateTimeUtc::from_ymd(2012, 1, 1));
        assert_eq!(dates.lastmod, dates.date);
        assert!(dates.publish_date.is_zero());
    }

    #[test]
    fn test_date_falls_back_to_publishdate() {
        let (dates, _) = Dates::from_params(&params(json!({ "publishdate": "2013-05-06" })));
        assert_eq!(dates.date, DateTimeUtc::from_ymd(2013, 5, 6));
        assert_eq!(dates.lastmod, DateTimeUtc::from_ymd(2013, 5, 6));
    }

    #[test]
    fn test_invalid_dates_reported() {
        let (dates, invalid) =
            Dates::from_params(&params(json!({ "date": "yesterday", "lastmod": 5 })));
        assert!(dates.date.is_zero());
        assert_eq!(invalid, ["date", "lastmod"]);
    }

    #[test]
    fn test_absorb() {
        let mut agg = Dates::default();
        let a = Dates {
            date: DateTimeUtc::from_ymd(2012, 3, 1),
            lastmod: DateTimeUtc::from_ymd(2012, 3, 5),
            ..Default::default()
        };
        let b = Dates {
            date: DateTimeUtc::from_ymd(2011, 1, 1),
            lastmod: DateTimeUtc::from_ymd(2011, 1, 1),
            ..Default::default()
        };
        agg.absorb(&a);
        agg.absorb(&b);
        agg.absorb(&Dates::default());
        assert_eq!(agg.date, DateTimeUtc::from_ymd(2011, 1, 1));
        assert_eq!(agg.lastmod, DateTimeUtc::from_ymd(2012, 3, 5));
    }
}
