//! Default page order.
//!
//! Date descending (undated last), then weight ascending (unweighted last),
//! then title, then path key. The sort is stable.

use std::cmp::Ordering;

use crate::core::DateTimeUtc;

/// The fields the default order looks at.
#[derive(Debug, Clone, Copy)]
pub struct SortKey<'a> {
    pub date: DateTimeUtc,
    pub weight: i64,
    pub title: &'a str,
    pub key: &'a str,
}

/// Compare two entries by the default order.
pub fn default_order(a: &SortKey<'_>, b: &SortKey<'_>) -> Ordering {
    by_date_desc(a.date, b.date)
        .then_with(|| by_weight(a.weight, b.weight))
        .then_with(|| a.title.cmp(b.title))
        .then_with(|| a.key.cmp(b.key))
}

/// Sort `items` in place by the default order.
pub fn sort_default<'a, T>(items: &mut [T], key_of: impl Fn(&T) -> SortKey<'a>) {
    items.sort_by(|x, y| default_order(&key_of(x), &key_of(y)));
}

fn by_date_desc(a: DateTimeUtc, b: DateTimeUtc) -> Ordering {
    match (a.is_zero(), b.is_zero()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.cmp(&a),
    }
}

fn by_weight(a: i64, b: i64) -> Ordering {
    match (a == 0, b == 0) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.cmp(&b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key<'a>(date: &str, weight: i64, title: &'a str, path: &'a str) -> SortKey<'a> {
        SortKey {
            date: DateTimeUtc::parse(date).unwrap_or_default(),
            weight,
            title,
            key: path,
        }
    }

    fn sorted<'a>(mut items: Vec<SortKey<'a>>) -> Vec<&'a str> {
        sort_default(&mut items, |k| *k);
        items.iter().map(|k| k.key).collect()
    }

    #[test]
    fn test_date_descending_undated_last() {
        let items = vec![
            key("", 0, "a", "/undated"),
            key("2012-01-01", 0, "b", "/old"),
            key("2013-01-01", 0, "c", "/new"),
        ];
        assert_eq!(sorted(items), ["/new", "/old", "/undated"]);
    }

    #[test]
    fn test_weight_then_title() {
        let items = vec![
            key("", 0, "Alpha", "/unweighted"),
            key("", 2, "Zed", "/w2"),
            key("", 1, "Zed", "/w1"),
            key("", 1, "Beta", "/w1-beta"),
        ];
        assert_eq!(sorted(items), ["/w1-beta", "/w1", "/w2", "/unweighted"]);
    }

    #[test]
    fn test_path_breaks_ties() {
        let items = vec![key("", 0, "Same", "/b"), key("", 0, "Same", "/a")];
        assert_eq!(sorted(items), ["/a", "/b"]);
    }
}
