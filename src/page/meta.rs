//! Page metadata resolved from front matter and inherited cascade.

use serde::Serialize;
use serde_json::Value;

use super::Dates;
use crate::core::JsonMap;

/// Metadata of a content node, set once by the cascade propagator.
///
/// # Standard Fields
///
/// | Field    | Front matter key | Description                          |
/// |----------|------------------|--------------------------------------|
/// | `title`  | `title`          | Page title                           |
/// | `weight` | `weight`         | Sort weight, `0` means unweighted    |
/// | `draft`  | `draft`          | Draft status (default: false)        |
/// | `dates`  | `date`, ...      | See [`Dates`]                        |
///
/// `params` holds every merged key (own front matter plus inherited
/// cascade), top-level keys lower-cased. The node's own `cascade` block is
/// kept apart in `cascade` and never appears in `params`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub weight: i64,
    pub draft: bool,
    #[serde(flatten)]
    pub dates: Dates,
    pub params: JsonMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cascade: Option<JsonMap>,
}

impl PageMeta {
    /// Build from merged params.
    ///
    /// Returns the metadata plus the date keys that failed to parse.
    pub fn from_params(params: JsonMap, cascade: Option<JsonMap>) -> (Self, Vec<&'static str>) {
        let title = match params.get("title") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        let weight = match params.get("weight") {
            Some(Value::Number(n)) => n.as_i64().unwrap_or_default(),
            Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
            _ => 0,
        };
        let draft = matches!(params.get("draft"), Some(Value::Bool(true)));
        let (dates, invalid) = Dates::from_params(&params);

        let meta = Self {
            title,
            weight,
            draft,
            dates,
            params,
            cascade,
        };
        (meta, invalid)
    }

    /// Look up a param, case-insensitive on the top-level key.
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params
            .get(key)
            .or_else(|| self.params.get(&key.to_lowercase()))
    }

    /// Read a param as a list of strings.
    ///
    /// A single string counts as a one-element list; non-string items are
    /// skipped.
    pub fn string_list(&self, key: &str) -> Vec<&str> {
        match self.param(key) {
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

/// Upper-case the first letter of every space or dash separated word.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c == ' ' || c == '-';
    }
    out
}

/// Title of a section without one: its name, pluralized and title-cased
/// (`sect7` → `Sect7s`).
pub fn default_section_title(name: &str) -> String {
    if name.ends_with('s') {
        title_case(name)
    } else {
        title_case(&format!("{name}s"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DateTimeUtc;
    use serde_json::json;

    fn meta(value: Value) -> PageMeta {
        let params = value.as_object().cloned().unwrap();
        PageMeta::from_params(params, None).0
    }

    #[test]
    fn test_page_meta_standard_fields() {
        let m = meta(json!({ "title": "Hello", "weight": 3, "draft": true, "date": "2012-01-01" }));
        assert_eq!(m.title, "Hello");
        assert_eq!(m.weight, 3);
        assert!(m.draft);
        assert_eq!(m.dates.date, DateTimeUtc::from_ymd(2012, 1, 1));
    }

    #[test]
    fn test_page_meta_defaults() {
        let m = meta(json!({}));
        assert!(m.title.is_empty());
        assert_eq!(m.weight, 0);
        assert!(!m.draft);
        assert!(m.dates.date.is_zero());
    }

    #[test]
    fn test_page_meta_string_weight() {
        assert_eq!(meta(json!({ "weight": " 7 " })).weight, 7);
        assert_eq!(meta(json!({ "weight": "heavy" })).weight, 0);
    }

    #[test]
    fn test_param_lookup_is_case_insensitive() {
        let m = meta(json!({ "icon": "home.png" }));
        assert_eq!(m.param("ICON"), Some(&json!("home.png")));
        assert!(m.param("missing").is_none());
    }

    #[test]
    fn test_string_list() {
        let m = meta(json!({ "categories": ["Go", 3, "Rust"], "tags": "one" }));
        assert_eq!(m.string_list("categories"), ["Go", "Rust"]);
        assert_eq!(m.string_list("tags"), ["one"]);
        assert!(m.string_list("series").is_empty());
    }

    #[test]
    fn test_cascade_not_serialized_when_absent() {
        let json = serde_json::to_string(&meta(json!({ "title": "t" }))).unwrap();
        assert!(!json.contains("cascade"));
        assert!(json.contains("\"title\":\"t\""));
    }

    #[test]
    fn test_default_titles() {
        assert_eq!(default_section_title("sect7"), "Sect7s");
        assert_eq!(default_section_title("posts"), "Posts");
        assert_eq!(title_case("categories"), "Categories");
        assert_eq!(title_case("rust lang"), "Rust Lang");
    }
}
