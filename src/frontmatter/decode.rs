//! Front matter decoding into an ordered metadata map.

use serde_json::Value;
use thiserror::Error;

use super::Format;
use super::lexer::line_of;
use crate::core::JsonMap;

/// A decode failure, located relative to the front matter block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DecodeError {
    /// 1-based line within the front matter.
    pub line: usize,
    pub message: String,
}

impl DecodeError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line: line.max(1),
            message: message.into(),
        }
    }
}

/// Decodes raw YAML or TOML front matter into a [`JsonMap`].
///
/// Key order follows the source. TOML datetimes become strings so both
/// formats yield the same value shapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaDecoder;

impl MetaDecoder {
    pub fn decode(&self, format: Format, raw: &[u8]) -> Result<JsonMap, DecodeError> {
        let text = std::str::from_utf8(raw)
            .map_err(|e| DecodeError::new(line_of(raw, e.valid_up_to()), e.to_string()))?;

        if text.trim().is_empty() {
            return Ok(JsonMap::new());
        }

        let value = match format {
            Format::Yaml => decode_yaml(text)?,
            Format::Toml => decode_toml(text)?,
        };

        match value {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(JsonMap::new()),
            other => Err(DecodeError::new(
                1,
                format!("{} front matter must be a map, got {}", format.name(), type_name(&other)),
            )),
        }
    }
}

fn decode_yaml(text: &str) -> Result<Value, DecodeError> {
    serde_yaml::from_str::<Value>(text).map_err(|e| {
        let line = e.location().map_or(1, |loc| loc.line());
        DecodeError::new(line, e.to_string())
    })
}

fn decode_toml(text: &str) -> Result<Value, DecodeError> {
    let table = toml::from_str::<toml::Table>(text).map_err(|e| {
        let line = e
            .span()
            .map_or(1, |span| line_of(text.as_bytes(), span.start));
        DecodeError::new(line, e.message())
    })?;
    Ok(toml_to_json(toml::Value::Table(table)))
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(format: Format, raw: &str) -> Result<JsonMap, DecodeError> {
        MetaDecoder.decode(format, raw.as_bytes())
    }

    #[test]
    fn test_decode_yaml() {
        let map = decode(Format::Yaml, "title: \"foo\"\nweight: 3\ntags: [a, b]\n").unwrap();
        assert_eq!(map["title"], json!("foo"));
        assert_eq!(map["weight"], json!(3));
        assert_eq!(map["tags"], json!(["a", "b"]));
    }

    #[test]
    fn test_decode_preserves_key_order() {
        let map = decode(Format::Yaml, "z: 1\na: 2\nm: 3\n").unwrap();
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn test_decode_toml_datetime_becomes_string() {
        let map = decode(Format::Toml, "title = \"t\"\ndate = 2017-01-31T00:00:00Z\n").unwrap();
        assert_eq!(map["title"], json!("t"));
        assert_eq!(map["date"], json!("2017-01-31T00:00:00Z"));
    }

    #[test]
    fn test_decode_toml_nested_table() {
        let map = decode(Format::Toml, "[cascade]\nicon = \"home.png\"\n").unwrap();
        assert_eq!(map["cascade"], json!({ "icon": "home.png" }));
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode(Format::Yaml, "").unwrap().is_empty());
        assert!(decode(Format::Toml, "\n  \n").unwrap().is_empty());
        assert!(decode(Format::Yaml, "~\n").unwrap().is_empty());
    }

    #[test]
    fn test_decode_yaml_error_line() {
        let err = decode(Format::Yaml, "title: ok\nweight: 1\nbad: [unclosed\n").unwrap_err();
        assert!(err.line >= 3, "line was {}", err.line);
    }

    #[test]
    fn test_decode_toml_error_line() {
        let err = decode(Format::Toml, "title = \"a\"\nweight = \n").unwrap_err();
        assert!((2..=3).contains(&err.line), "line was {}", err.line);
    }

    #[test]
    fn test_decode_non_map() {
        let err = decode(Format::Yaml, "- a\n- b\n").unwrap_err();
        assert!(err.message.contains("must be a map"));
    }
}
