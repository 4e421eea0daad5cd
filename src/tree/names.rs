//! Short-name index for shorthand page references.
//!
//! A short name is a page's base name with extension, language suffix and
//! bundle `index` file stripped (`sect3/b1/index.en.md` → `b1`). Two pages
//! sharing one short name poison the entry.

use rustc_hash::FxHashMap;

use super::NodeId;

/// Outcome of a short-name lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortName {
    Unique(NodeId),
    Ambiguous,
}

#[derive(Debug, Default)]
pub struct ShortNames {
    map: FxHashMap<String, ShortName>,
}

impl ShortNames {
    pub fn insert(&mut self, name: &str, id: NodeId) {
        self.map
            .entry(name.to_string())
            .and_modify(|entry| {
                if *entry != ShortName::Unique(id) {
                    *entry = ShortName::Ambiguous;
                }
            })
            .or_insert(ShortName::Unique(id));
    }

    pub fn get(&self, name: &str) -> Option<ShortName> {
        self.map.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}

/// Strip extension, `.<lang>` suffix and trailing `/index` or `/_index`.
///
/// - `short_name("b1/index.en.md", "en")` → `"b1"`
/// - `short_name("unique2.md", "en")` → `"unique2"`
pub fn short_name<'a>(filename: &'a str, lang: &str) -> &'a str {
    let mut name = crate::core::key::path_no_ext(filename);
    if !lang.is_empty()
        && let Some(stripped) = name.strip_suffix(lang)
        && let Some(stripped) = stripped.strip_suffix('.')
    {
        name = stripped;
    }
    for reserved in ["/index", "/_index"] {
        if let Some(stripped) = name.strip_suffix(reserved) {
            name = stripped;
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("b1/index.en.md", "en"), "b1");
        assert_eq!(short_name("b1/index.md", "en"), "b1");
        assert_eq!(short_name("index/index.md", "en"), "index");
        assert_eq!(short_name("unique2.md", "en"), "unique2");
        assert_eq!(short_name("subsect/deep.md", "en"), "subsect/deep");
        assert_eq!(short_name("page.fr.md", "en"), "page.fr");
        assert_eq!(short_name("sect7", "en"), "sect7");
    }

    #[test]
    fn test_ambiguity() {
        let mut names = ShortNames::default();
        names.insert("page1", NodeId(1));
        names.insert("unique", NodeId(2));
        names.insert("page1", NodeId(3));
        names.insert("unique", NodeId(2));
        assert_eq!(names.get("page1"), Some(ShortName::Ambiguous));
        assert_eq!(names.get("unique"), Some(ShortName::Unique(NodeId(2))));
        assert_eq!(names.get("missing"), None);
    }
}
