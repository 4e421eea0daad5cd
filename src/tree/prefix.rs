//! Segment-based prefix tree with longest-prefix lookup.
//!
//! Keys are slash paths. Matching works on whole segments, so `/sect3`
//! is a prefix of `/sect3/page1.md` but not of `/sect30`.

use rustc_hash::FxHashMap;

#[derive(Debug)]
struct TrieNode<V> {
    value: Option<V>,
    children: FxHashMap<Box<str>, TrieNode<V>>,
}

impl<V> Default for TrieNode<V> {
    fn default() -> Self {
        Self {
            value: None,
            children: FxHashMap::default(),
        }
    }
}

/// Prefix tree keyed by canonical slash paths.
#[derive(Debug)]
pub struct PrefixTree<V> {
    root: TrieNode<V>,
    len: usize,
}

impl<V> Default for PrefixTree<V> {
    fn default() -> Self {
        Self {
            root: TrieNode::default(),
            len: 0,
        }
    }
}

impl<V> PrefixTree<V> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a value, returning the previous one at the same key.
    pub fn insert(&mut self, key: &str, value: V) -> Option<V> {
        let mut node = &mut self.root;
        for segment in segments(key) {
            node = node.children.entry(Box::from(segment)).or_default();
        }
        let old = node.value.replace(value);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    /// Exact lookup.
    pub fn get(&self, key: &str) -> Option<&V> {
        let mut node = &self.root;
        for segment in segments(key) {
            node = node.children.get(segment)?;
        }
        node.value.as_ref()
    }

    /// Find the longest stored key that is a segment prefix of `key`.
    ///
    /// Returns the matched prefix (a slice of `key`, or `"/"` for the root)
    /// and its value.
    pub fn longest_prefix<'k>(&self, key: &'k str) -> Option<(&'k str, &V)> {
        let mut node = &self.root;
        let mut best = node.value.as_ref().map(|v| ("/", v));

        let mut offset = 0;
        for part in key.split('/') {
            let end = offset + part.len();
            offset = end + 1;
            if part.is_empty() {
                continue;
            }
            match node.children.get(part) {
                Some(child) => node = child,
                None => break,
            }
            if let Some(value) = node.value.as_ref() {
                best = Some((&key[..end], value));
            }
        }

        best
    }
}

fn segments(key: &str) -> impl Iterator<Item = &str> {
    key.split('/').filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> PrefixTree<u32> {
        let mut tree = PrefixTree::new();
        tree.insert("/", 0);
        tree.insert("/sect3", 3);
        tree.insert("/sect3/sect7", 37);
        tree
    }

    #[test]
    fn test_exact_get() {
        let tree = tree();
        assert_eq!(tree.get("/sect3"), Some(&3));
        assert_eq!(tree.get("/"), Some(&0));
        assert_eq!(tree.get("/sect4"), None);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_longest_prefix() {
        let tree = tree();
        assert_eq!(tree.longest_prefix("/sect3/page1.md"), Some(("/sect3", &3)));
        assert_eq!(tree.longest_prefix("/sect3/sect7/p.md"), Some(("/sect3/sect7", &37)));
        assert_eq!(tree.longest_prefix("/sect3"), Some(("/sect3", &3)));
        assert_eq!(tree.longest_prefix("/about.md"), Some(("/", &0)));
    }

    #[test]
    fn test_longest_prefix_is_segment_aware() {
        let tree = tree();
        assert_eq!(tree.longest_prefix("/sect30/page.md"), Some(("/", &0)));
    }

    #[test]
    fn test_longest_prefix_unclean_path() {
        let tree = tree();
        assert_eq!(tree.longest_prefix("/./sect2"), Some(("/", &0)));
    }

    #[test]
    fn test_no_root_value() {
        let mut tree = PrefixTree::new();
        tree.insert("/categories", 1);
        assert_eq!(tree.longest_prefix("/tags/x"), None);
        assert_eq!(tree.longest_prefix("/categories/rust"), Some(("/categories", &1)));
    }

    #[test]
    fn test_insert_replaces() {
        let mut tree = PrefixTree::new();
        assert_eq!(tree.insert("/a", 1), None);
        assert_eq!(tree.insert("/a/", 2), Some(1));
        assert_eq!(tree.len(), 1);
    }
}
