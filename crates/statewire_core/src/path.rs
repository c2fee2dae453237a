//! Property paths into the remote state tree.
//!
//! A path is an ordered sequence of property names identifying a
//! location within the remote service's state tree. Its external form
//! is the dot-joined string (`"address.city"`); the empty path denotes
//! the root.

use std::fmt;

/// A dot-separated path into the remote state tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    segments: Vec<String>,
}

impl PropertyPath {
    /// Creates the root path (no segments).
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a path from its dot-joined form.
    ///
    /// Empty segments are discarded, so `""` parses to the root path.
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Returns the path extended by one property name.
    ///
    /// Concatenation order defines nesting depth: `root().child("a")
    /// .child("b")` addresses the same location as `parse("a.b")`.
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(key.into());
        Self { segments }
    }

    /// Returns true if this is the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the nesting depth (number of segments).
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Iterates over the path's segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Returns the final segment, if any.
    pub fn leaf(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for PropertyPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl From<String> for PropertyPath {
    fn from(path: String) -> Self {
        Self::parse(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_empty() {
        let root = PropertyPath::root();
        assert!(root.is_root());
        assert_eq!(root.depth(), 0);
        assert_eq!(root.to_string(), "");
        assert_eq!(PropertyPath::parse(""), root);
    }

    #[test]
    fn parse_and_display_round() {
        let path = PropertyPath::parse("address.city");
        assert_eq!(path.depth(), 2);
        assert_eq!(path.to_string(), "address.city");
        assert_eq!(path.leaf(), Some("city"));
    }

    #[test]
    fn child_composition_matches_parse() {
        let composed = PropertyPath::root().child("a").child("b").child("c");
        assert_eq!(composed, PropertyPath::parse("a.b.c"));
        assert_eq!(composed.to_string(), "a.b.c");
    }

    #[test]
    fn empty_segments_discarded() {
        assert_eq!(PropertyPath::parse("a..b"), PropertyPath::parse("a.b"));
        assert_eq!(PropertyPath::parse(".a."), PropertyPath::parse("a"));
    }

    #[test]
    fn segment_iteration() {
        let path = PropertyPath::parse("profile.name");
        let segments: Vec<_> = path.segments().collect();
        assert_eq!(segments, vec!["profile", "name"]);
    }
}
