//! Keyword matching against archive paths.

/// A comma-separated list of keyword fragments.
///
/// A path matches when it contains every fragment. Fragments are trimmed and
/// empty ones are ignored, so an empty query matches everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordQuery {
    fragments: Vec<String>,
}

impl KeywordQuery {
    /// Parse a comma-separated keyword string.
    pub fn parse(keyword: &str) -> Self {
        let fragments = keyword
            .split(',')
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .map(str::to_string)
            .collect();

        Self { fragments }
    }

    /// The parsed fragments, in input order.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Check whether `path` contains every fragment.
    pub fn matches(&self, path: &str) -> bool {
        self.fragments
            .iter()
            .all(|fragment| path.contains(fragment.as_str()))
    }
}
