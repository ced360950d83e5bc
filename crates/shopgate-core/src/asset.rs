//! # Asset Exclusion Filter
//!
//! Static assets and internal framework paths never reach the gate. A path
//! is excluded when it starts with one of the internal prefixes or ends with
//! one of the image extensions. Both checks are case-sensitive, so
//! `/logo.PNG` is still evaluated.

/// Internal framework prefixes served without evaluation.
pub const EXCLUDED_PREFIXES: &[&str] = &["/_next/static", "/_next/image", "/favicon.ico"];

/// File extensions (without the dot) served without evaluation.
pub const EXCLUDED_EXTENSIONS: &[&str] = &["svg", "png", "jpg", "jpeg", "gif", "webp"];

/// Decides which request paths bypass the access gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFilter {
    prefixes: Vec<String>,
    suffixes: Vec<String>,
}

impl AssetFilter {
    /// Build a filter from prefixes and bare extensions (`"png"`, not `".png"`).
    pub fn new<P, E>(prefixes: P, extensions: E) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
            suffixes: extensions
                .into_iter()
                .map(|ext| format!(".{}", ext.as_ref().trim_start_matches('.')))
                .collect(),
        }
    }

    /// The storefront's fixed exclusion set.
    pub fn storefront() -> Self {
        Self::new(EXCLUDED_PREFIXES.iter().copied(), EXCLUDED_EXTENSIONS.iter().copied())
    }

    /// Excluded prefixes.
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Excluded suffixes, each including its leading dot.
    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Whether `path` bypasses the gate.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
            || self.suffixes.iter().any(|s| path.ends_with(s.as_str()))
    }
}

impl Default for AssetFilter {
    fn default() -> Self {
        Self::storefront()
    }
}
