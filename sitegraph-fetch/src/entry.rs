use serde::{Deserialize, Serialize};

/// One `<url>` element of a sitemap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitemapEntry {
    pub loc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changefreq: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl SitemapEntry {
    pub fn new(loc: impl Into<String>) -> Self {
        Self {
            loc: loc.into(),
            lastmod: None,
            changefreq: None,
            priority: None,
        }
    }

    pub fn with_lastmod(mut self, lastmod: impl Into<String>) -> Self {
        self.lastmod = Some(lastmod.into());
        self
    }
}

/// A `<url>` element that could not be turned into an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    /// Position of the `<url>` element in document order
    pub index: usize,
    pub reason: String,
}

/// Result of parsing a sitemap document: the usable entries in document order
/// plus the `<url>` elements that had to be skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSitemap {
    pub entries: Vec<SitemapEntry>,
    pub skipped: Vec<SkippedEntry>,
}

impl ParsedSitemap {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_json_omits_missing_fields() {
        let entry = SitemapEntry::new("https://a.com/b");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json, serde_json::json!({ "loc": "https://a.com/b" }));
    }

    #[test]
    fn test_entry_json_keeps_lastmod() {
        let entry = SitemapEntry::new("https://a.com/").with_lastmod("2023-01-01");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["lastmod"], "2023-01-01");
    }
}
