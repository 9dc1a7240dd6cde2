use crate::entry::{ParsedSitemap, SitemapEntry, SkippedEntry};
use crate::error::Result;
use roxmltree::{Document, Node, ParsingOptions};
use tracing::{debug, warn};

/// Parse a sitemap document into its `<url>` entries.
///
/// Every `<url>` element in the root element's namespace is visited in
/// document order. `<loc>` is required; a `<url>` without a usable `<loc>` is
/// recorded in [`ParsedSitemap::skipped`] instead of failing the whole
/// document. `<lastmod>`, `<changefreq>` and `<priority>` are optional.
///
/// Child lookups only match elements in the same namespace as their `<url>`,
/// so extension elements such as `<image:loc>` are never mistaken for the page
/// location.
pub fn parse_sitemap(xml: &str) -> Result<ParsedSitemap> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml, options)?;

    let root = doc.root_element();
    if root.tag_name().name() == "sitemapindex" {
        warn!("Document is a sitemap index; it lists sitemaps, not pages");
    }
    let namespace = root.tag_name().namespace();

    let mut parsed = ParsedSitemap::default();

    for (index, url) in doc
        .descendants()
        .filter(|n| is_element_named(n, "url", namespace))
        .enumerate()
    {
        let Some(loc) = child_text(&url, "loc") else {
            warn!("Skipping <url> #{}: missing <loc>", index);
            parsed.skipped.push(SkippedEntry {
                index,
                reason: "missing <loc> element".to_string(),
            });
            continue;
        };

        if loc.is_empty() {
            warn!("Skipping <url> #{}: empty <loc>", index);
            parsed.skipped.push(SkippedEntry {
                index,
                reason: "empty <loc> element".to_string(),
            });
            continue;
        }

        parsed.entries.push(SitemapEntry {
            loc,
            lastmod: child_text(&url, "lastmod"),
            changefreq: child_text(&url, "changefreq"),
            priority: child_text(&url, "priority"),
        });
    }

    debug!(
        "Parsed {} sitemap entries ({} skipped)",
        parsed.entries.len(),
        parsed.skipped.len()
    );

    Ok(parsed)
}

fn is_element_named(node: &Node, name: &str, namespace: Option<&str>) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == namespace
}

/// Trimmed text content of the first descendant element called `name`.
fn child_text(url: &Node, name: &str) -> Option<String> {
    let namespace = url.tag_name().namespace();
    url.descendants()
        .skip(1)
        .find(|n| is_element_named(n, name, namespace))
        .map(|n| {
            n.descendants()
                .filter(|d| d.is_text())
                .filter_map(|d| d.text())
                .collect::<String>()
                .trim()
                .to_string()
        })
}
