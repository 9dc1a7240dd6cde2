pub mod entry;
pub mod error;
pub mod fetcher;
pub mod sitemap;

pub use entry::{ParsedSitemap, SitemapEntry, SkippedEntry};
pub use error::FetchError;
pub use fetcher::{FetchOptions, SitemapFetcher};
pub use sitemap::parse_sitemap;
