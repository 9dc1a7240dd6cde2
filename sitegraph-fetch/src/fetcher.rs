use crate::entry::ParsedSitemap;
use crate::error::{FetchError, Result};
use crate::sitemap::parse_sitemap;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

/// Options for the HTTP client used to download sitemaps
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout_secs: u64,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_redirects: 5,
            user_agent: format!("sitegraph/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Downloads a sitemap with a single GET and parses it.
#[derive(Debug, Clone)]
pub struct SitemapFetcher {
    client: Client,
}

impl SitemapFetcher {
    pub fn new() -> Result<Self> {
        Self::with_options(&FetchOptions::default())
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        Self::with_options(&FetchOptions {
            timeout_secs,
            ..FetchOptions::default()
        })
    }

    pub fn with_options(options: &FetchOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(options.user_agent.as_str())
            .timeout(Duration::from_secs(options.timeout_secs))
            .connect_timeout(Duration::from_secs(options.timeout_secs.div_ceil(2)))
            .redirect(reqwest::redirect::Policy::limited(options.max_redirects))
            .build()?;

        Ok(Self { client })
    }

    /// Fetch the full response body for `url` as text.
    ///
    /// Transport failures and non-2xx statuses are errors.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let parsed_url =
            Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;

        debug!("Fetching {}", parsed_url);

        let start = Instant::now();
        let response = self.client.get(parsed_url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::StatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.text().await?;
        debug!(
            "Fetched {} bytes ({}) from {} in {:?}",
            body.len(),
            content_type.as_deref().unwrap_or("unknown content type"),
            url,
            start.elapsed()
        );

        Ok(body)
    }

    /// Fetch `url` and parse the body as a sitemap.
    pub async fn load_sitemap(&self, url: &str) -> Result<ParsedSitemap> {
        let body = self.fetch_text(url).await?;
        let parsed = parse_sitemap(&body)?;
        info!(
            "Loaded {} entries from {} ({} skipped)",
            parsed.entries.len(),
            url,
            parsed.skipped.len()
        );
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::SitemapEntry;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    const SITEMAP: &str = "<urlset><url><loc>https://a.com/</loc><lastmod>2023-01-01</lastmod></url><url><loc>https://a.com/b</loc></url></urlset>";

    async fn serve(body: &str, status: u16) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(
                ResponseTemplate::new(status)
                    .insert_header("content-type", "application/xml")
                    .set_body_bytes(body.as_bytes()),
            )
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_load_sitemap() {
        let mock_server = serve(SITEMAP, 200).await;
        let fetcher = SitemapFetcher::new().unwrap();

        let parsed = fetcher
            .load_sitemap(&format!("{}/sitemap.xml", mock_server.uri()))
            .await
            .unwrap();

        assert_eq!(
            parsed.entries,
            vec![
                SitemapEntry::new("https://a.com/").with_lastmod("2023-01-01"),
                SitemapEntry::new("https://a.com/b"),
            ]
        );
    }

    #[tokio::test]
    async fn test_load_sitemap_issues_single_get() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SITEMAP))
            .expect(1)
            .mount(&mock_server)
            .await;

        let fetcher = SitemapFetcher::new().unwrap();
        fetcher
            .load_sitemap(&format!("{}/sitemap.xml", mock_server.uri()))
            .await
            .unwrap();

        mock_server.verify().await;
    }

    #[tokio::test]
    async fn test_load_sitemap_not_found() {
        let mock_server = serve("<html>missing</html>", 404).await;
        let fetcher = SitemapFetcher::new().unwrap();

        let result = fetcher
            .load_sitemap(&format!("{}/sitemap.xml", mock_server.uri()))
            .await;

        match result {
            Err(FetchError::StatusError { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_sitemap_malformed_body() {
        let mock_server = serve("<urlset><url><loc>broken", 200).await;
        let fetcher = SitemapFetcher::new().unwrap();

        let result = fetcher
            .load_sitemap(&format!("{}/sitemap.xml", mock_server.uri()))
            .await;

        assert!(matches!(result, Err(FetchError::XmlError(_))));
    }

    #[tokio::test]
    async fn test_load_sitemap_unreachable_host() {
        let fetcher = SitemapFetcher::with_timeout(2).unwrap();

        let result = fetcher.load_sitemap("http://127.0.0.1:1/sitemap.xml").await;

        assert!(matches!(result, Err(FetchError::HttpError(_))));
    }

    #[tokio::test]
    async fn test_load_sitemap_invalid_url() {
        let fetcher = SitemapFetcher::new().unwrap();

        let result = fetcher.load_sitemap("not a url").await;

        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }
}
