use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP {status} returned by {url}")]
    StatusError { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Malformed sitemap XML: {0}")]
    XmlError(#[from] roxmltree::Error),
}

pub type Result<T> = std::result::Result<T, FetchError>;
