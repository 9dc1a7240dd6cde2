use sitegraph_fetch::FetchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("link references unknown node id {id}")]
    MissingNode { id: usize },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load sitemap: {0}")]
    Fetch(#[from] FetchError),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;
