use crate::error::Error;
use crate::layout::{SimulationOutcome, StopHandle};
use crate::model::SiteGraph;
use crate::render::{PreparedRender, RenderOptions, RenderResult};
use crate::report::GraphReport;
use crate::scene::SvgContainer;
use sitegraph_fetch::{ParsedSitemap, SitemapEntry, SitemapFetcher, SkippedEntry};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Receives short status messages as a submission moves through its phases
pub type StatusCallback = Arc<dyn Fn(String) + Send + Sync>;

/// What a finished render produced
#[derive(Debug, Clone)]
pub struct RenderSummary {
    pub token: u64,
    pub report: GraphReport,
    pub graph: SiteGraph,
    pub outcome: SimulationOutcome,
    pub svg: String,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Rendered(Box<RenderSummary>),
    /// A newer submission started before this one finished
    Superseded { token: u64 },
    Failed { token: u64, error: Error },
}

impl SubmitOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, SubmitOutcome::Rendered(_))
    }
}

#[derive(Default)]
struct VisualizerState {
    source_url: Option<String>,
    sitemap: Option<Arc<ParsedSitemap>>,
    container: SvgContainer,
    graph: Option<SiteGraph>,
    running: Option<(u64, StopHandle)>,
}

/// Owns the parsed sitemap and the mounted visualization.
///
/// Every call to [`Visualizer::submit`] takes a token; only the newest token
/// may update state or mount a scene. Starting a render stops the one before.
pub struct Visualizer {
    fetcher: SitemapFetcher,
    options: RenderOptions,
    latest: AtomicU64,
    state: Mutex<VisualizerState>,
    status_callback: Option<StatusCallback>,
}

impl Visualizer {
    pub fn new(fetcher: SitemapFetcher, options: RenderOptions) -> Self {
        Self {
            fetcher,
            options,
            latest: AtomicU64::new(0),
            state: Mutex::new(VisualizerState::default()),
            status_callback: None,
        }
    }

    pub fn with_status_callback(mut self, callback: StatusCallback) -> Self {
        self.status_callback = Some(callback);
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Fetch `url`, parse it and render the result.
    ///
    /// Errors never escape: they are logged and returned as
    /// [`SubmitOutcome::Failed`], leaving the previous visualization mounted.
    pub async fn submit(&self, url: &str) -> SubmitOutcome {
        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Submission #{}: {}", token, url);
        self.status(format!("Fetching {}", url));

        let sitemap = match self.fetcher.load_sitemap(url).await {
            Ok(sitemap) => sitemap,
            Err(e) => {
                error!("Error fetching sitemap {}: {}", url, e);
                return SubmitOutcome::Failed {
                    token,
                    error: e.into(),
                };
            }
        };

        self.show(token, url, sitemap).await
    }

    /// Render an already parsed sitemap as if a submission for `source` had
    /// just resolved.
    pub async fn submit_parsed(&self, source: &str, sitemap: ParsedSitemap) -> SubmitOutcome {
        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Submission #{}: {} (pre-parsed)", token, source);
        self.show(token, source, sitemap).await
    }

    async fn show(&self, token: u64, source: &str, sitemap: ParsedSitemap) -> SubmitOutcome {
        if !self.is_latest(token) {
            debug!("Submission #{} superseded after fetch", token);
            return SubmitOutcome::Superseded { token };
        }

        if !sitemap.skipped.is_empty() {
            warn!(
                "{} of {} <url> elements skipped in {}",
                sitemap.skipped.len(),
                sitemap.skipped.len() + sitemap.entries.len(),
                source
            );
        }

        let prepared = match PreparedRender::new(&sitemap.entries, &self.options) {
            Ok(prepared) => prepared,
            Err(e) => {
                error!("Error preparing layout for {}: {}", source, e);
                return SubmitOutcome::Failed {
                    token,
                    error: e.into(),
                };
            }
        };
        let prepared = match &self.status_callback {
            Some(callback) => {
                let callback = callback.clone();
                prepared.with_tick_callback(Box::new(move |tick, alpha| {
                    if tick % 50 == 0 {
                        callback(format!("Layout tick {} (alpha {:.3})", tick, alpha));
                    }
                }))
            }
            None => prepared,
        };

        {
            let mut state = self.state.lock().await;
            if !self.is_latest(token) {
                debug!("Submission #{} superseded before render", token);
                return SubmitOutcome::Superseded { token };
            }

            if let Some((previous, handle)) = state.running.take() {
                debug!("Stopping simulation for submission #{}", previous);
                handle.stop();
            }
            state.running = Some((token, prepared.stop_handle()));
        }

        self.status(format!("Laying out {} pages", prepared.node_count()));
        let RenderResult {
            graph,
            scene,
            outcome,
        } = match tokio::task::spawn_blocking(move || prepared.run()).await {
            Ok(result) => result,
            Err(e) => {
                error!("Render task for submission #{} failed: {}", token, e);
                self.clear_running(token).await;
                return SubmitOutcome::Failed {
                    token,
                    error: e.into(),
                };
            }
        };

        let mut state = self.state.lock().await;
        if outcome.stopped || !self.is_latest(token) {
            debug!(
                "Discarding render for submission #{} after {} ticks",
                token, outcome.ticks
            );
            if matches!(state.running, Some((running, _)) if running == token) {
                state.running = None;
            }
            return SubmitOutcome::Superseded { token };
        }

        // Only a render that survives to mount may replace the sitemap.
        let sitemap = Arc::new(sitemap);
        state.source_url = Some(source.to_string());
        state.sitemap = Some(sitemap.clone());
        let svg = scene.to_svg();
        state.container.mount(scene);
        state.graph = Some(graph.clone());
        state.running = None;
        drop(state);

        let report = GraphReport::new(source, &graph, &sitemap.skipped, &outcome);
        info!(
            "Rendered {} nodes and {} links in {} ticks",
            report.total_nodes, report.total_links, report.ticks
        );
        self.status(format!("Rendered {} pages", report.total_nodes));

        SubmitOutcome::Rendered(Box::new(RenderSummary {
            token,
            report,
            graph,
            outcome,
            svg,
        }))
    }

    fn is_latest(&self, token: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == token
    }

    fn status(&self, message: String) {
        if let Some(callback) = &self.status_callback {
            callback(message);
        }
    }

    async fn clear_running(&self, token: u64) {
        let mut state = self.state.lock().await;
        if matches!(state.running, Some((running, _)) if running == token) {
            state.running = None;
        }
    }

    /// Token of the most recent submission, 0 before the first
    pub fn latest_token(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    pub async fn source_url(&self) -> Option<String> {
        self.state.lock().await.source_url.clone()
    }

    /// Entries of the current sitemap, `None` until a submission succeeds
    pub async fn entries(&self) -> Option<Vec<SitemapEntry>> {
        let state = self.state.lock().await;
        state.sitemap.as_ref().map(|sitemap| sitemap.entries.clone())
    }

    pub async fn skipped(&self) -> Vec<SkippedEntry> {
        let state = self.state.lock().await;
        state
            .sitemap
            .as_ref()
            .map(|sitemap| sitemap.skipped.clone())
            .unwrap_or_default()
    }

    /// The mounted SVG document, if any
    pub async fn current_svg(&self) -> Option<String> {
        let state = self.state.lock().await;
        state.container.scene().map(|scene| scene.to_svg())
    }

    pub async fn mounted_count(&self) -> usize {
        self.state.lock().await.container.len()
    }

    pub async fn last_graph(&self) -> Option<SiteGraph> {
        self.state.lock().await.graph.clone()
    }
}
