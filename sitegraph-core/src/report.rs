// Report generation for rendered sitemaps

use crate::layout::SimulationOutcome;
use crate::model::{SiteGraph, Topology};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use sitegraph_fetch::SkippedEntry;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Summary of one render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphReport {
    pub source_url: String,
    pub topology: Topology,
    pub total_nodes: usize,
    pub total_links: usize,
    pub components: usize,
    pub skipped: Vec<SkippedEntry>,
    pub ticks: usize,
    pub stopped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_lastmod: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_lastmod: Option<String>,
}

impl GraphReport {
    pub fn new(
        source_url: &str,
        graph: &SiteGraph,
        skipped: &[SkippedEntry],
        outcome: &SimulationOutcome,
    ) -> Self {
        let (oldest_lastmod, newest_lastmod) = lastmod_range(graph);

        Self {
            source_url: source_url.to_string(),
            topology: graph.topology,
            total_nodes: graph.node_count(),
            total_links: graph.link_count(),
            components: count_components(graph),
            skipped: skipped.to_vec(),
            ticks: outcome.ticks,
            stopped: outcome.stopped,
            oldest_lastmod,
            newest_lastmod,
        }
    }
}

/// Number of connected components, links treated as undirected
pub fn count_components(graph: &SiteGraph) -> usize {
    let mut g: UnGraph<(), ()> = UnGraph::with_capacity(graph.node_count(), graph.link_count());
    for _ in &graph.nodes {
        g.add_node(());
    }
    for link in &graph.links {
        if link.source < graph.node_count() && link.target < graph.node_count() {
            g.add_edge(NodeIndex::new(link.source), NodeIndex::new(link.target), ());
        }
    }
    petgraph::algo::connected_components(&g)
}

/// Parse a W3C datetime as used by `<lastmod>`: `YYYY`, `YYYY-MM`,
/// `YYYY-MM-DD`, or a full timestamp with timezone.
pub fn parse_lastmod(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    // Minutes without seconds are valid W3C datetimes
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }

    let date = match value.len() {
        4 => NaiveDate::parse_from_str(&format!("{}-01-01", value), "%Y-%m-%d").ok(),
        7 => NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").ok(),
        _ => NaiveDate::parse_from_str(value, "%Y-%m-%d").ok(),
    }?;
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}

/// Oldest and newest `lastmod` values that parse, as originally written
fn lastmod_range(graph: &SiteGraph) -> (Option<String>, Option<String>) {
    let mut dated: Vec<(DateTime<Utc>, &str)> = graph
        .nodes
        .iter()
        .filter_map(|node| {
            let raw = node.lastmod()?;
            parse_lastmod(raw).map(|dt| (dt, raw))
        })
        .collect();
    dated.sort_by_key(|(dt, _)| *dt);

    (
        dated.first().map(|(_, raw)| raw.to_string()),
        dated.last().map(|(_, raw)| raw.to_string()),
    )
}

pub fn generate_text_report(report: &GraphReport) -> String {
    let mut out = String::new();

    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    out.push_str("# Summary:\n");
    out.push_str(&format!("  Sitemap:     {}\n", report.source_url));
    out.push_str(&format!("  Pages:       {}\n", report.total_nodes));
    out.push_str(&format!("  Links:       {}\n", report.total_links));
    out.push_str(&format!("  Topology:    {}\n", report.topology.as_str()));
    out.push_str(&format!("  Components:  {}\n", report.components));

    let status = if report.stopped { "stopped" } else { "cooled down" };
    out.push_str(&format!("  Layout:      {} ticks ({})\n", report.ticks, status));

    if let (Some(oldest), Some(newest)) = (&report.oldest_lastmod, &report.newest_lastmod) {
        out.push_str(&format!("  Last change: {} .. {}\n", oldest, newest));
    }

    if !report.skipped.is_empty() {
        out.push_str(&format!("\n# Skipped entries: {}\n", report.skipped.len()));
        for skipped in &report.skipped {
            out.push_str(&format!("  <url> #{}: {}\n", skipped.index, skipped.reason));
        }
    }

    out.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    out
}

pub fn generate_json_report(report: &GraphReport) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "sitegraph",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": Utc::now().to_rfc3339(),
                "format": "json"
            },
            "summary": report
        }
    });

    serde_json::to_string_pretty(&json_report)
}

/// The laid-out graph: nodes with their final positions, and links by id.
pub fn generate_graph_json(
    graph: &SiteGraph,
    outcome: &SimulationOutcome,
) -> Result<String, serde_json::Error> {
    let json = serde_json::json!({
        "topology": graph.topology,
        "ticks": outcome.ticks,
        "nodes": graph.nodes,
        "links": graph.links,
    });

    serde_json::to_string_pretty(&json)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
