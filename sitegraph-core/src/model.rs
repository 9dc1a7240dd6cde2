use serde::{Deserialize, Serialize};
use sitegraph_fetch::SitemapEntry;

/// How links between sitemap entries are derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    /// Every node links to node 0 (node 0 included)
    #[default]
    Star,
    /// Each node links to its nearest ancestor by host and path prefix
    Hierarchy,
}

impl Topology {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "star" => Some(Topology::Star),
            "hierarchy" => Some(Topology::Hierarchy),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Topology::Star => "star",
            Topology::Hierarchy => "hierarchy",
        }
    }
}

/// A sitemap entry placed in the layout.
///
/// `x`, `y`, `vx` and `vy` are owned by the simulation and rewritten on every
/// tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: usize,
    #[serde(flatten)]
    pub entry: SitemapEntry,
    pub x: f64,
    pub y: f64,
    #[serde(skip)]
    pub vx: f64,
    #[serde(skip)]
    pub vy: f64,
}

impl GraphNode {
    pub fn new(id: usize, entry: SitemapEntry) -> Self {
        Self {
            id,
            entry,
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
        }
    }

    pub fn loc(&self) -> &str {
        &self.entry.loc
    }

    pub fn lastmod(&self) -> Option<&str> {
        self.entry.lastmod.as_deref()
    }
}

/// An edge between two nodes, keyed by node id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: usize,
    pub target: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteGraph {
    pub topology: Topology,
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl SiteGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
