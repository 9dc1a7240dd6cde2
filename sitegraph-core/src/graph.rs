use crate::model::{GraphLink, GraphNode, SiteGraph, Topology};
use sitegraph_fetch::SitemapEntry;
use std::collections::HashMap;
use url::Url;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Host (with port) and non-empty path segments of a URL.
///
/// `/docs/` and `/docs` produce the same key; query and fragment are ignored.
fn hierarchy_key(loc: &str) -> Option<(String, Vec<String>)> {
    let url = Url::parse(loc).ok()?;
    let host = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => return None,
    };
    let segments = url
        .path()
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect();
    Some((host, segments))
}

/// Build the node list: one node per entry, ids in entry order.
pub fn build_nodes(entries: &[SitemapEntry]) -> Vec<GraphNode> {
    entries
        .iter()
        .enumerate()
        .map(|(id, entry)| GraphNode::new(id, entry.clone()))
        .collect()
}

/// `{ source: 0, target: id }` for every node, node 0 included.
pub fn star_links(nodes: &[GraphNode]) -> Vec<GraphLink> {
    nodes
        .iter()
        .map(|node| GraphLink {
            source: 0,
            target: node.id,
        })
        .collect()
}

/// Parent-child links from URL path segmentation.
///
/// A node's parent is the nearest entry on the same host whose path is a
/// strict prefix of the node's path. Nodes without such an entry (and entries
/// whose `loc` is not an absolute URL) are roots, so the result is a forest.
/// When two entries share a path, the first one is used as the ancestor.
pub fn hierarchy_links(nodes: &[GraphNode]) -> Vec<GraphLink> {
    let keys: Vec<Option<(String, Vec<String>)>> =
        nodes.iter().map(|node| hierarchy_key(node.loc())).collect();

    let mut index: HashMap<(&str, &[String]), usize> = HashMap::new();
    for (node, key) in nodes.iter().zip(&keys) {
        if let Some((host, segments)) = key {
            index
                .entry((host.as_str(), segments.as_slice()))
                .or_insert(node.id);
        }
    }

    let mut links = Vec::new();
    for (node, key) in nodes.iter().zip(&keys) {
        let Some((host, segments)) = key else {
            continue;
        };

        let parent = (0..segments.len())
            .rev()
            .find_map(|len| index.get(&(host.as_str(), &segments[..len])).copied());

        if let Some(parent) = parent
            && parent != node.id
        {
            links.push(GraphLink {
                source: parent,
                target: node.id,
            });
        }
    }

    links
}

/// Build a fresh graph from parsed entries.
pub fn build_graph(entries: &[SitemapEntry], topology: Topology) -> SiteGraph {
    let nodes = build_nodes(entries);
    let links = match topology {
        Topology::Star => star_links(&nodes),
        Topology::Hierarchy => hierarchy_links(&nodes),
    };

    SiteGraph {
        topology,
        nodes,
        links,
    }
}
