// Tests for report generation functionality

use sitegraph_core::graph::build_graph;
use sitegraph_core::layout::SimulationOutcome;
use sitegraph_core::model::Topology;
use sitegraph_core::report::{
    GraphReport, ReportFormat, count_components, generate_graph_json, generate_json_report,
    generate_text_report, parse_lastmod, save_report,
};
use sitegraph_fetch::{SitemapEntry, SkippedEntry};
use tempfile::TempDir;

fn outcome() -> SimulationOutcome {
    SimulationOutcome {
        ticks: 300,
        alpha: 0.00099,
        stopped: false,
    }
}

fn entries() -> Vec<SitemapEntry> {
    vec![
        SitemapEntry::new("https://a.com/").with_lastmod("2023-01-01"),
        SitemapEntry::new("https://a.com/docs").with_lastmod("2024-06-15T10:30:00+00:00"),
        SitemapEntry::new("https://a.com/docs/intro").with_lastmod("2022"),
        SitemapEntry::new("https://b.com/about"),
    ]
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert!(matches!(
        ReportFormat::from_str("text"),
        Some(ReportFormat::Text)
    ));
    assert!(matches!(
        ReportFormat::from_str("JSON"),
        Some(ReportFormat::Json)
    ));
    assert!(ReportFormat::from_str("csv").is_none());
}

// ============================================================================
// Lastmod Parsing Tests
// ============================================================================

#[test]
fn test_parse_lastmod_date() {
    let dt = parse_lastmod("2023-01-01").unwrap();
    assert_eq!(dt.to_rfc3339(), "2023-01-01T00:00:00+00:00");
}

#[test]
fn test_parse_lastmod_year_and_month() {
    assert_eq!(
        parse_lastmod("2021").unwrap().to_rfc3339(),
        "2021-01-01T00:00:00+00:00"
    );
    assert_eq!(
        parse_lastmod("2021-07").unwrap().to_rfc3339(),
        "2021-07-01T00:00:00+00:00"
    );
}

#[test]
fn test_parse_lastmod_with_timezone() {
    let dt = parse_lastmod("2024-06-15T10:30:00+02:00").unwrap();
    assert_eq!(dt.to_rfc3339(), "2024-06-15T08:30:00+00:00");

    let dt = parse_lastmod("2024-06-15T10:30+02:00").unwrap();
    assert_eq!(dt.to_rfc3339(), "2024-06-15T08:30:00+00:00");
}

#[test]
fn test_parse_lastmod_invalid() {
    assert!(parse_lastmod("yesterday").is_none());
    assert!(parse_lastmod("").is_none());
    assert!(parse_lastmod("2023-13-45").is_none());
}

// ============================================================================
// Graph Report Tests
// ============================================================================

#[test]
fn test_count_components_star() {
    let graph = build_graph(&entries(), Topology::Star);
    assert_eq!(count_components(&graph), 1);
}

#[test]
fn test_count_components_hierarchy_forest() {
    let graph = build_graph(&entries(), Topology::Hierarchy);
    // a.com tree plus the lone b.com page
    assert_eq!(count_components(&graph), 2);
}

#[test]
fn test_count_components_empty() {
    let graph = build_graph(&[], Topology::Star);
    assert_eq!(count_components(&graph), 0);
}

#[test]
fn test_graph_report_fields() {
    let graph = build_graph(&entries(), Topology::Star);
    let skipped = vec![SkippedEntry {
        index: 4,
        reason: "missing <loc>".to_string(),
    }];

    let report = GraphReport::new("https://a.com/sitemap.xml", &graph, &skipped, &outcome());

    assert_eq!(report.source_url, "https://a.com/sitemap.xml");
    assert_eq!(report.topology, Topology::Star);
    assert_eq!(report.total_nodes, 4);
    assert_eq!(report.total_links, 4);
    assert_eq!(report.components, 1);
    assert_eq!(report.skipped, skipped);
    assert_eq!(report.ticks, 300);
    assert!(!report.stopped);
    assert_eq!(report.oldest_lastmod.as_deref(), Some("2022"));
    assert_eq!(
        report.newest_lastmod.as_deref(),
        Some("2024-06-15T10:30:00+00:00")
    );
}

#[test]
fn test_graph_report_without_lastmod() {
    let graph = build_graph(&[SitemapEntry::new("https://a.com/")], Topology::Star);
    let report = GraphReport::new("u", &graph, &[], &outcome());

    assert!(report.oldest_lastmod.is_none());
    assert!(report.newest_lastmod.is_none());
}

// ============================================================================
// Report Output Tests
// ============================================================================

#[test]
fn test_text_report() {
    let graph = build_graph(&entries(), Topology::Hierarchy);
    let skipped = vec![SkippedEntry {
        index: 7,
        reason: "empty <loc>".to_string(),
    }];
    let report = GraphReport::new("https://a.com/sitemap.xml", &graph, &skipped, &outcome());

    let text = generate_text_report(&report);

    assert!(text.contains("https://a.com/sitemap.xml"));
    assert!(text.contains("Pages:       4"));
    assert!(text.contains("Topology:    hierarchy"));
    assert!(text.contains("Components:  2"));
    assert!(text.contains("300 ticks (cooled down)"));
    assert!(text.contains("Skipped entries: 1"));
    assert!(text.contains("#7: empty <loc>"));
}

#[test]
fn test_json_report() {
    let graph = build_graph(&entries(), Topology::Star);
    let report = GraphReport::new("https://a.com/sitemap.xml", &graph, &[], &outcome());

    let json = generate_json_report(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["report"]["metadata"]["generator"], "sitegraph");
    assert_eq!(value["report"]["summary"]["total_nodes"], 4);
    assert_eq!(value["report"]["summary"]["topology"], "star");
}

#[test]
fn test_graph_json_export() {
    let graph = build_graph(&entries(), Topology::Star);

    let json = generate_graph_json(&graph, &outcome()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["ticks"], 300);
    assert_eq!(value["nodes"].as_array().unwrap().len(), 4);
    assert_eq!(value["nodes"][0]["id"], 0);
    assert_eq!(value["nodes"][0]["loc"], "https://a.com/");
    assert_eq!(value["nodes"][0]["lastmod"], "2023-01-01");
    assert!(value["nodes"][3].get("lastmod").is_none());
    assert!(value["nodes"][0].get("vx").is_none());
    assert_eq!(value["links"][1]["source"], 0);
    assert_eq!(value["links"][1]["target"], 1);
}

#[test]
fn test_save_report() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("report.json");

    save_report("{\"ok\": true}", &path).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"ok\": true}");
}
