// Tests for the SVG scene and container

use sitegraph_core::render::{RenderOptions, render_entries};
use sitegraph_core::scene::{Scene, SvgContainer, fmt_num};
use sitegraph_core::{GraphLink, GraphNode};
use sitegraph_fetch::SitemapEntry;

fn sample_entries() -> Vec<SitemapEntry> {
    vec![
        SitemapEntry::new("https://a.com/").with_lastmod("2023-01-01"),
        SitemapEntry::new("https://a.com/b"),
    ]
}

fn count_elements(svg: &str, name: &str) -> usize {
    let doc = roxmltree::Document::parse(svg).unwrap();
    doc.descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == name)
        .count()
}

// ============================================================================
// Scene Binding Tests
// ============================================================================

#[test]
fn test_bind_rejects_unknown_link_target() {
    let nodes = vec![GraphNode::new(0, SitemapEntry::new("https://a.com/"))];
    let links = vec![GraphLink {
        source: 0,
        target: 1,
    }];

    assert!(Scene::bind(&nodes, &links, 800.0, 600.0).is_err());
}

#[test]
fn test_bind_copies_positions() {
    let mut a = GraphNode::new(0, SitemapEntry::new("https://a.com/"));
    a.x = 10.0;
    a.y = 20.0;
    let mut b = GraphNode::new(1, SitemapEntry::new("https://a.com/b"));
    b.x = 30.0;
    b.y = 40.0;
    let links = vec![GraphLink {
        source: 0,
        target: 1,
    }];

    let scene = Scene::bind(&[a, b], &links, 800.0, 600.0).unwrap();

    assert_eq!(scene.circles[1].cx, 30.0);
    assert_eq!(
        (
            scene.lines[0].x1,
            scene.lines[0].y1,
            scene.lines[0].x2,
            scene.lines[0].y2
        ),
        (10.0, 20.0, 30.0, 40.0)
    );
}

#[test]
fn test_update_moves_elements() {
    let mut nodes = vec![GraphNode::new(0, SitemapEntry::new("https://a.com/"))];
    let links = vec![GraphLink {
        source: 0,
        target: 0,
    }];
    let mut scene = Scene::bind(&nodes, &links, 800.0, 600.0).unwrap();

    nodes[0].x = 123.0;
    nodes[0].y = 45.5;
    scene.update(&nodes);

    assert_eq!((scene.circles[0].cx, scene.circles[0].cy), (123.0, 45.5));
    assert_eq!((scene.lines[0].x2, scene.lines[0].y2), (123.0, 45.5));
}

// ============================================================================
// SVG Output Tests
// ============================================================================

#[test]
fn test_two_entries_render_two_circles_two_lines() {
    let result = render_entries(&sample_entries(), &RenderOptions::default()).unwrap();
    let svg = result.scene.to_svg();

    assert_eq!(count_elements(&svg, "svg"), 1);
    assert_eq!(count_elements(&svg, "circle"), 2);
    assert_eq!(count_elements(&svg, "line"), 2);
}

#[test]
fn test_svg_attributes() {
    let result = render_entries(&sample_entries(), &RenderOptions::default()).unwrap();
    let svg = result.scene.to_svg();
    let doc = roxmltree::Document::parse(&svg).unwrap();

    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "svg");
    assert_eq!(root.attribute("width"), Some("800"));
    assert_eq!(root.attribute("height"), Some("600"));

    for circle in doc.descendants().filter(|n| n.has_tag_name("circle")) {
        assert_eq!(circle.attribute("r"), Some("5"));
        assert_eq!(circle.attribute("fill"), Some("blue"));
        let cx: f64 = circle.attribute("cx").unwrap().parse().unwrap();
        let cy: f64 = circle.attribute("cy").unwrap().parse().unwrap();
        assert!(cx.is_finite() && cy.is_finite());
    }
    for line in doc.descendants().filter(|n| n.has_tag_name("line")) {
        assert_eq!(line.attribute("stroke-width"), Some("1.5"));
    }
}

#[test]
fn test_circle_positions_match_nodes() {
    let result = render_entries(&sample_entries(), &RenderOptions::default()).unwrap();
    let svg = result.scene.to_svg();
    let doc = roxmltree::Document::parse(&svg).unwrap();

    let circles: Vec<_> = doc
        .descendants()
        .filter(|n| n.has_tag_name("circle"))
        .collect();
    for (circle, node) in circles.iter().zip(&result.graph.nodes) {
        assert_eq!(circle.attribute("cx"), Some(fmt_num(node.x).as_str()));
        assert_eq!(circle.attribute("cy"), Some(fmt_num(node.y).as_str()));
    }
}

#[test]
fn test_empty_graph_renders_empty_svg() {
    let result = render_entries(&[], &RenderOptions::default()).unwrap();
    let svg = result.scene.to_svg();

    assert_eq!(count_elements(&svg, "svg"), 1);
    assert_eq!(count_elements(&svg, "circle"), 0);
    assert_eq!(count_elements(&svg, "line"), 0);
}

// ============================================================================
// Container Tests
// ============================================================================

#[test]
fn test_container_holds_one_svg() {
    let mut container = SvgContainer::default();

    for _ in 0..5 {
        let result = render_entries(&sample_entries(), &RenderOptions::default()).unwrap();
        container.mount(result.scene);
        assert_eq!(container.len(), 1);
    }
}

#[test]
fn test_container_clear() {
    let mut container = SvgContainer::new("graph");
    let result = render_entries(&sample_entries(), &RenderOptions::default()).unwrap();
    container.mount(result.scene);

    container.clear();

    assert!(container.is_empty());
    assert!(container.scene().is_none());
    assert_eq!(container.id(), "graph");
}
