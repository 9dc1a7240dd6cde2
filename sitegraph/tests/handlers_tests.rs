use sitegraph::handlers::*;
use sitegraph::{SubmitOutcome, Topology};
use sitegraph_fetch::{ParsedSitemap, SitemapEntry, SkippedEntry};
use std::io::Cursor;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const SITEMAP: &str = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://a.com/</loc><lastmod>2023-01-01</lastmod></url>
  <url><loc>https://a.com/b</loc></url>
</urlset>"#;

async fn sitemap_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SITEMAP))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    server
}

fn options_in(dir: &TempDir) -> CliOptions {
    CliOptions {
        output: dir.path().join("sitemap.svg"),
        json: Some(dir.path().join("graph.json")),
        quiet: true,
        ..CliOptions::default()
    }
}

#[test]
fn test_resolve_output_path_plain() {
    assert_eq!(
        resolve_output_path("out/sitemap.svg"),
        PathBuf::from("out/sitemap.svg")
    );
}

#[test]
fn test_resolve_output_path_tilde() {
    let resolved = resolve_output_path("~/sitemap.svg");
    assert!(!resolved.to_string_lossy().starts_with('~'));
    assert!(resolved.ends_with("sitemap.svg"));
}

#[test]
fn test_is_quit_command() {
    assert!(is_quit_command("quit"));
    assert!(is_quit_command("  EXIT "));
    assert!(!is_quit_command("https://a.com/quit"));
    assert!(!is_quit_command(""));
}

#[test]
fn test_cli_options_defaults() {
    let options = CliOptions::default();
    assert_eq!(options.output, PathBuf::from("sitemap.svg"));
    assert_eq!(options.timeout_secs, 10);
    assert_eq!(options.topology, Topology::Star);
    assert_eq!(options.seed, 1);

    let render = options.render_options();
    assert_eq!(render.width, 800.0);
    assert_eq!(render.height, 600.0);
    assert_eq!(render.simulation.seed, 1);
    assert_eq!(options.fetch_options().timeout_secs, 10);
}

#[test]
fn test_format_entries() {
    let sitemap = ParsedSitemap {
        entries: vec![
            SitemapEntry::new("https://a.com/").with_lastmod("2023-01-01"),
            SitemapEntry::new("https://a.com/docs/intro"),
        ],
        skipped: vec![SkippedEntry {
            index: 2,
            reason: "missing <loc> element".to_string(),
        }],
    };

    let text = format_entries(&sitemap);
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("https://a.com/"));
    assert!(lines[0].contains("(2023-01-01)"));
    assert!(lines[1].contains("/docs/intro"));
    assert!(lines[2].contains("skipped <url> #2"));
}

#[tokio::test]
async fn test_submit_and_write_creates_files() {
    let server = sitemap_server().await;
    let dir = TempDir::new().unwrap();
    let options = options_in(&dir);
    let visualizer = build_visualizer(&options, None).unwrap();

    let outcome =
        submit_and_write(&visualizer, &format!("{}/sitemap.xml", server.uri()), &options).await;

    assert!(outcome.is_rendered());
    let svg = std::fs::read_to_string(&options.output).unwrap();
    assert!(svg.starts_with("<svg"));
    assert_eq!(svg.matches("<circle").count(), 2);
    assert_eq!(svg.matches("<line").count(), 2);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("graph.json")).unwrap())
            .unwrap();
    assert_eq!(json["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(json["topology"], "star");
}

#[tokio::test]
async fn test_failed_submission_keeps_existing_file() {
    let server = sitemap_server().await;
    let dir = TempDir::new().unwrap();
    let options = options_in(&dir);
    let visualizer = build_visualizer(&options, None).unwrap();

    submit_and_write(&visualizer, &format!("{}/sitemap.xml", server.uri()), &options).await;
    let before = std::fs::read_to_string(&options.output).unwrap();

    let outcome =
        submit_and_write(&visualizer, &format!("{}/missing.xml", server.uri()), &options).await;

    assert!(matches!(outcome, SubmitOutcome::Failed { .. }));
    assert_eq!(std::fs::read_to_string(&options.output).unwrap(), before);
}

#[tokio::test]
async fn test_unwritable_output_is_a_failure() {
    let server = sitemap_server().await;
    let dir = TempDir::new().unwrap();
    let options = CliOptions {
        output: dir.path().join("no-such-dir").join("sitemap.svg"),
        quiet: true,
        ..CliOptions::default()
    };
    let visualizer = build_visualizer(&options, None).unwrap();

    let outcome =
        submit_and_write(&visualizer, &format!("{}/sitemap.xml", server.uri()), &options).await;

    assert!(matches!(
        outcome,
        SubmitOutcome::Failed {
            error: sitegraph_core::Error::Io(_),
            ..
        }
    ));
}

#[tokio::test]
async fn test_run_interactive_until_quit() {
    let server = sitemap_server().await;
    let dir = TempDir::new().unwrap();
    let options = options_in(&dir);
    let visualizer = build_visualizer(&options, None).unwrap();
    let input = format!(
        "{url}\n\n{url}\nnot a url\nquit\n{url}\n",
        url = format!("{}/sitemap.xml", server.uri())
    );

    let rendered = run_interactive(&visualizer, &options, Cursor::new(input))
        .await
        .unwrap();

    assert_eq!(rendered, 2);
    assert_eq!(visualizer.latest_token(), 3);
    assert_eq!(visualizer.mounted_count().await, 1);
    assert!(options.output.exists());
}

#[tokio::test]
async fn test_run_interactive_stops_at_eof() {
    let dir = TempDir::new().unwrap();
    let options = options_in(&dir);
    let visualizer = build_visualizer(&options, None).unwrap();

    let rendered = run_interactive(&visualizer, &options, Cursor::new(""))
        .await
        .unwrap();

    assert_eq!(rendered, 0);
    assert_eq!(visualizer.latest_token(), 0);
    assert!(!options.output.exists());
}
