use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sitegraph_core::report::{
    ReportFormat, generate_graph_json, generate_json_report, generate_text_report, save_report,
};
use sitegraph_core::{
    Error, GraphReport, RenderOptions, RenderSummary, StatusCallback, SubmitOutcome, Topology,
    Visualizer, extract_url_path,
};
use sitegraph_fetch::{FetchOptions, ParsedSitemap, SitemapFetcher};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Settings for the render and interactive subcommands
#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub output: PathBuf,
    pub json: Option<PathBuf>,
    pub timeout_secs: u64,
    pub topology: Topology,
    pub seed: u64,
    pub format: ReportFormat,
    pub quiet: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            output: PathBuf::from("sitemap.svg"),
            json: None,
            timeout_secs: 10,
            topology: Topology::Star,
            seed: 1,
            format: ReportFormat::Text,
            quiet: false,
        }
    }
}

impl CliOptions {
    pub fn from_matches(args: &ArgMatches, quiet: bool) -> Self {
        let defaults = Self::default();
        Self {
            output: args
                .get_one::<String>("output")
                .map(|raw| resolve_output_path(raw))
                .unwrap_or(defaults.output),
            json: args
                .get_one::<String>("json")
                .map(|raw| resolve_output_path(raw)),
            timeout_secs: args
                .get_one::<u64>("timeout")
                .copied()
                .unwrap_or(defaults.timeout_secs),
            topology: args
                .get_one::<String>("topology")
                .and_then(|value| Topology::from_str(value))
                .unwrap_or(defaults.topology),
            seed: args.get_one::<u64>("seed").copied().unwrap_or(defaults.seed),
            format: args
                .get_one::<String>("format")
                .and_then(|value| ReportFormat::from_str(value))
                .unwrap_or(defaults.format),
            quiet,
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::default()
            .with_topology(self.topology)
            .with_seed(self.seed)
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout_secs: self.timeout_secs,
            ..FetchOptions::default()
        }
    }
}

/// Expand `~` in a user supplied path
pub fn resolve_output_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// `quit` and `exit` (any case) end the interactive loop
pub fn is_quit_command(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "quit" | "exit")
}

pub fn build_visualizer(
    options: &CliOptions,
    status: Option<StatusCallback>,
) -> Result<Visualizer, Error> {
    let fetcher = SitemapFetcher::with_options(&options.fetch_options())?;
    let visualizer = Visualizer::new(fetcher, options.render_options());
    Ok(match status {
        Some(callback) => visualizer.with_status_callback(callback),
        None => visualizer,
    })
}

/// Write the SVG (and the optional JSON graph) for a finished render.
pub fn write_outputs(summary: &RenderSummary, options: &CliOptions) -> Result<(), Error> {
    save_report(&summary.svg, &options.output)?;
    if let Some(json_path) = &options.json {
        let json = generate_graph_json(&summary.graph, &summary.outcome)?;
        save_report(&json, json_path)?;
    }
    Ok(())
}

/// Submit `url` and write the outputs when it renders. A write failure turns
/// the outcome into [`SubmitOutcome::Failed`].
pub async fn submit_and_write(
    visualizer: &Visualizer,
    url: &str,
    options: &CliOptions,
) -> SubmitOutcome {
    match visualizer.submit(url).await {
        SubmitOutcome::Rendered(summary) => match write_outputs(&summary, options) {
            Ok(()) => SubmitOutcome::Rendered(summary),
            Err(e) => {
                tracing::error!("Failed to write {}: {}", options.output.display(), e);
                SubmitOutcome::Failed {
                    token: summary.token,
                    error: e,
                }
            }
        },
        other => other,
    }
}

fn new_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn spinner_status(spinner: &ProgressBar) -> StatusCallback {
    let spinner = spinner.clone();
    Arc::new(move |message: String| spinner.set_message(message))
}

pub fn print_banner() {
    println!(
        "{} {}",
        "sitegraph".bright_cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
    println!("{}", "sitemap.xml -> force-directed SVG".bright_black());
    println!();
}

pub fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_prompt(msg: &str) -> io::Result<()> {
    print!("{} ", msg.bright_cyan().bold());
    io::stdout().flush()
}

pub fn print_summary(report: &GraphReport, options: &CliOptions) {
    if options.format == ReportFormat::Json {
        match generate_json_report(report) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("{} {}", "✗".red().bold(), e),
        }
        return;
    }

    println!(
        "{} Wrote {}",
        "✓".green().bold(),
        options.output.display().to_string().bright_white()
    );
    if let Some(json_path) = &options.json {
        println!(
            "{} Graph JSON: {}",
            "→".blue(),
            json_path.display().to_string().bright_white()
        );
    }
    print!("{}", generate_text_report(report));
}

fn print_outcome(outcome: &SubmitOutcome, options: &CliOptions) {
    match outcome {
        SubmitOutcome::Rendered(summary) => print_summary(&summary.report, options),
        SubmitOutcome::Superseded { token } => {
            println!("{} Submission #{} was superseded", "→".yellow(), token);
        }
        SubmitOutcome::Failed { error, .. } => {
            eprintln!("{} {}", "✗".red().bold(), error);
        }
    }
}

pub async fn handle_render(args: &ArgMatches, quiet: bool) {
    let options = CliOptions::from_matches(args, quiet);
    let url = args
        .get_one::<String>("url")
        .map(String::as_str)
        .unwrap_or_default();

    let spinner = new_spinner(quiet);
    let visualizer = match build_visualizer(&options, Some(spinner_status(&spinner))) {
        Ok(visualizer) => visualizer,
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    let outcome = submit_and_write(&visualizer, url, &options).await;
    spinner.finish_and_clear();
    print_outcome(&outcome, &options);

    if !outcome.is_rendered() {
        std::process::exit(1);
    }
}

/// Read URLs from `input` until EOF or `quit`, submitting each non-empty line.
///
/// Returns the number of submissions that rendered.
pub async fn run_interactive<R: BufRead>(
    visualizer: &Visualizer,
    options: &CliOptions,
    mut input: R,
) -> io::Result<usize> {
    let mut rendered = 0;
    loop {
        if !options.quiet {
            print_prompt("Enter sitemap URL:")?;
        }

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let url = line.trim();
        if url.is_empty() {
            continue;
        }
        if is_quit_command(url) {
            break;
        }

        let outcome = submit_and_write(visualizer, url, options).await;
        if outcome.is_rendered() {
            rendered += 1;
        }
        if !options.quiet {
            print_outcome(&outcome, options);
            println!();
        }
    }
    Ok(rendered)
}

pub async fn handle_interactive(args: &ArgMatches, quiet: bool) {
    let options = CliOptions::from_matches(args, quiet);

    if !quiet {
        print_divider();
        println!("{}", "  SITEGRAPH INTERACTIVE".bright_white().bold());
        print_divider();
        println!(
            "{} Output: {}",
            "→".blue(),
            options.output.display().to_string().bright_white()
        );
        println!("{} Type {} to leave", "ℹ".blue(), "quit".bright_white());
        println!();
    }

    let visualizer = match build_visualizer(&options, None) {
        Ok(visualizer) => visualizer,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    match run_interactive(&visualizer, &options, stdin.lock()).await {
        Ok(rendered) if !quiet => {
            println!("{} {} sitemap(s) rendered", "✓".green().bold(), rendered);
        }
        Ok(_) => {}
        Err(e) => {
            eprintln!("{} Failed to read input: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// One line per entry: path, full URL and lastmod when present
pub fn format_entries(sitemap: &ParsedSitemap) -> String {
    let mut out = String::new();
    for (index, entry) in sitemap.entries.iter().enumerate() {
        out.push_str(&format!(
            "  {:>4}  {}  {}",
            index,
            extract_url_path(&entry.loc),
            entry.loc
        ));
        if let Some(lastmod) = &entry.lastmod {
            out.push_str(&format!("  ({})", lastmod));
        }
        out.push('\n');
    }
    for skipped in &sitemap.skipped {
        out.push_str(&format!(
            "  skipped <url> #{}: {}\n",
            skipped.index, skipped.reason
        ));
    }
    out
}

pub async fn handle_parse(args: &ArgMatches, quiet: bool) {
    let url = args
        .get_one::<String>("url")
        .map(String::as_str)
        .unwrap_or_default();
    let timeout_secs = args.get_one::<u64>("timeout").copied().unwrap_or(10);
    let as_json = args.get_flag("json");

    let spinner = new_spinner(quiet || as_json);
    spinner.set_message(format!("Fetching {}", url));

    let result = match SitemapFetcher::with_timeout(timeout_secs) {
        Ok(fetcher) => fetcher.load_sitemap(url).await,
        Err(e) => Err(e),
    };
    spinner.finish_and_clear();

    let sitemap = match result {
        Ok(sitemap) => sitemap,
        Err(e) => {
            tracing::error!("Error fetching sitemap {}: {}", url, e);
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    if as_json {
        match serde_json::to_string_pretty(&sitemap) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("{} {}", "✗".red().bold(), e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!(
        "{} {} entries, {} skipped",
        "✓".green().bold(),
        sitemap.len(),
        sitemap.skipped.len()
    );
    print!("{}", format_entries(&sitemap));
}
