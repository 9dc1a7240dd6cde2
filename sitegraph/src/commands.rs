use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitegraph")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitegraph")
        .about("Fetch an XML sitemap and draw its pages as a force-directed graph")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(render_args(
            command!("render")
                .about("Fetch a sitemap once and write the laid-out graph as SVG")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The sitemap URL, passed as typed"),
                ),
        ))
        .subcommand(render_args(
            command!("interactive").about(
                "Prompt for sitemap URLs; every successful submission replaces the output \
                file",
            ),
        ))
        .subcommand(
            command!("parse")
                .about("Fetch and parse a sitemap without laying it out")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The sitemap URL"),
                )
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Print the parsed entries as JSON")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(timeout_arg()),
        )
}

fn timeout_arg() -> clap::Arg {
    arg!(--"timeout" <SECONDS>)
        .required(false)
        .help("Request timeout in seconds")
        .value_parser(clap::value_parser!(u64))
        .default_value("10")
}

/// Arguments shared by the subcommands that render
fn render_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(-o --"output" <PATH>)
            .required(false)
            .help("Where to write the SVG")
            .default_value("sitemap.svg"),
    )
    .arg(
        arg!(--"json" <PATH>)
            .required(false)
            .help("Also write the laid-out graph (nodes, positions, links) as JSON"),
    )
    .arg(
        arg!(--"topology" <TOPOLOGY>)
            .required(false)
            .help("How pages are linked: star (every page to the first) or hierarchy (URL paths)")
            .value_parser(["star", "hierarchy"])
            .default_value("star"),
    )
    .arg(
        arg!(-f --"format" <FORMAT>)
            .required(false)
            .help("Summary format: text, json")
            .value_parser(["text", "json"])
            .default_value("text"),
    )
    .arg(
        arg!(--"seed" <N>)
            .required(false)
            .help("Random seed for the layout")
            .value_parser(clap::value_parser!(u64))
            .default_value("1"),
    )
    .arg(timeout_arg())
}
