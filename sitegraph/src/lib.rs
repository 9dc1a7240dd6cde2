// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

pub use handlers::{
    CliOptions, build_visualizer, format_entries, is_quit_command, resolve_output_path,
    run_interactive, submit_and_write, write_outputs,
};

pub use sitegraph_core::{RenderOptions, SubmitOutcome, Topology, Visualizer, extract_url_path};
