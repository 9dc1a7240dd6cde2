pub mod error;
pub mod forces;
pub mod graph;
pub mod layout;
pub mod model;
mod quadtree;
pub mod render;
pub mod report;
pub mod scene;
pub mod visualizer;

pub use error::{Error, LayoutError, Result};
pub use graph::{build_graph, extract_url_path};
pub use layout::{Simulation, SimulationConfig, SimulationOutcome, StopHandle};
pub use model::{GraphLink, GraphNode, SiteGraph, Topology};
pub use render::{PreparedRender, RenderOptions, RenderResult, render_entries};
pub use report::GraphReport;
pub use scene::{Scene, SvgContainer};
pub use visualizer::{RenderSummary, StatusCallback, SubmitOutcome, Visualizer};
