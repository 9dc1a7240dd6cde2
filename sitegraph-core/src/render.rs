use crate::error::LayoutError;
use crate::graph::build_graph;
use crate::layout::{Simulation, SimulationConfig, SimulationOutcome, StopHandle, TickEvent};
use crate::model::{GraphLink, SiteGraph, Topology};
use crate::scene::{DEFAULT_HEIGHT, DEFAULT_WIDTH, Scene};
use sitegraph_fetch::SitemapEntry;
use tracing::debug;

/// Called with the tick number and alpha after every simulation step
pub type TickCallback = Box<dyn FnMut(usize, f64) + Send>;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub width: f64,
    pub height: f64,
    pub topology: Topology,
    pub simulation: SimulationConfig,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            topology: Topology::default(),
            simulation: SimulationConfig::default()
                .with_center(DEFAULT_WIDTH / 2.0, DEFAULT_HEIGHT / 2.0),
        }
    }
}

impl RenderOptions {
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.simulation.seed = seed;
        self
    }
}

/// A finished layout: final node positions, the scene bound to them, and how
/// the simulation ended.
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub graph: SiteGraph,
    pub scene: Scene,
    pub outcome: SimulationOutcome,
}

/// A graph with its simulation and scene set up but not yet run.
///
/// Splitting preparation from running lets the caller take the stop handle
/// before the simulation moves onto another thread.
pub struct PreparedRender {
    topology: Topology,
    links: Vec<GraphLink>,
    simulation: Simulation,
    scene: Scene,
    on_tick: Option<TickCallback>,
}

impl PreparedRender {
    pub fn new(entries: &[SitemapEntry], options: &RenderOptions) -> Result<Self, LayoutError> {
        let graph = build_graph(entries, options.topology);
        debug!(
            "Preparing {} layout: {} nodes, {} links",
            graph.topology.as_str(),
            graph.node_count(),
            graph.link_count()
        );

        let SiteGraph {
            topology,
            nodes,
            links,
        } = graph;
        let simulation = Simulation::new(nodes, &links, &options.simulation)?;
        let scene = Scene::bind(simulation.nodes(), &links, options.width, options.height)?;

        Ok(Self {
            topology,
            links,
            simulation,
            scene,
            on_tick: None,
        })
    }

    pub fn with_tick_callback(mut self, callback: TickCallback) -> Self {
        self.on_tick = Some(callback);
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.simulation.stop_handle()
    }

    pub fn node_count(&self) -> usize {
        self.simulation.nodes().len()
    }

    /// Run the simulation to cooldown (or until stopped), keeping the scene in
    /// step with the nodes after every tick.
    pub fn run(self) -> RenderResult {
        let Self {
            topology,
            links,
            mut simulation,
            mut scene,
            mut on_tick,
        } = self;

        let outcome = simulation.run(|event: &TickEvent<'_>| {
            scene.update(event.nodes);
            if let Some(callback) = on_tick.as_mut() {
                callback(event.tick, event.alpha);
            }
        });

        RenderResult {
            graph: SiteGraph {
                topology,
                nodes: simulation.into_nodes(),
                links,
            },
            scene,
            outcome,
        }
    }
}

/// Build, lay out and draw `entries` in one call.
pub fn render_entries(
    entries: &[SitemapEntry],
    options: &RenderOptions,
) -> Result<RenderResult, LayoutError> {
    Ok(PreparedRender::new(entries, options)?.run())
}
