use crate::error::LayoutError;
use crate::forces::{CenterForce, Force, LinkForce, ManyBodyForce};
use crate::model::{GraphLink, GraphNode};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

const INITIAL_RADIUS: f64 = 10.0;

/// Parameters of the force simulation. Defaults reproduce d3-force.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub alpha: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    pub alpha_target: f64,
    /// Fraction of velocity lost per tick
    pub velocity_decay: f64,
    pub link_distance: f64,
    pub link_iterations: usize,
    pub charge_strength: f64,
    pub theta: f64,
    pub distance_min: f64,
    pub distance_max: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub center_strength: f64,
    /// Seed for the jiggle applied to coincident positions
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let alpha_min: f64 = 0.001;
        Self {
            alpha: 1.0,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            alpha_target: 0.0,
            velocity_decay: 0.4,
            link_distance: 30.0,
            link_iterations: 1,
            charge_strength: -30.0,
            theta: 0.9,
            distance_min: 1.0,
            distance_max: f64::INFINITY,
            center_x: 400.0,
            center_y: 300.0,
            center_strength: 1.0,
            seed: 1,
        }
    }
}

impl SimulationConfig {
    pub fn with_center(mut self, x: f64, y: f64) -> Self {
        self.center_x = x;
        self.center_y = y;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Shared flag used to stop a running simulation from another thread
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// State passed to the tick observer after every step
pub struct TickEvent<'a> {
    pub tick: usize,
    pub alpha: f64,
    pub nodes: &'a [GraphNode],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub ticks: usize,
    pub alpha: f64,
    /// True when the stop handle ended the run before cooldown
    pub stopped: bool,
}

/// Force-directed layout over a set of nodes.
///
/// Forces run in insertion order (link, charge, center) on every tick, then
/// velocities are damped and integrated into positions.
pub struct Simulation {
    nodes: Vec<GraphNode>,
    forces: Vec<Box<dyn Force>>,
    alpha: f64,
    alpha_min: f64,
    alpha_decay: f64,
    alpha_target: f64,
    velocity_decay: f64,
    rng: StdRng,
    stop: StopHandle,
}

impl Simulation {
    /// Build a simulation with the standard link, charge and center forces.
    pub fn new(
        nodes: Vec<GraphNode>,
        links: &[GraphLink],
        config: &SimulationConfig,
    ) -> Result<Self, LayoutError> {
        let mut simulation = Self::empty(nodes, config);
        simulation.add_force(Box::new(
            LinkForce::new(links)
                .with_distance(config.link_distance)
                .with_iterations(config.link_iterations),
        ))?;
        simulation.add_force(Box::new(
            ManyBodyForce::new()
                .with_strength(config.charge_strength)
                .with_theta(config.theta)
                .with_distance_range(config.distance_min, config.distance_max),
        ))?;
        simulation.add_force(Box::new(
            CenterForce::new(config.center_x, config.center_y)
                .with_strength(config.center_strength),
        ))?;
        Ok(simulation)
    }

    /// A simulation with no forces; nodes are placed on the initial spiral.
    pub fn empty(mut nodes: Vec<GraphNode>, config: &SimulationConfig) -> Self {
        place_initial(&mut nodes);
        Self {
            nodes,
            forces: Vec::new(),
            alpha: config.alpha,
            alpha_min: config.alpha_min,
            alpha_decay: config.alpha_decay,
            alpha_target: config.alpha_target,
            velocity_decay: 1.0 - config.velocity_decay,
            rng: StdRng::seed_from_u64(config.seed),
            stop: StopHandle::default(),
        }
    }

    pub fn add_force(&mut self, mut force: Box<dyn Force>) -> Result<(), LayoutError> {
        force.initialize(&self.nodes)?;
        debug!("Registered {} force", force.name());
        self.forces.push(force);
        Ok(())
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<GraphNode> {
        self.nodes
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Advance the simulation by one step.
    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

        for force in self.forces.iter_mut() {
            force.apply(&mut self.nodes, self.alpha, &mut self.rng);
        }

        for node in self.nodes.iter_mut() {
            node.vx *= self.velocity_decay;
            node.x += node.vx;
            node.vy *= self.velocity_decay;
            node.y += node.vy;
        }
    }

    /// Tick until alpha cools below `alpha_min`, calling `on_tick` after every
    /// step. The stop handle is checked before each step.
    pub fn run<F>(&mut self, mut on_tick: F) -> SimulationOutcome
    where
        F: FnMut(&TickEvent<'_>),
    {
        let mut ticks = 0;
        loop {
            if self.stop.is_stopped() {
                debug!("Simulation stopped after {} ticks", ticks);
                return SimulationOutcome {
                    ticks,
                    alpha: self.alpha,
                    stopped: true,
                };
            }

            self.tick();
            ticks += 1;
            on_tick(&TickEvent {
                tick: ticks,
                alpha: self.alpha,
                nodes: &self.nodes,
            });

            if self.alpha < self.alpha_min {
                break;
            }
        }

        debug!("Simulation cooled down after {} ticks", ticks);
        SimulationOutcome {
            ticks,
            alpha: self.alpha,
            stopped: false,
        }
    }
}

/// Phyllotaxis arrangement: node `i` at radius `10·√(0.5+i)`, angle
/// `i·π(3−√5)`. Velocities are reset.
pub fn place_initial(nodes: &mut [GraphNode]) {
    let initial_angle = PI * (3.0 - 5f64.sqrt());
    for (i, node) in nodes.iter_mut().enumerate() {
        let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
        let angle = i as f64 * initial_angle;
        node.x = radius * angle.cos();
        node.y = radius * angle.sin();
        node.vx = 0.0;
        node.vy = 0.0;
    }
}
