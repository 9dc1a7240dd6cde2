use crate::error::LayoutError;
use crate::model::{GraphLink, GraphNode};
use crate::quadtree::{ApplyParams, QuadTree};
use rand::Rng;
use rand::rngs::StdRng;
use std::collections::HashMap;

/// Tiny random offset used to separate coincident positions
pub(crate) fn jiggle(rng: &mut StdRng) -> f64 {
    (rng.random::<f64>() - 0.5) * 1e-6
}

/// A force applied to the nodes on every simulation tick
pub trait Force: Send {
    fn name(&self) -> &'static str;

    /// Called once with the simulation's nodes before the first tick.
    fn initialize(&mut self, _nodes: &[GraphNode]) -> Result<(), LayoutError> {
        Ok(())
    }

    fn apply(&mut self, nodes: &mut [GraphNode], alpha: f64, rng: &mut StdRng);
}

/// Spring force pulling linked nodes toward a fixed distance.
///
/// Links are resolved by node id. Strength defaults to
/// `1 / min(degree(source), degree(target))` and the correction is split
/// between both ends by relative degree.
pub struct LinkForce {
    links: Vec<GraphLink>,
    distance: f64,
    iterations: usize,
    resolved: Vec<(usize, usize)>,
    strengths: Vec<f64>,
    bias: Vec<f64>,
}

impl LinkForce {
    pub fn new(links: &[GraphLink]) -> Self {
        Self {
            links: links.to_vec(),
            distance: 30.0,
            iterations: 1,
            resolved: Vec::new(),
            strengths: Vec::new(),
            bias: Vec::new(),
        }
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations.max(1);
        self
    }
}

impl Force for LinkForce {
    fn name(&self) -> &'static str {
        "link"
    }

    fn initialize(&mut self, nodes: &[GraphNode]) -> Result<(), LayoutError> {
        let by_id: HashMap<usize, usize> = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id, index))
            .collect();

        let mut resolved = Vec::with_capacity(self.links.len());
        for link in &self.links {
            let source = *by_id
                .get(&link.source)
                .ok_or(LayoutError::MissingNode { id: link.source })?;
            let target = *by_id
                .get(&link.target)
                .ok_or(LayoutError::MissingNode { id: link.target })?;
            resolved.push((source, target));
        }

        let mut count = vec![0usize; nodes.len()];
        for &(source, target) in &resolved {
            count[source] += 1;
            count[target] += 1;
        }

        self.strengths = resolved
            .iter()
            .map(|&(s, t)| 1.0 / count[s].min(count[t]) as f64)
            .collect();
        self.bias = resolved
            .iter()
            .map(|&(s, t)| count[s] as f64 / (count[s] + count[t]) as f64)
            .collect();
        self.resolved = resolved;
        Ok(())
    }

    fn apply(&mut self, nodes: &mut [GraphNode], alpha: f64, rng: &mut StdRng) {
        for _ in 0..self.iterations {
            for (i, &(s, t)) in self.resolved.iter().enumerate() {
                let mut x = nodes[t].x + nodes[t].vx - nodes[s].x - nodes[s].vx;
                if x == 0.0 {
                    x = jiggle(rng);
                }
                let mut y = nodes[t].y + nodes[t].vy - nodes[s].y - nodes[s].vy;
                if y == 0.0 {
                    y = jiggle(rng);
                }

                let mut l = (x * x + y * y).sqrt();
                l = (l - self.distance) / l * alpha * self.strengths[i];
                x *= l;
                y *= l;

                let b = self.bias[i];
                nodes[t].vx -= x * b;
                nodes[t].vy -= y * b;
                nodes[s].vx += x * (1.0 - b);
                nodes[s].vy += y * (1.0 - b);
            }
        }
    }
}

/// Repulsion (negative strength) or attraction between every pair of nodes,
/// approximated with a Barnes–Hut quadtree.
pub struct ManyBodyForce {
    strength: f64,
    theta: f64,
    distance_min: f64,
    distance_max: f64,
}

impl ManyBodyForce {
    pub fn new() -> Self {
        Self {
            strength: -30.0,
            theta: 0.9,
            distance_min: 1.0,
            distance_max: f64::INFINITY,
        }
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    pub fn with_distance_range(mut self, min: f64, max: f64) -> Self {
        self.distance_min = min;
        self.distance_max = max;
        self
    }
}

impl Default for ManyBodyForce {
    fn default() -> Self {
        Self::new()
    }
}

impl Force for ManyBodyForce {
    fn name(&self) -> &'static str {
        "charge"
    }

    fn apply(&mut self, nodes: &mut [GraphNode], alpha: f64, rng: &mut StdRng) {
        let points: Vec<(f64, f64)> = nodes.iter().map(|n| (n.x, n.y)).collect();
        let strengths = vec![self.strength; nodes.len()];
        let tree = QuadTree::new(&points, &strengths);
        if tree.is_empty() {
            return;
        }

        let params = ApplyParams {
            alpha,
            theta2: self.theta * self.theta,
            distance_min2: self.distance_min * self.distance_min,
            distance_max2: self.distance_max * self.distance_max,
        };
        let mut offset = || jiggle(rng);

        for (index, node) in nodes.iter_mut().enumerate() {
            let (dvx, dvy) = tree.apply(index, params, &mut offset);
            node.vx += dvx;
            node.vy += dvy;
        }
    }
}

/// Translates the whole layout so its centroid sits on a fixed point.
///
/// Moves positions directly and leaves velocities alone.
pub struct CenterForce {
    x: f64,
    y: f64,
    strength: f64,
}

impl CenterForce {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, strength: 1.0 }
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }
}

impl Force for CenterForce {
    fn name(&self) -> &'static str {
        "center"
    }

    fn apply(&mut self, nodes: &mut [GraphNode], _alpha: f64, _rng: &mut StdRng) {
        if nodes.is_empty() {
            return;
        }

        let n = nodes.len() as f64;
        let (sx, sy) = nodes
            .iter()
            .fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
        let sx = (sx / n - self.x) * self.strength;
        let sy = (sy / n - self.y) * self.strength;

        for node in nodes.iter_mut() {
            node.x -= sx;
            node.y -= sy;
        }
    }
}
