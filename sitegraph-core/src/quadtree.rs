//! Barnes–Hut quadtree used by the many-body force.
//!
//! Quads live in an arena. A quad is always pushed after its parent, so a
//! reverse scan of the arena visits children before parents.

const MAX_DEPTH: usize = 48;

#[derive(Debug)]
enum QuadKind {
    Internal([Option<usize>; 4]),
    /// Indices of coincident points
    Leaf(Vec<usize>),
}

#[derive(Debug)]
struct Quad {
    kind: QuadKind,
    /// Sum of point strengths below this quad
    value: f64,
    /// Strength-weighted centre of the points below this quad
    cx: f64,
    cy: f64,
}

/// Square bounds `[x0, x1) x [y0, y1)`
#[derive(Debug, Clone, Copy)]
struct Bounds {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl Bounds {
    fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    fn mid(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    fn quadrant(&self, x: f64, y: f64) -> usize {
        let (xm, ym) = self.mid();
        (x >= xm) as usize | (((y >= ym) as usize) << 1)
    }

    fn child(&self, quadrant: usize) -> Bounds {
        let (xm, ym) = self.mid();
        let right = quadrant & 1 == 1;
        let bottom = quadrant & 2 == 2;
        Bounds {
            x0: if right { xm } else { self.x0 },
            x1: if right { self.x1 } else { xm },
            y0: if bottom { ym } else { self.y0 },
            y1: if bottom { self.y1 } else { ym },
        }
    }
}

/// Parameters for one many-body pass
#[derive(Debug, Clone, Copy)]
pub(crate) struct ApplyParams {
    pub alpha: f64,
    pub theta2: f64,
    pub distance_min2: f64,
    pub distance_max2: f64,
}

#[derive(Debug)]
pub(crate) struct QuadTree<'a> {
    points: &'a [(f64, f64)],
    strengths: &'a [f64],
    quads: Vec<Quad>,
    bounds: Bounds,
}

impl<'a> QuadTree<'a> {
    /// Build a tree over `points`; quad values are summed from `strengths`
    /// (one per point).
    pub(crate) fn new(points: &'a [(f64, f64)], strengths: &'a [f64]) -> Self {
        let mut tree = Self {
            points,
            strengths,
            quads: Vec::with_capacity(points.len() * 2),
            bounds: Self::cover(points),
        };
        for i in 0..points.len() {
            tree.insert(i);
        }
        tree.accumulate();
        tree
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Smallest square containing every point
    fn cover(points: &[(f64, f64)]) -> Bounds {
        let mut x0 = f64::INFINITY;
        let mut y0 = f64::INFINITY;
        let mut x1 = f64::NEG_INFINITY;
        let mut y1 = f64::NEG_INFINITY;
        for &(x, y) in points {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        if points.is_empty() {
            return Bounds {
                x0: 0.0,
                y0: 0.0,
                x1: 1.0,
                y1: 1.0,
            };
        }

        // Pad so points on the far edge still fall inside the half-open square
        let side = ((x1 - x0).max(y1 - y0)).max(1.0) * (1.0 + 1e-9) + 1e-9;
        Bounds {
            x0,
            y0,
            x1: x0 + side,
            y1: y0 + side,
        }
    }

    fn push(&mut self, kind: QuadKind) -> usize {
        self.quads.push(Quad {
            kind,
            value: 0.0,
            cx: 0.0,
            cy: 0.0,
        });
        self.quads.len() - 1
    }

    fn set_child(&mut self, parent: usize, quadrant: usize, child: usize) {
        if let QuadKind::Internal(children) = &mut self.quads[parent].kind {
            children[quadrant] = Some(child);
        }
    }

    fn insert(&mut self, index: usize) {
        let (x, y) = self.points[index];

        if self.quads.is_empty() {
            self.push(QuadKind::Leaf(vec![index]));
            return;
        }

        let mut node = 0;
        let mut bounds = self.bounds;
        let mut depth = 0;

        loop {
            match &mut self.quads[node].kind {
                QuadKind::Internal(children) => {
                    let quadrant = bounds.quadrant(x, y);
                    let child = children[quadrant];
                    bounds = bounds.child(quadrant);
                    depth += 1;
                    match child {
                        Some(child) => node = child,
                        None => {
                            let leaf = self.push(QuadKind::Leaf(vec![index]));
                            self.set_child(node, quadrant, leaf);
                            return;
                        }
                    }
                }
                QuadKind::Leaf(existing) => {
                    let (lx, ly) = self.points[existing[0]];
                    if (lx == x && ly == y) || depth >= MAX_DEPTH {
                        existing.push(index);
                        return;
                    }

                    // Split: the old points move one level down and the new
                    // point descends from here again.
                    let moved = std::mem::take(existing);
                    self.quads[node].kind = QuadKind::Internal([None; 4]);
                    let quadrant = bounds.quadrant(lx, ly);
                    let leaf = self.push(QuadKind::Leaf(moved));
                    self.set_child(node, quadrant, leaf);
                }
            }
        }
    }

    fn accumulate(&mut self) {
        for q in (0..self.quads.len()).rev() {
            let (value, cx, cy) = match &self.quads[q].kind {
                QuadKind::Leaf(points) => {
                    // Points sharing a MAX_DEPTH leaf are treated as coincident.
                    let (x, y) = self.points[points[0]];
                    let value = points.iter().map(|&p| self.strengths[p]).sum::<f64>();
                    (value, x, y)
                }
                QuadKind::Internal(children) => {
                    let mut value = 0.0;
                    let mut weight = 0.0;
                    let mut x = 0.0;
                    let mut y = 0.0;
                    for child in children.iter().flatten() {
                        let child = &self.quads[*child];
                        let c = child.value.abs();
                        if c > 0.0 {
                            value += child.value;
                            weight += c;
                            x += c * child.cx;
                            y += c * child.cy;
                        }
                    }
                    if weight > 0.0 {
                        (value, x / weight, y / weight)
                    } else {
                        (0.0, 0.0, 0.0)
                    }
                }
            };
            let quad = &mut self.quads[q];
            quad.value = value;
            quad.cx = cx;
            quad.cy = cy;
        }
    }

    /// Velocity change for point `index` from every other point.
    ///
    /// Far quads (`width² / θ² < distance²`) are treated as a single body at
    /// their centre. `jiggle` supplies the tiny random offset used when two
    /// positions coincide.
    pub(crate) fn apply(
        &self,
        index: usize,
        params: ApplyParams,
        jiggle: &mut impl FnMut() -> f64,
    ) -> (f64, f64) {
        let (px, py) = self.points[index];
        let mut dvx = 0.0;
        let mut dvy = 0.0;

        if self.quads.is_empty() {
            return (dvx, dvy);
        }

        let mut stack = vec![(0usize, self.bounds)];
        while let Some((q, bounds)) = stack.pop() {
            let quad = &self.quads[q];
            if quad.value == 0.0 {
                continue;
            }

            let mut x = quad.cx - px;
            let mut y = quad.cy - py;
            let w = bounds.width();
            let mut l = x * x + y * y;

            if w * w / params.theta2 < l {
                if l < params.distance_max2 {
                    if x == 0.0 {
                        x = jiggle();
                        l += x * x;
                    }
                    if y == 0.0 {
                        y = jiggle();
                        l += y * y;
                    }
                    if l < params.distance_min2 {
                        l = (params.distance_min2 * l).sqrt();
                    }
                    dvx += x * quad.value * params.alpha / l;
                    dvy += y * quad.value * params.alpha / l;
                }
                continue;
            }

            match &quad.kind {
                QuadKind::Internal(children) => {
                    for (quadrant, child) in children.iter().enumerate().rev() {
                        if let Some(child) = child {
                            stack.push((*child, bounds.child(quadrant)));
                        }
                    }
                }
                QuadKind::Leaf(points) => {
                    if l >= params.distance_max2 {
                        continue;
                    }
                    if points[0] != index || points.len() > 1 {
                        if x == 0.0 {
                            x = jiggle();
                            l += x * x;
                        }
                        if y == 0.0 {
                            y = jiggle();
                            l += y * y;
                        }
                        if l < params.distance_min2 {
                            l = (params.distance_min2 * l).sqrt();
                        }
                    }
                    for &p in points.iter().filter(|&&p| p != index) {
                        let w = self.strengths[p] * params.alpha / l;
                        dvx += x * w;
                        dvy += y * w;
                    }
                }
            }
        }

        (dvx, dvy)
    }
}
