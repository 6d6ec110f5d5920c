use std::collections::VecDeque;
use std::iter;

use tracing::debug;

use crate::error::GraphError;
use crate::volcano::{ValveHandle, Volcano};

/// The opened-valve set during search is a u64, one bit per flowing valve.
pub const MAX_FLOWING: usize = 64;

#[derive(Clone, Copy, Debug)]
struct Hop {
    dist: usize,
    prev: ValveHandle,
}

impl Volcano {
    // Every tunnel takes a minute, so plain BFS gives shortest paths. Flow rates don't matter here.
    fn bfs(&self, from: ValveHandle) -> Vec<Option<Hop>> {
        let mut hops: Vec<Option<Hop>> = vec![None; self.len()];
        let mut queue: VecDeque<ValveHandle> = VecDeque::new();
        hops[from.index()] = Some(Hop { dist: 0, prev: from });
        queue.push_back(from);

        while let Some(vh) = queue.pop_front() {
            let dist = hops[vh.index()].map_or(0, |h| h.dist) + 1;
            for &next in &self.valve(vh).tunnels {
                if hops[next.index()].is_none() {
                    hops[next.index()] = Some(Hop { dist, prev: vh });
                    queue.push_back(next);
                }
            }
        }
        hops
    }

    /// The valves passed through on a shortest walk from `from` to `to`, ending with `to` and not
    /// including `from`. None if `to` can't be reached.
    pub fn route(&self, from: ValveHandle, to: ValveHandle) -> Option<Vec<ValveHandle>> {
        let hops = self.bfs(from);
        if hops[to.index()].is_none() {
            return None;
        }

        let mut route = Vec::new();
        let mut cur = to;
        while cur != from {
            route.push(cur);
            cur = hops[cur.index()]?.prev;
        }
        route.reverse();
        Some(route)
    }
}

#[derive(Clone, Debug)]
struct SquareArray {
    cols: usize,
    data: Vec<usize>,
}

impl SquareArray {
    fn new(cols: usize, initial_value: usize) -> Self {
        Self { cols, data: vec![initial_value; cols * cols] }
    }

    fn get(&self, x: usize, y: usize) -> usize {
        self.data[y * self.cols + x]
    }

    fn set(&mut self, x: usize, y: usize, v: usize) {
        self.data[y * self.cols + x] = v;
    }
}

/// Travel times between the valves worth visiting: every valve with a positive flow rate, sorted by
/// flow rate, descending, and then the start valve if it's dry.
#[derive(Clone, Debug)]
pub struct DistanceTable {
    points: Vec<ValveHandle>,
    flows: Vec<u32>,
    flowing: usize,
    start: usize,
    dists: SquareArray,
}

impl DistanceTable {
    pub fn new(volcano: &Volcano) -> Result<Self, GraphError> {
        let start = volcano.start();
        let mut points: Vec<ValveHandle> = volcano
            .handles()
            .filter(|&vh| volcano.valve(vh).flow > 0)
            .collect();
        points.sort_by(|&a, &b| volcano.valve(b).flow.cmp(&volcano.valve(a).flow));

        let flowing = points.len();
        if flowing > MAX_FLOWING {
            return Err(GraphError::TooManyValves(flowing));
        }
        let start_point = match points.iter().position(|&vh| vh == start) {
            Some(i) => i,
            None => {
                points.push(start);
                points.len() - 1
            },
        };

        // Walk from the start first, so a valve cut off from it is reported that way.
        let mut dists = SquareArray::new(points.len(), usize::MAX);
        let sources = iter::once(start_point).chain((0..points.len()).filter(|&i| i != start_point));
        for i in sources {
            let src = points[i];
            let hops = volcano.bfs(src);
            for (j, &dst) in points.iter().enumerate() {
                let Some(hop) = hops[dst.index()] else {
                    return Err(GraphError::Unreachable {
                        from: volcano.name(src).to_string(),
                        to: volcano.name(dst).to_string(),
                    });
                };
                dists.set(i, j, hop.dist);
            }
        }

        let flows = points.iter().map(|&vh| volcano.valve(vh).flow).collect();
        debug!(points = points.len(), flowing, "computed distance table");
        Ok(DistanceTable { points, flows, flowing, start: start_point, dists })
    }

    /// Number of points of interest, including the start valve.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points `0..flowing()` are the valves worth opening.
    pub fn flowing(&self) -> usize {
        self.flowing
    }

    /// The point we start at.
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn handle(&self, i: usize) -> ValveHandle {
        self.points[i]
    }

    pub fn flow(&self, i: usize) -> u32 {
        self.flows[i]
    }

    /// Minutes needed to walk from point `i` to point `j`.
    pub fn get(&self, i: usize, j: usize) -> usize {
        self.dists.get(i, j)
    }

    /// Like `get`, but by valve. None if either valve isn't a point of interest.
    pub fn distance(&self, a: ValveHandle, b: ValveHandle) -> Option<usize> {
        let i = self.points.iter().position(|&vh| vh == a)?;
        let j = self.points.iter().position(|&vh| vh == b)?;
        Some(self.get(i, j))
    }
}
