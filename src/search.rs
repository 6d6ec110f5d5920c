use smallvec::SmallVec;
use tracing::debug;

use crate::actions::{Action, ActionSequence};
use crate::error::GraphError;
use crate::paths::DistanceTable;
use crate::volcano::{ValveHandle, Volcano};

/// The best order found to open valves in, and how much pressure it releases.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Plan {
    pub pressure: u64,
    pub order: Vec<ValveHandle>,
}

impl Plan {
    /// Expand the plan into single moves, walking shortest routes between the valves it opens.
    pub fn actions(&self, volcano: &Volcano) -> Result<ActionSequence, GraphError> {
        let mut actions = ActionSequence::new();
        let mut at = volcano.start();
        for &valve in &self.order {
            let route = volcano.route(at, valve).ok_or_else(|| GraphError::Unreachable {
                from: volcano.name(at).to_string(),
                to: volcano.name(valve).to_string(),
            })?;
            for vh in route {
                actions.push(Action::MoveTo(vh));
            }
            actions.push(Action::Open);
            at = valve;
        }
        Ok(actions)
    }
}

// Indexes are into the DistanceTable's points of interest. Flow rates are u32 and there are at most
// 64 flowing valves, so u64 pressure can't overflow for any sensible number of minutes.
#[derive(Clone, Debug)]
struct State {
    room: usize,
    minutes_left: usize,
    opened: u64,
    pressure_released: u64,
    order: SmallVec<[u8; 16]>,
}

/// Depth-first branch and bound over the order valves get opened in. Walking between valves is
/// collapsed into single steps using the distance table, so a state is only ever "just opened a
/// valve".
pub struct Search<'a> {
    paths: &'a DistanceTable,
    minutes: usize,
    nstates: usize,
}

impl<'a> Search<'a> {
    pub fn new(paths: &'a DistanceTable, minutes: usize) -> Self {
        Search { paths, minutes, nstates: 0 }
    }

    pub fn run(mut self) -> Plan {
        let start = State {
            room: self.paths.start(),
            minutes_left: self.minutes,
            opened: 0,
            pressure_released: 0,
            order: SmallVec::new(),
        };
        let mut best = start.clone();
        self.explore(start, &mut best);

        debug!(nstates = self.nstates, pressure = best.pressure_released, "search finished");
        Plan {
            pressure: best.pressure_released,
            order: best.order.iter().map(|&i| self.paths.handle(i as usize)).collect(),
        }
    }

    fn explore(&mut self, state: State, best: &mut State) {
        self.nstates += 1;
        if state.pressure_released > best.pressure_released {
            *best = state.clone();
        }
        if self.upper_bound(&state) <= best.pressure_released {
            return;
        }

        // Points are sorted by flow rate, so the big valves get tried first and raise the best
        // score early.
        for next in 0..self.paths.flowing() {
            if let Some(child) = self.open(&state, next) {
                self.explore(child, best);
            }
        }
    }

    /// Minutes to walk to `next` and open it, if it's still closed and there's time.
    fn cost(&self, state: &State, next: usize) -> Option<usize> {
        if state.opened & (1 << next) != 0 {
            return None;
        }
        let cost = self.paths.get(state.room, next) + 1;
        (cost <= state.minutes_left).then_some(cost)
    }

    fn open(&self, state: &State, next: usize) -> Option<State> {
        let minutes_left = state.minutes_left - self.cost(state, next)?;
        let mut order = state.order.clone();
        order.push(next as u8);
        Some(State {
            room: next,
            minutes_left,
            opened: state.opened | (1 << next),
            pressure_released: state.pressure_released + released(self.paths.flow(next), minutes_left),
            order,
        })
    }

    // Pretend we could walk straight to every closed valve from here. No valve can be opened any
    // sooner than that, since the distances are shortest paths.
    fn upper_bound(&self, state: &State) -> u64 {
        let unreleased: u64 = (0..self.paths.flowing())
            .filter_map(|next| {
                let cost = self.cost(state, next)?;
                Some(released(self.paths.flow(next), state.minutes_left - cost))
            })
            .sum();
        state.pressure_released + unreleased
    }
}

fn released(flow: u32, minutes: usize) -> u64 {
    u64::from(flow) * minutes as u64
}

/// Find the plan that releases the most pressure in `minutes`, starting at the volcano's first
/// valve.
pub fn best_plan(volcano: &Volcano, minutes: usize) -> Result<Plan, GraphError> {
    let paths = DistanceTable::new(volcano)?;
    Ok(Search::new(&paths, minutes).run())
}
