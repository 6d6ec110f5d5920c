//! Work out which valves to open, and in what order, to release the most pressure from a volcano
//! before it erupts.

pub mod actions;
pub mod error;
pub mod paths;
pub mod search;
pub mod volcano;

pub use actions::{Action, ActionSequence};
pub use error::{ActionError, Error, GraphError, ParseError};
pub use paths::DistanceTable;
pub use search::{best_plan, Plan, Search};
pub use volcano::{Valve, ValveHandle, Volcano};

/// Minutes until the volcano erupts.
pub const MINUTES: usize = 30;

#[cfg(test)]
pub(crate) const EXAMPLE: &str = include_str!("example.txt");
