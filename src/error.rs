use thiserror::Error;

/// A line of input that isn't a valve declaration.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unexpected valve line: {line}")]
pub struct ParseError {
    pub line: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("no valves found")]
    NoValves,

    #[error("valve {0} declared more than once")]
    DuplicateValve(String),

    #[error("tunnel from {from} leads to undeclared valve {to}")]
    DanglingTunnel { from: String, to: String },

    #[error("valve {to} can't be reached from valve {from}")]
    Unreachable { from: String, to: String },

    #[error("{0} valves have a positive flow rate, at most 64 are supported")]
    TooManyValves(usize),
}

/// Reasons an action sequence can't be replayed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("no tunnel from {from} to {to}")]
    NotAdjacent { from: String, to: String },

    #[error("valve {0} is already open")]
    AlreadyOpen(String),

    #[error("{len} actions don't fit in {minutes} minutes")]
    OverBudget { len: usize, minutes: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("invalid action sequence: {0}")]
    Action(#[from] ActionError),

    #[error("reading input: {0}")]
    Io(#[from] std::io::Error),
}
