use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{Error, GraphError, ParseError};

// eg: Valve AA has flow rate=0; tunnels lead to valves DD, II, BB
static LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Valve ([A-Z]+) has flow rate=(\d+); tunnels? leads? to valves? ([A-Z]+(?:, [A-Z]+)*)$").unwrap()
});

/// Index of a valve in the `Volcano` it was parsed from.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValveHandle(pub(crate) usize);

impl ValveHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for ValveHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Valve {
    pub name: String,
    pub flow: u32,
    /// Sorted by flow rate, descending, so the most promising rooms come first.
    pub tunnels: Vec<ValveHandle>,
}

/// The tunnel network. Immutable once parsed; the first valve in the input is where we start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Volcano {
    valves: Vec<Valve>,
    handle_for: FxHashMap<String, ValveHandle>,
}

impl Volcano {
    pub fn start(&self) -> ValveHandle {
        ValveHandle(0)
    }

    pub fn len(&self) -> usize {
        self.valves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valves.is_empty()
    }

    /// Panics if `vh` came from a different volcano with more valves.
    pub fn valve(&self, vh: ValveHandle) -> &Valve {
        &self.valves[vh.0]
    }

    pub fn name(&self, vh: ValveHandle) -> &str {
        &self.valve(vh).name
    }

    pub fn handle(&self, name: &str) -> Option<ValveHandle> {
        self.handle_for.get(name).copied()
    }

    pub fn flow(&self, name: &str) -> Option<u32> {
        self.handle(name).map(|vh| self.valve(vh).flow)
    }

    pub fn handles(&self) -> impl Iterator<Item = ValveHandle> + '_ {
        (0..self.valves.len()).map(ValveHandle)
    }

    pub fn valves(&self) -> impl Iterator<Item = &Valve> + '_ {
        self.valves.iter()
    }

    /// The neighbor of `from` called `name`, if there's a tunnel to it.
    pub fn tunnel_to(&self, from: ValveHandle, name: &str) -> Option<ValveHandle> {
        self.valve(from)
            .tunnels
            .iter()
            .copied()
            .find(|&vh| self.name(vh) == name)
    }

    pub fn tunnel_names(&self, name: &str) -> Option<Vec<&str>> {
        let vh = self.handle(name)?;
        Some(self.valve(vh).tunnels.iter().map(|&t| self.name(t)).collect())
    }
}

fn parse_line(line: &str) -> Result<(String, u32, Vec<String>), ParseError> {
    let err = || ParseError { line: line.to_string() };
    let caps = LINE_RE.captures(line.trim_end()).ok_or_else(err)?;
    let flow: u32 = caps[2].parse().map_err(|_| err())?;
    let tunnels = caps[3].split(", ").map(str::to_string).collect();
    Ok((caps[1].to_string(), flow, tunnels))
}

impl FromStr for Volcano {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Tunnels can lead to valves that are declared further down, so declare every valve
        // before resolving any tunnels.
        let mut valves: Vec<Valve> = Vec::new();
        let mut handle_for: FxHashMap<String, ValveHandle> = FxHashMap::default();
        let mut pending: Vec<Vec<String>> = Vec::new();

        for line in s.lines().filter(|l| !l.trim().is_empty()) {
            let (name, flow, tunnels) = parse_line(line)?;
            let vh = ValveHandle(valves.len());
            if handle_for.insert(name.clone(), vh).is_some() {
                return Err(GraphError::DuplicateValve(name).into());
            }
            valves.push(Valve { name, flow, tunnels: Vec::new() });
            pending.push(tunnels);
        }
        if valves.is_empty() {
            return Err(GraphError::NoValves.into());
        }

        for (i, names) in pending.into_iter().enumerate() {
            let mut tunnels = names
                .into_iter()
                .map(|to| match handle_for.get(&to) {
                    Some(&vh) => Ok(vh),
                    None => Err(GraphError::DanglingTunnel { from: valves[i].name.clone(), to }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            // Stable, so equal flow rates keep their input order.
            tunnels.sort_by(|a, b| valves[b.0].flow.cmp(&valves[a.0].flow));
            valves[i].tunnels = tunnels;
        }

        debug!(
            valves = valves.len(),
            flowing = valves.iter().filter(|v| v.flow > 0).count(),
            "parsed volcano"
        );
        Ok(Volcano { valves, handle_for })
    }
}

impl fmt::Display for Volcano {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for valve in &self.valves {
            let names = valve.tunnels.iter().map(|&vh| self.name(vh)).join(", ");
            let (tunnels, lead, valves) = match valve.tunnels.len() {
                1 => ("tunnel", "leads", "valve"),
                _ => ("tunnels", "lead", "valves"),
            };
            writeln!(
                f,
                "Valve {} has flow rate={}; {tunnels} {lead} to {valves} {names}",
                valve.name, valve.flow
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::EXAMPLE;

    #[test]
    fn test_volcano_from_str() {
        let volcano = Volcano::from_str(EXAMPLE).unwrap();
        assert_eq!(volcano.len(), 10);
        assert_eq!(volcano.flow("BB"), Some(13));
        assert_eq!(volcano.flow("HH"), Some(22));
        assert_eq!(volcano.flow("ZZ"), None);
        assert_eq!(volcano.name(volcano.start()), "AA");
        assert_eq!(volcano.tunnel_names("JJ").unwrap(), vec!["II"]);
    }

    #[test]
    fn test_tunnels_sorted_by_flow() {
        let volcano = Volcano::from_str(EXAMPLE).unwrap();
        assert_eq!(volcano.tunnel_names("AA").unwrap(), vec!["DD", "BB", "II"]);
        assert_eq!(volcano.tunnel_names("DD").unwrap(), vec!["EE", "CC", "AA"]);
        assert_eq!(volcano.tunnel_names("GG").unwrap(), vec!["HH", "FF"]);
    }

    #[test]
    fn test_tunnel_to() {
        let volcano = Volcano::from_str(EXAMPLE).unwrap();
        let aa = volcano.start();
        assert_eq!(volcano.tunnel_to(aa, "II"), volcano.handle("II"));
        assert_eq!(volcano.tunnel_to(aa, "JJ"), None);
    }

    #[test]
    fn test_forward_references() {
        let volcano = Volcano::from_str("\
Valve XYZ has flow rate=5; tunnel leads to valve Q
Valve Q has flow rate=0; tunnel leads to valve XYZ").unwrap();
        assert_eq!(volcano.tunnel_names("XYZ").unwrap(), vec!["Q"]);
        assert_eq!(volcano.tunnel_names("Q").unwrap(), vec!["XYZ"]);
    }

    #[test]
    fn test_round_trip() {
        let volcano = Volcano::from_str(EXAMPLE).unwrap();
        let rebuilt = Volcano::from_str(&volcano.to_string()).unwrap();
        assert_eq!(rebuilt, volcano);
    }

    #[test]
    fn test_bad_line() {
        let line = "Valve AA has flow rate=x; tunnels lead to valves BB";
        let err = Volcano::from_str(line).unwrap_err();
        assert!(matches!(&err, Error::Parse(e) if e.line == line));
        assert!(err.to_string().contains(line));
    }

    #[test]
    fn test_flow_too_big() {
        let line = "Valve BB has flow rate=1000000000000000000; tunnel leads to valve AA";
        let err = Volcano::from_str(&format!("Valve AA has flow rate=0; tunnel leads to valve BB\n{line}")).unwrap_err();
        assert!(matches!(&err, Error::Parse(e) if e.line == line));

        let volcano = Volcano::from_str("Valve AA has flow rate=4294967295; tunnel leads to valve AA").unwrap();
        assert_eq!(volcano.flow("AA"), Some(u32::MAX));
    }

    #[test]
    fn test_dangling_tunnel() {
        let err = Volcano::from_str("Valve AA has flow rate=0; tunnels lead to valves BB, CC\n\
Valve BB has flow rate=1; tunnel leads to valve AA").unwrap_err();
        let want = GraphError::DanglingTunnel { from: "AA".to_string(), to: "CC".to_string() };
        assert!(matches!(err, Error::Graph(e) if e == want));
    }

    #[test]
    fn test_duplicate_valve() {
        let err = Volcano::from_str("Valve AA has flow rate=0; tunnel leads to valve AA\n\
Valve AA has flow rate=1; tunnel leads to valve AA").unwrap_err();
        assert!(matches!(err, Error::Graph(GraphError::DuplicateValve(name)) if name == "AA"));
    }

    #[test]
    fn test_no_valves() {
        let err = Volcano::from_str("\n\n").unwrap_err();
        assert!(matches!(err, Error::Graph(GraphError::NoValves)));
    }
}
