use rustc_hash::FxHashSet;

use crate::error::ActionError;
use crate::volcano::{ValveHandle, Volcano};

/// Something to do with one minute.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    /// Walk through a tunnel to a neighboring valve.
    MoveTo(ValveHandle),
    /// Open the valve we're standing at.
    Open,
}

#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct ActionSequence(Vec<Action>);

impl ActionSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: Action) {
        self.0.push(action);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> + '_ {
        self.0.iter()
    }

    /// Total pressure released after `minutes` minutes if we start at the volcano's start valve and
    /// do these actions, then wait out whatever time is left.
    ///
    /// Valves opened in a minute start releasing pressure the following minute, so a valve opened
    /// with `n` minutes left releases `flow * n`.
    pub fn pressure(&self, volcano: &Volcano, minutes: usize) -> Result<u64, ActionError> {
        if self.0.len() > minutes {
            return Err(ActionError::OverBudget { len: self.0.len(), minutes });
        }

        let mut at = volcano.start();
        let mut opened: FxHashSet<ValveHandle> = FxHashSet::default();
        let mut total: u64 = 0;
        let mut delta: u64 = 0;

        for &action in &self.0 {
            total += delta;
            match action {
                Action::MoveTo(next) => {
                    if !volcano.valve(at).tunnels.contains(&next) {
                        return Err(ActionError::NotAdjacent {
                            from: volcano.name(at).to_string(),
                            to: volcano.name(next).to_string(),
                        });
                    }
                    at = next;
                },
                Action::Open => {
                    if !opened.insert(at) {
                        return Err(ActionError::AlreadyOpen(volcano.name(at).to_string()));
                    }
                    delta += u64::from(volcano.valve(at).flow);
                },
            }
        }

        Ok(total + delta * (minutes - self.0.len()) as u64)
    }

    /// Human-readable actions, eg `move(DD)` or `open(DD)`.
    pub fn describe(&self, volcano: &Volcano) -> Vec<String> {
        let mut at = volcano.start();
        self.0
            .iter()
            .map(|&action| match action {
                Action::MoveTo(next) => {
                    at = next;
                    format!("move({})", volcano.name(next))
                },
                Action::Open => format!("open({})", volcano.name(at)),
            })
            .collect()
    }
}

impl FromIterator<Action> for ActionSequence {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        ActionSequence(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::*;
    use crate::{EXAMPLE, MINUTES};

    fn moves(volcano: &Volcano, script: &str) -> ActionSequence {
        script
            .split_whitespace()
            .map(|word| match word {
                "open" => Action::Open,
                name => Action::MoveTo(volcano.handle(name).unwrap()),
            })
            .collect()
    }

    // The walkthrough from the puzzle description.
    const WALKTHROUGH: &str = "DD open CC BB open AA II JJ open II AA DD EE FF GG HH open GG FF EE open DD CC open";

    #[test]
    fn test_walkthrough() {
        let volcano = Volcano::from_str(EXAMPLE).unwrap();
        let actions = moves(&volcano, WALKTHROUGH);
        assert_eq!(actions.len(), 24);
        assert_eq!(actions.pressure(&volcano, MINUTES).unwrap(), 1651);
    }

    #[test]
    fn test_single_open() {
        let volcano = Volcano::from_str(EXAMPLE).unwrap();
        // DD is opened in minute 2, leaving 28 minutes.
        let actions = moves(&volcano, "DD open");
        assert_eq!(actions.pressure(&volcano, MINUTES).unwrap(), 20 * 28);
        assert_eq!(actions.pressure(&volcano, 2).unwrap(), 0);
    }

    #[test]
    fn test_empty() {
        let volcano = Volcano::from_str(EXAMPLE).unwrap();
        assert_eq!(ActionSequence::new().pressure(&volcano, MINUTES).unwrap(), 0);
    }

    #[test]
    fn test_monotonic_in_minutes() {
        let volcano = Volcano::from_str(EXAMPLE).unwrap();
        let actions = moves(&volcano, WALKTHROUGH);
        let mut prev = 0;
        for minutes in actions.len()..=40 {
            let pressure = actions.pressure(&volcano, minutes).unwrap();
            assert!(pressure >= prev, "pressure dropped at {minutes} minutes");
            prev = pressure;
        }
    }

    #[test]
    fn test_not_adjacent() {
        let volcano = Volcano::from_str(EXAMPLE).unwrap();
        let err = moves(&volcano, "DD EE HH").pressure(&volcano, MINUTES).unwrap_err();
        assert_eq!(err, ActionError::NotAdjacent { from: "EE".to_string(), to: "HH".to_string() });
    }

    #[test]
    fn test_already_open() {
        let volcano = Volcano::from_str(EXAMPLE).unwrap();
        let err = moves(&volcano, "DD open CC DD open").pressure(&volcano, MINUTES).unwrap_err();
        assert_eq!(err, ActionError::AlreadyOpen("DD".to_string()));
    }

    #[test]
    fn test_over_budget() {
        let volcano = Volcano::from_str(EXAMPLE).unwrap();
        let err = moves(&volcano, "DD open CC").pressure(&volcano, 2).unwrap_err();
        assert_eq!(err, ActionError::OverBudget { len: 3, minutes: 2 });
    }

    #[test]
    fn test_describe() {
        let volcano = Volcano::from_str(EXAMPLE).unwrap();
        let actions = moves(&volcano, "DD open CC");
        assert_eq!(actions.describe(&volcano), vec!["move(DD)", "open(DD)", "move(CC)"]);
    }
}
