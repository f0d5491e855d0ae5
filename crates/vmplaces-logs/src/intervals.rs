//! Tracks when nodes are turned on and off to accumulate their on-time.

use std::collections::{BTreeMap, HashMap};

use crate::error::ReportError;

#[derive(Clone, Copy, Debug, PartialEq)]
enum NodeState {
    On(f64),
    Off,
}

/// On/off state of the nodes of the current run.
///
/// A node has no state until its first transition. If that transition turns it off, the node is taken
/// to be on since the start of the run; if it turns it on, the node was off. Afterwards the transitions
/// of a node must alternate.
#[derive(Debug, Default)]
pub struct IntervalTracker {
    nodes: HashMap<String, NodeState>,
}

impl IntervalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the time since which the node is on, if it is.
    pub fn on_since(&self, node: &str) -> Option<f64> {
        match self.nodes.get(node) {
            Some(NodeState::On(since)) => Some(*since),
            _ => None,
        }
    }

    pub fn node_on(&mut self, node: &str, time: f64) -> Result<(), ReportError> {
        if let Some(NodeState::On(since)) = self.nodes.get(node) {
            return Err(ReportError::NodeAlreadyOn {
                node: node.to_string(),
                since: *since,
                time,
            });
        }
        self.nodes.insert(node.to_string(), NodeState::On(time));
        Ok(())
    }

    /// Turns the node off and adds the length of the closed interval to `on_time`.
    pub fn node_off(&mut self, node: &str, time: f64, on_time: &mut BTreeMap<String, f64>) -> Result<(), ReportError> {
        let since = match self.nodes.get(node) {
            Some(NodeState::On(since)) => *since,
            Some(NodeState::Off) => {
                return Err(ReportError::NodeNotOn {
                    node: node.to_string(),
                    time,
                })
            }
            None => 0.,
        };
        *on_time.entry(node.to_string()).or_insert(0.) += time - since;
        self.nodes.insert(node.to_string(), NodeState::Off);
        Ok(())
    }

    /// Turns off every node which is still on at `time`.
    ///
    /// A node turned on after `time` is closed with an empty interval.
    pub fn close_all(&mut self, time: f64, on_time: &mut BTreeMap<String, f64>) {
        for (node, state) in self.nodes.iter_mut() {
            if let NodeState::On(since) = *state {
                *on_time.entry(node.clone()).or_insert(0.) += (time - since).max(0.);
                *state = NodeState::Off;
            }
        }
    }
}
