//! Aggregate tables filled while reading the experiment files.

use std::collections::{BTreeMap, BTreeSet};

use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::config::Algorithm;

/// Identifies a single simulation run: number of compute hosts, host turn-off policy and placement algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RunKey {
    pub hosts: u32,
    pub turn_off: bool,
    pub algorithm: Algorithm,
}

impl RunKey {
    pub fn new(hosts: u32, turn_off: bool, algorithm: Algorithm) -> Self {
        Self {
            hosts,
            turn_off,
            algorithm,
        }
    }
}

/// Mean and standard deviation of the injected load, as declared by the run headers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadParams {
    pub mean: u32,
    pub std: u32,
}

/// Counters collected from the run log for a single run.
#[derive(Clone, Debug, Default)]
pub struct RunCounters {
    pub turn_offs: u64,
    pub migrations: u64,
    /// Times at which the scheduler started to compute a new placement.
    pub scheduler_ticks: Vec<f64>,
    /// Total time each node spent turned on.
    pub on_time: BTreeMap<String, f64>,
    /// Time of the End of Injection line, if the run got that far.
    pub end_time: Option<f64>,
}

impl RunCounters {
    /// Returns the on-time summed over all nodes.
    pub fn total_on_time(&self) -> f64 {
        self.on_time.values().sum()
    }
}

/// Sequence of (time, number of live hosts relative to the start) points.
pub type HostPopulation = Vec<(u64, i64)>;

/// Number of running VMs by simulation time.
pub type VmPopulation = BTreeMap<OrderedFloat<f64>, u64>;

/// All aggregates of one experiment directory.
///
/// The tables are filled by a single pass over each input file, the run log first,
/// and are only read afterwards.
#[derive(Clone, Debug, Default)]
pub struct ExperimentStats {
    pub runs: BTreeMap<RunKey, RunCounters>,
    /// Live host curves of the runs with host turn-off enabled, by (hosts, algorithm).
    pub host_population: BTreeMap<(u32, Algorithm), HostPopulation>,
    pub vm_population: BTreeMap<RunKey, VmPopulation>,
    /// Average power in kilowatts.
    pub energy: BTreeMap<RunKey, f64>,
    /// Duration of the simulation in whole seconds, known once an End of Injection line is read.
    pub simulation_time: Option<f64>,
    pub load: Option<LoadParams>,
    /// Algorithms in the order of their first appearance in the run log.
    pub algorithms: Vec<Algorithm>,
}

impl ExperimentStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new run, dropping counters left by an earlier run with the same key.
    pub fn begin_run(&mut self, key: RunKey, load: LoadParams) {
        if !self.algorithms.contains(&key.algorithm) {
            self.algorithms.push(key.algorithm);
        }
        self.runs.insert(key, RunCounters::default());
        if key.turn_off {
            self.host_population.insert((key.hosts, key.algorithm), vec![(0, 0)]);
        }
        self.load = Some(load);
    }

    pub fn run_mut(&mut self, key: RunKey) -> &mut RunCounters {
        self.runs.entry(key).or_default()
    }

    /// Freezes the simulation duration. Events at or after it are no longer accounted.
    pub fn set_simulation_time(&mut self, time: f64) {
        self.simulation_time = Some(time.trunc());
    }

    /// Returns true if an event at `time` comes before the end of the simulation (or the end is not known yet).
    pub fn in_scope(&self, time: f64) -> bool {
        self.simulation_time.map_or(true, |end| time < end)
    }

    /// Appends a point to the live host curve of the run, moving the last count by `delta`.
    pub fn shift_host_population(&mut self, key: RunKey, time: f64, delta: i64) {
        let series = self
            .host_population
            .entry((key.hosts, key.algorithm))
            .or_insert_with(|| vec![(0, 0)]);
        let last = series.last().map_or(0, |&(_, count)| count);
        series.push((time.trunc() as u64, last + delta));
    }

    /// Closes every live host curve with a point at the simulation end holding its last count.
    ///
    /// Does nothing while the simulation duration is unknown. Calling it twice adds no more points.
    pub fn close_host_population(&mut self) {
        let end = match self.simulation_time {
            Some(end) => end as u64,
            None => return,
        };
        for series in self.host_population.values_mut() {
            let last = series.last().copied().unwrap_or((0, 0));
            if last.0 != end || series.len() == 1 {
                series.push((end, last.1));
            }
        }
    }

    pub fn energy_of(&self, key: RunKey) -> Option<f64> {
        self.energy.get(&key).copied()
    }

    /// Host counts present in the energy table.
    pub fn energy_host_counts(&self) -> BTreeSet<u32> {
        self.energy.keys().map(|key| key.hosts).collect()
    }

    /// Host counts having a live host curve.
    pub fn population_host_counts(&self) -> BTreeSet<u32> {
        self.host_population.keys().map(|&(hosts, _)| hosts).collect()
    }

    /// Host counts having a VM event stream.
    pub fn vm_host_counts(&self) -> BTreeSet<u32> {
        self.vm_population.keys().map(|key| key.hosts).collect()
    }

    /// Returns the load parameters used in output names, zero when no run header was read.
    pub fn load_params(&self) -> LoadParams {
        self.load.unwrap_or_default()
    }
}
