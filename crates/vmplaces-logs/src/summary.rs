//! Flat per-run summary of the experiment aggregates.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::config::Algorithm;
use crate::error::ReportError;
use crate::stats::{ExperimentStats, RunKey};

/// Summary of a single run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub hosts: u32,
    pub turn_off: bool,
    pub algorithm: Algorithm,
    pub turn_offs: u64,
    pub migrations: u64,
    pub scheduler_ticks: usize,
    /// Time the nodes of the run spent turned on, summed over all nodes, in seconds.
    pub on_time: f64,
    pub peak_vms: Option<u64>,
    pub energy_kw: Option<f64>,
}

/// Builds one summary per run found in any of the tables, sorted by run.
pub fn summarize(stats: &ExperimentStats) -> Vec<RunSummary> {
    let keys: BTreeSet<RunKey> = stats
        .runs
        .keys()
        .chain(stats.vm_population.keys())
        .chain(stats.energy.keys())
        .copied()
        .collect();

    keys.into_iter()
        .map(|key| {
            let counters = stats.runs.get(&key);
            RunSummary {
                hosts: key.hosts,
                turn_off: key.turn_off,
                algorithm: key.algorithm,
                turn_offs: counters.map_or(0, |c| c.turn_offs),
                migrations: counters.map_or(0, |c| c.migrations),
                scheduler_ticks: counters.map_or(0, |c| c.scheduler_ticks.len()),
                on_time: counters.map_or(0., |c| c.total_on_time()),
                peak_vms: stats
                    .vm_population
                    .get(&key)
                    .and_then(|series| series.values().max().copied()),
                energy_kw: stats.energy_of(key),
            }
        })
        .collect()
}

/// Formats the summaries as an aligned text table.
pub fn format_table(records: &[RunSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>6} {:>8} {:<16} {:>9} {:>10} {:>6} {:>12} {:>8} {:>10}",
        "hosts", "turn_off", "algorithm", "turn_offs", "migrations", "ticks", "on_time (s)", "peak_vms", "energy_kw"
    );
    for r in records {
        let peak_vms = r.peak_vms.map_or_else(|| "-".to_string(), |v| v.to_string());
        let energy = r.energy_kw.map_or_else(|| "-".to_string(), |e| format!("{:.3}", e));
        let _ = writeln!(
            out,
            "{:>6} {:>8} {:<16} {:>9} {:>10} {:>6} {:>12.1} {:>8} {:>10}",
            r.hosts, r.turn_off, r.algorithm, r.turn_offs, r.migrations, r.scheduler_ticks, r.on_time, peak_vms, energy
        );
    }
    out
}

fn write_csv(records: &[RunSummary], path: &Path) -> Result<(), std::io::Error> {
    let file = File::create(path)?;
    let mut wtr = csv::Writer::from_writer(file);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Saves the summaries to a CSV file.
pub fn save_summary(records: &[RunSummary], path: &Path) -> Result<(), ReportError> {
    write_csv(records, path).map_err(ReportError::io(path))
}
