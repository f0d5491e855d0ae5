//! Reader of the energy table.
//!
//! Each line holds one sample: `<hosts> <kind> <algorithm class> <turn off> [<threshold>] <joules>`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use lazy_static::lazy_static;
use log::info;
use regex::Regex;

use crate::config::{algorithm_name, parse_bool, Algorithm};
use crate::error::ReportError;
use crate::stats::{ExperimentStats, RunKey};

lazy_static! {
    static ref ENERGY_LINE: Regex = Regex::new(r"^(\d+) \w+ (\w+) (\w+) (\d+ )?([\d\.]+)").unwrap();
}

/// Single line of the energy table.
#[derive(Clone, Debug, PartialEq)]
pub struct EnergySample {
    pub hosts: u32,
    pub algorithm: Algorithm,
    pub turn_off: bool,
    pub threshold: Option<u32>,
    pub joules: f64,
}

impl EnergySample {
    pub fn key(&self) -> RunKey {
        RunKey::new(self.hosts, self.turn_off, self.algorithm)
    }
}

/// Converts the energy consumed over the simulation into average power in kilowatts.
pub fn kilowatts(joules: f64, simulation_time: f64) -> f64 {
    joules / simulation_time / 1000.
}

/// Parses one line of the energy table, `line_no` is only used in errors.
pub fn parse_energy_line(line: &str, line_no: usize) -> Result<EnergySample, ReportError> {
    let malformed = || ReportError::MalformedEnergyLine {
        line_no,
        line: line.to_string(),
    };
    let caps = ENERGY_LINE.captures(line).ok_or_else(malformed)?;
    let hosts = caps[1].parse().map_err(|_| malformed())?;
    let algorithm = algorithm_name(&caps[2])?;
    let turn_off = parse_bool(&caps[3])?;
    let threshold = match caps.get(4) {
        Some(m) => Some(m.as_str().trim().parse().map_err(|_| malformed())?),
        None => None,
    };
    let joules = caps[5].parse().map_err(|_| malformed())?;
    Ok(EnergySample {
        hosts,
        algorithm,
        turn_off,
        threshold,
        joules,
    })
}

/// Reads the energy table from `reader` into `stats`, returns the number of samples.
///
/// The simulation duration must already be known from the run log and last at least one second.
pub fn scan_energy_table<R: BufRead>(
    reader: R,
    path: &Path,
    stats: &mut ExperimentStats,
) -> Result<usize, ReportError> {
    let mut samples = 0;
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(ReportError::io(path))?;
        if line.trim().is_empty() {
            continue;
        }
        let sample = parse_energy_line(&line, idx + 1)?;
        let simulation_time = match stats.simulation_time {
            Some(time) if time > 0. => time,
            Some(_) => return Err(ReportError::ZeroDuration),
            None => return Err(ReportError::UnknownDuration),
        };
        stats
            .energy
            .insert(sample.key(), kilowatts(sample.joules, simulation_time));
        samples += 1;
    }
    info!("Read {} energy samples from {}", samples, path.display());
    Ok(samples)
}

/// Reads the energy table file into `stats`.
pub fn read_energy_table(path: &Path, stats: &mut ExperimentStats) -> Result<usize, ReportError> {
    let file = File::open(path).map_err(ReportError::io(path))?;
    scan_energy_table(BufReader::new(file), path, stats)
}
