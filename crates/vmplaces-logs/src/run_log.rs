//! Reader of the run log shared by all simulation runs of an experiment.
//!
//! Each line is matched against a fixed, ordered list of grammars and the first match wins.
//! The matched line becomes a [`LogLine`], which [`RunLogScanner`] applies to the aggregate tables.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use lazy_static::lazy_static;
use log::{debug, info};
use regex::{Captures, Regex};

use crate::config::{algorithm_name, parse_bool, Algorithm};
use crate::error::ReportError;
use crate::intervals::IntervalTracker;
use crate::stats::{ExperimentStats, LoadParams, RunKey};

/// Parameters of a run declared by its header line.
#[derive(Clone, Debug, PartialEq)]
pub struct RunHeader {
    pub algorithm: Algorithm,
    pub hosts: u32,
    pub service_nodes: u32,
    pub turn_off: bool,
    pub load: LoadParams,
}

impl RunHeader {
    pub fn key(&self) -> RunKey {
        RunKey::new(self.hosts, self.turn_off, self.algorithm)
    }
}

/// Recognized run log line.
#[derive(Clone, Debug, PartialEq)]
pub enum LogLine {
    RunHeader(RunHeader),
    InjectionEnd { time: f64 },
    SchedulerTick { time: f64 },
    TurnOff { time: f64, node: String },
    TurnOn { time: f64, node: String },
    MigrationEnd,
}

type LineBuilder = fn(&Captures) -> Result<LogLine, ReportError>;

lazy_static! {
    static ref GRAMMAR: Vec<(Regex, LineBuilder)> = vec![
        (
            Regex::new(
                r"Running ([\w\.]+)(\s-D[\w\.]+=([\w\.]+))? with (\d+) compute and (\d+) service nodes turning off hosts: (\w+), load\.mean=(\d+), load\.std=(\d+)"
            )
            .unwrap(),
            run_header as LineBuilder,
        ),
        (
            Regex::new(r"\[.*\s(\d+\.\d+)\] \[.*\] End of Injection").unwrap(),
            injection_end as LineBuilder,
        ),
        (
            Regex::new(r"\[(.*)\s(\d+\.\d+)\] \[.*\] Launching scheduler \(id = \d+\) - start to compute").unwrap(),
            scheduler_tick as LineBuilder,
        ),
        (
            Regex::new(r"\[(.*\s)?(\d+\.\d+)\] \[.*\] Turn off (node\d+)").unwrap(),
            turn_off as LineBuilder,
        ),
        (
            Regex::new(r"\[(.* )?(\d+\.\d+)\] \[.*\] Turn on (?:node )?(node\d+)").unwrap(),
            turn_on as LineBuilder,
        ),
        (
            Regex::new(r"End of migration of VM vm-\d+ from node\d+ to node\d+").unwrap(),
            migration_end as LineBuilder,
        ),
    ];
}

fn number<T: FromStr>(caps: &Captures, group: usize) -> Result<T, ReportError> {
    let token = &caps[group];
    token
        .parse::<T>()
        .map_err(|_| ReportError::InvalidNumber(token.to_string()))
}

fn run_header(caps: &Captures) -> Result<LogLine, ReportError> {
    let turn_off = parse_bool(&caps[6])?;
    let hosts = number(caps, 4)?;
    let class_name = caps
        .get(3)
        .ok_or_else(|| ReportError::MissingAlgorithm(caps[0].to_string()))?;
    let algorithm = algorithm_name(class_name.as_str())?;
    Ok(LogLine::RunHeader(RunHeader {
        algorithm,
        hosts,
        service_nodes: number(caps, 5)?,
        turn_off,
        load: LoadParams {
            mean: number(caps, 7)?,
            std: number(caps, 8)?,
        },
    }))
}

fn injection_end(caps: &Captures) -> Result<LogLine, ReportError> {
    Ok(LogLine::InjectionEnd { time: number(caps, 1)? })
}

fn scheduler_tick(caps: &Captures) -> Result<LogLine, ReportError> {
    Ok(LogLine::SchedulerTick { time: number(caps, 2)? })
}

fn turn_off(caps: &Captures) -> Result<LogLine, ReportError> {
    Ok(LogLine::TurnOff {
        time: number(caps, 2)?,
        node: caps[3].to_string(),
    })
}

fn turn_on(caps: &Captures) -> Result<LogLine, ReportError> {
    Ok(LogLine::TurnOn {
        time: number(caps, 2)?,
        node: caps[3].to_string(),
    })
}

fn migration_end(_: &Captures) -> Result<LogLine, ReportError> {
    Ok(LogLine::MigrationEnd)
}

/// Matches a single run log line. Returns `None` for lines which are not of interest.
pub fn parse_line(line: &str) -> Result<Option<LogLine>, ReportError> {
    for (pattern, build) in GRAMMAR.iter() {
        if let Some(caps) = pattern.captures(line) {
            return build(&caps).map(Some);
        }
    }
    Ok(None)
}

/// Applies run log lines in order to the experiment aggregates.
pub struct RunLogScanner<'a> {
    stats: &'a mut ExperimentStats,
    current: Option<RunKey>,
    tracker: IntervalTracker,
    line_no: usize,
}

impl<'a> RunLogScanner<'a> {
    pub fn new(stats: &'a mut ExperimentStats) -> Self {
        Self {
            stats,
            current: None,
            tracker: IntervalTracker::new(),
            line_no: 0,
        }
    }

    /// Parses and applies the next line of the log.
    pub fn feed(&mut self, line: &str) -> Result<(), ReportError> {
        self.line_no += 1;
        match parse_line(line)? {
            Some(LogLine::RunHeader(header)) => {
                self.start_run(header);
                Ok(())
            }
            Some(event) => {
                let key = self.current.ok_or_else(|| ReportError::NoActiveRun {
                    line_no: self.line_no,
                    line: line.to_string(),
                })?;
                self.apply(key, event)
            }
            None => Ok(()),
        }
    }

    fn start_run(&mut self, header: RunHeader) {
        let key = header.key();
        println!(
            "Reading new experiment [algo={}, computes={}, turn_off={}]",
            header.algorithm, header.hosts, header.turn_off
        );
        self.stats.begin_run(key, header.load);
        self.tracker = IntervalTracker::new();
        self.current = Some(key);
    }

    fn apply(&mut self, key: RunKey, event: LogLine) -> Result<(), ReportError> {
        match event {
            LogLine::InjectionEnd { time } => {
                self.stats.set_simulation_time(time);
                let end = time.trunc();
                let counters = self.stats.run_mut(key);
                // on-time never runs past the whole-second duration
                self.tracker.close_all(end, &mut counters.on_time);
                for on_time in counters.on_time.values_mut() {
                    *on_time = on_time.min(end);
                }
                counters.end_time = Some(time);
                debug!("run {:?} ended at {:.2}", key, time);
            }
            LogLine::SchedulerTick { time } => {
                self.stats.run_mut(key).scheduler_ticks.push(time);
            }
            LogLine::TurnOff { time, node } => {
                self.stats.run_mut(key).turn_offs += 1;
                if !self.stats.in_scope(time) {
                    return Ok(());
                }
                if key.turn_off {
                    self.stats.shift_host_population(key, time, -1);
                }
                let counters = self.stats.run_mut(key);
                self.tracker.node_off(&node, time, &mut counters.on_time)?;
            }
            LogLine::TurnOn { time, node } => {
                if !self.stats.in_scope(time) {
                    return Ok(());
                }
                if key.turn_off {
                    self.stats.shift_host_population(key, time, 1);
                }
                self.tracker.node_on(&node, time)?;
            }
            LogLine::MigrationEnd => {
                self.stats.run_mut(key).migrations += 1;
            }
            LogLine::RunHeader(_) => unreachable!("run headers are handled by feed"),
        }
        Ok(())
    }

    /// Returns the number of lines fed so far.
    pub fn lines_read(&self) -> usize {
        self.line_no
    }
}

/// Reads the run log from `reader` into `stats`.
pub fn scan_run_log<R: BufRead>(reader: R, path: &Path, stats: &mut ExperimentStats) -> Result<(), ReportError> {
    let mut scanner = RunLogScanner::new(stats);
    for line in reader.lines() {
        let line = line.map_err(ReportError::io(path))?;
        scanner.feed(&line)?;
    }
    info!("Read {} lines from {}", scanner.lines_read(), path.display());
    Ok(())
}

/// Reads the run log file into `stats`.
pub fn read_run_log(path: &Path, stats: &mut ExperimentStats) -> Result<(), ReportError> {
    let file = File::open(path).map_err(ReportError::io(path))?;
    scan_run_log(BufReader::new(file), path, stats)
}
