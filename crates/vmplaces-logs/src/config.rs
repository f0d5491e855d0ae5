//! Compiled-in tables: algorithm names, plot order and experiment layout.

use crate::error::ReportError;

/// Display name of a VM placement algorithm.
pub type Algorithm = &'static str;

/// Maps simulator class names to the names shown in reports.
const ALGORITHM_NAMES: &[(&str, Algorithm)] = &[
    ("LazyFirstFitDecreased", "FFD"),
    ("OptimisticFirstFitDecreased", "Optimistic FFD"),
    ("Entropy2RP", "Entropy"),
];

/// Order of the algorithms in the plots. Algorithms missing here are not plotted.
pub const DISPLAY_ORDER: &[Algorithm] = &["Entropy", "FFD"];

/// Run log of all experiments, relative to the experiment directory.
pub const RUN_LOG_FILE: &str = "run_all.log";
/// Energy table, relative to the experiment directory.
pub const ENERGY_FILE: &str = "energy.dat";
/// Directory with one event stream per run, relative to the experiment directory.
pub const EVENTS_DIR: &str = "events";
/// Event stream inside each run directory.
pub const EVENTS_FILE: &str = "events.json";

/// Kind of the run directories which are read, other kinds are skipped.
pub const CENTRALIZED_KIND: &str = "centralized";
/// Tag of the event records carrying the number of running VMs.
pub const VM_COUNT_TAG: &str = "NB_VM";

/// Resolves a (possibly fully qualified) simulator class name to its display name.
pub fn algorithm_name(class_name: &str) -> Result<Algorithm, ReportError> {
    let short_name = class_name.rsplit('.').next().unwrap_or(class_name);
    ALGORITHM_NAMES
        .iter()
        .find(|(class, _)| *class == short_name)
        .map(|(_, name)| *name)
        .ok_or_else(|| ReportError::UnknownAlgorithm(short_name.to_string()))
}

/// Parses the boolean spellings used by the simulator logs.
pub fn parse_bool(token: &str) -> Result<bool, ReportError> {
    match token {
        "true" | "True" => Ok(true),
        "false" | "False" => Ok(false),
        _ => Err(ReportError::InvalidBoolean(token.to_string())),
    }
}
