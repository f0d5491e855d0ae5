#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;

use vmplaces_logs::run_log::scan_run_log;
use vmplaces_logs::{ExperimentStats, ReportError};

pub const ENTROPY_HEADER: &str = "Running simulation.Main -Dsimulator.implementation=scheduling.centralized.entropy2.Entropy2RP with 64 compute and 1 service nodes turning off hosts: true, load.mean=70, load.std=20";
pub const FFD_HEADER: &str = "Running simulation.Main -Dsimulator.implementation=scheduling.centralized.ffd.LazyFirstFitDecreased with 64 compute and 1 service nodes turning off hosts: false, load.mean=70, load.std=20";

pub fn assert_float_eq(x: f64, y: f64, eps: f64) {
    assert!(x > y - eps && x < y + eps, "{} != {}", x, y);
}

pub fn turn_off(time: f64, node: &str) -> String {
    format!("[node0:manager:(3) {:.2}] [SimulatorManager/INFO] Turn off {}", time, node)
}

pub fn turn_on(time: f64, node: &str) -> String {
    format!("[node0:manager:(3) {:.2}] [SimulatorManager/INFO] Turn on node {}", time, node)
}

pub fn injection_end(time: f64) -> String {
    format!("[node0:injector:(1) {:.2}] [Injector/INFO] End of Injection", time)
}

pub fn scheduler_tick(time: f64) -> String {
    format!(
        "[node0:scheduler:(2) {:.2}] [Scheduler/INFO] Launching scheduler (id = 1) - start to compute",
        time
    )
}

pub fn migration_end(vm: u32, from: &str, to: &str) -> String {
    format!(
        "[node0:manager:(3) 1.00] [SimulatorManager/INFO] End of migration of VM vm-{} from {} to {}",
        vm, from, to
    )
}

pub fn scan(lines: &[String], stats: &mut ExperimentStats) -> Result<(), ReportError> {
    let text = lines.join("\n");
    scan_run_log(Cursor::new(text), Path::new("run_all.log"), stats)
}

/// Run log of the Entropy run with host turn-off: two nodes go off, one comes back before the end.
pub fn entropy_run() -> Vec<String> {
    vec![
        ENTROPY_HEADER.to_string(),
        turn_off(100.25, "node1"),
        turn_off(200.75, "node2"),
        turn_on(300.50, "node1"),
        injection_end(1800.40),
    ]
}
