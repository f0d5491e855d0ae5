mod common;
use common::*;

use std::io::Cursor;
use std::path::Path;

use rstest::rstest;

use vmplaces_logs::energy::{parse_energy_line, scan_energy_table};
use vmplaces_logs::{ExperimentStats, ReportError, RunKey};

fn stats_with_duration() -> ExperimentStats {
    let mut stats = ExperimentStats::new();
    scan(&entropy_run(), &mut stats).unwrap();
    stats
}

#[test]
fn test_energy_in_kilowatts() {
    let mut stats = stats_with_duration();
    let table = "64 centralized Entropy2RP true 3600000.0\n\n64 centralized LazyFirstFitDecreased False 7200000\n";
    let samples = scan_energy_table(Cursor::new(table), Path::new("energy.dat"), &mut stats).unwrap();

    assert_eq!(samples, 2);
    assert_float_eq(stats.energy_of(RunKey::new(64, true, "Entropy")).unwrap(), 2.0, 1e-9);
    assert_float_eq(stats.energy_of(RunKey::new(64, false, "FFD")).unwrap(), 4.0, 1e-9);
    assert_eq!(stats.energy_host_counts().into_iter().collect::<Vec<_>>(), vec![64]);
}

#[rstest]
#[case("128 centralized Entropy2RP true 90 1234.5", Some(90), 1234.5)]
#[case("128 centralized Entropy2RP true 1234.5", None, 1234.5)]
#[case("128 centralized Entropy2RP true 1234", None, 1234.)]
fn test_optional_threshold(#[case] line: &str, #[case] threshold: Option<u32>, #[case] joules: f64) {
    let sample = parse_energy_line(line, 1).unwrap();
    assert_eq!(sample.hosts, 128);
    assert_eq!(sample.algorithm, "Entropy");
    assert!(sample.turn_off);
    assert_eq!(sample.threshold, threshold);
    assert_float_eq(sample.joules, joules, 1e-9);
}

#[test]
fn test_malformed_line() {
    let mut stats = stats_with_duration();
    let table = "64 centralized Entropy2RP true 3600000.0\nenergy of the last run: 12\n";
    let err = scan_energy_table(Cursor::new(table), Path::new("energy.dat"), &mut stats).unwrap_err();
    assert!(matches!(err, ReportError::MalformedEnergyLine { line_no: 2, .. }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_bad_boolean() {
    let mut stats = stats_with_duration();
    let table = "64 centralized Entropy2RP yes 3600000.0\n";
    let err = scan_energy_table(Cursor::new(table), Path::new("energy.dat"), &mut stats).unwrap_err();
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_duration_required() {
    let mut stats = ExperimentStats::new();
    let table = "64 centralized Entropy2RP true 3600000.0\n";
    let err = scan_energy_table(Cursor::new(table), Path::new("energy.dat"), &mut stats).unwrap_err();
    assert!(matches!(err, ReportError::UnknownDuration));
}

#[test]
fn test_run_shorter_than_a_second() {
    let mut stats = ExperimentStats::new();
    scan(&[ENTROPY_HEADER.to_string(), injection_end(0.40)], &mut stats).unwrap();
    assert_eq!(stats.simulation_time, Some(0.));

    let table = "64 centralized Entropy2RP true 3600000.0\n";
    let err = scan_energy_table(Cursor::new(table), Path::new("energy.dat"), &mut stats).unwrap_err();
    assert!(matches!(err, ReportError::ZeroDuration));
    assert_eq!(err.exit_code(), 1);
    assert!(stats.energy.is_empty());
}
