mod common;
use common::*;

use vmplaces_logs::{ExperimentStats, LoadParams, ReportError, RunKey};

#[test]
fn test_host_population_curve() {
    let mut stats = ExperimentStats::new();
    scan(&entropy_run(), &mut stats).unwrap();
    stats.close_host_population();

    assert_eq!(stats.simulation_time, Some(1800.));
    assert_eq!(
        stats.host_population[&(64, "Entropy")],
        vec![(0, 0), (100, -1), (200, -2), (300, -1), (1800, -1)]
    );
    assert_eq!(stats.load, Some(LoadParams { mean: 70, std: 20 }));
    assert_eq!(stats.algorithms, vec!["Entropy"]);

    let counters = &stats.runs[&RunKey::new(64, true, "Entropy")];
    assert_eq!(counters.turn_offs, 2);
    assert_eq!(counters.end_time, Some(1800.40));
}

#[test]
fn test_on_time() {
    let mut stats = ExperimentStats::new();
    scan(&entropy_run(), &mut stats).unwrap();

    let counters = &stats.runs[&RunKey::new(64, true, "Entropy")];
    let simulation_time = stats.simulation_time.unwrap();
    assert_eq!(simulation_time, 1800.);
    assert_float_eq(counters.on_time["node1"], 100.25 + 1800. - 300.50, 1e-9);
    assert_float_eq(counters.on_time["node2"], 200.75, 1e-9);
    for on_time in counters.on_time.values() {
        assert!(*on_time >= 0. && *on_time <= simulation_time);
    }
    assert_float_eq(counters.total_on_time(), 1800.50, 1e-9);
    assert!(counters.total_on_time() <= 64. * simulation_time);
}

#[test]
fn test_on_time_bounded_by_duration() {
    let mut stats = ExperimentStats::new();
    let header = ENTROPY_HEADER.replace("with 64 compute", "with 2 compute");
    let lines = vec![
        header,
        turn_on(0., "node1"),
        turn_off(100.50, "node2"),
        injection_end(100.90),
    ];
    scan(&lines, &mut stats).unwrap();

    let counters = &stats.runs[&RunKey::new(2, true, "Entropy")];
    assert_eq!(stats.simulation_time, Some(100.));
    assert_float_eq(counters.on_time["node1"], 100., 1e-9);
    assert_float_eq(counters.on_time["node2"], 100., 1e-9);
    for on_time in counters.on_time.values() {
        assert!(*on_time <= stats.simulation_time.unwrap());
    }
    assert!(counters.total_on_time() <= 2. * stats.simulation_time.unwrap());
}

#[test]
fn test_counters() {
    let mut stats = ExperimentStats::new();
    let lines = vec![
        FFD_HEADER.to_string(),
        scheduler_tick(30.),
        migration_end(1, "node1", "node2"),
        scheduler_tick(60.),
        migration_end(2, "node3", "node2"),
        migration_end(3, "node4", "node2"),
        turn_off(70., "node1"),
        injection_end(900.),
    ];
    scan(&lines, &mut stats).unwrap();

    let counters = &stats.runs[&RunKey::new(64, false, "FFD")];
    assert_eq!(counters.migrations, 3);
    assert_eq!(counters.scheduler_ticks, vec![30., 60.]);
    assert_eq!(counters.turn_offs, 1);
    // no host curve without host turn-off
    assert!(stats.host_population.is_empty());
}

#[test]
fn test_events_after_end_are_ignored() {
    let mut stats = ExperimentStats::new();
    let mut lines = entropy_run();
    lines.push(FFD_HEADER.replace("hosts: false", "hosts: true"));
    lines.push(turn_off(50., "node1"));
    lines.push(turn_off(1800., "node2"));
    lines.push(turn_off(2500., "node3"));
    lines.push(turn_on(2600., "node3"));
    lines.push(turn_on(2700., "node3"));
    lines.push(injection_end(1800.99));
    scan(&lines, &mut stats).unwrap();
    stats.close_host_population();

    assert_eq!(stats.host_population[&(64, "FFD")], vec![(0, 0), (50, -1), (1800, -1)]);
    let counters = &stats.runs[&RunKey::new(64, true, "FFD")];
    assert_eq!(counters.turn_offs, 3);
    assert_eq!(counters.on_time.len(), 1);
}

#[test]
fn test_population_times_are_monotonic() {
    let mut stats = ExperimentStats::new();
    let mut lines = vec![ENTROPY_HEADER.to_string()];
    for i in 0..20 {
        let node = format!("node{}", i);
        lines.push(turn_off(10. * i as f64 + 0.5, &node));
        lines.push(turn_on(10. * i as f64 + 5.5, &node));
    }
    lines.push(injection_end(3600.));
    scan(&lines, &mut stats).unwrap();
    stats.close_host_population();
    stats.close_host_population();

    let series = &stats.host_population[&(64, "Entropy")];
    assert_eq!(series.len(), 42);
    assert!(series.windows(2).all(|w| w[0].0 <= w[1].0));
    assert_eq!(*series.last().unwrap(), (3600, 0));
}

#[test]
fn test_repeated_header_resets_run() {
    let mut stats = ExperimentStats::new();
    let mut lines = entropy_run();
    lines.extend(entropy_run());
    scan(&lines, &mut stats).unwrap();

    let counters = &stats.runs[&RunKey::new(64, true, "Entropy")];
    assert_eq!(counters.turn_offs, 2);
    assert_eq!(stats.algorithms, vec!["Entropy"]);
}

#[test]
fn test_double_turn_on() {
    let mut stats = ExperimentStats::new();
    let lines = vec![ENTROPY_HEADER.to_string(), turn_on(10., "node1"), turn_on(20., "node1")];
    let err = scan(&lines, &mut stats).unwrap_err();
    assert!(matches!(err, ReportError::NodeAlreadyOn { ref node, .. } if node == "node1"));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_double_turn_off() {
    let mut stats = ExperimentStats::new();
    let lines = vec![ENTROPY_HEADER.to_string(), turn_off(10., "node1"), turn_off(20., "node1")];
    let err = scan(&lines, &mut stats).unwrap_err();
    assert!(matches!(err, ReportError::NodeNotOn { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_bad_boolean() {
    let mut stats = ExperimentStats::new();
    let lines = vec![ENTROPY_HEADER.replace("hosts: true", "hosts: yes")];
    let err = scan(&lines, &mut stats).unwrap_err();
    assert!(matches!(err, ReportError::InvalidBoolean(ref token) if token == "yes"));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_unknown_algorithm() {
    let mut stats = ExperimentStats::new();
    let lines = vec![ENTROPY_HEADER.replace("entropy2.Entropy2RP", "snooze.Snooze")];
    let err = scan(&lines, &mut stats).unwrap_err();
    assert!(matches!(err, ReportError::UnknownAlgorithm(ref name) if name == "Snooze"));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_event_before_header() {
    let mut stats = ExperimentStats::new();
    let lines = vec![turn_off(10., "node1"), ENTROPY_HEADER.to_string()];
    let err = scan(&lines, &mut stats).unwrap_err();
    assert!(matches!(err, ReportError::NoActiveRun { line_no: 1, .. }));
}

#[test]
fn test_unrelated_lines_are_skipped() {
    let mut stats = ExperimentStats::new();
    let lines = vec![
        "Starting experiments".to_string(),
        ENTROPY_HEADER.to_string(),
        "[node0:injector:(1) 5.00] [Injector/INFO] Injecting VM vm-1".to_string(),
        String::new(),
        injection_end(100.),
    ];
    scan(&lines, &mut stats).unwrap();
    assert_eq!(stats.runs.len(), 1);
}
