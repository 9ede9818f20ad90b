use std::io::Write;
use std::path::Path;
use std::time::Duration;

use rune_core::GainCategory;
use rune_runtime::{
    AutoCast, RuntimeConfig, RuntimeError, Scenario, ScenarioEvent, Simulation, SimulationReport,
    TimedEvent,
};

fn at(secs: f64, event: ScenarioEvent) -> TimedEvent {
    TimedEvent {
        at_secs: secs,
        event,
    }
}

fn cast(runes: u32) -> ScenarioEvent {
    ScenarioEvent::Cast {
        runes,
        power_cost: 0.0,
    }
}

fn run(config: RuntimeConfig, scenario: Scenario) -> SimulationReport {
    Simulation::new(config, scenario)
        .expect("simulation should build")
        .run()
        .expect("simulation should run")
}

fn gains(report: &SimulationReport, category: GainCategory) -> (f64, u64) {
    report
        .gains
        .iter()
        .find(|g| g.category == category)
        .map(|g| (g.actual, g.records))
        .expect("every category is reported")
}

fn proc_heavy() -> Scenario {
    Scenario {
        duration_secs: Some(60.0),
        refill_chance_per_cost: 0.02,
        double_speed_chance_per_cost: 0.5,
        auto_cast: Some(AutoCast {
            runes: 2,
            power_cost: 30.0,
        }),
        ..Scenario::new("proc heavy")
    }
}

#[test]
fn same_seed_gives_same_report() {
    let config = RuntimeConfig::default().with_seed(7).with_iterations(3);

    let first = run(config.clone(), proc_heavy());
    let second = run(config, proc_heavy());

    assert_eq!(first, second);
    assert!(first.casts > 0);
    assert!(first.refill_procs > 0);
}

#[test]
fn different_seed_changes_digest() {
    let a = run(RuntimeConfig::default().with_seed(7), proc_heavy());
    let b = run(RuntimeConfig::default().with_seed(8), proc_heavy());
    assert_ne!(a.digest, b.digest);
}

#[test]
fn scripted_casts_are_skipped_when_runes_are_short() {
    let scenario = Scenario {
        duration_secs: Some(2.0),
        events: vec![at(0.0, cast(4)), at(1.0, cast(4))],
        ..Scenario::new("short")
    };

    let report = run(RuntimeConfig::default(), scenario);
    assert_eq!(report.casts, 1);
    assert_eq!(report.skipped_casts, 1);
}

#[test]
fn iterations_start_from_a_full_pool() {
    let scenario = Scenario {
        duration_secs: Some(1.0),
        events: vec![at(0.0, cast(6))],
        ..Scenario::new("spend all")
    };

    let report = run(RuntimeConfig::default().with_iterations(2), scenario);

    // Both iterations could spend all six runes.
    assert_eq!(report.casts, 2);
    assert_eq!(report.skipped_casts, 0);
    assert_eq!(
        report.final_status,
        "rrrddd [0.10][0.10][0.10][0.00][0.00][0.00]"
    );
    assert_eq!(report.ready_events, 0);
}

#[test]
fn leaving_play_delays_but_does_not_lose_regeneration() {
    let base = Scenario {
        duration_secs: Some(25.0),
        events: vec![at(0.0, cast(6))],
        ..Scenario::new("steady")
    };
    let mut away = base.clone();
    away.events.push(at(5.0, ScenarioEvent::LeavePlay));
    away.events.push(at(12.0, ScenarioEvent::ReturnToPlay));

    let steady = run(RuntimeConfig::default(), base);
    let deferred = run(RuntimeConfig::default(), away);

    assert_eq!(steady.final_status, deferred.final_status);
    assert_eq!(steady.ready_events, deferred.ready_events);
    assert_ne!(steady.digest, deferred.digest);
}

#[test]
fn empower_and_refill_gains_are_split_by_category() {
    let scenario = Scenario {
        duration_secs: Some(6.0),
        events: vec![
            at(0.0, cast(6)),
            at(5.0, ScenarioEvent::Empower),
            at(5.5, ScenarioEvent::Replenish(1)),
        ],
        ..Scenario::new("categories")
    };

    let report = run(RuntimeConfig::default(), scenario);

    assert_eq!(gains(&report, GainCategory::Empower), (6.0, 6));
    // The pool is full again, so the replenish is wasted.
    assert_eq!(gains(&report, GainCategory::Administrative), (0.0, 1));
    assert_eq!(report.wasted_refills, 1);
    assert_eq!(report.final_status, "FFFFFF [1.00][1.00][1.00][1.00][1.00][1.00]");
}

#[test]
fn double_speed_event_shortens_regeneration() {
    let base = Scenario {
        duration_secs: Some(6.0),
        events: vec![at(0.0, cast(1))],
        ..Scenario::new("normal")
    };
    let mut boosted = base.clone();
    boosted
        .events
        .push(at(0.0, ScenarioEvent::DoubleSpeed { secs: 10.0 }));

    let normal = run(RuntimeConfig::default(), base);
    let fast = run(RuntimeConfig::default(), boosted);

    assert_eq!(gains(&normal, GainCategory::Regeneration).0, 0.0);
    assert_eq!(gains(&fast, GainCategory::DoubledRegeneration).0, 1.0);
    assert!(fast.final_status.starts_with("FFFFFF"));
    assert!(normal.final_status.starts_with("rFFFFF"));
}

#[test]
fn scenario_file_round_trip() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"Scenario(
            name: "from disk",
            duration_secs: Some(20.0),
            haste_percent: 25.0,
            auto_cast: Some(AutoCast(runes: 1)),
            events: [
                TimedEvent(at_secs: 3.0, event: SetHaste(0.0)),
                TimedEvent(at_secs: 4.0, event: Fill(FirstRegenerating)),
            ],
        )"#
    )
    .expect("write scenario");

    let scenario = Scenario::load_from_file(file.path()).expect("scenario should load");
    assert_eq!(scenario.name, "from disk");
    assert_eq!(scenario.events.len(), 2);

    let report = run(RuntimeConfig::default(), scenario);
    assert_eq!(report.scenario, "from disk");
    assert!(report.casts > 0);

    let json = serde_json::to_string(&report).expect("report serializes");
    assert!(json.contains(&report.digest));
}

#[test]
fn missing_scenario_file_is_an_io_error() {
    let err = Scenario::load_from_file(Path::new("/definitely/not/here.ron")).unwrap_err();
    assert!(matches!(err, RuntimeError::Io { .. }));
}

#[test]
fn invalid_config_is_rejected_before_running() {
    let config = RuntimeConfig {
        tick: Duration::ZERO,
        ..RuntimeConfig::default()
    };
    let err = Simulation::new(config, Scenario::default())
        .err()
        .expect("zero tick must be rejected");
    assert!(matches!(err, RuntimeError::InvalidConfig(_)));
}

#[test]
fn bundled_scenario_runs() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../scenarios/opener.ron");
    let scenario = Scenario::load_from_file(&path).expect("bundled scenario should load");

    let report = run(RuntimeConfig::default().with_seed(11), scenario);
    assert_eq!(report.scenario, "opener");
    assert_eq!(report.iteration_secs, 120.0);
    assert!(report.casts > 0);
    assert_eq!(report.gains.len(), 5);
}

#[test]
fn out_of_range_event_time_is_rejected_before_running() {
    let scenario = Scenario::from_ron_str(
        r#"Scenario(name: "x", events: [TimedEvent(at_secs: 1e20, event: Empower)])"#,
    )
    .expect("scenario parses");
    let err = Simulation::new(RuntimeConfig::default(), scenario)
        .err()
        .expect("event time beyond Duration must be rejected");
    assert!(matches!(err, RuntimeError::InvalidConfig(_)));
}
