//! Integration tests: scenario file -> run -> answer key -> CSV

use std::fs;

use equil_rs::config::SimulationConfig;
use equil_rs::models::catalog;
use equil_rs::output::export::{export_run_csv, CsvConfig, CsvExporter, CsvMetadata, Exporter};
use equil_rs::output::{AnswerKey, Direction};
use equil_rs::physics::Species;
use equil_rs::solver::{simulate, BoundaryKind, Perturbation, Scenario};
use tempfile::tempdir;

mod common;
use common::{haber, quick_config, scenario_with};

const QUIZ_SCENARIO: &str = r#"{
    "reaction": { "a": 1, "b": 3, "c": 2, "d": 0, "delta_H": -92.0 },
    "phase_changes": ["Temperature", "Volume/Pressure", "Addition"],
    "temp_effects": [0.2, 0.0, 0.0],
    "vol_effects": [0.0, -0.2, 0.0],
    "A_perturb_list": [0.0, 0.0, 0.5],
    "B_perturb_list": [0.0, 0.0, 0.0],
    "C_perturb_list": [0.0, 0.0, 0.0],
    "D_perturb_list": [0.0, 0.0, 0.0]
}"#;

#[test]
fn test_tagged_scenario_to_graded_quiz() {
    let scenario = Scenario::from_json(QUIZ_SCENARIO).unwrap();
    assert_eq!(scenario.reaction, haber());
    assert_eq!(
        scenario.schedule.events(),
        &[
            Perturbation::Temperature { effect: 0.2 },
            Perturbation::VolumePressure { effect: -0.2 },
            Perturbation::addition_of(Species::A, 0.5),
        ]
    );

    let run = simulate(&scenario, quick_config()).unwrap();
    assert_eq!(run.phase_count(), 4);

    let reagents = catalog::haber_process().unwrap().reagents;
    let key = AnswerKey::from_run(&run, Some(&reagents));
    assert_eq!(key.len(), 3);

    let first = key.answer(1).unwrap();
    assert_eq!(first.kind, BoundaryKind::Temperature);
    assert_eq!(first.direction, Direction::Increase);
    assert_eq!(first.label, "Increase in Temperature");

    let second = key.answer(2).unwrap();
    assert_eq!(second.label, "Decrease in Volume");
    assert!(second.distractors.contains(&"Increase in Volume".to_string()));

    let third = key.answer(3).unwrap();
    assert_eq!(third.species, vec![Species::A]);
    assert_eq!(third.label, "Addition of N₂");
    assert_eq!(third.options().len(), 4);

    let score = key.grade(&["Increase in Temperature", "Increase in Volume", "Addition of N₂"]);
    assert_eq!(score.correct, 2);
    assert_eq!(score.results, vec![true, false, true]);
    assert_eq!(score.to_string(), "You got 2 out of 3 correct.");
}

#[test]
fn test_json_round_trip_gives_identical_run() {
    let scenario = Scenario::from_json(QUIZ_SCENARIO).unwrap();
    let reloaded = Scenario::from_json(&scenario.to_json().unwrap()).unwrap();
    assert_eq!(reloaded, scenario);

    let config = quick_config();
    assert_eq!(
        simulate(&scenario, config.clone()).unwrap(),
        simulate(&reloaded, config).unwrap()
    );
}

#[test]
fn test_scenario_file_errors() {
    // Negative exponent
    let negative = QUIZ_SCENARIO.replace("\"b\": 3", "\"b\": -3");
    assert!(Scenario::from_json(&negative).unwrap_err().is_configuration());

    // Unknown boundary tag
    let unknown = QUIZ_SCENARIO.replace("\"Addition\"", "\"Pressure\"");
    assert!(Scenario::from_json(&unknown).unwrap_err().is_configuration());

    // Effect array shorter than the tag list
    let short = QUIZ_SCENARIO.replace("[0.2, 0.0, 0.0]", "[0.2, 0.0]");
    assert!(Scenario::from_json(&short).unwrap_err().is_configuration());
}

#[test]
fn test_config_file_drives_run() {
    let config = SimulationConfig::from_json(
        r#"{ "phase_length": 100.0, "samples_per_phase": 51, "negative_policy": "Clamp" }"#,
    )
    .unwrap();

    let scenario = scenario_with(haber(), vec![Perturbation::addition_of(Species::B, -1.2)]);
    let run = simulate(&scenario, config).unwrap();

    assert_eq!(run.phases()[1].span.end, 200.0);
    assert_eq!(run.sample_count(), 102);
    assert!(run.boundaries()[0].clamped);
    assert_eq!(run.phases()[1].initial_state.get(Species::B), 0.0);
}

#[test]
fn test_run_exports_to_csv() {
    let scenario = Scenario::from_json(QUIZ_SCENARIO).unwrap();
    let config = quick_config();
    let run = simulate(&scenario, config.clone()).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("haber.csv");

    let csv = CsvConfig::default().with_metadata(CsvMetadata::from_run(&run, &config));
    export_run_csv(&run, &path, Some(&csv)).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("# Equilibrium Simulation Data"));
    assert!(content.contains("# Solver: Dormand-Prince 5(4)"));
    assert!(content.contains("Phase,Time,A,B,C,D"));

    let rows: Vec<&str> = content.lines().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(rows.len(), 1 + run.sample_count());
    assert!(rows[1].starts_with("0,0.000000,1.000000,1.000000,0.000000,0.000000"));
    assert!(rows.last().unwrap().starts_with("3,800.000000,"));
}

#[test]
fn test_exporter_downsamples_each_phase() {
    let scenario = scenario_with(haber(), vec![Perturbation::Temperature { effect: -0.1 }]);
    let run = simulate(&scenario, quick_config()).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("downsampled.csv");

    let exporter = CsvExporter::new(CsvConfig::default().delimiter(';'));
    exporter.export(&run, Some(11), &path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let rows: Vec<&str> = content.lines().collect();
    assert_eq!(rows[0], "Phase;Time;A;B;C;D");
    assert_eq!(rows.len(), 1 + 2 * 11);
    assert!(rows[11].starts_with("0;200.000000;"));
    assert!(rows[12].starts_with("1;200.000000;"));
}

mod with_prelude {
    use equil_rs::prelude::*;
    use std::path::Path;

    // Library and export errors both go through `?` into a boxed error
    fn quiz_to_csv(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
        let haber = catalog::haber_process()?;
        let scenario = Scenario::new(
            haber.spec,
            RunSchedule::new(vec![Perturbation::Temperature { effect: 0.2 }]),
        );
        let run = simulate(&scenario, SimulationConfig::default().with_samples_per_phase(20))?;

        CsvExporter::default().export(&run, None, path)?;

        let key = AnswerKey::from_run(&run, Some(&haber.reagents));
        Ok(key.grade(&["Increase in Temperature"]).to_string())
    }

    #[test]
    fn test_prelude_leaves_std_result_usable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prelude.csv");

        let score = quiz_to_csv(&path).unwrap();
        assert_eq!(score, "You got 1 out of 1 correct.");
        assert!(path.exists());
    }
}
