//! Example: Quiz Answer Key
//!
//! Builds a quiz for every reaction of the catalog: one boundary of each
//! kind, simulated, then turned into questions with the correct answer and
//! three distractors. A scripted student answers every question with the
//! first distractor of the last boundary, and the quiz is graded.
//!
//! Also shows the tagged scenario file format, the one a quiz front end
//! writes and reads.

use equil_rs::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("═══════════════════════════════════════════════════════");
    println!("  Le Chatelier Quiz - Answer Keys");
    println!("═══════════════════════════════════════════════════════\n");

    let schedule = RunSchedule::new(vec![
        Perturbation::VolumePressure { effect: 0.3 },
        Perturbation::Temperature { effect: -0.25 },
        Perturbation::addition_of(Species::C, -0.4),
    ]);

    let scenarios: Vec<Scenario> = catalog::presets()
        .iter()
        .map(|preset| Scenario::new(preset.spec, schedule.clone()))
        .collect();

    let config = SimulationConfig::default()
        .with_samples_per_phase(250)
        .with_negative_policy(NegativeConcentrationPolicy::Clamp);
    let runs = PhaseScheduler::new(config)?.run_batch(&scenarios);

    for (preset, run) in catalog::presets().iter().zip(runs) {
        let run = run?;
        let key = AnswerKey::from_run(&run, Some(&preset.reagents));

        println!("{}", preset.name);
        println!("  {}", preset.spec);

        for answer in key.answers() {
            let time = run.boundaries()[answer.boundary - 1].time;
            println!("  Q{}: what changed at t = {time}?", answer.boundary);
            for (i, option) in answer.options().iter().enumerate() {
                let mark = if i == 0 { "*" } else { " " };
                println!("     {mark} {option}");
            }
        }

        let mut submissions: Vec<String> =
            key.answers().iter().map(|a| a.label.clone()).collect();
        if let Some(last) = key.answers().last() {
            submissions[last.boundary - 1] = last.distractors[0].clone();
        }
        println!("  {}\n", key.grade(&submissions));
    }

    // ====== Scenario file ======

    let haber = catalog::haber_process()?;
    let json = Scenario::new(haber.spec, schedule).to_json()?;
    println!("Tagged scenario file for the Haber quiz:\n{json}");

    Ok(())
}
