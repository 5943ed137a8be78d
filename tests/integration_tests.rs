use std::io::Write;
use std::sync::Arc;

use ascent_simulation::{
    control::fuel_managment::FuelTank,
    control::propulsion::{ConsumptionRate, Engine},
    errors::{ConfigError, SimulationError},
    BodyCatalog, CelestialBody, DragSolver, Message, Part, PartCatalog, Position, Report,
    Rocket, RocketDesign, Stage, Tracker, DRAG_EPSILON,
};
use approx::assert_abs_diff_eq;

// Helper function to create the reference single-stage rocket
fn create_test_rocket() -> Rocket {
    let body = Arc::new(CelestialBody::with_surface_gravity("Test", 600_000.0, 9.81));
    let parts = vec![
        Part::Engine(Engine::new(
            "Test Engine",
            1250.0,
            215_000.0,
            ConsumptionRate::Constant(13.7),
        )),
        Part::FuelTank(FuelTank::new("Test Tank", 125.0, 1125.0, 200.0)),
    ];

    let mut rocket = Rocket::new("Scenario A", Position::on_surface(body));
    rocket.append_stage(Stage::with_parts("Core", parts)).unwrap();
    rocket
}

fn create_parts(entries: &[&str]) -> Vec<Part> {
    let catalog = PartCatalog::stock();
    entries
        .iter()
        .flat_map(|entry| catalog.resolve_entry(entry).unwrap())
        .collect()
}

fn flight_logs(rocket: &mut Rocket, dt: f64) -> Vec<Message> {
    rocket
        .fly(dt)
        .unwrap()
        .map(|message| message.unwrap())
        .collect()
}

#[test]
fn test_single_stage_burn() {
    let dt = 0.01;
    let mut rocket = create_test_rocket();
    let messages = flight_logs(&mut rocket, dt);

    let logs: Vec<_> = messages
        .iter()
        .filter_map(|message| match message {
            Message::FlightLog(log) => Some(log),
            Message::StageSeparation(_) => None,
        })
        .collect();

    assert_eq!(logs[0].abs_time, 0.0, "Rocket should ignite on the first tick");
    assert!(logs[0].thrust_to_weight() > 1.0);
    for pair in logs.windows(2) {
        assert!(
            pair[1].speed() > pair[0].speed(),
            "Speed should increase at t={:.2}s",
            pair[1].abs_time
        );
    }

    let burn_time = logs.last().unwrap().abs_time + dt;
    assert_abs_diff_eq!(burn_time, 200.0 / 13.7, epsilon = dt);
    assert!(rocket.structure.is_empty(), "Flight should end with no stages left");
}

#[test]
fn test_append_after_ignition() {
    let mut rocket = create_test_rocket();
    rocket.ignite().unwrap();

    let result = rocket.append_stage(Stage::with_parts("Late", create_parts(&["FL-T200"])));

    assert!(matches!(result, Err(SimulationError::AlreadyIgnited)));
}

#[test]
fn test_append_during_flight() {
    let mut rocket = create_test_rocket();
    rocket.fly(0.1).unwrap().take(3).for_each(drop);

    let result = rocket.append_stage(Stage::with_parts("Late", create_parts(&["FL-T200"])));

    assert!(matches!(result, Err(SimulationError::AlreadyIgnited)));
}

#[test]
fn test_drag_estimate_recovers_reference() {
    let position = BodyCatalog::kerbol_system().default_position().unwrap();
    let mut rocket = Rocket::new("Probe", position);
    rocket
        .append_stage(Stage::with_parts("Core", create_parts(&["LV-T30", "FL-T200"])))
        .unwrap();

    let target_time = 8.0;
    let target_altitude = DragSolver::new(0.0, target_time)
        .observe(&rocket, 1.3)
        .unwrap();
    let estimate = DragSolver::new(target_altitude, target_time)
        .solve(&rocket)
        .unwrap();

    assert_abs_diff_eq!(estimate.drag, 1.3, epsilon = DRAG_EPSILON);
    assert!(!estimate.brackets.is_empty());
    assert!(!rocket.is_ignited(), "Trials must fly copies of the rocket");
}

#[test]
fn test_staging_cascade() {
    let body = Arc::new(CelestialBody::with_surface_gravity("Test", 600_000.0, 9.81));
    let mut rocket = Rocket::new("Cascade", Position::on_surface(body));
    let top = Stage::with_parts("A", create_parts(&["LV-909", "FL-T200"]));
    let booster = Stage::new(
        Some("B"),
        create_parts(&["LV-909"]),
        Vec::new(),
        vec!["self".to_string(), "C".to_string()],
    )
    .unwrap();
    let core = Stage::new(
        Some("C"),
        create_parts(&["LV-T30", "FL-T200"]),
        vec!["B".to_string()],
        Vec::new(),
    )
    .unwrap();
    rocket.append_stage(top).unwrap();
    rocket.append_stage(booster).unwrap();
    rocket.append_stage(core).unwrap();

    let mut flight = rocket.fly(0.05).unwrap();
    let mut separations = Vec::new();
    let mut burned_after_staging = false;
    while let Some(message) = flight.next() {
        match message.unwrap() {
            Message::StageSeparation(separation) => {
                separations.push((separation.stage.name().to_string(), separation.abs_time));
            }
            Message::FlightLog(_) => {
                let top = flight.rocket().get_stage("A").unwrap();
                if separations.len() < 2 {
                    assert!(!top.is_ignited(), "A ignited before becoming the bottom stage");
                } else {
                    assert!(top.is_ignited());
                    burned_after_staging = true;
                }
            }
        }
        if separations.len() == 2 && burned_after_staging {
            break;
        }
    }

    assert_eq!(separations[0].0, "C");
    assert_eq!(separations[1].0, "B");
    assert_eq!(separations[0].1, separations[1].1);
    assert!(burned_after_staging);
}

#[test]
fn test_ground_clamp() {
    let body = Arc::new(CelestialBody::with_surface_gravity("Test", 600_000.0, 9.81));
    let mut rocket = Rocket::new("Brick", Position::on_surface(body));
    rocket
        .append_stage(Stage::with_parts("Core", create_parts(&["LV-909", "8x FL-T200"])))
        .unwrap();

    for message in rocket.fly(0.1).unwrap().take(100) {
        if let Message::FlightLog(log) = message.unwrap() {
            assert!(log.thrust_to_weight() < 1.0);
            assert!(log.speed() >= 0.0);
            assert!(log.surface_altitude() >= 0.0);
        }
    }
}

#[test]
fn test_monotonic_time_and_mass_conservation() {
    let dt = 0.02;
    let mut rocket = create_test_rocket();
    let initial_mass = rocket.get_total_mass();
    let initial_fuel = rocket.structure.get_total_fuel();

    let messages = flight_logs(&mut rocket, dt);

    let mut consumed = 0.0;
    let mut previous: Option<f64> = None;
    for message in &messages {
        if let Some(time) = previous {
            assert!(message.abs_time() >= time);
        }
        if let Message::FlightLog(log) = message {
            if let Some(time) = previous {
                assert_abs_diff_eq!(log.abs_time - time, dt, epsilon = 1e-9);
            }
            assert_abs_diff_eq!(log.start_mass(), log.end_mass() + log.consumed_kg, epsilon = 1e-6);
            assert_abs_diff_eq!(
                log.start_mass(),
                initial_mass - consumed,
                epsilon = 1e-6
            );
            consumed += log.consumed_kg;
        }
        previous = Some(message.abs_time());
    }

    assert_abs_diff_eq!(consumed, initial_fuel, epsilon = 1e-6);
    assert_abs_diff_eq!(consumed, 1000.0, epsilon = 1e-6);
}

#[test]
fn test_tracker_reports() {
    let mut rocket = create_test_rocket();
    let flight = rocket.fly(0.01).unwrap();

    let reports: Vec<Report> = Tracker::new(flight, 5.0).map(|r| r.unwrap()).collect();
    let kinds: Vec<_> = reports.iter().map(Report::telemetry_type).collect();

    // Boundaries near 5 s and 10 s, the separation, then the flushed tail.
    assert_eq!(
        kinds,
        vec![
            "FlightTelemetry",
            "FlightTelemetry",
            "StageSeparation",
            "FlightTelemetry"
        ]
    );
}

#[test]
fn test_part_resolution() {
    let catalog = PartCatalog::stock();

    assert_eq!(
        &**catalog.find_by_name("LV-T30 Liquid Fuel Engine").unwrap().name(),
        "LV-T30 Liquid Fuel Engine"
    );
    assert_eq!(
        &**catalog.find_by_name("fl-t200").unwrap().name(),
        "FL-T200 Fuel Tank"
    );
    assert!(matches!(
        catalog.find_by_name("Xenon thruster"),
        Err(ConfigError::UnknownPart { .. })
    ));
    assert!(matches!(
        catalog.find_by_name("LV-T"),
        Err(ConfigError::UnknownPart { .. })
    ));
}

#[test]
fn test_load_yaml_design() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "name: Kerbal One\ndrag: 0.2\nstages:\n  - parts: [Command Pod Mk1]\n  - name: Core\n    parts: [LV-T30, 2x FL-T200]\n"
    )
    .unwrap();

    let design = RocketDesign::load(file.path()).unwrap();
    let position = BodyCatalog::kerbol_system().default_position().unwrap();
    let rocket = design.build(&PartCatalog::stock(), position).unwrap();

    assert_eq!(&*rocket.name, "Kerbal One");
    assert_eq!(rocket.structure.stages()[0].name(), "Stage #1");
    assert_abs_diff_eq!(rocket.get_total_mass(), 800.0 + 1250.0 + 2.0 * 1125.0, epsilon = 1e-9);
}

#[test]
fn test_load_toml_design() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(
        file,
        "name = \"Kerbal Two\"\n\n[[stages]]\nname = \"Core\"\nparts = [\"LV-909\", \"FL-T200\"]\ntakesFuel = \"self\"\n"
    )
    .unwrap();

    let design = RocketDesign::load(file.path()).unwrap();
    let position = BodyCatalog::kerbol_system().default_position().unwrap();
    let mut rocket = design.build(&PartCatalog::stock(), position).unwrap();

    assert_eq!(&*rocket.name, "Kerbal Two");
    assert!(rocket.fly(0.1).unwrap().next().unwrap().is_ok());
}
