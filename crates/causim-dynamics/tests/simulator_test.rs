use causim_core::errors::SimulationError;
use causim_dynamics::lotka_volterra::{self, FOXES, FOX_GROWTH, RABBITS};
use causim_dynamics::{
    Dynamics, Integrator, Intervention, LotkaVolterra, ParamOverride, SimConfig, Simulator, State,
};
use causim_trace::{Recorder, Tag, Tape, Untraced};
use proptest::prelude::*;

fn initial<R: Recorder>(rec: &R, rabbits: f64, foxes: f64) -> State<R::Scalar> {
    State::new(
        LotkaVolterra.state_names(),
        vec![rec.constant(rabbits), rec.constant(foxes)],
    )
    .unwrap()
}

#[test]
fn euler_single_step_matches_hand_computation() {
    let sim = Simulator::new(LotkaVolterra);
    let config = LotkaVolterra::default_config(1).with_integrator(Integrator::Euler, 1);
    let traj = sim
        .run(&Untraced, &config, initial(&Untraced, 10.0, 5.0), 1, None)
        .unwrap();

    assert!((traj.value(RABBITS, 1).unwrap() - 12.25).abs() < 1e-12);
    assert!((traj.value(FOXES, 1).unwrap() - 2.25).abs() < 1e-12);
}

#[test]
fn equilibrium_is_a_fixed_point() {
    let sim = Simulator::new(LotkaVolterra);
    let config = LotkaVolterra::default_config(20);
    let rabbits = 0.7 / 0.015;
    let foxes = 0.3 / 0.015;
    let traj = sim
        .run(&Untraced, &config, initial(&Untraced, rabbits, foxes), 20, None)
        .unwrap();

    assert_eq!(traj.len(), 21);
    for step in 0..=20 {
        assert!((traj.value(RABBITS, step).unwrap() - rabbits).abs() < 1e-9);
        assert!((traj.value(FOXES, step).unwrap() - foxes).abs() < 1e-9);
    }
}

#[test]
fn resume_continues_a_prefix_exactly() {
    let sim = Simulator::new(LotkaVolterra);
    let config = LotkaVolterra::default_config(6);
    let full = sim
        .run(&Untraced, &config, initial(&Untraced, 40.0, 9.0), 6, None)
        .unwrap();

    let mut prefix = sim
        .run(&Untraced, &config, initial(&Untraced, 40.0, 9.0), 3, None)
        .unwrap();
    assert_eq!(prefix.last_step(), 3);
    sim.resume(&Untraced, &config, &mut prefix, 6, None).unwrap();

    assert_eq!(prefix, full);
}

#[test]
fn override_only_changes_steps_from_its_start() {
    let sim = Simulator::new(LotkaVolterra);
    let config = LotkaVolterra::default_config(6);
    let base = sim
        .run(&Untraced, &config, initial(&Untraced, 40.0, 9.0), 6, None)
        .unwrap();

    let ov: ParamOverride<f64> = Intervention::new(3, FOX_GROWTH, 0.04)
        .override_for(&config, true, None)
        .unwrap();
    let treated = sim
        .run(&Untraced, &config, initial(&Untraced, 40.0, 9.0), 6, Some(&ov))
        .unwrap();

    for step in 0..=3 {
        assert_eq!(base.state_at(step), treated.state_at(step));
    }
    assert!(treated.value(FOXES, 6).unwrap() > base.value(FOXES, 6).unwrap());
}

#[test]
fn untreated_override_reproduces_the_base_run() {
    let sim = Simulator::new(LotkaVolterra);
    let config = LotkaVolterra::default_config(6);
    let base = sim
        .run(&Untraced, &config, initial(&Untraced, 40.0, 9.0), 6, None)
        .unwrap();
    let ov = Intervention::new(3, FOX_GROWTH, 0.04)
        .override_for(&config, false, None)
        .unwrap();
    let control = sim
        .run(&Untraced, &config, initial(&Untraced, 40.0, 9.0), 6, Some(&ov))
        .unwrap();
    assert_eq!(base, control);
}

#[test]
fn traced_run_matches_untraced_and_tags_every_step() {
    let sim = Simulator::new(LotkaVolterra);
    let config = LotkaVolterra::default_config(4);
    let plain = sim
        .run(&Untraced, &config, initial(&Untraced, 30.0, 12.0), 4, None)
        .unwrap();

    let tape = Tape::new();
    let rec = tape.tracer();
    let traced = sim
        .run(&rec, &config, initial(&rec, 30.0, 12.0), 4, None)
        .unwrap()
        .to_plain();
    assert_eq!(plain, traced);

    let record = tape.finish();
    let tags: Vec<Tag> = record.tagged().map(|(_, t)| t.clone()).collect();
    for step in 0..=4 {
        assert!(tags.contains(&Tag::state(RABBITS, step)));
        assert!(tags.contains(&Tag::state(FOXES, step)));
    }
    // Parameters are read at steps 0..end_time-1 only.
    for step in 0..4 {
        assert!(tags.contains(&Tag::param(FOX_GROWTH, step)));
    }
    assert!(!tags.contains(&Tag::param(FOX_GROWTH, 4)));
}

#[test]
fn overridden_params_derive_from_their_cause() {
    let sim = Simulator::new(LotkaVolterra);
    let config = LotkaVolterra::default_config(4);
    let tape = Tape::new();
    let rec = tape.tracer();
    let cause = rec.input(Tag::Treatment, 1.0);
    let cause_index = cause.index();
    let ov = Intervention::new(2, FOX_GROWTH, 0.02)
        .override_for(&config, true, Some(cause))
        .unwrap();
    sim.run(&rec, &config, initial(&rec, 30.0, 12.0), 4, Some(&ov))
        .unwrap();

    let record = tape.finish();
    for (index, tag) in record.tagged() {
        if let Tag::Param { name, step } = tag {
            let parents = &record.nodes[index].parents;
            if name == FOX_GROWTH && *step >= 2 {
                assert_eq!(parents.as_slice(), &[cause_index]);
                assert_eq!(record.nodes[index].value, 0.02);
            } else {
                assert!(parents.is_empty(), "{tag} should be a leaf");
            }
        }
    }
}

#[test]
fn blow_up_is_reported_as_divergence() {
    let sim = Simulator::new(LotkaVolterra);
    let mut config = LotkaVolterra::default_config(50);
    config.set_param(lotka_volterra::RABBIT_GROWTH, 25.0).unwrap();
    config.set_param(lotka_volterra::RABBIT_DEATH, 0.0).unwrap();
    config.divergence_threshold = 1e6;

    let err = sim
        .run(&Untraced, &config, initial(&Untraced, 10.0, 1.0), 50, None)
        .unwrap_err();
    assert!(matches!(err, SimulationError::Diverged { ref variable, .. } if variable == RABBITS));
}

#[test]
fn nan_initial_state_is_divergent() {
    let sim = Simulator::new(LotkaVolterra);
    let config = LotkaVolterra::default_config(3);
    let err = sim
        .run(&Untraced, &config, initial(&Untraced, f64::NAN, 1.0), 3, None)
        .unwrap_err();
    assert!(matches!(err, SimulationError::Diverged { step: 0, .. }));
}

#[test]
fn run_past_end_time_is_rejected() {
    let sim = Simulator::new(LotkaVolterra);
    let config = LotkaVolterra::default_config(3);
    let err = sim
        .run(&Untraced, &config, initial(&Untraced, 10.0, 1.0), 4, None)
        .unwrap_err();
    assert!(matches!(err, SimulationError::InvalidRange { .. }));
}

#[test]
fn config_validation_checks_declared_params() {
    let mut config = LotkaVolterra::default_config(3);
    assert!(config.validate(&LotkaVolterra).is_ok());
    assert!(config.set_param("wolves", 1.0).is_err());

    config.params.insert("wolves".to_string(), 1.0);
    assert!(matches!(
        config.validate(&LotkaVolterra),
        Err(SimulationError::UnknownParameter { .. })
    ));

    let mut config = LotkaVolterra::default_config(3);
    config.params.remove(FOX_GROWTH);
    assert!(matches!(
        config.validate(&LotkaVolterra),
        Err(SimulationError::MissingParameter { .. })
    ));

    let mut config = LotkaVolterra::default_config(3);
    config.substeps = 0;
    assert!(config.validate(&LotkaVolterra).is_err());
}

#[test]
fn intervention_validation() {
    let config = LotkaVolterra::default_config(6);
    assert!(Intervention::new(6, FOX_GROWTH, 0.02)
        .validate(&config, &LotkaVolterra)
        .is_ok());
    assert!(Intervention::new(7, FOX_GROWTH, 0.02)
        .validate(&config, &LotkaVolterra)
        .is_err());
    assert!(Intervention::new(3, "wolves", 0.02)
        .validate(&config, &LotkaVolterra)
        .is_err());
}

#[test]
fn sim_config_deserializes_with_defaults() {
    let config: SimConfig = toml::from_str(
        r#"
end_time = 6
delta_t = 0.5

[params]
rabbit_growth = 0.3
rabbit_death = 0.015
fox_growth = 0.015
fox_death = 0.7
"#,
    )
    .unwrap();
    assert_eq!(config.integrator, Integrator::Rk4);
    assert_eq!(config.substeps, 10);
    assert!(config.validate(&LotkaVolterra).is_ok());
}

proptest! {
    #[test]
    fn populations_stay_positive_and_finite(rabbits in 10.0f64..100.0, frac in 0.1f64..0.8) {
        let sim = Simulator::new(LotkaVolterra);
        let config = LotkaVolterra::default_config(6);
        let traj = sim
            .run(&Untraced, &config, initial(&Untraced, rabbits, rabbits * frac), 6, None)
            .unwrap();
        for state in traj.states() {
            for (_, v) in state.iter() {
                prop_assert!(v.is_finite() && v > 0.0);
            }
        }
    }
}
