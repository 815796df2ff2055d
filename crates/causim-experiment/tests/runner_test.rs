mod common;

use causim_core::errors::{CausimError, ExperimentError};
use causim_experiment::presets::predator_prey;
use causim_experiment::{derive_seed, run, run_parallel, OnDivergence, RunOptions};
use common::{experiment, options, Flaky, Overconfident};
use proptest::prelude::*;

#[test]
fn predator_prey_dataset_has_named_covariate_columns() {
    let experiment = predator_prey(3, 6).unwrap();
    let dataset = run(&experiment, &options(100)).unwrap();

    assert_eq!(dataset.len(), 100);
    assert_eq!(dataset.covariate_width(), 4);
    assert!(dataset.covariates.iter().all(|row| row.len() == 4));
    assert_eq!(
        dataset.covariate_names().unwrap(),
        ["rabbits_2", "foxes_2", "rabbits_3", "foxes_3"].map(String::from).as_slice()
    );
    assert_eq!(dataset.samples, (0..100).collect::<Vec<_>>());
    assert!(dataset.dropped.is_empty());
    assert!(dataset.validate_schema().is_ok());

    let graph = dataset.causal_graph.as_ref().unwrap();
    assert_eq!(graph.parents("Treatment"), vec!["foxes_3".to_string()]);
    assert_eq!(graph.parents("Outcome"), vec!["foxes_6".to_string()]);
}

#[test]
fn treatment_assignment_follows_the_propensity() {
    let dataset = run(&predator_prey(3, 6).unwrap(), &options(400)).unwrap();
    assert!(dataset.propensities.iter().all(|p| (0.2..=0.8).contains(p)));
    let treated = dataset.treatments.iter().filter(|&&t| t).count();
    assert!(treated > 0 && treated < dataset.len());

    let n = dataset.len() as f64;
    let treated_rate = treated as f64 / n;
    let mean_propensity = dataset.propensities.iter().sum::<f64>() / n;
    assert!(
        (treated_rate - mean_propensity).abs() < 0.08,
        "treated rate {treated_rate} vs mean propensity {mean_propensity}"
    );

    // Column 3 is foxes_3, the fox count the assignment reads.
    for (row, &p) in dataset.covariates.iter().zip(&dataset.propensities) {
        let foxes = row[3];
        let expected = foxes / (foxes + 20.0) * (0.8 - 0.2) + 0.2;
        assert!((p - expected).abs() < 1e-12, "propensity {p} for foxes {foxes}");
    }
}

#[test]
fn initial_foxes_depend_on_initial_rabbits() {
    let dataset = run(&predator_prey(3, 6).unwrap(), &options(5)).unwrap();
    let graph = dataset.causal_graph.unwrap();
    assert!(graph.has_edge("rabbits_0", "foxes_0"));
    assert_eq!(graph.parents("foxes_0"), vec!["rabbits_0".to_string()]);
    assert!(graph.parents("rabbits_0").is_empty());
}

#[test]
fn raising_fox_growth_increases_final_foxes() {
    let dataset = run(&predator_prey(3, 6).unwrap(), &options(100)).unwrap();
    assert!(dataset.true_effects.iter().all(|e| e.is_finite()));
    assert!(dataset.average_true_effect().unwrap() > 0.0);
}

#[test]
fn same_seed_reproduces_the_dataset() {
    let experiment = predator_prey(3, 6).unwrap();
    let a = run(&experiment, &options(50)).unwrap();
    let b = run(&experiment, &options(50)).unwrap();
    assert_eq!(a.covariates, b.covariates);
    assert_eq!(a.treatments, b.treatments);
    assert_eq!(a.outcomes, b.outcomes);

    let c = run(&experiment, &options(50).with_seed(8)).unwrap();
    assert_ne!(a.outcomes, c.outcomes);
}

#[test]
fn tracing_does_not_change_the_samples() {
    let experiment = predator_prey(3, 6).unwrap();
    let traced = run(&experiment, &options(30)).unwrap();
    let untraced = run(
        &experiment,
        &RunOptions {
            causal_graph: false,
            ..options(30)
        },
    )
    .unwrap();

    assert!(untraced.causal_graph.is_none());
    assert_eq!(traced.covariates, untraced.covariates);
    assert_eq!(traced.treatments, untraced.treatments);
    assert_eq!(traced.outcomes, untraced.outcomes);
}

#[test]
fn parallel_runs_are_deterministic_and_match_the_sequential_graph() {
    let experiment = predator_prey(3, 6).unwrap();
    let parallel = RunOptions {
        parallel: true,
        ..options(64)
    };
    let a = run_parallel(&experiment, &parallel).unwrap();
    let b = experiment.execute(&parallel).unwrap();
    assert_eq!(a.covariates, b.covariates);
    assert_eq!(a.treatments, b.treatments);
    assert_eq!(a.outcomes, b.outcomes);

    let sequential = run(&experiment, &options(64)).unwrap();
    let (pg, sg) = (a.causal_graph.unwrap(), sequential.causal_graph.unwrap());
    assert_eq!(pg.node_names(), sg.node_names());
    assert_eq!(pg.edge_list(), sg.edge_list());
    assert_eq!(pg.covariate_names(), sg.covariate_names());
}

#[test]
fn derived_seeds_differ_per_sample() {
    let seeds: std::collections::HashSet<u64> = (0..1000).map(|i| derive_seed(42, i)).collect();
    assert_eq!(seeds.len(), 1000);
    assert_ne!(derive_seed(1, 0), derive_seed(2, 0));
}

#[test]
fn keep_trajectories_stores_one_per_row() {
    let dataset = run(
        &predator_prey(3, 6).unwrap(),
        &RunOptions {
            keep_trajectories: true,
            ..options(10)
        },
    )
    .unwrap();
    assert_eq!(dataset.trajectories.len(), 10);
    assert!(dataset.trajectories.iter().all(|t| t.last_step() == 6));

    let lean = run(&predator_prey(3, 6).unwrap(), &options(10)).unwrap();
    assert!(lean.trajectories.is_empty());
}

#[test]
fn propensity_outside_unit_interval_is_fatal() {
    let err = run(&experiment(Overconfident::default()), &options(5)).unwrap_err();
    assert!(matches!(
        err,
        CausimError::Experiment(ExperimentError::PropensityOutOfRange { sample: 0, .. })
    ));
}

#[test]
fn drop_policy_skips_divergent_samples() {
    let opts = RunOptions {
        divergence: OnDivergence::Drop,
        ..options(200)
    };
    let dataset = run(&experiment(Flaky::new(0.3)), &opts).unwrap();

    assert!(!dataset.dropped.is_empty());
    assert_eq!(dataset.len() + dataset.dropped.len(), 200);
    assert!(dataset.dropped.iter().all(|d| d.attempts == 1));
    for dropped in &dataset.dropped {
        assert!(!dataset.samples.contains(&dropped.sample));
    }
    assert!(dataset.validate_schema().is_ok());
}

#[test]
fn retry_policy_redraws_until_the_sample_converges() {
    let opts = RunOptions {
        divergence: OnDivergence::Retry { max_attempts: 30 },
        ..options(100)
    };
    let dataset = run(&experiment(Flaky::new(0.3)), &opts).unwrap();
    assert_eq!(dataset.len(), 100);
    assert!(dataset.dropped.is_empty());
}

#[test]
fn retry_policy_gives_up_after_max_attempts() {
    let opts = RunOptions {
        divergence: OnDivergence::Retry { max_attempts: 3 },
        ..options(5)
    };
    let err = run(&experiment(Flaky::new(1.0)), &opts).unwrap_err();
    assert!(matches!(
        err,
        CausimError::Experiment(ExperimentError::RetriesExhausted {
            sample: 0,
            attempts: 3
        })
    ));
}

#[test]
fn abort_policy_fails_on_the_first_divergence() {
    let opts = RunOptions {
        divergence: OnDivergence::Abort,
        ..options(200)
    };
    let err = run(&experiment(Flaky::new(0.3)), &opts).unwrap_err();
    assert!(matches!(
        err,
        CausimError::Experiment(ExperimentError::SampleDiverged { .. })
    ));
}

#[test]
fn dropping_every_sample_is_an_error() {
    let opts = RunOptions {
        divergence: OnDivergence::Drop,
        ..options(10)
    };
    let err = run(&experiment(Flaky::new(1.0)), &opts).unwrap_err();
    assert!(matches!(
        err,
        CausimError::Experiment(ExperimentError::AllSamplesDropped)
    ));
}

#[test]
fn parallel_drop_policy_matches_its_own_rerun() {
    let opts = RunOptions {
        divergence: OnDivergence::Drop,
        parallel: true,
        ..options(100)
    };
    let experiment = experiment(Flaky::new(0.3));
    let a = run_parallel(&experiment, &opts).unwrap();
    let b = run_parallel(&experiment, &opts).unwrap();
    assert_eq!(a.samples, b.samples);
    assert_eq!(a.dropped, b.dropped);
    assert!(a.causal_graph.is_some());
}

#[test]
fn low_divergence_threshold_trips_the_guard() {
    let opts = RunOptions {
        divergence: OnDivergence::Abort,
        divergence_threshold: Some(1.0),
        ..options(3)
    };
    let err = run(&predator_prey(3, 6).unwrap(), &opts).unwrap_err();
    assert!(matches!(
        err,
        CausimError::Experiment(ExperimentError::SampleDiverged { sample: 0, .. })
    ));
}

#[test]
fn experiment_threshold_applies_when_options_leave_it_unset() {
    let mut experiment = predator_prey(3, 6).unwrap();
    experiment.config.divergence_threshold = 1.0;
    let opts = RunOptions {
        divergence: OnDivergence::Abort,
        ..options(3)
    };
    assert_eq!(opts.divergence_threshold, None);
    let err = run(&experiment, &opts).unwrap_err();
    assert!(matches!(
        err,
        CausimError::Experiment(ExperimentError::SampleDiverged { sample: 0, .. })
    ));
}

#[test]
fn invalid_setups_are_rejected() {
    assert!(matches!(
        predator_prey(7, 6).unwrap_err(),
        ExperimentError::InterventionOutOfRange { time: 7, end_time: 6 }
    ));
    assert!(matches!(
        predator_prey(0, 6).unwrap_err(),
        ExperimentError::InvalidDesign { .. }
    ));
    let err = run(&predator_prey(3, 6).unwrap(), &options(0)).unwrap_err();
    assert!(matches!(err, CausimError::Experiment(ExperimentError::NoSamples)));
}

#[test]
fn intervention_at_the_last_step_runs_without_a_causal_path() {
    let dataset = run(&predator_prey(6, 6).unwrap(), &options(20)).unwrap();
    assert!(dataset.true_effects.iter().all(|&e| e == 0.0));
    let graph = dataset.causal_graph.unwrap();
    assert!(graph.children("Treatment").is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn covariate_columns_always_match_the_graph(
        intervention_time in 1usize..6,
        seed in any::<u64>(),
    ) {
        let experiment = predator_prey(intervention_time, 6).unwrap();
        let dataset = run(&experiment, &options(10).with_seed(seed)).unwrap();
        prop_assert!(dataset.validate_schema().is_ok());
        let names = dataset.covariate_names().unwrap();
        prop_assert_eq!(names.len(), 4);
        let expected = format!("foxes_{intervention_time}");
        prop_assert_eq!(names[3].as_str(), expected.as_str());
    }
}
