//! The run executor.
//!
//! Per sample: draw an initial state, simulate untreated up to the
//! intervention time, score the propensity, draw the treatment, then finish
//! the realized arm and the counterfactual arm from the shared prefix. The
//! first accepted sample is traced and becomes the causal graph.

use causim_causal::{CausalGraph, GraphBuilder};
use causim_core::errors::{CausimResult, ExperimentError, SimulationError};
use causim_core::{run_span, sample_span};
use causim_dynamics::{SimConfig, Trajectory};
use causim_trace::{Recorder, Scalar, Tag, Tape, TapeRecord, Untraced};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::dataset::{Dataset, DroppedSample};
use crate::design::ExperimentDesign;
use crate::experiment::Experiment;
use crate::options::{OnDivergence, RunOptions};

/// Seed for sample `index` under parallel execution (splitmix64 finalizer).
pub fn derive_seed(master: u64, index: u64) -> u64 {
    let mut z = master ^ index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Sequential execution with one generator seeded from `options.seed`.
/// The same seed reproduces the same dataset, with or without a graph.
pub fn run<E: ExperimentDesign>(
    experiment: &Experiment<E>,
    options: &RunOptions,
) -> CausimResult<Dataset> {
    experiment.validate()?;
    options.validate()?;
    let config = options.sim_config(&experiment.config);
    let span = run_span!(experiment.name, options.num_samples);
    let _guard = span.enter();

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut collector = Collector::new(options.num_samples, options.keep_trajectories);
    let mut tape = None;
    for index in 0..options.num_samples {
        let trace = options.causal_graph && tape.is_none();
        match run_sample(experiment, &config, options, index, &mut rng, trace)? {
            SampleResult::Accepted(mut sample) => {
                if tape.is_none() {
                    tape = sample.tape.take();
                }
                collector.accept(sample)?;
            }
            SampleResult::Dropped(dropped) => collector.drop_sample(dropped),
        }
    }
    collector.finish(experiment, options, tape)
}

/// Parallel execution on the rayon pool. Sample `i` owns a generator seeded
/// with [`derive_seed`]`(seed, i)`, so results do not depend on scheduling.
/// The representative sample is replayed traced on the calling thread.
pub fn run_parallel<E: ExperimentDesign>(
    experiment: &Experiment<E>,
    options: &RunOptions,
) -> CausimResult<Dataset> {
    experiment.validate()?;
    options.validate()?;
    let config = options.sim_config(&experiment.config);
    let span = run_span!(experiment.name, options.num_samples);
    let _guard = span.enter();

    let results: Vec<Result<SampleResult, ExperimentError>> = (0..options.num_samples)
        .into_par_iter()
        .map(|index| {
            let mut rng = sample_rng(options.seed, index);
            run_sample(experiment, &config, options, index, &mut rng, false)
        })
        .collect();

    let mut collector = Collector::new(options.num_samples, options.keep_trajectories);
    let mut representative = None;
    for result in results {
        match result? {
            SampleResult::Accepted(sample) => {
                representative.get_or_insert(sample.index);
                collector.accept(sample)?;
            }
            SampleResult::Dropped(dropped) => collector.drop_sample(dropped),
        }
    }

    let tape = match representative {
        Some(index) if options.causal_graph => {
            let mut rng = sample_rng(options.seed, index);
            match run_sample(experiment, &config, options, index, &mut rng, true)? {
                SampleResult::Accepted(sample) => sample.tape,
                SampleResult::Dropped(_) => None,
            }
        }
        _ => None,
    };
    collector.finish(experiment, options, tape)
}

fn sample_rng(seed: u64, index: usize) -> StdRng {
    StdRng::seed_from_u64(derive_seed(seed, index as u64))
}

/// One accepted sample, provenance dropped.
struct AcceptedSample {
    index: usize,
    covariates: Vec<f64>,
    treated: bool,
    outcome: f64,
    true_effect: f64,
    propensity: f64,
    trajectory: Trajectory<f64>,
    /// Set only when the sample ran traced.
    tape: Option<TapeRecord>,
}

enum SampleResult {
    Accepted(AcceptedSample),
    Dropped(DroppedSample),
}

/// Attempt sample `index` under the divergence policy.
fn run_sample<E: ExperimentDesign>(
    experiment: &Experiment<E>,
    config: &SimConfig,
    options: &RunOptions,
    index: usize,
    rng: &mut StdRng,
    trace: bool,
) -> Result<SampleResult, ExperimentError> {
    let max_attempts = options.divergence.max_attempts();
    for attempt in 1..=max_attempts {
        let span = sample_span!(index, attempt);
        let _guard = span.enter();

        let error = match attempt_once(experiment, config, index, rng, trace) {
            Ok(sample) => return Ok(SampleResult::Accepted(sample)),
            Err(e) => e,
        };
        let source = match into_divergence(error) {
            Ok(source) => source,
            Err(fatal) => return Err(fatal),
        };
        match options.divergence {
            OnDivergence::Abort => {
                return Err(ExperimentError::SampleDiverged {
                    sample: index,
                    source,
                })
            }
            OnDivergence::Drop => {
                tracing::warn!(sample = index, error = %source, "dropping divergent sample");
                return Ok(SampleResult::Dropped(DroppedSample {
                    sample: index,
                    attempts: attempt,
                    reason: source.to_string(),
                }));
            }
            OnDivergence::Retry { .. } => {
                tracing::debug!(sample = index, attempt, error = %source, "redrawing divergent sample");
            }
        }
    }
    Err(ExperimentError::RetriesExhausted {
        sample: index,
        attempts: max_attempts,
    })
}

fn into_divergence(error: ExperimentError) -> Result<SimulationError, ExperimentError> {
    match error {
        ExperimentError::Simulation(source @ SimulationError::Diverged { .. }) => Ok(source),
        other => Err(other),
    }
}

fn attempt_once<E: ExperimentDesign>(
    experiment: &Experiment<E>,
    config: &SimConfig,
    index: usize,
    rng: &mut StdRng,
    trace: bool,
) -> Result<AcceptedSample, ExperimentError> {
    if !trace {
        return simulate(experiment, config, index, rng, &Untraced);
    }
    let tape = Tape::new();
    let mut sample = simulate(experiment, config, index, rng, &tape.tracer())?;
    sample.tape = Some(tape.finish());
    Ok(sample)
}

/// The per-sample algorithm. Draws from `rng` identically whether or not
/// `rec` traces.
fn simulate<E: ExperimentDesign, R: Recorder>(
    experiment: &Experiment<E>,
    config: &SimConfig,
    index: usize,
    rng: &mut StdRng,
    rec: &R,
) -> Result<AcceptedSample, ExperimentError> {
    let design = &experiment.design;
    let simulator = design.simulator();
    let intervention = &experiment.intervention;

    let initial = design.sample_initial_state(rng, rec)?;
    let mut realized = simulator.run(rec, config, initial, intervention.time, None)?;

    let propensity = design.propensity(&realized, intervention)?;
    let p = propensity.value();
    if !(0.0..=1.0).contains(&p) {
        return Err(ExperimentError::PropensityOutOfRange {
            sample: index,
            value: p,
        });
    }
    let treated = rng.random_bool(p);
    let treatment = rec.derived(Tag::Treatment, if treated { 1.0 } else { 0.0 }, &[propensity]);

    let mut counterfactual = realized.to_plain();
    let realized_override = intervention.override_for(config, treated, Some(treatment))?;
    simulator.resume(rec, config, &mut realized, config.end_time, Some(&realized_override))?;
    let counterfactual_override = intervention.override_for::<f64>(config, !treated, None)?;
    simulator.resume(
        &Untraced,
        config,
        &mut counterfactual,
        config.end_time,
        Some(&counterfactual_override),
    )?;

    let outcome = rec
        .record(Tag::Outcome, design.outcome(&realized, config)?)
        .value();
    let counterfactual_outcome = design.outcome(&counterfactual, config)?;
    let true_effect = if treated {
        outcome - counterfactual_outcome
    } else {
        counterfactual_outcome - outcome
    };

    let row = design.covariates(&realized, intervention)?;
    let mut covariates = Vec::with_capacity(row.len());
    for value in row {
        rec.covariate(value);
        covariates.push(value.value());
    }

    Ok(AcceptedSample {
        index,
        covariates,
        treated,
        outcome,
        true_effect,
        propensity: p,
        trajectory: realized.to_plain(),
        tape: None,
    })
}

/// Gathers accepted rows in sample order.
struct Collector {
    dataset: Dataset,
    keep_trajectories: bool,
}

impl Collector {
    fn new(capacity: usize, keep_trajectories: bool) -> Self {
        let dataset = Dataset {
            covariates: Vec::with_capacity(capacity),
            treatments: Vec::with_capacity(capacity),
            outcomes: Vec::with_capacity(capacity),
            true_effects: Vec::with_capacity(capacity),
            propensities: Vec::with_capacity(capacity),
            samples: Vec::with_capacity(capacity),
            ..Dataset::default()
        };
        Self {
            dataset,
            keep_trajectories,
        }
    }

    fn accept(&mut self, sample: AcceptedSample) -> Result<(), ExperimentError> {
        let d = &mut self.dataset;
        if let Some(first) = d.covariates.first() {
            if first.len() != sample.covariates.len() {
                return Err(ExperimentError::CovariateArity {
                    sample: sample.index,
                    expected: first.len(),
                    actual: sample.covariates.len(),
                });
            }
        }
        d.covariates.push(sample.covariates);
        d.treatments.push(sample.treated);
        d.outcomes.push(sample.outcome);
        d.true_effects.push(sample.true_effect);
        d.propensities.push(sample.propensity);
        d.samples.push(sample.index);
        if self.keep_trajectories {
            d.trajectories.push(sample.trajectory);
        }
        Ok(())
    }

    fn drop_sample(&mut self, dropped: DroppedSample) {
        self.dataset.dropped.push(dropped);
    }

    fn finish<E: ExperimentDesign>(
        mut self,
        experiment: &Experiment<E>,
        options: &RunOptions,
        tape: Option<TapeRecord>,
    ) -> CausimResult<Dataset> {
        if self.dataset.is_empty() {
            return Err(ExperimentError::AllSamplesDropped.into());
        }
        if let Some(record) = tape {
            let graph = build_graph(experiment, options, &record)?;
            self.dataset.causal_graph = Some(graph);
            self.dataset.validate_schema()?;
        }
        tracing::info!(
            accepted = self.dataset.len(),
            dropped = self.dataset.dropped.len(),
            treated = self.dataset.treatments.iter().filter(|&&t| t).count(),
            "experiment finished"
        );
        Ok(self.dataset)
    }
}

fn build_graph<E: ExperimentDesign>(
    experiment: &Experiment<E>,
    options: &RunOptions,
    record: &TapeRecord,
) -> CausimResult<CausalGraph> {
    let spec = experiment.build_spec(options.validate_time_order);
    Ok(GraphBuilder::build(record, &spec)?)
}
