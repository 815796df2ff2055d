//! Shared fixture: one traced Lotka–Volterra run shaped like an experiment.

#![allow(dead_code)]

use causim_dynamics::lotka_volterra::{FOXES, FOX_GROWTH, RABBITS};
use causim_dynamics::{Dynamics, Intervention, LotkaVolterra, Simulator, State};
use causim_trace::{Recorder, Tag, Tape, TapeRecord};

pub struct Fixture {
    pub intervention_time: usize,
    pub end_time: usize,
    pub rabbits: f64,
    pub foxes: f64,
    pub covariates: Vec<(&'static str, usize)>,
}

impl Fixture {
    /// Covariates at `intervention_time - 1` and `intervention_time`.
    pub fn standard(intervention_time: usize, end_time: usize) -> Self {
        let before = intervention_time.saturating_sub(1);
        Self {
            intervention_time,
            end_time,
            rabbits: 40.0,
            foxes: 9.0,
            covariates: vec![
                (RABBITS, before),
                (FOXES, before),
                (RABBITS, intervention_time),
                (FOXES, intervention_time),
            ],
        }
    }

    pub fn with_covariates(mut self, covariates: Vec<(&'static str, usize)>) -> Self {
        self.covariates = covariates;
        self
    }

    pub fn with_initial(mut self, rabbits: f64, foxes: f64) -> Self {
        self.rabbits = rabbits;
        self.foxes = foxes;
        self
    }

    pub fn trace(&self) -> TapeRecord {
        self.trace_with(|rec, traj| {
            for &(name, step) in &self.covariates {
                rec.covariate(traj.value(name, step).unwrap());
            }
        })
    }

    /// Trace the run; `covariates` registers the covariate columns.
    pub fn trace_with<F>(&self, covariates: F) -> TapeRecord
    where
        F: for<'t> Fn(&causim_trace::Tracer<'t>, &causim_dynamics::Trajectory<causim_trace::Var<'t>>),
    {
        let sim = Simulator::new(LotkaVolterra);
        let config = LotkaVolterra::default_config(self.end_time);
        let intervention = Intervention::new(self.intervention_time, FOX_GROWTH, 0.025);
        let tape = Tape::new();
        {
            let rec = tape.tracer();
            let initial = State::new(
                LotkaVolterra.state_names(),
                vec![
                    rec.input(Tag::state(RABBITS, 0), self.rabbits),
                    rec.input(Tag::state(FOXES, 0), self.foxes),
                ],
            )
            .unwrap();
            let mut traj = sim
                .run(&rec, &config, initial, self.intervention_time, None)
                .unwrap();

            let foxes = traj.value(FOXES, self.intervention_time).unwrap();
            let propensity = foxes / (foxes + 20.0) * 0.6 + 0.2;
            let treatment = rec.derived(Tag::Treatment, 1.0, &[propensity]);
            let ov = intervention
                .override_for(&config, true, Some(treatment))
                .unwrap();
            sim.resume(&rec, &config, &mut traj, self.end_time, Some(&ov))
                .unwrap();

            rec.record(Tag::Outcome, traj.value(FOXES, self.end_time).unwrap());
            covariates(&rec, &traj);
        }
        tape.finish()
    }
}
