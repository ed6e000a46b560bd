//! builds the jobs of one calibration iteration from the current position.
//! every job owns a deep copy of the position, so no two jobs (and no job and
//! the host) share a parameter vector.
use crate::target::RunKind;
use itertools::Itertools;
use xtmf_calibration_core::parameter::{Job, ParameterSetting};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobMode {
    /// a single base job; the position never moves.
    JustCompute,
    /// one job per target with only that target perturbed, then a base job.
    SeparateDerivatives,
    /// one job with every target perturbed at once, then a base job.
    CombinedDerivative,
}

impl JobMode {
    /// number of jobs per iteration for `targets` targets.
    pub fn jobs_per_iteration(&self, targets: usize) -> usize {
        match self {
            JobMode::JustCompute => 1,
            JobMode::SeparateDerivatives => targets + 1,
            JobMode::CombinedDerivative => 2,
        }
    }
}

/// which targets store the outcome of a job, and into which slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobKind {
    /// only target `target` stores, as its step run.
    Explore { target: usize },
    /// every target stores a step run.
    Combined,
    /// every target stores a base run.
    Base,
}

impl JobKind {
    pub fn run_kind(&self) -> RunKind {
        match self {
            JobKind::Explore { .. } | JobKind::Combined => RunKind::Step,
            JobKind::Base => RunKind::Base,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlannedJob {
    pub kind: JobKind,
    pub job: Job,
}

/// the ordered jobs of an iteration. the base job is always last.
///
/// # Arguments
///
/// * `position` - current value of every target's parameter, in target order
/// * `explore_sizes` - each target's perturbation, in target order
/// * `mode` - how derivatives are estimated
pub fn compute_jobs(position: &[ParameterSetting], explore_sizes: &[f32], mode: JobMode) -> Vec<PlannedJob> {
    let mut jobs = match mode {
        JobMode::JustCompute => vec![],
        JobMode::SeparateDerivatives => (0..position.len())
            .map(|target| PlannedJob {
                kind: JobKind::Explore { target },
                job: Job::new(explore_one(position, explore_sizes, target)),
            })
            .collect_vec(),
        JobMode::CombinedDerivative => vec![PlannedJob {
            kind: JobKind::Combined,
            job: Job::new(explore_all(position, explore_sizes)),
        }],
    };
    jobs.push(PlannedJob {
        kind: JobKind::Base,
        job: Job::new(position.to_vec()),
    });
    jobs
}

fn explore_one(position: &[ParameterSetting], explore_sizes: &[f32], target: usize) -> Vec<ParameterSetting> {
    position
        .iter()
        .zip(explore_sizes)
        .enumerate()
        .map(|(i, (setting, explore))| {
            if i == target {
                setting.with_offset(*explore)
            } else {
                setting.clone()
            }
        })
        .collect_vec()
}

fn explore_all(position: &[ParameterSetting], explore_sizes: &[f32]) -> Vec<ParameterSetting> {
    position
        .iter()
        .zip(explore_sizes)
        .map(|(setting, explore)| setting.with_offset(*explore))
        .collect_vec()
}
