use super::{
    job_ops, CalibrationError, CalibrationHostConfig, CalibrationReport, CalibrationSummary,
    HostMonitor, HostState, JobKind, JobMode, PlannedJob,
};
use crate::{
    diagnostics::{DiagnosticSink, LogSink},
    target::{CalibrationTarget, RunKind},
};
use itertools::Itertools;
use kdam::{Bar, BarExt};
use rayon::prelude::*;
use std::sync::Arc;
use xtmf_calibration_core::{
    model::{ModelSystem, SelfContainedModule},
    parameter::ParameterSetting,
};

/// drives the calibration loop: builds the jobs of each iteration, runs the
/// model once per job, lets the targets measure the outcome and moves the
/// position.
pub struct CalibrationHost<M: ModelSystem> {
    config: CalibrationHostConfig,
    model: M,
    targets: Vec<CalibrationTarget>,
    pre_run: Vec<Box<dyn SelfContainedModule>>,
    post_run: Vec<Box<dyn SelfContainedModule>>,
    diagnostics: Arc<dyn DiagnosticSink>,
    monitor: HostMonitor,
}

impl<M: ModelSystem> CalibrationHost<M> {
    pub fn new(config: CalibrationHostConfig, model: M, targets: Vec<CalibrationTarget>) -> Self {
        let monitor = HostMonitor::with_exit_hook(model.exit_hook());
        CalibrationHost {
            config,
            model,
            targets,
            pre_run: vec![],
            post_run: vec![],
            diagnostics: Arc::new(LogSink),
            monitor,
        }
    }

    /// adds a module run once before the first iteration.
    pub fn with_pre_run(mut self, module: Box<dyn SelfContainedModule>) -> Self {
        self.pre_run.push(module);
        self
    }

    /// adds a module run once after the last iteration.
    pub fn with_post_run(mut self, module: Box<dyn SelfContainedModule>) -> Self {
        self.post_run.push(module);
        self
    }

    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    pub fn config(&self) -> &CalibrationHostConfig {
        &self.config
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn targets(&self) -> &[CalibrationTarget] {
        &self.targets
    }

    /// a handle for observing this host, or asking it to stop, from another
    /// thread. requests made through it reach the model only if the model
    /// provides an exit hook.
    pub fn monitor(&self) -> HostMonitor {
        self.monitor.clone()
    }

    /// stops the calibration at the next iteration or module boundary and
    /// forwards the request to the model system.
    pub fn exit_request(&self) -> bool {
        self.monitor
            .request_exit()
            .unwrap_or_else(|| self.model.exit_request())
    }

    pub fn status(&self) -> String {
        self.monitor.status()
    }

    pub fn progress(&self) -> f32 {
        self.monitor.progress()
    }

    /// checks the configuration, then binds and loads every target. fails
    /// before any model run on a bad setting, parameter path or target input.
    pub fn validate(&mut self) -> Result<(), CalibrationError> {
        self.monitor.set_state(HostState::Initializing);
        self.config.validate()?;
        if self.targets.is_empty() {
            return Err(CalibrationError::validation(
                "calibration host",
                String::from("at least one target is required"),
            ));
        }
        if let Some(duplicate) = self.targets.iter().map(|t| t.name()).duplicates().next() {
            return Err(CalibrationError::validation(
                duplicate,
                String::from("target names must be unique"),
            ));
        }
        let registry = self.model.parameters();
        self.targets
            .par_iter_mut()
            .map(|target| {
                target
                    .initialize(registry)
                    .map_err(|e| CalibrationError::validation(target.name(), e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(())
    }

    /// runs the whole calibration.
    ///
    /// # Returns
    ///
    /// a summary of the iterations run and the final position. any model run,
    /// save or report failure ends the calibration with an error.
    pub fn run(&mut self) -> Result<CalibrationSummary, CalibrationError> {
        let started_at = chrono::Local::now().to_rfc3339();
        self.validate()?;
        let mut position = self.load_position()?;
        let explore_sizes = self
            .targets
            .iter()
            .map(|t| t.settings().explore_size)
            .collect_vec();
        let mode = self.config.job_mode();
        log::info!(
            "calibrating {} targets against model system '{}' for up to {} iterations ({mode:?})",
            self.targets.len(),
            self.model.name(),
            self.config.max_iterations
        );

        self.monitor.set_state(HostState::RunningPreRun);
        run_modules(&mut self.pre_run, &self.monitor)?;

        let mut bar = self.progress_bar(mode)?;
        let mut jobs_per_iteration = vec![];
        for iteration in 0..self.config.max_iterations {
            if self.monitor.exit_requested() {
                log::info!("exit requested, stopping before iteration {iteration}");
                break;
            }
            self.monitor.set_state(HostState::RunningIteration(iteration));
            let mut jobs = job_ops::compute_jobs(&position, &explore_sizes, mode);
            self.run_jobs(&mut jobs, iteration, bar.as_mut())?;
            if mode != JobMode::JustCompute {
                self.compute_new_position(&mut position)?;
                self.run_save_parameters(&position)?;
            }
            self.store_results(iteration, &position)?;
            jobs_per_iteration.push(jobs.len());
        }
        if let Some(bar) = bar.as_mut() {
            let _ = bar.refresh();
        }

        let exit_requested = self.monitor.exit_requested();
        if !exit_requested {
            self.monitor.set_state(HostState::RunningPostRun);
            run_modules(&mut self.post_run, &self.monitor)?;
        }
        self.monitor.set_state(HostState::Complete);
        let summary = CalibrationSummary {
            iterations_completed: jobs_per_iteration.len(),
            jobs_per_iteration,
            final_position: position,
            exit_requested,
            started_at,
            finished_at: chrono::Local::now().to_rfc3339(),
        };
        log::info!(
            "calibration finished after {} iterations",
            summary.iterations_completed
        );
        Ok(summary)
    }

    /// the starting position, read from the live parameter values.
    fn load_position(&self) -> Result<Vec<ParameterSetting>, CalibrationError> {
        self.targets
            .iter()
            .map(|t| {
                t.parameter_setting()
                    .map_err(|e| CalibrationError::validation(t.name(), e.to_string()))
            })
            .collect()
    }

    fn run_jobs(
        &mut self,
        jobs: &mut [PlannedJob],
        iteration: usize,
        mut bar: Option<&mut Bar>,
    ) -> Result<(), CalibrationError> {
        let n_jobs = jobs.len();
        for (index, planned) in jobs.iter_mut().enumerate() {
            self.monitor
                .set_progress(iteration, self.config.max_iterations, index, n_jobs);
            for (target, setting) in self.targets.iter().zip(planned.job.parameters.iter()) {
                target.set_parameter_value(setting.current)?;
            }
            self.model
                .run()
                .map_err(|source| CalibrationError::ModelRunFailed {
                    iteration,
                    job: index,
                    source,
                })?;
            let kind = planned.kind.run_kind();
            match planned.kind {
                JobKind::Explore { target } => {
                    if let Some(t) = self.targets.get_mut(target) {
                        t.store_run(kind)?;
                    }
                }
                JobKind::Combined | JobKind::Base => self.store_all(kind)?,
            }
            planned.job.mark_done();
            if let Some(bar) = bar.as_mut() {
                let _ = bar.update(1);
            }
        }
        self.monitor
            .set_progress(iteration + 1, self.config.max_iterations, 0, n_jobs);
        Ok(())
    }

    /// targets measure independent outputs, so they store in parallel.
    fn store_all(&mut self, kind: RunKind) -> Result<(), CalibrationError> {
        self.targets
            .par_iter_mut()
            .try_for_each(|target| target.store_run(kind))?;
        Ok(())
    }

    fn compute_new_position(&self, position: &mut [ParameterSetting]) -> Result<(), CalibrationError> {
        for (target, setting) in self.targets.iter().zip(position.iter_mut()) {
            let next = target.update_parameter(setting.current, self.diagnostics.as_ref())?;
            log::debug!("target '{}' moved {} -> {next}", target.name(), setting.current);
            setting.current = next;
        }
        Ok(())
    }

    fn run_save_parameters(&mut self, position: &[ParameterSetting]) -> Result<(), CalibrationError> {
        if !self.config.save_parameters {
            return Ok(());
        }
        for (target, setting) in self.targets.iter().zip(position) {
            target
                .set_parameter_and_save(setting.current)
                .map_err(|e| CalibrationError::SaveFailed {
                    module: target.name().to_string(),
                    message: e.to_string(),
                })?;
        }
        self.model
            .save_configuration()
            .map_err(|e| CalibrationError::SaveFailed {
                module: self.model.name().to_string(),
                message: e.to_string(),
            })
    }

    fn store_results(&self, iteration: usize, position: &[ParameterSetting]) -> Result<(), CalibrationError> {
        let names = self.targets.iter().map(|t| t.name()).collect_vec();
        let distances = self
            .targets
            .iter()
            .map(|t| t.report_target_distance())
            .collect_vec();
        let values = position.iter().map(|p| p.current).collect_vec();
        log::info!(
            "iteration {iteration}: {}",
            names
                .iter()
                .zip(distances.iter())
                .map(|(n, d)| format!("{n}={}", d.map(|v| v.to_string()).unwrap_or_default()))
                .join(", ")
        );
        match &self.config.calibration_report {
            Some(path) => CalibrationReport::new(path).append(iteration, &names, &distances, &values),
            None => Ok(()),
        }
    }

    fn progress_bar(&self, mode: JobMode) -> Result<Option<Bar>, CalibrationError> {
        if !self.config.show_progress {
            return Ok(None);
        }
        let total = self.config.max_iterations * mode.jobs_per_iteration(self.targets.len());
        let bar = Bar::builder()
            .total(total)
            .desc("calibration jobs")
            .build()
            .map_err(|e| CalibrationError::validation("calibration host", format!("error building progress bar: {e}")))?;
        Ok(Some(bar))
    }
}

/// starts each module in order, stopping early once an exit is requested.
fn run_modules(
    modules: &mut [Box<dyn SelfContainedModule>],
    monitor: &HostMonitor,
) -> Result<(), CalibrationError> {
    for module in modules.iter_mut() {
        if monitor.exit_requested() {
            log::info!("exit requested, skipping module '{}'", module.name());
            break;
        }
        log::info!("starting module '{}'", module.name());
        module
            .start()
            .map_err(|source| CalibrationError::ModuleFailed {
                name: module.name().to_string(),
                source,
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagnostics::{DiagnosticKind, MemorySink},
        target::{ScalarTarget, TargetKind, TargetSettings},
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use xtmf_calibration_core::{
        model::{ConstantSource, ExitHook, ModelSystemError, SharedSource},
        parameter::{ParameterCell, ParameterRegistry},
    };

    /// output `i` is `10 + sum_j coefficients[i][j] * parameter[j]`.
    struct LinearModel {
        registry: ParameterRegistry,
        cells: Vec<Arc<ParameterCell>>,
        outputs: Vec<SharedSource<f32>>,
        coefficients: Vec<Vec<f32>>,
        runs: Vec<Vec<f32>>,
        saves: usize,
        fail_save: bool,
        fail_run: bool,
        exit_after: Option<(usize, HostMonitor)>,
        exits: Arc<AtomicUsize>,
        hooked: bool,
    }

    impl LinearModel {
        fn new(coefficients: Vec<Vec<f32>>) -> LinearModel {
            let mut registry = ParameterRegistry::new();
            let mut cells = vec![];
            let mut outputs = vec![];
            for i in 0..coefficients.len() {
                let cell = ParameterCell::new(0.0);
                registry
                    .register_cell(&format!("mode.{i}.constant"), cell.clone())
                    .expect("unique paths");
                cells.push(cell);
                outputs.push(SharedSource::new(&format!("output {i}")));
            }
            LinearModel {
                registry,
                cells,
                outputs,
                coefficients,
                runs: vec![],
                saves: 0,
                fail_save: false,
                fail_run: false,
                exit_after: None,
                exits: Arc::new(AtomicUsize::new(0)),
                hooked: true,
            }
        }

        fn target(&self, i: usize, explore_size: f32, target: f32) -> CalibrationTarget {
            CalibrationTarget::new(
                TargetSettings::new(&format!("target {i}"), &format!("mode.{i}.constant"), explore_size, -10.0, 10.0),
                TargetKind::Scalar(ScalarTarget::new(
                    Box::new(ConstantSource::new("observed", target)),
                    Box::new(self.outputs[i].clone()),
                )),
            )
        }
    }

    impl ModelSystem for LinearModel {
        fn name(&self) -> &str {
            "linear model"
        }

        fn parameters(&self) -> &ParameterRegistry {
            &self.registry
        }

        fn run(&mut self) -> Result<(), ModelSystemError> {
            if self.fail_run {
                return Err(ModelSystemError::RunFailed {
                    name: String::from("linear model"),
                    message: String::from("solver diverged"),
                });
            }
            let values = self
                .cells
                .iter()
                .map(|c| c.run_value("cell"))
                .collect::<Result<Vec<_>, _>>()?;
            for (output, row) in self.outputs.iter().zip(self.coefficients.iter()) {
                let value = 10.0 + row.iter().zip(values.iter()).map(|(c, v)| c * v).sum::<f32>();
                output.publish(value).expect("not poisoned");
            }
            self.runs.push(values);
            if let Some((after, monitor)) = &self.exit_after {
                if self.runs.len() == *after {
                    monitor.request_exit();
                }
            }
            Ok(())
        }

        fn save_configuration(&mut self) -> Result<(), ModelSystemError> {
            if self.fail_save {
                return Err(ModelSystemError::SaveFailed {
                    name: String::from("linear model"),
                    message: String::from("read-only project"),
                });
            }
            self.saves += 1;
            Ok(())
        }

        fn exit_hook(&self) -> Option<ExitHook> {
            if !self.hooked {
                return None;
            }
            let exits = self.exits.clone();
            Some(Arc::new(move || {
                exits.fetch_add(1, Ordering::SeqCst);
                true
            }))
        }
    }

    struct CountingModule {
        starts: Arc<AtomicUsize>,
    }

    impl SelfContainedModule for CountingModule {
        fn name(&self) -> &str {
            "counting module"
        }

        fn start(&mut self) -> Result<(), ModelSystemError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn independent_model() -> LinearModel {
        LinearModel::new(vec![vec![2.0, 0.0], vec![0.0, 4.0]])
    }

    fn host(model: LinearModel, config: CalibrationHostConfig) -> CalibrationHost<LinearModel> {
        let targets = vec![model.target(0, 1.0, 20.0), model.target(1, 0.5, 30.0)];
        CalibrationHost::new(config, model, targets)
    }

    fn one_iteration(report: Option<std::path::PathBuf>) -> CalibrationHostConfig {
        CalibrationHostConfig {
            max_iterations: 1,
            calibration_report: report,
            ..Default::default()
        }
    }

    #[test]
    fn test_two_targets_one_iteration() {
        let dir = tempfile::tempdir().expect("temp dir");
        let report = dir.path().join("calibration.csv");
        let mut host = host(independent_model(), one_iteration(Some(report.clone())));
        let summary = host.run().expect("calibration succeeds");

        assert_eq!(summary.jobs_per_iteration, vec![3]);
        assert_eq!(
            host.model().runs,
            vec![vec![1.0, 0.0], vec![0.0, 0.5], vec![0.0, 0.0]],
            "two isolated perturbations then the base run"
        );
        // target 0: derivative 2, step 5; target 1: derivative 4, step 5
        let values = summary.final_position.iter().map(|p| p.current).collect_vec();
        assert_eq!(values, vec![5.0, 5.0]);
        assert_eq!(summary.final_position[0].null_hypothesis, 0.0);
        assert_eq!(host.model().saves, 1);
        assert_eq!(host.model().cells[1].saved_value("cell").unwrap(), 5.0);

        let contents = std::fs::read_to_string(&report).expect("report written");
        let lines = contents.lines().collect_vec();
        assert_eq!(lines.len(), 2, "header and one row");
        assert_eq!(
            lines[0],
            "Iteration,TargetDistance-target 0,TargetDistance-target 1,Value-target 0,Value-target 1"
        );
        assert_eq!(lines[1], "0,-10,-20,5,5");
        assert_eq!(host.monitor().state(), HostState::Complete);
        assert!((host.progress() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_calibration_converges_on_linear_model() {
        let config = CalibrationHostConfig {
            max_iterations: 3,
            ..Default::default()
        };
        let mut host = host(independent_model(), config);
        let summary = host.run().unwrap();
        assert_eq!(summary.iterations_completed, 3);
        assert_eq!(summary.jobs_per_iteration, vec![3, 3, 3]);
        let values = summary.final_position.iter().map(|p| p.current).collect_vec();
        assert_eq!(values, vec![5.0, 5.0], "already at the targets after one step");
        assert!(host.targets().iter().all(|t| t.report_target_distance() == Some(0.0)));
    }

    #[test]
    fn test_just_compute_never_moves_the_position() {
        let dir = tempfile::tempdir().expect("temp dir");
        let report = dir.path().join("calibration.csv");
        let config = CalibrationHostConfig {
            max_iterations: 3,
            just_compute_against_targets: true,
            calibration_report: Some(report.clone()),
            ..Default::default()
        };
        let mut host = host(independent_model(), config);
        let summary = host.run().unwrap();
        assert_eq!(summary.jobs_per_iteration, vec![1, 1, 1]);
        assert!(summary.final_position.iter().all(|p| p.current == 0.0));
        assert_eq!(host.model().runs.len(), 3);
        assert_eq!(host.model().saves, 0);
        let contents = std::fs::read_to_string(&report).unwrap();
        assert_eq!(contents.lines().count(), 4);
        assert!(contents.lines().skip(1).all(|l| l.ends_with(",-10,-20,0,0")));
    }

    #[test]
    fn test_combined_derivative_is_an_approximation() {
        // output 0 also depends on parameter 1. perturbing both at once folds
        // that cross term into target 0's derivative: (13.5 - 10) / 1 = 3.5
        // instead of 2. this is the documented behavior of combined mode.
        let model = LinearModel::new(vec![vec![2.0, 3.0], vec![0.0, 4.0]]);
        let config = CalibrationHostConfig {
            max_iterations: 1,
            compute_each_derivative_separately: false,
            ..Default::default()
        };
        let mut host = host(model, config);
        let summary = host.run().unwrap();
        assert_eq!(summary.jobs_per_iteration, vec![2]);
        assert_eq!(host.model().runs, vec![vec![1.0, 0.5], vec![0.0, 0.0]]);
        let approximate = summary.final_position[0].current;
        assert!((approximate - 10.0 / 3.5).abs() < 1e-5, "found {approximate}");
        assert_eq!(summary.final_position[1].current, 5.0);
    }

    #[test]
    fn test_flat_gradient_leaves_parameter_and_continues() {
        let model = LinearModel::new(vec![vec![0.0, 0.0], vec![0.0, 4.0]]);
        let sink = Arc::new(MemorySink::new());
        let config = CalibrationHostConfig {
            max_iterations: 2,
            ..Default::default()
        };
        let mut host = host(model, config).with_diagnostics(sink.clone());
        let summary = host.run().expect("flat gradients are not fatal");
        assert_eq!(summary.final_position[0].current, 0.0);
        assert_eq!(summary.final_position[1].current, 5.0);
        assert_eq!(sink.count("target 0", DiagnosticKind::FlatGradient), 2);
    }

    #[test]
    fn test_save_failure_is_fatal() {
        let dir = tempfile::tempdir().expect("temp dir");
        let report = dir.path().join("calibration.csv");
        let mut model = independent_model();
        model.fail_save = true;
        let config = CalibrationHostConfig {
            max_iterations: 3,
            calibration_report: Some(report.clone()),
            ..Default::default()
        };
        let mut host = host(model, config);
        assert!(matches!(host.run(), Err(CalibrationError::SaveFailed { .. })));
        assert_eq!(host.model().runs.len(), 3, "stopped within the first iteration");
        assert!(!report.exists(), "no row for an unsaved iteration");
    }

    #[test]
    fn test_model_failure_is_fatal() {
        let mut model = independent_model();
        model.fail_run = true;
        let mut host = host(model, one_iteration(None));
        match host.run() {
            Err(CalibrationError::ModelRunFailed { iteration, job, .. }) => {
                assert_eq!((iteration, job), (0, 0))
            }
            other => panic!("expected a model failure, found {other:?}"),
        }
    }

    #[test]
    fn test_exit_request_stops_between_iterations() {
        let pre = Arc::new(AtomicUsize::new(0));
        let post = Arc::new(AtomicUsize::new(0));
        let model = independent_model();
        let config = CalibrationHostConfig {
            max_iterations: 5,
            ..Default::default()
        };
        let mut host = host(model, config)
            .with_pre_run(Box::new(CountingModule { starts: pre.clone() }))
            .with_post_run(Box::new(CountingModule { starts: post.clone() }));
        // request exit from inside the first job; the iteration still completes
        host.model.exit_after = Some((1, host.monitor()));
        let summary = host.run().unwrap();
        assert_eq!(summary.iterations_completed, 1);
        assert!(summary.exit_requested);
        assert_eq!(host.model().runs.len(), 3);
        assert_eq!(pre.load(Ordering::SeqCst), 1);
        assert_eq!(post.load(Ordering::SeqCst), 0, "post-run skipped after exit");
        assert_eq!(
            host.model().exits.load(Ordering::SeqCst),
            1,
            "request made during a run reaches the model"
        );
    }

    #[test]
    fn test_exit_request_without_hook_asks_the_model_directly() {
        let mut model = independent_model();
        model.hooked = false;
        let exits = model.exits.clone();
        let host = host(model, one_iteration(None));
        assert_eq!(host.monitor().request_exit(), None);
        assert!(host.exit_request(), "default model accepts the request");
        assert_eq!(exits.load(Ordering::SeqCst), 0);
        assert!(host.monitor().exit_requested());
    }

    #[test]
    fn test_progress_bar_run_completes() {
        let config = CalibrationHostConfig {
            max_iterations: 2,
            show_progress: true,
            ..Default::default()
        };
        let mut host = host(independent_model(), config);
        let summary = host.run().expect("progress bar does not affect the run");
        assert_eq!(summary.jobs_per_iteration, vec![3, 3]);
        assert_eq!(host.model().runs.len(), 6);
    }

    #[test]
    fn test_exit_before_run_skips_everything() {
        let pre = Arc::new(AtomicUsize::new(0));
        let mut host = host(independent_model(), one_iteration(None))
            .with_pre_run(Box::new(CountingModule { starts: pre.clone() }));
        assert!(host.exit_request());
        assert_eq!(host.model().exits.load(Ordering::SeqCst), 1);
        let summary = host.run().unwrap();
        assert_eq!(summary.iterations_completed, 0);
        assert_eq!(pre.load(Ordering::SeqCst), 0);
        assert!(host.model().runs.is_empty());
    }

    #[test]
    fn test_validation_fails_before_any_run() {
        let model = independent_model();
        let targets = vec![
            model.target(0, 1.0, 20.0),
            CalibrationTarget::new(
                TargetSettings::new("missing", "mode.9.constant", 1.0, -1.0, 1.0),
                TargetKind::Scalar(ScalarTarget::new(
                    Box::new(ConstantSource::new("observed", 1.0)),
                    Box::new(ConstantSource::new("output", 1.0)),
                )),
            ),
        ];
        let mut host = CalibrationHost::new(one_iteration(None), model, targets);
        match host.run() {
            Err(CalibrationError::Validation { module, .. }) => assert_eq!(module, "missing"),
            other => panic!("expected a validation error, found {other:?}"),
        }
        assert!(host.model().runs.is_empty());

        let config = CalibrationHostConfig {
            max_iterations: 0,
            ..Default::default()
        };
        let mut host = host_with(config);
        assert!(matches!(host.run(), Err(CalibrationError::Validation { .. })));
        assert!(host.model().runs.is_empty());
    }

    fn host_with(config: CalibrationHostConfig) -> CalibrationHost<LinearModel> {
        host(independent_model(), config)
    }
}
