use serde::Serialize;
use std::{
    fmt::{Debug, Display},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, RwLock,
    },
};
use xtmf_calibration_core::model::ExitHook;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HostState {
    Initializing,
    RunningPreRun,
    RunningIteration(usize),
    RunningPostRun,
    Complete,
}

impl Display for HostState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostState::Initializing => write!(f, "initializing"),
            HostState::RunningPreRun => write!(f, "running pre-run modules"),
            HostState::RunningIteration(i) => write!(f, "running iteration {}", i + 1),
            HostState::RunningPostRun => write!(f, "running post-run modules"),
            HostState::Complete => write!(f, "complete"),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Status {
    state: HostState,
    progress: f32,
}

/// shared view of a running host: its state, progress and exit flag. clones
/// observe the same host, so a monitor can be handed to another thread.
#[derive(Clone)]
pub struct HostMonitor {
    exit: Arc<AtomicBool>,
    status: Arc<RwLock<Status>>,
    exit_hook: Option<ExitHook>,
}

impl Default for HostMonitor {
    fn default() -> Self {
        HostMonitor::with_exit_hook(None)
    }
}

impl Debug for HostMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostMonitor")
            .field("exit", &self.exit)
            .field("status", &self.read())
            .field("exit_hook", &self.exit_hook.is_some())
            .finish()
    }
}

impl HostMonitor {
    /// a monitor that forwards exit requests to a model through `exit_hook`.
    pub fn with_exit_hook(exit_hook: Option<ExitHook>) -> HostMonitor {
        HostMonitor {
            exit: Arc::new(AtomicBool::new(false)),
            status: Arc::new(RwLock::new(Status {
                state: HostState::Initializing,
                progress: 0.0,
            })),
            exit_hook,
        }
    }

    /// asks the host to stop at the next iteration or module boundary and
    /// forwards the request through the exit hook.
    ///
    /// # Returns
    ///
    /// the model's answer, or `None` when no exit hook is registered.
    pub fn request_exit(&self) -> Option<bool> {
        self.exit.store(true, Ordering::SeqCst);
        self.exit_hook.as_ref().map(|hook| hook())
    }

    pub fn exit_requested(&self) -> bool {
        self.exit.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> HostState {
        self.read().state
    }

    /// fraction of all jobs completed, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        self.read().progress
    }

    pub fn status(&self) -> String {
        let status = self.read();
        format!("{} ({:.1}%)", status.state, status.progress * 100.0)
    }

    pub(super) fn set_state(&self, state: HostState) {
        log::debug!("calibration host {state}");
        self.write(|s| s.state = state);
    }

    /// progress within iteration `iteration` of `max_iterations`, `job` of `jobs`
    /// finished.
    pub(super) fn set_progress(&self, iteration: usize, max_iterations: usize, job: usize, jobs: usize) {
        let max = max_iterations.max(1) as f32;
        let progress = iteration as f32 / max + job as f32 / (max * jobs.max(1) as f32);
        self.write(|s| s.progress = progress.min(1.0));
    }

    fn read(&self) -> Status {
        match self.status.read() {
            Ok(status) => *status,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn write(&self, f: impl FnOnce(&mut Status)) {
        match self.status.write() {
            Ok(mut status) => f(&mut status),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}
