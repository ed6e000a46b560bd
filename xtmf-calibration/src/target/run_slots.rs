use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// which slot a measurement taken after a job is stored into.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    /// the unmodified position.
    Base,
    /// a position offset by the explore size.
    Step,
}

impl Display for RunKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunKind::Base => write!(f, "base"),
            RunKind::Step => write!(f, "step"),
        }
    }
}

/// the most recent base and step measurements of one target. storing
/// overwrites, so nothing accumulates across iterations.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunSlots<T> {
    base: Option<T>,
    step: Option<T>,
}

impl<T: Copy> RunSlots<T> {
    pub fn new() -> RunSlots<T> {
        RunSlots {
            base: None,
            step: None,
        }
    }

    pub fn store(&mut self, kind: RunKind, value: T) {
        match kind {
            RunKind::Base => self.base = Some(value),
            RunKind::Step => self.step = Some(value),
        }
    }

    pub fn get(&self, kind: RunKind) -> Option<T> {
        match kind {
            RunKind::Base => self.base,
            RunKind::Step => self.step,
        }
    }

    pub fn base(&self) -> Option<T> {
        self.base
    }

    pub fn step(&self) -> Option<T> {
        self.step
    }
}
