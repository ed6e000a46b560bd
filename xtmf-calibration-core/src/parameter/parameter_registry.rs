use super::{ParameterBinding, ParameterCell, ParameterError, ParameterHandle};
use itertools::Itertools;
use std::{collections::HashMap, sync::Arc};

/// string-keyed lookup from dot-delimited parameter paths to live bindings.
/// built once when a model system is constructed.
#[derive(Clone, Default)]
pub struct ParameterRegistry {
    bindings: HashMap<String, ParameterBinding>,
}

impl ParameterRegistry {
    pub fn new() -> ParameterRegistry {
        ParameterRegistry::default()
    }

    pub fn register(&mut self, path: &str, binding: ParameterBinding) -> Result<(), ParameterError> {
        let key = normalize_path(path);
        if self.bindings.contains_key(&key) {
            return Err(ParameterError::DuplicatePath(key));
        }
        log::debug!("registered parameter '{key}'");
        self.bindings.insert(key, binding);
        Ok(())
    }

    /// registers a [`ParameterCell`] under `path`.
    pub fn register_cell(&mut self, path: &str, cell: Arc<ParameterCell>) -> Result<(), ParameterError> {
        let binding = ParameterBinding::from_cell(&normalize_path(path), cell);
        self.register(path, binding)
    }

    pub fn find_parameter(&self, path: &str) -> Result<ParameterHandle, ParameterError> {
        let key = normalize_path(path);
        match self.bindings.get(&key) {
            Some(binding) => Ok(ParameterHandle::new(&key, binding.clone())),
            None => Err(ParameterError::UnresolvedPath(path.to_string())),
        }
    }

    pub fn paths(&self) -> Vec<&String> {
        self.bindings.keys().sorted().collect_vec()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// trims whitespace around each path segment, so " Mode Choice . Constant "
/// and "Mode Choice.Constant" resolve to the same parameter.
fn normalize_path(path: &str) -> String {
    path.split('.').map(str::trim).join(".")
}
