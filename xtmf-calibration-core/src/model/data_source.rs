use super::DataSourceError;
use std::sync::{Arc, RwLock};

/// a readable model output or calibration input.
///
/// callers pair `load_data` with `unload_data`; `give_data` is only valid in
/// between.
pub trait DataSource<T>: Send {
    fn name(&self) -> &str;

    fn load_data(&mut self) -> Result<(), DataSourceError>;

    fn give_data(&self) -> Result<T, DataSourceError>;

    fn unload_data(&mut self);

    fn loaded(&self) -> bool;
}

/// a fixed value, always available.
#[derive(Clone, Debug)]
pub struct ConstantSource<T> {
    name: String,
    value: T,
}

impl<T> ConstantSource<T> {
    pub fn new(name: &str, value: T) -> ConstantSource<T> {
        ConstantSource {
            name: name.to_string(),
            value,
        }
    }
}

impl<T: Clone + Send> DataSource<T> for ConstantSource<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_data(&mut self) -> Result<(), DataSourceError> {
        Ok(())
    }

    fn give_data(&self) -> Result<T, DataSourceError> {
        Ok(self.value.clone())
    }

    fn unload_data(&mut self) {}

    fn loaded(&self) -> bool {
        true
    }
}

/// a value published by an in-process model system. clones share the same
/// slot: the model keeps one clone and publishes into it after each run, a
/// target keeps another and snapshots the slot on `load_data`.
#[derive(Clone, Debug)]
pub struct SharedSource<T> {
    name: String,
    slot: Arc<RwLock<Option<T>>>,
    snapshot: Option<T>,
}

impl<T: Clone> SharedSource<T> {
    pub fn new(name: &str) -> SharedSource<T> {
        SharedSource {
            name: name.to_string(),
            slot: Arc::new(RwLock::new(None)),
            snapshot: None,
        }
    }

    /// replaces the value seen by the next `load_data` on any clone.
    pub fn publish(&self, value: T) -> Result<(), DataSourceError> {
        let mut slot = self
            .slot
            .write()
            .map_err(|_| DataSourceError::Poisoned(self.name.clone()))?;
        *slot = Some(value);
        Ok(())
    }
}

impl<T: Clone + Send + Sync> DataSource<T> for SharedSource<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_data(&mut self) -> Result<(), DataSourceError> {
        let slot = self
            .slot
            .read()
            .map_err(|_| DataSourceError::Poisoned(self.name.clone()))?;
        match slot.as_ref() {
            Some(value) => {
                self.snapshot = Some(value.clone());
                Ok(())
            }
            None => Err(DataSourceError::NoData(self.name.clone())),
        }
    }

    fn give_data(&self) -> Result<T, DataSourceError> {
        self.snapshot
            .clone()
            .ok_or_else(|| DataSourceError::NotLoaded(self.name.clone()))
    }

    fn unload_data(&mut self) {
        self.snapshot = None;
    }

    fn loaded(&self) -> bool {
        self.snapshot.is_some()
    }
}
