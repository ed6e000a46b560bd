use super::TargetError;
use xtmf_calibration_core::model::DataSource;

/// loads, reads and unloads a data source, tagging failures with the target name.
pub fn read_source<T>(target: &str, source: &mut dyn DataSource<T>) -> Result<T, TargetError> {
    let to_error = |e| TargetError::DataSource {
        name: target.to_string(),
        source: e,
    };
    if !source.loaded() {
        source.load_data().map_err(to_error)?;
    }
    let value = source.give_data().map_err(to_error);
    source.unload_data();
    value
}

/// the fraction `selection / total`. a zero total yields a non-finite value,
/// which the odds ratio update treats as a no-op.
pub fn probability(selection: f32, total: f32) -> f32 {
    selection / total
}
