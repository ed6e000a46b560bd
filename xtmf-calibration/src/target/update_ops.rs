//! parameter update rules shared by the target kinds. every rule degrades to
//! returning the current value, with a diagnostic, when the measurements carry
//! no usable signal.
use super::TargetSettings;
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};

/// finite difference update used by the scalar and matrix targets.
///
/// # Arguments
///
/// * `settings` - the target's explore size, damping and bounds
/// * `current` - the parameter value at the base run
/// * `base` - measurement of the base run
/// * `step` - measurement of the perturbed run
/// * `target` - the value the measurement should reach
/// * `sink` - receives flat gradient and non-finite diagnostics
///
/// # Returns
///
/// the next parameter value, clamped into the target's bounds.
pub fn finite_difference_update(
    settings: &TargetSettings,
    current: f32,
    base: f32,
    step: f32,
    target: f32,
    sink: &dyn DiagnosticSink,
) -> f32 {
    let derivative = (step - base) / settings.explore_size;
    if !derivative.is_finite() {
        sink.emit(Diagnostic::new(
            &settings.name,
            DiagnosticKind::NonFiniteUpdate,
            format!("derivative is {derivative} (base {base}, step {step}), keeping {current}"),
        ));
        return current;
    }
    if derivative.abs() < settings.minimum_absolute_derivative {
        sink.emit(Diagnostic::new(
            &settings.name,
            DiagnosticKind::FlatGradient,
            format!(
                "derivative {derivative} is below {}, keeping {current}",
                settings.minimum_absolute_derivative
            ),
        ));
        return current;
    }
    apply_step(settings, current, (target - base) / derivative, sink)
}

/// odds ratio update used by the probability targets.
///
/// for a parameter in utility space the step is `ln(odds(target) / odds(base))`.
/// when `parameter_is_ratio` is set the parameter scales the probability
/// directly and the next value is `current * target / base`.
pub fn odds_ratio_update(
    settings: &TargetSettings,
    current: f32,
    base_probability: f32,
    target_probability: f32,
    parameter_is_ratio: bool,
    sink: &dyn DiagnosticSink,
) -> f32 {
    let step = if parameter_is_ratio {
        current * (target_probability / base_probability) - current
    } else {
        (odds(target_probability) / odds(base_probability)).ln()
    };
    if !step.is_finite() {
        sink.emit(Diagnostic::new(
            &settings.name,
            DiagnosticKind::NonFiniteUpdate,
            format!(
                "update from probability {base_probability} toward {target_probability} is {step}, keeping {current}"
            ),
        ));
        return current;
    }
    apply_step(settings, current, step, sink)
}

fn odds(probability: f32) -> f32 {
    probability / (1.0 - probability)
}

/// damps, limits and bounds a corrective step.
///
/// steps below the explore size are taken whole, so every downward step is.
/// steps at or above it are scaled by the learning rate. the scaled step is
/// limited to `±maximum_change` and the result clamped to `[minimum_value, maximum_value]`.
pub fn apply_step(settings: &TargetSettings, current: f32, step: f32, sink: &dyn DiagnosticSink) -> f32 {
    let damping = if step < settings.explore_size {
        1.0
    } else {
        settings.learning_rate
    };
    let delta = step * damping;
    if !delta.is_finite() {
        sink.emit(Diagnostic::new(
            &settings.name,
            DiagnosticKind::NonFiniteUpdate,
            format!("step is {delta}, keeping {current}"),
        ));
        return current;
    }
    let limited = delta.max(-settings.maximum_change).min(settings.maximum_change);
    let next = (current + limited)
        .max(settings.minimum_value)
        .min(settings.maximum_value);
    if next != current + delta {
        sink.emit(Diagnostic::new(
            &settings.name,
            DiagnosticKind::Clamped,
            format!("step {delta} from {current} limited to {next}"),
        ));
    }
    next
}
