//! Classification orchestration and report rendering
//!
//! Runs one intensity vector through every registered backend, in
//! registration order, and renders the aggregated answers as a plain
//! textual report. Every classify call produces a fresh report; reports
//! are never accumulated across calls.

use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use scrawl_canvas::IntensityVector;

use crate::classifier::ClassificationResult;
use crate::registry::Registry;

/// Classify one vector against every registered backend
///
/// Returns exactly one result per backend, in registration order. A
/// backend answering `None` does not short-circuit the rest. A backend
/// that panics breaks its contract; the panic is contained here and the
/// backend is reported as unable to classify.
pub fn classify(registry: &Registry, vector: &IntensityVector) -> Vec<ClassificationResult> {
    registry
        .iter()
        .map(|backend| {
            let name = backend.name().to_string();
            match panic::catch_unwind(AssertUnwindSafe(|| backend.recognize(vector))) {
                Ok(answer) => ClassificationResult {
                    backend_name: name,
                    label: answer.label,
                    confidence: answer.confidence,
                },
                Err(_) => {
                    warn!("backend {name:?} panicked on a well-formed input, isolating");
                    ClassificationResult {
                        backend_name: name,
                        label: None,
                        confidence: 0.0,
                    }
                }
            }
        })
        .collect()
}

/// Render results as one line per backend
///
/// `"{name}: {label}, {confidence}"` for a labeled answer,
/// `"{name}: ?"` otherwise. An empty result set renders as an empty
/// string.
pub fn format_report(results: &[ClassificationResult]) -> String {
    results
        .iter()
        .map(|result| match &result.label {
            Some(label) => format!(
                "{}: {}, {:.3}",
                result.backend_name, label, result.confidence
            ),
            None => format!("{}: ?", result.backend_name),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
