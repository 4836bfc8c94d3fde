use scrawl_canvas::IntensityVector;

/// What a single backend answered for one intensity vector
///
/// `label: None` means the backend could not produce an answer; that is
/// a valid outcome, not an error. Confidence is only meaningful when a
/// label is present.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: Option<String>,
    pub confidence: f32,
}

impl Classification {
    /// A labeled answer with the given confidence
    pub fn labeled(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: Some(label.into()),
            confidence,
        }
    }

    /// "Could not classify"
    pub fn none() -> Self {
        Self {
            label: None,
            confidence: 0.0,
        }
    }
}

/// One backend's answer tagged with the backend name, as emitted by the
/// orchestrator
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub backend_name: String,
    pub label: Option<String>,
    pub confidence: f32,
}

/// The classifier capability
///
/// Implementations receive a validated length-784 vector normalized to
/// [0.0, 1.0] and must not mutate it or panic on it. A backend unable
/// to classify returns [`Classification::none`].
pub trait Classifier: Send + Sync {
    /// Stable, non-empty backend name used in reports
    fn name(&self) -> &str;

    /// Classify one intensity vector
    fn recognize(&self, input: &IntensityVector) -> Classification;
}
