//! Template-matching backend
//!
//! The simplest real backend: one 28x28 intensity template per label,
//! matched by cosine similarity. The model resource is a JSON document
//! with the templates and an optional confidence threshold; the label
//! list resource is plain text, one label per line, in template order.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use scrawl_canvas::IntensityVector;
use scrawl_config::GRID_AREA;

use crate::classifier::{Classification, Classifier};
use crate::error::LoadError;
use crate::loader::{BackendBundle, BackendFactory, Resources};

const DEFAULT_THRESHOLD: f32 = 0.6;

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

/// On-disk shape of the model resource
#[derive(Debug, Deserialize)]
struct TemplateModelFile {
    templates: Vec<Vec<f32>>,
    #[serde(default = "default_threshold")]
    threshold: f32,
}

/// Nearest-template classifier over per-label intensity templates
pub struct TemplateClassifier {
    name: String,
    labels: Vec<String>,
    /// Unit-L2-normalized templates, one per label
    templates: Vec<Vec<f32>>,
    /// Cosine similarity below which the backend answers None
    threshold: f32,
}

impl TemplateClassifier {
    /// Construct from a bundle description and its backing resources
    pub fn from_resources(
        bundle: &BackendBundle,
        resources: &Resources,
    ) -> Result<Self, LoadError> {
        let expected_len = (bundle.input_side as usize) * (bundle.input_side as usize);
        if expected_len != GRID_AREA {
            return Err(LoadError::MalformedModel {
                resource: bundle.model_resource.clone(),
                reason: format!(
                    "input side {} does not match the {GRID_AREA}-cell grid",
                    bundle.input_side
                ),
            });
        }

        let model_bytes = resources.get(&bundle.model_resource)?;
        let model: TemplateModelFile = serde_json::from_slice(model_bytes)?;

        let labels = parse_labels(&bundle.labels_resource, resources.get(&bundle.labels_resource)?)?;
        if labels.len() != model.templates.len() {
            return Err(LoadError::LabelMismatch {
                resource: bundle.labels_resource.clone(),
                reason: format!(
                    "{} labels for {} templates",
                    labels.len(),
                    model.templates.len()
                ),
            });
        }

        let mut templates = Vec::with_capacity(model.templates.len());
        for (index, mut template) in model.templates.into_iter().enumerate() {
            if template.len() != expected_len {
                return Err(LoadError::MalformedModel {
                    resource: bundle.model_resource.clone(),
                    reason: format!(
                        "template {index} has {} values, expected {expected_len}",
                        template.len()
                    ),
                });
            }
            if template.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(LoadError::MalformedModel {
                    resource: bundle.model_resource.clone(),
                    reason: format!("template {index} contains invalid values"),
                });
            }

            if bundle.quantized {
                // Snap to the 8-bit grid the quantized model was stored at
                for value in &mut template {
                    *value = (*value * 255.0).round() / 255.0;
                }
            }

            let norm = l2_norm(&template);
            if norm == 0.0 {
                return Err(LoadError::MalformedModel {
                    resource: bundle.model_resource.clone(),
                    reason: format!("template {index} is all background"),
                });
            }
            for value in &mut template {
                *value /= norm;
            }
            templates.push(template);
        }

        debug!(
            "template backend {:?}: {} labels, threshold {}",
            bundle.name,
            labels.len(),
            model.threshold
        );

        Ok(Self {
            name: bundle.name.clone(),
            labels,
            templates,
            threshold: model.threshold,
        })
    }
}

impl Classifier for TemplateClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn recognize(&self, input: &IntensityVector) -> Classification {
        let values = input.as_slice();
        let input_norm = l2_norm(values);
        if input_norm == 0.0 {
            // Blank drawing: nothing to match against
            return Classification::none();
        }

        let mut best: Option<(usize, f32)> = None;
        for (index, template) in self.templates.iter().enumerate() {
            let dot: f32 = values.iter().zip(template).map(|(a, b)| a * b).sum();
            let score = dot / input_norm;
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((index, score));
            }
        }

        match best {
            Some((index, score)) if score >= self.threshold => {
                Classification::labeled(&self.labels[index], score.clamp(0.0, 1.0))
            }
            _ => Classification::none(),
        }
    }
}

/// Factory constructing template backends against a resource set
pub struct TemplateFactory {
    resources: Resources,
}

impl TemplateFactory {
    pub fn new(resources: Resources) -> Self {
        Self { resources }
    }
}

impl BackendFactory for TemplateFactory {
    fn construct(&self, bundle: &BackendBundle) -> Result<Arc<dyn Classifier>, LoadError> {
        Ok(Arc::new(TemplateClassifier::from_resources(
            bundle,
            &self.resources,
        )?))
    }
}

fn parse_labels(resource: &str, bytes: &[u8]) -> Result<Vec<String>, LoadError> {
    let text = std::str::from_utf8(bytes).map_err(|_| LoadError::LabelMismatch {
        resource: resource.to_string(),
        reason: "label list is not valid UTF-8".to_string(),
    })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn l2_norm(values: &[f32]) -> f32 {
    values.iter().map(|v| v * v).sum::<f32>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(model: &str, labels: &str) -> BackendBundle {
        BackendBundle {
            name: "Template".to_string(),
            model_resource: model.to_string(),
            labels_resource: labels.to_string(),
            input_side: 28,
            input_tensor: "input".to_string(),
            output_tensor: "output".to_string(),
            quantized: false,
        }
    }

    /// A vector lighting up one grid column at full intensity
    fn column_pattern(col: usize) -> Vec<f32> {
        let mut values = vec![0.0; GRID_AREA];
        for row in 0..28 {
            values[row * 28 + col] = 1.0;
        }
        values
    }

    fn demo_resources() -> Resources {
        let model = serde_json::json!({
            "templates": [column_pattern(5), column_pattern(20)],
            "threshold": 0.5,
        });
        let mut resources = Resources::new();
        resources.insert("model.json", serde_json::to_vec(&model).unwrap());
        resources.insert("labels.txt", b"left\nright\n".to_vec());
        resources
    }

    fn demo_classifier() -> TemplateClassifier {
        TemplateClassifier::from_resources(&bundle("model.json", "labels.txt"), &demo_resources())
            .unwrap()
    }

    #[test]
    fn test_matches_nearest_template() {
        let classifier = demo_classifier();
        let input = IntensityVector::new(column_pattern(5)).unwrap();

        let answer = classifier.recognize(&input);
        assert_eq!(answer.label.as_deref(), Some("left"));
        assert!(answer.confidence > 0.99);
    }

    #[test]
    fn test_low_similarity_answers_none() {
        let classifier = demo_classifier();
        // A row pattern overlaps each column template in one cell only
        let mut values = vec![0.0; GRID_AREA];
        for col in 0..28 {
            values[14 * 28 + col] = 1.0;
        }
        let input = IntensityVector::new(values).unwrap();

        let answer = classifier.recognize(&input);
        assert!(answer.label.is_none());
    }

    #[test]
    fn test_blank_input_answers_none() {
        let classifier = demo_classifier();
        let input = IntensityVector::new(vec![0.0; GRID_AREA]).unwrap();
        assert!(classifier.recognize(&input).label.is_none());
    }

    #[test]
    fn test_label_count_mismatch_rejected() {
        let mut resources = demo_resources();
        resources.insert("labels.txt", b"only-one\n".to_vec());

        let result =
            TemplateClassifier::from_resources(&bundle("model.json", "labels.txt"), &resources);
        assert!(matches!(result, Err(LoadError::LabelMismatch { .. })));
    }

    #[test]
    fn test_incompatible_input_side_rejected() {
        let mut descriptor = bundle("model.json", "labels.txt");
        descriptor.input_side = 32;

        let result = TemplateClassifier::from_resources(&descriptor, &demo_resources());
        assert!(matches!(result, Err(LoadError::MalformedModel { .. })));
    }

    #[test]
    fn test_missing_model_resource_rejected() {
        let result =
            TemplateClassifier::from_resources(&bundle("absent.json", "labels.txt"), &demo_resources());
        assert!(matches!(result, Err(LoadError::MissingResource(_))));
    }

    #[test]
    fn test_factory_constructs_backend() {
        let factory = TemplateFactory::new(demo_resources());
        let backend = factory.construct(&bundle("model.json", "labels.txt")).unwrap();
        assert_eq!(backend.name(), "Template");
    }
}
