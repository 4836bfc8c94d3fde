//! Bundled classifier backends

mod template;

pub use template::{TemplateClassifier, TemplateFactory};
