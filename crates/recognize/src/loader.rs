//! Asynchronous backend loading
//!
//! Backend construction can involve slow local resource access and
//! numeric setup, so it runs on a blocking worker task and never stalls
//! stroke capture. The worker builds the whole registry and ships it to
//! the owner thread through a oneshot channel; ownership transfer is the
//! completion signal, so no registration can race with classification.
//!
//! Policy for a bundle that fails to construct: skip it, log it, record
//! it in the load report, and keep loading the rest. A single bad bundle
//! never takes down the whole feature.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{info, warn};

use crate::classifier::Classifier;
use crate::error::LoadError;
use crate::registry::Registry;

/// Opaque description of one backend to construct
///
/// The core does not interpret these fields; the factory does. They
/// mirror what a bundled-model backend needs: where its model and label
/// list live, the input grid side length, the tensor endpoint names,
/// and whether the model weights are quantized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendBundle {
    /// Display name for reports
    pub name: String,
    /// Resource name of the model data
    pub model_resource: String,
    /// Resource name of the label list (one label per line)
    pub labels_resource: String,
    /// Expected input side length (the grid is input_side x input_side)
    pub input_side: u32,
    /// Input tensor name inside the model
    pub input_tensor: String,
    /// Output tensor name inside the model
    pub output_tensor: String,
    /// Whether the model weights are quantized
    pub quantized: bool,
}

/// Named byte blobs backing backend construction, keyed by resource name
///
/// Stands in for the bundled asset store of the host application.
#[derive(Debug, Default, Clone)]
pub struct Resources {
    entries: HashMap<String, Vec<u8>>,
}

impl Resources {
    /// Create an empty resource set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named resource
    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(name.into(), bytes);
    }

    /// Look up a resource, failing with a loadable error if absent
    pub fn get(&self, name: &str) -> Result<&[u8], LoadError> {
        self.entries
            .get(name)
            .map(|b| b.as_slice())
            .ok_or_else(|| LoadError::MissingResource(name.to_string()))
    }
}

/// Constructs classifier backends from bundle descriptions
pub trait BackendFactory: Send + Sync {
    fn construct(&self, bundle: &BackendBundle) -> Result<Arc<dyn Classifier>, LoadError>;
}

/// A bundle the loader gave up on, with the reason
#[derive(Debug)]
pub struct SkippedBackend {
    pub name: String,
    pub error: LoadError,
}

/// Everything the loader produced: the usable registry plus the bundles
/// it had to skip
#[derive(Default)]
pub struct LoadReport {
    pub registry: Registry,
    pub skipped: Vec<SkippedBackend>,
}

/// Snapshot of the loader's progress as seen from the owner thread
pub enum LoadStatus {
    /// The worker has not finished yet
    NotReady,
    /// Loading finished; the report is handed over exactly once
    Ready(LoadReport),
    /// The worker died without reporting
    Failed,
}

/// Owner-side handle to an in-flight load
///
/// Loading runs once per session; after the report is taken the handle
/// is spent.
pub struct LoaderHandle {
    rx: oneshot::Receiver<LoadReport>,
}

impl LoaderHandle {
    /// Non-blocking poll, suitable for a classify trigger that must
    /// answer "not ready" instead of stalling
    pub fn try_take(&mut self) -> LoadStatus {
        match self.rx.try_recv() {
            Ok(report) => LoadStatus::Ready(report),
            Err(TryRecvError::Empty) => LoadStatus::NotReady,
            Err(TryRecvError::Closed) => LoadStatus::Failed,
        }
    }

    /// Await completion, consuming the handle
    pub async fn wait(self) -> Result<LoadReport, LoadError> {
        self.rx.await.map_err(|_| LoadError::LoaderDied)
    }
}

/// Construct every bundle on a blocking worker task
///
/// Must be called from within a tokio runtime. Returns immediately; the
/// handle resolves once every bundle has been constructed or skipped.
pub fn spawn_load<F>(bundles: Vec<BackendBundle>, factory: F) -> LoaderHandle
where
    F: BackendFactory + 'static,
{
    let (tx, rx) = oneshot::channel();

    tokio::task::spawn_blocking(move || {
        let mut report = LoadReport::default();
        for bundle in &bundles {
            match factory.construct(bundle) {
                Ok(backend) => {
                    info!("loaded backend {:?}", bundle.name);
                    report.registry.register(backend);
                }
                Err(error) => {
                    warn!("skipping backend {:?}: {error}", bundle.name);
                    report.skipped.push(SkippedBackend {
                        name: bundle.name.clone(),
                        error,
                    });
                }
            }
        }
        // Receiver may have been dropped; nothing left to do then
        let _ = tx.send(report);
    });

    LoaderHandle { rx }
}
