//! Sketch session - the single owner of the capture/classify pipeline
//!
//! One session object ties the draw model, pointer tracker, rasterizer
//! and classifier registry together. Everything is owned here and passed
//! by reference; there is no ambient global state. The session lives on
//! one logical thread; only the backend loader runs elsewhere, and its
//! result enters the session exactly once through the loader handle.

use std::path::Path;

use tracing::{info, warn};

use scrawl_canvas::export;
use scrawl_canvas::{DrawModel, PointerEvent, PointerTracker, RasterError, Rasterizer};
use scrawl_config::CanvasConfig;
use scrawl_recognize::{LoadStatus, LoaderHandle, Registry, classify, format_report};

/// Answer to a classify trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionReply {
    /// Backends are still loading; try again later
    NotReady,
    /// The loader died without producing a registry; reported once,
    /// after which the session behaves as loaded-with-zero-backends
    LoadFailed,
    /// The formatted report for the current drawing
    Report(String),
}

/// Owned pipeline state for one drawing session
pub struct SketchSession {
    model: DrawModel,
    tracker: PointerTracker,
    rasterizer: Rasterizer,
    loader: Option<LoaderHandle>,
    registry: Option<Registry>,
}

impl SketchSession {
    /// Create a session whose registry arrives through the given loader
    pub fn new(config: CanvasConfig, loader: LoaderHandle) -> Self {
        Self {
            model: DrawModel::new(),
            tracker: PointerTracker::new(),
            rasterizer: Rasterizer::new(config),
            loader: Some(loader),
            registry: None,
        }
    }

    /// Create a session with an already-populated registry
    pub fn with_registry(config: CanvasConfig, registry: Registry) -> Self {
        Self {
            model: DrawModel::new(),
            tracker: PointerTracker::new(),
            rasterizer: Rasterizer::new(config),
            loader: None,
            registry: Some(registry),
        }
    }

    /// Feed one pointer event into the stroke pipeline
    pub fn handle_pointer(&mut self, event: &PointerEvent) {
        self.tracker.handle(&mut self.model, event);
    }

    /// Reset the drawing surface
    pub fn clear(&mut self) {
        self.model.clear();
    }

    /// The draw model, for read access
    pub fn model(&self) -> &DrawModel {
        &self.model
    }

    /// Run the full rasterize → downsample → classify cycle
    ///
    /// Returns `NotReady` while backends are still loading; a blank
    /// drawing still classifies - backends decide what a blank input
    /// means.
    pub fn classify(&mut self) -> Result<SessionReply, RasterError> {
        if self.registry.is_none() {
            if let Some(reply) = self.poll_loader() {
                return Ok(reply);
            }
        }
        let Some(registry) = self.registry.as_ref() else {
            return Ok(SessionReply::NotReady);
        };

        let vector = self.rasterizer.downsample(&self.model)?;
        let results = classify(registry, &vector);
        Ok(SessionReply::Report(format_report(&results)))
    }

    /// Check the loader, installing its registry when it is done
    ///
    /// Returns `Some` when the classify trigger must answer early
    /// (still loading, or the one-time load failure), `None` once a
    /// registry is in place.
    fn poll_loader(&mut self) -> Option<SessionReply> {
        let Some(loader) = self.loader.as_mut() else {
            // No loader was ever attached: zero backends
            self.registry = Some(Registry::new());
            return None;
        };

        match loader.try_take() {
            LoadStatus::NotReady => Some(SessionReply::NotReady),
            LoadStatus::Ready(report) => {
                for skipped in &report.skipped {
                    warn!("backend {:?} was skipped: {}", skipped.name, skipped.error);
                }
                info!("registry ready with {} backend(s)", report.registry.len());
                self.registry = Some(report.registry);
                self.loader = None;
                None
            }
            LoadStatus::Failed => {
                warn!("backend loader failed; continuing with zero backends");
                self.registry = Some(Registry::new());
                self.loader = None;
                Some(SessionReply::LoadFailed)
            }
        }
    }

    /// Save the working raster and the 28x28 grid as grayscale PNGs
    pub fn save_debug_images(&mut self, dir: &Path) -> anyhow::Result<()> {
        let raster = self.rasterizer.rasterize(&self.model);
        export::raster_to_image(raster).save(dir.join("raster.png"))?;

        let vector = self.rasterizer.downsample(&self.model)?;
        export::vector_to_image(&vector).save(dir.join("grid.png"))?;
        Ok(())
    }
}
