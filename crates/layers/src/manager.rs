//! Owner of the shared location source and the layers drawn from it.

use foundation::geojson::FeatureCollection;
use foundation::location::Location;
use surface::error::SurfaceError;
use surface::layer::{LayerId, LayerSpec, SourceId};
use surface::surface::RenderSurface;

use crate::features::locations_to_collection;
use crate::layer::{LayerRole, POINT_LAYER_ID, SOURCE_ID, band, layer_specs};

/// Result of [`LayerManager::update_data`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataUpdate {
    /// The surface now shows exactly this many features.
    Applied { features: usize },
    /// No source yet; the collection is held until registration.
    Buffered { features: usize },
    /// The surface rejected the write; the collection is held for a retry.
    Rejected(SurfaceError),
}

#[derive(Debug)]
pub struct LayerManager {
    source: SourceId,
    specs: Vec<LayerSpec>,
    registered: bool,
    pending: Option<FeatureCollection>,
    applied: FeatureCollection,
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerManager {
    /// Manager for the standard density/point/label stack.
    pub fn new() -> Self {
        let source = SourceId::new(SOURCE_ID);
        let specs = layer_specs(&source);
        Self::with_specs(source, specs)
    }

    pub fn with_specs(source: SourceId, specs: Vec<LayerSpec>) -> Self {
        Self {
            source,
            specs,
            registered: false,
            pending: None,
            applied: FeatureCollection::empty(),
        }
    }

    pub fn source_id(&self) -> &SourceId {
        &self.source
    }

    pub fn specs(&self) -> &[LayerSpec] {
        &self.specs
    }

    pub fn layer_id(&self, role: LayerRole) -> LayerId {
        LayerId::new(band(role).id)
    }

    /// Layer that receives hover and click listeners.
    pub fn point_layer(&self) -> LayerId {
        LayerId::new(POINT_LAYER_ID)
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Collection most recently written to the surface.
    pub fn applied(&self) -> &FeatureCollection {
        &self.applied
    }

    /// Adds the source, seeded with any buffered data, then every layer.
    ///
    /// Registering twice is a no-op. A failure part way removes what was added
    /// so the call can be retried.
    pub fn register_layers<S>(&mut self, surface: &mut S) -> Result<(), SurfaceError>
    where
        S: RenderSurface + ?Sized,
    {
        if self.registered {
            tracing::warn!(source = %self.source, "layers already registered");
            return Ok(());
        }

        let initial = self.pending.clone().unwrap_or_default();
        surface.add_source(&self.source, &initial)?;

        for (i, spec) in self.specs.iter().enumerate() {
            if let Err(err) = surface.add_layer(spec) {
                tracing::error!(layer = %spec.id, %err, "layer registration failed");
                for added in self.specs[..i].iter().rev() {
                    let _ = surface.remove_layer(&added.id);
                }
                let _ = surface.remove_source(&self.source);
                return Err(err);
            }
        }

        self.registered = true;
        self.pending = None;
        self.applied = initial;
        tracing::info!(
            source = %self.source,
            layers = self.specs.len(),
            features = self.applied.len(),
            "location layers registered"
        );
        Ok(())
    }

    /// Replaces the source's data with `locations` in a single write.
    ///
    /// Before registration (or without a surface) the collection is buffered
    /// and applied by [`register_layers`](Self::register_layers). Never fails.
    pub fn update_data<S>(&mut self, surface: Option<&mut S>, locations: &[Location]) -> DataUpdate
    where
        S: RenderSurface + ?Sized,
    {
        let collection = locations_to_collection(locations);
        let features = collection.len();

        let Some(surface) = surface.filter(|s| self.registered && s.has_source(&self.source))
        else {
            tracing::debug!(features, "no source yet, buffering location data");
            self.pending = Some(collection);
            return DataUpdate::Buffered { features };
        };

        match surface.set_source_data(&self.source, &collection) {
            Ok(()) => {
                self.applied = collection;
                self.pending = None;
                DataUpdate::Applied { features }
            }
            Err(err) => {
                tracing::warn!(%err, "source update rejected, buffering");
                self.pending = Some(collection);
                DataUpdate::Rejected(err)
            }
        }
    }

    /// Removes layers top-down, then the source. Errors are logged and
    /// skipped; the manager always ends unregistered.
    pub fn teardown<S>(&mut self, surface: &mut S)
    where
        S: RenderSurface + ?Sized,
    {
        let was_registered = std::mem::replace(&mut self.registered, false);
        self.pending = None;
        self.applied = FeatureCollection::empty();
        if !was_registered {
            return;
        }

        for spec in self.specs.iter().rev() {
            if surface.has_layer(&spec.id) {
                if let Err(err) = surface.remove_layer(&spec.id) {
                    tracing::debug!(layer = %spec.id, %err, "layer removal failed");
                }
            }
        }
        if surface.has_source(&self.source) {
            if let Err(err) = surface.remove_source(&self.source) {
                tracing::debug!(source = %self.source, %err, "source removal failed");
            }
        }
    }
}
