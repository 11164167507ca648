// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! External resources: outline producers and mesh byte sources
//!
//! Outline producers turn text or icon content into 2D outline sets.
//! Mesh bytes come from user uploads or a server transport; server
//! fetches are cached by URL with single-flight de-duplication so
//! concurrent first requests for the same model fetch once.

use crate::error::{Error, Result};
use crate::types::{KeycapModel, ModelSource, SymbolContent};
use keyforge_geometry::OutlineSet;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Produces closed 2D outlines, in millimeters, for symbol content.
///
/// An empty set is a valid zero-geometry result (unknown icon,
/// unsupported glyph); errors are for real failures only.
pub trait OutlineProvider: Send + Sync {
    fn outline(&self, content: &SymbolContent, size_mm: f64) -> Result<OutlineSet>;
}

/// Registry of outline providers keyed by font/icon family name.
///
/// Registration order is meaningful: when fallback is enabled, an
/// unknown family resolves to the first registered provider instead of
/// erroring. Re-registering a family replaces its provider in place.
pub struct OutlineRegistry {
    providers: Vec<(String, Arc<dyn OutlineProvider>)>,
    fallback_to_first: bool,
}

impl OutlineRegistry {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            fallback_to_first: false,
        }
    }

    /// Resolve unknown families to the first registered provider
    pub fn with_default_fallback() -> Self {
        Self {
            providers: Vec::new(),
            fallback_to_first: true,
        }
    }

    pub fn register(&mut self, family: impl Into<String>, provider: Arc<dyn OutlineProvider>) {
        let family = family.into();
        if let Some(slot) = self.providers.iter_mut().find(|(name, _)| *name == family) {
            slot.1 = provider;
        } else {
            self.providers.push((family, provider));
        }
    }

    pub fn resolve(&self, family: &str) -> Result<&Arc<dyn OutlineProvider>> {
        if let Some((_, provider)) = self.providers.iter().find(|(name, _)| name == family) {
            return Ok(provider);
        }
        if self.fallback_to_first {
            if let Some((first, provider)) = self.providers.first() {
                warn!(family, fallback = %first, "unknown outline family, using fallback");
                return Ok(provider);
            }
        }
        Err(Error::UnknownFamily(family.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for OutlineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetches bytes for server-hosted models. The transport owns retry
/// policy; the pipeline never retries.
pub trait MeshTransport: Send + Sync {
    fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, String>;
}

type CacheSlot = Arc<Mutex<Option<Arc<[u8]>>>>;

/// URL-keyed byte cache with single-flight fetches.
///
/// The outer map hands out one slot per URL; the slot's own lock is
/// held across the fetch, so a concurrent second request for the same
/// URL blocks until the first fetch lands and then reads the cached
/// bytes.
pub struct StlByteCache {
    slots: Mutex<FxHashMap<String, CacheSlot>>,
}

impl StlByteCache {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn get_or_fetch<F>(&self, url: &str, fetch: F) -> Result<Arc<[u8]>>
    where
        F: FnOnce() -> Result<Vec<u8>>,
    {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.entry(url.to_string()).or_default().clone()
        };

        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bytes) = guard.as_ref() {
            return Ok(Arc::clone(bytes));
        }

        debug!(url, "fetching STL bytes");
        let bytes: Arc<[u8]> = fetch()?.into();
        *guard = Some(Arc::clone(&bytes));
        Ok(bytes)
    }
}

impl Default for StlByteCache {
    fn default() -> Self {
        Self::new()
    }
}

/// All external inputs one generation run needs: uploaded buffers, the
/// optional server transport and the outline registry.
pub struct Resources {
    uploads: FxHashMap<String, Arc<[u8]>>,
    transport: Option<Arc<dyn MeshTransport>>,
    pub outlines: OutlineRegistry,
    stl_cache: StlByteCache,
}

impl Resources {
    pub fn new(outlines: OutlineRegistry) -> Self {
        Self {
            uploads: FxHashMap::default(),
            transport: None,
            outlines,
            stl_cache: StlByteCache::new(),
        }
    }

    pub fn add_upload(&mut self, model_id: impl Into<String>, bytes: Vec<u8>) {
        self.uploads.insert(model_id.into(), bytes.into());
    }

    pub fn set_transport(&mut self, transport: Arc<dyn MeshTransport>) {
        self.transport = Some(transport);
    }

    /// Raw STL bytes for a model, from the upload map or the transport
    pub fn stl_bytes(&self, model: &KeycapModel) -> Result<Arc<[u8]>> {
        match &model.source {
            ModelSource::Upload => self
                .uploads
                .get(&model.id)
                .cloned()
                .ok_or_else(|| Error::MissingUpload(model.name.clone())),
            ModelSource::Server { url } => {
                let transport = self
                    .transport
                    .as_ref()
                    .ok_or_else(|| Error::NoTransport(model.name.clone()))?;
                self.stl_cache.get_or_fetch(url, || {
                    transport.fetch(url).map_err(|reason| Error::FetchFailed {
                        name: model.name.clone(),
                        url: url.clone(),
                        reason,
                    })
                })
            }
        }
    }
}
