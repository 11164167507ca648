// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalized base mesh cache
//!
//! Normalization (parse, rotate, center, align) is deterministic and
//! expensive relative to a single boolean op, so one batch run shares
//! normalized bases across keys. The key includes the rotation
//! correction: the same model id with a different rotation is a
//! different base.

use crate::error::{Error, Result};
use crate::resources::Resources;
use crate::types::KeycapModel;
use keyforge_geometry::{normalize_base_mesh, Mesh};
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Rotation components are keyed by bit pattern so -0.0 and 0.0 stay
/// distinct inputs without a float Eq impl
type BaseKey = (String, u64, u64, u64);

pub struct BaseMeshCache {
    entries: Mutex<FxHashMap<BaseKey, Arc<Mesh>>>,
}

impl BaseMeshCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(FxHashMap::default()),
        }
    }

    fn key(model: &KeycapModel) -> BaseKey {
        (
            model.id.clone(),
            model.rotation_x.to_bits(),
            model.rotation_y.to_bits(),
            model.rotation_z.to_bits(),
        )
    }

    /// Normalized base mesh for a model, computed on first use.
    ///
    /// The normalization runs outside the map lock; two workers racing
    /// on the same cold key may both compute, but the result is
    /// deterministic so either insert is correct.
    pub fn get(&self, model: &KeycapModel, resources: &Resources) -> Result<Arc<Mesh>> {
        let key = Self::key(model);
        {
            let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(mesh) = entries.get(&key) {
                return Ok(Arc::clone(mesh));
            }
        }

        debug!(model = %model.name, "normalizing base mesh");
        let bytes = resources.stl_bytes(model)?;
        let mesh = normalize_base_mesh(
            &bytes,
            (model.rotation_x, model.rotation_y, model.rotation_z),
        )
        .map_err(|e| Error::geometry(&model.name, e))?;

        let mesh = Arc::new(mesh);
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(entries.entry(key).or_insert(mesh)))
    }
}

impl Default for BaseMeshCache {
    fn default() -> Self {
        Self::new()
    }
}
