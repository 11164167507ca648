// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch orchestration
//!
//! Generates one 3MF file per key, in parallel across keys. Output
//! file names carry the key's project index, so bundle order is stable
//! regardless of which worker finishes first. One key's failure does
//! not abort the rest; failures are collected and reported together.
//! Cancellation is the only whole-run abort, and a cancelled run emits
//! no partial output.

use crate::builder::{build_keycap, resolve};
use crate::cache::BaseMeshCache;
use crate::error::{Error, Result};
use crate::resources::Resources;
use crate::types::{KeyDef, Project, SymbolContent};
use keyforge_geometry::Scene;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cooperative cancellation flag, checked at stage boundaries.
///
/// The geometry primitives themselves are not interruptible; a set
/// flag takes effect at the next check point.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Emitted after each key finishes (success or failure)
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub current: usize,
    pub total: usize,
    pub key_id: String,
}

pub type ProgressFn = dyn Fn(ProgressEvent) + Send + Sync;

/// One key that failed, with the error that names what to fix
#[derive(Debug)]
pub struct BatchFailure {
    pub key_name: String,
    pub error: Error,
}

/// Everything a finished batch produced
#[derive(Debug, Default)]
pub struct BatchOutput {
    /// `(file name, 3MF bytes)` in key project order
    pub files: Vec<(String, Vec<u8>)>,
    pub failures: Vec<BatchFailure>,
}

/// Make a key name safe for file systems.
///
/// Whitespace runs become a single underscore, path-hostile and
/// control characters become underscores, the result is capped at 120
/// characters and an empty result falls back to "key".
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::new();
    let mut in_whitespace = false;

    for c in name.trim().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => out.push('_'),
            c if (c as u32) < 0x20 => out.push('_'),
            c => out.push(c),
        }
    }

    let out: String = out.chars().take(120).collect();
    if out.is_empty() {
        "key".to_string()
    } else {
        out
    }
}

fn generate_one(
    project: &Project,
    key: &KeyDef,
    index: usize,
    resources: &Resources,
    cache: &BaseMeshCache,
    cancel: &CancelToken,
) -> Result<(String, Vec<u8>)> {
    cancel.check()?;

    let (template, model) = resolve(project, key)?;
    let base = cache.get(model, resources)?;
    let scene = build_keycap(template, key, model, &base, &resources.outlines, cancel)?;

    cancel.check()?;
    let bytes = keyforge_export::write_package(&scene).map_err(|e| Error::Export {
        name: key.name.clone(),
        source: e,
    })?;

    let file_name = format!("{}. {}.3mf", index + 1, sanitize_file_name(&key.name));
    debug!(file = %file_name, bytes = bytes.len(), "generated keycap");
    Ok((file_name, bytes))
}

/// Generate every key in the project.
///
/// Keys run in parallel; each failure is isolated to its key and
/// collected in the output. Returns `Err(Cancelled)` without partial
/// output when the token fires mid-run.
pub fn generate_batch(
    project: &Project,
    resources: &Resources,
    on_progress: Option<&ProgressFn>,
    cancel: &CancelToken,
) -> Result<BatchOutput> {
    let total = project.keys.len();
    info!(keys = total, "starting batch generation");

    let cache = BaseMeshCache::new();
    let completed = AtomicUsize::new(0);

    let results: Vec<std::result::Result<(String, Vec<u8>), BatchFailure>> = project
        .keys
        .par_iter()
        .enumerate()
        .map(|(index, key)| {
            let result = generate_one(project, key, index, resources, &cache, cancel);

            let current = completed.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(progress) = on_progress {
                if !cancel.is_cancelled() {
                    progress(ProgressEvent {
                        current,
                        total,
                        key_id: key.id.clone(),
                    });
                }
            }

            result.map_err(|error| BatchFailure {
                key_name: key.name.clone(),
                error,
            })
        })
        .collect();

    cancel.check()?;

    let mut output = BatchOutput::default();
    for result in results {
        match result {
            Ok(file) => output.files.push(file),
            Err(failure) => {
                if failure.error.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                warn!(key = %failure.key_name, error = %failure.error, "keycap failed");
                output.failures.push(failure);
            }
        }
    }

    info!(
        files = output.files.len(),
        failures = output.failures.len(),
        "batch generation finished"
    );
    Ok(output)
}

/// Bundle a finished batch into one downloadable zip archive
pub fn zip_batch(output: &BatchOutput) -> Result<Vec<u8>> {
    Ok(keyforge_export::zip_files(&output.files)?)
}

/// Build the scene for one key configuration without exporting it,
/// for interactive preview. Content comes from the caller rather than
/// a stored KeyDef.
pub fn generate_preview(
    project: &Project,
    template_id: &str,
    content_by_symbol_id: FxHashMap<String, SymbolContent>,
    resources: &Resources,
    cancel: &CancelToken,
) -> Result<Scene> {
    let key = KeyDef {
        id: "__preview__".to_string(),
        name: "Preview".to_string(),
        template_id: template_id.to_string(),
        content_by_symbol_id,
    };

    let (template, model) = resolve(project, &key)?;
    let cache = BaseMeshCache::new();
    let base = cache.get(model, resources)?;
    build_keycap(template, &key, model, &base, &resources.outlines, cancel)
}
