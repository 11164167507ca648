// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Keyforge generation pipeline
//!
//! Turns an authored project (models, templates, keys) into printable
//! keycap scenes: normalized base meshes, placed legend prisms, CSG
//! carving and batch 3MF output with progress and cancellation.

pub mod batch;
pub mod builder;
pub mod cache;
pub mod error;
pub mod resources;
pub mod types;

pub use batch::{
    generate_batch, generate_preview, sanitize_file_name, zip_batch, BatchFailure, BatchOutput,
    CancelToken, ProgressEvent, ProgressFn,
};
pub use builder::{build_keycap, place_symbol, resolve, BODY_MESH_NAME};
pub use cache::BaseMeshCache;
pub use error::{Error, Result};
pub use resources::{MeshTransport, OutlineProvider, OutlineRegistry, Resources, StlByteCache};
pub use types::{
    parse_hex_color, KeyDef, KeycapModel, ModelSource, Project, SymbolContent, SymbolDef,
    Template, KEYCAP_BODY_COLOR, U_MM,
};
