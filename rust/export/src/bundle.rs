// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch bundling
//!
//! Packs a set of already-serialized files into one zip archive in the
//! caller's order. The batch layer names files with a numeric prefix,
//! so preserving input order keeps the bundle deterministic.

use crate::error::Result;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Pack `(name, bytes)` entries into a single zip archive
pub fn zip_files(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    debug!(count = files.len(), "bundling batch archive");

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    // The entries are already deflate-compressed 3MF packages, so the
    // outer container stores them as-is
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for (name, bytes) in files {
        writer.start_file(name.as_str(), options)?;
        writer.write_all(bytes)?;
    }

    Ok(writer.finish()?.into_inner())
}
