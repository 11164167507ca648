// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Keyforge export formats
//!
//! Serializes assembled keycap scenes into 3MF packages and bundles
//! batches of packages into a single downloadable zip.

pub mod bundle;
pub mod error;
pub mod threemf;

pub use bundle::zip_files;
pub use error::{Error, Result};
pub use threemf::{write_package, MIME_3MF};
