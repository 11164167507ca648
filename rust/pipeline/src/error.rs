// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline error taxonomy
//!
//! Every terminal error carries the offending key, model or family
//! name so a failing batch points at the configuration to fix.
//! Cancellation is its own variant: it is not a failure and must never
//! be surfaced as one.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing STL for model \"{0}\"; upload it in the models step")]
    MissingUpload(String),

    #[error("Failed to fetch STL for model \"{name}\" ({url}): {reason}")]
    FetchFailed {
        name: String,
        url: String,
        reason: String,
    },

    #[error("No mesh transport configured for server-hosted model \"{0}\"")]
    NoTransport(String),

    #[error("Unknown outline family \"{0}\"")]
    UnknownFamily(String),

    #[error("Outline producer failed for family \"{family}\": {reason}")]
    Outline { family: String, reason: String },

    #[error("Unknown template \"{template_id}\" for key \"{key_name}\"")]
    UnknownTemplate {
        template_id: String,
        key_name: String,
    },

    #[error("Unknown keycap model \"{model_id}\" for template \"{template_name}\"")]
    UnknownModel {
        model_id: String,
        template_name: String,
    },

    #[error("Invalid color \"{0}\"")]
    InvalidColor(String),

    #[error("Geometry failure for \"{name}\": {source}")]
    Geometry {
        name: String,
        #[source]
        source: keyforge_geometry::Error,
    },

    #[error("Export failure for \"{name}\": {source}")]
    Export {
        name: String,
        #[source]
        source: keyforge_export::Error,
    },

    #[error("Bundling failed: {0}")]
    Bundle(#[from] keyforge_export::Error),

    #[error("Generation cancelled")]
    Cancelled,
}

impl Error {
    /// Wrap a geometry error with the key/model name it occurred for
    pub(crate) fn geometry(name: &str, source: keyforge_geometry::Error) -> Self {
        Error::Geometry {
            name: name.to_string(),
            source,
        }
    }

    /// Cancellation is reported separately from real failures
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
