// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Project data model
//!
//! KeycapModel, Template, SymbolDef and KeyDef records as authored by
//! the configuration layer. All types serialize to camelCase JSON.

use crate::error::{Error, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// One keyboard unit in millimeters (standard keycap pitch)
pub const U_MM: f64 = 19.05;

/// Body color for carved keycap shanks (slate-500)
pub const KEYCAP_BODY_COLOR: u32 = 0x64748b;

/// Where a model's STL bytes come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelSource {
    /// User-uploaded buffer, looked up by model id
    Upload,
    /// Server-hosted file, lazily fetched and cached by URL
    Server { url: String },
}

/// The physical keycap shank template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeycapModel {
    pub id: String,
    pub name: String,
    pub width_u: f64,
    pub height_u: f64,
    pub source: ModelSource,
    /// Per-axis rotation corrections in degrees, applied X then Y
    /// then Z during normalization
    #[serde(default)]
    pub rotation_x: f64,
    #[serde(default)]
    pub rotation_y: f64,
    #[serde(default)]
    pub rotation_z: f64,
    /// Depth of legend carving in millimeters
    pub extrusion_depth_mm: f64,
}

/// One legend slot on a template.
///
/// Offsets are millimeters from the keycap center, y toward the top
/// edge of the keycap face. Outline producers with a y-down document
/// convention must be reconciled before placement (see
/// `OutlineSet::flip_y`), otherwise legends mirror vertically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolDef {
    pub id: String,
    pub slot_name: String,
    pub x_mm: f64,
    pub y_mm: f64,
    pub font_size_mm: f64,
    /// Hex color, "#rrggbb"
    pub color: String,
    /// Rotation about the vertical axis in degrees
    #[serde(default)]
    pub rotation_deg: f64,
    /// Font or icon family resolved through the outline registry
    pub family: String,
}

/// A named layout referencing one model and owning its symbol slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub keycap_model_id: String,
    pub symbols: Vec<SymbolDef>,
}

/// Content rendered into one symbol slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SymbolContent {
    Text {
        value: String,
    },
    #[serde(rename_all = "camelCase")]
    Icon {
        icon_name: String,
    },
}

impl SymbolContent {
    /// Empty or whitespace-only content means "no legend for this slot"
    pub fn is_blank(&self) -> bool {
        self.display_name().trim().is_empty()
    }

    /// The text value or icon identifier, used to name legend meshes
    pub fn display_name(&self) -> &str {
        match self {
            SymbolContent::Text { value } => value,
            SymbolContent::Icon { icon_name } => icon_name,
        }
    }
}

/// One physical key to produce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDef {
    pub id: String,
    pub name: String,
    pub template_id: String,
    pub content_by_symbol_id: FxHashMap<String, SymbolContent>,
}

/// A complete authored project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub keycap_models: Vec<KeycapModel>,
    pub templates: Vec<Template>,
    pub keys: Vec<KeyDef>,
}

impl Project {
    pub fn template(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn model(&self, id: &str) -> Option<&KeycapModel> {
        self.keycap_models.iter().find(|m| m.id == id)
    }
}

/// Parse a "#rrggbb" hex color into a packed 0xRRGGBB value.
///
/// The leading "#" is optional; shorthand forms are not supported.
pub fn parse_hex_color(color: &str) -> Result<u32> {
    let digits = color.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidColor(color.to_string()));
    }
    u32::from_str_radix(digits, 16).map_err(|_| Error::InvalidColor(color.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff0000").unwrap(), 0xff0000);
        assert_eq!(parse_hex_color("64748b").unwrap(), 0x64748b);
        assert_eq!(parse_hex_color("#FFFFFF").unwrap(), 0xffffff);
    }

    #[test]
    fn test_parse_hex_color_rejects_garbage() {
        assert!(parse_hex_color("").is_err());
        assert!(parse_hex_color("#fff").is_err());
        assert!(parse_hex_color("#gggggg").is_err());
        assert!(parse_hex_color("red").is_err());
    }

    #[test]
    fn test_content_blank() {
        let text = SymbolContent::Text {
            value: "  ".to_string(),
        };
        assert!(text.is_blank());

        let icon = SymbolContent::Icon {
            icon_name: "arrow-up".to_string(),
        };
        assert!(!icon.is_blank());
        assert_eq!(icon.display_name(), "arrow-up");
    }

    #[test]
    fn test_model_json_round_trip() {
        let model = KeycapModel {
            id: "m1".to_string(),
            name: "1u".to_string(),
            width_u: 1.0,
            height_u: 1.0,
            source: ModelSource::Server {
                url: "https://example.com/1u.stl".to_string(),
            },
            rotation_x: -90.0,
            rotation_y: 0.0,
            rotation_z: 0.0,
            extrusion_depth_mm: 0.8,
        };

        let json = serde_json::to_string(&model).unwrap();
        assert!(json.contains("\"widthU\":1.0"));
        assert!(json.contains("\"extrusionDepthMm\":0.8"));
        assert!(json.contains("\"kind\":\"server\""));

        let back: KeycapModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn test_rotation_defaults_when_absent() {
        let json = r#"{
            "id": "m1", "name": "1u", "widthU": 1.0, "heightU": 1.0,
            "source": { "kind": "upload" }, "extrusionDepthMm": 0.8
        }"#;
        let model: KeycapModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.rotation_x, 0.0);
        assert_eq!(model.rotation_z, 0.0);
    }
}
