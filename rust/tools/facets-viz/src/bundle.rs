//! Bundle assembly: row-record JSON, the base64 statistics blob, the dive
//! settings record and the rendered page.

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use prost::Message;
use serde_json::json;

use facets_data_stats::defs::FeatureStatisticsList;
use facets_table::Table;

/// Filename of the rendered page artifact.
pub const INDEX_HTML: &str = "index.html";

/// Fixed filename of the atlas artifact, referenced from the dive settings.
pub const ATLAS_IMAGE_FILENAME: &str = "atlas.png";

const TEMPLATE_HTML: &str = include_str!("template.html");

/// Client-side dive settings. `atlas` carries the sprite dimensions when an
/// image column produced an atlas.
#[derive(Debug, Clone, Default)]
pub struct DiveSettings {
    pub vertical_facet: String,
    pub horizontal_facet: String,
    pub color_by: String,
    pub image_field_name: String,
    pub vertical_position: String,
    pub horizontal_position: String,
    pub atlas: Option<(u32, u32)>,
}

impl DiveSettings {
    /// Serializes the settings record. `positionMode` is `"scatter"` iff
    /// either position field is set; atlas keys are empty strings when no
    /// atlas exists.
    pub fn to_json(&self) -> serde_json::Value {
        let position_mode =
            if !self.vertical_position.is_empty() || !self.horizontal_position.is_empty() {
                "scatter"
            } else {
                "stacked"
            };
        json!({
            "verticalFacet": self.vertical_facet,
            "horizontalFacet": self.horizontal_facet,
            "colorBy": self.color_by,
            "imageFieldName": self.image_field_name,
            "positionMode": position_mode,
            "verticalPosition": self.vertical_position,
            "horizontalPosition": self.horizontal_position,
            "atlasUrl": match self.atlas {
                Some(_) => json!(ATLAS_IMAGE_FILENAME),
                None => json!(""),
            },
            "spriteImageWidth": match self.atlas {
                Some((width, _)) => json!(width),
                None => json!(""),
            },
            "spriteImageHeight": match self.atlas {
                Some((_, height)) => json!(height),
                None => json!(""),
            },
        })
    }
}

/// Serializes the table as the embedded record array.
pub fn records_json(table: &Table) -> Result<String> {
    serde_json::to_string(&table.to_records()).context("failed to serialize row records")
}

/// Encodes the statistics summary for embedding.
pub fn statistics_base64(list: &FeatureStatisticsList) -> String {
    BASE64.encode(list.encode_to_vec())
}

/// Substitutes the rendering context into the built-in page template.
pub fn render_page(
    title: &str,
    announcement: &str,
    jsonstr: &str,
    protostr: &str,
    dive_settings: &serde_json::Value,
) -> String {
    TEMPLATE_HTML
        .replace("{title}", title)
        .replace("{announcement}", announcement)
        .replace("{jsonstr}", jsonstr)
        .replace("{protostr}", protostr)
        .replace("{dive_settings}", &dive_settings.to_string())
}
