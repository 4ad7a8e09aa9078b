//! Catalog records as they cross the store and façade boundaries.
//!
//! Field names serialize in camelCase, which is also the column naming of the
//! `nades` table and the JSON interchange format.

use serde::{Deserialize, Serialize};

/// A game map, identified by its unique name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Map {
    pub name: String,
}

/// A stored lineup entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nade {
    pub id: i64,
    pub title: String,
    pub map: String,
    pub side: String,
    pub start_position: String,
    pub target_position: String,
    pub nade_type: String,
    pub description: String,
    pub tags: String,
    #[serde(default)]
    pub local_video_path: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Editable fields of a nade; id and timestamps are assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NadeInput {
    pub title: String,
    pub map: String,
    pub side: String,
    pub start_position: String,
    pub target_position: String,
    pub nade_type: String,
    pub description: String,
    pub tags: String,
    #[serde(default)]
    pub local_video_path: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl Nade {
    /// The editable part of this record, e.g. to pre-fill an edit
    pub fn to_input(&self) -> NadeInput {
        NadeInput {
            title: self.title.clone(),
            map: self.map.clone(),
            side: self.side.clone(),
            start_position: self.start_position.clone(),
            target_position: self.target_position.clone(),
            nade_type: self.nade_type.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
            local_video_path: self.local_video_path.clone(),
            video_url: self.video_url.clone(),
            thumbnail_url: self.thumbnail_url.clone(),
        }
    }

    /// Tags split on commas, trimmed, empties dropped
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Whole-catalog snapshot used by export and import
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogExport {
    pub maps: Vec<String>,
    pub nades: Vec<Nade>,
}
