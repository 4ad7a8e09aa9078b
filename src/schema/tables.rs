//! Table schema definitions for the catalog database

use super::types::*;

/// Bumped whenever a table definition changes
pub const SCHEMA_VERSION: i32 = 1;

pub static MAPS: TableSchema = TableSchema {
    name: "maps",
    columns: &[
        Column::id(),
        Column::required("name", ColumnType::Text).unique(),
    ],
    indexes: &[],
};

// Column names are camelCase to match the JSON interchange format.
pub static NADES: TableSchema = TableSchema {
    name: "nades",
    columns: &[
        Column::id(),
        Column::required("title", ColumnType::Text),
        Column::required("map", ColumnType::Text),
        Column::required("side", ColumnType::Text),
        Column::required("startPosition", ColumnType::Text),
        Column::required("targetPosition", ColumnType::Text),
        Column::required("nadeType", ColumnType::Text),
        Column::required("description", ColumnType::Text),
        Column::required("tags", ColumnType::Text),
        Column::new("localVideoPath", ColumnType::Text),
        Column::new("videoUrl", ColumnType::Text),
        Column::new("thumbnailUrl", ColumnType::Text),
        Column::required("createdAt", ColumnType::Text),
        Column::required("updatedAt", ColumnType::Text),
    ],
    indexes: &[Index::on(&["map"]), Index::on(&["nadeType"])],
};

pub static ALL_TABLES: &[&TableSchema] = &[&MAPS, &NADES];
