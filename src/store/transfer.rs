//! Whole-catalog JSON export and import

use log::info;
use rusqlite::named_params;

use super::{nade_columns, nade_from_row, CatalogStore};
use crate::error::Result;
use crate::models::CatalogExport;

impl CatalogStore {
    /// Snapshot every map name and every nade, ids and timestamps included
    pub fn export(&self) -> Result<CatalogExport> {
        let maps = self.list_maps()?.into_iter().map(|m| m.name).collect();

        let sql = format!("SELECT {} FROM nades ORDER BY id", nade_columns());
        let mut stmt = self.conn.prepare(&sql)?;
        let nades = stmt
            .query_map([], nade_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let export = CatalogExport { maps, nades };
        info!(
            "Exported {} maps and {} nades",
            export.maps.len(),
            export.nades.len()
        );
        Ok(export)
    }

    /// Apply an export in one transaction.
    ///
    /// Maps are inserted if absent. Nades keep their supplied id and timestamps;
    /// an id that already exists fails the whole import with a constraint violation.
    pub fn import(&mut self, payload: &CatalogExport) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut insert_map = tx.prepare("INSERT OR IGNORE INTO maps (name) VALUES (?1)")?;
            for name in &payload.maps {
                insert_map.execute([name])?;
            }

            let mut insert_nade = tx.prepare(&format!(
                "INSERT INTO nades ({}) VALUES (
                    :id, :title, :map, :side, :startPosition, :targetPosition, :nadeType,
                    :description, :tags, :localVideoPath, :videoUrl, :thumbnailUrl,
                    :createdAt, :updatedAt
                 )",
                nade_columns()
            ))?;
            for nade in &payload.nades {
                insert_nade.execute(named_params! {
                    ":id": nade.id,
                    ":title": nade.title,
                    ":map": nade.map,
                    ":side": nade.side,
                    ":startPosition": nade.start_position,
                    ":targetPosition": nade.target_position,
                    ":nadeType": nade.nade_type,
                    ":description": nade.description,
                    ":tags": nade.tags,
                    ":localVideoPath": nade.local_video_path,
                    ":videoUrl": nade.video_url,
                    ":thumbnailUrl": nade.thumbnail_url,
                    ":createdAt": nade.created_at,
                    ":updatedAt": nade.updated_at,
                })?;
            }
        }
        tx.commit()?;

        info!(
            "Imported {} maps and {} nades",
            payload.maps.len(),
            payload.nades.len()
        );
        Ok(())
    }

    /// Parse an export document and import it
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let payload: CatalogExport = serde_json::from_str(json)?;
        self.import(&payload)
    }

    /// Export rendered as pretty JSON
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export()?)?)
    }
}
