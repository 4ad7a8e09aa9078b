//! Catalog Store: SQLite persistence for maps and nades.

mod filter;
mod schema_gen;
mod seed;
mod transfer;

pub use filter::{NadeFilters, SortOrder};
pub use schema_gen::{generate_create_table, generate_indexes};
pub use seed::{demo_nades, DEFAULT_MAPS};

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use log::{debug, warn};
use rusqlite::{named_params, Connection, OptionalExtension, Row};
use std::path::Path;

use crate::error::{CatalogError, Result};
use crate::models::{Map, Nade, NadeInput};
use crate::schema::{ALL_TABLES, NADES, SCHEMA_VERSION};

/// Column list in the order `nade_from_row` reads it
fn nade_columns() -> String {
    NADES.column_names().join(", ")
}

/// Single-writer handle over the catalog database
pub struct CatalogStore {
    conn: Connection,
}

impl CatalogStore {
    /// Open (creating if needed) the catalog at `path`, then create the schema and seed it
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        debug!("Opened catalog at {:?}", path);
        let mut store = Self { conn };
        store.init()?;
        Ok(store)
    }

    /// Create an in-memory catalog (useful for testing)
    pub fn open_in_memory() -> Result<Self> {
        let mut store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init()?;
        Ok(store)
    }

    /// Open a catalog that must already exist; never creates or seeds anything
    pub fn open_existing(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CatalogError::NotInitialized(format!(
                "no catalog at {}",
                path.display()
            )));
        }

        let conn = Connection::open(path)?;
        for table in ALL_TABLES {
            let present: bool = conn.query_row(
                "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
                [table.name],
                |row| row.get(0),
            )?;
            if !present {
                return Err(CatalogError::NotInitialized(format!(
                    "table '{}' missing in {}",
                    table.name,
                    path.display()
                )));
            }
        }

        Ok(Self { conn })
    }

    fn init(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        let tx = self.conn.transaction()?;
        for schema in ALL_TABLES {
            tx.execute(&generate_create_table(schema), [])?;
            for index_sql in generate_indexes(schema) {
                tx.execute(&index_sql, [])?;
            }
        }
        tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        seed::seed_if_empty(&tx)?;
        tx.commit()?;

        Ok(())
    }

    /// All maps, alphabetically
    pub fn list_maps(&self) -> Result<Vec<Map>> {
        let mut stmt = self.conn.prepare_cached("SELECT name FROM maps ORDER BY name")?;
        let maps = stmt
            .query_map([], |row| Ok(Map { name: row.get(0)? }))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(maps)
    }

    /// Insert a map and return the refreshed list; duplicate names are a constraint violation
    pub fn add_map(&self, name: &str) -> Result<Vec<Map>> {
        self.conn
            .execute("INSERT INTO maps (name) VALUES (?1)", [name])?;
        debug!("Added map {}", name);
        self.list_maps()
    }

    pub fn list_nades(&self, filters: &NadeFilters) -> Result<Vec<Nade>> {
        let (sql, params) = filters.to_query(&nade_columns());
        debug!("Listing nades: {} {:?}", sql, params);

        let mut stmt = self.conn.prepare(&sql)?;
        let nades = stmt
            .query_map(rusqlite::params_from_iter(params.iter()), nade_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(nades)
    }

    pub fn get_nade(&self, id: i64) -> Result<Option<Nade>> {
        let sql = format!("SELECT {} FROM nades WHERE id = ?1", nade_columns());
        let nade = self
            .conn
            .query_row(&sql, [id], nade_from_row)
            .optional()?;
        Ok(nade)
    }

    /// Insert a new nade with fresh timestamps and return its id
    pub fn create_nade(&self, input: &NadeInput) -> Result<i64> {
        let id = insert_nade(&self.conn, input, &now_timestamp())?;
        debug!("Created nade {}", id);
        Ok(id)
    }

    /// Replace every editable field of nade `id`. Returns false if no such nade exists.
    pub fn update_nade(&self, id: i64, input: &NadeInput) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let previous: Option<String> = tx
            .query_row("SELECT updatedAt FROM nades WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .optional()?;
        let Some(previous) = previous else {
            warn!("Update skipped: no nade with id {}", id);
            return Ok(false);
        };

        tx.execute(
            "UPDATE nades SET
                title = :title,
                map = :map,
                side = :side,
                startPosition = :startPosition,
                targetPosition = :targetPosition,
                nadeType = :nadeType,
                description = :description,
                tags = :tags,
                localVideoPath = :localVideoPath,
                videoUrl = :videoUrl,
                thumbnailUrl = :thumbnailUrl,
                updatedAt = :updatedAt
             WHERE id = :id",
            named_params! {
                ":title": input.title,
                ":map": input.map,
                ":side": input.side,
                ":startPosition": input.start_position,
                ":targetPosition": input.target_position,
                ":nadeType": input.nade_type,
                ":description": input.description,
                ":tags": input.tags,
                ":localVideoPath": input.local_video_path,
                ":videoUrl": input.video_url,
                ":thumbnailUrl": input.thumbnail_url,
                ":updatedAt": next_timestamp(&previous),
                ":id": id,
            },
        )?;
        tx.commit()?;

        Ok(true)
    }

    /// Delete nade `id`. Returns false if no such nade exists.
    pub fn delete_nade(&self, id: i64) -> Result<bool> {
        let changed = self.conn.execute("DELETE FROM nades WHERE id = ?1", [id])?;
        if changed == 0 {
            warn!("Delete skipped: no nade with id {}", id);
        }
        Ok(changed > 0)
    }
}

/// Current UTC time as ISO-8601 with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Timestamp for a rewrite of a record last stamped `previous`: now, but always
/// at least one millisecond after `previous` so `updatedAt` strictly increases
pub(crate) fn next_timestamp(previous: &str) -> String {
    let now = Utc::now();
    let stamp = match DateTime::parse_from_rfc3339(previous) {
        Ok(prev) => now.max(prev.with_timezone(&Utc) + TimeDelta::milliseconds(1)),
        Err(_) => now,
    };
    stamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn insert_nade(conn: &Connection, input: &NadeInput, now: &str) -> Result<i64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO nades (
            title, map, side, startPosition, targetPosition, nadeType,
            description, tags, localVideoPath, videoUrl, thumbnailUrl,
            createdAt, updatedAt
         ) VALUES (
            :title, :map, :side, :startPosition, :targetPosition, :nadeType,
            :description, :tags, :localVideoPath, :videoUrl, :thumbnailUrl,
            :createdAt, :updatedAt
         )",
    )?;
    stmt.execute(named_params! {
        ":title": input.title,
        ":map": input.map,
        ":side": input.side,
        ":startPosition": input.start_position,
        ":targetPosition": input.target_position,
        ":nadeType": input.nade_type,
        ":description": input.description,
        ":tags": input.tags,
        ":localVideoPath": input.local_video_path,
        ":videoUrl": input.video_url,
        ":thumbnailUrl": input.thumbnail_url,
        ":createdAt": now,
        ":updatedAt": now,
    })?;
    Ok(conn.last_insert_rowid())
}

fn nade_from_row(row: &Row) -> rusqlite::Result<Nade> {
    Ok(Nade {
        id: row.get(0)?,
        title: row.get(1)?,
        map: row.get(2)?,
        side: row.get(3)?,
        start_position: row.get(4)?,
        target_position: row.get(5)?,
        nade_type: row.get(6)?,
        description: row.get(7)?,
        tags: row.get(8)?,
        local_video_path: row.get(9)?,
        video_url: row.get(10)?,
        thumbnail_url: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_timestamp_moves_past_previous() {
        let future = "2999-01-01T00:00:00.000Z";
        assert_eq!(next_timestamp(future), "2999-01-01T00:00:00.001Z");

        let offset = "2999-01-01T05:00:00.999+05:00";
        assert_eq!(next_timestamp(offset), "2999-01-01T00:00:01.000Z");
    }

    #[test]
    fn test_next_timestamp_uses_now_for_past_or_unparsable() {
        let past = next_timestamp("2000-01-01T00:00:00.000Z");
        assert!(past.as_str() > "2020-01-01T00:00:00.000Z");
        assert!(next_timestamp("yesterday-ish").ends_with('Z'));
    }
}
