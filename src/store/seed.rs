//! First-run content: the default map pool and a few example lineups.

use log::info;
use rusqlite::Transaction;

use super::{insert_nade, now_timestamp};
use crate::error::Result;
use crate::models::NadeInput;

pub const DEFAULT_MAPS: &[&str] = &[
    "Mirage", "Inferno", "Dust2", "Ancient", "Nuke", "Anubis", "Vertigo", "Overpass",
];

pub fn demo_nades() -> Vec<NadeInput> {
    vec![
        NadeInput {
            title: "Window Smoke from Top Mid".into(),
            map: "Mirage".into(),
            side: "T".into(),
            start_position: "Top Mid".into(),
            target_position: "Window".into(),
            nade_type: "smoke".into(),
            description: "Line up with antenna, jump-throw.".into(),
            tags: "mid,window,execute".into(),
            local_video_path: None,
            video_url: Some("https://www.youtube.com/watch?v=example".into()),
            thumbnail_url: None,
        },
        NadeInput {
            title: "CT Smoke from Banana".into(),
            map: "Inferno".into(),
            side: "T".into(),
            start_position: "Banana".into(),
            target_position: "CT".into(),
            nade_type: "smoke".into(),
            description: "Aim at roof edge, normal throw.".into(),
            tags: "b,ct,smoke".into(),
            local_video_path: None,
            video_url: Some("https://www.youtube.com/watch?v=example2".into()),
            thumbnail_url: None,
        },
        NadeInput {
            title: "A Site Pop Flash".into(),
            map: "Dust2".into(),
            side: "T".into(),
            start_position: "Long Corner".into(),
            target_position: "A Site".into(),
            nade_type: "flash".into(),
            description: "Bounce off wall for quick pop.".into(),
            tags: "a,flash,entry".into(),
            local_video_path: None,
            video_url: Some("https://www.twitch.tv/example".into()),
            thumbnail_url: None,
        },
    ]
}

fn is_empty(tx: &Transaction, table: &str) -> Result<bool> {
    let count: i64 = tx.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })?;
    Ok(count == 0)
}

/// Seed each table only if it is currently empty
pub fn seed_if_empty(tx: &Transaction) -> Result<()> {
    if is_empty(tx, "maps")? {
        let mut stmt = tx.prepare_cached("INSERT INTO maps (name) VALUES (?1)")?;
        for name in DEFAULT_MAPS {
            stmt.execute([name])?;
        }
        info!("Seeded {} default maps", DEFAULT_MAPS.len());
    }

    if is_empty(tx, "nades")? {
        let now = now_timestamp();
        let demo = demo_nades();
        for nade in &demo {
            insert_nade(tx, nade, &now)?;
        }
        info!("Seeded {} example nades", demo.len());
    }

    Ok(())
}
