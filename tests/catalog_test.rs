//! End-to-end behaviour of the catalog store and command façade.

use std::cell::RefCell;
use std::io::Cursor;

use nade_catalog::commands::{serve, CommandFacade, LinkOpener};
use nade_catalog::store::{CatalogStore, NadeFilters, SortOrder, DEFAULT_MAPS};
use nade_catalog::{CatalogError, CatalogExport, NadeInput};
use serde_json::Value;
use tempfile::TempDir;

// =============================================================================
// Helpers
// =============================================================================

fn sample_input(title: &str) -> NadeInput {
    NadeInput {
        title: title.to_string(),
        map: "Nuke".to_string(),
        side: "CT".to_string(),
        start_position: "Outside".to_string(),
        target_position: "Secret".to_string(),
        nade_type: "molotov".to_string(),
        description: "Run-throw from the container".to_string(),
        tags: "outside,secret".to_string(),
        local_video_path: Some("/videos/secret.mp4".to_string()),
        video_url: None,
        thumbnail_url: Some("https://img.example/secret.png".to_string()),
    }
}

/// Store with every nade removed; maps stay
fn emptied_store() -> CatalogStore {
    let store = CatalogStore::open_in_memory().expect("open store");
    for nade in store.list_nades(&NadeFilters::default()).unwrap() {
        store.delete_nade(nade.id).unwrap();
    }
    store
}

#[derive(Default)]
struct RecordingOpener {
    opened: RefCell<Vec<String>>,
}

impl LinkOpener for RecordingOpener {
    fn open(&self, target: &str) -> std::io::Result<()> {
        self.opened.borrow_mut().push(target.to_string());
        Ok(())
    }
}

// =============================================================================
// Initialization
// =============================================================================

#[test]
fn test_fresh_store_is_seeded() {
    let store = CatalogStore::open_in_memory().unwrap();

    let maps: Vec<String> = store.list_maps().unwrap().into_iter().map(|m| m.name).collect();
    let mut expected: Vec<String> = DEFAULT_MAPS.iter().map(|m| m.to_string()).collect();
    expected.sort();
    assert_eq!(maps, expected);

    let nades = store.list_nades(&NadeFilters::default()).unwrap();
    assert_eq!(nades.len(), 3);
    assert!(nades.iter().all(|n| n.created_at == n.updated_at));
}

#[test]
fn test_seeding_is_idempotent_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog").join("nades.db");

    {
        let store = CatalogStore::open(&path).unwrap();
        store.add_map("Train").unwrap();
        let first = store.list_nades(&NadeFilters::default()).unwrap();
        store.delete_nade(first[0].id).unwrap();
    }

    let store = CatalogStore::open(&path).unwrap();
    assert_eq!(store.list_maps().unwrap().len(), DEFAULT_MAPS.len() + 1);
    // Two nades remain, so no reseed
    assert_eq!(store.list_nades(&NadeFilters::default()).unwrap().len(), 2);
}

#[test]
fn test_open_existing_requires_catalog() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nades.db");

    let err = CatalogStore::open_existing(&path).err().unwrap();
    assert!(matches!(err, CatalogError::NotInitialized(_)));
    assert!(!path.exists());

    drop(CatalogStore::open(&path).unwrap());
    let store = CatalogStore::open_existing(&path).unwrap();
    assert_eq!(store.export().unwrap().nades.len(), 3);
}

#[test]
fn test_open_existing_rejects_foreign_database() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("other.db");
    rusqlite::Connection::open(&path)
        .unwrap()
        .execute_batch("CREATE TABLE maps (name TEXT);")
        .unwrap();

    let err = CatalogStore::open_existing(&path).err().unwrap();
    assert_eq!(err.kind(), "NotInitialized");
}

// =============================================================================
// Maps
// =============================================================================

#[test]
fn test_add_map_returns_sorted_list() {
    let store = CatalogStore::open_in_memory().unwrap();
    let maps = store.add_map("Cache").unwrap();

    assert_eq!(maps.len(), DEFAULT_MAPS.len() + 1);
    assert_eq!(maps[0].name, "Ancient");
    assert_eq!(maps[1].name, "Anubis");
    assert_eq!(maps[2].name, "Cache");
}

#[test]
fn test_duplicate_map_is_constraint_violation() {
    let store = CatalogStore::open_in_memory().unwrap();
    let before = store.list_maps().unwrap();

    let err = store.add_map("Mirage").unwrap_err();
    assert!(matches!(err, CatalogError::ConstraintViolation(_)));
    assert_eq!(store.list_maps().unwrap(), before);
}

// =============================================================================
// Nade CRUD
// =============================================================================

#[test]
fn test_create_then_get() {
    let store = emptied_store();
    let input = sample_input("Secret molly");

    let id = store.create_nade(&input).unwrap();
    let nade = store.get_nade(id).unwrap().expect("created nade");

    assert_eq!(nade.id, id);
    assert_eq!(nade.to_input(), input);
    assert_eq!(nade.created_at, nade.updated_at);
    assert!(nade.created_at.ends_with('Z'));
    assert!(chrono::DateTime::parse_from_rfc3339(&nade.created_at).is_ok());
}

#[test]
fn test_create_assigns_unique_ids() {
    let store = CatalogStore::open_in_memory().unwrap();
    let a = store.create_nade(&sample_input("a")).unwrap();
    let b = store.create_nade(&sample_input("b")).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_get_missing_is_none() {
    let store = CatalogStore::open_in_memory().unwrap();
    assert!(store.get_nade(9_999).unwrap().is_none());
}

#[test]
fn test_update_replaces_fields_and_bumps_updated_at() {
    let store = CatalogStore::open_in_memory().unwrap();
    let id = store.create_nade(&sample_input("Before")).unwrap();
    let before = store.get_nade(id).unwrap().unwrap();

    let mut replacement = sample_input("After");
    replacement.local_video_path = None;
    replacement.video_url = Some("https://example.com/after".to_string());
    replacement.thumbnail_url = None;
    assert!(store.update_nade(id, &replacement).unwrap());

    let after = store.get_nade(id).unwrap().unwrap();
    assert_eq!(after.to_input(), replacement);
    assert_eq!(after.created_at, before.created_at);

    let old = chrono::DateTime::parse_from_rfc3339(&before.updated_at).unwrap();
    let new = chrono::DateTime::parse_from_rfc3339(&after.updated_at).unwrap();
    assert!(new > old);
}

#[test]
fn test_back_to_back_updates_strictly_increase_updated_at() {
    let store = CatalogStore::open_in_memory().unwrap();
    let parse = |stamp: &str| chrono::DateTime::parse_from_rfc3339(stamp).unwrap();

    for round in 0..100 {
        let id = store.create_nade(&sample_input("Rapid")).unwrap();
        let created = store.get_nade(id).unwrap().unwrap();

        store.update_nade(id, &sample_input("Rapid edit")).unwrap();
        let first = store.get_nade(id).unwrap().unwrap();
        store.update_nade(id, &sample_input("Rapid edit again")).unwrap();
        let second = store.get_nade(id).unwrap().unwrap();

        assert!(
            parse(&first.updated_at) > parse(&created.updated_at),
            "round {}: {} not after {}",
            round,
            first.updated_at,
            created.updated_at
        );
        assert!(parse(&second.updated_at) > parse(&first.updated_at));
        assert_eq!(second.created_at, created.created_at);
    }
}

#[test]
fn test_update_and_delete_missing_are_noops() {
    let store = CatalogStore::open_in_memory().unwrap();
    let before = store.export().unwrap();

    assert!(!store.update_nade(424_242, &sample_input("ghost")).unwrap());
    assert!(!store.delete_nade(424_242).unwrap());
    assert_eq!(store.export().unwrap(), before);
}

#[test]
fn test_delete_then_get_is_none() {
    let store = CatalogStore::open_in_memory().unwrap();
    let id = store.create_nade(&sample_input("Doomed")).unwrap();

    assert!(store.delete_nade(id).unwrap());
    assert!(store.get_nade(id).unwrap().is_none());
}

#[test]
fn test_store_accepts_unvalidated_input() {
    let store = CatalogStore::open_in_memory().unwrap();
    let id = store.create_nade(&NadeInput::default()).unwrap();
    let nade = store.get_nade(id).unwrap().unwrap();
    assert_eq!(nade.title, "");
    assert_eq!(nade.video_url, None);
}

// =============================================================================
// Filtering and ordering
// =============================================================================

#[test]
fn test_filter_by_map() {
    let store = CatalogStore::open_in_memory().unwrap();
    store.create_nade(&sample_input("Nuke one")).unwrap();

    let filters = NadeFilters {
        map: Some("Mirage".into()),
        ..Default::default()
    };
    let nades = store.list_nades(&filters).unwrap();
    assert_eq!(nades.len(), 1);
    assert!(nades.iter().all(|n| n.map == "Mirage"));
}

#[test]
fn test_filter_by_type_returns_dust2_flash() {
    let store = CatalogStore::open_in_memory().unwrap();
    let filters = NadeFilters {
        nade_type: Some("flash".into()),
        ..Default::default()
    };

    let nades = store.list_nades(&filters).unwrap();
    assert_eq!(nades.len(), 1);
    assert_eq!(nades[0].map, "Dust2");
    assert_eq!(nades[0].title, "A Site Pop Flash");
}

#[test]
fn test_facets_combine_with_and() {
    let store = CatalogStore::open_in_memory().unwrap();
    let filters = NadeFilters {
        side: Some("T".into()),
        start_position: Some("Banana".into()),
        nade_type: Some("smoke".into()),
        ..Default::default()
    };
    let nades = store.list_nades(&filters).unwrap();
    assert_eq!(nades.len(), 1);
    assert_eq!(nades[0].map, "Inferno");

    let none = NadeFilters {
        side: Some("CT".into()),
        ..filters
    };
    assert!(store.list_nades(&none).unwrap().is_empty());
}

#[test]
fn test_empty_filter_values_are_ignored() {
    let store = CatalogStore::open_in_memory().unwrap();
    let filters = NadeFilters {
        map: Some(String::new()),
        search: Some(String::new()),
        ..Default::default()
    };
    assert_eq!(store.list_nades(&filters).unwrap().len(), 3);
}

#[test]
fn test_search_is_case_insensitive_across_fields() {
    let store = CatalogStore::open_in_memory().unwrap();
    let mut by_description = sample_input("Quiet one");
    by_description.tags = String::new();
    by_description.description = "Lands a perfect SMOKE on heaven".into();
    let description_id = store.create_nade(&by_description).unwrap();

    let filters = NadeFilters {
        search: Some("smoke".into()),
        ..Default::default()
    };
    let nades = store.list_nades(&filters).unwrap();
    let titles: Vec<&str> = nades.iter().map(|n| n.title.as_str()).collect();

    // Mirage by title, Inferno by title and tags, the new one by description
    assert_eq!(nades.len(), 3);
    assert!(titles.contains(&"Window Smoke from Top Mid"));
    assert!(titles.contains(&"CT Smoke from Banana"));
    assert!(nades.iter().any(|n| n.id == description_id));
    assert!(!titles.contains(&"A Site Pop Flash"));
}

#[test]
fn test_search_wildcards_match_literally() {
    let store = CatalogStore::open_in_memory().unwrap();
    store.create_nade(&sample_input("100% one-way")).unwrap();

    let percent = NadeFilters {
        search: Some("100%".into()),
        ..Default::default()
    };
    assert_eq!(store.list_nades(&percent).unwrap().len(), 1);

    let underscore = NadeFilters {
        search: Some("_".into()),
        ..Default::default()
    };
    assert!(store.list_nades(&underscore).unwrap().is_empty());
}

#[test]
fn test_sort_new_is_descending_by_created_at() {
    let store = CatalogStore::open_in_memory().unwrap();
    let newest = store.create_nade(&sample_input("Newest")).unwrap();

    let nades = store.list_nades(&NadeFilters::default()).unwrap();
    assert_eq!(nades[0].id, newest);

    let times: Vec<_> = nades
        .iter()
        .map(|n| chrono::DateTime::parse_from_rfc3339(&n.created_at).unwrap())
        .collect();
    assert!(times.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_sort_new_is_temporal_not_lexical() {
    let mut store = emptied_store();
    let payload: CatalogExport = serde_json::from_value(serde_json::json!({
        "maps": [],
        "nades": [
            {
                "id": 1, "title": "early", "map": "Mirage", "side": "T",
                "startPosition": "a", "targetPosition": "b", "nadeType": "smoke",
                "description": "", "tags": "",
                "createdAt": "2024-01-01T09:00:00.000Z", "updatedAt": "2024-01-01T09:00:00.000Z"
            },
            {
                "id": 2, "title": "late", "map": "Mirage", "side": "T",
                "startPosition": "a", "targetPosition": "b", "nadeType": "smoke",
                "description": "", "tags": "",
                "createdAt": "2024-01-01T10:00:00.000+05:00", "updatedAt": "2024-01-01T10:00:00.000+05:00"
            }
        ]
    }))
    .unwrap();
    store.import(&payload).unwrap();

    // 10:00+05:00 is 05:00Z, which is earlier than 09:00Z
    let nades = store.list_nades(&NadeFilters::default()).unwrap();
    assert_eq!(nades[0].title, "early");
    assert_eq!(nades[1].title, "late");
}

#[test]
fn test_sort_title_and_map() {
    let store = CatalogStore::open_in_memory().unwrap();

    let by_title = store
        .list_nades(&NadeFilters {
            sort: SortOrder::Title,
            ..Default::default()
        })
        .unwrap();
    let titles: Vec<&str> = by_title.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["A Site Pop Flash", "CT Smoke from Banana", "Window Smoke from Top Mid"]
    );

    let by_map = store
        .list_nades(&NadeFilters {
            sort: SortOrder::Map,
            ..Default::default()
        })
        .unwrap();
    let maps: Vec<&str> = by_map.iter().map(|n| n.map.as_str()).collect();
    assert_eq!(maps, vec!["Dust2", "Inferno", "Mirage"]);
}

// =============================================================================
// Export / import
// =============================================================================

#[test]
fn test_export_import_round_trip() {
    let source = CatalogStore::open_in_memory().unwrap();
    source.add_map("Train").unwrap();
    source.create_nade(&sample_input("Extra")).unwrap();
    let exported = source.export().unwrap();
    assert_eq!(exported.nades.len(), 4);

    // Through JSON text, as a file would carry it
    let json = source.export_json().unwrap();
    let mut target = emptied_store();
    target.import_json(&json).unwrap();

    let reimported = target.export().unwrap();
    assert_eq!(reimported.nades, exported.nades);
    assert_eq!(reimported.maps, exported.maps);
}

#[test]
fn test_import_skips_existing_maps() {
    let mut store = emptied_store();
    let payload = CatalogExport {
        maps: vec!["Mirage".into(), "Cache".into()],
        nades: vec![],
    };
    store.import(&payload).unwrap();

    let maps = store.list_maps().unwrap();
    assert_eq!(maps.len(), DEFAULT_MAPS.len() + 1);
    assert_eq!(maps.iter().filter(|m| m.name == "Mirage").count(), 1);
}

#[test]
fn test_import_id_collision_rolls_back_everything() {
    let mut store = CatalogStore::open_in_memory().unwrap();
    let before = store.export().unwrap();

    let mut clash = before.nades[0].clone();
    clash.title = "Clash".into();
    let mut fresh = clash.clone();
    fresh.id = 500;
    let payload = CatalogExport {
        maps: vec!["Cache".into()],
        nades: vec![fresh, clash],
    };

    let err = store.import(&payload).unwrap_err();
    assert!(matches!(err, CatalogError::ConstraintViolation(_)));
    assert_eq!(store.export().unwrap(), before);
}

#[test]
fn test_import_rejects_malformed_json() {
    let mut store = CatalogStore::open_in_memory().unwrap();
    let err = store.import_json(r#"{"maps": ["x"]}"#).unwrap_err();
    assert!(matches!(err, CatalogError::Serialization(_)));
    assert!(store.list_maps().unwrap().iter().all(|m| m.name != "x"));
}

// =============================================================================
// Command façade
// =============================================================================

#[test]
fn test_facade_forwards_calls() {
    let store = CatalogStore::open_in_memory().unwrap();
    let mut facade = CommandFacade::with_opener(store, RecordingOpener::default());

    let id = facade.create_nade(&sample_input("Via facade")).unwrap();
    assert!(facade.update_nade(id, &sample_input("Renamed")).unwrap());
    assert_eq!(facade.get_nade(id).unwrap().unwrap().title, "Renamed");
    assert!(facade.delete_nade(id).unwrap());
    // Missing ids still report success
    assert!(facade.delete_nade(id).unwrap());

    let export = facade.export_json().unwrap();
    assert!(facade.import_json(&CatalogExport { maps: export.maps, nades: vec![] }).unwrap());

    assert!(facade.open_external_link("https://example.com/v").unwrap());
    assert_eq!(facade.opener().opened.borrow().len(), 1);
}

#[test]
fn test_facade_passes_errors_through() {
    let store = CatalogStore::open_in_memory().unwrap();
    let facade = CommandFacade::with_opener(store, RecordingOpener::default());
    let err = facade.add_map("Dust2").unwrap_err();
    assert!(matches!(err, CatalogError::ConstraintViolation(_)));
}

#[test]
fn test_facade_checks_file_existence() {
    let dir = TempDir::new().unwrap();
    let video = dir.path().join("clip.mp4");
    std::fs::write(&video, b"not really a video").unwrap();

    let facade = CommandFacade::with_opener(
        CatalogStore::open_in_memory().unwrap(),
        RecordingOpener::default(),
    );
    assert!(facade.check_file_exists(video.to_str().unwrap()));
    assert!(!facade.check_file_exists(dir.path().join("nope.mp4").to_str().unwrap()));
}

#[test]
fn test_serve_session() {
    let store = CatalogStore::open_in_memory().unwrap();
    let mut facade = CommandFacade::with_opener(store, RecordingOpener::default());

    let requests = [
        r#"{"command":"maps:add","params":{"name":"Train"}}"#,
        r#"{"command":"maps:add","params":{"name":"Train"}}"#,
        "",
        r#"{"command":"nades:list","params":{"nadeType":"flash"}}"#,
        r#"{"command":"nades:get","params":{"id":12345}}"#,
        r#"not json"#,
        r#"{"command":"video:open","params":{"url":"https://example.com/x"}}"#,
        r#"{"command":"file:exists","params":{"path":"/definitely/not/here"}}"#,
    ]
    .join("\n");

    let mut output = Vec::new();
    let handled = serve(&mut facade, Cursor::new(requests), &mut output).unwrap();
    assert_eq!(handled, 7);

    let replies: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(replies[0]["ok"], true);
    assert_eq!(replies[0]["result"].as_array().unwrap().len(), DEFAULT_MAPS.len() + 1);

    assert_eq!(replies[1]["ok"], false);
    assert_eq!(replies[1]["error"]["kind"], "ConstraintViolation");

    let flashes = replies[2]["result"].as_array().unwrap();
    assert_eq!(flashes.len(), 1);
    assert_eq!(flashes[0]["map"], "Dust2");
    assert_eq!(flashes[0]["startPosition"], "Long Corner");

    assert_eq!(replies[3], serde_json::json!({"ok": true, "result": null}));
    assert_eq!(replies[4]["error"]["kind"], "BadRequest");
    assert_eq!(replies[5]["result"], true);
    assert_eq!(replies[6]["result"], false);

    assert_eq!(
        facade.opener().opened.borrow().as_slice(),
        ["https://example.com/x"]
    );
}
