//! Store persistence: restart survival and corrupt-file recovery.

use swingby_core::models::KnowledgeEntry;
use swingby_store::KnowledgeStore;

fn entry(key: &str) -> KnowledgeEntry {
    KnowledgeEntry {
        key: key.to_string(),
        content_hash: "abc123".to_string(),
        file_name: format!("{key}.md"),
        keywords: vec!["category".to_string(), "tag".to_string()],
        ..Default::default()
    }
}

#[test]
fn test_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("knowledge.json");

    let mut store = KnowledgeStore::load(&path);
    assert!(store.is_empty());
    let mut with_embedding = entry("smith.2020dark.............dm....");
    with_embedding
        .embeddings
        .insert("body".to_string(), vec![0.25, -0.5, 0.75]);
    store.append(with_embedding);
    store.append(entry("plain-note"));
    store.save().unwrap();

    let reloaded = KnowledgeStore::load(&path);
    assert_eq!(reloaded.len(), 2);
    let row = reloaded.get("smith.2020dark.............dm....").unwrap();
    assert_eq!(row.embedding("body"), Some([0.25, -0.5, 0.75].as_slice()));
    assert_eq!(row.keywords[0], "category");
}

#[test]
fn test_corrupt_store_recovers_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("knowledge.json");
    std::fs::write(&path, "{ not json at all").unwrap();

    let store = KnowledgeStore::load(&path);
    assert!(store.is_empty());
}

#[test]
fn test_save_after_corrupt_load_replaces_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("knowledge.json");
    std::fs::write(&path, "garbage").unwrap();

    let mut store = KnowledgeStore::load(&path);
    store.append(entry("a"));
    store.save().unwrap();

    let reloaded = KnowledgeStore::load(&path);
    assert_eq!(reloaded.len(), 1);
}

#[test]
fn test_save_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("knowledge.json");

    let mut store = KnowledgeStore::load(&path);
    store.append(entry("a"));
    store.save().unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["knowledge.json"]);
}

#[test]
fn test_reindex_overwrite_persists_single_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("knowledge.json");

    let mut store = KnowledgeStore::load(&path);
    store.append(entry("dup"));
    let mut updated = entry("dup");
    updated.content_hash = "def456".to_string();
    store.append(updated);
    store.save().unwrap();

    let reloaded = KnowledgeStore::load(&path);
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.get("dup").unwrap().content_hash, "def456");
}
