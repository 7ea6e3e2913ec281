// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! On-disk round-trip coverage for the document store.

use std::fs;

use kurbo::Point;
use tempfile::TempDir;

use arbor_forest::{Document, Uid, load_document, load_or_default, save_document};

fn build_sample() -> Document {
    let mut doc = Document::new();
    let root = doc.forest().roots()[0];
    doc.rename(root, "plans");
    doc.set_position(root, Point::new(100.0, 50.0));
    let a = doc.add_child(root, "groceries").unwrap();
    doc.set_memo(a, "milk, eggs\nhttps://example.com/list");
    doc.set_position(a, Point::new(60.0, 130.0));
    let b = doc.add_child(root, "errands").unwrap();
    doc.add_child(b, "bank").unwrap();
    doc.add_root("scratch");
    let a_uid = doc.forest().uid_of(a).unwrap().clone();
    let b_uid = doc.forest().uid_of(b).unwrap().clone();
    doc.add_extra_edge(b_uid, a_uid).unwrap();
    doc
}

fn assert_same_document(left: &Document, right: &Document) {
    let lhs: Vec<_> = left
        .forest()
        .depth_first()
        .map(|id| {
            let info = left.forest().info(id).unwrap();
            (
                info.uid.clone(),
                info.name.clone(),
                info.memo.clone(),
                info.position,
            )
        })
        .collect();
    let rhs: Vec<_> = right
        .forest()
        .depth_first()
        .map(|id| {
            let info = right.forest().info(id).unwrap();
            (
                info.uid.clone(),
                info.name.clone(),
                info.memo.clone(),
                info.position,
            )
        })
        .collect();
    assert_eq!(lhs, rhs);
    assert_eq!(left.overlay().edges(), right.overlay().edges());
}

#[test]
fn save_then_load_reproduces_the_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("forest.json");

    let doc = build_sample();
    save_document(&path, &doc).unwrap();
    let loaded = load_document(&path).unwrap();
    assert_same_document(&doc, &loaded);

    // And the uid counter is usable: a new node gets a never-seen uid.
    let mut loaded = loaded;
    let root = loaded.forest().roots()[0];
    let fresh = loaded.add_child(root, "fresh").unwrap();
    let fresh_uid = loaded.forest().uid_of(fresh).unwrap().clone();
    assert!(
        loaded
            .forest()
            .depth_first()
            .filter(|id| *id != fresh)
            .all(|id| loaded.forest().uid_of(id) != Some(&fresh_uid))
    );
}

#[test]
fn legacy_file_upgrades_on_next_save() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("forest.json");
    fs::write(
        &path,
        r#"[{"name": "old root", "children": [{"name": "old child"}]}]"#,
    )
    .unwrap();

    let doc = load_document(&path).unwrap();
    assert_eq!(doc.forest().len(), 2);
    save_document(&path, &doc).unwrap();

    let upgraded = fs::read_to_string(&path).unwrap();
    assert!(upgraded.contains("\"tree_data\""));
    assert!(upgraded.contains("\"extra_edges\""));

    // Loading the upgraded file sees the same content.
    let again = load_document(&path).unwrap();
    assert_same_document(&doc, &again);
}

#[test]
fn missing_file_is_a_fresh_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("never-written.json");
    let (doc, err) = load_or_default(&path);
    assert!(err.is_none());
    assert_eq!(doc.forest().len(), 1);
    let root = doc.forest().roots()[0];
    assert_eq!(doc.forest().info(root).unwrap().name, "root");
}

#[test]
fn damaged_file_recovers_with_an_error_report() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("forest.json");
    fs::write(&path, "{not json at all").unwrap();

    let (doc, err) = load_or_default(&path);
    assert!(err.is_some());
    assert_eq!(doc.forest().len(), 1);
    assert!(doc.overlay().is_empty());
    // The damaged file is left in place until the next save.
    assert!(path.exists());
}

#[test]
fn save_replaces_existing_file_atomically() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("forest.json");

    let doc = build_sample();
    save_document(&path, &doc).unwrap();

    let mut doc2 = doc.clone();
    let root = doc2.forest().roots()[0];
    doc2.rename(root, "renamed");
    save_document(&path, &doc2).unwrap();

    let loaded = load_document(&path).unwrap();
    let root = loaded.forest().roots()[0];
    assert_eq!(loaded.forest().info(root).unwrap().name, "renamed");
    // No temporary residue.
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .filter(|n| n.to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "stray temp files: {leftovers:?}");
}

#[test]
fn edge_referencing_deleted_node_never_returns_after_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("forest.json");

    let mut doc = build_sample();
    let b = doc.forest().node_by_uid(&Uid::from("3")).unwrap();
    doc.push_undo();
    doc.remove_node(b);
    assert!(doc.overlay().is_empty());

    save_document(&path, &doc).unwrap();
    let loaded = load_document(&path).unwrap();
    assert!(loaded.overlay().is_empty());
}
