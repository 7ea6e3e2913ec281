// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON persistence for the document.
//!
//! The on-disk shape is a nested node tree plus the overlay edge list:
//!
//! ```json
//! {
//!   "tree_data": [
//!     { "id": "1", "name": "root", "memo": "", "x": 100.0, "y": 50.0,
//!       "children": [ { "id": "2", "name": "child", "memo": "", "children": [] } ] }
//!   ],
//!   "extra_edges": [ ["1", "2"] ]
//! }
//! ```
//!
//! A legacy document is a bare array of nodes with no `extra_edges`; it is
//! accepted on load and written back in the current shape on the next save.
//! Nodes missing `id`, `memo`, or `children` are filled in during load, with
//! fresh ids drawn from a counter seeded past the maximum numeric id found
//! anywhere in the document (seeding happens before any assignment, so a
//! late pre-existing id can never collide with an early assigned one).
//!
//! Saves go through a write-then-rename so a crash mid-write never leaves a
//! truncated document behind.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use kurbo::Point;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::document::Document;
use crate::forest::{Forest, NodeInfo};
use crate::overlay::{ExtraEdge, Overlay};
use crate::types::{NodeId, Uid};

/// Errors from loading or saving a document.
#[derive(Debug)]
pub enum StoreError {
    /// File I/O failure.
    Io(std::io::Error),
    /// The file was not a recognizable document.
    Parse(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Parse(e) => write!(f, "document format error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// One node in the wire shape.
#[derive(Debug, Serialize, Deserialize)]
struct DocNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<Uid>,
    name: String,
    #[serde(default)]
    memo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y: Option<f64>,
    #[serde(default)]
    children: Vec<DocNode>,
}

/// The current wire shape.
#[derive(Debug, Serialize, Deserialize)]
struct DocFile {
    tree_data: Vec<DocNode>,
    #[serde(default)]
    extra_edges: Vec<(Uid, Uid)>,
}

/// Either the current shape or the legacy bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DocFormat {
    Current(DocFile),
    Legacy(Vec<DocNode>),
}

/// Load a document from `path`.
///
/// A missing file yields a fresh default document (first run). Unreadable or
/// unparseable files are errors; see [`load_or_default`] for the recovering
/// variant.
pub fn load_document(path: &Path) -> Result<Document, StoreError> {
    if !path.exists() {
        return Ok(Document::new());
    }
    let bytes = fs::read(path)?;
    let format: DocFormat = serde_json::from_slice(&bytes).map_err(StoreError::Parse)?;
    Ok(decode(format))
}

/// Load a document, substituting a fresh default document when the file is
/// damaged.
///
/// The error, when present, is returned alongside so the caller can surface
/// it to the user; recovery itself is not fatal.
pub fn load_or_default(path: &Path) -> (Document, Option<StoreError>) {
    match load_document(path) {
        Ok(doc) => (doc, None),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "document unreadable, starting fresh");
            (Document::new(), Some(err))
        }
    }
}

/// Save a document to `path` in the current shape.
///
/// The bytes land in a sibling temporary file first and are renamed into
/// place, so readers never observe a partial document.
pub fn save_document(path: &Path, doc: &Document) -> Result<(), StoreError> {
    let file = encode(doc);
    let json = serde_json::to_vec_pretty(&file).map_err(StoreError::Parse)?;
    let tmp = sibling_tmp_path(path);
    fs::write(&tmp, &json)?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }
    Ok(())
}

fn sibling_tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn decode(format: DocFormat) -> Document {
    let (nodes, edges) = match format {
        DocFormat::Current(file) => (file.tree_data, file.extra_edges),
        DocFormat::Legacy(nodes) => (nodes, Vec::new()),
    };

    let mut forest = Forest::new();
    // Seed the counter past every numeric id before assigning any missing
    // ones.
    note_ids(&mut forest, &nodes);
    for node in nodes {
        insert_doc_node(&mut forest, None, node);
    }

    let overlay = Overlay::from_edges(
        edges
            .into_iter()
            .map(|(parent, child)| ExtraEdge { parent, child })
            .collect(),
    );
    Document::from_parts(forest, overlay)
}

fn note_ids(forest: &mut Forest, nodes: &[DocNode]) {
    for node in nodes {
        if let Some(id) = &node.id {
            forest.note_uid(id);
        }
        note_ids(forest, &node.children);
    }
}

fn insert_doc_node(forest: &mut Forest, parent: Option<NodeId>, node: DocNode) {
    let uid = match node.id {
        Some(uid) => uid,
        None => forest.allocate_uid(),
    };
    let position = match (node.x, node.y) {
        (Some(x), Some(y)) => Some(Point::new(x, y)),
        _ => None,
    };
    let info = NodeInfo {
        uid,
        name: node.name,
        memo: node.memo,
        position,
    };
    let id = match parent {
        Some(p) => match forest.insert_child(p, info) {
            Some(id) => id,
            None => return,
        },
        None => forest.insert_root(info),
    };
    for child in node.children {
        insert_doc_node(forest, Some(id), child);
    }
}

fn encode(doc: &Document) -> DocFile {
    let forest = doc.forest();
    DocFile {
        tree_data: forest
            .roots()
            .iter()
            .map(|root| encode_node(forest, *root))
            .collect(),
        extra_edges: doc
            .overlay()
            .edges()
            .iter()
            .map(|e| (e.parent.clone(), e.child.clone()))
            .collect(),
    }
}

fn encode_node(forest: &Forest, id: NodeId) -> DocNode {
    let info = forest.info(id).expect("encode walks live handles only");
    DocNode {
        id: Some(info.uid.clone()),
        name: info.name.clone(),
        memo: info.memo.clone(),
        x: info.position.map(|p| p.x),
        y: info.position.map(|p| p.y),
        children: forest
            .children_of(id)
            .iter()
            .map(|child| encode_node(forest, *child))
            .collect(),
    }
}
