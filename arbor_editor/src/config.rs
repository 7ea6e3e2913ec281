// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session configuration.

use std::path::PathBuf;

/// Editor-wide settings, fixed for the life of a session.
#[derive(Clone, Debug)]
pub struct EditorConfig {
    /// Where the document is loaded from and saved to.
    pub document_path: PathBuf,
    /// Managed directory for fetched media assets.
    pub media_dir: PathBuf,
    /// Offer download/playback controls in the annotation editor.
    ///
    /// Both deployments of this editor exist (with and without inline
    /// media controls) as one core behind this flag.
    pub media_controls: bool,
    /// Persist the document after every mutating operation.
    pub autosave: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            document_path: PathBuf::from("tree_data.json"),
            media_dir: PathBuf::from("music"),
            media_controls: true,
            autosave: true,
        }
    }
}

impl EditorConfig {
    /// Config rooted at a directory: document and media assets side by
    /// side.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            document_path: dir.join("tree_data.json"),
            media_dir: dir.join("music"),
            ..Self::default()
        }
    }
}
