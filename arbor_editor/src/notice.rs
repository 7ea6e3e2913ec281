// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! User-visible reports.
//!
//! The session never opens dialogs; it hands back a [`Notice`] and the
//! presentation layer decides how to show it (message box, toast, status
//! line). Every rejected operation and every recoverable failure surfaces
//! this way; none of them are errors in the `Result` sense, because the
//! session has already handled them by doing nothing.

use core::fmt;

use arbor_forest::LinkError;

/// Something the user should be told.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Notice {
    /// Undo requested with an empty undo stack.
    NothingToUndo,
    /// Redo requested with an empty redo stack.
    NothingToRedo,
    /// An overlay link was rejected (self-loop or duplicate); nothing
    /// changed.
    LinkRejected(LinkError),
    /// A drag ended over the dragged node itself or one of its
    /// descendants; the node kept its moved position but was not
    /// reparented.
    ReparentRejected,
    /// The document file could not be read; editing starts from a fresh
    /// default document. The payload describes what was wrong.
    DocumentRecovered(String),
    /// A save failed; the document in memory is intact.
    SaveFailed(String),
    /// Memo text was stored.
    MemoSaved,
    /// Link mode is armed: the next press picks the extra parent.
    ChooseLinkTarget,
    /// The document was replaced with a fresh default root.
    DocumentReset,
    /// The memo holds no recognizable media link.
    NoMediaUrl,
    /// Playback was requested with no stored assets.
    NoMediaAssets,
    /// A media fetch finished; the payload is the stored asset's file name.
    MediaSaved(String),
    /// A media fetch or playback attempt failed. Never affects the
    /// document.
    MediaFailed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingToUndo => write!(f, "nothing to undo"),
            Self::NothingToRedo => write!(f, "nothing to redo"),
            Self::LinkRejected(err) => write!(f, "link rejected: {err}"),
            Self::ReparentRejected => {
                write!(f, "cannot attach a node beneath itself; kept its position")
            }
            Self::DocumentRecovered(detail) => {
                write!(f, "document could not be read ({detail}); starting fresh")
            }
            Self::SaveFailed(detail) => write!(f, "save failed: {detail}"),
            Self::MemoSaved => write!(f, "memo saved"),
            Self::ChooseLinkTarget => write!(f, "pick the node to link as extra parent"),
            Self::DocumentReset => write!(f, "document reset"),
            Self::NoMediaUrl => write!(f, "no media link found in the memo"),
            Self::NoMediaAssets => write!(f, "no stored media to play"),
            Self::MediaSaved(name) => write!(f, "media saved: {name}"),
            Self::MediaFailed(detail) => write!(f, "media error: {detail}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_human_readable() {
        assert_eq!(Notice::NothingToUndo.to_string(), "nothing to undo");
        assert_eq!(
            Notice::LinkRejected(LinkError::Duplicate).to_string(),
            "link rejected: these nodes are already linked"
        );
        assert!(
            Notice::DocumentRecovered("bad json".into())
                .to_string()
                .contains("bad json")
        );
    }
}
