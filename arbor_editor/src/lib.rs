// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=arbor_editor --heading-base-level=0

//! Arbor Editor: the session layer of the Arbor mind-map editor.
//!
//! [`EditorSession`] is what a presentation layer embeds. It owns the
//! document ([`arbor_forest`]), the view transform and scene geometry
//! ([`arbor_view2d`]), the hit map ([`arbor_hit`]), and the gesture state
//! ([`arbor_gesture`]), and turns screen-space pointer events and menu
//! commands into model mutations under one contract: snapshot, mutate,
//! save. Rejections and recoverable failures come back as [`Notice`]s for
//! the host to display; a click that should open the annotation editor
//! comes back as a [`SessionEvent::OpenMemo`].
//!
//! The media collaborators ([`media`]) fetch and play assets beside the
//! document without ever touching it; acquisition runs on worker threads
//! and reports completion through [`EditorSession::poll_media`] on the
//! control thread. The annotation editor's inline media controls sit
//! behind [`EditorConfig::media_controls`].
//!
//! With the `logging` feature enabled, [`init_logging`] installs a
//! `tracing` subscriber for standalone hosts; embedders bring their own.

mod config;
#[cfg(feature = "logging")]
mod logging;
pub mod media;
mod notice;
mod session;

pub use config::EditorConfig;
#[cfg(feature = "logging")]
pub use logging::init_logging;
pub use notice::Notice;
pub use session::{EditorSession, SessionEvent};
