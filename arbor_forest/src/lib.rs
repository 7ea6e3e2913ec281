// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=arbor_forest --heading-base-level=0

//! Arbor Forest: the document model for the Arbor mind-map editor.
//!
//! This crate owns everything about the document and nothing about pixels:
//!
//! - A forest of named, annotatable nodes in a generational slot arena
//!   ([`Forest`], [`NodeId`]). Ownership is strictly tree-shaped and
//!   ancestry questions are answered through mutation-maintained parent
//!   links, not by searching.
//! - A directed extra-edge overlay between persistent node uids
//!   ([`Overlay`]), independent of ownership, with self-loop and duplicate
//!   insertion rejected as typed no-ops ([`LinkError`]).
//! - Whole-state undo/redo snapshots ([`History`]): a snapshot is pushed
//!   before every user-visible mutation, and redo is cleared by new
//!   mutations only.
//! - JSON persistence ([`store`]) with a legacy-format upgrade path,
//!   missing-id repair, non-fatal recovery from damaged files, and atomic
//!   saves.
//!
//! [`Document`] ties the four together as the single mutation surface the
//! editor session talks to. Interaction (hit testing, gestures, the view
//! transform) lives in the sibling crates; they consume this one through
//! handles and never hold references into the arena.
//!
//! ## Identity
//!
//! Nodes carry two identities with different jobs. The [`NodeId`] handle is
//! in-memory identity: cheap, generational, detectably stale after a delete
//! or an undo. The [`Uid`] is persistent identity: a decimal-integer string
//! that names the node in the saved document and in overlay edges, drawn
//! from a counter kept strictly above every numeric uid in use. Display
//! names are just labels; they may repeat and are never compared.

mod document;
mod forest;
mod history;
mod overlay;
pub mod store;
mod types;

pub use document::Document;
pub use forest::{DEFAULT_ROOT_NAME, DepthFirst, Forest, NodeInfo};
pub use history::{History, Snapshot};
pub use overlay::{ExtraEdge, LinkError, Overlay};
pub use store::{StoreError, load_document, load_or_default, save_document};
pub use types::{NodeId, Uid};
