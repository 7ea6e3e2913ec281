// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The editor session: one control thread's view of one document.
//!
//! [`EditorSession`] owns the document, the view transform, the gesture
//! state, and the per-frame scene/hit geometry, and it enforces the one
//! contract everything else relies on: **snapshot, mutate, save**. One
//! undo snapshot immediately before each user-visible mutation, then the
//! mutation, then (with autosave on) a persisted document. Pointer events
//! arrive in screen space, are converted through the view transform,
//! classified by the gesture controller against the hit map, and applied
//! here.
//!
//! Everything is single-threaded by construction: the session is owned by
//! the control thread, and the only background activity (media fetches)
//! reports back through a channel drained by [`EditorSession::poll_media`].

use std::fmt;
use std::sync::Arc;

use kurbo::{Point, Rect};
use tracing::{debug, info, warn};

use arbor_forest::{
    Document, NodeId, Uid, load_or_default, save_document,
};
use arbor_gesture::{
    DragController, GestureAction, PressTarget, ReleaseTarget, TrashZone,
};
use arbor_hit::{HitMap, QueryFilter, RegionPart};
use arbor_view2d::connector::{Connector, connectors, connectors_touching};
use arbor_view2d::{
    MonoMetrics, Scene, TextMetrics, ViewTransform, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR, layout,
};

use crate::config::EditorConfig;
use crate::media::{
    MediaEvent, MediaLibrary, MediaPlayer, MediaSource, MediaWorker, extract_media_url,
};
use crate::notice::Notice;

/// What a pointer event asks the presentation layer to do, beyond
/// re-rendering.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SessionEvent {
    /// Open the annotation editor for this node (clicked its label without
    /// dragging, or pressed its annotate affordance).
    OpenMemo(NodeId),
    /// Show this to the user.
    Notice(Notice),
}

/// The control-thread editor state for one document.
pub struct EditorSession {
    config: EditorConfig,
    doc: Document,
    view: ViewTransform,
    gestures: DragController<NodeId>,
    trash: TrashZone,
    metrics: Box<dyn TextMetrics>,
    scene: Scene,
    hit_map: HitMap<NodeId>,
    library: MediaLibrary,
    media: Option<MediaWorker>,
    player: Option<Box<dyn MediaPlayer>>,
    trash_feedback: bool,
}

impl fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSession")
            .field("config", &self.config)
            .field("nodes", &self.doc.forest().len())
            .field("edges", &self.doc.overlay().len())
            .field("scale", &self.view.scale())
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    /// Open the document named by `config`, recovering to a fresh default
    /// document if the file is damaged (the accompanying notice says so).
    pub fn open(config: EditorConfig) -> (Self, Option<Notice>) {
        Self::open_with_metrics(config, Box::new(MonoMetrics::default()))
    }

    /// [`EditorSession::open`] with the presentation layer's own text
    /// measurement, so hit boxes match drawn labels exactly.
    pub fn open_with_metrics(
        config: EditorConfig,
        metrics: Box<dyn TextMetrics>,
    ) -> (Self, Option<Notice>) {
        let (doc, err) = load_or_default(&config.document_path);
        let notice = err.map(|e| Notice::DocumentRecovered(e.to_string()));
        info!(
            path = %config.document_path.display(),
            nodes = doc.forest().len(),
            recovered = notice.is_some(),
            "session opened"
        );
        let library = MediaLibrary::new(config.media_dir.clone());
        let mut session = Self {
            config,
            doc,
            view: ViewTransform::new(),
            gestures: DragController::new(),
            trash: TrashZone::new(Rect::ZERO),
            metrics,
            scene: Scene::default(),
            hit_map: HitMap::new(),
            library,
            media: None,
            player: None,
            trash_feedback: false,
        };
        session.refresh();
        (session, notice)
    }

    /// Wire up the media acquisition collaborator. Fetches land in the
    /// configured media directory.
    pub fn set_media_source(&mut self, source: Arc<dyn MediaSource>) {
        self.media = Some(MediaWorker::new(source, self.library.clone()));
    }

    /// Wire up the playback collaborator.
    pub fn set_media_player(&mut self, player: Box<dyn MediaPlayer>) {
        self.player = Some(player);
    }

    /// Reposition the trash zone (screen space); the presentation layer
    /// calls this on resize.
    pub fn set_trash_rect(&mut self, rect: Rect) {
        self.trash.set_rect(rect);
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    /// The document.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// The current view transform.
    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    /// The current scene geometry (already reflects any drag ghost).
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Every connector to draw, ownership edges first.
    pub fn connectors(&self) -> Vec<Connector> {
        connectors(&self.doc, &self.scene)
    }

    /// The connectors touching one node; what to redraw mid-drag.
    pub fn connectors_touching(&self, id: NodeId) -> Vec<Connector> {
        connectors_touching(&self.doc, &self.scene, id)
    }

    /// Whether the pointer is currently near enough to the trash zone for
    /// warning feedback.
    pub fn trash_feedback(&self) -> bool {
        self.trash_feedback
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.gestures.is_dragging()
    }

    /// The child waiting for a link target, when link mode is armed.
    pub fn pending_link(&self) -> Option<NodeId> {
        self.gestures.pending_link().copied()
    }

    /// The session configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The managed media library.
    pub fn media_library(&self) -> &MediaLibrary {
        &self.library
    }

    // ------------------------------------------------------------------
    // Pointer input (screen coordinates)
    // ------------------------------------------------------------------

    /// Handle a pointer press.
    pub fn pointer_press(&mut self, screen: Point) -> Option<SessionEvent> {
        let model = self.view.to_model(screen);
        let target = match self
            .hit_map
            .hit_test_point(model, QueryFilter::new().pickable())
        {
            Some(region) => match region.part {
                RegionPart::Label => PressTarget::Label(region.key),
                RegionPart::Annotate => PressTarget::Annotate(region.key),
            },
            None => PressTarget::Empty,
        };
        match self.gestures.on_press(screen, model, target) {
            GestureAction::OpenMemo(node) => Some(SessionEvent::OpenMemo(node)),
            GestureAction::Link { parent, child } => self.apply_link(parent, child),
            GestureAction::LinkCancelled => {
                debug!("pending link cancelled by empty press");
                None
            }
            _ => None,
        }
    }

    /// Handle a pointer move.
    pub fn pointer_move(&mut self, screen: Point) -> Option<SessionEvent> {
        let model = self.view.to_model(screen);
        match self.gestures.on_move(screen, model) {
            GestureAction::DragMove { .. } => {
                self.trash_feedback = self.trash.is_near(screen);
                self.rebuild_scene();
                None
            }
            GestureAction::PanBy(delta) => {
                self.view.pan_by(delta);
                None
            }
            _ => None,
        }
    }

    /// Handle a pointer release: commit a move, reparent, delete over the
    /// trash, or report a click.
    pub fn pointer_release(&mut self, screen: Point) -> Option<SessionEvent> {
        let model = self.view.to_model(screen);
        let over_trash = self.trash.is_over(screen);
        let mut rejected = false;
        let doc = &self.doc;
        let map = &self.hit_map;
        let action = self.gestures.on_release(model, |node, at| {
            if over_trash {
                return ReleaseTarget::Trash;
            }
            let filter = QueryFilter::new().pickable();
            match map.drop_target(at, filter, |k| doc.forest().is_in_subtree(node, *k)) {
                Some(region) => ReleaseTarget::Node(region.key),
                None => {
                    // The dragged node's own ghost always sits under the
                    // pointer; ignore it. If anything else is there it can
                    // only be a descendant, so the reparent is rejected and
                    // the move still lands.
                    rejected = map.drop_target(at, filter, |k| *k == node).is_some();
                    ReleaseTarget::Empty
                }
            }
        });
        self.trash_feedback = false;
        let event = self.apply_release(action);
        if rejected && event.is_none() {
            return Some(SessionEvent::Notice(Notice::ReparentRejected));
        }
        event
    }

    fn apply_release(&mut self, action: GestureAction<NodeId>) -> Option<SessionEvent> {
        match action {
            GestureAction::OpenMemo(node) => Some(SessionEvent::OpenMemo(node)),
            GestureAction::Delete { node } => {
                self.doc.push_undo();
                self.doc.remove_node(node);
                let notice = self.autosave();
                self.refresh();
                notice.map(SessionEvent::Notice)
            }
            GestureAction::CommitMove { node, offset } => {
                self.doc.push_undo();
                self.commit_offset(node, offset);
                let notice = self.autosave();
                self.refresh();
                notice.map(SessionEvent::Notice)
            }
            GestureAction::Reparent {
                node,
                target,
                offset,
            } => {
                self.doc.push_undo();
                self.commit_offset(node, offset);
                self.doc.reparent(node, target);
                let notice = self.autosave();
                self.refresh();
                notice.map(SessionEvent::Notice)
            }
            _ => None,
        }
    }

    fn commit_offset(&mut self, node: NodeId, offset: kurbo::Vec2) {
        if let Some(pos) = self.doc.forest().position(node) {
            self.doc.set_position(node, pos + offset);
        }
    }

    fn apply_link(&mut self, parent: NodeId, child: NodeId) -> Option<SessionEvent> {
        let forest = self.doc.forest();
        let (Some(parent_uid), Some(child_uid)) =
            (forest.uid_of(parent).cloned(), forest.uid_of(child).cloned())
        else {
            return None;
        };
        if let Err(err) = self.doc.check_link(&parent_uid, &child_uid) {
            return Some(SessionEvent::Notice(Notice::LinkRejected(err)));
        }
        self.doc.push_undo();
        if let Err(err) = self.doc.add_extra_edge(parent_uid, child_uid) {
            return Some(SessionEvent::Notice(Notice::LinkRejected(err)));
        }
        let notice = self.autosave();
        self.refresh();
        notice.map(SessionEvent::Notice)
    }

    // ------------------------------------------------------------------
    // Commands (menus, side panel, shortcuts)
    // ------------------------------------------------------------------

    /// Undo the last operation.
    pub fn undo(&mut self) -> Option<Notice> {
        if self.doc.undo() {
            self.refresh();
            None
        } else {
            Some(Notice::NothingToUndo)
        }
    }

    /// Redo the last undone operation.
    pub fn redo(&mut self) -> Option<Notice> {
        if self.doc.redo() {
            self.refresh();
            None
        } else {
            Some(Notice::NothingToRedo)
        }
    }

    /// Add a child under `parent`.
    pub fn add_child(&mut self, parent: NodeId, name: &str) -> (Option<NodeId>, Option<Notice>) {
        if !self.doc.forest().is_alive(parent) {
            return (None, None);
        }
        self.doc.push_undo();
        let id = self.doc.add_child(parent, name);
        let notice = self.autosave();
        self.refresh();
        (id, notice)
    }

    /// Add a new root.
    pub fn add_root(&mut self, name: &str) -> (NodeId, Option<Notice>) {
        self.doc.push_undo();
        let id = self.doc.add_root(name);
        let notice = self.autosave();
        self.refresh();
        (id, notice)
    }

    /// Rename a node.
    pub fn rename(&mut self, node: NodeId, name: &str) -> Option<Notice> {
        if !self.doc.forest().is_alive(node) {
            return None;
        }
        self.doc.push_undo();
        self.doc.rename(node, name);
        let notice = self.autosave();
        self.refresh();
        notice
    }

    /// Delete a node (menu path; the trash drop arrives through
    /// [`EditorSession::pointer_release`]).
    pub fn delete_node(&mut self, node: NodeId) -> Option<Notice> {
        if !self.doc.forest().is_alive(node) {
            return None;
        }
        self.doc.push_undo();
        self.doc.remove_node(node);
        let notice = self.autosave();
        self.refresh();
        notice
    }

    /// Store memo text for a node. The side panel and the annotation
    /// editor both come through here.
    pub fn save_memo(&mut self, node: NodeId, text: &str) -> Option<Notice> {
        if !self.doc.forest().is_alive(node) {
            return None;
        }
        self.doc.push_undo();
        self.doc.set_memo(node, text);
        match self.autosave() {
            Some(failure) => Some(failure),
            None => Some(Notice::MemoSaved),
        }
    }

    /// Arm link mode for `child`: the next press picks its extra parent
    /// (or cancels on empty canvas).
    pub fn begin_link(&mut self, child: NodeId) -> Option<Notice> {
        if !self.doc.forest().is_alive(child) {
            return None;
        }
        self.gestures.begin_link(child);
        Some(Notice::ChooseLinkTarget)
    }

    /// The extra parents of a node, for the unlink chooser.
    pub fn extra_parents_of(&self, node: NodeId) -> Vec<Uid> {
        match self.doc.forest().uid_of(node) {
            Some(uid) => self.doc.extra_parents_of(uid),
            None => Vec::new(),
        }
    }

    /// Remove one overlay edge.
    pub fn unlink_extra(&mut self, parent: &Uid, child: &Uid) -> Option<Notice> {
        if !self.doc.overlay().contains(parent, child) {
            return None;
        }
        self.doc.push_undo();
        self.doc.remove_extra_edge(parent, child);
        let notice = self.autosave();
        self.refresh();
        notice
    }

    /// Replace the document with a single fresh root. Undoable.
    pub fn reset(&mut self) -> Option<Notice> {
        self.doc.push_undo();
        self.doc.reset();
        let notice = self.autosave();
        self.refresh();
        match notice {
            Some(failure) => Some(failure),
            None => Some(Notice::DocumentReset),
        }
    }

    /// One zoom-in notch anchored at `focal` (screen space).
    pub fn zoom_in(&mut self, focal: Point) {
        self.view.zoom(focal, ZOOM_IN_FACTOR);
    }

    /// One zoom-out notch anchored at `focal` (screen space).
    pub fn zoom_out(&mut self, focal: Point) {
        self.view.zoom(focal, ZOOM_OUT_FACTOR);
    }

    /// Persist now, regardless of the autosave setting.
    pub fn save_now(&mut self) -> Option<Notice> {
        match save_document(&self.config.document_path, &self.doc) {
            Ok(()) => None,
            Err(err) => {
                warn!(error = %err, "document save failed");
                Some(Notice::SaveFailed(err.to_string()))
            }
        }
    }

    // ------------------------------------------------------------------
    // Media (annotation-editor controls, behind `media_controls`)
    // ------------------------------------------------------------------

    /// Start fetching the media link found in a node's memo. The outcome
    /// arrives later through [`EditorSession::poll_media`].
    pub fn download_from_memo(&mut self, node: NodeId) -> Option<Notice> {
        if !self.config.media_controls {
            return None;
        }
        let Some(info) = self.doc.forest().info(node) else {
            return None;
        };
        let Some(url) = extract_media_url(&info.memo) else {
            return Some(Notice::NoMediaUrl);
        };
        let Some(worker) = &self.media else {
            return Some(Notice::MediaFailed("no media source configured".into()));
        };
        if let Err(err) = worker.library().ensure_dir() {
            return Some(Notice::MediaFailed(err.to_string()));
        }
        worker.fetch(url);
        None
    }

    /// Drain media completion events into user notices. Call from the
    /// control thread's idle handling.
    pub fn poll_media(&mut self) -> Vec<Notice> {
        let Some(worker) = &self.media else {
            return Vec::new();
        };
        worker
            .poll()
            .into_iter()
            .map(|event| match event {
                MediaEvent::Fetched { asset, .. } => {
                    let name = asset
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| asset.display().to_string());
                    Notice::MediaSaved(name)
                }
                MediaEvent::FetchFailed { error, .. } => Notice::MediaFailed(error),
            })
            .collect()
    }

    /// Play the most recently stored asset.
    pub fn play_latest(&mut self) -> Option<Notice> {
        if !self.config.media_controls {
            return None;
        }
        let newest = match self.library.newest() {
            Ok(newest) => newest,
            Err(err) => return Some(Notice::MediaFailed(err.to_string())),
        };
        let Some(asset) = newest else {
            return Some(Notice::NoMediaAssets);
        };
        let Some(player) = &mut self.player else {
            return Some(Notice::MediaFailed("no player configured".into()));
        };
        if let Err(err) = player.load(&asset) {
            return Some(Notice::MediaFailed(err.to_string()));
        }
        if let Err(err) = player.play() {
            return Some(Notice::MediaFailed(err.to_string()));
        }
        None
    }

    /// Stop playback, if a player is wired up.
    pub fn stop_playback(&mut self) {
        if let Some(player) = &mut self.player {
            player.stop();
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn autosave(&mut self) -> Option<Notice> {
        if !self.config.autosave {
            return None;
        }
        self.save_now()
    }

    /// Re-derive everything downstream of the document: lazy layout for
    /// new nodes, then scene boxes and the hit map.
    fn refresh(&mut self) {
        layout::assign_positions(&mut self.doc);
        self.rebuild_scene();
    }

    fn rebuild_scene(&mut self) {
        self.scene = Scene::build(&self.doc, self.metrics.as_ref(), self.gestures.drag_ghost());
        self.hit_map = self.scene.hit_map();
    }
}
