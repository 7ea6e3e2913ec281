// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drag/pan/click/link gesture state machine.

use kurbo::{Point, Vec2};

/// Minimum pointer travel, in model units, before a press on a node is
/// classified as a drag rather than a click.
pub const DRAG_THRESHOLD: f64 = 5.0;

/// What the pointer went down on, as resolved by the caller's hit map.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PressTarget<K> {
    /// A node's label region.
    Label(K),
    /// A node's annotate affordance.
    Annotate(K),
    /// Empty canvas.
    Empty,
}

/// Where a drag release landed, as resolved by the caller.
///
/// The caller performs trash and drop-target resolution at release time
/// (the drop target must already exclude the dragged node and its
/// descendants); the controller only needs the classification.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReleaseTarget<K> {
    /// Over the trash zone: delete the dragged node.
    Trash,
    /// Over another node's label region: reparent under it.
    Node(K),
    /// Anywhere else: keep the moved position.
    Empty,
}

/// What the caller should do in response to a pointer event.
///
/// Exactly one action is emitted per event. Mutating actions (`Delete`,
/// `Reparent`, `CommitMove`, `Link`) are each a complete user-visible
/// operation: take one undo snapshot, mutate, save.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureAction<K> {
    /// Nothing to do for this event.
    None,
    /// Open the memo editor for a node (affordance press, or a click that
    /// never crossed the drag threshold).
    OpenMemo(K),
    /// A drag is in progress: render `node` displaced by `offset` from its
    /// stored position and recompute the connectors touching it. Not a
    /// model mutation.
    DragMove {
        /// The dragged node.
        node: K,
        /// Cumulative displacement since the press, in model units.
        offset: Vec2,
    },
    /// Pan the view transform by a screen-space delta.
    PanBy(Vec2),
    /// Drag released over the trash zone: delete `node`.
    Delete {
        /// The dragged node.
        node: K,
    },
    /// Drag released over another node: commit the moved position and
    /// reparent `node` under `target`.
    Reparent {
        /// The dragged node.
        node: K,
        /// Its new parent.
        target: K,
        /// Final displacement to commit alongside the reparent.
        offset: Vec2,
    },
    /// Drag released over empty canvas: commit the moved position.
    CommitMove {
        /// The dragged node.
        node: K,
        /// Final displacement since the press.
        offset: Vec2,
    },
    /// Link mode resolved: add an overlay edge `parent -> child`.
    Link {
        /// The node pressed while link mode was armed.
        parent: K,
        /// The child chosen when link mode was entered.
        child: K,
    },
    /// Link mode was armed but the press landed on empty canvas.
    LinkCancelled,
}

#[derive(Clone, Copy, Debug)]
enum Phase<K> {
    Idle,
    /// Pointer down on a node, threshold not yet crossed.
    Pressed { node: K, start: Point },
    /// Threshold crossed; `offset` is the cumulative model-space travel.
    Dragging { node: K, start: Point, offset: Vec2 },
    /// Pointer down on empty canvas; `last` is in screen space.
    Panning { last: Point },
}

/// Gesture state machine for the canvas.
///
/// Feed it every pointer press, move, and release, with coordinates in both
/// screen and model space (node logic runs in model space; panning tracks
/// screen space so the view transform can change underneath the pointer
/// without feedback). The pending-link mode, armed with
/// [`DragController::begin_link`], takes priority over every other press
/// while active.
#[derive(Clone, Debug)]
pub struct DragController<K> {
    phase: Phase<K>,
    pending_link: Option<K>,
    drag_threshold: f64,
}

impl<K: Copy + Eq> DragController<K> {
    /// Create a controller with the default drag threshold.
    pub fn new() -> Self {
        Self::with_threshold(DRAG_THRESHOLD)
    }

    /// Create a controller with a custom drag threshold in model units.
    pub fn with_threshold(drag_threshold: f64) -> Self {
        Self {
            phase: Phase::Idle,
            pending_link: None,
            drag_threshold,
        }
    }

    /// Arm link mode: the next press anywhere resolves or cancels the link
    /// for `child`.
    pub fn begin_link(&mut self, child: K) {
        self.pending_link = Some(child);
    }

    /// The child waiting for a link target, if link mode is armed.
    pub fn pending_link(&self) -> Option<&K> {
        self.pending_link.as_ref()
    }

    /// The dragged node and its current cumulative offset, while a drag is
    /// in progress. The scene renders this node ghosted at
    /// `stored position + offset`.
    pub fn drag_ghost(&self) -> Option<(K, Vec2)> {
        match self.phase {
            Phase::Dragging { node, offset, .. } => Some((node, offset)),
            _ => None,
        }
    }

    /// Whether a drag has crossed the threshold.
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging { .. })
    }

    /// Whether the canvas is being panned.
    pub fn is_panning(&self) -> bool {
        matches!(self.phase, Phase::Panning { .. })
    }

    /// Abandon any in-progress press, drag, or pan (pointer capture lost,
    /// window deactivated). Link mode stays armed; it is a modal command,
    /// not a pointer gesture.
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Handle a pointer press.
    ///
    /// `screen` and `model` are the same event position in the two spaces;
    /// `target` is what the caller's hit map found under `model`.
    pub fn on_press(
        &mut self,
        screen: Point,
        model: Point,
        target: PressTarget<K>,
    ) -> GestureAction<K> {
        if let Some(child) = self.pending_link.take() {
            // Link mode swallows this press entirely.
            return match target {
                PressTarget::Label(parent) | PressTarget::Annotate(parent) => {
                    GestureAction::Link { parent, child }
                }
                PressTarget::Empty => GestureAction::LinkCancelled,
            };
        }
        match target {
            PressTarget::Label(node) => {
                self.phase = Phase::Pressed { node, start: model };
                GestureAction::None
            }
            PressTarget::Annotate(node) => GestureAction::OpenMemo(node),
            PressTarget::Empty => {
                self.phase = Phase::Panning { last: screen };
                GestureAction::None
            }
        }
    }

    /// Handle a pointer move.
    pub fn on_move(&mut self, screen: Point, model: Point) -> GestureAction<K> {
        match self.phase {
            Phase::Idle => GestureAction::None,
            Phase::Pressed { node, start } => {
                let offset = model - start;
                if offset.hypot() > self.drag_threshold {
                    self.phase = Phase::Dragging {
                        node,
                        start,
                        offset,
                    };
                    GestureAction::DragMove { node, offset }
                } else {
                    GestureAction::None
                }
            }
            Phase::Dragging { node, start, .. } => {
                let offset = model - start;
                self.phase = Phase::Dragging {
                    node,
                    start,
                    offset,
                };
                GestureAction::DragMove { node, offset }
            }
            Phase::Panning { last } => {
                let delta = screen - last;
                self.phase = Phase::Panning { last: screen };
                GestureAction::PanBy(delta)
            }
        }
    }

    /// Handle a pointer release.
    ///
    /// For an in-progress drag the caller resolves where the release landed
    /// via `resolve` (trash first, then drop target with the dragged
    /// subtree excluded); presses that never crossed the threshold come
    /// back as [`GestureAction::OpenMemo`] clicks.
    pub fn on_release(
        &mut self,
        model: Point,
        resolve: impl FnOnce(K, Point) -> ReleaseTarget<K>,
    ) -> GestureAction<K> {
        let phase = core::mem::replace(&mut self.phase, Phase::Idle);
        match phase {
            Phase::Idle | Phase::Panning { .. } => GestureAction::None,
            Phase::Pressed { node, .. } => GestureAction::OpenMemo(node),
            Phase::Dragging { node, start, .. } => {
                let offset = model - start;
                match resolve(node, model) {
                    ReleaseTarget::Trash => GestureAction::Delete { node },
                    ReleaseTarget::Node(target) => GestureAction::Reparent {
                        node,
                        target,
                        offset,
                    },
                    ReleaseTarget::Empty => GestureAction::CommitMove { node, offset },
                }
            }
        }
    }
}

impl<K: Copy + Eq> Default for DragController<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press_label(ctl: &mut DragController<u32>, node: u32, at: Point) {
        let action = ctl.on_press(at, at, PressTarget::Label(node));
        assert_eq!(action, GestureAction::None);
    }

    #[test]
    fn release_inside_threshold_is_a_click() {
        let mut ctl: DragController<u32> = DragController::new();
        press_label(&mut ctl, 7, Point::new(10.0, 10.0));
        // A wobble below the threshold is not a drag.
        let action = ctl.on_move(Point::new(13.0, 12.0), Point::new(13.0, 12.0));
        assert_eq!(action, GestureAction::None);
        let action = ctl.on_release(Point::new(13.0, 12.0), |_, _| ReleaseTarget::Empty);
        assert_eq!(action, GestureAction::OpenMemo(7));
        assert!(!ctl.is_dragging());
    }

    #[test]
    fn exact_threshold_distance_is_still_a_click() {
        let mut ctl: DragController<u32> = DragController::new();
        press_label(&mut ctl, 7, Point::new(0.0, 0.0));
        let action = ctl.on_move(Point::new(5.0, 0.0), Point::new(5.0, 0.0));
        assert_eq!(action, GestureAction::None);
    }

    #[test]
    fn crossing_threshold_starts_reporting_drag_moves() {
        let mut ctl: DragController<u32> = DragController::new();
        press_label(&mut ctl, 7, Point::new(10.0, 10.0));
        let action = ctl.on_move(Point::new(20.0, 10.0), Point::new(20.0, 10.0));
        assert_eq!(
            action,
            GestureAction::DragMove {
                node: 7,
                offset: Vec2::new(10.0, 0.0)
            }
        );
        // Offsets stay cumulative from the press position.
        let action = ctl.on_move(Point::new(22.0, 14.0), Point::new(22.0, 14.0));
        assert_eq!(
            action,
            GestureAction::DragMove {
                node: 7,
                offset: Vec2::new(12.0, 4.0)
            }
        );
        assert_eq!(ctl.drag_ghost(), Some((7, Vec2::new(12.0, 4.0))));
    }

    #[test]
    fn drag_release_over_empty_commits_the_move() {
        let mut ctl: DragController<u32> = DragController::new();
        press_label(&mut ctl, 7, Point::new(0.0, 0.0));
        ctl.on_move(Point::new(30.0, 40.0), Point::new(30.0, 40.0));
        let action = ctl.on_release(Point::new(30.0, 40.0), |_, _| ReleaseTarget::Empty);
        assert_eq!(
            action,
            GestureAction::CommitMove {
                node: 7,
                offset: Vec2::new(30.0, 40.0)
            }
        );
    }

    #[test]
    fn drag_release_over_trash_deletes() {
        let mut ctl: DragController<u32> = DragController::new();
        press_label(&mut ctl, 7, Point::new(0.0, 0.0));
        ctl.on_move(Point::new(30.0, 40.0), Point::new(30.0, 40.0));
        let action = ctl.on_release(Point::new(30.0, 40.0), |_, _| ReleaseTarget::Trash);
        assert_eq!(action, GestureAction::Delete { node: 7 });
    }

    #[test]
    fn drag_release_over_node_reparents_with_final_offset() {
        let mut ctl: DragController<u32> = DragController::new();
        press_label(&mut ctl, 7, Point::new(0.0, 0.0));
        ctl.on_move(Point::new(30.0, 40.0), Point::new(30.0, 40.0));
        let action = ctl.on_release(Point::new(31.0, 41.0), |node, _| {
            assert_eq!(node, 7);
            ReleaseTarget::Node(2)
        });
        assert_eq!(
            action,
            GestureAction::Reparent {
                node: 7,
                target: 2,
                offset: Vec2::new(31.0, 41.0)
            }
        );
    }

    #[test]
    fn press_on_affordance_opens_memo_immediately() {
        let mut ctl: DragController<u32> = DragController::new();
        let action = ctl.on_press(
            Point::new(5.0, 5.0),
            Point::new(5.0, 5.0),
            PressTarget::Annotate(9),
        );
        assert_eq!(action, GestureAction::OpenMemo(9));
        // No press is latched: a stray release does nothing.
        let action = ctl.on_release(Point::new(5.0, 5.0), |_, _| ReleaseTarget::Empty);
        assert_eq!(action, GestureAction::None);
    }

    #[test]
    fn empty_press_pans_in_screen_space() {
        let mut ctl: DragController<u32> = DragController::new();
        ctl.on_press(Point::new(100.0, 100.0), Point::new(0.0, 0.0), PressTarget::Empty);
        assert!(ctl.is_panning());
        let action = ctl.on_move(Point::new(110.0, 95.0), Point::new(123.0, 456.0));
        assert_eq!(action, GestureAction::PanBy(Vec2::new(10.0, -5.0)));
        let action = ctl.on_move(Point::new(111.0, 95.0), Point::new(0.0, 0.0));
        assert_eq!(action, GestureAction::PanBy(Vec2::new(1.0, 0.0)));
        let action = ctl.on_release(Point::new(0.0, 0.0), |_, _| ReleaseTarget::Empty);
        assert_eq!(action, GestureAction::None);
        assert!(!ctl.is_panning());
    }

    #[test]
    fn link_mode_takes_priority_over_node_press() {
        let mut ctl: DragController<u32> = DragController::new();
        ctl.begin_link(3);
        assert_eq!(ctl.pending_link(), Some(&3));
        let action = ctl.on_press(
            Point::new(5.0, 5.0),
            Point::new(5.0, 5.0),
            PressTarget::Label(8),
        );
        assert_eq!(action, GestureAction::Link { parent: 8, child: 3 });
        // Mode disarms after one press; no drag was latched either.
        assert_eq!(ctl.pending_link(), None);
        let action = ctl.on_move(Point::new(50.0, 50.0), Point::new(50.0, 50.0));
        assert_eq!(action, GestureAction::None);
    }

    #[test]
    fn link_mode_cancelled_by_empty_press() {
        let mut ctl: DragController<u32> = DragController::new();
        ctl.begin_link(3);
        let action = ctl.on_press(
            Point::new(5.0, 5.0),
            Point::new(5.0, 5.0),
            PressTarget::Empty,
        );
        assert_eq!(action, GestureAction::LinkCancelled);
        assert_eq!(ctl.pending_link(), None);
        // And no pan started from that press.
        assert!(!ctl.is_panning());
    }

    #[test]
    fn cancel_drops_an_in_progress_drag() {
        let mut ctl: DragController<u32> = DragController::new();
        press_label(&mut ctl, 7, Point::new(0.0, 0.0));
        ctl.on_move(Point::new(30.0, 40.0), Point::new(30.0, 40.0));
        assert!(ctl.is_dragging());
        ctl.cancel();
        assert!(!ctl.is_dragging());
        let action = ctl.on_release(Point::new(30.0, 40.0), |_, _| ReleaseTarget::Trash);
        assert_eq!(action, GestureAction::None);
    }
}
