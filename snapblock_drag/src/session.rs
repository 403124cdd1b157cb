// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The live drag: feedback while moving and the commit on release.
//!
//! A [`DragSession`] is driven by the platform drag channel once the
//! [`GestureArbiter`](crate::GestureArbiter) has handed a gesture over:
//!
//! - `Started` pulls every connection of the dragged tree out of the index,
//!   so the tree cannot snap to itself.
//! - `Location` moves the tree with the pointer and highlights the best
//!   connection, if any.
//! - `Drop` trashes the tree, connects it, or bumps its neighbors, and then
//!   cleans up.
//! - `Ended` cleans up, committing first only if no drop was seen.
//!
//! Cleanup puts the connections back in the index at their final positions
//! and clears every visual flag. It is safe to run more than once.

use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::Rc;

use kurbo::Point;
use snapblock_index::Backend;
use snapblock_model::{BlockId, ConnectionId, Workspace};
use snapblock_view2d::WorkspaceTransform;

use crate::clip::{ClipCodec, ClipPayload};
use crate::error::DragError;
use crate::pending::PendingDrag;
use crate::render::{TrashTarget, ViewFactory};

/// Phase of a platform drag.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DragAction {
    /// The drag began.
    Started,
    /// The pointer moved.
    Location,
    /// The pointer was released over the workspace.
    Drop,
    /// The drag is over. `result` is `true` if some target accepted the drop.
    Ended {
        /// Whether a drop target accepted the drag.
        result: bool,
    },
}

/// A platform drag event.
#[derive(Clone, Debug)]
pub struct DragEvent {
    /// Phase of the drag.
    pub action: DragAction,
    /// Pointer position in view coordinates.
    pub position: Point,
    /// Payload the drag was started with.
    pub payload: ClipPayload,
    /// Local state handed to [`DragChannel::start_drag`](crate::DragChannel::start_drag).
    pub pending: Option<PendingDrag>,
}

impl DragEvent {
    /// Creates an event without local state.
    pub fn new(action: DragAction, position: Point, payload: ClipPayload) -> Self {
        Self {
            action,
            position,
            payload,
            pending: None,
        }
    }

    /// Attaches the pending drag that started the platform drag.
    #[must_use]
    pub fn with_pending(mut self, pending: PendingDrag) -> Self {
        self.pending = Some(pending);
        self
    }
}

/// What a drop did to the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    /// The dragged tree was connected.
    Connected {
        /// Connection on the dragged tree.
        source: ConnectionId,
        /// Connection it joined.
        target: ConnectionId,
    },
    /// No connection was in reach; these roots were pushed aside.
    Bumped(Vec<BlockId>),
    /// The dragged tree was deleted; these blocks are gone.
    Trashed(Vec<BlockId>),
}

/// Drives one platform drag at a time.
pub struct DragSession {
    transform: Rc<RefCell<WorkspaceTransform>>,
    views: Rc<dyn ViewFactory>,
    codec: Rc<dyn ClipCodec>,
    trash: Option<Rc<dyn TrashTarget>>,
    pending: Option<PendingDrag>,
    dragged: Vec<ConnectionId>,
    highlighted: Option<BlockId>,
    last_outcome: Option<DropOutcome>,
}

impl DragSession {
    /// Creates an idle session.
    pub fn new(
        transform: Rc<RefCell<WorkspaceTransform>>,
        views: Rc<dyn ViewFactory>,
        codec: Rc<dyn ClipCodec>,
    ) -> Self {
        Self {
            transform,
            views,
            codec,
            trash: None,
            pending: None,
            dragged: Vec::new(),
            highlighted: None,
            last_outcome: None,
        }
    }

    /// Sets the drop target that deletes blocks.
    pub fn set_trash_target(&mut self, trash: Option<Rc<dyn TrashTarget>>) {
        self.trash = trash;
    }

    /// The gesture being dragged.
    pub fn pending(&self) -> Option<&PendingDrag> {
        self.pending.as_ref()
    }

    /// Returns `true` between an accepted `Started` and cleanup.
    pub fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    /// Connections currently held out of the index.
    pub fn dragged_connections(&self) -> &[ConnectionId] {
        &self.dragged
    }

    /// Result of the most recent drop.
    pub fn last_outcome(&self) -> Option<&DropOutcome> {
        self.last_outcome.as_ref()
    }

    /// Handles a drag channel event. Returns `true` to keep receiving events.
    pub fn on_drag_event<B: Backend>(&mut self, ws: &mut Workspace<B>, event: &DragEvent) -> bool {
        match self.handle(ws, event) {
            Ok(keep) => keep,
            Err(err @ DragError::NotBlockData) => {
                tracing::debug!(%err, "ignoring drag");
                false
            }
            Err(err) => {
                tracing::warn!(%err, action = ?event.action, "drag event rejected");
                false
            }
        }
    }

    /// Abandons the drag: the dragged tree returns to where it started and
    /// nothing is connected or bumped.
    pub fn cancel<B: Backend>(&mut self, ws: &mut Workspace<B>) {
        if let Some(pending) = &self.pending
            && let (Some(root), Some(original)) =
                (pending.root_block(), pending.original_position())
            && let Err(err) = ws.set_position(root, original)
        {
            tracing::warn!(%err, "could not restore dragged block");
        }
        self.finish(ws);
    }

    /// Stops tracking the connections of `block`'s subtree, which is leaving
    /// the dragged group. They go back into the index where they are.
    pub fn remove_from_dragging_connections<B: Backend>(
        &mut self,
        ws: &mut Workspace<B>,
        block: BlockId,
    ) {
        if self.pending.is_none() {
            return;
        }
        for c in ws.all_connections_recursive(block) {
            self.dragged.retain(|d| *d != c);
            if ws.set_drag_mode(c, false).is_ok()
                && let Err(err) = ws.index_add(c)
            {
                tracing::warn!(%err, "could not reindex released connection");
            }
        }
    }

    fn handle<B: Backend>(
        &mut self,
        ws: &mut Workspace<B>,
        event: &DragEvent,
    ) -> Result<bool, DragError> {
        if !self.codec.is_block_data(&event.payload) {
            return Err(DragError::NotBlockData);
        }
        match event.action {
            DragAction::Started => {
                let pending = event.pending.as_ref().ok_or(DragError::MissingPendingDrag)?;
                if let Err(err) = self.start(ws, pending) {
                    // Rejected drags never become live; the arbiter drops
                    // the gesture on its next event.
                    pending.finish();
                    return Err(err);
                }
                Ok(true)
            }
            // Leftover events from a drag that was never accepted.
            _ if self.pending.is_none() => Ok(false),
            DragAction::Location => {
                self.continue_dragging(ws, event.position)?;
                Ok(true)
            }
            DragAction::Drop | DragAction::Ended { result: false } => {
                let committed = self.commit(ws, event.position);
                self.finish(ws);
                committed.map(|()| true)
            }
            DragAction::Ended { result: true } => {
                self.finish(ws);
                Ok(true)
            }
        }
    }

    fn start<B: Backend>(
        &mut self,
        ws: &mut Workspace<B>,
        pending: &PendingDrag,
    ) -> Result<(), DragError> {
        let root = pending.root_block().ok_or(DragError::MissingPendingDrag)?;
        if !ws.is_movable(root) {
            return Err(DragError::Unmovable(root));
        }
        if self.pending.is_some() {
            self.finish(ws);
        }

        self.dragged = ws.all_connections_recursive(root);
        for c in &self.dragged {
            ws.index_remove(*c);
            ws.set_drag_mode(*c, true)?;
        }
        self.pending = Some(pending.clone());
        self.last_outcome = None;
        if let Some(view) = self.views.view(root) {
            view.set_pressed(true);
        }
        tracing::debug!(?root, connections = self.dragged.len(), "drag started");
        Ok(())
    }

    fn continue_dragging<B: Backend>(
        &mut self,
        ws: &mut Workspace<B>,
        position: Point,
    ) -> Result<(), DragError> {
        let Some(pending) = &self.pending else {
            return Ok(());
        };
        let (Some(root), Some(original)) = (pending.root_block(), pending.original_position())
        else {
            return Err(DragError::MissingPendingDrag);
        };
        let (current, snap) = {
            let t = self.transform.borrow();
            (t.view_to_workspace_point(position), t.max_snap_distance())
        };
        ws.set_position(root, original + (current - pending.touch_down_workspace()))?;

        self.clear_highlight();
        if let Some(best) = ws.find_best_connection(root, snap)
            && let Some(block) = ws.connection_block(best.target)
            && let Some(view) = self.views.view(block)
        {
            view.set_highlighted_connection(Some(best.target));
            self.highlighted = Some(block);
        }
        Ok(())
    }

    fn commit<B: Backend>(
        &mut self,
        ws: &mut Workspace<B>,
        position: Point,
    ) -> Result<(), DragError> {
        let Some(root) = self.pending.as_ref().and_then(PendingDrag::root_block) else {
            return Ok(());
        };

        let screen = self.transform.borrow().view_to_screen_point(position);
        if let Some(trash) = &self.trash
            && trash.contains_screen_point(screen)
        {
            match ws.remove_block(root) {
                Ok(removed) => {
                    self.dragged.clear();
                    tracing::debug!(?root, "dropped in trash");
                    self.last_outcome = Some(DropOutcome::Trashed(removed));
                    return Ok(());
                }
                Err(err) => tracing::warn!(%err, "cannot trash dragged block; dropping in place"),
            }
        }

        let snap = self.transform.borrow().max_snap_distance();
        let outcome = match ws.find_best_connection(root, snap) {
            Some(best) => {
                ws.connect(best.source, best.target)?;
                DropOutcome::Connected {
                    source: best.source,
                    target: best.target,
                }
            }
            None => DropOutcome::Bumped(ws.bump_neighbors(root)?),
        };
        tracing::debug!(?root, ?outcome, "drop committed");
        self.last_outcome = Some(outcome);
        Ok(())
    }

    /// Returns the session to idle. Idempotent.
    fn finish<B: Backend>(&mut self, ws: &mut Workspace<B>) {
        for c in mem::take(&mut self.dragged) {
            // Connections of removed blocks are gone.
            if ws.set_drag_mode(c, false).is_err() {
                continue;
            }
            if let Err(err) = ws.index_add(c) {
                tracing::warn!(%err, "could not reindex connection");
            }
        }
        self.clear_highlight();
        if let Some(pending) = self.pending.take() {
            if let Some(view) = pending.root_block().and_then(|root| self.views.view(root)) {
                view.set_pressed(false);
            }
            pending.finish();
            tracing::debug!(root = ?pending.root_block(), "drag finished");
        }
    }

    fn clear_highlight(&mut self) {
        if let Some(block) = self.highlighted.take()
            && let Some(view) = self.views.view(block)
        {
            view.set_highlighted_connection(None);
        }
    }
}

impl fmt::Debug for DragSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragSession")
            .field("pending", &self.pending)
            .field("dragged", &self.dragged)
            .field("highlighted", &self.highlighted)
            .field("last_outcome", &self.last_outcome)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    use kurbo::{Point, Rect, Size, Vec2};
    use snapblock_model::{BlockId, BlockSpec, ConnectionId, ConnectionKind, Workspace};
    use snapblock_view2d::WorkspaceTransform;
    use tracing_test::traced_test;

    use super::{DragAction, DragEvent, DragSession, DropOutcome};
    use crate::clip::{ClipCodec, ClipPayload, EncodeError};
    use crate::gesture::{TouchAction, TouchEvent};
    use crate::pending::PendingDrag;
    use crate::render::{RenderableBlock, TrashTarget, ViewFactory};

    const MIME: &str = "application/x-test-block";

    #[derive(Default)]
    struct View {
        pressed: Cell<bool>,
        highlighted: Cell<Option<ConnectionId>>,
    }

    impl RenderableBlock for View {
        fn position(&self) -> Point {
            Point::ZERO
        }
        fn size(&self) -> Size {
            Size::new(80.0, 40.0)
        }
        fn set_pressed(&self, pressed: bool) {
            self.pressed.set(pressed);
        }
        fn set_highlighted_connection(&self, connection: Option<ConnectionId>) {
            self.highlighted.set(connection);
        }
    }

    #[derive(Default)]
    struct Views(RefCell<HashMap<BlockId, Rc<View>>>);

    impl Views {
        fn get(&self, block: BlockId) -> Rc<View> {
            self.0.borrow_mut().entry(block).or_default().clone()
        }
    }

    impl ViewFactory for Views {
        fn view(&self, block: BlockId) -> Option<Rc<dyn RenderableBlock>> {
            Some(self.get(block))
        }
    }

    struct Codec;

    impl ClipCodec for Codec {
        fn encode(&self, _: &PendingDrag) -> Result<ClipPayload, EncodeError> {
            Ok(ClipPayload::new(MIME, ""))
        }
        fn is_block_data(&self, payload: &ClipPayload) -> bool {
            payload.mime_type == MIME
        }
    }

    struct Trash;

    impl TrashTarget for Trash {
        fn screen_rect(&self) -> Rect {
            Rect::new(300.0, 200.0, 400.0, 300.0)
        }
    }

    struct Fixture {
        ws: Workspace,
        session: DragSession,
        views: Rc<Views>,
    }

    fn fixture() -> Fixture {
        let transform = Rc::new(RefCell::new(WorkspaceTransform::new(Rect::new(
            0.0, 0.0, 400.0, 300.0,
        ))));
        transform.borrow_mut().set_max_snap_distance(20.0);
        let views = Rc::new(Views::default());
        let session = DragSession::new(transform, views.clone(), Rc::new(Codec));
        Fixture {
            ws: Workspace::new(),
            session,
            views,
        }
    }

    fn grab(ws: &Workspace, block: BlockId, at: Point) -> PendingDrag {
        let down = TouchEvent::new(0, TouchAction::Down, at);
        let pending = PendingDrag::new(&down, block, at);
        pending.start_drag(block, ws.position(block).unwrap());
        pending
    }

    fn event(action: DragAction, x: f64, y: f64) -> DragEvent {
        DragEvent::new(action, Point::new(x, y), ClipPayload::new(MIME, ""))
    }

    impl Fixture {
        fn start(&mut self, pending: &PendingDrag) -> bool {
            let ev = event(DragAction::Started, 0.0, 0.0).with_pending(pending.clone());
            self.session.on_drag_event(&mut self.ws, &ev)
        }

        fn send(&mut self, action: DragAction, x: f64, y: f64) -> bool {
            self.session.on_drag_event(&mut self.ws, &event(action, x, y))
        }
    }

    #[test]
    fn started_pulls_dragged_tree_out_of_the_index() {
        let mut f = fixture();
        let a = f.ws.add_block(BlockSpec::statement("a", Point::new(100.0, 100.0), 20.0));
        f.ws.add_block(BlockSpec::statement("b", Point::ZERO, 20.0));
        let pending = grab(&f.ws, a, Point::new(100.0, 100.0));

        assert!(f.start(&pending));

        assert_eq!(f.ws.index().len(), 2);
        assert_eq!(f.session.dragged_connections().len(), 2);
        for c in f.ws.connections(a) {
            assert!(f.ws.in_drag_mode(*c));
        }
        assert!(f.views.get(a).pressed.get());
    }

    #[test]
    #[traced_test]
    fn unmovable_block_is_rejected_with_a_warning() {
        let mut f = fixture();
        let a = f.ws.add_block(BlockSpec::statement("a", Point::ZERO, 20.0).movable(false));
        let pending = grab(&f.ws, a, Point::ZERO);

        assert!(!f.start(&pending));

        assert!(logs_contain("is not movable"));
        assert!(!f.session.is_active());
        assert!(!pending.is_alive());
        assert_eq!(f.ws.index().len(), 2);
        assert!(!f.views.get(a).pressed.get());
    }

    #[test]
    fn foreign_payloads_are_ignored() {
        let mut f = fixture();
        let a = f.ws.add_block(BlockSpec::new("a", Point::ZERO));
        let pending = grab(&f.ws, a, Point::ZERO);
        let payload = ClipPayload::new("text/plain", "hi");
        let ev = DragEvent::new(DragAction::Started, Point::ZERO, payload).with_pending(pending);

        assert!(!f.session.on_drag_event(&mut f.ws, &ev));
        assert!(!f.session.is_active());
    }

    #[test]
    fn location_moves_by_workspace_delta_and_highlights_one_target() {
        let mut f = fixture();
        let stay = f.ws.add_block(BlockSpec::statement("stay", Point::new(0.0, 0.0), 20.0));
        let moving = f.ws.add_block(BlockSpec::statement("mv", Point::new(200.0, 100.0), 20.0));
        let pending = grab(&f.ws, moving, Point::new(210.0, 105.0));
        f.start(&pending);

        // Pointer travels by (-205, -80): block lands at (-5, 20), 5 from stay's next.
        assert!(f.send(DragAction::Location, 5.0, 25.0));
        assert_eq!(f.ws.position(moving), Some(Point::new(-5.0, 20.0)));
        let stay_next = f.ws.connection_of_kind(stay, ConnectionKind::Next).unwrap();
        assert_eq!(f.views.get(stay).highlighted.get(), Some(stay_next));

        // Far away again: highlight cleared.
        f.send(DragAction::Location, 300.0, 25.0);
        assert_eq!(f.views.get(stay).highlighted.get(), None);
    }

    #[test]
    fn drop_connects_to_best_candidate_and_cleans_up() {
        let mut f = fixture();
        let stay = f.ws.add_block(BlockSpec::statement("stay", Point::ZERO, 20.0));
        let moving = f.ws.add_block(BlockSpec::statement("mv", Point::new(200.0, 100.0), 20.0));
        let before = f.ws.index().len();
        let pending = grab(&f.ws, moving, Point::new(200.0, 100.0));
        f.start(&pending);

        f.send(DragAction::Location, 3.0, 24.0);
        assert!(f.send(DragAction::Drop, 3.0, 24.0));

        assert_eq!(f.ws.next_block(stay), Some(moving));
        assert_eq!(f.ws.position(moving), Some(Point::new(0.0, 20.0)));
        assert!(matches!(
            f.session.last_outcome(),
            Some(DropOutcome::Connected { .. })
        ));
        assert_eq!(f.ws.index().len(), before);
        assert!(!f.session.is_active());
        assert!(!pending.is_alive());
        assert!(!f.views.get(moving).pressed.get());
        assert_eq!(f.views.get(stay).highlighted.get(), None);
        for c in f.ws.connections(moving) {
            assert!(!f.ws.in_drag_mode(*c));
            assert_eq!(f.ws.index().position(c), f.ws.connection_position(*c));
        }
    }

    #[test]
    fn ended_after_drop_does_not_commit_twice() {
        let mut f = fixture();
        let moving = f.ws.add_block(BlockSpec::statement("mv", Point::ZERO, 20.0));
        let crowd = f.ws.add_block(BlockSpec::statement("crowd", Point::new(100.0, 0.0), 20.0));
        let pending = grab(&f.ws, moving, Point::ZERO);
        f.start(&pending);

        f.send(DragAction::Location, 95.0, 0.0);
        f.send(DragAction::Drop, 95.0, 0.0);
        let after_drop = f.ws.position(crowd);
        assert_ne!(after_drop, Some(Point::new(100.0, 0.0)));

        assert!(!f.send(DragAction::Ended { result: false }, 95.0, 0.0));
        assert_eq!(f.ws.position(crowd), after_drop);
    }

    #[test]
    fn ended_without_drop_commits_once() {
        let mut f = fixture();
        let stay = f.ws.add_block(BlockSpec::statement("stay", Point::ZERO, 20.0));
        let moving = f.ws.add_block(BlockSpec::statement("mv", Point::new(200.0, 100.0), 20.0));
        let pending = grab(&f.ws, moving, Point::new(200.0, 100.0));
        f.start(&pending);

        f.send(DragAction::Location, 2.0, 21.0);
        assert!(f.send(DragAction::Ended { result: false }, 2.0, 21.0));

        assert_eq!(f.ws.next_block(stay), Some(moving));
        assert!(!f.session.is_active());
    }

    #[test]
    fn ended_with_result_only_cleans_up() {
        let mut f = fixture();
        let stay = f.ws.add_block(BlockSpec::statement("stay", Point::ZERO, 20.0));
        let moving = f.ws.add_block(BlockSpec::statement("mv", Point::new(200.0, 100.0), 20.0));
        let pending = grab(&f.ws, moving, Point::new(200.0, 100.0));
        f.start(&pending);

        f.send(DragAction::Location, 2.0, 21.0);
        assert!(f.send(DragAction::Ended { result: true }, 2.0, 21.0));

        assert_eq!(f.ws.next_block(stay), None);
        assert!(f.session.last_outcome().is_none());
        assert_eq!(f.ws.index().len(), 4);
    }

    #[test]
    fn drop_over_trash_removes_the_tree() {
        let mut f = fixture();
        f.session.set_trash_target(Some(Rc::new(Trash)));
        let keep = f.ws.add_block(BlockSpec::statement("keep", Point::ZERO, 20.0));
        let doomed = f.ws.add_block(BlockSpec::statement("doomed", Point::new(100.0, 100.0), 20.0));
        let child = f.ws.add_block(BlockSpec::statement("child", Point::new(100.0, 120.0), 20.0));
        let next = f.ws.connection_of_kind(doomed, ConnectionKind::Next).unwrap();
        let prev = f.ws.connection_of_kind(child, ConnectionKind::Previous).unwrap();
        f.ws.connect(prev, next).unwrap();
        let pending = grab(&f.ws, doomed, Point::new(100.0, 100.0));
        f.start(&pending);

        f.send(DragAction::Location, 350.0, 250.0);
        assert!(f.send(DragAction::Drop, 350.0, 250.0));

        assert_eq!(
            f.session.last_outcome(),
            Some(&DropOutcome::Trashed(vec![doomed, child]))
        );
        assert!(!f.ws.contains_block(doomed));
        assert!(!f.ws.contains_block(child));
        assert!(f.ws.contains_block(keep));
        assert_eq!(f.ws.index().len(), 2);
        assert!(f.session.dragged_connections().is_empty());
    }

    #[test]
    fn undeletable_block_over_trash_is_dropped_in_place() {
        let mut f = fixture();
        f.session.set_trash_target(Some(Rc::new(Trash)));
        let block = f
            .ws
            .add_block(BlockSpec::statement("b", Point::new(100.0, 100.0), 20.0).deletable(false));
        let pending = grab(&f.ws, block, Point::new(100.0, 100.0));
        f.start(&pending);

        f.send(DragAction::Drop, 350.0, 250.0);

        assert!(f.ws.contains_block(block));
        assert!(matches!(f.session.last_outcome(), Some(DropOutcome::Bumped(_))));
        assert_eq!(f.ws.index().len(), 2);
    }

    #[test]
    fn cleanup_is_idempotent() {
        let mut f = fixture();
        let a = f.ws.add_block(BlockSpec::statement("a", Point::ZERO, 20.0));
        let pending = grab(&f.ws, a, Point::ZERO);
        f.start(&pending);
        f.send(DragAction::Drop, 0.0, 0.0);
        let len = f.ws.index().len();

        f.session.finish(&mut f.ws);
        f.session.cancel(&mut f.ws);

        assert_eq!(f.ws.index().len(), len);
        assert_eq!(len, 2);
    }

    #[test]
    fn cancel_restores_position_without_commit() {
        let mut f = fixture();
        let stay = f.ws.add_block(BlockSpec::statement("stay", Point::ZERO, 20.0));
        let moving = f.ws.add_block(BlockSpec::statement("mv", Point::new(200.0, 100.0), 20.0));
        let pending = grab(&f.ws, moving, Point::new(200.0, 100.0));
        f.start(&pending);
        f.send(DragAction::Location, 1.0, 20.0);

        f.session.cancel(&mut f.ws);

        assert_eq!(f.ws.position(moving), Some(Point::new(200.0, 100.0)));
        assert_eq!(f.ws.next_block(stay), None);
        assert_eq!(f.ws.index().len(), 4);
        assert!(f.session.last_outcome().is_none());
    }

    #[test]
    fn block_leaving_the_group_is_reindexed() {
        let mut f = fixture();
        let parent = f.ws.add_block(BlockSpec::statement("p", Point::ZERO, 20.0));
        let child = f.ws.add_block(BlockSpec::statement("c", Point::new(0.0, 20.0), 20.0));
        let next = f.ws.connection_of_kind(parent, ConnectionKind::Next).unwrap();
        let prev = f.ws.connection_of_kind(child, ConnectionKind::Previous).unwrap();
        f.ws.connect(prev, next).unwrap();
        let pending = grab(&f.ws, parent, Point::ZERO);
        f.start(&pending);
        assert_eq!(f.session.dragged_connections().len(), 4);

        f.ws.unplug(child).unwrap();
        f.ws.move_by(child, Vec2::new(300.0, 0.0)).unwrap();
        f.session.remove_from_dragging_connections(&mut f.ws, child);

        assert_eq!(f.session.dragged_connections().len(), 2);
        assert!(f.ws.index().contains(&prev));
        assert!(!f.ws.in_drag_mode(prev));
    }

    #[test]
    fn events_without_an_accepted_start_are_ignored() {
        let mut f = fixture();
        f.ws.add_block(BlockSpec::new("a", Point::ZERO));
        assert!(!f.send(DragAction::Location, 1.0, 1.0));
        assert!(!f.send(DragAction::Drop, 1.0, 1.0));
        assert!(f.session.last_outcome().is_none());
    }
}
