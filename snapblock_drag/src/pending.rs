// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pending drag: the record of one touch gesture on a block.
//!
//! ## Lifecycle
//!
//! 1) The arbiter creates a [`PendingDrag`] on touch-down, recording where
//!    the touch landed in screen and workspace coordinates.
//! 2) Moves that travel beyond the slop mark it with
//!    [`PendingDrag::mark_beyond_slop`]; a release that never did is a click.
//! 3) A drag-start action promotes it with [`PendingDrag::start_drag`],
//!    naming the root of the dragged group.
//! 4) Release, cancel, or the end of the drag session retires it.
//!
//! A `PendingDrag` is a shared handle: clones observe the same gesture, so
//! the arbiter and the drag session agree on its state without copying.
//!
//! ```
//! use kurbo::Point;
//! use snapblock_drag::{PendingDrag, TouchAction, TouchEvent};
//! # use snapblock_model::{BlockSpec, Workspace};
//! # let mut ws = Workspace::new();
//! # let block = ws.add_block(BlockSpec::new("b", Point::new(10.0, 10.0)));
//!
//! let down = TouchEvent::new(0, TouchAction::Down, Point::new(12.0, 14.0));
//! let pending = PendingDrag::new(&down, block, Point::new(12.0, 14.0));
//! assert!(pending.is_click());
//!
//! pending.start_drag(block, Point::new(10.0, 10.0));
//! assert!(pending.is_dragging());
//! assert_eq!(pending.touch_offset().map(|v| (v.x, v.y)), Some((2.0, 4.0)));
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use kurbo::{Point, Vec2};
use snapblock_model::BlockId;

use crate::gesture::{TouchAction, TouchEvent};

/// The dragged group, set once the gesture becomes a drag.
#[derive(Clone, Copy, Debug, PartialEq)]
struct DragGroup {
    root: BlockId,
    original_position: Point,
}

struct Inner {
    pointer_id: u32,
    touched_block: BlockId,
    touch_down_screen: Point,
    touch_down_workspace: Point,
    alive: Cell<bool>,
    beyond_slop: Cell<bool>,
    group: Cell<Option<DragGroup>>,
}

/// Shared record of one touch gesture that may become a drag.
#[derive(Clone)]
pub struct PendingDrag {
    inner: Rc<Inner>,
}

impl PendingDrag {
    /// Starts tracking the gesture begun by `down` on `touched_block`.
    ///
    /// `touch_down_workspace` is the down position converted to workspace
    /// coordinates.
    pub fn new(down: &TouchEvent, touched_block: BlockId, touch_down_workspace: Point) -> Self {
        Self {
            inner: Rc::new(Inner {
                pointer_id: down.pointer_id,
                touched_block,
                touch_down_screen: down.position,
                touch_down_workspace,
                alive: Cell::new(true),
                beyond_slop: Cell::new(false),
                group: Cell::new(None),
            }),
        }
    }

    /// Pointer that began the gesture.
    pub fn pointer_id(&self) -> u32 {
        self.inner.pointer_id
    }

    /// Block whose view received the touch-down.
    pub fn touched_block(&self) -> BlockId {
        self.inner.touched_block
    }

    /// Touch-down position in screen coordinates.
    pub fn touch_down_screen(&self) -> Point {
        self.inner.touch_down_screen
    }

    /// Touch-down position in workspace coordinates.
    pub fn touch_down_workspace(&self) -> Point {
        self.inner.touch_down_workspace
    }

    /// Returns `true` until the gesture is released, cancelled or finished.
    pub fn is_alive(&self) -> bool {
        self.inner.alive.get()
    }

    /// Returns `true` once a drag group has been chosen.
    pub fn is_dragging(&self) -> bool {
        self.inner.group.get().is_some()
    }

    /// Returns `true` if the touch has stayed within the slop and no drag started.
    pub fn is_click(&self) -> bool {
        !self.is_dragging() && !self.inner.beyond_slop.get()
    }

    /// Records that the touch travelled beyond the slop.
    pub fn mark_beyond_slop(&self) {
        self.inner.beyond_slop.set(true);
    }

    /// Promotes the gesture to a drag of the tree rooted at `root`, which
    /// currently sits at `original_position`.
    pub fn start_drag(&self, root: BlockId, original_position: Point) {
        self.inner.group.set(Some(DragGroup {
            root,
            original_position,
        }));
    }

    /// Root of the dragged group.
    pub fn root_block(&self) -> Option<BlockId> {
        self.inner.group.get().map(|g| g.root)
    }

    /// Position of the dragged root when the drag started.
    pub fn original_position(&self) -> Option<Point> {
        self.inner.group.get().map(|g| g.original_position)
    }

    /// Touch-down position relative to the dragged root, in workspace units.
    pub fn touch_offset(&self) -> Option<Vec2> {
        self.inner
            .group
            .get()
            .map(|g| self.inner.touch_down_workspace - g.original_position)
    }

    /// Returns `true` if `other` is a handle to the same gesture.
    pub fn same_gesture(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Checks whether `event` on `block` belongs to this gesture.
    ///
    /// A matching release or cancel retires the gesture.
    pub fn is_match_and_processed(&self, event: &TouchEvent, block: BlockId) -> bool {
        if !self.is_alive() {
            return false;
        }
        let matches =
            block == self.inner.touched_block && event.pointer_id == self.inner.pointer_id;
        if matches && matches!(event.action, TouchAction::Up | TouchAction::Cancel) {
            self.inner.alive.set(false);
        }
        matches
    }

    /// Retires the gesture.
    pub(crate) fn finish(&self) {
        self.inner.alive.set(false);
    }
}

impl fmt::Debug for PendingDrag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingDrag")
            .field("pointer_id", &self.inner.pointer_id)
            .field("touched_block", &self.inner.touched_block)
            .field("alive", &self.inner.alive.get())
            .field("root", &self.root_block())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Vec2};
    use snapblock_model::{BlockSpec, Workspace};

    use super::PendingDrag;
    use crate::gesture::{TouchAction, TouchEvent};

    fn pending() -> (PendingDrag, snapblock_model::BlockId, snapblock_model::BlockId) {
        let mut ws = Workspace::new();
        let a = ws.add_block(BlockSpec::new("a", Point::ZERO));
        let b = ws.add_block(BlockSpec::new("b", Point::ZERO));
        let down = TouchEvent::new(3, TouchAction::Down, Point::new(5.0, 5.0));
        (PendingDrag::new(&down, a, Point::new(50.0, 60.0)), a, b)
    }

    #[test]
    fn new_pending_drag_is_an_alive_click() {
        let (p, a, _) = pending();
        assert!(p.is_alive());
        assert!(p.is_click());
        assert!(!p.is_dragging());
        assert_eq!(p.touched_block(), a);
        assert_eq!(p.root_block(), None);
        assert_eq!(p.touch_offset(), None);
    }

    #[test]
    fn moving_beyond_slop_is_not_a_click() {
        let (p, _, _) = pending();
        p.mark_beyond_slop();
        assert!(!p.is_click());
        assert!(!p.is_dragging());
    }

    #[test]
    fn start_drag_records_group_and_offset() {
        let (p, _, b) = pending();
        p.start_drag(b, Point::new(40.0, 40.0));
        assert!(p.is_dragging());
        assert!(!p.is_click());
        assert_eq!(p.root_block(), Some(b));
        assert_eq!(p.original_position(), Some(Point::new(40.0, 40.0)));
        assert_eq!(p.touch_offset(), Some(Vec2::new(10.0, 20.0)));
    }

    #[test]
    fn match_requires_same_block_and_pointer() {
        let (p, a, b) = pending();
        let mv = TouchEvent::new(3, TouchAction::Move, Point::new(6.0, 6.0));
        let other_pointer = TouchEvent::new(4, TouchAction::Move, Point::new(6.0, 6.0));

        assert!(p.is_match_and_processed(&mv, a));
        assert!(!p.is_match_and_processed(&mv, b));
        assert!(!p.is_match_and_processed(&other_pointer, a));
        assert!(p.is_alive());
    }

    #[test]
    fn release_retires_the_gesture() {
        let (p, a, _) = pending();
        let up = TouchEvent::new(3, TouchAction::Up, Point::new(6.0, 6.0));
        assert!(p.is_match_and_processed(&up, a));
        assert!(!p.is_alive());
        assert!(!p.is_match_and_processed(&up, a));
    }

    #[test]
    fn clones_share_state() {
        let (p, _, b) = pending();
        let q = p.clone();
        q.start_drag(b, Point::ZERO);
        assert!(p.is_dragging());
        assert!(p.same_gesture(&q));
        q.finish();
        assert!(!p.is_alive());
    }
}
