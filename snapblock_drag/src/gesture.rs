// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture arbitration: decides when touches on a block become a drag.
//!
//! Each block view forwards its touches twice: once while they are being
//! intercepted on the way down to child views (such as an editable field),
//! and once when delivered directly. The [`GestureArbiter`] sees both and
//! keeps a single [`PendingDrag`] per gesture.
//!
//! # State machine
//!
//! ```text
//!  Idle ──down──▶ Touched ──move beyond slop / immediate──▶ (drag start posted)
//!                  │                                          │ task runs
//!                  │ up/cancel                                ▼
//!                  ▼                                       Dragging ──drag channel──▶ …
//!          Click (if within slop, direct) ──▶ Idle
//! ```
//!
//! Drag starts never run inline. They go through the [`TaskQueue`] and, when
//! the host drains it, the resolver's action picks the dragged group, the
//! group is encoded with the [`ClipCodec`], and the [`DragChannel`] takes
//! over. From then on raw touches are not consumed.
//!
//! # Reentrancy
//!
//! [`GestureArbiter::on_touch`] panics if it is entered again while it is
//! still handling an event. Resolvers must not dispatch touches.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use kurbo::Point;
use snapblock_model::BlockId;
use snapblock_view2d::WorkspaceTransform;

use crate::clip::{ClipCodec, ClipPayload};
use crate::error::DragError;
use crate::pending::PendingDrag;
use crate::render::{DragShadow, ViewFactory};
use crate::task::{PendingTask, TaskQueue};

/// Phase of a touch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TouchAction {
    /// First contact.
    Down,
    /// Contact moved.
    Move,
    /// Contact lifted.
    Up,
    /// The platform took the gesture away.
    Cancel,
}

/// One touch sample, in screen coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TouchEvent {
    /// Pointer that produced the sample.
    pub pointer_id: u32,
    /// Phase of the touch.
    pub action: TouchAction,
    /// Screen position.
    pub position: Point,
}

impl TouchEvent {
    /// Creates a touch sample.
    pub fn new(pointer_id: u32, action: TouchAction, position: Point) -> Self {
        Self {
            pointer_id,
            action,
            position,
        }
    }
}

/// When a touch becomes a drag.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum GestureMode {
    /// A direct touch starts dragging right away.
    Immediate,
    /// Dragging starts only once the touch leaves the slop circle.
    #[default]
    Sloppy,
}

/// Gesture tunables.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GestureConfig {
    /// Travel, in screen pixels, a touch may wander and still be a click (default: 8).
    pub touch_slop: f64,
}

impl GestureConfig {
    /// Squared slop, compared against squared travel.
    pub fn touch_slop_squared(&self) -> f64 {
        self.touch_slop * self.touch_slop
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self { touch_slop: 8.0 }
    }
}

/// Deferred action that chooses the dragged group.
///
/// The closure runs from the task queue and is expected to call
/// [`PendingDrag::start_drag`]; if it does not, the gesture is dropped.
pub struct DragStart {
    action: Box<dyn FnOnce(&PendingDrag)>,
}

impl DragStart {
    /// Wraps an arbitrary drag-group creator.
    pub fn new(action: impl FnOnce(&PendingDrag) + 'static) -> Self {
        Self {
            action: Box::new(action),
        }
    }

    /// Drags the tree rooted at `root`, currently at `position`.
    pub fn root(root: BlockId, position: Point) -> Self {
        Self::new(move |pending| pending.start_drag(root, position))
    }

    fn run(self, pending: &PendingDrag) {
        (self.action)(pending);
    }
}

impl fmt::Debug for DragStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragStart").finish_non_exhaustive()
    }
}

/// App policy for block gestures.
pub trait DragGroupResolver {
    /// Decides whether `pending` may start a drag, and of what.
    ///
    /// Called synchronously while the arbiter handles the event; the
    /// returned action runs later.
    fn maybe_drag_start(&self, pending: &PendingDrag) -> Option<DragStart>;

    /// The touch was a click on `pending.touched_block()`.
    fn on_block_clicked(&self, pending: &PendingDrag);
}

/// The platform drag-and-drop channel.
pub trait DragChannel {
    /// Starts a platform drag carrying `payload`, with `pending` as local state.
    fn start_drag(&mut self, payload: ClipPayload, shadow: DragShadow, pending: PendingDrag);
}

#[derive(Default)]
struct ArbiterState {
    pending: Option<PendingDrag>,
    scheduled: Option<PendingTask>,
}

impl ArbiterState {
    /// Drops the gesture along with any drag start it still has queued.
    fn clear(&mut self) {
        self.pending = None;
        if let Some(task) = self.scheduled.take() {
            task.cancel();
        }
    }

    fn is_dragging(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| p.is_alive() && p.is_dragging())
    }
}

/// Collaborators the deferred drag start needs.
struct Starter {
    state: Weak<RefCell<ArbiterState>>,
    transform: Rc<RefCell<WorkspaceTransform>>,
    views: Rc<dyn ViewFactory>,
    codec: Rc<dyn ClipCodec>,
    channel: Rc<RefCell<dyn DragChannel>>,
}

impl Starter {
    fn run(&self, start: DragStart, pending: PendingDrag) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        if !pending.is_alive() {
            tracing::debug!(block = ?pending.touched_block(), "gesture ended before drag start");
            return;
        }
        if state.borrow().is_dragging() {
            tracing::debug!("drag already live; skipping deferred drag start");
            return;
        }

        start.run(&pending);
        if !pending.is_dragging() {
            tracing::debug!(block = ?pending.touched_block(), "no drag group chosen");
            state.borrow_mut().clear();
            return;
        }

        state.borrow_mut().pending = Some(pending.clone());
        match self.encode(&pending) {
            Ok((payload, shadow)) => {
                tracing::debug!(root = ?pending.root_block(), "starting drag");
                self.channel.borrow_mut().start_drag(payload, shadow, pending);
            }
            Err(err) => {
                tracing::warn!(%err, "could not start drag");
                state.borrow_mut().clear();
            }
        }
    }

    fn encode(&self, pending: &PendingDrag) -> Result<(ClipPayload, DragShadow), DragError> {
        let payload = self.codec.encode(pending)?;
        let touch_view = self
            .transform
            .borrow()
            .screen_to_view_point(pending.touch_down_screen());
        let shadow = pending
            .root_block()
            .and_then(|root| self.views.view(root))
            .map(|view| DragShadow {
                size: view.size(),
                touch_point: (touch_view - view.position()).to_point(),
            })
            .unwrap_or_default();
        Ok((payload, shadow))
    }
}

/// Clears the reentrancy flag when the handler returns or unwinds.
struct EnterGuard<'a>(&'a Cell<bool>);

impl<'a> EnterGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        if flag.replace(true) {
            panic!(
                "GestureArbiter::on_touch called reentrantly; \
                 DragGroupResolver::maybe_drag_start must not dispatch touch events"
            );
        }
        Self(flag)
    }
}

impl Drop for EnterGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Turns raw block touches into clicks and drag starts.
pub struct GestureArbiter {
    config: GestureConfig,
    tasks: TaskQueue,
    state: Rc<RefCell<ArbiterState>>,
    starter: Rc<Starter>,
    handling: Cell<bool>,
}

impl GestureArbiter {
    /// Creates an arbiter.
    ///
    /// `tasks` is drained by the host after each dispatched event.
    pub fn new(
        config: GestureConfig,
        transform: Rc<RefCell<WorkspaceTransform>>,
        tasks: TaskQueue,
        views: Rc<dyn ViewFactory>,
        codec: Rc<dyn ClipCodec>,
        channel: Rc<RefCell<dyn DragChannel>>,
    ) -> Self {
        let state = Rc::new(RefCell::new(ArbiterState::default()));
        let starter = Rc::new(Starter {
            state: Rc::downgrade(&state),
            transform,
            views,
            codec,
            channel,
        });
        Self {
            config,
            tasks,
            state,
            starter,
            handling: Cell::new(false),
        }
    }

    /// Current tunables.
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// The gesture in progress, if any.
    pub fn pending(&self) -> Option<PendingDrag> {
        self.state.borrow().pending.clone()
    }

    /// Returns `true` while the current gesture is a live drag.
    pub fn is_dragging(&self) -> bool {
        self.state.borrow().is_dragging()
    }

    /// Handles a touch on `block`'s view. Returns `true` if the event was consumed.
    ///
    /// `intercept` is `true` when the touch is seen on its way to a child
    /// view. Intercepted touches are only consumed when they start a drag,
    /// so children such as fields keep working.
    ///
    /// # Panics
    ///
    /// Panics if called while another call is still running.
    pub fn on_touch<R>(
        &self,
        mode: GestureMode,
        resolver: &R,
        block: BlockId,
        event: &TouchEvent,
        intercept: bool,
    ) -> bool
    where
        R: DragGroupResolver + ?Sized,
    {
        let _guard = EnterGuard::enter(&self.handling);

        let mut matches = false;
        let pending = {
            let mut state = self.state.borrow_mut();
            if let Some(p) = &state.pending {
                matches = p.is_match_and_processed(event, block);
                if !matches && !p.is_alive() {
                    // Left over from an earlier gesture.
                    state.clear();
                }
            }
            state.pending.clone()
        };

        let consumed = match (event.action, pending) {
            (TouchAction::Down, None) => {
                let workspace = self
                    .starter
                    .transform
                    .borrow()
                    .screen_to_workspace_point(event.position);
                let pending = PendingDrag::new(event, block, workspace);
                self.state.borrow_mut().pending = Some(pending.clone());
                tracing::debug!(?block, pointer = event.pointer_id, intercept, "touch down");
                if intercept {
                    false
                } else {
                    self.press(block, true);
                    mode == GestureMode::Sloppy || self.maybe_start_drag(resolver, pending)
                }
            }
            (TouchAction::Down, Some(pending)) if matches && !intercept => {
                // Created while intercepting; no child took the touch.
                self.press(block, true);
                mode == GestureMode::Sloppy || self.maybe_start_drag(resolver, pending)
            }
            (_, Some(pending)) if matches => match event.action {
                TouchAction::Move if pending.is_dragging() => false,
                TouchAction::Move => {
                    let beyond = self.is_beyond_slop(&pending, event.position);
                    if beyond {
                        pending.mark_beyond_slop();
                    }
                    let is_drag = (!intercept && mode == GestureMode::Immediate) || beyond;
                    let started = is_drag && self.maybe_start_drag(resolver, pending);
                    started || !intercept
                }
                TouchAction::Up | TouchAction::Cancel => {
                    if !pending.is_dragging() {
                        if self.is_beyond_slop(&pending, event.position) {
                            pending.mark_beyond_slop();
                        }
                        if !intercept && pending.is_click() {
                            tracing::debug!(?block, "block clicked");
                            resolver.on_block_clicked(&pending);
                        }
                        self.press(pending.touched_block(), false);
                        self.clear_if(&pending);
                    }
                    !intercept
                }
                TouchAction::Down => false,
            },
            _ => false,
        };
        tracing::trace!(?block, action = ?event.action, intercept, consumed, "touch handled");
        consumed
    }

    /// Squared screen travel strictly exceeds the squared slop.
    fn is_beyond_slop(&self, pending: &PendingDrag, position: Point) -> bool {
        (position - pending.touch_down_screen()).hypot2() > self.config.touch_slop_squared()
    }

    fn maybe_start_drag<R>(&self, resolver: &R, pending: PendingDrag) -> bool
    where
        R: DragGroupResolver + ?Sized,
    {
        let Some(start) = resolver.maybe_drag_start(&pending) else {
            return false;
        };
        let starter = Rc::clone(&self.starter);
        let handle = self.tasks.post(move || starter.run(start, pending));
        if let Some(previous) = self.state.borrow_mut().scheduled.replace(handle) {
            previous.cancel();
        }
        true
    }

    fn press(&self, block: BlockId, pressed: bool) {
        if let Some(view) = self.starter.views.view(block) {
            view.set_pressed(pressed);
        }
    }

    fn clear_if(&self, pending: &PendingDrag) {
        let mut state = self.state.borrow_mut();
        if state.pending.as_ref().is_some_and(|p| p.same_gesture(pending)) {
            state.clear();
        }
    }
}

impl fmt::Debug for GestureArbiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureArbiter")
            .field("config", &self.config)
            .field("pending", &self.state.borrow().pending)
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}
