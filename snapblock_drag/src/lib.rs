// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=snapblock_drag --heading-base-level=0

//! Snapblock Drag: from touches on a block to a committed drop.
//!
//! This crate is the host-facing half of the engine. It owns no views and
//! no platform drag machinery; it talks to them through small traits and
//! keeps the gesture logic testable on its own.
//!
//! - [`GestureArbiter`] turns raw [`TouchEvent`]s into clicks and drag
//!   starts. Drag starts are posted to a [`TaskQueue`] the host drains after
//!   dispatching each event.
//! - [`PendingDrag`] records one gesture and is shared by the arbiter and
//!   the session.
//! - [`DragSession`] follows the platform drag: it moves the dragged tree,
//!   highlights the best connection, and on release trashes, connects, or
//!   bumps through [`snapblock_model::Workspace`].
//!
//! The host supplies:
//!
//! - [`RenderableBlock`] and [`ViewFactory`] for the block views,
//! - [`ClipCodec`] to serialize the dragged blocks,
//! - [`DragChannel`] to start the platform drag,
//! - [`DragGroupResolver`] to decide what a touch drags and to receive clicks,
//! - optionally a [`TrashTarget`].
//!
//! Everything is single-threaded and uses `Rc`/`RefCell`.
//!
//! The crate logs with `tracing` and never installs a subscriber.

mod clip;
mod error;
mod gesture;
mod pending;
mod render;
mod session;
mod task;

pub use clip::{ClipCodec, ClipPayload, EncodeError};
pub use error::DragError;
pub use gesture::{
    DragChannel, DragGroupResolver, DragStart, GestureArbiter, GestureConfig, GestureMode,
    TouchAction, TouchEvent,
};
pub use pending::PendingDrag;
pub use render::{DragShadow, RenderableBlock, TrashTarget, ViewFactory};
pub use session::{DragAction, DragEvent, DragSession, DropOutcome};
pub use task::{PendingTask, TaskQueue};
