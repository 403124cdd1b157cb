// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=snapblock_model --heading-base-level=0

//! Snapblock Model: blocks, connections, and the mutations that join them.
//!
//! A [`Workspace`] owns a forest of blocks. Each block carries typed
//! connections ([`ConnectionKind`]); a parent block holds children in its
//! `Input` and `Next` slots. The workspace keeps every connection that is not
//! being dragged in a [`snapblock_index::ConnectionIndex`] at its current
//! position, so snapping searches stay cheap.
//!
//! - [`Workspace::find_best_connection`] finds where a dragged subtree would snap.
//! - [`Workspace::connect`] joins two connections, moving the incoming tree
//!   and re-homing any block it displaces.
//! - [`Workspace::bump_neighbors`] pushes crowding blocks aside.
//!
//! Mutations validate before they change anything and report problems as
//! [`ModelError`].
//!
//! ## Example
//!
//! ```rust
//! use kurbo::Point;
//! use snapblock_model::{BlockSpec, Workspace};
//!
//! let mut ws = Workspace::new();
//! let top = ws.add_block(BlockSpec::statement("say", Point::new(0.0, 0.0), 20.0));
//! let dragged = ws.add_block(BlockSpec::statement("wait", Point::new(4.0, 23.0), 20.0));
//!
//! let best = ws.find_best_connection(dragged, 25.0).unwrap();
//! ws.connect(best.source, best.target).unwrap();
//!
//! assert_eq!(ws.next_block(top), Some(dragged));
//! assert_eq!(ws.position(dragged), Some(Point::new(0.0, 20.0)));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod commit;
mod error;
mod types;
mod workspace;

pub use error::ModelError;
pub use snapblock_index::BestConnection;
pub use types::{BlockId, BlockSpec, ConnectionId, ConnectionKind, ConnectionSpec};
pub use workspace::{CommitConfig, Workspace};
