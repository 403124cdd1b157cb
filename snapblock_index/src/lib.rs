// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=snapblock_index --heading-base-level=0

//! Snapblock Index: a spatial index of connection points.
//!
//! Block editors need one question answered many times per second while the
//! user drags: "which connection is close enough to snap to?". This crate
//! keeps the connectable points in a small spatial structure and answers
//! radius queries and best-pair searches over it.
//!
//! - [`ConnectionIndex`] maps caller keys (usually connection ids) to points
//!   and owns slot allocation.
//! - [`Backend`] is the spatial side; [`backends::FlatVec`] scans linearly,
//!   [`backends::Grid`] buckets points in a uniform hash grid.
//! - [`ConnectionIndex::find_best`] pairs a set of moving candidates with the
//!   nearest acceptable indexed key within a radius.
//!
//! The index knows nothing about connection types. Compatibility and "not on
//! the same block tree" rules come in through the `accept` predicate, which
//! keeps this crate usable for any snapping problem.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::Point;
//! use snapblock_index::ConnectionIndex;
//!
//! let mut index = ConnectionIndex::new();
//! index.add(1_u32, Point::new(0.0, 0.0));
//! index.add(2_u32, Point::new(40.0, 0.0));
//!
//! // Dragged connection 7 sits at (5, 0); only even keys are compatible.
//! let best = index
//!     .find_best([(7_u32, Point::new(5.0, 0.0))], 50.0, |_, target| target % 2 == 0)
//!     .unwrap();
//! assert_eq!(best.target, 2);
//! assert_eq!(best.distance, 35.0);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod backend;
pub mod backends;
mod index;

pub use backend::Backend;
pub use index::{BestConnection, ConnectionIndex};
