// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend trait for the spatial side of a [`ConnectionIndex`](crate::ConnectionIndex).

use alloc::vec::Vec;

use kurbo::{Point, Rect};

/// Spatial backend abstraction used by [`ConnectionIndex`](crate::ConnectionIndex).
///
/// Backends only know about slots and points. Keys, liveness and slot reuse
/// are handled by the index, which always passes the last known position back
/// in when a slot moves or goes away.
pub trait Backend {
    /// Insert a new slot into the spatial structure.
    fn insert(&mut self, slot: usize, pos: Point);

    /// Move an existing slot from `old` to `pos`.
    fn update(&mut self, slot: usize, old: Point, pos: Point);

    /// Remove a slot that currently sits at `pos`.
    fn remove(&mut self, slot: usize, pos: Point);

    /// Clear all spatial structures.
    fn clear(&mut self);

    /// Visit slots whose point may lie inside `rect`.
    ///
    /// Backends may over-report (for example whole grid cells); callers
    /// filter by exact distance.
    fn visit_rect<F: FnMut(usize)>(&self, rect: Rect, f: F);

    /// Collect slots whose point may lie inside `rect`. Default: collects `visit_rect`.
    fn query_rect(&self, rect: Rect) -> Vec<usize> {
        let mut out = Vec::new();
        self.visit_rect(rect, |i| out.push(i));
        out
    }
}
