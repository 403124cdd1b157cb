// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform hash grid backend. Good for large workspaces with a fixed query radius.
//!
//! Choose a cell size close to the snap radius: a radius query then touches
//! at most a 3x3 block of cells.

use core::fmt::Debug;

use hashbrown::HashMap;
use kurbo::{Point, Rect};
use smallvec::SmallVec;

use crate::backend::Backend;

type Cell = (i64, i64);

/// Uniform grid of square cells keyed by integer cell coordinates.
pub struct Grid {
    cell_size: f64,
    cells: HashMap<Cell, SmallVec<[usize; 4]>>,
}

impl Grid {
    /// Creates an empty grid with the given cell size.
    ///
    /// Non-positive or non-finite sizes fall back to `1.0`.
    #[must_use]
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    /// Returns the configured cell size.
    #[must_use]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    fn cell_of(&self, p: Point) -> Cell {
        (
            floor_div(p.x, self.cell_size),
            floor_div(p.y, self.cell_size),
        )
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(32.0)
    }
}

impl Debug for Grid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let alive: usize = self.cells.values().map(SmallVec::len).sum();
        f.debug_struct("Grid")
            .field("cell_size", &self.cell_size)
            .field("cells", &self.cells.len())
            .field("alive", &alive)
            .finish_non_exhaustive()
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "workspace coordinates divided by the cell size stay far inside i64"
)]
fn floor_div(v: f64, cell: f64) -> i64 {
    let q = v / cell;
    let t = q as i64;
    // `as` saturates, so infinite coordinates land on the i64 limits.
    if (t as f64) > q { t.saturating_sub(1) } else { t }
}

impl Backend for Grid {
    fn insert(&mut self, slot: usize, pos: Point) {
        let cell = self.cell_of(pos);
        self.cells.entry(cell).or_default().push(slot);
    }

    fn update(&mut self, slot: usize, old: Point, pos: Point) {
        if self.cell_of(old) == self.cell_of(pos) {
            return;
        }
        self.remove(slot, old);
        self.insert(slot, pos);
    }

    fn remove(&mut self, slot: usize, pos: Point) {
        let cell = self.cell_of(pos);
        if let Some(list) = self.cells.get_mut(&cell) {
            list.retain(|s| *s != slot);
            if list.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }

    fn clear(&mut self) {
        self.cells.clear();
    }

    fn visit_rect<F: FnMut(usize)>(&self, rect: Rect, mut f: F) {
        let (x0, y0) = self.cell_of(Point::new(rect.x0, rect.y0));
        let (x1, y1) = self.cell_of(Point::new(rect.x1, rect.y1));
        let width = i128::from(x1) - i128::from(x0) + 1;
        let height = i128::from(y1) - i128::from(y0) + 1;
        let span = width.checked_mul(height).unwrap_or(i128::MAX);
        if span > i128::try_from(self.cells.len()).unwrap_or(i128::MAX) {
            // Fewer stored cells than cells in range: scan what is stored.
            for (&(cx, cy), list) in &self.cells {
                if (x0..=x1).contains(&cx) && (y0..=y1).contains(&cy) {
                    for &slot in list {
                        f(slot);
                    }
                }
            }
            return;
        }
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                if let Some(list) = self.cells.get(&(cx, cy)) {
                    for &slot in list {
                        f(slot);
                    }
                }
            }
        }
    }
}
