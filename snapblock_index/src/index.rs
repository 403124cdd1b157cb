// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashMap;
use kurbo::{Point, Rect};

use crate::backend::Backend;
use crate::backends::FlatVec;

/// Result of [`ConnectionIndex::find_best`]: the dragged-side connection, the
/// indexed connection it should join, and the distance between them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BestConnection<K> {
    /// Candidate supplied by the caller (usually on the dragged subtree).
    pub source: K,
    /// Indexed connection nearest to `source`.
    pub target: K,
    /// Euclidean distance between the two, in workspace units.
    pub distance: f64,
}

#[derive(Clone, Copy, Debug)]
struct Entry<K> {
    key: K,
    pos: Point,
}

/// Set of connectable points keyed by `K`, with radius queries.
///
/// Each key occupies one slot. Slots freed by [`ConnectionIndex::remove`] are
/// reused by later insertions.
pub struct ConnectionIndex<K, B = FlatVec> {
    backend: B,
    slots: Vec<Option<Entry<K>>>,
    free: Vec<usize>,
    by_key: HashMap<K, usize>,
}

impl<K: Copy + Eq + Hash> ConnectionIndex<K, FlatVec> {
    /// Creates an empty index using the linear-scan backend.
    #[must_use]
    pub fn new() -> Self {
        Self::with_backend(FlatVec::default())
    }
}

impl<K: Copy + Eq + Hash> Default for ConnectionIndex<K, FlatVec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Debug, B: Debug> Debug for ConnectionIndex<K, B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConnectionIndex")
            .field("len", &self.by_key.len())
            .field("free_slots", &self.free.len())
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

impl<K: Copy + Eq + Hash, B: Backend> ConnectionIndex<K, B> {
    /// Creates an empty index over the given backend.
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            slots: Vec::new(),
            free: Vec::new(),
            by_key: HashMap::new(),
        }
    }

    /// Number of indexed keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Returns `true` if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Returns `true` if `key` is indexed.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.by_key.contains_key(key)
    }

    /// Last known position of `key`, if indexed.
    #[must_use]
    pub fn position(&self, key: &K) -> Option<Point> {
        let slot = *self.by_key.get(key)?;
        self.slots[slot].as_ref().map(|e| e.pos)
    }

    /// Iterates indexed keys in slot order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.slots.iter().filter_map(|e| e.as_ref().map(|e| e.key))
    }

    /// Indexes `key` at `pos`.
    ///
    /// Returns `false` if the key was already present, in which case only its
    /// position is updated. An index never holds the same key twice.
    pub fn add(&mut self, key: K, pos: Point) -> bool {
        if self.update_position(&key, pos) {
            return false;
        }
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(Entry { key, pos });
                slot
            }
            None => {
                self.slots.push(Some(Entry { key, pos }));
                self.slots.len() - 1
            }
        };
        self.by_key.insert(key, slot);
        self.backend.insert(slot, pos);
        true
    }

    /// Removes `key`. Returns `false` if it was not indexed.
    pub fn remove(&mut self, key: &K) -> bool {
        let Some(slot) = self.by_key.remove(key) else {
            return false;
        };
        if let Some(entry) = self.slots[slot].take() {
            self.backend.remove(slot, entry.pos);
        }
        self.free.push(slot);
        true
    }

    /// Moves an indexed key. Returns `false` if it was not indexed.
    pub fn update_position(&mut self, key: &K, pos: Point) -> bool {
        let Some(&slot) = self.by_key.get(key) else {
            return false;
        };
        if let Some(entry) = self.slots[slot].as_mut() {
            let old = entry.pos;
            entry.pos = pos;
            if old != pos {
                self.backend.update(slot, old, pos);
            }
        }
        true
    }

    /// Removes everything.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.by_key.clear();
        self.backend.clear();
    }

    /// Keys within Euclidean distance `radius` of `center`, in slot order.
    #[must_use]
    pub fn query_radius(&self, center: Point, radius: f64) -> Vec<K> {
        let mut hits = Vec::new();
        self.visit_radius(center, radius, |slot, key, _| hits.push((slot, key)));
        hits.sort_unstable_by_key(|(slot, _)| *slot);
        hits.into_iter().map(|(_, key)| key).collect()
    }

    /// Nearest key to `center` within `radius` that `accept` admits.
    ///
    /// Exact ties go to the lower slot.
    pub fn nearest<F>(&self, center: Point, radius: f64, mut accept: F) -> Option<(K, f64)>
    where
        F: FnMut(&K) -> bool,
    {
        let mut best: Option<(usize, K, f64)> = None;
        self.visit_radius(center, radius, |slot, key, d| {
            let better = match best {
                None => true,
                Some((best_slot, _, best_d)) => d < best_d || (d == best_d && slot < best_slot),
            };
            if better && accept(&key) {
                best = Some((slot, key, d));
            }
        });
        best.map(|(_, key, d)| (key, d))
    }

    /// Best pairing between any of `candidates` and an indexed key.
    ///
    /// For every `(source, position)` candidate the nearest indexed key
    /// admitted by `accept(source, target)` within `max_distance` is found;
    /// the overall smallest distance wins. Exact ties go to the earlier
    /// candidate, then to the lower slot.
    pub fn find_best<I, F>(
        &self,
        candidates: I,
        max_distance: f64,
        mut accept: F,
    ) -> Option<BestConnection<K>>
    where
        I: IntoIterator<Item = (K, Point)>,
        F: FnMut(&K, &K) -> bool,
    {
        let mut best: Option<BestConnection<K>> = None;
        for (source, pos) in candidates {
            let found = self.nearest(pos, max_distance, |target| {
                *target != source && accept(&source, target)
            });
            if let Some((target, distance)) = found
                && best.is_none_or(|b| distance < b.distance)
            {
                best = Some(BestConnection {
                    source,
                    target,
                    distance,
                });
            }
        }
        best
    }

    fn visit_radius<F: FnMut(usize, K, f64)>(&self, center: Point, radius: f64, mut f: F) {
        if radius.is_nan() || radius < 0.0 {
            return;
        }
        let rect = Rect::new(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
        );
        self.backend.visit_rect(rect, |slot| {
            if let Some(entry) = self.slots.get(slot).and_then(Option::as_ref) {
                let d = (entry.pos - center).hypot();
                if d <= radius {
                    f(slot, entry.key, d);
                }
            }
        });
    }
}
