// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Snapping search and the mutations that join or bump blocks.

use alloc::vec::Vec;

use kurbo::{Point, Vec2};
use snapblock_index::{Backend, BestConnection};

use crate::error::ModelError;
use crate::types::{BlockId, ConnectionId, ConnectionKind, checks_match};
use crate::workspace::Workspace;

impl<B: Backend> Workspace<B> {
    /// Checks whether `moving` may be joined to `stationary`.
    ///
    /// Rules:
    /// - kinds pair up (`Input`/`Output`, `Next`/`Previous`) and type checks intersect;
    /// - the two connections live on different block trees;
    /// - the child-side plug (`Output`/`Previous`) is free;
    /// - a parent-side slot on the moving side is free (a stationary slot may
    ///   be occupied; its occupant is displaced by [`Workspace::connect`]);
    /// - the moving tree is movable.
    pub fn can_connect(
        &self,
        moving: ConnectionId,
        stationary: ConnectionId,
    ) -> Result<(), ModelError> {
        let m = self.conn(moving)?;
        let s = self.conn(stationary)?;
        if moving == stationary {
            return Err(ModelError::SelfConnection(moving));
        }
        if m.kind.opposite() != s.kind {
            return Err(ModelError::KindMismatch {
                moving: m.kind,
                stationary: s.kind,
            });
        }
        let moving_root = self.root_of(m.block);
        if moving_root == self.root_of(s.block) {
            return Err(ModelError::SameTree(moving, stationary));
        }
        if !checks_match(m.checks.as_deref(), s.checks.as_deref()) {
            return Err(ModelError::CheckMismatch(moving, stationary));
        }
        if m.target.is_some() {
            return Err(ModelError::Occupied(moving));
        }
        if !s.kind.is_parent_side() && s.target.is_some() {
            return Err(ModelError::Occupied(stationary));
        }
        if !self.is_movable(moving_root) {
            return Err(ModelError::Unmovable(moving_root));
        }
        Ok(())
    }

    /// Best snap for the subtree under `block`.
    ///
    /// Every connection of the subtree is a candidate source; targets are
    /// indexed connections on other trees that [`Workspace::can_connect`]
    /// accepts, within `max_snap_distance`. Returns `None` when nothing
    /// qualifies.
    #[must_use]
    pub fn find_best_connection(
        &self,
        block: BlockId,
        max_snap_distance: f64,
    ) -> Option<BestConnection<ConnectionId>> {
        let candidates: Vec<(ConnectionId, Point)> = self
            .all_connections_recursive(block)
            .into_iter()
            .filter_map(|c| self.connection_position(c).map(|p| (c, p)))
            .collect();
        self.index.find_best(candidates, max_snap_distance, |s, t| {
            self.can_connect(*s, *t).is_ok()
        })
    }

    /// Joins `source` (on the moving tree) to `target`.
    ///
    /// The moving tree is translated so both connection points coincide.
    /// If `target` is a slot that already holds a block, that block is
    /// detached and either re-attached to the incoming blocks (end of the
    /// incoming stack for `Next`, first free matching input for `Input`) or
    /// bumped aside. Neighbors of the resulting tree are then bumped.
    ///
    /// Nothing changes when validation fails.
    pub fn connect(
        &mut self,
        source: ConnectionId,
        target: ConnectionId,
    ) -> Result<(), ModelError> {
        self.can_connect(source, target)?;
        let source_pos = self
            .connection_position(source)
            .ok_or(ModelError::UnknownConnection(source))?;
        let target_pos = self
            .connection_position(target)
            .ok_or(ModelError::UnknownConnection(target))?;
        let source_block = self.conn(source)?.block;
        let (parent_conn, child_conn) = if self.conn(source)?.kind.is_parent_side() {
            (source, target)
        } else {
            (target, source)
        };

        let moving_root = self.root_of(source_block);
        self.move_by(moving_root, target_pos - source_pos)?;

        let orphan = self.disconnect(parent_conn)?;
        self.link(parent_conn, child_conn);
        tracing::debug!(?source, ?target, ?orphan, "connected");

        if let Some(orphan) = orphan {
            self.reattach_orphan(orphan, source_block)?;
        }

        let root = self.root_of(source_block);
        self.bump_neighbors(root)?;
        Ok(())
    }

    /// Pushes aside blocks crowding the tree that contains `block`.
    ///
    /// For every connection of the tree, each indexed connection of another
    /// tree within the snap radius that is incompatible or already occupied
    /// gets its root moved by the bump offset. Unmovable roots stay put.
    /// Each root moves at most once. Returns the roots that moved.
    pub fn bump_neighbors(&mut self, block: BlockId) -> Result<Vec<BlockId>, ModelError> {
        self.block(block)?;
        let root = self.root_of(block);
        let radius = self.config.snap_radius;
        let mut bumped: Vec<BlockId> = Vec::new();

        for c in self.all_connections_recursive(root) {
            let Some(pos) = self.connection_position(c) else {
                continue;
            };
            for neighbor in self.index.query_radius(pos, radius) {
                let Some(neighbor_block) = self.connection_block(neighbor) else {
                    continue;
                };
                let neighbor_root = self.root_of(neighbor_block);
                if neighbor_root == root
                    || bumped.contains(&neighbor_root)
                    || self.could_snap(c, neighbor)
                    || !self.is_movable(neighbor_root)
                {
                    continue;
                }
                bumped.push(neighbor_root);
            }
        }

        let offset = self.bump_vector();
        for b in &bumped {
            self.move_by(*b, offset)?;
        }
        if !bumped.is_empty() {
            tracing::debug!(?root, count = bumped.len(), "bumped neighbors");
        }
        Ok(bumped)
    }

    /// Kinds pair up, checks intersect, and both sides are free.
    fn could_snap(&self, a: ConnectionId, b: ConnectionId) -> bool {
        let (Ok(a), Ok(b)) = (self.conn(a), self.conn(b)) else {
            return false;
        };
        a.kind.opposite() == b.kind
            && a.target.is_none()
            && b.target.is_none()
            && checks_match(a.checks.as_deref(), b.checks.as_deref())
    }

    fn bump_vector(&self) -> Vec2 {
        let o = self.config.bump_offset;
        if self.config.rtl {
            Vec2::new(-o.x, o.y)
        } else {
            o
        }
    }

    fn link(&mut self, parent_conn: ConnectionId, child_conn: ConnectionId) {
        if let Some(Some(p)) = self.connections.get_mut(parent_conn.idx()) {
            p.target = Some(child_conn);
        }
        if let Some(Some(c)) = self.connections.get_mut(child_conn.idx()) {
            c.target = Some(parent_conn);
        }
    }

    /// Finds a home for a block displaced from an occupied slot.
    fn reattach_orphan(
        &mut self,
        orphan: ConnectionId,
        incoming: BlockId,
    ) -> Result<(), ModelError> {
        let orphan_block = self.conn(orphan)?.block;
        let slot = match self.conn(orphan)?.kind {
            ConnectionKind::Previous => {
                let mut last = incoming;
                while let Some(next) = self.next_block(last) {
                    last = next;
                }
                self.connection_of_kind(last, ConnectionKind::Next)
            }
            ConnectionKind::Output => self.connections(incoming).iter().copied().find(|c| {
                self.conn(*c).is_ok_and(|d| d.kind == ConnectionKind::Input && d.target.is_none())
            }),
            _ => None,
        };

        match slot {
            Some(slot) if self.could_snap(slot, orphan) => {
                let from = self
                    .connection_position(orphan)
                    .ok_or(ModelError::UnknownConnection(orphan))?;
                let to = self
                    .connection_position(slot)
                    .ok_or(ModelError::UnknownConnection(slot))?;
                self.move_by(orphan_block, to - from)?;
                self.link(slot, orphan);
                tracing::debug!(?orphan, ?slot, "reattached displaced block");
            }
            _ => {
                if self.is_movable(orphan_block) {
                    let offset = self.bump_vector();
                    self.move_by(orphan_block, offset)?;
                }
                tracing::debug!(?orphan, "bumped displaced block");
            }
        }
        Ok(())
    }
}
