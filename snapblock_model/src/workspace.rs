// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The block arena, tree traversal, movement, and connection index upkeep.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Vec2};
use smallvec::SmallVec;
use snapblock_index::backends::FlatVec;
use snapblock_index::{Backend, ConnectionIndex};

use crate::error::ModelError;
use crate::types::{BlockId, BlockSpec, ConnectionId, ConnectionKind};

/// Tunables for connect and bump.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CommitConfig {
    /// Distance, in workspace units, inside which neighbors are bumped.
    ///
    /// Keep this equal to the snap distance used for searching.
    pub snap_radius: f64,
    /// How far a bumped block moves. The x component is mirrored under RTL.
    pub bump_offset: Vec2,
    /// Whether workspace x grows leftward.
    pub rtl: bool,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            snap_radius: 25.0,
            bump_offset: Vec2::new(25.0, 25.0),
            rtl: false,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct BlockData {
    pub(crate) type_name: String,
    pub(crate) position: Point,
    pub(crate) movable: bool,
    pub(crate) deletable: bool,
    pub(crate) connections: SmallVec<[ConnectionId; 4]>,
}

#[derive(Clone, Debug)]
pub(crate) struct ConnectionData {
    pub(crate) block: BlockId,
    pub(crate) kind: ConnectionKind,
    pub(crate) offset: Vec2,
    pub(crate) checks: Option<Vec<String>>,
    pub(crate) target: Option<ConnectionId>,
    pub(crate) drag_mode: bool,
}

/// Owner of all blocks and connections, plus the index of connectable points.
///
/// Blocks form a forest. A block's parent is the block whose `Input` or
/// `Next` slot holds the block's `Output` or `Previous` plug. Every connection
/// not in drag mode is kept in the index at its current position.
pub struct Workspace<B = FlatVec> {
    pub(crate) blocks: Vec<Option<BlockData>>,
    pub(crate) connections: Vec<Option<ConnectionData>>,
    pub(crate) index: ConnectionIndex<ConnectionId, B>,
    pub(crate) config: CommitConfig,
}

impl Workspace<FlatVec> {
    /// Creates an empty workspace with the linear-scan index backend.
    #[must_use]
    pub fn new() -> Self {
        Self::with_index_backend(FlatVec::default())
    }
}

impl Default for Workspace<FlatVec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: core::fmt::Debug> core::fmt::Debug for Workspace<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let blocks = self.blocks.iter().filter(|b| b.is_some()).count();
        let connections = self.connections.iter().filter(|c| c.is_some()).count();
        f.debug_struct("Workspace")
            .field("blocks", &blocks)
            .field("connections", &connections)
            .field("index", &self.index)
            .field("config", &self.config)
            .finish()
    }
}

impl<B: Backend> Workspace<B> {
    /// Creates an empty workspace over the given index backend.
    pub fn with_index_backend(backend: B) -> Self {
        Self {
            blocks: Vec::new(),
            connections: Vec::new(),
            index: ConnectionIndex::with_backend(backend),
            config: CommitConfig::default(),
        }
    }

    /// Replaces the connect/bump tunables.
    #[must_use]
    pub fn with_config(mut self, config: CommitConfig) -> Self {
        self.config = config;
        self
    }

    /// Current connect/bump tunables.
    #[must_use]
    pub fn config(&self) -> &CommitConfig {
        &self.config
    }

    /// Mutable access to the connect/bump tunables.
    pub fn config_mut(&mut self) -> &mut CommitConfig {
        &mut self.config
    }

    /// Read-only view of the connection index.
    #[must_use]
    pub fn index(&self) -> &ConnectionIndex<ConnectionId, B> {
        &self.index
    }

    /// Adds a root block and indexes its connections.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "more than u32::MAX blocks is not a supported workload"
    )]
    pub fn add_block(&mut self, spec: BlockSpec) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        let mut connections = SmallVec::new();
        for c in spec.connections {
            let cid = ConnectionId(self.connections.len() as u32);
            self.connections.push(Some(ConnectionData {
                block: id,
                kind: c.kind,
                offset: c.offset,
                checks: c.checks,
                target: None,
                drag_mode: false,
            }));
            self.index.add(cid, spec.position + c.offset);
            connections.push(cid);
        }
        self.blocks.push(Some(BlockData {
            type_name: spec.type_name,
            position: spec.position,
            movable: spec.movable,
            deletable: spec.deletable,
            connections,
        }));
        id
    }

    /// Returns `true` if `block` is live.
    #[must_use]
    pub fn contains_block(&self, block: BlockId) -> bool {
        self.blocks.get(block.idx()).is_some_and(Option::is_some)
    }

    /// Number of live blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_some()).count()
    }

    /// Live blocks in creation order.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "ids are allocated from u32"
    )]
    pub fn blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_some())
            .map(|(i, _)| BlockId(i as u32))
    }

    /// Live blocks without a parent, in creation order.
    pub fn root_blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks().filter(|b| self.parent(*b).is_none())
    }

    /// Block type name.
    #[must_use]
    pub fn type_name(&self, block: BlockId) -> Option<&str> {
        self.block(block).ok().map(|b| b.type_name.as_str())
    }

    /// Block position in workspace coordinates.
    #[must_use]
    pub fn position(&self, block: BlockId) -> Option<Point> {
        self.block(block).ok().map(|b| b.position)
    }

    /// Whether the user may drag the block.
    #[must_use]
    pub fn is_movable(&self, block: BlockId) -> bool {
        self.block(block).is_ok_and(|b| b.movable)
    }

    /// Whether the block may be trashed.
    #[must_use]
    pub fn is_deletable(&self, block: BlockId) -> bool {
        self.block(block).is_ok_and(|b| b.deletable)
    }

    /// The block's own connections in declaration order.
    #[must_use]
    pub fn connections(&self, block: BlockId) -> &[ConnectionId] {
        self.block(block)
            .map(|b| b.connections.as_slice())
            .unwrap_or(&[])
    }

    /// The block's first connection of `kind`, if any.
    #[must_use]
    pub fn connection_of_kind(&self, block: BlockId, kind: ConnectionKind) -> Option<ConnectionId> {
        self.connections(block)
            .iter()
            .copied()
            .find(|c| self.connection_kind(*c) == Some(kind))
    }

    /// Kind of a connection.
    #[must_use]
    pub fn connection_kind(&self, connection: ConnectionId) -> Option<ConnectionKind> {
        self.conn(connection).ok().map(|c| c.kind)
    }

    /// Block owning a connection.
    #[must_use]
    pub fn connection_block(&self, connection: ConnectionId) -> Option<BlockId> {
        self.conn(connection).ok().map(|c| c.block)
    }

    /// Current position of a connection in workspace coordinates.
    #[must_use]
    pub fn connection_position(&self, connection: ConnectionId) -> Option<Point> {
        let c = self.conn(connection).ok()?;
        self.position(c.block).map(|p| p + c.offset)
    }

    /// The connection this one is joined to.
    #[must_use]
    pub fn connection_target(&self, connection: ConnectionId) -> Option<ConnectionId> {
        self.conn(connection).ok().and_then(|c| c.target)
    }

    /// Returns `true` if the connection is joined to another.
    #[must_use]
    pub fn is_connected(&self, connection: ConnectionId) -> bool {
        self.connection_target(connection).is_some()
    }

    /// Returns `true` while the connection's subtree is being dragged.
    #[must_use]
    pub fn in_drag_mode(&self, connection: ConnectionId) -> bool {
        self.conn(connection).is_ok_and(|c| c.drag_mode)
    }

    /// Sets or clears drag mode on a connection.
    ///
    /// This only flips the flag; index membership is managed by
    /// [`Workspace::index_add`] and [`Workspace::index_remove`].
    pub fn set_drag_mode(
        &mut self,
        connection: ConnectionId,
        drag_mode: bool,
    ) -> Result<(), ModelError> {
        self.conn_mut(connection)?.drag_mode = drag_mode;
        Ok(())
    }

    /// Inserts a connection into the index at its current position.
    ///
    /// Returns `Ok(false)` if it was already indexed. Connections in drag mode
    /// are never indexed and also yield `Ok(false)`.
    pub fn index_add(&mut self, connection: ConnectionId) -> Result<bool, ModelError> {
        let c = self.conn(connection)?;
        if c.drag_mode {
            return Ok(false);
        }
        let pos = self
            .connection_position(connection)
            .ok_or(ModelError::UnknownConnection(connection))?;
        Ok(self.index.add(connection, pos))
    }

    /// Removes a connection from the index. Returns `false` if it was not indexed.
    pub fn index_remove(&mut self, connection: ConnectionId) -> bool {
        self.index.remove(&connection)
    }

    /// The block whose slot holds this block, if any.
    #[must_use]
    pub fn parent(&self, block: BlockId) -> Option<BlockId> {
        self.connections(block).iter().find_map(|c| {
            let data = self.conn(*c).ok()?;
            if data.kind.is_parent_side() {
                return None;
            }
            data.target.and_then(|t| self.connection_block(t))
        })
    }

    /// The block attached below this one, if any.
    #[must_use]
    pub fn next_block(&self, block: BlockId) -> Option<BlockId> {
        self.connection_of_kind(block, ConnectionKind::Next)
            .and_then(|c| self.connection_target(c))
            .and_then(|t| self.connection_block(t))
    }

    /// Blocks held in this block's `Input` and `Next` slots, in declaration order.
    #[must_use]
    pub fn children(&self, block: BlockId) -> Vec<BlockId> {
        self.connections(block)
            .iter()
            .filter_map(|c| {
                let data = self.conn(*c).ok()?;
                if !data.kind.is_parent_side() {
                    return None;
                }
                data.target.and_then(|t| self.connection_block(t))
            })
            .collect()
    }

    /// Topmost ancestor of `block` (the block itself when it is a root).
    #[must_use]
    pub fn root_of(&self, block: BlockId) -> BlockId {
        let mut current = block;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// `block` and all its descendants, parents before children.
    #[must_use]
    pub fn subtree_blocks(&self, block: BlockId) -> Vec<BlockId> {
        let mut out = Vec::new();
        if !self.contains_block(block) {
            return out;
        }
        let mut stack = alloc::vec![block];
        while let Some(b) = stack.pop() {
            out.push(b);
            let mut children = self.children(b);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Every connection on `block` and its descendants.
    #[must_use]
    pub fn all_connections_recursive(&self, block: BlockId) -> Vec<ConnectionId> {
        self.subtree_blocks(block)
            .into_iter()
            .flat_map(|b| self.connections(b).iter().copied())
            .collect()
    }

    /// Moves `block` and its descendants so that `block` sits at `position`.
    pub fn set_position(&mut self, block: BlockId, position: Point) -> Result<(), ModelError> {
        let current = self.block(block)?.position;
        self.move_by(block, position - current)
    }

    /// Moves `block` and its descendants by `delta`, keeping the index in sync.
    pub fn move_by(&mut self, block: BlockId, delta: Vec2) -> Result<(), ModelError> {
        self.block(block)?;
        if delta == Vec2::ZERO {
            return Ok(());
        }
        for b in self.subtree_blocks(block) {
            let Some(Some(data)) = self.blocks.get_mut(b.idx()) else {
                continue;
            };
            data.position += delta;
            let position = data.position;
            for c in data.connections.clone() {
                if let Some(Some(conn)) = self.connections.get(c.idx()) {
                    self.index.update_position(&c, position + conn.offset);
                }
            }
        }
        Ok(())
    }

    /// Breaks the link on `connection`. Returns the former partner.
    pub fn disconnect(
        &mut self,
        connection: ConnectionId,
    ) -> Result<Option<ConnectionId>, ModelError> {
        let Some(target) = self.conn(connection)?.target else {
            return Ok(None);
        };
        self.conn_mut(connection)?.target = None;
        if let Ok(t) = self.conn_mut(target) {
            t.target = None;
        }
        Ok(Some(target))
    }

    /// Detaches `block` (with everything below it) from its parent.
    ///
    /// Returns `true` if the block had a parent.
    pub fn unplug(&mut self, block: BlockId) -> Result<bool, ModelError> {
        let plug = self.block(block)?.connections.iter().copied().find(|c| {
            self.conn(*c)
                .is_ok_and(|d| !d.kind.is_parent_side() && d.target.is_some())
        });
        match plug {
            Some(c) => Ok(self.disconnect(c)?.is_some()),
            None => Ok(false),
        }
    }

    /// Removes `block` and its descendants, dropping their connections from
    /// the index. Returns the removed blocks.
    pub fn remove_block(&mut self, block: BlockId) -> Result<Vec<BlockId>, ModelError> {
        if !self.block(block)?.deletable {
            return Err(ModelError::Undeletable(block));
        }
        self.unplug(block)?;
        let removed = self.subtree_blocks(block);
        for b in &removed {
            if let Some(data) = self.blocks[b.idx()].take() {
                for c in data.connections {
                    self.index.remove(&c);
                    self.connections[c.idx()] = None;
                }
            }
        }
        tracing::debug!(?block, count = removed.len(), "removed block subtree");
        Ok(removed)
    }

    pub(crate) fn block(&self, block: BlockId) -> Result<&BlockData, ModelError> {
        self.blocks
            .get(block.idx())
            .and_then(Option::as_ref)
            .ok_or(ModelError::UnknownBlock(block))
    }

    pub(crate) fn conn(&self, connection: ConnectionId) -> Result<&ConnectionData, ModelError> {
        self.connections
            .get(connection.idx())
            .and_then(Option::as_ref)
            .ok_or(ModelError::UnknownConnection(connection))
    }

    pub(crate) fn conn_mut(
        &mut self,
        connection: ConnectionId,
    ) -> Result<&mut ConnectionData, ModelError> {
        self.connections
            .get_mut(connection.idx())
            .and_then(Option::as_mut)
            .ok_or(ModelError::UnknownConnection(connection))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::{Point, Vec2};

    use super::Workspace;
    use crate::types::{BlockSpec, ConnectionKind, ConnectionSpec};

    #[test]
    fn new_blocks_are_indexed_roots() {
        let mut ws = Workspace::new();
        let a = ws.add_block(BlockSpec::statement("a", Point::new(0.0, 0.0), 20.0));

        assert_eq!(ws.root_blocks().collect::<alloc::vec::Vec<_>>(), vec![a]);
        assert_eq!(ws.index().len(), 2);
        let next = ws.connection_of_kind(a, ConnectionKind::Next).unwrap();
        assert_eq!(ws.connection_position(next), Some(Point::new(0.0, 20.0)));
        assert_eq!(ws.index().position(&next), Some(Point::new(0.0, 20.0)));
    }

    #[test]
    fn move_by_carries_children_and_updates_index() {
        let mut ws = Workspace::new();
        let a = ws.add_block(BlockSpec::statement("a", Point::ZERO, 20.0));
        let b = ws.add_block(BlockSpec::statement("b", Point::new(0.0, 20.0), 20.0));
        let a_next = ws.connection_of_kind(a, ConnectionKind::Next).unwrap();
        let b_prev = ws.connection_of_kind(b, ConnectionKind::Previous).unwrap();
        ws.connect(b_prev, a_next).unwrap();

        ws.move_by(a, Vec2::new(100.0, 0.0)).unwrap();

        assert_eq!(ws.position(b), Some(Point::new(100.0, 20.0)));
        let b_next = ws.connection_of_kind(b, ConnectionKind::Next).unwrap();
        assert_eq!(ws.index().position(&b_next), Some(Point::new(100.0, 40.0)));
    }

    #[test]
    fn traversal_follows_inputs_and_next() {
        let mut ws = Workspace::new();
        let parent = ws.add_block(
            BlockSpec::statement("if", Point::ZERO, 40.0).with_connection(ConnectionSpec::new(
                ConnectionKind::Input,
                Vec2::new(60.0, 0.0),
            )),
        );
        let value = ws.add_block(
            BlockSpec::new("true", Point::new(60.0, 0.0))
                .with_connection(ConnectionSpec::new(ConnectionKind::Output, Vec2::ZERO)),
        );
        let below = ws.add_block(BlockSpec::statement("print", Point::new(0.0, 40.0), 20.0));

        let input = ws.connection_of_kind(parent, ConnectionKind::Input).unwrap();
        let output = ws.connection_of_kind(value, ConnectionKind::Output).unwrap();
        ws.connect(output, input).unwrap();
        let next = ws.connection_of_kind(parent, ConnectionKind::Next).unwrap();
        let prev = ws.connection_of_kind(below, ConnectionKind::Previous).unwrap();
        ws.connect(prev, next).unwrap();

        assert_eq!(ws.parent(value), Some(parent));
        assert_eq!(ws.next_block(parent), Some(below));
        assert_eq!(ws.root_of(below), parent);
        assert_eq!(ws.subtree_blocks(parent), vec![parent, below, value]);
        assert_eq!(ws.all_connections_recursive(parent).len(), 6);
    }

    #[test]
    fn unplug_detaches_from_parent() {
        let mut ws = Workspace::new();
        let a = ws.add_block(BlockSpec::statement("a", Point::ZERO, 20.0));
        let b = ws.add_block(BlockSpec::statement("b", Point::new(0.0, 20.0), 20.0));
        let a_next = ws.connection_of_kind(a, ConnectionKind::Next).unwrap();
        let b_prev = ws.connection_of_kind(b, ConnectionKind::Previous).unwrap();
        ws.connect(b_prev, a_next).unwrap();

        assert!(ws.unplug(b).unwrap());
        assert!(!ws.unplug(b).unwrap());
        assert_eq!(ws.parent(b), None);
        assert!(!ws.is_connected(a_next));
    }

    #[test]
    fn remove_block_drops_subtree_and_index_entries() {
        let mut ws = Workspace::new();
        let a = ws.add_block(BlockSpec::statement("a", Point::ZERO, 20.0));
        let b = ws.add_block(BlockSpec::statement("b", Point::new(0.0, 20.0), 20.0));
        let keep = ws.add_block(BlockSpec::statement("keep", Point::new(500.0, 0.0), 20.0));
        let a_next = ws.connection_of_kind(a, ConnectionKind::Next).unwrap();
        let b_prev = ws.connection_of_kind(b, ConnectionKind::Previous).unwrap();
        ws.connect(b_prev, a_next).unwrap();

        let removed = ws.remove_block(a).unwrap();

        assert_eq!(removed, vec![a, b]);
        assert!(!ws.contains_block(b));
        assert_eq!(ws.block_count(), 1);
        assert_eq!(ws.index().len(), 2);
        assert!(ws.contains_block(keep));
    }

    #[test]
    fn undeletable_blocks_stay() {
        let mut ws = Workspace::new();
        let a = ws.add_block(BlockSpec::new("a", Point::ZERO).deletable(false));
        assert!(ws.remove_block(a).is_err());
        assert!(ws.contains_block(a));
    }

    #[test]
    fn drag_mode_connections_are_not_indexed() {
        let mut ws = Workspace::new();
        let a = ws.add_block(BlockSpec::statement("a", Point::ZERO, 20.0));
        let next = ws.connection_of_kind(a, ConnectionKind::Next).unwrap();

        assert!(ws.index_remove(next));
        ws.set_drag_mode(next, true).unwrap();
        assert_eq!(ws.index_add(next), Ok(false));
        assert!(!ws.index().contains(&next));

        ws.set_drag_mode(next, false).unwrap();
        assert_eq!(ws.index_add(next), Ok(true));
        assert_eq!(ws.index_add(next), Ok(false));
    }
}
