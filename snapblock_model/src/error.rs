// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

use crate::types::{BlockId, ConnectionId, ConnectionKind};

/// Errors returned by [`Workspace`](crate::Workspace) mutations.
///
/// Every mutation validates before it changes anything, so an error always
/// leaves the workspace untouched.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// The block id is unknown or the block was removed.
    #[error("unknown block {0:?}")]
    UnknownBlock(BlockId),
    /// The connection id is unknown or its block was removed.
    #[error("unknown connection {0:?}")]
    UnknownConnection(ConnectionId),
    /// A connection cannot join itself.
    #[error("connection {0:?} cannot connect to itself")]
    SelfConnection(ConnectionId),
    /// Both connections already belong to the same block tree.
    #[error("connections {0:?} and {1:?} are on the same block tree")]
    SameTree(ConnectionId, ConnectionId),
    /// The kinds do not pair up (input/output, next/previous).
    #[error("{moving:?} cannot connect to {stationary:?}")]
    KindMismatch {
        /// Kind of the moving connection.
        moving: ConnectionKind,
        /// Kind of the stationary connection.
        stationary: ConnectionKind,
    },
    /// The type checks of the two connections have nothing in common.
    #[error("type checks of {0:?} and {1:?} do not intersect")]
    CheckMismatch(ConnectionId, ConnectionId),
    /// The connection is already joined and cannot take another partner.
    #[error("connection {0:?} is already connected")]
    Occupied(ConnectionId),
    /// The block cannot be moved.
    #[error("block {0:?} is not movable")]
    Unmovable(BlockId),
    /// The block cannot be deleted.
    #[error("block {0:?} is not deletable")]
    Undeletable(BlockId),
}
