// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use snapblock_model::{BlockId, ModelError};
use thiserror::Error;

use crate::clip::EncodeError;

/// Reasons a drag could not start or finish normally.
///
/// These are recoverable. The arbiter and session log them and fall back to
/// clearing the pending drag; nothing is surfaced to the user.
#[derive(Debug, Error)]
pub enum DragError {
    /// The clip payload for the drag could not be built.
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// The dragged root block is not movable.
    #[error("block {0:?} is not movable")]
    Unmovable(BlockId),
    /// The drag payload does not carry blocks.
    #[error("drag payload is not block data")]
    NotBlockData,
    /// A drag event arrived without the pending drag that started it.
    #[error("drag event has no pending drag")]
    MissingPendingDrag,
    /// The model rejected a mutation.
    #[error(transparent)]
    Model(#[from] ModelError),
}
