// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag payloads and the codec that builds them.

use thiserror::Error;

use crate::pending::PendingDrag;

/// Opaque payload carried by the platform drag channel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClipPayload {
    /// Content type, used to tell block drags from foreign drags.
    pub mime_type: String,
    /// Encoded content.
    pub data: Vec<u8>,
}

impl ClipPayload {
    /// Creates a payload of `mime_type` holding `data`.
    pub fn new(mime_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// Failure to encode a drag payload.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("failed to encode drag payload: {message}")]
pub struct EncodeError {
    message: String,
}

impl EncodeError {
    /// Creates an error with a human-readable reason.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The reason given at construction.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Serializes dragged blocks for the drag channel.
pub trait ClipCodec {
    /// Encodes the dragged group of `pending`.
    fn encode(&self, pending: &PendingDrag) -> Result<ClipPayload, EncodeError>;

    /// Returns `true` if `payload` describes blocks this codec understands.
    fn is_block_data(&self, payload: &ClipPayload) -> bool;
}
