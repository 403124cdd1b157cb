// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identifiers, connection kinds, and the specs used to create blocks.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Vec2};

/// Identifier of a block in a [`Workspace`](crate::Workspace).
///
/// Ids are never reused: a removed block's id stays dead forever.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub(crate) u32);

impl BlockId {
    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Identifier of a connection in a [`Workspace`](crate::Workspace).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub(crate) u32);

impl ConnectionId {
    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// What a connection attaches to.
///
/// `Input` and `Next` are *parent-side* slots that hold another block.
/// `Output` and `Previous` are *child-side* plugs that sit in such a slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ConnectionKind {
    /// Value input slot on a parent block.
    Input,
    /// Value output plug on a child block.
    Output,
    /// Statement slot below a block.
    Next,
    /// Statement plug on top of a block.
    Previous,
}

impl ConnectionKind {
    /// The kind this one joins with.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
            Self::Next => Self::Previous,
            Self::Previous => Self::Next,
        }
    }

    /// Returns `true` for slots that hold a child block (`Input`, `Next`).
    #[must_use]
    pub const fn is_parent_side(self) -> bool {
        matches!(self, Self::Input | Self::Next)
    }
}

/// Description of one connection on a new block.
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionSpec {
    /// Connection kind.
    pub kind: ConnectionKind,
    /// Offset of the connection point from the block position.
    pub offset: Vec2,
    /// Type names accepted by this connection; `None` accepts anything.
    pub checks: Option<Vec<String>>,
}

impl ConnectionSpec {
    /// An unchecked connection of `kind` at `offset`.
    #[must_use]
    pub fn new(kind: ConnectionKind, offset: Vec2) -> Self {
        Self {
            kind,
            offset,
            checks: None,
        }
    }

    /// Restricts this connection to the given type names.
    #[must_use]
    pub fn with_checks<I, S>(mut self, checks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.checks = Some(checks.into_iter().map(Into::into).collect());
        self
    }
}

/// Description of a new block.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockSpec {
    /// Block type name, e.g. `"controls_if"`.
    pub type_name: String,
    /// Top-left position in workspace coordinates.
    pub position: Point,
    /// Whether the user may drag the block.
    pub movable: bool,
    /// Whether the block may be trashed.
    pub deletable: bool,
    /// Connections in declaration order.
    pub connections: Vec<ConnectionSpec>,
}

impl BlockSpec {
    /// A movable, deletable block of `type_name` at `position` with no connections.
    #[must_use]
    pub fn new(type_name: impl Into<String>, position: Point) -> Self {
        Self {
            type_name: type_name.into(),
            position,
            movable: true,
            deletable: true,
            connections: Vec::new(),
        }
    }

    /// Adds a connection.
    #[must_use]
    pub fn with_connection(mut self, connection: ConnectionSpec) -> Self {
        self.connections.push(connection);
        self
    }

    /// Sets the movable flag.
    #[must_use]
    pub fn movable(mut self, movable: bool) -> Self {
        self.movable = movable;
        self
    }

    /// Sets the deletable flag.
    #[must_use]
    pub fn deletable(mut self, deletable: bool) -> Self {
        self.deletable = deletable;
        self
    }

    /// A statement block: `Previous` at the top-left, `Next` at the bottom-left.
    #[must_use]
    pub fn statement(type_name: impl Into<String>, position: Point, height: f64) -> Self {
        Self::new(type_name, position)
            .with_connection(ConnectionSpec::new(ConnectionKind::Previous, Vec2::ZERO))
            .with_connection(ConnectionSpec::new(
                ConnectionKind::Next,
                Vec2::new(0.0, height),
            ))
    }
}

/// Returns `true` if two optional check lists accept each other.
pub(crate) fn checks_match(a: Option<&[String]>, b: Option<&[String]>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.iter().any(|t| b.contains(t)),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;

    use super::{ConnectionKind, checks_match};

    #[test]
    fn opposite_is_an_involution() {
        for kind in [
            ConnectionKind::Input,
            ConnectionKind::Output,
            ConnectionKind::Next,
            ConnectionKind::Previous,
        ] {
            assert_eq!(kind.opposite().opposite(), kind);
            assert_ne!(kind.is_parent_side(), kind.opposite().is_parent_side());
        }
    }

    #[test]
    fn unchecked_side_accepts_anything() {
        let numbers = vec![String::from("Number")];
        let text = vec![String::from("String")];
        assert!(checks_match(None, Some(numbers.as_slice())));
        assert!(checks_match(Some(numbers.as_slice()), None));
        assert!(checks_match(Some(numbers.as_slice()), Some(numbers.as_slice())));
        assert!(!checks_match(Some(numbers.as_slice()), Some(text.as_slice())));
    }
}
