// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capabilities the engine needs from the host's block views.

use std::rc::Rc;

use kurbo::{Point, Rect, Size};
use snapblock_model::{BlockId, ConnectionId};

/// A block's on-screen representation.
///
/// Views are shared handles; implementations keep their visual state behind
/// interior mutability.
pub trait RenderableBlock {
    /// Top-left corner in view coordinates.
    fn position(&self) -> Point;

    /// Laid-out size in view pixels.
    fn size(&self) -> Size;

    /// Shows or clears the pressed (selected) look.
    fn set_pressed(&self, pressed: bool);

    /// Highlights one of the block's connections, or clears the highlight.
    fn set_highlighted_connection(&self, connection: Option<ConnectionId>);
}

/// Looks up the view rendering a block.
pub trait ViewFactory {
    /// The view for `block`, or `None` if it has none (e.g. it was trashed).
    fn view(&self, block: BlockId) -> Option<Rc<dyn RenderableBlock>>;
}

/// A drop target that deletes dragged blocks.
pub trait TrashTarget {
    /// Hit area in screen coordinates.
    fn screen_rect(&self) -> Rect;

    /// Returns `true` if `point` (screen coordinates) is over the trash.
    fn contains_screen_point(&self, point: Point) -> bool {
        self.screen_rect().contains(point)
    }
}

/// Geometry for the platform's drag shadow.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DragShadow {
    /// Size of the dragged root view.
    pub size: Size,
    /// Touch point inside the shadow, relative to its top-left corner.
    pub touch_point: Point,
}
