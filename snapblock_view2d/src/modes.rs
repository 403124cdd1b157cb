// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Clamp behavior for panning relative to the optional workspace bounds.
///
/// Block editors usually set the bounds to the bounding box of all blocks so
/// the user cannot scroll the program completely out of sight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ClampMode {
    /// Do not apply any clamping; the view may move/zoom freely.
    None,
    /// Clamp so that the view never moves completely outside the workspace bounds.
    #[default]
    KeepSomeVisible,
}
