// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=snapblock_view2d --heading-base-level=0

//! Snapblock View 2D: the workspace <-> view coordinate transform for block editors.
//!
//! Block editors keep their model in *workspace* coordinates: logical units
//! that do not change when the user pans or zooms. What the user touches is
//! the *virtual view*: pixels inside the editor surface, after pan, zoom and
//! (for right-to-left locales) horizontal mirroring.
//!
//! [`WorkspaceTransform`] maps between the two, and also between the view and
//! the screen when the editor surface is offset on screen. It carries the
//! maximum snap distance used by connection search, so everything that needs
//! "how close is close enough" asks one place.
//!
//! It does **not** own any blocks or views. Callers are expected to:
//! - Keep their block model in workspace coordinates.
//! - Convert pointer positions with [`WorkspaceTransform::view_to_workspace_point`]
//!   before hit testing or moving blocks.
//! - Drive pan/zoom from their own input handling.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use snapblock_view2d::WorkspaceTransform;
//!
//! let mut transform = WorkspaceTransform::new(Rect::new(0.0, 0.0, 800.0, 600.0));
//! transform.set_zoom(2.0);
//!
//! let view = transform.workspace_to_view_point(Point::new(10.0, 10.0));
//! assert_eq!(view, Point::new(20.0, 20.0));
//!
//! // Mirrored for right-to-left layouts: workspace x grows leftward from the
//! // right edge of the view.
//! transform.set_rtl(true);
//! let view = transform.workspace_to_view_point(Point::new(10.0, 10.0));
//! assert_eq!(view, Point::new(780.0, 20.0));
//! ```
//!
//! ## Design notes
//!
//! - Zoom is uniform; RTL only flips the sign of the x scale.
//! - Pan is expressed in view pixels, so it is unaffected by mirroring.
//! - Deltas never include pan, which makes them safe for drag offsets.
//!
//! This crate is `no_std`.

#![no_std]

mod modes;
mod transform;

pub use modes::ClampMode;
pub use transform::{TransformConfig, WorkspaceTransform, WorkspaceTransformDebugInfo};
