// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, Point, Rect, Vec2};

use crate::modes::ClampMode;

/// Tunables for a [`WorkspaceTransform`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformConfig {
    /// Maximum distance, in workspace units, at which two connections snap.
    pub snap_radius: f64,
    /// Smallest allowed zoom factor.
    pub min_zoom: f64,
    /// Largest allowed zoom factor.
    pub max_zoom: f64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            snap_radius: 25.0,
            min_zoom: 0.1,
            max_zoom: 10.0,
        }
    }
}

/// Mapping between workspace coordinates and virtual-view coordinates.
///
/// Workspace → view is `anchor + pan + (±zoom, zoom) * p`, where `anchor` is
/// the top-left of the view rect, or the top-right under right-to-left
/// layout, and the x scale is negated under right-to-left layout.
#[derive(Clone, Debug)]
pub struct WorkspaceTransform {
    view_rect: Rect,
    view_origin_on_screen: Point,
    workspace_bounds: Option<Rect>,
    zoom: f64,
    pan: Vec2,
    rtl: bool,
    config: TransformConfig,
    clamp_mode: ClampMode,
    workspace_to_view: Affine,
    view_to_workspace: Affine,
}

impl WorkspaceTransform {
    /// Creates a transform covering `view_rect` with [`TransformConfig::default`].
    ///
    /// - Initial zoom is `1.0`.
    /// - Initial pan is zero (workspace origin maps to the view rect origin).
    /// - Layout is left-to-right.
    /// - Clamping is [`ClampMode::KeepSomeVisible`], inert until workspace
    ///   bounds are set.
    #[must_use]
    pub fn new(view_rect: Rect) -> Self {
        Self::with_config(view_rect, TransformConfig::default())
    }

    /// Creates a transform covering `view_rect` with the given tunables.
    #[must_use]
    pub fn with_config(view_rect: Rect, config: TransformConfig) -> Self {
        let mut transform = Self {
            view_rect,
            view_origin_on_screen: Point::ZERO,
            workspace_bounds: None,
            zoom: 1.0,
            pan: Vec2::ZERO,
            rtl: false,
            config,
            clamp_mode: ClampMode::default(),
            workspace_to_view: Affine::IDENTITY,
            view_to_workspace: Affine::IDENTITY,
        };
        transform.zoom = 1.0_f64.clamp(config.min_zoom, config.max_zoom);
        transform.rebuild_transforms();
        transform
    }

    /// Returns the current view rectangle in view coordinates.
    #[must_use]
    pub fn view_rect(&self) -> Rect {
        self.view_rect
    }

    /// Sets the view rectangle.
    ///
    /// Under right-to-left layout the workspace origin follows the right edge,
    /// so resizing the view moves content horizontally.
    pub fn set_view_rect(&mut self, rect: Rect) {
        if self.view_rect == rect {
            return;
        }
        self.view_rect = rect;
        self.rebuild_transforms();
        self.clamp_to_bounds();
    }

    /// Sets where the view's origin sits on screen.
    pub fn set_view_origin_on_screen(&mut self, origin: Point) {
        self.view_origin_on_screen = origin;
    }

    /// Returns where the view's origin sits on screen.
    #[must_use]
    pub fn view_origin_on_screen(&self) -> Point {
        self.view_origin_on_screen
    }

    /// Returns whether workspace x is mirrored.
    #[must_use]
    pub fn use_rtl(&self) -> bool {
        self.rtl
    }

    /// Switches between left-to-right and right-to-left layout.
    pub fn set_rtl(&mut self, rtl: bool) {
        if self.rtl == rtl {
            return;
        }
        self.rtl = rtl;
        self.rebuild_transforms();
        self.clamp_to_bounds();
    }

    /// Returns the tunables this transform was built with.
    #[must_use]
    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Maximum distance, in workspace units, at which connections snap.
    #[must_use]
    pub fn max_snap_distance(&self) -> f64 {
        self.config.snap_radius
    }

    /// Sets the maximum snap distance in workspace units.
    pub fn set_max_snap_distance(&mut self, distance: f64) {
        self.config.snap_radius = distance.max(0.0);
    }

    /// Returns the current uniform zoom factor.
    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Returns the current pan offset in view pixels.
    #[must_use]
    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    /// Sets the minimum and maximum zoom factors.
    ///
    /// The provided range is normalized so that `min_zoom <= max_zoom`. The
    /// current zoom is clamped into the new range.
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        let (min_zoom, max_zoom) = if min_zoom <= max_zoom {
            (min_zoom, max_zoom)
        } else {
            (max_zoom, min_zoom)
        };
        self.config.min_zoom = min_zoom;
        self.config.max_zoom = max_zoom;
        self.set_zoom(self.zoom);
    }

    /// Sets the zoom factor, clamping it into the configured zoom range.
    pub fn set_zoom(&mut self, zoom: f64) {
        let clamped = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        if (self.zoom - clamped).abs() < f64::EPSILON {
            return;
        }
        self.zoom = clamped;
        self.rebuild_transforms();
        self.clamp_to_bounds();
    }

    /// Sets optional workspace bounds used for clamping.
    pub fn set_workspace_bounds(&mut self, bounds: Option<Rect>) {
        if self.workspace_bounds == bounds {
            return;
        }
        self.workspace_bounds = bounds;
        self.clamp_to_bounds();
    }

    /// Returns the current workspace bounds, if any.
    #[must_use]
    pub fn workspace_bounds(&self) -> Option<Rect> {
        self.workspace_bounds
    }

    /// Sets the clamp mode for panning relative to workspace bounds.
    pub fn set_clamp_mode(&mut self, mode: ClampMode) {
        if self.clamp_mode != mode {
            self.clamp_mode = mode;
            self.clamp_to_bounds();
        }
    }

    /// Returns the current clamp mode.
    #[must_use]
    pub fn clamp_mode(&self) -> ClampMode {
        self.clamp_mode
    }

    /// Pans the view by a delta in view pixels.
    pub fn pan_by_view(&mut self, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }
        self.pan += delta;
        self.rebuild_transforms();
        self.clamp_to_bounds();
    }

    /// Zooms around an anchor point in view coordinates.
    ///
    /// The workspace point under the anchor stays under the anchor.
    pub fn zoom_about_view_point(&mut self, anchor_view: Point, factor: f64) {
        if factor <= 0.0 {
            return;
        }
        let old_zoom = self.zoom;
        let new_zoom = (old_zoom * factor).clamp(self.config.min_zoom, self.config.max_zoom);
        if (new_zoom - old_zoom).abs() < f64::EPSILON {
            return;
        }

        let old_workspace = self.view_to_workspace_point(anchor_view);
        self.zoom = new_zoom;
        self.rebuild_transforms();
        let new_anchor_view = self.workspace_to_view_point(old_workspace);
        self.pan_by_view(anchor_view - new_anchor_view);
    }

    /// Scrolls so that `point` (workspace) lands on the view center.
    pub fn scroll_to_workspace_point(&mut self, point: Point) {
        let in_view = self.workspace_to_view_point(point);
        self.pan_by_view(self.view_rect.center() - in_view);
    }

    /// Returns the visible workspace rectangle.
    #[must_use]
    pub fn visible_workspace_rect(&self) -> Rect {
        self.view_to_workspace_rect(self.view_rect)
    }

    /// Converts a workspace point into view coordinates.
    #[must_use]
    pub fn workspace_to_view_point(&self, pt: Point) -> Point {
        self.workspace_to_view * pt
    }

    /// Converts a view point into workspace coordinates.
    #[must_use]
    pub fn view_to_workspace_point(&self, pt: Point) -> Point {
        self.view_to_workspace * pt
    }

    /// Converts a workspace-space offset into a view-space offset.
    ///
    /// Pan is not applied; under right-to-left layout x is negated.
    #[must_use]
    pub fn workspace_to_view_delta(&self, delta: Vec2) -> Vec2 {
        Vec2::new(self.x_sign() * delta.x * self.zoom, delta.y * self.zoom)
    }

    /// Converts a view-space offset into a workspace-space offset.
    #[must_use]
    pub fn view_to_workspace_delta(&self, delta: Vec2) -> Vec2 {
        Vec2::new(self.x_sign() * delta.x / self.zoom, delta.y / self.zoom)
    }

    /// Converts a workspace rectangle into view coordinates.
    #[must_use]
    pub fn workspace_to_view_rect(&self, rect: Rect) -> Rect {
        // Two opposite corners are enough for an axis-aligned transform;
        // `Rect::from_points` reorders them when x is mirrored.
        Rect::from_points(
            self.workspace_to_view * rect.origin(),
            self.workspace_to_view * Point::new(rect.max_x(), rect.max_y()),
        )
    }

    /// Converts a view rectangle into workspace coordinates.
    #[must_use]
    pub fn view_to_workspace_rect(&self, rect: Rect) -> Rect {
        Rect::from_points(
            self.view_to_workspace * rect.origin(),
            self.view_to_workspace * Point::new(rect.max_x(), rect.max_y()),
        )
    }

    /// Converts a view point into screen coordinates.
    #[must_use]
    pub fn view_to_screen_point(&self, pt: Point) -> Point {
        pt + self.view_origin_on_screen.to_vec2()
    }

    /// Converts a screen point into view coordinates.
    #[must_use]
    pub fn screen_to_view_point(&self, pt: Point) -> Point {
        pt - self.view_origin_on_screen.to_vec2()
    }

    /// Converts a workspace point straight to screen coordinates.
    #[must_use]
    pub fn workspace_to_screen_point(&self, pt: Point) -> Point {
        self.view_to_screen_point(self.workspace_to_view_point(pt))
    }

    /// Converts a screen point straight to workspace coordinates.
    #[must_use]
    pub fn screen_to_workspace_point(&self, pt: Point) -> Point {
        self.view_to_workspace_point(self.screen_to_view_point(pt))
    }

    /// Snapshot of the current transform state for debugging and inspection.
    #[must_use]
    pub fn debug_info(&self) -> WorkspaceTransformDebugInfo {
        WorkspaceTransformDebugInfo {
            view_rect: self.view_rect,
            visible_workspace_rect: self.visible_workspace_rect(),
            zoom: self.zoom,
            pan: self.pan,
            rtl: self.rtl,
            max_snap_distance: self.config.snap_radius,
        }
    }

    fn x_sign(&self) -> f64 {
        if self.rtl { -1.0 } else { 1.0 }
    }

    fn rebuild_transforms(&mut self) {
        let anchor = if self.rtl {
            Vec2::new(self.view_rect.max_x(), self.view_rect.min_y())
        } else {
            self.view_rect.origin().to_vec2()
        };
        self.workspace_to_view = Affine::translate(anchor + self.pan)
            * Affine::scale_non_uniform(self.x_sign() * self.zoom, self.zoom);
        self.view_to_workspace = self.workspace_to_view.inverse();
    }

    fn clamp_to_bounds(&mut self) {
        if self.clamp_mode == ClampMode::None {
            return;
        }
        let bounds = match self.workspace_bounds {
            Some(b) if b.width() > 0.0 && b.height() > 0.0 => b,
            _ => return,
        };

        let visible = self.visible_workspace_rect();
        if visible.width() <= 0.0 || visible.height() <= 0.0 {
            return;
        }

        let mut dx = 0.0;
        let mut dy = 0.0;

        if visible.max_x() < bounds.min_x() {
            dx = bounds.min_x() - visible.max_x();
        } else if visible.min_x() > bounds.max_x() {
            dx = bounds.max_x() - visible.min_x();
        }

        if visible.max_y() < bounds.min_y() {
            dy = bounds.min_y() - visible.max_y();
        } else if visible.min_y() > bounds.max_y() {
            dy = bounds.max_y() - visible.min_y();
        }

        if dx != 0.0 || dy != 0.0 {
            // Moving the visible rect by +d in workspace space means moving
            // the content by -d in view space.
            self.pan -= self.workspace_to_view_delta(Vec2::new(dx, dy));
            self.rebuild_transforms();
        }
    }
}

/// Debug snapshot of a [`WorkspaceTransform`].
#[derive(Clone, Copy, Debug)]
pub struct WorkspaceTransformDebugInfo {
    /// Current view rectangle.
    pub view_rect: Rect,
    /// Workspace rectangle currently visible through the view.
    pub visible_workspace_rect: Rect,
    /// Current uniform zoom factor.
    pub zoom: f64,
    /// Current pan offset in view pixels.
    pub pan: Vec2,
    /// Whether workspace x is mirrored.
    pub rtl: bool,
    /// Snap radius in workspace units.
    pub max_snap_distance: f64,
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect, Vec2};

    use super::{ClampMode, TransformConfig, WorkspaceTransform};

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn workspace_view_roundtrip_ltr_and_rtl() {
        let mut t = WorkspaceTransform::new(Rect::new(0.0, 0.0, 800.0, 600.0));
        t.set_zoom(1.5);
        t.pan_by_view(Vec2::new(-30.0, 12.0));

        for rtl in [false, true] {
            t.set_rtl(rtl);
            let ws = Point::new(10.0, -5.0);
            let back = t.view_to_workspace_point(t.workspace_to_view_point(ws));
            assert!(close(back, ws), "roundtrip failed with rtl={rtl}");
        }
    }

    #[test]
    fn rtl_mirrors_around_right_edge() {
        let mut t = WorkspaceTransform::new(Rect::new(0.0, 0.0, 400.0, 300.0));
        t.set_rtl(true);

        assert!(close(
            t.workspace_to_view_point(Point::ZERO),
            Point::new(400.0, 0.0)
        ));
        assert!(close(
            t.workspace_to_view_point(Point::new(100.0, 50.0)),
            Point::new(300.0, 50.0)
        ));
    }

    #[test]
    fn deltas_ignore_pan_and_flip_under_rtl() {
        let mut t = WorkspaceTransform::new(Rect::new(0.0, 0.0, 400.0, 300.0));
        t.set_zoom(2.0);
        t.pan_by_view(Vec2::new(100.0, 100.0));

        assert_eq!(
            t.workspace_to_view_delta(Vec2::new(5.0, 5.0)),
            Vec2::new(10.0, 10.0)
        );
        t.set_rtl(true);
        assert_eq!(
            t.workspace_to_view_delta(Vec2::new(5.0, 5.0)),
            Vec2::new(-10.0, 10.0)
        );
        assert_eq!(
            t.view_to_workspace_delta(Vec2::new(-10.0, 10.0)),
            Vec2::new(5.0, 5.0)
        );
    }

    #[test]
    fn rect_conversion_is_normalized_under_rtl() {
        let mut t = WorkspaceTransform::new(Rect::new(0.0, 0.0, 400.0, 300.0));
        t.set_rtl(true);
        let r = t.workspace_to_view_rect(Rect::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(r, Rect::new(300.0, 0.0, 400.0, 50.0));
    }

    #[test]
    fn zoom_about_anchor_keeps_anchor_fixed() {
        let view_rect = Rect::new(0.0, 0.0, 800.0, 600.0);
        let mut t = WorkspaceTransform::new(view_rect);
        let anchor = view_rect.center();
        let before = t.view_to_workspace_point(anchor);

        t.zoom_about_view_point(anchor, 2.0);

        assert!(close(t.view_to_workspace_point(anchor), before));
        assert!((t.zoom() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn zoom_is_clamped_to_limits() {
        let config = TransformConfig {
            min_zoom: 0.5,
            max_zoom: 2.0,
            ..TransformConfig::default()
        };
        let mut t = WorkspaceTransform::with_config(Rect::new(0.0, 0.0, 10.0, 10.0), config);
        t.set_zoom(100.0);
        assert_eq!(t.zoom(), 2.0);
        t.set_zoom_limits(4.0, 3.0);
        assert_eq!(t.zoom(), 3.0);
    }

    #[test]
    fn screen_offset_applies_to_view_points() {
        let mut t = WorkspaceTransform::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        t.set_view_origin_on_screen(Point::new(20.0, 40.0));

        assert_eq!(
            t.workspace_to_screen_point(Point::new(1.0, 2.0)),
            Point::new(21.0, 42.0)
        );
        assert!(close(
            t.screen_to_workspace_point(Point::new(21.0, 42.0)),
            Point::new(1.0, 2.0)
        ));
    }

    #[test]
    fn scroll_to_point_centers_it() {
        let mut t = WorkspaceTransform::new(Rect::new(0.0, 0.0, 200.0, 100.0));
        t.scroll_to_workspace_point(Point::new(500.0, 500.0));
        assert!(close(
            t.workspace_to_view_point(Point::new(500.0, 500.0)),
            Point::new(100.0, 50.0)
        ));
    }

    #[test]
    fn clamping_is_inert_without_bounds() {
        let mut t = WorkspaceTransform::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(t.clamp_mode(), ClampMode::KeepSomeVisible);

        t.pan_by_view(Vec2::new(5000.0, 0.0));
        assert_eq!(t.pan(), Vec2::new(5000.0, 0.0));
    }

    #[test]
    fn clamping_keeps_blocks_in_sight() {
        let mut t = WorkspaceTransform::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let bounds = Rect::new(0.0, 0.0, 50.0, 50.0);
        t.set_workspace_bounds(Some(bounds));

        t.pan_by_view(Vec2::new(1000.0, 1000.0));
        let visible = t.visible_workspace_rect();
        assert!(visible.max_x() >= bounds.min_x() - 1e-6);
        assert!(visible.max_y() >= bounds.min_y() - 1e-6);

        t.set_clamp_mode(ClampMode::None);
        t.pan_by_view(Vec2::new(1000.0, 1000.0));
        assert!(t.visible_workspace_rect().max_x() < bounds.min_x());
    }

    #[test]
    fn debug_info_reports_snap_distance() {
        let mut t = WorkspaceTransform::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        t.set_max_snap_distance(40.0);
        let info = t.debug_info();
        assert_eq!(info.max_snap_distance, 40.0);
        assert_eq!(t.max_snap_distance(), 40.0);
        assert!(!info.rtl);
    }
}
