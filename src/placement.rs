//! Collision-free placement of new and relocated panes.
//!
//! The search runs in viewport space because that is where the user sees free room. It scans the
//! viewport row by row at a coarse step, jumping past any pane it collides with, and then
//! continues over up to [`PLACEMENT_PAGES`] viewport-wide pages to the right. Slots that fit fully
//! inside the viewport win immediately; a slot that only fits by hanging off the viewport edge is
//! kept as a fallback in case nothing better turns up.

use crate::camera::CameraState;
use crate::constants::{PLACEMENT_PAGES, PLACEMENT_STEP_DIVISOR};
use crate::geometry::{Rect, Vector};
use crate::types::Pane;

/// Viewport description the placement search runs against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementEngine {
    /// Current camera
    pub camera: CameraState,
    /// Full viewport size in pixels
    pub viewport_size: Vector,
    /// Padding kept free at the viewport edges
    pub padding: f32,
}

impl PlacementEngine {
    /// Creates a placement engine for the given camera and viewport.
    pub fn new(camera: CameraState, viewport_size: Vector, padding: f32) -> Self {
        Self {
            camera,
            viewport_size,
            padding,
        }
    }

    /// Viewport size minus the padding on the right and on both the top and bottom.
    pub fn padded_viewport(&self) -> Vector {
        Vector::new(
            self.viewport_size.x - self.padding,
            self.viewport_size.y - self.padding * 2.0,
        )
    }

    /// Finds a canvas position for an unpinned pane of `size` near `anchor`.
    ///
    /// Every existing pane except references panes is an obstacle, pinned panes by their
    /// viewport bounds. With no obstacles the anchor is returned unchanged.
    ///
    /// # Arguments
    ///
    /// * `anchor` - Preferred canvas position
    /// * `size` - Canvas size of the new pane
    /// * `panes` - Existing panes
    ///
    /// # Returns
    ///
    /// The canvas position for the new pane.
    pub fn place<'a>(
        &self,
        anchor: Vector,
        size: Vector,
        panes: impl IntoIterator<Item = &'a Pane>,
    ) -> Vector {
        let panes: Vec<&Pane> = panes
            .into_iter()
            .filter(|pane| !pane.kind.is_references())
            .collect();
        if panes.is_empty() {
            return anchor;
        }

        let viewport = self.padded_viewport();
        let scaled_size = size * self.camera.scale;
        let start = self.camera.to_viewport(anchor);

        let top = panes
            .iter()
            .filter(|pane| !pane.is_pinned)
            .map(|pane| pane.viewport_position(&self.camera).y)
            .filter(|y| *y >= 0.0 && *y <= viewport.y && y + scaled_size.y < viewport.y)
            .fold(None, |top: Option<f32>, y| Some(top.map_or(y, |top| top.min(y))))
            .unwrap_or(start.y);

        let obstacles: Vec<Rect> = panes
            .iter()
            .map(|pane| pane.viewport_rect(&self.camera))
            .collect();

        let found = search(start.x, top, scaled_size, &obstacles, viewport);
        self.camera.to_canvas(found)
    }

    /// Finds a viewport position for a pinned pane of `size` near `anchor`.
    ///
    /// Only other pinned panes are obstacles and no camera conversion happens.
    ///
    /// # Arguments
    ///
    /// * `anchor` - Preferred viewport position
    /// * `size` - Viewport size of the pinned pane
    /// * `panes` - Existing panes
    pub fn place_pinned<'a>(
        &self,
        anchor: Vector,
        size: Vector,
        panes: impl IntoIterator<Item = &'a Pane>,
    ) -> Vector {
        let obstacles: Vec<Rect> = panes
            .into_iter()
            .filter(|pane| pane.is_pinned)
            .map(|pane| Rect::from_position_and_size(pane.pinned_position, pane.pinned_size))
            .collect();
        if obstacles.is_empty() {
            return anchor;
        }

        let viewport = self.padded_viewport();
        let top = obstacles
            .iter()
            .map(|rect| rect.top())
            .filter(|y| *y >= 0.0 && *y <= viewport.y && y + size.y < viewport.y)
            .fold(None, |top: Option<f32>, y| Some(top.map_or(y, |top| top.min(y))))
            .unwrap_or(anchor.y);

        search(anchor.x, top, size, &obstacles, viewport)
    }
}

/// Scans pages of the viewport for a slot of `size` that avoids every obstacle.
fn search(start_x: f32, top: f32, size: Vector, obstacles: &[Rect], viewport: Vector) -> Vector {
    let step_x = (viewport.x / PLACEMENT_STEP_DIVISOR).max(1.0);
    let step_y = (viewport.y / PLACEMENT_STEP_DIVISOR).max(1.0);
    let mut fallback: Option<Vector> = None;

    for page in 0..PLACEMENT_PAGES {
        let page_start = page as f32 * viewport.x;
        let page_end = viewport.x * (page + 1) as f32;
        let mut y = top;
        while y <= viewport.y {
            let mut x = start_x.max(page_start);
            while x <= page_end {
                if page > 0 {
                    if let Some(fallback) = fallback {
                        return fallback;
                    }
                }

                let candidate = Rect::from_position_and_size(Vector::new(x, y), size);
                let extends_outside = page == 0
                    && (candidate.right() > viewport.x || candidate.bottom() > viewport.y);
                if extends_outside && fallback.is_some() {
                    x += step_x;
                    continue;
                }

                match obstacles.iter().find(|obstacle| obstacle.intersects(&candidate)) {
                    Some(obstacle) => x = x.max(obstacle.right()),
                    None if extends_outside => fallback = Some(Vector::new(x, y)),
                    None => return Vector::new(x, y),
                }
                x += step_x;
            }
            y += step_y;
        }
    }

    fallback.unwrap_or(viewport)
}
