//! Camera, zoom, animated navigation and spatial traversal.

use super::WorkspaceStore;
use crate::camera::{
    navigation_delta, rescale_around, scale_delta_to_fit, unconditional_navigation_delta,
    NavigationType,
};
use crate::geometry::Vector;
use crate::graph::TraversalDirection;
use crate::pointer::Modifiers;
use crate::types::{PaneId, Selection};
use log::debug;
use std::sync::Arc;

impl WorkspaceStore {
    /// Moves the camera offset.
    pub fn set_camera(&mut self, position: Vector) {
        if self.camera.position == position {
            return;
        }
        self.camera.position = position;
        self.refresh_arrows();
        self.refresh_targets();
    }

    /// Changes the canvas scale, keeping the content under `anchor` fixed on screen.
    ///
    /// Pane positions are rescaled around the anchor; this is not recorded for undo.
    ///
    /// # Arguments
    ///
    /// * `scale` - New scale, clamped to the configured bounds
    /// * `anchor` - Viewport point that stays fixed, usually the pointer
    pub fn set_scale(&mut self, scale: f32, anchor: Vector) {
        let scale = self.context.config.clamp_scale(scale);
        if scale == self.camera.scale {
            return;
        }
        let ratio = scale / self.camera.scale;

        let mut panes = (*self.panes).clone();
        for pane in panes.values_mut() {
            if !pane.kind.is_references() {
                pane.position = rescale_around(pane.position, anchor, self.camera.position, ratio);
            }
        }
        self.camera.scale = scale;
        self.set_panes_untracked(panes);
        self.refresh_arrows();
    }

    /// Handles a wheel or trackpad gesture.
    ///
    /// With ctrl or meta held the gesture zooms around `position`. Otherwise it pans, and
    /// shift turns a vertical wheel into a horizontal pan.
    ///
    /// # Arguments
    ///
    /// * `delta` - Scroll delta in pixels
    /// * `position` - Pointer position in viewport space
    /// * `modifiers` - Held modifiers
    /// * `is_pinch` - True for trackpad pinch gestures, which zoom faster
    pub fn wheel(&mut self, delta: Vector, position: Vector, modifiers: Modifiers, is_pinch: bool) {
        if modifiers.ctrl || modifiers.meta {
            let damping = if is_pinch {
                self.context.config.pinch_zoom_damping
            } else {
                self.context.config.wheel_zoom_damping
            };
            self.set_scale(self.camera.scale - delta.y * damping, position);
        } else if modifiers.shift && delta.x == 0.0 {
            let camera = self.camera.position - Vector::new(delta.y, 0.0);
            self.set_camera(camera);
        } else {
            let camera = self.camera.position - delta;
            self.set_camera(camera);
        }
    }

    /// Nudges the camera from the keyboard.
    ///
    /// # Arguments
    ///
    /// * `direction` - Unit direction, e.g. `(1, 0)` for the right arrow key
    /// * `shift` - Use the larger nudge
    pub fn nudge_camera(&mut self, direction: Vector, shift: bool) {
        let config = &self.context.config;
        let amount = if shift {
            config.camera_shift_nudge
        } else {
            config.camera_nudge
        };
        let camera = self.camera.position - direction * amount;
        self.set_camera(camera);
    }

    /// Selects and focuses a pane and animates the camera to it, zooming out if it does not fit.
    ///
    /// Pinned and references panes are selected but the camera stays put.
    pub fn navigate_to_pane(&mut self, id: PaneId, mode: NavigationType) {
        let Some(pane) = self.panes.get(&id) else {
            return;
        };
        let skip_camera = pane.is_pinned || pane.kind.is_references();
        let target = pane.viewport_rect(&self.camera);
        let size = pane.size;

        self.set_selection(Selection::from([id]));
        self.focus_pane(id);
        if skip_camera {
            return;
        }

        let delta = unconditional_navigation_delta(
            &target,
            self.viewport_size,
            mode,
            self.context.config.viewport_padding,
        );
        self.schedule_navigation(delta, size);
    }

    /// Animates to a freshly inserted pane only if it is not already fully visible.
    pub(super) fn navigate_to_new_pane(&mut self, id: PaneId) {
        let Some(pane) = self.panes.get(&id) else {
            return;
        };
        if pane.is_pinned {
            return;
        }
        let size = pane.size;
        if let Some(delta) = navigation_delta(
            &pane.viewport_rect(&self.camera),
            self.viewport_size,
            NavigationType::JustEnough,
            self.context.config.viewport_padding,
        ) {
            self.schedule_navigation(delta, size);
        }
    }

    fn schedule_navigation(&mut self, camera_delta: Vector, canvas_size: Vector) {
        let scale_delta = scale_delta_to_fit(canvas_size, self.viewport_size, self.camera.scale);
        debug!(
            "navigating by {:?} with scale change {}",
            camera_delta, scale_delta
        );
        let now = self.context.clock.now();
        self.animation
            .schedule(now, camera_delta, scale_delta, &self.context.config);
    }

    /// Applies every navigation step that is due.
    ///
    /// Hosts call this each frame while [`WorkspaceStore::is_animating`] is true.
    ///
    /// # Returns
    ///
    /// True if the camera changed.
    pub fn advance(&mut self) -> bool {
        let steps = self.animation.take_due(self.context.clock.now());
        if steps.is_empty() {
            return false;
        }
        let center = self.viewport_size / 2.0;
        for step in steps {
            self.camera.position += step.camera_delta;
            if step.scale_delta != 0.0 {
                self.set_scale(self.camera.scale + step.scale_delta, center);
            }
        }
        self.refresh_arrows();
        self.refresh_targets();
        true
    }

    /// Returns true while a navigation animation has steps left.
    pub fn is_animating(&self) -> bool {
        self.animation.is_animating()
    }

    /// Moves to the next or previous pane in reading order and centers it.
    ///
    /// # Returns
    ///
    /// The pane navigated to, if any.
    pub fn next_pane(&mut self, direction: TraversalDirection) -> Option<PaneId> {
        let panes = Arc::clone(&self.panes);
        let selection = Arc::clone(&self.selection);
        let id = self.graph.sorter_mut().next_pane(
            direction,
            &panes,
            &selection,
            &self.camera,
            self.viewport_size,
        )?;

        // Select directly so the traversal cursor survives.
        self.selection = Arc::new(Selection::from([id]));
        self.navigate_to_pane(id, NavigationType::Center);
        self.commit();
        Some(id)
    }

    /// Selects and focuses the `n`th visible pane in reading order. `n == 0` is the tenth.
    pub fn nth_pane_in_viewport(&mut self, n: usize) -> Option<PaneId> {
        let panes = Arc::clone(&self.panes);
        let id = self
            .graph
            .sorter_mut()
            .nth_pane_in_viewport(n, &panes, &self.camera, self.viewport_size)?;
        self.select_pane(id, true);
        self.focus_pane(id);
        Some(id)
    }

    /// Reading-order number shown on a visible pane, with the tenth shown as 0.
    pub fn enumeration_in_viewport(&mut self, id: PaneId) -> Option<usize> {
        let panes = Arc::clone(&self.panes);
        self.graph
            .sorter_mut()
            .enumeration_in_viewport(id, &panes, &self.camera, self.viewport_size)
    }
}
