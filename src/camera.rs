//! Camera state, canvas/viewport transforms, and animated navigation.
//!
//! The camera is stored as the viewport-space offset of the canvas origin together with a scale.
//! Pane positions are offsets from that origin, so a pane's on-screen position is
//! `camera.position + pane.position` while its on-screen size is `pane.size * scale`. Zooming
//! therefore rescales pane positions around the zoom anchor (see [`rescale_around`]).
//!
//! Navigation computes a camera delta (and optionally a scale delta) and splits it into a fixed
//! number of steps that the host applies as time passes via [`NavigationAnimation::take_due`].

use crate::config::WorkspaceConfig;
use crate::geometry::{Rect, Vector};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Camera offset and zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    /// Viewport-space offset of the canvas origin
    pub position: Vector,
    /// Zoom factor (1.0 = 100%)
    pub scale: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            position: Vector::ZERO,
            scale: 1.0,
        }
    }
}

impl CameraState {
    /// Creates a camera.
    pub fn new(position: Vector, scale: f32) -> Self {
        Self { position, scale }
    }

    /// Converts a canvas position to viewport space.
    pub fn to_viewport(&self, canvas: Vector) -> Vector {
        canvas + self.position
    }

    /// Converts a viewport position to canvas space.
    pub fn to_canvas(&self, viewport: Vector) -> Vector {
        viewport - self.position
    }
}

/// How far a navigation moves the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationType {
    /// Center the target in the viewport
    Center,
    /// Move only as far as needed to bring the target (plus padding) into view
    JustEnough,
}

/// Rescales a canvas position around a viewport anchor.
///
/// With `adjusted = anchor - camera`, the result is `(position - adjusted) * ratio + adjusted`, which
/// keeps whatever pane content sat under `anchor` at the same viewport point once sizes are also
/// multiplied by `ratio`.
///
/// # Arguments
///
/// * `position` - Canvas position to rescale
/// * `anchor` - Viewport point that stays fixed
/// * `camera` - Camera offset
/// * `ratio` - New scale divided by old scale
pub fn rescale_around(position: Vector, anchor: Vector, camera: Vector, ratio: f32) -> Vector {
    let adjusted = anchor - camera;
    (position - adjusted) * ratio + adjusted
}

/// Camera offset delta that brings `target` into view, or `None` if it is already fully visible.
///
/// # Arguments
///
/// * `target` - Target bounds in viewport space
/// * `viewport_size` - Size of the viewport
/// * `mode` - Navigation type
/// * `padding` - Padding kept around the target in `JustEnough` mode
pub fn navigation_delta(
    target: &Rect,
    viewport_size: Vector,
    mode: NavigationType,
    padding: f32,
) -> Option<Vector> {
    let viewport = Rect::from_position_and_size(Vector::ZERO, viewport_size);
    if viewport.contains_rect(target) {
        return None;
    }
    Some(unconditional_navigation_delta(
        target,
        viewport_size,
        mode,
        padding,
    ))
}

/// Camera offset delta for a navigation, whether or not the target is already visible.
pub fn unconditional_navigation_delta(
    target: &Rect,
    viewport_size: Vector,
    mode: NavigationType,
    padding: f32,
) -> Vector {
    match mode {
        NavigationType::Center => {
            Rect::from_position_and_size(Vector::ZERO, viewport_size).center() - target.center()
        }
        NavigationType::JustEnough => {
            let margin = padding * 2.0;
            let x = if target.left() < 0.0 {
                margin - target.left()
            } else if target.right() > viewport_size.x {
                viewport_size.x - target.right() - margin
            } else {
                0.0
            };
            let y = if target.top() < 0.0 {
                margin - target.top()
            } else if target.bottom() > viewport_size.y {
                viewport_size.y - target.bottom() - margin
            } else {
                0.0
            };
            Vector::new(x, y)
        }
    }
}

/// Scale change needed for a pane of `canvas_size` to fit the viewport, or 0 if it already fits.
///
/// Width is checked first; height only when the width fits.
pub fn scale_delta_to_fit(canvas_size: Vector, viewport_size: Vector, scale: f32) -> f32 {
    if canvas_size.x * scale > viewport_size.x && canvas_size.x > 0.0 {
        viewport_size.x / canvas_size.x - scale
    } else if canvas_size.y * scale > viewport_size.y && canvas_size.y > 0.0 {
        viewport_size.y / canvas_size.y - scale
    } else {
        0.0
    }
}

/// One scheduled slice of a navigation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationStep {
    /// When the step becomes due
    pub due: Instant,
    /// Camera offset change applied by this step
    pub camera_delta: Vector,
    /// Scale change applied by this step
    pub scale_delta: f32,
    /// Whether this is the final step of its navigation
    pub is_last: bool,
}

/// Queue of scheduled navigation steps.
#[derive(Debug, Clone, Default)]
pub struct NavigationAnimation {
    steps: VecDeque<NavigationStep>,
}

impl NavigationAnimation {
    /// Creates an idle animation queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any scheduled steps with a new navigation.
    ///
    /// The total delta is split evenly over `config.navigation_steps` steps spaced
    /// `navigation_duration_ms / navigation_steps` apart, the first one due immediately.
    ///
    /// # Arguments
    ///
    /// * `start` - Time the navigation starts
    /// * `camera_delta` - Total camera offset change
    /// * `scale_delta` - Total scale change
    /// * `config` - Supplies the step count and duration
    pub fn schedule(
        &mut self,
        start: Instant,
        camera_delta: Vector,
        scale_delta: f32,
        config: &WorkspaceConfig,
    ) {
        self.cancel();
        let steps = config.navigation_steps.max(1);
        let interval = Duration::from_millis(config.navigation_duration_ms) / steps;
        let step_delta = camera_delta / steps as f32;
        let step_scale = scale_delta / steps as f32;
        for index in 0..steps {
            self.steps.push_back(NavigationStep {
                due: start + interval * index,
                camera_delta: step_delta,
                scale_delta: step_scale,
                is_last: index + 1 == steps,
            });
        }
    }

    /// Drops every scheduled step.
    pub fn cancel(&mut self) {
        self.steps.clear();
    }

    /// Returns true while steps remain.
    pub fn is_animating(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Number of steps still scheduled.
    pub fn pending_steps(&self) -> usize {
        self.steps.len()
    }

    /// Removes and returns every step due at or before `now`, in order.
    pub fn take_due(&mut self, now: Instant) -> Vec<NavigationStep> {
        let mut due = Vec::new();
        while let Some(step) = self.steps.front() {
            if step.due > now {
                break;
            }
            if let Some(step) = self.steps.pop_front() {
                due.push(step);
            }
        }
        due
    }
}
