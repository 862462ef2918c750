//! Tunable workspace configuration.
//!
//! Font metrics and interaction thresholds were tuned against one editor font and one display
//! stack, so they live here as named, overridable values rather than being baked into the engines.
//! Every field defaults to the matching value in [`crate::constants`].

use crate::constants::*;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Overridable constants used by placement, sizing, navigation, pointer handling and arrows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Average character advance in pixels
    pub average_char_width: f32,
    /// Width of the line-number gutter in pixels
    pub gutter_width: f32,
    /// Height of one rendered line
    pub line_height: f32,
    /// Height of a pane header strip
    pub header_height: f32,
    /// Minimum pane width
    pub min_pane_width: f32,
    /// Minimum pane height
    pub min_pane_height: f32,
    /// Pane width used when no line metadata is available
    pub default_pane_width: f32,
    /// Height of a pane with no content
    pub empty_pane_height: f32,
    /// Padding kept between placed panes and the viewport edges
    pub viewport_padding: f32,
    /// Horizontal gap between a pane and one opened next to it
    pub adjacent_gap: f32,
    /// Lowest canvas scale
    pub min_scale: f32,
    /// Highest canvas scale
    pub max_scale: f32,
    /// Number of steps a navigation animation is split into
    pub navigation_steps: u32,
    /// Duration of a navigation animation in milliseconds
    pub navigation_duration_ms: u64,
    /// Zoom damping for pinch gestures
    pub pinch_zoom_damping: f32,
    /// Zoom damping for mouse wheels
    pub wheel_zoom_damping: f32,
    /// Keyboard camera nudge in pixels
    pub camera_nudge: f32,
    /// Keyboard camera nudge with shift held
    pub camera_shift_nudge: f32,
    /// Resize hit margin around pane edges
    pub resize_margin: f32,
    /// Move emission threshold
    pub move_threshold: f32,
    /// Move emission threshold with the coarse modifier held
    pub coarse_move_threshold: f32,
    /// Whether middle-clicking a pane header closes the pane
    pub middle_click_close: bool,
    /// Undo batching window in milliseconds
    pub undo_batch_window_ms: u64,
    /// Maximum retained undo entries
    pub max_undo_history: usize,
    /// Dash length for same-file arrows
    pub arrow_dash: f32,
    /// Gap length for same-file arrows
    pub arrow_gap: f32,
    /// Distance of the wing base from the arrow tip
    pub arrow_length: f32,
    /// Length of each arrow wing
    pub arrow_wing_length: f32,
    /// Radius of the source circle on one-way arrows
    pub arrow_circle_radius: f32,
    /// Arrow stroke width
    pub arrow_stroke_width: f32,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            average_char_width: AVERAGE_CHAR_WIDTH,
            gutter_width: GUTTER_WIDTH,
            line_height: LINE_HEIGHT,
            header_height: HEADER_HEIGHT,
            min_pane_width: MIN_EDITOR_WIDTH,
            min_pane_height: MIN_EDITOR_HEIGHT,
            default_pane_width: DEFAULT_EDITOR_WIDTH,
            empty_pane_height: EMPTY_EDITOR_HEIGHT,
            viewport_padding: VIEWPORT_PADDING,
            adjacent_gap: ADJACENT_GAP,
            min_scale: MIN_CANVAS_SCALE,
            max_scale: MAX_CANVAS_SCALE,
            navigation_steps: NAVIGATION_STEPS,
            navigation_duration_ms: NAVIGATION_DURATION_MS,
            pinch_zoom_damping: PINCH_ZOOM_DAMPING,
            wheel_zoom_damping: WHEEL_ZOOM_DAMPING,
            camera_nudge: CAMERA_NUDGE,
            camera_shift_nudge: CAMERA_SHIFT_NUDGE,
            resize_margin: RESIZE_MARGIN,
            move_threshold: MOVE_THRESHOLD,
            coarse_move_threshold: COARSE_MOVE_THRESHOLD,
            middle_click_close: true,
            undo_batch_window_ms: UNDO_BATCH_WINDOW_MS,
            max_undo_history: MAX_UNDO_HISTORY,
            arrow_dash: ARROW_DASH,
            arrow_gap: ARROW_GAP,
            arrow_length: ARROW_LENGTH,
            arrow_wing_length: ARROW_WING_LENGTH,
            arrow_circle_radius: ARROW_CIRCLE_RADIUS,
            arrow_stroke_width: ARROW_STROKE_WIDTH,
        }
    }
}

impl WorkspaceConfig {
    /// Parses a configuration from JSON. Missing fields keep their defaults.
    ///
    /// # Arguments
    ///
    /// * `json` - A JSON object with any subset of the config fields
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the configuration to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Clamps a scale into the configured bounds.
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.min_scale, self.max_scale)
    }

    /// Computes the canvas size of a pane showing a file with the given metrics.
    ///
    /// Width grows with the longest line (plus gutter) but never drops below the minimum pane
    /// width or exceeds `max_size.x`; height grows with the line count up to `max_size.y`.
    ///
    /// # Arguments
    ///
    /// * `num_lines` - Number of lines the pane shows
    /// * `longest_line_column` - Column of the longest line
    /// * `max_size` - Upper bound for the size, usually the viewport size
    pub fn pane_size_for_lines(
        &self,
        num_lines: u32,
        longest_line_column: u32,
        max_size: crate::Vector,
    ) -> crate::Vector {
        let num_lines = num_lines.max(MIN_LINES) as f32;
        let longest_line_width =
            ((longest_line_column as f32 + EXTRA_COLUMNS) * self.average_char_width).round()
                + self.gutter_width;
        let width = longest_line_width
            .max(self.min_pane_width)
            .min(max_size.x.max(self.min_pane_width));
        let height = ((num_lines + EXTRA_LINES) * self.line_height + self.header_height)
            .min(max_size.y);
        crate::Vector::new(width, height)
    }

    /// Canvas size used when no line metadata is available.
    ///
    /// # Arguments
    ///
    /// * `num_lines` - Number of lines, if known
    pub fn default_pane_size(&self, num_lines: Option<u32>) -> crate::Vector {
        let height = match num_lines {
            Some(lines) => (lines as f32 + EXTRA_LINES) * self.line_height + self.header_height,
            None => self.empty_pane_height,
        };
        crate::Vector::new(self.default_pane_width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector;

    #[test]
    fn test_from_json_keeps_defaults_for_missing_fields() {
        let config = WorkspaceConfig::from_json(r#"{ "average_char_width": 8.0 }"#).unwrap();
        assert_eq!(config.average_char_width, 8.0);
        assert_eq!(config.gutter_width, GUTTER_WIDTH);
        assert_eq!(config.max_undo_history, MAX_UNDO_HISTORY);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(WorkspaceConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_pane_size_for_lines() {
        let config = WorkspaceConfig::default();
        let max = Vector::new(2000.0, 2000.0);

        // Short files are clamped to the minimum width and at least five lines.
        let size = config.pane_size_for_lines(1, 10, max);
        assert_eq!(size.x, MIN_EDITOR_WIDTH);
        assert_eq!(size.y, 10.0 * LINE_HEIGHT + HEADER_HEIGHT);

        // Long lines grow the width.
        let size = config.pane_size_for_lines(20, 100, max);
        assert_eq!(size.x, (105.0_f32 * 7.23).round() + 73.0);
        assert_eq!(size.y, 25.0 * LINE_HEIGHT + HEADER_HEIGHT);

        // Everything is capped by the maximum size.
        let size = config.pane_size_for_lines(500, 1000, Vector::new(900.0, 700.0));
        assert_eq!(size, Vector::new(900.0, 700.0));
    }

    #[test]
    fn test_clamp_scale() {
        let config = WorkspaceConfig::default();
        assert_eq!(config.clamp_scale(5.0), MAX_CANVAS_SCALE);
        assert_eq!(config.clamp_scale(0.01), MIN_CANVAS_SCALE);
        assert_eq!(config.clamp_scale(1.0), 1.0);
    }
}
