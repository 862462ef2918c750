//! Shared workspace-wide constants.
//! Centralizes the default values that seed [`crate::WorkspaceConfig`] and the fixed protocol values
//! (bitmasks, step counts) used across the engines.

// Pane dimensions
/// Height of a pane header strip, in canvas units.
pub const HEADER_HEIGHT: f32 = 25.0;
/// Height of a single rendered line of code, in canvas units.
pub const LINE_HEIGHT: f32 = 18.0;
/// Minimum width a pane can be resized to.
pub const MIN_EDITOR_WIDTH: f32 = 600.0;
/// Minimum height a pane can be resized to.
pub const MIN_EDITOR_HEIGHT: f32 = 150.0;
/// Width used when no line metadata is available for a new pane.
pub const DEFAULT_EDITOR_WIDTH: f32 = 800.0;
/// Height used for panes with no content.
pub const EMPTY_EDITOR_HEIGHT: f32 = 80.0;
/// Extra lines added below the content when sizing a pane.
pub const EXTRA_LINES: f32 = 5.0;
/// Extra columns added to the longest line when sizing a pane.
pub const EXTRA_COLUMNS: f32 = 5.0;
/// Fewest lines a sized pane will show.
pub const MIN_LINES: u32 = 5;

// Font metrics, tuned to the default editor font
/// Average character advance in pixels.
pub const AVERAGE_CHAR_WIDTH: f32 = 7.23;
/// Width of the line-number gutter in pixels.
pub const GUTTER_WIDTH: f32 = 73.0;

// Viewport
/// Padding kept between placed panes and the viewport edges.
pub const VIEWPORT_PADDING: f32 = 25.0;
/// Horizontal gap between a pane and a pane opened next to it.
pub const ADJACENT_GAP: f32 = 20.0;
/// Lowest allowed canvas scale.
pub const MIN_CANVAS_SCALE: f32 = 0.2;
/// Highest allowed canvas scale.
pub const MAX_CANVAS_SCALE: f32 = 2.0;

// Placement search
/// Number of viewport-wide pages scanned before giving up.
pub const PLACEMENT_PAGES: usize = 5;
/// Divisor applied to the viewport size to obtain the scan step.
pub const PLACEMENT_STEP_DIVISOR: f32 = 100.0;

// Navigation animation
/// Number of discrete steps a camera navigation is split into.
pub const NAVIGATION_STEPS: u32 = 20;
/// Total duration of a camera navigation in milliseconds.
pub const NAVIGATION_DURATION_MS: u64 = 250;

// Camera control
/// Zoom damping for pinch gestures.
pub const PINCH_ZOOM_DAMPING: f32 = 0.01;
/// Zoom damping for mouse wheels.
pub const WHEEL_ZOOM_DAMPING: f32 = 0.001;
/// Keyboard camera nudge in pixels.
pub const CAMERA_NUDGE: f32 = 5.0;
/// Keyboard camera nudge with shift held.
pub const CAMERA_SHIFT_NUDGE: f32 = 25.0;

// Pointer interactions
/// Pixel distance from an edge within which a resize is offered.
pub const RESIZE_MARGIN: f32 = 6.0;
/// Accumulated movement needed before a move delta is emitted.
pub const MOVE_THRESHOLD: f32 = 1.0;
/// Accumulated movement needed with the coarse-drag modifier held.
pub const COARSE_MOVE_THRESHOLD: f32 = 50.0;
/// Squared distance a secondary-button drag must travel before it becomes a pan.
pub const CONTEXT_MENU_DRAG_DISTANCE_SQUARED: f32 = 500.0;

// Arrows
/// Length of a dash in same-file arrows.
pub const ARROW_DASH: f32 = 10.0;
/// Gap between dashes in same-file arrows.
pub const ARROW_GAP: f32 = 5.0;
/// Distance the wing base is set back from the tip.
pub const ARROW_LENGTH: f32 = 10.0;
/// Length of each arrow wing.
pub const ARROW_WING_LENGTH: f32 = 10.0;
/// Radius of the circle drawn at the source of a one-way arrow.
pub const ARROW_CIRCLE_RADIUS: f32 = 10.0;
/// Stroke width of arrows in pixels.
pub const ARROW_STROKE_WIDTH: f32 = 3.0;
/// Fallback arrow color when no highlight color has been assigned.
pub const UNASSIGNED_ARROW_COLOR: u32 = 0x000000;

// Spatial traversal
/// Index reported for the tenth visible pane (keyboard digit 0).
pub const TENTH_PANE_SLOT: usize = 10;

// Undo/redo
/// Maximum number of undo history entries to retain.
pub const MAX_UNDO_HISTORY: usize = 100;
/// Mutations closer together than this fold into one undo entry.
pub const UNDO_BATCH_WINDOW_MS: u64 = 250;
