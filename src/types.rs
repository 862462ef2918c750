//! Core data types for the canvas workspace.
//!
//! This module defines the pane entity with its shared geometry and per-variant payload,
//! plus the small value types (ranges, identifiers, theme) that flow between the engines.

use crate::camera::CameraState;
use crate::geometry::{Rect, Vector};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::mem;
use uuid::Uuid;

/// Unique identifier for panes.
pub type PaneId = Uuid;

/// The pane collection, keyed by id.
pub type PaneMap = HashMap<PaneId, Pane>;

/// The set of selected pane ids.
pub type Selection = HashSet<PaneId>;

/// Opaque handle returned by the editor host for a mounted editing widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EditorIdentifier {
    /// Host group the editor was opened in
    pub group_id: u64,
    /// Host-local editor handle
    pub editor: u64,
}

/// A range of text in a document, 1-based like editor positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    /// First line of the range
    pub start_line: u32,
    /// First column of the range
    pub start_column: u32,
    /// Last line of the range
    pub end_line: u32,
    /// Column just past the range
    pub end_column: u32,
}

impl TextRange {
    /// Creates a range spanning whole lines.
    pub fn lines(start_line: u32, end_line: u32) -> Self {
        Self {
            start_line,
            start_column: 1,
            end_line,
            end_column: 1,
        }
    }

    /// Number of lines the range covers.
    pub fn line_count(&self) -> u32 {
        self.end_line.saturating_sub(self.start_line) + 1
    }
}

/// The symbol a pane is scoped to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneSymbol {
    /// Display name of the symbol
    pub name: String,
    /// Range the symbol occupies in its file
    pub range: TextRange,
}

/// Color theme, used to pick arrow palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    /// Light backgrounds
    Light,
    /// Dark backgrounds
    #[default]
    Dark,
}

/// Variant-specific payload of a pane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PaneKind {
    /// A code editor over a file, optionally scoped to one symbol
    Code {
        /// Document uri
        uri: String,
        /// Path shown in the header
        file_path: String,
        /// Symbol the pane is scoped to, if any
        symbol: Option<PaneSymbol>,
        /// Range being edited, overriding the symbol range for relationship queries
        edit_range: Option<TextRange>,
        /// Host handle once the widget is mounted
        identifier: Option<EditorIdentifier>,
    },
    /// A side-by-side diff
    Diff {
        /// Path shown in the header
        file_path: String,
        /// Uri of the original side
        original_uri: String,
        /// Uri of the modified side
        modified_uri: String,
        /// Host handle once the widget is mounted
        identifier: Option<EditorIdentifier>,
    },
    /// A transient preview that can be manifested into a code pane
    Ghost {
        /// Document uri
        uri: String,
        /// Path shown in the header
        file_path: String,
        /// Symbol the preview shows
        symbol: Option<PaneSymbol>,
        /// Host handle once the widget is mounted
        identifier: Option<EditorIdentifier>,
    },
    /// An editor shown in a modal frame
    Modal {
        /// Header title
        title: String,
        /// Host handle once the widget is mounted
        identifier: Option<EditorIdentifier>,
    },
    /// A three-way merge editor
    Merge {
        /// Document uri
        uri: String,
        /// Host handle once the widget is mounted
        identifier: Option<EditorIdentifier>,
    },
    /// An ephemeral list of references
    References {
        /// Document the references were requested from
        uri: String,
        /// Range of the requesting symbol
        range: TextRange,
    },
    /// Settings page
    Settings,
    /// Keybindings page
    Keybindings,
}

impl PaneKind {
    /// Host identifier, for variants that mount an editing widget.
    pub fn identifier(&self) -> Option<EditorIdentifier> {
        match self {
            PaneKind::Code { identifier, .. }
            | PaneKind::Diff { identifier, .. }
            | PaneKind::Ghost { identifier, .. }
            | PaneKind::Modal { identifier, .. }
            | PaneKind::Merge { identifier, .. } => *identifier,
            PaneKind::References { .. } | PaneKind::Settings | PaneKind::Keybindings => None,
        }
    }

    /// Sets the host identifier. Variants without a widget ignore it.
    pub fn set_identifier(&mut self, value: EditorIdentifier) {
        match self {
            PaneKind::Code { identifier, .. }
            | PaneKind::Diff { identifier, .. }
            | PaneKind::Ghost { identifier, .. }
            | PaneKind::Modal { identifier, .. }
            | PaneKind::Merge { identifier, .. } => *identifier = Some(value),
            PaneKind::References { .. } | PaneKind::Settings | PaneKind::Keybindings => {}
        }
    }

    /// Document uri, if the variant shows a single document.
    pub fn uri(&self) -> Option<&str> {
        match self {
            PaneKind::Code { uri, .. }
            | PaneKind::Ghost { uri, .. }
            | PaneKind::Merge { uri, .. }
            | PaneKind::References { uri, .. } => Some(uri),
            PaneKind::Diff { modified_uri, .. } => Some(modified_uri),
            PaneKind::Modal { .. } | PaneKind::Settings | PaneKind::Keybindings => None,
        }
    }

    /// Range of the symbol the pane is scoped to.
    pub fn symbol_range(&self) -> Option<TextRange> {
        match self {
            PaneKind::Code { symbol, .. } | PaneKind::Ghost { symbol, .. } => {
                symbol.as_ref().map(|symbol| symbol.range)
            }
            _ => None,
        }
    }

    /// Range used when asking the symbol provider about this pane.
    pub fn relationship_range(&self) -> Option<TextRange> {
        match self {
            PaneKind::Code {
                edit_range, symbol, ..
            } => edit_range.or_else(|| symbol.as_ref().map(|symbol| symbol.range)),
            _ => None,
        }
    }

    /// Returns true if both kinds are the same variant.
    pub fn same_variant(&self, other: &PaneKind) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }

    /// Returns true for the ephemeral references variant.
    pub fn is_references(&self) -> bool {
        matches!(self, PaneKind::References { .. })
    }

    /// Returns true for code panes.
    pub fn is_code(&self) -> bool {
        matches!(self, PaneKind::Code { .. })
    }

    /// Returns true for ghost panes.
    pub fn is_ghost(&self) -> bool {
        matches!(self, PaneKind::Ghost { .. })
    }

    /// Variants that must be mounted by the host before relationships are meaningful.
    pub fn awaits_identifier(&self) -> bool {
        matches!(
            self,
            PaneKind::Code { .. } | PaneKind::Diff { .. } | PaneKind::Ghost { .. }
        ) && self.identifier().is_none()
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            PaneKind::Code { .. } => "code",
            PaneKind::Diff { .. } => "diff",
            PaneKind::Ghost { .. } => "ghost",
            PaneKind::Modal { .. } => "modal",
            PaneKind::Merge { .. } => "merge",
            PaneKind::References { .. } => "references",
            PaneKind::Settings => "settings",
            PaneKind::Keybindings => "keybindings",
        }
    }
}

/// One rectangular, independently positioned unit of content on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pane {
    /// Unique identifier for this pane
    pub id: PaneId,
    /// Variant payload
    pub kind: PaneKind,
    /// Canvas position, used while unpinned
    pub position: Vector,
    /// Canvas size, used while unpinned
    pub size: Vector,
    /// Viewport position, used while pinned
    pub pinned_position: Vector,
    /// Viewport size, used while pinned
    pub pinned_size: Vector,
    /// Stacking order
    pub z_index: u32,
    /// Whether the pane is fixed to the viewport
    pub is_pinned: bool,
    /// Whether the pane has unsaved edits
    pub is_dirty: bool,
    /// Whether the pane is an uncommitted preview
    pub is_ghost: bool,
    /// Whether the user has resized or moved the pane, which stops automatic sizing
    pub has_resized: bool,
}

impl Pane {
    /// Creates a new unpinned pane with a fresh id.
    ///
    /// # Arguments
    ///
    /// * `kind` - Variant payload
    /// * `position` - Canvas position
    /// * `size` - Canvas size
    pub fn new(kind: PaneKind, position: Vector, size: Vector) -> Self {
        Self::with_id(Uuid::new_v4(), kind, position, size)
    }

    /// Creates a new unpinned pane with the given id.
    pub fn with_id(id: PaneId, kind: PaneKind, position: Vector, size: Vector) -> Self {
        let is_ghost = kind.is_ghost();
        Self {
            id,
            kind,
            position,
            size,
            pinned_position: Vector::ZERO,
            pinned_size: Vector::ZERO,
            z_index: 3,
            is_pinned: false,
            is_dirty: false,
            is_ghost,
            has_resized: false,
        }
    }

    /// Position of the pane's top-left corner in viewport space.
    pub fn viewport_position(&self, camera: &CameraState) -> Vector {
        if self.is_pinned {
            self.pinned_position
        } else {
            camera.to_viewport(self.position)
        }
    }

    /// Size of the pane in viewport space.
    pub fn viewport_size(&self, camera: &CameraState) -> Vector {
        if self.is_pinned {
            self.pinned_size
        } else {
            self.size * camera.scale
        }
    }

    /// Bounds of the pane in viewport space.
    pub fn viewport_rect(&self, camera: &CameraState) -> Rect {
        Rect::from_position_and_size(self.viewport_position(camera), self.viewport_size(camera))
    }

    /// Viewport-space strip a pane is dragged and middle-click-closed by.
    pub fn header_rect(&self, camera: &CameraState, header_height: f32) -> Rect {
        let position = self.viewport_position(camera);
        let height = if self.is_pinned {
            header_height
        } else {
            header_height * camera.scale
        };
        Rect::from_position_and_size(
            position,
            Vector::new(self.viewport_size(camera).x, height),
        )
    }
}

/// Symbol data sent to the symbol provider for one pane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolDescriptor {
    /// Pane the data belongs to
    pub pane_id: PaneId,
    /// Document uri
    pub uri: String,
    /// Symbol or edit range; `None` means the whole file
    pub range: Option<TextRange>,
    /// Host handle of the pane
    pub identifier: EditorIdentifier,
}

/// Line metrics the symbol provider reports for sizing new panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineMetadata {
    /// Number of lines shown
    pub num_lines: u32,
    /// Column of the longest line
    pub longest_line_column: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(uri: &str) -> PaneKind {
        PaneKind::Code {
            uri: uri.into(),
            file_path: uri.into(),
            symbol: None,
            edit_range: None,
            identifier: None,
        }
    }

    #[test]
    fn test_pane_defaults() {
        let pane = Pane::new(code("file:///a.rs"), Vector::new(1.0, 2.0), Vector::new(3.0, 4.0));
        assert!(!pane.is_pinned);
        assert!(!pane.is_ghost);
        assert!(!pane.has_resized);
        assert!(pane.kind.awaits_identifier());
    }

    #[test]
    fn test_ghost_panes_start_as_ghosts() {
        let pane = Pane::new(
            PaneKind::Ghost {
                uri: "file:///a.rs".into(),
                file_path: "a.rs".into(),
                symbol: None,
                identifier: None,
            },
            Vector::ZERO,
            Vector::new(10.0, 10.0),
        );
        assert!(pane.is_ghost);
    }

    #[test]
    fn test_viewport_rect_uses_pinned_fields() {
        let camera = CameraState::new(Vector::new(100.0, 50.0), 2.0);
        let mut pane = Pane::new(code("file:///a.rs"), Vector::new(10.0, 10.0), Vector::new(20.0, 30.0));

        let rect = pane.viewport_rect(&camera);
        assert_eq!(rect.top_left(), Vector::new(110.0, 60.0));
        assert_eq!(rect.size(), Vector::new(40.0, 60.0));

        pane.is_pinned = true;
        pane.pinned_position = Vector::new(25.0, 50.0);
        pane.pinned_size = Vector::new(300.0, 200.0);
        let rect = pane.viewport_rect(&camera);
        assert_eq!(rect.top_left(), Vector::new(25.0, 50.0));
        assert_eq!(rect.size(), Vector::new(300.0, 200.0));
    }

    #[test]
    fn test_relationship_range_prefers_edit_range() {
        let symbol_range = TextRange::lines(10, 20);
        let edit_range = TextRange::lines(12, 14);
        let kind = PaneKind::Code {
            uri: "file:///a.rs".into(),
            file_path: "a.rs".into(),
            symbol: Some(PaneSymbol {
                name: "main".into(),
                range: symbol_range,
            }),
            edit_range: Some(edit_range),
            identifier: None,
        };
        assert_eq!(kind.relationship_range(), Some(edit_range));
        assert_eq!(kind.symbol_range(), Some(symbol_range));
    }

    #[test]
    fn test_pane_serializes_with_kind_tag() {
        let pane = Pane::new(PaneKind::Settings, Vector::ZERO, Vector::new(1.0, 1.0));
        let json = serde_json::to_string(&pane).unwrap();
        assert!(json.contains("\"type\":\"Settings\""));
        let restored: Pane = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, pane);
    }
}
