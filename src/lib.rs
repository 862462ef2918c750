//! # Canvas Workspace
//!
//! The state engine of an infinite, zoomable canvas of editor panes. Code is shown as symbol- or
//! file-scoped panes that can be freely arranged, and the engine keeps them consistent:
//!
//! - **Store**: the single owner of panes, selection and camera, with copy-on-write updates
//! - **Placement**: finds free space for new panes and places panes beside each other
//! - **Pointer**: resize, move, pan, box-select and close handlers in prioritized chains
//! - **Dependency graph**: relationships from a symbol provider, drawn as colored arrows
//! - **Undo/redo**: batched snapshots of the pane map
//! - **Workspaces**: named layouts saved through a persistence host
//!
//! The engine never renders and never talks to an editor directly. Hosts implement
//! [`SymbolProvider`], [`EditorHost`] and [`PersistenceHost`], feed input through
//! [`WorkspaceStore`], and draw what it reports.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod camera;
pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod persistence;
pub mod placement;
pub mod pointer;
pub mod providers;
pub mod store;
pub mod types;
pub mod undo;

pub use camera::{CameraState, NavigationType};
pub use config::WorkspaceConfig;
pub use error::{Result, WorkspaceError};
pub use geometry::{Rect, Vector};
pub use graph::{
    ArrowStroke, ColorAssignment, DependencyArrow, RelationshipKind, StrokeCircle,
    SymbolRelationship, TraversalDirection,
};
pub use persistence::{CanvasWorkspace, JsonFilePersistence};
pub use pointer::{
    buttons, CursorStyle, EventTarget, Modifiers, PointerAction, PointerButton, PointerEvent,
};
pub use providers::{
    CancellationToken, Clock, EditorHost, ManualClock, PersistenceHost, SymbolProvider,
    SystemClock, WorkspaceContext,
};
pub use store::{InsertOptions, PaneRequest, PendingInsert, ResolvedInsert, WorkspaceStore};
pub use types::*;
