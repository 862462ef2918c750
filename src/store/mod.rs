//! The workspace store: the one place pane state changes.
//!
//! The store owns the pane map and the selection as copy-on-write `Arc`s. Every mutation clones
//! the latest map, edits the clone and swaps it in through a single private setter, which
//! records the previous map for undo, keeps the selection a subset of the live panes, refreshes
//! the pointer hit regions and hands the change to the dependency graph.
//!
//! Async work never holds a half-updated map: relationship queries come back as
//! [`PendingRelationships`] that the host resolves, and size lookups for new panes go through a
//! numbered [`PendingInsert`] so that only the newest insert is applied.
//!
//! # Module Organization
//!
//! - `panes` - Inserting, closing, resizing, pinning and selecting panes
//! - `navigation` - Camera, zoom, animated navigation and spatial traversal
//! - `workspaces` - Saving and opening named canvas workspaces

mod navigation;
mod panes;
mod workspaces;

#[cfg(test)]
mod tests;

pub use panes::{InsertOptions, PaneRequest, PendingInsert, ResolvedInsert};

use crate::camera::{CameraState, NavigationAnimation};
use crate::config::WorkspaceConfig;
use crate::geometry::{Rect, Vector};
use crate::graph::{
    ArrowStroke, ArrowView, ColorAssignment, DependencyArrow, DependencyGraphEngine, GraphUpdate,
    PendingRelationships, SymbolRelationship,
};
use crate::persistence::CanvasWorkspace;
use crate::pointer::{
    CursorStyle, HeaderRegion, InteractionTargets, MoveRequest, PointerAction, PointerDispatcher,
    PointerEvent, ResizeRequest,
};
use crate::providers::{CancellationToken, WorkspaceContext};
use crate::types::{
    EditorIdentifier, Pane, PaneId, PaneKind, PaneMap, Selection, TextRange, Theme,
};
use crate::undo::UndoRedoBuffer;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;

/// Owns the panes, selection and camera, and routes every change through the engines.
pub struct WorkspaceStore {
    context: WorkspaceContext,
    panes: Arc<PaneMap>,
    selection: Arc<Selection>,
    camera: CameraState,
    viewport_size: Vector,
    focused: Option<PaneId>,
    selection_box: Option<Rect>,
    context_menu: Option<Vector>,
    close_requests: Vec<PaneId>,
    graph: DependencyGraphEngine,
    pending_relationships: Option<PendingRelationships>,
    undo: UndoRedoBuffer,
    animation: NavigationAnimation,
    dispatcher: PointerDispatcher,
    insert_counter: u64,
    insert_token: Option<CancellationToken>,
    is_restoring: bool,
    current_workspace: Option<CanvasWorkspace>,
    saved_workspaces: Vec<CanvasWorkspace>,
    workspace_dirty: bool,
}

impl std::fmt::Debug for WorkspaceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceStore")
            .field("panes", &self.panes.len())
            .field("selection", &self.selection)
            .field("camera", &self.camera)
            .field("viewport_size", &self.viewport_size)
            .field("focused", &self.focused)
            .finish_non_exhaustive()
    }
}

impl WorkspaceStore {
    /// Creates an empty workspace.
    ///
    /// # Arguments
    ///
    /// * `context` - Configuration and collaborators
    /// * `viewport_size` - Size of the viewport in pixels
    pub fn new(context: WorkspaceContext, viewport_size: Vector) -> Self {
        let dispatcher = PointerDispatcher::new(&context.config);
        let undo = UndoRedoBuffer::new(&context.config);
        Self {
            context,
            panes: Arc::new(PaneMap::new()),
            selection: Arc::new(Selection::new()),
            camera: CameraState::default(),
            viewport_size,
            focused: None,
            selection_box: None,
            context_menu: None,
            close_requests: Vec::new(),
            graph: DependencyGraphEngine::new(),
            pending_relationships: None,
            undo,
            animation: NavigationAnimation::new(),
            dispatcher,
            insert_counter: 0,
            insert_token: None,
            is_restoring: false,
            current_workspace: None,
            saved_workspaces: Vec::new(),
            workspace_dirty: false,
        }
    }

    /// Tunable constants in use.
    pub fn config(&self) -> &WorkspaceConfig {
        &self.context.config
    }

    /// Collaborators in use.
    pub fn context(&self) -> &WorkspaceContext {
        &self.context
    }

    /// The latest pane map.
    pub fn panes(&self) -> &Arc<PaneMap> {
        &self.panes
    }

    /// Looks up a pane.
    pub fn pane(&self, id: PaneId) -> Option<&Pane> {
        self.panes.get(&id)
    }

    /// The latest selection.
    pub fn selection(&self) -> &Arc<Selection> {
        &self.selection
    }

    /// Current camera.
    pub fn camera(&self) -> CameraState {
        self.camera
    }

    /// Viewport size in pixels.
    pub fn viewport_size(&self) -> Vector {
        self.viewport_size
    }

    /// Updates the viewport size after the host window changed.
    pub fn set_viewport_size(&mut self, viewport_size: Vector) {
        if self.viewport_size != viewport_size {
            self.viewport_size = viewport_size;
            self.refresh_targets();
        }
    }

    /// Pane with keyboard focus.
    pub fn focused(&self) -> Option<PaneId> {
        self.focused
    }

    /// Rubber-band rectangle in viewport space while a box select is in progress.
    pub fn selection_box(&self) -> Option<Rect> {
        self.selection_box
    }

    /// Takes the viewport position of a context menu request, if one is pending.
    pub fn take_context_menu(&mut self) -> Option<Vector> {
        self.context_menu.take()
    }

    /// Takes panes the user asked to close by pointer. Close each with
    /// [`WorkspaceStore::close_pane`].
    pub fn take_close_requests(&mut self) -> Vec<PaneId> {
        std::mem::take(&mut self.close_requests)
    }

    /// Cursor the pointer handlers want.
    pub fn cursor(&self) -> Option<CursorStyle> {
        self.dispatcher.cursor()
    }

    /// Returns true while a secondary click may still open a context menu.
    pub fn is_handling_context_menu(&self) -> bool {
        self.dispatcher.is_handling_context_menu()
    }

    /// Current theme.
    pub fn theme(&self) -> Theme {
        self.context.theme
    }

    /// Switches the theme and recolors neutral arrows.
    pub fn set_theme(&mut self, theme: Theme) {
        self.context.theme = theme;
        self.refresh_arrows();
    }

    /// The dependency graph.
    pub fn graph(&self) -> &DependencyGraphEngine {
        &self.graph
    }

    /// Arrows for rendering, in viewport space.
    pub fn arrows(&self) -> &[DependencyArrow] {
        self.graph.arrows()
    }

    /// Drawing primitives for every arrow.
    pub fn arrow_strokes(&self) -> Vec<ArrowStroke> {
        self.graph
            .arrows()
            .iter()
            .map(|arrow| ArrowStroke::from_arrow(arrow, &self.context.config))
            .collect()
    }

    /// Highlight colors per pane pair, for decorating reference sites.
    pub fn highlight_colors(&self) -> &HashMap<PaneId, HashMap<PaneId, ColorAssignment>> {
        self.graph.color_assignments()
    }

    /// Replaces the pane map.
    ///
    /// Records `previous` for undo unless the change is a no-op or an undo/redo is being
    /// applied, prunes the selection, refreshes hit regions, and lets the graph react.
    fn set_panes(&mut self, next: PaneMap) {
        let previous = std::mem::replace(&mut self.panes, Arc::new(next));
        if !self.is_restoring && !UndoRedoBuffer::is_noop(&previous, &self.panes) {
            self.undo
                .push(Arc::clone(&previous), self.context.clock.now());
        }

        if self.selection.iter().any(|id| !self.panes.contains_key(id)) {
            let selection: Selection = self
                .selection
                .iter()
                .filter(|id| self.panes.contains_key(*id))
                .copied()
                .collect();
            self.set_selection(selection);
        }
        if self.focused.is_some_and(|id| !self.panes.contains_key(&id)) {
            self.focused = None;
        }

        self.update_workspace_dirty();
        self.refresh_targets();

        let view = self.arrow_view();
        match self.graph.on_panes_changed(
            &self.panes,
            &previous,
            view,
            self.context.symbol_provider.as_ref(),
        ) {
            GraphUpdate::Query(pending) => {
                self.pending_relationships = Some(pending);
            }
            GraphUpdate::Waiting => debug!("relationship query deferred until panes are mounted"),
            GraphUpdate::ArrowsChanged | GraphUpdate::Unchanged => {}
        }
    }

    /// Replaces the pane map without recording undo, for camera rescaling and opening workspaces.
    fn set_panes_untracked(&mut self, next: PaneMap) {
        let was_restoring = std::mem::replace(&mut self.is_restoring, true);
        self.set_panes(next);
        self.is_restoring = was_restoring;
    }

    /// Replaces the selection and restarts spatial traversal.
    fn set_selection(&mut self, selection: Selection) {
        if *self.selection != selection {
            self.selection = Arc::new(selection);
            self.graph.sorter_mut().reset_index();
        }
    }

    fn arrow_view(&self) -> ArrowView {
        ArrowView {
            camera: self.camera,
            theme: self.context.theme,
        }
    }

    fn refresh_arrows(&mut self) {
        let view = self.arrow_view();
        let panes = Arc::clone(&self.panes);
        self.graph.refresh_arrows(&panes, view);
    }

    fn refresh_targets(&mut self) {
        let targets = self.interaction_targets();
        self.dispatcher.set_targets(&targets);
    }

    /// Hit regions for every pane, bottom-most first. Pinned panes sit above the canvas.
    pub fn interaction_targets(&self) -> InteractionTargets {
        let config = &self.context.config;
        let mut ordered: Vec<&Pane> = self.panes.values().collect();
        ordered.sort_by(|a, b| {
            (a.is_pinned, a.z_index, a.id).cmp(&(b.is_pinned, b.z_index, b.id))
        });

        let mut targets = InteractionTargets::default();
        for pane in ordered {
            let bounds = pane.viewport_rect(&self.camera);
            let header = pane.header_rect(&self.camera, config.header_height);
            targets.resize.push(ResizeRequest {
                pane: pane.id,
                bounds,
                size: if pane.is_pinned {
                    pane.pinned_size
                } else {
                    pane.size
                },
                min_size: Vector::new(config.min_pane_width, config.min_pane_height),
                max_size: Vector::new(f32::INFINITY, f32::INFINITY),
                scale_aware: !pane.is_pinned,
            });
            targets.movement.push(MoveRequest {
                pane: pane.id,
                bounds: header,
            });
            targets.headers.push(HeaderRegion {
                pane: pane.id,
                bounds: header,
            });
        }
        targets
    }

    /// Feeds a pointer press through the handler chains.
    pub fn pointer_down(&mut self, event: &PointerEvent) {
        let event = self.with_camera(event);
        let actions = self.dispatcher.pointer_down(&event);
        self.apply_pointer_actions(actions);
    }

    /// Feeds pointer motion through the handler chains.
    pub fn pointer_move(&mut self, event: &PointerEvent) {
        let event = self.with_camera(event);
        let actions = self.dispatcher.pointer_move(&event);
        self.apply_pointer_actions(actions);
    }

    /// Feeds a pointer release through the handler chains.
    pub fn pointer_up(&mut self, event: &PointerEvent) {
        let event = self.with_camera(event);
        let actions = self.dispatcher.pointer_up(&event);
        self.apply_pointer_actions(actions);
    }

    fn with_camera(&self, event: &PointerEvent) -> PointerEvent {
        PointerEvent {
            camera: self.camera,
            ..*event
        }
    }

    /// Applies the actions pointer handlers requested, in order.
    ///
    /// Closing needs the editor host and is async, so close requests are queued for
    /// [`WorkspaceStore::take_close_requests`].
    pub fn apply_pointer_actions(&mut self, actions: Vec<PointerAction>) {
        for action in actions {
            match action {
                PointerAction::UpdateBounds {
                    pane,
                    position_delta,
                    size_delta,
                } => self.update_pane_bounds(pane, position_delta, size_delta),
                PointerAction::InteractionStarted { pane } => {
                    if !self.selection.contains(&pane) {
                        self.select_pane(pane, true);
                    }
                    self.focus_pane(pane);
                }
                PointerAction::Click { pane } => {
                    self.select_pane(pane, true);
                    self.focus_pane(pane);
                }
                PointerAction::Commit => self.commit(),
                PointerAction::SetCamera { position } => self.set_camera(position),
                PointerAction::ClearSelection => self.clear_selection(),
                PointerAction::DragSelect { rect, only_add } => self.drag_select(rect, only_add),
                PointerAction::SelectionBox(rect) => self.selection_box = rect,
                PointerAction::ClosePane { pane } => self.close_requests.push(pane),
                PointerAction::ShowContextMenu { position } => self.context_menu = Some(position),
            }
        }
    }

    /// Records that the host mounted a pane's editor widget.
    pub fn set_pane_identifier(&mut self, id: PaneId, identifier: EditorIdentifier) {
        let Some(pane) = self.panes.get(&id) else {
            return;
        };
        if pane.kind.identifier() == Some(identifier) {
            return;
        }
        let mut panes = (*self.panes).clone();
        if let Some(pane) = panes.get_mut(&id) {
            pane.kind.set_identifier(identifier);
        }
        self.set_panes(panes);
    }

    /// Marks a pane as having unsaved edits or not.
    pub fn set_pane_dirty(&mut self, id: PaneId, is_dirty: bool) {
        match self.panes.get(&id) {
            Some(pane) if pane.is_dirty != is_dirty => {}
            _ => return,
        }
        let mut panes = (*self.panes).clone();
        if let Some(pane) = panes.get_mut(&id) {
            pane.is_dirty = is_dirty;
        }
        self.set_panes(panes);
    }

    /// Takes the newest relationship query, if one is waiting to be awaited.
    pub fn take_pending_relationships(&mut self) -> Option<PendingRelationships> {
        self.pending_relationships.take()
    }

    /// Applies a resolved relationship query. Stale results are dropped.
    ///
    /// # Returns
    ///
    /// True if the result was current and applied.
    pub fn resolve_relationships(
        &mut self,
        request_number: u64,
        relationships: Vec<SymbolRelationship>,
    ) -> bool {
        let view = self.arrow_view();
        let panes = Arc::clone(&self.panes);
        self.graph
            .apply_relationships(request_number, relationships, &panes, view)
    }

    /// Awaits and applies the newest relationship query, if any.
    pub async fn settle_relationships(&mut self) {
        while let Some(pending) = self.take_pending_relationships() {
            let relationships = pending.future.await;
            self.resolve_relationships(pending.request_number, relationships);
        }
    }

    /// Adds a symbol dependency right away, for example when the user follows a reference.
    pub fn add_unconditional_relationship(
        &mut self,
        from: PaneId,
        to: PaneId,
        from_ranges: Vec<TextRange>,
    ) {
        if !self.panes.contains_key(&from) || !self.panes.contains_key(&to) {
            return;
        }
        let view = self.arrow_view();
        let panes = Arc::clone(&self.panes);
        self.graph
            .add_unconditional_relationship(from, to, from_ranges, &panes, view);
    }

    /// Closes the open undo batch.
    pub fn commit(&mut self) {
        self.undo.commit();
    }

    /// Pauses or resumes undo recording.
    pub fn set_track_changes(&mut self, track_changes: bool) {
        self.undo.set_track_changes(track_changes);
    }

    /// Returns true if there is anything to undo.
    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    /// Returns true if there is anything to redo.
    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    /// Restores the previous pane map, closing editors of panes that disappear.
    ///
    /// # Returns
    ///
    /// True if there was anything to undo.
    pub async fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo.undo(Arc::clone(&self.panes)) else {
            return false;
        };
        info!("undo restores {} panes", snapshot.len());
        self.restore(&snapshot, true).await;
        true
    }

    /// Re-applies the last undone pane map.
    ///
    /// # Returns
    ///
    /// True if there was anything to redo.
    pub async fn redo(&mut self) -> bool {
        let Some(snapshot) = self.undo.redo(Arc::clone(&self.panes)) else {
            return false;
        };
        info!("redo restores {} panes", snapshot.len());
        self.restore(&snapshot, false).await;
        true
    }

    /// Installs a snapshot without recording it. Ghost and references panes are never restored.
    async fn restore(&mut self, snapshot: &PaneMap, close_missing: bool) {
        self.is_restoring = true;
        let restored: PaneMap = snapshot
            .iter()
            .filter(|(_, pane)| !pane.is_ghost && !pane.kind.is_references())
            .map(|(id, pane)| (*id, pane.clone()))
            .collect();

        if close_missing {
            if let Some(host) = self.context.editor_host.clone() {
                let closing: Vec<EditorIdentifier> = self
                    .panes
                    .values()
                    .filter(|pane| !restored.contains_key(&pane.id) && is_closable(pane))
                    .filter_map(|pane| pane.kind.identifier())
                    .collect();
                for identifier in closing {
                    host.close_editor(identifier, true).await;
                }
            }
        }

        self.set_panes(restored);
        self.is_restoring = false;
    }
}

/// Variants whose editor widget must be closed through the host.
pub(crate) fn is_closable(pane: &Pane) -> bool {
    matches!(
        pane.kind,
        PaneKind::Code { .. } | PaneKind::Diff { .. } | PaneKind::Modal { .. } | PaneKind::Ghost { .. }
    ) && pane.kind.identifier().is_some()
}
