//! Pane lifecycle and selection.

use super::{is_closable, WorkspaceStore};
use crate::camera::NavigationType;
use crate::geometry::{Rect, Vector};
use crate::placement::PlacementEngine;
use crate::pointer::clamp_axis;
use crate::providers::CancellationToken;
use crate::types::{LineMetadata, Pane, PaneId, PaneKind, PaneSymbol, Selection, TextRange};
use futures::future::{BoxFuture, FutureExt};
use log::{debug, info};

/// What kind of pane to open.
#[derive(Debug, Clone, PartialEq)]
pub enum PaneRequest {
    /// A code pane over a whole file
    File {
        /// Document uri
        uri: String,
        /// Path shown in the header
        file_path: String,
    },
    /// A code pane scoped to one symbol
    Symbol {
        /// Document uri
        uri: String,
        /// Path shown in the header
        file_path: String,
        /// Symbol to show
        symbol: PaneSymbol,
    },
    /// A ghost preview
    Ghost {
        /// Document uri
        uri: String,
        /// Path shown in the header
        file_path: String,
        /// Symbol to preview
        symbol: Option<PaneSymbol>,
    },
    /// A code pane opened to the right of an existing pane
    Adjacent {
        /// Pane to open next to
        from: PaneId,
        /// Document uri
        uri: String,
        /// Path shown in the header
        file_path: String,
        /// Symbol to show, or the whole file
        symbol: Option<PaneSymbol>,
    },
}

impl PaneRequest {
    fn uri(&self) -> &str {
        match self {
            PaneRequest::File { uri, .. }
            | PaneRequest::Symbol { uri, .. }
            | PaneRequest::Ghost { uri, .. }
            | PaneRequest::Adjacent { uri, .. } => uri,
        }
    }

    fn range(&self) -> Option<TextRange> {
        match self {
            PaneRequest::File { .. } => None,
            PaneRequest::Symbol { symbol, .. } => Some(symbol.range),
            PaneRequest::Ghost { symbol, .. } | PaneRequest::Adjacent { symbol, .. } => {
                symbol.as_ref().map(|symbol| symbol.range)
            }
        }
    }

    fn kind(&self) -> PaneKind {
        match self {
            PaneRequest::File { uri, file_path } => PaneKind::Code {
                uri: uri.clone(),
                file_path: file_path.clone(),
                symbol: None,
                edit_range: None,
                identifier: None,
            },
            PaneRequest::Symbol {
                uri,
                file_path,
                symbol,
            } => PaneKind::Code {
                uri: uri.clone(),
                file_path: file_path.clone(),
                symbol: Some(symbol.clone()),
                edit_range: None,
                identifier: None,
            },
            PaneRequest::Ghost {
                uri,
                file_path,
                symbol,
            } => PaneKind::Ghost {
                uri: uri.clone(),
                file_path: file_path.clone(),
                symbol: symbol.clone(),
                identifier: None,
            },
            PaneRequest::Adjacent {
                uri,
                file_path,
                symbol,
                ..
            } => PaneKind::Code {
                uri: uri.clone(),
                file_path: file_path.clone(),
                symbol: symbol.clone(),
                edit_range: None,
                identifier: None,
            },
        }
    }
}

/// How a new pane is placed and presented.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsertOptions {
    /// Move the camera to the new pane if it is not fully visible
    pub pan_to: bool,
    /// Make the new pane the only selected pane and focus it
    pub select_and_focus: bool,
    /// Canvas position to use instead of searching for a free slot
    pub position: Option<Vector>,
    /// Canvas size to use instead of sizing from line metadata
    pub size: Option<Vector>,
}

impl Default for InsertOptions {
    fn default() -> Self {
        Self {
            pan_to: true,
            select_and_focus: true,
            position: None,
            size: None,
        }
    }
}

/// An insert waiting on its size lookup.
pub struct PendingInsert {
    /// Insert number; only the newest insert is applied
    pub ticket: u64,
    /// Cancelled once a newer insert begins
    pub token: CancellationToken,
    /// What to open
    pub request: PaneRequest,
    /// Placement options
    pub options: InsertOptions,
    /// Resolves to the line metrics used for sizing
    pub future: BoxFuture<'static, Option<LineMetadata>>,
}

impl std::fmt::Debug for PendingInsert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingInsert")
            .field("ticket", &self.ticket)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

impl PendingInsert {
    /// Waits for the size lookup.
    pub async fn resolve(self) -> ResolvedInsert {
        let metadata = self.future.await;
        ResolvedInsert {
            ticket: self.ticket,
            request: self.request,
            options: self.options,
            metadata,
        }
    }
}

/// An insert whose size lookup has finished.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInsert {
    /// Insert number
    pub ticket: u64,
    /// What to open
    pub request: PaneRequest,
    /// Placement options
    pub options: InsertOptions,
    /// Line metrics, if the provider had any
    pub metadata: Option<LineMetadata>,
}

impl WorkspaceStore {
    /// Viewport point new panes are anchored at, just inside the padding.
    pub(super) fn viewport_anchor(&self) -> Vector {
        let padding = self.context.config.viewport_padding;
        Vector::new(padding, padding * 2.0)
    }

    pub(super) fn placement(&self) -> PlacementEngine {
        PlacementEngine::new(
            self.camera,
            self.viewport_size,
            self.context.config.viewport_padding,
        )
    }

    /// Largest canvas size a new pane is given.
    fn max_pane_size(&self) -> Vector {
        let padding = self.context.config.viewport_padding;
        Vector::new(
            self.viewport_size.x - padding * 2.0,
            self.viewport_size.y - padding * 4.0,
        ) / self.camera.scale
    }

    /// Canvas size for a new pane from line metrics, or from a line count when there are none.
    fn size_for(&self, metadata: Option<LineMetadata>, fallback_lines: u32) -> Vector {
        let config = &self.context.config;
        let max = self.max_pane_size();
        match metadata {
            Some(metadata) => {
                config.pane_size_for_lines(metadata.num_lines, metadata.longest_line_column, max)
            }
            None => {
                let size = config.default_pane_size(Some(fallback_lines));
                Vector::new(size.x, size.y.min(max.y))
            }
        }
    }

    /// Adds a pane at an explicit canvas position.
    ///
    /// # Arguments
    ///
    /// * `kind` - Variant payload
    /// * `position` - Canvas position
    /// * `size` - Canvas size
    /// * `select_and_focus` - Make the pane the only selected one and focus it
    ///
    /// # Returns
    ///
    /// The new pane's id.
    pub fn insert_pane_at(
        &mut self,
        kind: PaneKind,
        position: Vector,
        size: Vector,
        select_and_focus: bool,
    ) -> PaneId {
        let pane = Pane::new(kind, position, size);
        let id = pane.id;
        info!("inserting {} pane {} at {:?}", pane.kind.label(), id, position);

        let mut panes = (*self.panes).clone();
        panes.insert(id, pane);
        self.set_panes(panes);

        if select_and_focus {
            self.set_selection(Selection::from([id]));
            self.focus_pane(id);
        }
        id
    }

    /// Starts an insert by asking the symbol provider for line metrics.
    ///
    /// Beginning another insert supersedes this one: its token is cancelled and
    /// [`WorkspaceStore::complete_insert`] will drop it.
    pub fn begin_insert(&mut self, request: PaneRequest, options: InsertOptions) -> PendingInsert {
        if let Some(token) = self.insert_token.take() {
            token.cancel();
        }
        self.insert_counter += 1;
        let token = CancellationToken::new();
        self.insert_token = Some(token.clone());

        let future = match (&self.context.symbol_provider, options.size) {
            (Some(provider), None) => provider.line_metadata(request.uri(), request.range()),
            _ => futures::future::ready(None).boxed(),
        };
        PendingInsert {
            ticket: self.insert_counter,
            token,
            request,
            options,
            future,
        }
    }

    /// Finishes an insert once its size lookup resolved.
    ///
    /// # Returns
    ///
    /// The id of the new pane (or of an existing pane showing the same code), or None if the
    /// insert was superseded or the pane it was to be opened next to is gone.
    pub fn complete_insert(&mut self, resolved: ResolvedInsert) -> Option<PaneId> {
        if resolved.ticket != self.insert_counter {
            debug!(
                "dropping superseded insert {} (current is {})",
                resolved.ticket, self.insert_counter
            );
            return None;
        }
        self.insert_token = None;

        let ResolvedInsert {
            request,
            options,
            metadata,
            ..
        } = resolved;
        let fallback_lines = request.range().map_or(5, |range| range.line_count());
        let size = options
            .size
            .unwrap_or_else(|| self.size_for(metadata, fallback_lines));
        let kind = request.kind();

        match request {
            PaneRequest::Adjacent { from, .. } => self.insert_adjacent(from, kind, size, options),
            PaneRequest::Ghost { .. } => {
                let position = options.position.unwrap_or_else(|| self.free_position(size));
                Some(self.insert_pane_at(kind, position, size, false))
            }
            PaneRequest::File { .. } | PaneRequest::Symbol { .. } => {
                let position = options.position.unwrap_or_else(|| self.free_position(size));
                let id = self.insert_pane_at(kind, position, size, options.select_and_focus);
                if options.pan_to {
                    self.navigate_to_new_pane(id);
                }
                Some(id)
            }
        }
    }

    /// Opens a code pane over a whole file in the first free slot.
    pub async fn insert_file_pane(
        &mut self,
        uri: impl Into<String>,
        file_path: impl Into<String>,
        options: InsertOptions,
    ) -> Option<PaneId> {
        let request = PaneRequest::File {
            uri: uri.into(),
            file_path: file_path.into(),
        };
        let pending = self.begin_insert(request, options);
        let resolved = pending.resolve().await;
        self.complete_insert(resolved)
    }

    /// Opens a code pane scoped to a symbol in the first free slot.
    pub async fn insert_symbol_pane(
        &mut self,
        uri: impl Into<String>,
        file_path: impl Into<String>,
        symbol: PaneSymbol,
        options: InsertOptions,
    ) -> Option<PaneId> {
        let request = PaneRequest::Symbol {
            uri: uri.into(),
            file_path: file_path.into(),
            symbol,
        };
        let pending = self.begin_insert(request, options);
        let resolved = pending.resolve().await;
        self.complete_insert(resolved)
    }

    /// Opens a ghost preview in the first free slot, without selecting or panning to it.
    pub async fn insert_ghost_pane(
        &mut self,
        uri: impl Into<String>,
        file_path: impl Into<String>,
        symbol: Option<PaneSymbol>,
    ) -> Option<PaneId> {
        let request = PaneRequest::Ghost {
            uri: uri.into(),
            file_path: file_path.into(),
            symbol,
        };
        let options = InsertOptions {
            pan_to: false,
            select_and_focus: false,
            ..InsertOptions::default()
        };
        let pending = self.begin_insert(request, options);
        let resolved = pending.resolve().await;
        self.complete_insert(resolved)
    }

    /// Opens a code pane to the right of `from`, or reveals an existing pane showing the same
    /// document and range.
    pub async fn insert_adjacent_pane(
        &mut self,
        from: PaneId,
        uri: impl Into<String>,
        file_path: impl Into<String>,
        symbol: Option<PaneSymbol>,
        options: InsertOptions,
    ) -> Option<PaneId> {
        let request = PaneRequest::Adjacent {
            from,
            uri: uri.into(),
            file_path: file_path.into(),
            symbol,
        };
        let pending = self.begin_insert(request, options);
        let resolved = pending.resolve().await;
        self.complete_insert(resolved)
    }

    fn free_position(&self, size: Vector) -> Vector {
        let anchor = self.camera.to_canvas(self.viewport_anchor());
        self.placement().place(anchor, size, self.panes.values())
    }

    fn insert_adjacent(
        &mut self,
        from: PaneId,
        kind: PaneKind,
        size: Vector,
        options: InsertOptions,
    ) -> Option<PaneId> {
        let existing = self
            .panes
            .values()
            .find(|pane| {
                pane.kind.is_code()
                    && pane.kind.uri() == kind.uri()
                    && pane.kind.relationship_range() == kind.relationship_range()
            })
            .map(|pane| pane.id);
        if let Some(existing) = existing {
            if options.select_and_focus {
                self.navigate_to_pane(existing, NavigationType::Center);
            }
            return Some(existing);
        }

        let origin = self.panes.get(&from)?;
        let config = &self.context.config;
        let scale = self.camera.scale;
        let origin_position = origin.viewport_position(&self.camera);
        let mut anchor = Vector::new(
            origin_position.x + (origin.size.x + config.adjacent_gap) * scale,
            origin_position.y,
        );
        // Fall back to the top of the viewport when the pane would hang off the bottom.
        if anchor.y + size.y * scale > self.viewport_size.y - config.viewport_padding * 4.0 {
            anchor.y = self.viewport_anchor().y;
        }

        let position = match options.position {
            Some(position) => position,
            None => self.placement().place(
                self.camera.to_canvas(anchor),
                size,
                self.panes.values(),
            ),
        };
        let id = self.insert_pane_at(kind, position, size, options.select_and_focus);
        if options.select_and_focus && options.pan_to {
            self.navigate_to_new_pane(id);
        }
        Some(id)
    }

    /// Turns a ghost preview into a regular code pane over the previewed range.
    pub fn manifest_ghost(&mut self, id: PaneId) {
        if !self.panes.get(&id).is_some_and(|pane| pane.is_ghost) {
            return;
        }
        let mut panes = (*self.panes).clone();
        if let Some(pane) = panes.get_mut(&id) {
            pane.is_ghost = false;
            let manifested = match &pane.kind {
                PaneKind::Ghost {
                    uri,
                    file_path,
                    symbol,
                    identifier,
                } => Some(PaneKind::Code {
                    uri: uri.clone(),
                    file_path: file_path.clone(),
                    symbol: None,
                    edit_range: symbol.as_ref().map(|symbol| symbol.range),
                    identifier: *identifier,
                }),
                _ => None,
            };
            if let Some(kind) = manifested {
                pane.kind = kind;
            }
        }
        info!("manifested ghost pane {}", id);
        self.set_panes(panes);
    }

    /// Asks the editor host to close a pane's widget.
    ///
    /// # Returns
    ///
    /// False if the user cancelled.
    async fn close_editor_for(&self, pane: &Pane) -> bool {
        let (Some(host), Some(identifier)) = (&self.context.editor_host, pane.kind.identifier())
        else {
            return true;
        };
        if !is_closable(pane) {
            return true;
        }
        let unconditional = pane.kind.is_ghost() && pane.is_ghost;
        host.close_editor(identifier, unconditional).await
    }

    /// Closes a pane, asking the editor host first.
    ///
    /// # Returns
    ///
    /// True if the pane was removed, false if it does not exist or the user cancelled.
    pub async fn close_pane(&mut self, id: PaneId) -> bool {
        let Some(pane) = self.panes.get(&id).cloned() else {
            return false;
        };
        if !self.close_editor_for(&pane).await {
            info!("closing pane {} was cancelled", id);
            return false;
        }

        let mut panes = (*self.panes).clone();
        panes.remove(&id);
        info!("closed {} pane {}", pane.kind.label(), id);
        self.set_panes(panes);
        if self.focused == Some(id) {
            self.focused = None;
        }
        true
    }

    /// Closes every selected pane one at a time, stopping at the first cancelled confirmation.
    ///
    /// # Returns
    ///
    /// Number of panes closed.
    pub async fn delete_selection(&mut self) -> usize {
        let mut ids: Vec<PaneId> = self.selection.iter().copied().collect();
        ids.sort();

        let mut deleted = 0;
        for id in ids {
            let Some(pane) = self.panes.get(&id).cloned() else {
                continue;
            };
            if !self.close_editor_for(&pane).await {
                info!("deleting selection stopped at pane {}", id);
                self.commit();
                return deleted;
            }
            // Read the latest map again: the confirmation may have taken a while.
            let mut panes = (*self.panes).clone();
            panes.remove(&id);
            self.set_panes(panes);
            deleted += 1;
        }

        self.commit();
        self.set_selection(Selection::new());
        deleted
    }

    /// Closes every pane, stopping at the first cancelled confirmation.
    ///
    /// # Returns
    ///
    /// True if every pane was closed.
    pub async fn close_all_panes(&mut self) -> bool {
        let mut ids: Vec<PaneId> = self.panes.keys().copied().collect();
        ids.sort();
        for id in ids {
            let Some(pane) = self.panes.get(&id).cloned() else {
                continue;
            };
            if !self.close_editor_for(&pane).await {
                return false;
            }
            let mut panes = (*self.panes).clone();
            panes.remove(&id);
            self.set_panes(panes);
        }
        self.set_selection(Selection::new());
        true
    }

    /// Moves and resizes `id` and every other selected pane by the same deltas.
    ///
    /// `id` joins the selection if it was not in it. Sizes never drop below the minimum pane
    /// size, and every touched pane stops auto-sizing.
    ///
    /// # Arguments
    ///
    /// * `id` - Pane the gesture started on
    /// * `position_delta` - Position change in viewport pixels
    /// * `size_delta` - Size change in canvas units (viewport units for pinned panes)
    pub fn update_pane_bounds(&mut self, id: PaneId, position_delta: Vector, size_delta: Vector) {
        if !self.panes.contains_key(&id) {
            return;
        }
        if !self.selection.contains(&id) {
            let mut selection = (*self.selection).clone();
            selection.insert(id);
            self.set_selection(selection);
        }

        let min = Vector::new(
            self.context.config.min_pane_width,
            self.context.config.min_pane_height,
        );
        let mut panes = (*self.panes).clone();
        for selected in self.selection.iter() {
            let Some(pane) = panes.get_mut(selected) else {
                continue;
            };
            // Each pane clamps on its own so a top or left edge stops where its minimum is hit.
            let (size, scale) = if pane.is_pinned {
                (pane.pinned_size, 1.0)
            } else {
                (pane.size, self.camera.scale)
            };
            let (mut pd, mut sd) = (position_delta, size_delta);
            clamp_axis(&mut pd.x, &mut sd.x, size.x, min.x, f32::INFINITY, scale);
            clamp_axis(&mut pd.y, &mut sd.y, size.y, min.y, f32::INFINITY, scale);
            if pane.is_pinned {
                pane.pinned_position += pd;
                pane.pinned_size = (pane.pinned_size + sd).max(min);
            } else {
                pane.position += pd;
                pane.size = (pane.size + sd).max(min);
            }
            pane.has_resized = true;
        }
        self.set_panes(panes);
    }

    /// Grows the focused pane to fit its content as the user types.
    ///
    /// Only the focused, unpinned pane that the user has not resized is adjusted. The width grows
    /// toward the longest line up to the viewport edge. The height follows the line count, but
    /// only while the pane's top edge is visible, and never past the bottom of the viewport.
    ///
    /// # Arguments
    ///
    /// * `id` - Pane whose content changed
    /// * `num_lines` - Line count, if known
    /// * `column` - Column of the longest line, if known
    pub fn update_pane_size(&mut self, id: PaneId, num_lines: Option<u32>, column: Option<u32>) {
        if self.focused != Some(id) {
            return;
        }
        let Some(pane) = self.panes.get(&id) else {
            return;
        };
        if pane.has_resized || pane.is_pinned {
            return;
        }

        let config = &self.context.config;
        let scale = self.camera.scale;
        let position = pane.viewport_position(&self.camera);
        let mut size = pane.size;

        if let Some(column) = column {
            let longest_line_width =
                ((column as f32 + crate::constants::EXTRA_COLUMNS) * config.average_char_width)
                    .round()
                    + config.gutter_width;
            let max_width = self.viewport_size.x / scale - position.x * scale;
            size.x = longest_line_width.max(size.x).min(max_width);
        }

        let viewport = Rect::from_position_and_size(Vector::ZERO, self.viewport_size);
        let top_visible = viewport.contains_point(position)
            && viewport.contains_point(position + Vector::new(pane.size.x * scale, 0.0));
        if top_visible {
            let projected = match num_lines {
                Some(lines) => config.default_pane_size(Some(lines)).y,
                None => size.y,
            };
            let padded_bottom = self.placement().padded_viewport().y;
            size.y = projected.min((padded_bottom - position.y) / scale);
        }

        if size == pane.size {
            return;
        }
        let mut panes = (*self.panes).clone();
        if let Some(pane) = panes.get_mut(&id) {
            pane.size = size;
        }
        self.set_panes(panes);
    }

    /// Pins a pane to the viewport, or unpins it if it is already pinned.
    pub fn toggle_pin(&mut self, id: PaneId) {
        match self.panes.get(&id) {
            Some(pane) if pane.is_pinned => self.unpin_pane(id),
            Some(_) => self.pin_pane(id),
            None => {}
        }
    }

    /// Fixes a pane to the viewport.
    ///
    /// A pane pinned for the first time takes the full padded viewport height and whatever
    /// width the other pinned panes leave; later pins reuse its last pinned size.
    pub fn pin_pane(&mut self, id: PaneId) {
        let Some(pane) = self.panes.get(&id) else {
            return;
        };
        if pane.is_pinned {
            return;
        }

        let padding = self.context.config.viewport_padding;
        let combined_width: f32 = self
            .panes
            .values()
            .filter(|pane| pane.is_pinned)
            .map(|pane| pane.pinned_size.x + padding)
            .sum();
        let anchor = self.viewport_anchor();
        let available = self.placement().padded_viewport() - anchor;
        let size = if pane.pinned_size.x == 0.0 || pane.pinned_size.y == 0.0 {
            Vector::new(available.x - combined_width, available.y)
        } else {
            pane.pinned_size
        };
        let position = self
            .placement()
            .place_pinned(anchor, size, self.panes.values());

        let mut panes = (*self.panes).clone();
        if let Some(pane) = panes.get_mut(&id) {
            pane.is_pinned = true;
            pane.pinned_position = position;
            pane.pinned_size = size;
        }
        info!("pinned pane {}", id);
        self.set_panes(panes);
    }

    /// Returns a pinned pane to the canvas at the first free slot.
    pub fn unpin_pane(&mut self, id: PaneId) {
        if !self.panes.get(&id).is_some_and(|pane| pane.is_pinned) {
            return;
        }
        let mut panes = (*self.panes).clone();
        let Some(mut pane) = panes.remove(&id) else {
            return;
        };
        // The pane itself must not count as an obstacle.
        let anchor = self.camera.to_canvas(self.viewport_anchor());
        pane.position = self.placement().place(anchor, pane.size, panes.values());
        pane.is_pinned = false;
        panes.insert(id, pane);
        info!("unpinned pane {}", id);
        self.set_panes(panes);
    }

    /// Gives a pane keyboard focus.
    pub fn focus_pane(&mut self, id: PaneId) {
        let Some(pane) = self.panes.get(&id) else {
            return;
        };
        self.focused = Some(id);
        if let (Some(host), Some(identifier)) = (&self.context.editor_host, pane.kind.identifier()) {
            host.focus_editor(identifier);
        }
    }

    /// Selects a pane, optionally replacing the selection.
    pub fn select_pane(&mut self, id: PaneId, clear_selection: bool) {
        if !self.panes.contains_key(&id) {
            return;
        }
        let mut selection = if clear_selection {
            Selection::new()
        } else {
            (*self.selection).clone()
        };
        selection.insert(id);
        self.set_selection(selection);
    }

    /// Removes a pane from the selection.
    pub fn deselect_pane(&mut self, id: PaneId) {
        if self.selection.contains(&id) {
            let mut selection = (*self.selection).clone();
            selection.remove(&id);
            self.set_selection(selection);
        }
    }

    /// Selects every pane.
    pub fn select_all(&mut self) {
        let selection: Selection = self.panes.keys().copied().collect();
        self.set_selection(selection);
    }

    /// Deselects everything.
    pub fn clear_selection(&mut self) {
        if !self.selection.is_empty() {
            self.set_selection(Selection::new());
        }
    }

    /// Selects the panes intersecting a viewport rectangle.
    ///
    /// # Arguments
    ///
    /// * `rect` - Selection rectangle in viewport space
    /// * `only_add` - Keep selected panes outside the rectangle selected
    pub fn drag_select(&mut self, rect: Rect, only_add: bool) {
        let mut selection = (*self.selection).clone();
        for pane in self.panes.values() {
            let intersects = rect.intersects(&pane.viewport_rect(&self.camera));
            if intersects {
                selection.insert(pane.id);
            } else if !only_add {
                selection.remove(&pane.id);
            }
        }
        self.set_selection(selection);
    }
}
