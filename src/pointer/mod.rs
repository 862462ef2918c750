//! Pointer-event dispatch.
//!
//! Interaction handlers form two ordered chains: document-scoped handlers that hit-test against pane
//! chrome (headers, edges) and canvas-scoped handlers that act on the empty canvas. On pointer-down
//! the dispatcher walks the chains in priority order and the first handler to claim the event
//! becomes the single active handler until pointer-up; no other handler sees events meanwhile.
//!
//! Handlers never mutate the workspace. They push [`PointerAction`]s, which the dispatcher returns
//! so that the store can apply them at one place (see `WorkspaceStore::apply_pointer_actions`).
//!
//! # Module Organization
//!
//! - `resize` - Edge and corner resizing with min/max clamping
//! - `movement` - Header dragging with thresholded deltas
//! - `hand` - Camera panning
//! - `box_select` - Rubber-band selection on the canvas
//! - `close_header` - Middle-click to close

mod box_select;
mod close_header;
mod hand;
mod movement;
mod resize;

pub use box_select::BoxSelectHandler;
pub use close_header::CloseHeaderHandler;
pub use hand::HandHandler;
pub use movement::MoveHandler;
pub use resize::{ResizeEdges, ResizeHandler};
pub(crate) use resize::clamp_axis;

use crate::camera::CameraState;
use crate::config::WorkspaceConfig;
use crate::constants::CONTEXT_MENU_DRAG_DISTANCE_SQUARED;
use crate::geometry::{Rect, Vector};
use crate::types::PaneId;
use serde::{Deserialize, Serialize};

/// Mouse button that triggered an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerButton {
    /// Left button
    Primary,
    /// Wheel button
    Middle,
    /// Right button
    Secondary,
}

/// Bitmask values for [`PointerEvent::buttons`].
pub mod buttons {
    /// Primary button held
    pub const PRIMARY: u8 = 1;
    /// Secondary button held
    pub const SECONDARY: u8 = 2;
    /// Middle button held
    pub const MIDDLE: u8 = 4;
}

/// Keyboard modifiers held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    /// Alt / option
    pub alt: bool,
    /// Shift
    pub shift: bool,
    /// Control
    pub ctrl: bool,
    /// Command / super
    pub meta: bool,
}

/// What the pointer was over when the event fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTarget {
    /// The empty canvas surface
    Canvas,
    /// Anything drawn over the canvas (pane chrome, editors)
    Document,
}

/// A pointer event translated into workspace terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Pointer position in viewport space
    pub viewport: Vector,
    /// Button that changed state, or the primary button for moves
    pub button: PointerButton,
    /// Bitmask of held buttons, see [`buttons`]
    pub buttons: u8,
    /// Held modifiers
    pub modifiers: Modifiers,
    /// What the pointer is over
    pub target: EventTarget,
    /// Camera at the time of the event
    pub camera: CameraState,
}

impl PointerEvent {
    /// Pointer position in canvas space.
    pub fn canvas(&self) -> Vector {
        self.camera.to_canvas(self.viewport)
    }

    /// Canvas scale at the time of the event.
    pub fn scale(&self) -> f32 {
        self.camera.scale
    }
}

/// Which chain a handler belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerScope {
    /// Receives events hitting the bare canvas
    Canvas,
    /// Receives every event first, hit-testing against registered regions
    Document,
}

/// Identifies a handler's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// Camera panning
    Hand,
    /// Rubber-band selection
    Selection,
    /// Pane dragging
    Movement,
    /// Pane resizing
    Resize,
    /// Middle-click close
    CloseHeader,
}

/// Cursor a handler wants while hovering or active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStyle {
    /// Open hand, ready to pan
    Grab,
    /// Closed hand, panning
    Grabbing,
    /// Four-way move
    Move,
    /// Vertical resize
    ResizeVertical,
    /// Horizontal resize
    ResizeHorizontal,
    /// Top-left / bottom-right diagonal resize
    ResizeNwSe,
    /// Top-right / bottom-left diagonal resize
    ResizeNeSw,
}

/// A workspace change requested by a handler.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerAction {
    /// Move and/or resize a pane (and the rest of the selection) by a delta
    UpdateBounds {
        /// Pane under the pointer
        pane: PaneId,
        /// Canvas position change
        position_delta: Vector,
        /// Canvas size change
        size_delta: Vector,
    },
    /// A move or resize gesture began on a pane
    InteractionStarted {
        /// Pane under the pointer
        pane: PaneId,
    },
    /// A pane was pressed and released without dragging
    Click {
        /// Pane under the pointer
        pane: PaneId,
    },
    /// Close the open undo batch
    Commit,
    /// Move the camera to a new offset
    SetCamera {
        /// New camera offset
        position: Vector,
    },
    /// Deselect everything
    ClearSelection,
    /// Select the panes intersecting a viewport rectangle
    DragSelect {
        /// Selection rectangle in viewport space
        rect: Rect,
        /// Keep existing selections instead of matching the rectangle exactly
        only_add: bool,
    },
    /// Show or hide the rubber-band rectangle
    SelectionBox(Option<Rect>),
    /// Close a pane through the editor host
    ClosePane {
        /// Pane to close
        pane: PaneId,
    },
    /// A secondary click finished without turning into a pan
    ShowContextMenu {
        /// Viewport position of the click
        position: Vector,
    },
}

/// Hit region for resizing one pane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeRequest {
    /// Pane the region belongs to
    pub pane: PaneId,
    /// Pane bounds in viewport space
    pub bounds: Rect,
    /// Current canvas size of the pane
    pub size: Vector,
    /// Smallest allowed canvas size
    pub min_size: Vector,
    /// Largest allowed canvas size
    pub max_size: Vector,
    /// Whether drag deltas are divided by the canvas scale
    pub scale_aware: bool,
}

/// Hit region for dragging one pane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveRequest {
    /// Pane the region belongs to
    pub pane: PaneId,
    /// Draggable region in viewport space
    pub bounds: Rect,
}

/// Header region a middle click closes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderRegion {
    /// Pane the header belongs to
    pub pane: PaneId,
    /// Header bounds in viewport space
    pub bounds: Rect,
}

/// Every hit region currently registered, in stacking order (later entries are on top).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionTargets {
    /// Resize regions
    pub resize: Vec<ResizeRequest>,
    /// Move regions
    pub movement: Vec<MoveRequest>,
    /// Header regions
    pub headers: Vec<HeaderRegion>,
}

/// Shared interface of every interaction handler.
pub trait PointerHandler {
    /// Chain the handler belongs to.
    fn scope(&self) -> HandlerScope;

    /// Role of the handler.
    fn kind(&self) -> HandlerKind;

    /// Receives the latest hit regions.
    fn set_targets(&mut self, _targets: &InteractionTargets) {}

    /// Pointer moved with no active handler. Returns true if the handler is hovering a target
    /// and has styled the cursor.
    fn on_pointer_move(&mut self, event: &PointerEvent) -> bool;

    /// Pointer pressed. Returns true to claim the gesture. `force_accept` bypasses the hit test.
    fn on_pointer_down(
        &mut self,
        event: &PointerEvent,
        force_accept: bool,
        actions: &mut Vec<PointerAction>,
    ) -> bool;

    /// Pointer moved while this handler is active.
    fn on_pointer_drag(&mut self, event: &PointerEvent, actions: &mut Vec<PointerAction>);

    /// Pointer released while this handler is active.
    fn on_pointer_up(&mut self, event: &PointerEvent, actions: &mut Vec<PointerAction>);

    /// Drops any hover cursor.
    fn clear_cursor(&mut self);

    /// Cursor the handler currently wants.
    fn cursor(&self) -> Option<CursorStyle>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveHandler {
    scope: HandlerScope,
    index: usize,
}

/// Routes pointer events through the handler chains.
pub struct PointerDispatcher {
    document_handlers: Vec<Box<dyn PointerHandler>>,
    canvas_handlers: Vec<Box<dyn PointerHandler>>,
    active: Option<ActiveHandler>,
    context_menu_origin: Option<Vector>,
}

impl PointerDispatcher {
    /// Creates the standard chains: close-header, move, hand, resize on the document and
    /// box-select on the canvas.
    ///
    /// # Arguments
    ///
    /// * `config` - Supplies thresholds and the middle-click-close flag
    pub fn new(config: &WorkspaceConfig) -> Self {
        Self::with_handlers(
            vec![
                Box::new(CloseHeaderHandler::new(config.middle_click_close)),
                Box::new(MoveHandler::new(
                    config.move_threshold,
                    config.coarse_move_threshold,
                )),
                Box::new(HandHandler::new()),
                Box::new(ResizeHandler::new(config.resize_margin)),
            ],
            vec![Box::new(BoxSelectHandler::new())],
        )
    }

    /// Creates a dispatcher with custom chains, each in priority order.
    pub fn with_handlers(
        document_handlers: Vec<Box<dyn PointerHandler>>,
        canvas_handlers: Vec<Box<dyn PointerHandler>>,
    ) -> Self {
        Self {
            document_handlers,
            canvas_handlers,
            active: None,
            context_menu_origin: None,
        }
    }

    /// Forwards the latest hit regions to every handler.
    pub fn set_targets(&mut self, targets: &InteractionTargets) {
        for handler in self
            .document_handlers
            .iter_mut()
            .chain(self.canvas_handlers.iter_mut())
        {
            handler.set_targets(targets);
        }
    }

    /// Kind of the active handler, if a gesture is in progress.
    pub fn active_kind(&self) -> Option<HandlerKind> {
        self.active
            .and_then(|active| self.handler(active))
            .map(|handler| handler.kind())
    }

    /// Cursor to show: the active handler's, else the first hovering handler's.
    pub fn cursor(&self) -> Option<CursorStyle> {
        if let Some(handler) = self.active.and_then(|active| self.handler(active)) {
            return handler.cursor();
        }
        self.document_handlers
            .iter()
            .chain(self.canvas_handlers.iter())
            .find_map(|handler| handler.cursor())
    }

    /// Handles a pointer press.
    ///
    /// Document handlers are tried first; the hand handler is force-accepted for secondary
    /// clicks on the canvas. Canvas handlers are tried only if nothing claimed and the event
    /// hit the canvas.
    pub fn pointer_down(&mut self, event: &PointerEvent) -> Vec<PointerAction> {
        let mut actions = Vec::new();
        if self.active.is_some() {
            return actions;
        }

        let secondary_on_canvas =
            event.target == EventTarget::Canvas && event.button == PointerButton::Secondary;
        if secondary_on_canvas {
            self.context_menu_origin = Some(event.viewport);
        }

        for (index, handler) in self.document_handlers.iter_mut().enumerate() {
            let force_accept = secondary_on_canvas && handler.kind() == HandlerKind::Hand;
            if handler.on_pointer_down(event, force_accept, &mut actions) {
                self.active = Some(ActiveHandler {
                    scope: HandlerScope::Document,
                    index,
                });
                return actions;
            }
        }

        if event.target == EventTarget::Canvas {
            for (index, handler) in self.canvas_handlers.iter_mut().enumerate() {
                if handler.on_pointer_down(event, false, &mut actions) {
                    self.active = Some(ActiveHandler {
                        scope: HandlerScope::Canvas,
                        index,
                    });
                    break;
                }
            }
        }
        actions
    }

    /// Handles pointer motion.
    ///
    /// A move with no buttons held ends an active gesture. While a gesture is active only the
    /// active handler sees the event. Otherwise document handlers are asked to hover in order,
    /// and once one reports hovering the rest clear their cursors.
    pub fn pointer_move(&mut self, event: &PointerEvent) -> Vec<PointerAction> {
        let mut actions = Vec::new();

        if let Some(origin) = self.context_menu_origin {
            if event.viewport.distance_squared(origin) >= CONTEXT_MENU_DRAG_DISTANCE_SQUARED {
                self.context_menu_origin = None;
                if self.active_kind() != Some(HandlerKind::Hand) {
                    self.force_hand(event, &mut actions);
                }
            }
        }

        if self.active.is_some() && event.buttons == 0 {
            actions.extend(self.pointer_up(event));
            return actions;
        }

        if let Some(active) = self.active {
            if let Some(handler) = self.handler_mut(active) {
                handler.on_pointer_drag(event, &mut actions);
            }
            return actions;
        }

        let mut is_styling_cursor = false;
        for handler in self.document_handlers.iter_mut() {
            if is_styling_cursor {
                handler.clear_cursor();
            } else if handler.on_pointer_move(event) {
                is_styling_cursor = true;
            }
        }
        for handler in self.canvas_handlers.iter_mut() {
            handler.on_pointer_move(event);
        }
        actions
    }

    /// Handles a pointer release, ending the active gesture.
    pub fn pointer_up(&mut self, event: &PointerEvent) -> Vec<PointerAction> {
        let mut actions = Vec::new();
        if let Some(active) = self.active.take() {
            if let Some(handler) = self.handler_mut(active) {
                handler.on_pointer_up(event, &mut actions);
            }
        }
        if let Some(origin) = self.context_menu_origin.take() {
            actions.push(PointerAction::ShowContextMenu { position: origin });
        }
        actions
    }

    /// Returns true while a secondary click may still become a context menu.
    pub fn is_handling_context_menu(&self) -> bool {
        self.context_menu_origin.is_some()
    }

    /// Makes the hand handler active regardless of what is under the pointer.
    fn force_hand(&mut self, event: &PointerEvent, actions: &mut Vec<PointerAction>) {
        if let Some(active) = self.active.take() {
            if let Some(handler) = self.handler_mut(active) {
                handler.on_pointer_up(event, actions);
            }
        }
        for (index, handler) in self.document_handlers.iter_mut().enumerate() {
            if handler.kind() == HandlerKind::Hand {
                handler.on_pointer_down(event, true, actions);
                self.active = Some(ActiveHandler {
                    scope: HandlerScope::Document,
                    index,
                });
                break;
            }
        }
    }

    fn handler(&self, active: ActiveHandler) -> Option<&dyn PointerHandler> {
        let chain = match active.scope {
            HandlerScope::Document => &self.document_handlers,
            HandlerScope::Canvas => &self.canvas_handlers,
        };
        chain.get(active.index).map(|handler| handler.as_ref())
    }

    fn handler_mut(&mut self, active: ActiveHandler) -> Option<&mut Box<dyn PointerHandler>> {
        let chain = match active.scope {
            HandlerScope::Document => &mut self.document_handlers,
            HandlerScope::Canvas => &mut self.canvas_handlers,
        };
        chain.get_mut(active.index)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn event(x: f32, y: f32) -> PointerEvent {
        PointerEvent {
            viewport: Vector::new(x, y),
            button: PointerButton::Primary,
            buttons: buttons::PRIMARY,
            modifiers: Modifiers::default(),
            target: EventTarget::Document,
            camera: CameraState::default(),
        }
    }

    pub fn canvas_event(x: f32, y: f32) -> PointerEvent {
        PointerEvent {
            target: EventTarget::Canvas,
            ..event(x, y)
        }
    }

    pub fn released(mut event: PointerEvent) -> PointerEvent {
        event.buttons = 0;
        event
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use uuid::Uuid;

    fn targets_for(pane: PaneId, bounds: Rect) -> InteractionTargets {
        let header = Rect::from_position_and_size(bounds.top_left(), Vector::new(bounds.width(), 25.0));
        InteractionTargets {
            resize: vec![ResizeRequest {
                pane,
                bounds,
                size: bounds.size(),
                min_size: Vector::new(50.0, 50.0),
                max_size: Vector::new(f32::INFINITY, f32::INFINITY),
                scale_aware: true,
            }],
            movement: vec![MoveRequest { pane, bounds: header }],
            headers: vec![HeaderRegion { pane, bounds: header }],
        }
    }

    fn dispatcher_with_pane() -> (PointerDispatcher, PaneId) {
        let pane = Uuid::new_v4();
        let mut dispatcher = PointerDispatcher::new(&WorkspaceConfig::default());
        dispatcher.set_targets(&targets_for(
            pane,
            Rect::from_position_and_size(Vector::new(100.0, 100.0), Vector::new(300.0, 200.0)),
        ));
        (dispatcher, pane)
    }

    #[test]
    fn test_header_press_claims_move_handler() {
        let (mut dispatcher, pane) = dispatcher_with_pane();
        dispatcher.pointer_down(&event(200.0, 110.0));
        assert_eq!(dispatcher.active_kind(), Some(HandlerKind::Movement));

        let actions = dispatcher.pointer_move(&event(230.0, 110.0));
        assert!(actions.contains(&PointerAction::InteractionStarted { pane }));
        assert!(actions.iter().any(|action| matches!(
            action,
            PointerAction::UpdateBounds { position_delta, .. } if position_delta.x == 30.0
        )));

        let actions = dispatcher.pointer_up(&released(event(230.0, 110.0)));
        assert!(actions.contains(&PointerAction::Commit));
        assert_eq!(dispatcher.active_kind(), None);
    }

    #[test]
    fn test_active_handler_is_exclusive() {
        let (mut dispatcher, _) = dispatcher_with_pane();
        // Start a box select on the bare canvas.
        dispatcher.pointer_down(&canvas_event(600.0, 600.0));
        assert_eq!(dispatcher.active_kind(), Some(HandlerKind::Selection));

        // Dragging across a pane header does not hand the gesture to the move handler.
        let actions = dispatcher.pointer_move(&canvas_event(200.0, 110.0));
        assert_eq!(dispatcher.active_kind(), Some(HandlerKind::Selection));
        assert!(!actions
            .iter()
            .any(|action| matches!(action, PointerAction::UpdateBounds { .. })));
        assert!(actions
            .iter()
            .any(|action| matches!(action, PointerAction::DragSelect { .. })));
    }

    #[test]
    fn test_move_without_buttons_ends_gesture() {
        let (mut dispatcher, _) = dispatcher_with_pane();
        dispatcher.pointer_down(&canvas_event(600.0, 600.0));
        let actions = dispatcher.pointer_move(&released(canvas_event(610.0, 610.0)));
        assert_eq!(dispatcher.active_kind(), None);
        assert!(actions.contains(&PointerAction::SelectionBox(None)));
    }

    #[test]
    fn test_secondary_click_on_canvas_forces_hand() {
        let (mut dispatcher, _) = dispatcher_with_pane();
        let mut down = canvas_event(600.0, 600.0);
        down.button = PointerButton::Secondary;
        down.buttons = buttons::SECONDARY;
        dispatcher.pointer_down(&down);
        assert_eq!(dispatcher.active_kind(), Some(HandlerKind::Hand));
        assert!(dispatcher.is_handling_context_menu());

        // A short click still opens the context menu.
        let actions = dispatcher.pointer_up(&released(down));
        assert!(actions.contains(&PointerAction::ShowContextMenu {
            position: Vector::new(600.0, 600.0)
        }));
    }

    #[test]
    fn test_secondary_drag_cancels_context_menu_and_pans() {
        let (mut dispatcher, _) = dispatcher_with_pane();
        let mut down = canvas_event(600.0, 600.0);
        down.button = PointerButton::Secondary;
        down.buttons = buttons::SECONDARY;
        dispatcher.pointer_down(&down);

        let mut drag = down;
        drag.viewport = Vector::new(640.0, 600.0);
        let actions = dispatcher.pointer_move(&drag);
        assert!(!dispatcher.is_handling_context_menu());
        assert!(actions.contains(&PointerAction::SetCamera {
            position: Vector::new(40.0, 0.0)
        }));

        let actions = dispatcher.pointer_up(&released(drag));
        assert!(!actions
            .iter()
            .any(|action| matches!(action, PointerAction::ShowContextMenu { .. })));
    }

    #[test]
    fn test_hover_styles_only_first_matching_handler() {
        let (mut dispatcher, _) = dispatcher_with_pane();
        // Right edge of the pane: the resize handler hovers.
        let mut hover = event(400.0, 200.0);
        hover.buttons = 0;
        dispatcher.pointer_move(&hover);
        assert_eq!(dispatcher.cursor(), Some(CursorStyle::ResizeHorizontal));

        // Inside the header: the move handler hovers and the resize cursor is cleared.
        let mut hover = event(200.0, 110.0);
        hover.buttons = 0;
        dispatcher.pointer_move(&hover);
        assert_eq!(dispatcher.cursor(), Some(CursorStyle::Move));
    }
}
