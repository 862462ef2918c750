//! Rubber-band selection on the bare canvas.

use super::{
    CursorStyle, HandlerKind, HandlerScope, PointerAction, PointerButton, PointerEvent,
    PointerHandler,
};
use crate::geometry::{Rect, Vector};

/// Selects every pane intersecting a dragged rectangle.
///
/// Without shift the selection is replaced to match the rectangle exactly as it changes; with
/// shift held panes are only ever added.
#[derive(Debug, Clone, Default)]
pub struct BoxSelectHandler {
    mouse_down_viewport: Option<Vector>,
}

impl BoxSelectHandler {
    /// Creates an idle box-select handler.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PointerHandler for BoxSelectHandler {
    fn scope(&self) -> HandlerScope {
        HandlerScope::Canvas
    }

    fn kind(&self) -> HandlerKind {
        HandlerKind::Selection
    }

    fn on_pointer_move(&mut self, _event: &PointerEvent) -> bool {
        false
    }

    fn on_pointer_down(
        &mut self,
        event: &PointerEvent,
        _force_accept: bool,
        actions: &mut Vec<PointerAction>,
    ) -> bool {
        if event.button != PointerButton::Primary {
            return false;
        }
        if !event.modifiers.shift {
            actions.push(PointerAction::ClearSelection);
        }
        self.mouse_down_viewport = Some(event.viewport);
        true
    }

    fn on_pointer_drag(&mut self, event: &PointerEvent, actions: &mut Vec<PointerAction>) {
        let Some(start) = self.mouse_down_viewport else {
            return;
        };
        let rect = Rect::from_corners(start, event.viewport);
        actions.push(PointerAction::SelectionBox(Some(rect)));
        actions.push(PointerAction::DragSelect {
            rect,
            only_add: event.modifiers.shift,
        });
    }

    fn on_pointer_up(&mut self, _event: &PointerEvent, actions: &mut Vec<PointerAction>) {
        if self.mouse_down_viewport.take().is_some() {
            actions.push(PointerAction::SelectionBox(None));
            actions.push(PointerAction::Commit);
        }
    }

    fn clear_cursor(&mut self) {}

    fn cursor(&self) -> Option<CursorStyle> {
        None
    }
}
