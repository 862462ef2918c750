//! Middle-click on a pane header to close it.

use super::{
    CursorStyle, HandlerKind, HandlerScope, HeaderRegion, InteractionTargets, PointerAction,
    PointerButton, PointerEvent, PointerHandler,
};
use crate::geometry::Vector;
use crate::types::PaneId;

/// Closes a pane when its header is middle-clicked.
///
/// The close is deferred to pointer-up and only happens if the pointer is still over the same
/// header, so sliding off before release cancels it.
#[derive(Debug, Clone)]
pub struct CloseHeaderHandler {
    enabled: bool,
    headers: Vec<HeaderRegion>,
    pane_to_close: Option<PaneId>,
}

impl CloseHeaderHandler {
    /// Creates the handler. When `enabled` is false it never claims.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            headers: Vec::new(),
            pane_to_close: None,
        }
    }

    fn hit_test(&self, position: Vector) -> Option<PaneId> {
        self.headers
            .iter()
            .rev()
            .find(|header| header.bounds.contains_point(position))
            .map(|header| header.pane)
    }
}

impl PointerHandler for CloseHeaderHandler {
    fn scope(&self) -> HandlerScope {
        HandlerScope::Document
    }

    fn kind(&self) -> HandlerKind {
        HandlerKind::CloseHeader
    }

    fn set_targets(&mut self, targets: &InteractionTargets) {
        self.headers = targets.headers.clone();
    }

    fn on_pointer_move(&mut self, _event: &PointerEvent) -> bool {
        false
    }

    fn on_pointer_down(
        &mut self,
        event: &PointerEvent,
        _force_accept: bool,
        _actions: &mut Vec<PointerAction>,
    ) -> bool {
        if !self.enabled || event.button != PointerButton::Middle {
            return false;
        }
        self.pane_to_close = self.hit_test(event.viewport);
        self.pane_to_close.is_some()
    }

    fn on_pointer_drag(&mut self, _event: &PointerEvent, _actions: &mut Vec<PointerAction>) {}

    fn on_pointer_up(&mut self, event: &PointerEvent, actions: &mut Vec<PointerAction>) {
        if let Some(pane) = self.pane_to_close.take() {
            if self.hit_test(event.viewport) == Some(pane) {
                actions.push(PointerAction::ClosePane { pane });
            }
        }
    }

    fn clear_cursor(&mut self) {}

    fn cursor(&self) -> Option<CursorStyle> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::geometry::Rect;
    use uuid::Uuid;

    fn handler(enabled: bool) -> (CloseHeaderHandler, PaneId) {
        let pane = Uuid::new_v4();
        let mut handler = CloseHeaderHandler::new(enabled);
        handler.set_targets(&InteractionTargets {
            headers: vec![HeaderRegion {
                pane,
                bounds: Rect::from_position_and_size(Vector::ZERO, Vector::new(200.0, 25.0)),
            }],
            ..Default::default()
        });
        (handler, pane)
    }

    fn middle(x: f32, y: f32) -> PointerEvent {
        let mut event = event(x, y);
        event.button = PointerButton::Middle;
        event
    }

    #[test]
    fn test_closes_when_released_over_header() {
        let (mut handler, pane) = handler(true);
        let mut actions = Vec::new();
        assert!(handler.on_pointer_down(&middle(50.0, 10.0), false, &mut actions));
        handler.on_pointer_up(&released(middle(60.0, 12.0)), &mut actions);
        assert_eq!(actions, vec![PointerAction::ClosePane { pane }]);
    }

    #[test]
    fn test_sliding_off_header_cancels() {
        let (mut handler, _) = handler(true);
        let mut actions = Vec::new();
        handler.on_pointer_down(&middle(50.0, 10.0), false, &mut actions);
        handler.on_pointer_up(&released(middle(50.0, 100.0)), &mut actions);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_disabled_never_claims() {
        let (mut handler, _) = handler(false);
        let mut actions = Vec::new();
        assert!(!handler.on_pointer_down(&middle(50.0, 10.0), false, &mut actions));
    }
}
