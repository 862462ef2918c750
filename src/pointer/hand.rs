//! Camera panning.

use super::{
    CursorStyle, EventTarget, HandlerKind, HandlerScope, PointerAction, PointerButton,
    PointerEvent, PointerHandler,
};
use crate::geometry::Vector;

/// Pans the camera with alt+drag, middle-drag, or a forced secondary drag.
#[derive(Debug, Clone, Default)]
pub struct HandHandler {
    hovering: bool,
    mouse_down_viewport: Option<Vector>,
    mouse_down_camera: Vector,
}

impl HandHandler {
    /// Creates an idle hand handler.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PointerHandler for HandHandler {
    fn scope(&self) -> HandlerScope {
        HandlerScope::Document
    }

    fn kind(&self) -> HandlerKind {
        HandlerKind::Hand
    }

    fn on_pointer_move(&mut self, event: &PointerEvent) -> bool {
        self.hovering =
            (event.modifiers.alt && event.target == EventTarget::Canvas) || event.buttons > 0;
        self.hovering
    }

    fn on_pointer_down(
        &mut self,
        event: &PointerEvent,
        force_accept: bool,
        _actions: &mut Vec<PointerAction>,
    ) -> bool {
        let alt_click = event.modifiers.alt
            && event.target == EventTarget::Canvas
            && event.button == PointerButton::Primary;
        if !(force_accept || alt_click || event.button == PointerButton::Middle) {
            return false;
        }
        self.mouse_down_viewport = Some(event.viewport);
        self.mouse_down_camera = event.camera.position;
        true
    }

    fn on_pointer_drag(&mut self, event: &PointerEvent, actions: &mut Vec<PointerAction>) {
        let Some(mouse_down_viewport) = self.mouse_down_viewport else {
            return;
        };
        actions.push(PointerAction::SetCamera {
            position: self.mouse_down_camera + (event.viewport - mouse_down_viewport),
        });
    }

    fn on_pointer_up(&mut self, event: &PointerEvent, _actions: &mut Vec<PointerAction>) {
        self.mouse_down_viewport = None;
        self.hovering = event.modifiers.alt && event.target == EventTarget::Canvas;
    }

    fn clear_cursor(&mut self) {
        self.hovering = false;
    }

    fn cursor(&self) -> Option<CursorStyle> {
        if self.mouse_down_viewport.is_some() {
            Some(CursorStyle::Grabbing)
        } else if self.hovering {
            Some(CursorStyle::Grab)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_alt_click_on_canvas_pans_from_down_camera() {
        let mut handler = HandHandler::new();
        let mut actions = Vec::new();
        let mut down = canvas_event(100.0, 100.0);
        down.modifiers.alt = true;
        down.camera.position = Vector::new(10.0, 20.0);
        assert!(handler.on_pointer_down(&down, false, &mut actions));

        // The camera moved in the meantime; panning is still relative to the press.
        let mut drag = down;
        drag.viewport = Vector::new(70.0, 130.0);
        drag.camera.position = Vector::new(999.0, 999.0);
        handler.on_pointer_drag(&drag, &mut actions);
        assert_eq!(
            actions,
            vec![PointerAction::SetCamera {
                position: Vector::new(-20.0, 50.0)
            }]
        );
        assert_eq!(handler.cursor(), Some(CursorStyle::Grabbing));
    }

    #[test]
    fn test_plain_primary_click_is_ignored() {
        let mut handler = HandHandler::new();
        let mut actions = Vec::new();
        assert!(!handler.on_pointer_down(&canvas_event(0.0, 0.0), false, &mut actions));
        // Alt over pane chrome does not pan either.
        let mut down = event(0.0, 0.0);
        down.modifiers.alt = true;
        assert!(!handler.on_pointer_down(&down, false, &mut actions));
    }

    #[test]
    fn test_middle_click_pans_anywhere() {
        let mut handler = HandHandler::new();
        let mut actions = Vec::new();
        let mut down = event(0.0, 0.0);
        down.button = PointerButton::Middle;
        assert!(handler.on_pointer_down(&down, false, &mut actions));
    }
}
