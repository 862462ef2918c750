//! Canvas input: egui pointer, wheel and pinch events translated into workspace terms.
//!
//! Positions handed to the store are in viewport space, i.e. relative to the top-left corner of
//! the canvas area rather than the window.

use super::{CanvasApp, ContextMenuState};
use canvas_workspace::{
    buttons, CursorStyle, EventTarget, Modifiers, PointerButton, PointerEvent, Vector,
};
use eframe::egui;

/// Pixels scrolled per wheel line.
const WHEEL_LINE_HEIGHT: f32 = 40.0;

impl CanvasApp {
    /// Allocates the canvas, feeds this frame's input to the store and paints the workspace.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI context for the central panel
    pub(super) fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let canvas_rect = response.rect;
        self.canvas_origin = canvas_rect.min;
        self.store
            .set_viewport_size(Vector::new(canvas_rect.width(), canvas_rect.height()));

        self.handle_pointer_events(ui, canvas_rect);

        if let Some(viewport) = self.store.take_context_menu() {
            self.context_menu = Some(ContextMenuState {
                viewport,
                just_opened: true,
            });
        }
        if let Some(cursor) = self.store.cursor() {
            ui.ctx().set_cursor_icon(cursor_icon(cursor));
        }

        let show_numbers = ui.input(|i| i.modifiers.alt);
        self.render_workspace(&painter, canvas_rect, show_numbers);
    }

    /// Forwards raw pointer and wheel events that hit the canvas layer.
    ///
    /// Presses only count when nothing is drawn above the canvas at that point, so toolbar
    /// menus and the context menu keep their clicks. Moves and releases are forwarded while a
    /// button is held so drags continue outside the canvas.
    fn handle_pointer_events(&mut self, ui: &egui::Ui, canvas_rect: egui::Rect) {
        let layer = ui.layer_id();
        let ctx = ui.ctx().clone();
        let on_canvas = |pos: egui::Pos2| {
            canvas_rect.contains(pos) && ctx.layer_id_at(pos).map_or(true, |hit| hit == layer)
        };
        let events = ui.input(|i| i.events.clone());
        let hover = ui.input(|i| i.pointer.hover_pos());

        for event in events {
            match event {
                egui::Event::PointerMoved(pos) => {
                    if self.held_buttons == 0 && !canvas_rect.contains(pos) {
                        continue;
                    }
                    let event = self.pointer_event(pos, PointerButton::Primary, modifiers_now(ui));
                    self.store.pointer_move(&event);
                }
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    modifiers,
                    ..
                } => {
                    let Some((button, mask)) = map_button(button) else {
                        continue;
                    };
                    let modifiers = map_modifiers(modifiers);
                    if pressed {
                        if !on_canvas(pos) {
                            continue;
                        }
                        self.held_buttons |= mask;
                        let event = self.pointer_event(pos, button, modifiers);
                        self.store.pointer_down(&event);
                    } else {
                        if self.held_buttons & mask == 0 {
                            continue;
                        }
                        self.held_buttons &= !mask;
                        let event = self.pointer_event(pos, button, modifiers);
                        self.store.pointer_up(&event);
                    }
                }
                egui::Event::MouseWheel {
                    unit,
                    delta,
                    modifiers,
                    ..
                } => {
                    let Some(pos) = hover.filter(|pos| on_canvas(*pos)) else {
                        continue;
                    };
                    let pixels = match unit {
                        egui::MouseWheelUnit::Point => delta,
                        egui::MouseWheelUnit::Line => delta * WHEEL_LINE_HEIGHT,
                        egui::MouseWheelUnit::Page => delta * canvas_rect.height(),
                    };
                    // egui reports the direction content should move; the store expects
                    // the direction the wheel turned.
                    self.store.wheel(
                        Vector::new(-pixels.x, -pixels.y),
                        self.viewport_position(pos),
                        map_modifiers(modifiers),
                        false,
                    );
                }
                egui::Event::Zoom(factor) => {
                    let Some(pos) = hover.filter(|pos| on_canvas(*pos)) else {
                        continue;
                    };
                    let scale = self.store.camera().scale * factor;
                    self.store.set_scale(scale, self.viewport_position(pos));
                }
                _ => {}
            }
        }
    }

    /// Converts a screen position to viewport space.
    fn viewport_position(&self, pos: egui::Pos2) -> Vector {
        Vector::new(pos.x - self.canvas_origin.x, pos.y - self.canvas_origin.y)
    }

    /// Builds a pointer event, hit-testing panes to decide whether it targets a document.
    fn pointer_event(
        &self,
        pos: egui::Pos2,
        button: PointerButton,
        modifiers: Modifiers,
    ) -> PointerEvent {
        let viewport = self.viewport_position(pos);
        let camera = self.store.camera();
        let over_pane = self
            .store
            .panes()
            .values()
            .any(|pane| pane.viewport_rect(&camera).contains_point(viewport));
        PointerEvent {
            viewport,
            button,
            buttons: self.held_buttons,
            modifiers,
            target: if over_pane {
                EventTarget::Document
            } else {
                EventTarget::Canvas
            },
            camera,
        }
    }
}

fn modifiers_now(ui: &egui::Ui) -> Modifiers {
    map_modifiers(ui.input(|i| i.modifiers))
}

fn map_modifiers(modifiers: egui::Modifiers) -> Modifiers {
    Modifiers {
        alt: modifiers.alt,
        shift: modifiers.shift,
        ctrl: modifiers.ctrl,
        meta: modifiers.mac_cmd,
    }
}

fn map_button(button: egui::PointerButton) -> Option<(PointerButton, u8)> {
    match button {
        egui::PointerButton::Primary => Some((PointerButton::Primary, buttons::PRIMARY)),
        egui::PointerButton::Secondary => Some((PointerButton::Secondary, buttons::SECONDARY)),
        egui::PointerButton::Middle => Some((PointerButton::Middle, buttons::MIDDLE)),
        _ => None,
    }
}

fn cursor_icon(cursor: CursorStyle) -> egui::CursorIcon {
    match cursor {
        CursorStyle::Grab => egui::CursorIcon::Grab,
        CursorStyle::Grabbing => egui::CursorIcon::Grabbing,
        CursorStyle::Move => egui::CursorIcon::Move,
        CursorStyle::ResizeVertical => egui::CursorIcon::ResizeVertical,
        CursorStyle::ResizeHorizontal => egui::CursorIcon::ResizeHorizontal,
        CursorStyle::ResizeNwSe => egui::CursorIcon::ResizeNwSe,
        CursorStyle::ResizeNeSw => egui::CursorIcon::ResizeNeSw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_mapping_sets_mask() {
        assert_eq!(
            map_button(egui::PointerButton::Middle),
            Some((PointerButton::Middle, buttons::MIDDLE))
        );
        assert_eq!(map_button(egui::PointerButton::Extra1), None);
    }

    #[test]
    fn test_command_key_maps_to_meta_only_on_mac_cmd() {
        let modifiers = map_modifiers(egui::Modifiers {
            ctrl: true,
            command: true,
            ..Default::default()
        });
        assert!(modifiers.ctrl);
        assert!(!modifiers.meta);
    }
}
