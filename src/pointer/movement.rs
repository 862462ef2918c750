//! Dragging panes by their header.

use super::{
    CursorStyle, HandlerKind, HandlerScope, InteractionTargets, MoveRequest, PointerAction,
    PointerButton, PointerEvent, PointerHandler,
};
use crate::geometry::Vector;
use crate::types::PaneId;

#[derive(Debug, Clone, Copy)]
struct MoveGesture {
    pane: PaneId,
    last_viewport: Vector,
    accumulated: Vector,
    dragged: bool,
}

/// Moves panes by dragging a registered region.
///
/// Sub-threshold motion is accumulated per axis and only emitted once it crosses the threshold,
/// which keeps layout updates (and arrow regeneration) from running on every pixel.
#[derive(Debug, Clone)]
pub struct MoveHandler {
    threshold: f32,
    coarse_threshold: f32,
    requests: Vec<MoveRequest>,
    hovering: Option<PaneId>,
    gesture: Option<MoveGesture>,
}

impl MoveHandler {
    /// Creates a handler emitting deltas past `threshold`, or `coarse_threshold` with shift held.
    pub fn new(threshold: f32, coarse_threshold: f32) -> Self {
        Self {
            threshold,
            coarse_threshold,
            requests: Vec::new(),
            hovering: None,
            gesture: None,
        }
    }

    fn hit_test(&self, position: Vector) -> Option<PaneId> {
        self.requests
            .iter()
            .rev()
            .find(|request| request.bounds.strictly_contains_point(position))
            .map(|request| request.pane)
    }
}

impl PointerHandler for MoveHandler {
    fn scope(&self) -> HandlerScope {
        HandlerScope::Document
    }

    fn kind(&self) -> HandlerKind {
        HandlerKind::Movement
    }

    fn set_targets(&mut self, targets: &InteractionTargets) {
        self.requests = targets.movement.clone();
    }

    fn on_pointer_move(&mut self, event: &PointerEvent) -> bool {
        if event.modifiers.alt {
            self.hovering = None;
            return false;
        }
        self.hovering = self.hit_test(event.viewport);
        self.hovering.is_some()
    }

    fn on_pointer_down(
        &mut self,
        event: &PointerEvent,
        force_accept: bool,
        _actions: &mut Vec<PointerAction>,
    ) -> bool {
        if force_accept || event.button != PointerButton::Primary || event.modifiers.alt {
            return false;
        }
        let Some(pane) = self.hit_test(event.viewport) else {
            return false;
        };
        self.hovering = Some(pane);
        self.gesture = Some(MoveGesture {
            pane,
            last_viewport: event.viewport,
            accumulated: Vector::ZERO,
            dragged: false,
        });
        true
    }

    fn on_pointer_drag(&mut self, event: &PointerEvent, actions: &mut Vec<PointerAction>) {
        let threshold = if event.modifiers.shift {
            self.coarse_threshold
        } else {
            self.threshold
        };
        let Some(gesture) = self.gesture.as_mut() else {
            return;
        };
        gesture.accumulated += event.viewport - gesture.last_viewport;
        gesture.last_viewport = event.viewport;

        let mut delta = Vector::ZERO;
        if gesture.accumulated.x.abs() > threshold {
            delta.x = gesture.accumulated.x.round();
            gesture.accumulated.x = 0.0;
        }
        if gesture.accumulated.y.abs() > threshold {
            delta.y = gesture.accumulated.y.round();
            gesture.accumulated.y = 0.0;
        }
        if delta == Vector::ZERO {
            return;
        }

        if !gesture.dragged {
            gesture.dragged = true;
            actions.push(PointerAction::InteractionStarted { pane: gesture.pane });
        }
        actions.push(PointerAction::UpdateBounds {
            pane: gesture.pane,
            position_delta: delta,
            size_delta: Vector::ZERO,
        });
    }

    fn on_pointer_up(&mut self, _event: &PointerEvent, actions: &mut Vec<PointerAction>) {
        if let Some(gesture) = self.gesture.take() {
            if gesture.dragged {
                actions.push(PointerAction::Commit);
            } else {
                actions.push(PointerAction::Click { pane: gesture.pane });
            }
        }
    }

    fn clear_cursor(&mut self) {
        self.hovering = None;
    }

    fn cursor(&self) -> Option<CursorStyle> {
        if self.gesture.is_some() || self.hovering.is_some() {
            Some(CursorStyle::Move)
        } else {
            None
        }
    }
}
