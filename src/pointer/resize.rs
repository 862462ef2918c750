//! Edge and corner resizing.

use super::{
    CursorStyle, HandlerKind, HandlerScope, InteractionTargets, PointerAction, PointerButton,
    PointerEvent, PointerHandler, ResizeRequest,
};
use crate::geometry::Vector;

/// Bitmask of the pane edges a resize gesture moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResizeEdges(u8);

impl ResizeEdges {
    /// No edge
    pub const NONE: ResizeEdges = ResizeEdges(0);
    /// Top edge
    pub const TOP: ResizeEdges = ResizeEdges(2);
    /// Bottom edge
    pub const BOTTOM: ResizeEdges = ResizeEdges(4);
    /// Left edge
    pub const LEFT: ResizeEdges = ResizeEdges(8);
    /// Right edge
    pub const RIGHT: ResizeEdges = ResizeEdges(16);

    /// Raw bit value.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Returns true if every edge in `other` is set.
    pub fn contains(self, other: ResizeEdges) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if no edge is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Maps a pointer delta to `(position_delta, size_delta)` for these edges.
    ///
    /// Moving a top or left edge shifts the position and shrinks the size by the same amount,
    /// so the opposite edge stays put.
    pub fn deltas(self, delta: Vector) -> (Vector, Vector) {
        let mut position = Vector::ZERO;
        let mut size = Vector::ZERO;
        if self.contains(ResizeEdges::TOP) {
            position.y = delta.y;
            size.y = -delta.y;
        } else if self.contains(ResizeEdges::BOTTOM) {
            size.y = delta.y;
        }
        if self.contains(ResizeEdges::LEFT) {
            position.x = delta.x;
            size.x = -delta.x;
        } else if self.contains(ResizeEdges::RIGHT) {
            size.x = delta.x;
        }
        (position, size)
    }

    fn cursor(self) -> Option<CursorStyle> {
        let vertical = self.contains(ResizeEdges::TOP) || self.contains(ResizeEdges::BOTTOM);
        let horizontal = self.contains(ResizeEdges::LEFT) || self.contains(ResizeEdges::RIGHT);
        match (vertical, horizontal) {
            (false, false) => None,
            (true, false) => Some(CursorStyle::ResizeVertical),
            (false, true) => Some(CursorStyle::ResizeHorizontal),
            (true, true) => {
                let descending = (self.contains(ResizeEdges::TOP)
                    && self.contains(ResizeEdges::LEFT))
                    || (self.contains(ResizeEdges::BOTTOM) && self.contains(ResizeEdges::RIGHT));
                if descending {
                    Some(CursorStyle::ResizeNwSe)
                } else {
                    Some(CursorStyle::ResizeNeSw)
                }
            }
        }
    }
}

impl std::ops::BitOr for ResizeEdges {
    type Output = ResizeEdges;

    fn bitor(self, rhs: ResizeEdges) -> ResizeEdges {
        ResizeEdges(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for ResizeEdges {
    fn bitor_assign(&mut self, rhs: ResizeEdges) {
        self.0 |= rhs.0;
    }
}

/// Clamps one axis of a resize so the size stays within `[min, max]`.
///
/// When the size delta is clamped and the position moves on this axis (a top or left edge), the
/// position delta is clamped in tandem so the opposite edge does not drift.
pub(crate) fn clamp_axis(
    position_delta: &mut f32,
    size_delta: &mut f32,
    current: f32,
    min: f32,
    max: f32,
    scale: f32,
) {
    let min_diff = min - current;
    if *size_delta < min_diff {
        *size_delta = min_diff;
        if *position_delta != 0.0 {
            *position_delta = -min_diff * scale;
        }
    }
    let max_diff = max - current;
    if *size_delta > max_diff {
        *size_delta = max_diff;
        if *position_delta != 0.0 {
            *position_delta = -max_diff * scale;
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ResizeGesture {
    request: ResizeRequest,
    edges: ResizeEdges,
    last_viewport: Vector,
    size: Vector,
    dragged: bool,
}

/// Resizes panes by dragging their edges and corners.
#[derive(Debug, Clone)]
pub struct ResizeHandler {
    margin: f32,
    requests: Vec<ResizeRequest>,
    hover: ResizeEdges,
    gesture: Option<ResizeGesture>,
}

impl ResizeHandler {
    /// Creates a handler offering resizes within `margin` pixels of an edge.
    pub fn new(margin: f32) -> Self {
        Self {
            margin,
            requests: Vec::new(),
            hover: ResizeEdges::NONE,
            gesture: None,
        }
    }

    /// Finds the top-most request whose edge is under `position`.
    ///
    /// Right wins over left and top over bottom when a pane is thinner than twice the margin.
    pub fn hit_test(&self, position: Vector) -> Option<(ResizeRequest, ResizeEdges)> {
        let margin = self.margin;
        for request in self.requests.iter().rev() {
            let bounds = request.bounds;
            let within_y = position.y >= bounds.top() - margin && position.y <= bounds.bottom() + margin;
            let within_x = position.x >= bounds.left() - margin && position.x <= bounds.right() + margin;

            let mut edges = ResizeEdges::NONE;
            if within_y {
                if (position.x - bounds.right()).abs() < margin {
                    edges |= ResizeEdges::RIGHT;
                } else if (position.x - bounds.left()).abs() < margin {
                    edges |= ResizeEdges::LEFT;
                }
            }
            if within_x {
                if (position.y - bounds.top()).abs() < margin {
                    edges |= ResizeEdges::TOP;
                } else if (position.y - bounds.bottom()).abs() < margin {
                    edges |= ResizeEdges::BOTTOM;
                }
            }
            if !edges.is_empty() {
                return Some((*request, edges));
            }
        }
        None
    }
}

impl PointerHandler for ResizeHandler {
    fn scope(&self) -> HandlerScope {
        HandlerScope::Document
    }

    fn kind(&self) -> HandlerKind {
        HandlerKind::Resize
    }

    fn set_targets(&mut self, targets: &InteractionTargets) {
        self.requests = targets.resize.clone();
    }

    fn on_pointer_move(&mut self, event: &PointerEvent) -> bool {
        if event.modifiers.alt {
            self.hover = ResizeEdges::NONE;
            return false;
        }
        self.hover = self
            .hit_test(event.viewport)
            .map(|(_, edges)| edges)
            .unwrap_or(ResizeEdges::NONE);
        !self.hover.is_empty()
    }

    fn on_pointer_down(
        &mut self,
        event: &PointerEvent,
        force_accept: bool,
        _actions: &mut Vec<PointerAction>,
    ) -> bool {
        if force_accept || event.button == PointerButton::Secondary || event.modifiers.alt {
            return false;
        }
        match self.hit_test(event.viewport) {
            Some((request, edges)) => {
                self.hover = edges;
                self.gesture = Some(ResizeGesture {
                    request,
                    edges,
                    last_viewport: event.viewport,
                    size: request.size,
                    dragged: false,
                });
                true
            }
            None => false,
        }
    }

    fn on_pointer_drag(&mut self, event: &PointerEvent, actions: &mut Vec<PointerAction>) {
        let Some(gesture) = self.gesture.as_mut() else {
            return;
        };
        let delta = event.viewport - gesture.last_viewport;
        gesture.last_viewport = event.viewport;
        if delta == Vector::ZERO {
            return;
        }

        if !gesture.dragged {
            gesture.dragged = true;
            actions.push(PointerAction::InteractionStarted {
                pane: gesture.request.pane,
            });
        }

        let (mut position_delta, mut size_delta) = gesture.edges.deltas(delta);
        let scale = if gesture.request.scale_aware {
            event.scale()
        } else {
            1.0
        };
        size_delta = size_delta / scale;

        let request = gesture.request;
        clamp_axis(
            &mut position_delta.x,
            &mut size_delta.x,
            gesture.size.x,
            request.min_size.x,
            request.max_size.x,
            scale,
        );
        clamp_axis(
            &mut position_delta.y,
            &mut size_delta.y,
            gesture.size.y,
            request.min_size.y,
            request.max_size.y,
            scale,
        );
        gesture.size += size_delta;

        actions.push(PointerAction::UpdateBounds {
            pane: request.pane,
            position_delta,
            size_delta,
        });
    }

    fn on_pointer_up(&mut self, _event: &PointerEvent, actions: &mut Vec<PointerAction>) {
        if let Some(gesture) = self.gesture.take() {
            if gesture.dragged {
                actions.push(PointerAction::Commit);
            } else {
                actions.push(PointerAction::Click {
                    pane: gesture.request.pane,
                });
            }
        }
        self.hover = ResizeEdges::NONE;
    }

    fn clear_cursor(&mut self) {
        self.hover = ResizeEdges::NONE;
    }

    fn cursor(&self) -> Option<CursorStyle> {
        match &self.gesture {
            Some(gesture) => gesture.edges.cursor(),
            None => self.hover.cursor(),
        }
    }
}
