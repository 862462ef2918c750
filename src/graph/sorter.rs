//! Reading-order sort of panes for keyboard traversal.
//!
//! Panes are grouped into rows (panes whose top lies within the vertical extent of the row so
//! far), then rows and loose panes are grouped into columns the same way horizontally. Groups
//! and panes are visited nearest-to-origin first, depth first, which yields a stable reading order
//! that roughly follows how the user laid things out.

use crate::camera::CameraState;
use crate::constants::TENTH_PANE_SLOT;
use crate::geometry::{Rect, Vector};
use crate::types::{PaneId, PaneMap, Selection};
use std::collections::HashSet;

/// Direction of a traversal step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalDirection {
    /// Next pane in reading order
    Forward,
    /// Previous pane in reading order
    Backward,
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    Row,
    Column,
}

#[derive(Debug, Clone)]
struct SortNode {
    pane: Option<PaneId>,
    children: Vec<SortNode>,
    bounds: Rect,
}

impl SortNode {
    fn manhattan(&self) -> f32 {
        self.bounds.left() + self.bounds.top()
    }
}

/// Lazily sorted pane order plus a traversal cursor.
#[derive(Debug, Clone)]
pub struct SpatialSorter {
    sorted: Vec<PaneId>,
    current_index: Option<usize>,
    is_dirty: bool,
}

impl Default for SpatialSorter {
    fn default() -> Self {
        Self {
            sorted: Vec::new(),
            current_index: None,
            is_dirty: true,
        }
    }
}

impl SpatialSorter {
    /// Creates a sorter that will sort on first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the order stale; the next query re-sorts and restarts traversal.
    pub fn invalidate(&mut self) {
        self.is_dirty = true;
    }

    /// Forgets the traversal cursor so the next step starts from the viewport again.
    pub fn reset_index(&mut self) {
        self.current_index = None;
    }

    /// Pane ids in reading order.
    pub fn sorted_panes(&mut self, panes: &PaneMap) -> &[PaneId] {
        if self.is_dirty {
            self.sort(panes);
        }
        &self.sorted
    }

    /// Steps the traversal cursor and returns the pane it lands on, wrapping at both ends.
    ///
    /// Without a cursor the starting point is the neighbour of the single selected pane if there
    /// is one, else the pane closest to the viewport's top-left corner among panes fully in the
    /// viewport, else the closest pane overall.
    ///
    /// # Arguments
    ///
    /// * `direction` - Step direction
    /// * `panes` - Current panes
    /// * `selection` - Current selection
    /// * `camera` - Current camera
    /// * `viewport_size` - Viewport size in pixels
    pub fn next_pane(
        &mut self,
        direction: TraversalDirection,
        panes: &PaneMap,
        selection: &Selection,
        camera: &CameraState,
        viewport_size: Vector,
    ) -> Option<PaneId> {
        if self.is_dirty {
            self.sort(panes);
            self.current_index = None;
        }
        if self.sorted.is_empty() {
            return None;
        }

        let index = match self.current_index {
            Some(index) => step(index, direction, self.sorted.len()),
            None => self.starting_index(direction, panes, selection, camera, viewport_size)?,
        };
        self.current_index = Some(index);
        self.sorted.get(index).copied()
    }

    /// The `n`th pane (1-based) in reading order among panes visible in the viewport.
    /// `n == 0` selects the tenth.
    pub fn nth_pane_in_viewport(
        &mut self,
        n: usize,
        panes: &PaneMap,
        camera: &CameraState,
        viewport_size: Vector,
    ) -> Option<PaneId> {
        let target = if n == 0 { TENTH_PANE_SLOT } else { n };
        self.visible_panes(panes, camera, viewport_size)
            .into_iter()
            .nth(target.checked_sub(1)?)
    }

    /// Position of a visible pane in reading order (1-based), with the tenth reported as 0.
    pub fn enumeration_in_viewport(
        &mut self,
        pane: PaneId,
        panes: &PaneMap,
        camera: &CameraState,
        viewport_size: Vector,
    ) -> Option<usize> {
        let position = self
            .visible_panes(panes, camera, viewport_size)
            .iter()
            .position(|id| *id == pane)?
            + 1;
        Some(if position == TENTH_PANE_SLOT { 0 } else { position })
    }

    fn visible_panes(
        &mut self,
        panes: &PaneMap,
        camera: &CameraState,
        viewport_size: Vector,
    ) -> Vec<PaneId> {
        let viewport = Rect::from_position_and_size(Vector::ZERO, viewport_size);
        self.sorted_panes(panes)
            .iter()
            .filter(|id| {
                panes
                    .get(id)
                    .is_some_and(|pane| viewport.intersects(&pane.viewport_rect(camera)))
            })
            .copied()
            .collect()
    }

    fn starting_index(
        &self,
        direction: TraversalDirection,
        panes: &PaneMap,
        selection: &Selection,
        camera: &CameraState,
        viewport_size: Vector,
    ) -> Option<usize> {
        if selection.len() == 1 {
            if let Some(index) = self.sorted.iter().position(|id| selection.contains(id)) {
                return Some(step(index, direction, self.sorted.len()));
            }
        }

        let viewport = Rect::from_position_and_size(Vector::ZERO, viewport_size);
        let closest = |only_visible: bool| {
            let mut best: Option<(usize, f32)> = None;
            for (index, id) in self.sorted.iter().enumerate() {
                let Some(pane) = panes.get(id) else {
                    continue;
                };
                let rect = pane.viewport_rect(camera);
                if only_visible && !viewport.contains_rect(&rect) {
                    continue;
                }
                let distance = rect.top_left().length_squared();
                let is_closer = match best {
                    Some((_, best_distance)) => distance < best_distance,
                    None => true,
                };
                if is_closer {
                    best = Some((index, distance));
                }
            }
            best.map(|(index, _)| index)
        };

        closest(true).or_else(|| closest(false))
    }

    fn sort(&mut self, panes: &PaneMap) {
        let mut leaves: Vec<SortNode> = panes
            .values()
            .map(|pane| SortNode {
                pane: Some(pane.id),
                children: Vec::new(),
                bounds: Rect::from_position_and_size(pane.position, pane.size),
            })
            .collect();
        leaves.sort_by(|a, b| a.pane.cmp(&b.pane));

        let mut stack = group_and_sort(leaves);
        let mut visited = HashSet::new();
        self.sorted.clear();
        while let Some(node) = stack.pop() {
            match node.pane {
                Some(id) => {
                    if visited.insert(id) {
                        self.sorted.push(id);
                    }
                }
                None => {
                    let mut children = node.children;
                    sort_group(&mut children);
                    stack.extend(children);
                }
            }
        }
        self.is_dirty = false;
    }
}

fn step(index: usize, direction: TraversalDirection, len: usize) -> usize {
    match direction {
        TraversalDirection::Forward => {
            if index + 1 >= len {
                0
            } else {
                index + 1
            }
        }
        TraversalDirection::Backward => {
            if index == 0 {
                len.saturating_sub(1)
            } else {
                index - 1
            }
        }
    }
}

fn group_and_sort(nodes: Vec<SortNode>) -> Vec<SortNode> {
    let rows = group_by(nodes, Axis::Row);
    let mut columns = group_by(rows, Axis::Column);
    sort_group(&mut columns);
    columns
}

/// Sorts descending by x + y so that popping from the end visits the nearest node first.
fn sort_group(group: &mut [SortNode]) {
    group.sort_by(|a, b| b.manhattan().total_cmp(&a.manhattan()));
}

fn group_by(mut nodes: Vec<SortNode>, axis: Axis) -> Vec<SortNode> {
    let start = |rect: &Rect| match axis {
        Axis::Row => rect.top(),
        Axis::Column => rect.left(),
    };
    let end = |rect: &Rect| match axis {
        Axis::Row => rect.bottom(),
        Axis::Column => rect.right(),
    };
    nodes.sort_by(|a, b| start(&a.bounds).total_cmp(&start(&b.bounds)));

    let mut grouped = Vec::new();
    let mut current: Option<SortNode> = None;
    for node in nodes {
        match current.as_mut() {
            Some(group) if start(&node.bounds) <= end(&group.bounds) => {
                group.bounds = group.bounds.union(&node.bounds);
                group.children.push(node);
            }
            _ => {
                if let Some(finished) = current.take() {
                    grouped.push(flatten_singleton(finished));
                }
                current = Some(SortNode {
                    pane: None,
                    bounds: node.bounds,
                    children: vec![node],
                });
            }
        }
    }
    if let Some(finished) = current {
        grouped.push(flatten_singleton(finished));
    }
    grouped
}

fn flatten_singleton(mut group: SortNode) -> SortNode {
    if group.children.len() == 1 {
        if let Some(only) = group.children.pop() {
            return only;
        }
    }
    group
}
