//! Undo/redo over whole snapshots of the pane map.
//!
//! Pane maps are copy-on-write, so recording history is just keeping the previous `Arc`. Changes
//! that arrive in quick succession (a drag emits dozens) fold into one batch that remembers the
//! oldest map, so one undo rewinds the whole gesture.

use crate::config::WorkspaceConfig;
use crate::constants::{MAX_UNDO_HISTORY, UNDO_BATCH_WINDOW_MS};
use crate::types::PaneMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Batch {
    snapshot: Arc<PaneMap>,
    started: Instant,
}

/// Manages undo/redo history for the pane map.
#[derive(Debug, Clone)]
pub struct UndoRedoBuffer {
    /// Open batch, committed on the next push outside the window or explicitly
    current_batch: Option<Batch>,
    /// Snapshots that can be restored by undo
    undo_stack: Vec<Arc<PaneMap>>,
    /// Snapshots that can be restored by redo
    redo_stack: Vec<Arc<PaneMap>>,
    track_changes: bool,
    batch_window: Duration,
    max_history: usize,
}

impl Default for UndoRedoBuffer {
    fn default() -> Self {
        Self {
            current_batch: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            track_changes: true,
            batch_window: Duration::from_millis(UNDO_BATCH_WINDOW_MS),
            max_history: MAX_UNDO_HISTORY,
        }
    }
}

impl UndoRedoBuffer {
    /// Creates an empty history using the configured batch window and cap.
    pub fn new(config: &WorkspaceConfig) -> Self {
        Self {
            batch_window: Duration::from_millis(config.undo_batch_window_ms),
            max_history: config.max_undo_history.max(1),
            ..Self::default()
        }
    }

    /// Returns true when `next` differs from `previous` in nothing undo cares about: the same
    /// ids, and per pane the same position, size, kind and host identifier.
    pub fn is_noop(previous: &PaneMap, next: &PaneMap) -> bool {
        if previous.len() != next.len() {
            return false;
        }
        previous.iter().all(|(id, before)| match next.get(id) {
            None => false,
            Some(after) => {
                before.position == after.position
                    && before.size == after.size
                    && before.kind.same_variant(&after.kind)
                    && before.kind.identifier() == after.kind.identifier()
            }
        })
    }

    /// Records the map as it was before a change.
    ///
    /// This clears the redo stack since a new change invalidates anything previously undone.
    /// Within the batch window the first recorded map wins.
    ///
    /// # Arguments
    ///
    /// * `previous` - The pane map before the change
    /// * `now` - Time of the change
    pub fn push(&mut self, previous: Arc<PaneMap>, now: Instant) {
        if !self.track_changes {
            return;
        }

        if let Some(batch) = &self.current_batch {
            if now.saturating_duration_since(batch.started) > self.batch_window {
                self.commit();
            }
        }

        if self.current_batch.is_none() {
            self.current_batch = Some(Batch {
                snapshot: previous,
                started: now,
            });
            self.redo_stack.clear();
        }
    }

    /// Closes the open batch, making it the newest undo entry.
    pub fn commit(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            self.undo_stack.push(batch.snapshot);

            // Limit undo history size
            if self.undo_stack.len() > self.max_history {
                self.undo_stack.remove(0);
            }
        }
    }

    /// Pops the newest undo entry, saving `current` for redo.
    ///
    /// # Returns
    ///
    /// The map to restore, or None if there is nothing to undo
    pub fn undo(&mut self, current: Arc<PaneMap>) -> Option<Arc<PaneMap>> {
        self.commit();
        let snapshot = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(snapshot)
    }

    /// Pops the newest redo entry, saving `current` for undo.
    ///
    /// # Returns
    ///
    /// The map to restore, or None if there is nothing to redo
    pub fn redo(&mut self, current: Arc<PaneMap>) -> Option<Arc<PaneMap>> {
        self.commit();
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(snapshot)
    }

    /// Returns true if there are entries that can be undone.
    pub fn can_undo(&self) -> bool {
        self.current_batch.is_some() || !self.undo_stack.is_empty()
    }

    /// Returns true if there are entries that can be redone.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of committed undo entries.
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Enables or disables recording.
    pub fn set_track_changes(&mut self, track_changes: bool) {
        self.track_changes = track_changes;
    }

    /// Clears all undo and redo history.
    pub fn clear(&mut self) {
        self.current_batch = None;
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector;
    use crate::types::{Pane, PaneKind};

    fn snapshot(panes: &[&Pane]) -> Arc<PaneMap> {
        Arc::new(panes.iter().map(|pane| (pane.id, (*pane).clone())).collect())
    }

    fn pane() -> Pane {
        Pane::new(PaneKind::Settings, Vector::ZERO, Vector::new(100.0, 100.0))
    }

    #[test]
    fn test_is_noop_ignores_untracked_fields() {
        let a = pane();
        let mut selected_elsewhere = a.clone();
        selected_elsewhere.is_dirty = true;
        selected_elsewhere.z_index = 7;
        assert!(UndoRedoBuffer::is_noop(&snapshot(&[&a]), &snapshot(&[&selected_elsewhere])));

        let mut moved = a.clone();
        moved.position = Vector::new(1.0, 0.0);
        assert!(!UndoRedoBuffer::is_noop(&snapshot(&[&a]), &snapshot(&[&moved])));
        assert!(!UndoRedoBuffer::is_noop(&snapshot(&[&a]), &snapshot(&[])));
    }

    #[test]
    fn test_changes_within_window_fold_into_one_entry() {
        let mut buffer = UndoRedoBuffer::new(&WorkspaceConfig::default());
        let start = Instant::now();
        let first = snapshot(&[]);
        let second = snapshot(&[&pane()]);

        buffer.push(first.clone(), start);
        buffer.push(second.clone(), start + Duration::from_millis(100));
        buffer.commit();
        assert_eq!(buffer.undo_len(), 1);

        let restored = buffer.undo(snapshot(&[])).unwrap();
        assert!(Arc::ptr_eq(&restored, &first));
    }

    #[test]
    fn test_changes_outside_window_are_separate_entries() {
        let mut buffer = UndoRedoBuffer::new(&WorkspaceConfig::default());
        let start = Instant::now();
        buffer.push(snapshot(&[]), start);
        buffer.push(snapshot(&[]), start + Duration::from_millis(300));
        buffer.commit();
        assert_eq!(buffer.undo_len(), 2);
    }

    #[test]
    fn test_new_change_clears_redo() {
        let mut buffer = UndoRedoBuffer::new(&WorkspaceConfig::default());
        let start = Instant::now();
        buffer.push(snapshot(&[]), start);
        assert!(buffer.undo(snapshot(&[&pane()])).is_some());
        assert!(buffer.can_redo());

        buffer.push(snapshot(&[]), start + Duration::from_secs(1));
        assert!(!buffer.can_redo());
    }

    #[test]
    fn test_history_is_capped() {
        let config = WorkspaceConfig {
            max_undo_history: 3,
            ..WorkspaceConfig::default()
        };
        let mut buffer = UndoRedoBuffer::new(&config);
        let start = Instant::now();
        for step in 0..5 {
            buffer.push(snapshot(&[]), start + Duration::from_secs(step));
            buffer.commit();
        }
        assert_eq!(buffer.undo_len(), 3);
    }

    #[test]
    fn test_tracking_can_be_paused() {
        let mut buffer = UndoRedoBuffer::default();
        buffer.set_track_changes(false);
        buffer.push(snapshot(&[]), Instant::now());
        assert!(!buffer.can_undo());
    }
}
