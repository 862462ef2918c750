use super::*;
use crate::camera::NavigationType;
use crate::graph::{RelationshipKind, TraversalDirection};
use crate::persistence::JsonFilePersistence;
use crate::pointer::test_support::{event, released};
use crate::pointer::Modifiers;
use crate::providers::{EditorHost, ManualClock, SymbolProvider};
use crate::types::{LineMetadata, PaneSymbol, SymbolDescriptor};
use futures::executor::block_on;
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

const VIEWPORT: Vector = Vector::new(1600.0, 1000.0);

/// Editor host that refuses to close some editors and records every request.
#[derive(Default)]
struct RecordingHost {
    refuse: HashSet<u64>,
    closed: Mutex<Vec<(u64, bool)>>,
    focused: Mutex<Vec<u64>>,
}

impl EditorHost for RecordingHost {
    fn close_editor(
        &self,
        identifier: EditorIdentifier,
        unconditional: bool,
    ) -> BoxFuture<'static, bool> {
        self.closed
            .lock()
            .unwrap()
            .push((identifier.editor, unconditional));
        let accepted = unconditional || !self.refuse.contains(&identifier.editor);
        futures::future::ready(accepted).boxed()
    }

    fn focus_editor(&self, identifier: EditorIdentifier) {
        self.focused.lock().unwrap().push(identifier.editor);
    }
}

/// Provider with fixed line metrics and no symbol relationships.
struct FixedProvider {
    metadata: Option<LineMetadata>,
}

impl SymbolProvider for FixedProvider {
    fn symbol_relationships(
        &self,
        _descriptors: Vec<SymbolDescriptor>,
        _token: CancellationToken,
    ) -> BoxFuture<'static, Vec<SymbolRelationship>> {
        futures::future::ready(Vec::new()).boxed()
    }

    fn line_metadata(
        &self,
        _uri: &str,
        _range: Option<TextRange>,
    ) -> BoxFuture<'static, Option<LineMetadata>> {
        futures::future::ready(self.metadata).boxed()
    }
}

fn store_with(context: WorkspaceContext) -> (WorkspaceStore, ManualClock) {
    let clock = ManualClock::new();
    let context = context.with_clock(Arc::new(clock.clone()));
    (WorkspaceStore::new(context, VIEWPORT), clock)
}

fn store() -> (WorkspaceStore, ManualClock) {
    store_with(WorkspaceContext::default())
}

fn settings_pane(id: u128, position: Vector) -> Pane {
    Pane::with_id(
        Uuid::from_u128(id),
        PaneKind::Settings,
        position,
        Vector::new(600.0, 300.0),
    )
}

fn code_pane(id: u128, uri: &str, editor: u64) -> Pane {
    Pane::with_id(
        Uuid::from_u128(id),
        PaneKind::Code {
            uri: uri.into(),
            file_path: uri.into(),
            symbol: None,
            edit_range: None,
            identifier: Some(EditorIdentifier {
                group_id: editor,
                editor,
            }),
        },
        Vector::new(id as f32 * 700.0, 0.0),
        Vector::new(600.0, 300.0),
    )
}

fn install(store: &mut WorkspaceStore, panes: Vec<Pane>) {
    let map: PaneMap = panes.into_iter().map(|pane| (pane.id, pane)).collect();
    store.set_panes(map);
    store.commit();
}

#[test]
fn test_dragging_header_moves_whole_selection() {
    let (mut store, _clock) = store();
    let a = settings_pane(1, Vector::ZERO);
    let b = settings_pane(2, Vector::new(700.0, 0.0));
    install(&mut store, vec![a.clone(), b.clone()]);
    store.select_pane(a.id, true);
    store.select_pane(b.id, false);

    store.pointer_down(&event(100.0, 10.0));
    store.pointer_move(&event(110.0, 15.0));
    store.pointer_up(&released(event(110.0, 15.0)));

    let moved_a = store.pane(a.id).unwrap();
    let moved_b = store.pane(b.id).unwrap();
    assert_eq!(moved_a.position, Vector::new(10.0, 5.0));
    assert_eq!(moved_b.position, Vector::new(710.0, 5.0));
    assert!(moved_a.has_resized && moved_b.has_resized);
    assert_eq!(store.selection().len(), 2);
    assert_eq!(store.focused(), Some(a.id));
}

#[test]
fn test_undo_then_redo_restores_inserted_pane() {
    let (mut store, _clock) = store();
    let id = store.insert_pane_at(
        PaneKind::Settings,
        Vector::new(40.0, 60.0),
        Vector::new(600.0, 400.0),
        true,
    );
    store.commit();

    assert!(block_on(store.undo()));
    assert!(store.pane(id).is_none());
    assert!(store.selection().is_empty());
    assert!(store.can_redo());

    assert!(block_on(store.redo()));
    let restored = store.pane(id).unwrap();
    assert_eq!(restored.position, Vector::new(40.0, 60.0));
    assert_eq!(restored.size, Vector::new(600.0, 400.0));
}

#[test]
fn test_undo_is_inverse_of_mutation_and_new_mutation_clears_redo() {
    let (mut store, clock) = store();
    let a = settings_pane(1, Vector::ZERO);
    install(&mut store, vec![a.clone()]);
    clock.advance(Duration::from_secs(1));
    let before = Arc::clone(store.panes());

    store.update_pane_bounds(a.id, Vector::new(30.0, 0.0), Vector::ZERO);
    store.commit();
    assert!(block_on(store.undo()));
    assert_eq!(**store.panes(), *before);

    clock.advance(Duration::from_secs(1));
    store.update_pane_bounds(a.id, Vector::new(0.0, 30.0), Vector::ZERO);
    assert!(!store.can_redo());
}

#[test]
fn test_rapid_changes_undo_as_one_step() {
    let (mut store, clock) = store();
    let a = settings_pane(1, Vector::ZERO);
    install(&mut store, vec![a.clone()]);
    clock.advance(Duration::from_secs(1));

    for _ in 0..5 {
        store.update_pane_bounds(a.id, Vector::new(2.0, 0.0), Vector::ZERO);
        clock.advance(Duration::from_millis(16));
    }
    assert_eq!(store.pane(a.id).unwrap().position, Vector::new(10.0, 0.0));

    assert!(block_on(store.undo()));
    assert_eq!(store.pane(a.id).unwrap().position, Vector::ZERO);
}

#[test]
fn test_undo_closes_editors_of_vanished_panes() {
    let host = Arc::new(RecordingHost::default());
    let (mut store, _clock) =
        store_with(WorkspaceContext::default().with_editor_host(host.clone()));
    install(&mut store, vec![code_pane(1, "file:///a.rs", 7)]);

    assert!(block_on(store.undo()));
    assert!(store.panes().is_empty());
    assert_eq!(*host.closed.lock().unwrap(), vec![(7, true)]);
}

#[test]
fn test_zoom_keeps_point_under_cursor_fixed() {
    let (mut store, _clock) = store();
    let pane = Pane::with_id(
        Uuid::from_u128(1),
        PaneKind::Settings,
        Vector::new(100.0, 100.0),
        Vector::new(200.0, 200.0),
    );
    install(&mut store, vec![pane.clone()]);
    let anchor = Vector::new(150.0, 150.0);

    let ctrl = Modifiers {
        ctrl: true,
        ..Modifiers::default()
    };
    store.wheel(Vector::new(0.0, -100.0), anchor, ctrl, false);

    assert!((store.camera().scale - 1.1).abs() < 1e-5);
    let rect = store.pane(pane.id).unwrap().viewport_rect(&store.camera());
    let fraction = (anchor - rect.top_left()) / rect.width();
    assert!(fraction.approx_eq(Vector::new(0.25, 0.25), 1e-4));
}

#[test]
fn test_zoom_is_clamped() {
    let (mut store, _clock) = store();
    let ctrl = Modifiers {
        meta: true,
        ..Modifiers::default()
    };
    store.wheel(Vector::new(0.0, 500.0), Vector::ZERO, ctrl, true);
    assert_eq!(store.camera().scale, store.config().min_scale);
}

#[test]
fn test_wheel_pans_and_shift_pans_horizontally() {
    let (mut store, _clock) = store();
    store.wheel(Vector::new(10.0, 20.0), Vector::ZERO, Modifiers::default(), false);
    assert_eq!(store.camera().position, Vector::new(-10.0, -20.0));

    let shift = Modifiers {
        shift: true,
        ..Modifiers::default()
    };
    store.wheel(Vector::new(0.0, 30.0), Vector::ZERO, shift, false);
    assert_eq!(store.camera().position, Vector::new(-40.0, -20.0));

    store.nudge_camera(Vector::new(1.0, 0.0), true);
    assert_eq!(store.camera().position, Vector::new(-65.0, -20.0));
}

#[test]
fn test_delete_selection_stops_at_cancelled_close() {
    let host = Arc::new(RecordingHost {
        refuse: HashSet::from([2]),
        ..RecordingHost::default()
    });
    let (mut store, _clock) =
        store_with(WorkspaceContext::default().with_editor_host(host.clone()));
    install(
        &mut store,
        vec![
            code_pane(1, "file:///a.rs", 1),
            code_pane(2, "file:///b.rs", 2),
            code_pane(3, "file:///c.rs", 3),
        ],
    );
    store.select_all();

    assert_eq!(block_on(store.delete_selection()), 1);
    assert!(store.pane(Uuid::from_u128(1)).is_none());
    assert!(store.pane(Uuid::from_u128(2)).is_some());
    assert!(store.pane(Uuid::from_u128(3)).is_some());
    assert_eq!(*host.closed.lock().unwrap(), vec![(1, false), (2, false)]);
    assert_eq!(store.selection().len(), 2);
}

#[test]
fn test_closing_ghost_is_unconditional() {
    let host = Arc::new(RecordingHost {
        refuse: HashSet::from([5]),
        ..RecordingHost::default()
    });
    let (mut store, _clock) =
        store_with(WorkspaceContext::default().with_editor_host(host.clone()));
    let id = store.insert_pane_at(
        PaneKind::Ghost {
            uri: "file:///a.rs".into(),
            file_path: "a.rs".into(),
            symbol: None,
            identifier: Some(EditorIdentifier {
                group_id: 1,
                editor: 5,
            }),
        },
        Vector::ZERO,
        Vector::new(600.0, 300.0),
        false,
    );

    assert!(block_on(store.close_pane(id)));
    assert!(store.panes().is_empty());
    assert_eq!(*host.closed.lock().unwrap(), vec![(5, true)]);
}

#[test]
fn test_resize_never_goes_below_minimum() {
    let (mut store, _clock) = store();
    let a = settings_pane(1, Vector::ZERO);
    install(&mut store, vec![a.clone()]);

    store.update_pane_bounds(a.id, Vector::ZERO, Vector::new(-1000.0, -1000.0));
    let config = store.config();
    assert_eq!(
        store.pane(a.id).unwrap().size,
        Vector::new(config.min_pane_width, config.min_pane_height)
    );
}

#[test]
fn test_left_edge_resize_keeps_minimum_selected_pane_in_place() {
    let (mut store, _clock) = store();
    let mut a = settings_pane(1, Vector::ZERO);
    a.size = Vector::new(1000.0, 300.0);
    let b = settings_pane(2, Vector::new(0.0, 400.0));
    install(&mut store, vec![a.clone(), b.clone()]);
    store.select_all();

    store.update_pane_bounds(a.id, Vector::new(100.0, 0.0), Vector::new(-100.0, 0.0));

    let a = store.pane(a.id).unwrap();
    assert_eq!(a.position.x, 100.0);
    assert_eq!(a.size.x, 900.0);
    // b is already at the minimum width: neither its left nor its right edge moves.
    let b = store.pane(b.id).unwrap();
    assert_eq!(b.position.x, 0.0);
    assert_eq!(b.size.x, 600.0);
    assert_eq!(b.position.x + b.size.x, 600.0);
}

#[test]
fn test_stale_relationship_result_is_ignored() {
    let (mut store, _clock) = store();
    let a = code_pane(1, "file:///a.rs", 1);
    let b = code_pane(2, "file:///b.rs", 2);
    install(&mut store, vec![a.clone()]);
    let first = store.take_pending_relationships().unwrap();
    install(&mut store, vec![a.clone(), b.clone()]);
    let second = store.take_pending_relationships().unwrap();

    let dependency = SymbolRelationship {
        from: a.id,
        to: b.id,
        kind: RelationshipKind::SymbolDependency,
        from_range: Some(TextRange::lines(3, 3)),
    };
    assert!(!store.resolve_relationships(first.request_number, vec![dependency.clone()]));
    assert!(store.graph().relationships().is_empty());

    assert!(store.resolve_relationships(second.request_number, vec![dependency]));
    assert!(store.graph().relationships().contains_key(&a.id));
    assert_eq!(store.arrows().len(), 1);
}

#[test]
fn test_superseded_insert_is_dropped() {
    let provider = Arc::new(FixedProvider {
        metadata: Some(LineMetadata {
            num_lines: 10,
            longest_line_column: 40,
        }),
    });
    let (mut store, _clock) =
        store_with(WorkspaceContext::default().with_symbol_provider(provider));

    let request = PaneRequest::File {
        uri: "file:///a.rs".into(),
        file_path: "a.rs".into(),
    };
    let older = store.begin_insert(request.clone(), InsertOptions::default());
    let newer = store.begin_insert(request, InsertOptions::default());
    assert!(older.token.is_cancelled());

    let newer = block_on(newer.resolve());
    let older = block_on(older.resolve());
    let id = store.complete_insert(newer).unwrap();
    assert!(store.complete_insert(older).is_none());
    assert_eq!(store.panes().len(), 1);

    let pane = store.pane(id).unwrap();
    assert_eq!(pane.position, Vector::new(25.0, 50.0));
    assert_eq!(pane.size, Vector::new(600.0, 295.0));
    assert_eq!(**store.selection(), Selection::from([id]));
    assert_eq!(store.focused(), Some(id));
    assert!(!store.is_animating());
}

#[test]
fn test_adjacent_insert_opens_to_the_right_and_dedupes() {
    let (mut store, _clock) = store();
    let origin = block_on(store.insert_file_pane(
        "file:///a.rs",
        "a.rs",
        InsertOptions::default(),
    ))
    .unwrap();
    assert_eq!(store.pane(origin).unwrap().position, Vector::new(25.0, 50.0));

    let symbol = PaneSymbol {
        name: "helper".into(),
        range: TextRange::lines(10, 20),
    };
    let adjacent = block_on(store.insert_adjacent_pane(
        origin,
        "file:///b.rs",
        "b.rs",
        Some(symbol.clone()),
        InsertOptions::default(),
    ))
    .unwrap();
    let pane = store.pane(adjacent).unwrap();
    let origin_pane = store.pane(origin).unwrap();
    assert_eq!(
        pane.position,
        Vector::new(25.0 + origin_pane.size.x + store.config().adjacent_gap, 50.0)
    );

    let again = block_on(store.insert_adjacent_pane(
        origin,
        "file:///b.rs",
        "b.rs",
        Some(symbol),
        InsertOptions::default(),
    ));
    assert_eq!(again, Some(adjacent));
    assert_eq!(store.panes().len(), 2);
}

#[test]
fn test_ghost_manifests_into_code_pane() {
    let (mut store, _clock) = store();
    let range = TextRange::lines(4, 9);
    let id = block_on(store.insert_ghost_pane(
        "file:///a.rs",
        "a.rs",
        Some(PaneSymbol {
            name: "run".into(),
            range,
        }),
    ))
    .unwrap();
    assert!(store.selection().is_empty());

    store.manifest_ghost(id);
    let pane = store.pane(id).unwrap();
    assert!(!pane.is_ghost);
    match &pane.kind {
        PaneKind::Code { edit_range, .. } => assert_eq!(*edit_range, Some(range)),
        other => panic!("expected a code pane, got {:?}", other),
    }
}

#[test]
fn test_focused_pane_grows_with_content() {
    let (mut store, _clock) = store();
    let id = store.insert_pane_at(
        PaneKind::Settings,
        Vector::new(25.0, 50.0),
        Vector::new(600.0, 200.0),
        true,
    );

    store.update_pane_size(id, Some(40), Some(100));
    assert_eq!(store.pane(id).unwrap().size, Vector::new(832.0, 835.0));

    store.update_pane_bounds(id, Vector::ZERO, Vector::new(10.0, 0.0));
    store.update_pane_size(id, Some(200), None);
    assert_eq!(store.pane(id).unwrap().size, Vector::new(842.0, 835.0));
}

#[test]
fn test_pin_fills_viewport_then_unpin_returns_to_canvas() {
    let (mut store, _clock) = store();
    let a = settings_pane(1, Vector::new(900.0, 400.0));
    install(&mut store, vec![a.clone()]);

    store.toggle_pin(a.id);
    let pinned = store.pane(a.id).unwrap();
    assert!(pinned.is_pinned);
    assert_eq!(pinned.pinned_position, Vector::new(25.0, 50.0));
    assert_eq!(pinned.pinned_size, Vector::new(1550.0, 900.0));

    store.toggle_pin(a.id);
    let unpinned = store.pane(a.id).unwrap();
    assert!(!unpinned.is_pinned);
    assert_eq!(unpinned.position, Vector::new(25.0, 50.0));
}

#[test]
fn test_navigation_animates_pane_to_center() {
    let (mut store, clock) = store();
    let far = settings_pane(1, Vector::new(3000.0, 0.0));
    install(&mut store, vec![far.clone()]);

    store.navigate_to_pane(far.id, NavigationType::Center);
    assert!(store.is_animating());
    assert_eq!(store.focused(), Some(far.id));

    clock.advance(Duration::from_millis(300));
    assert!(store.advance());
    assert!(!store.is_animating());
    let center = store
        .pane(far.id)
        .unwrap()
        .viewport_rect(&store.camera())
        .center();
    assert!(center.approx_eq(VIEWPORT / 2.0, 0.01));
}

#[test]
fn test_traversal_visits_panes_in_reading_order() {
    let (mut store, _clock) = store();
    let a = settings_pane(1, Vector::new(25.0, 50.0));
    let b = settings_pane(2, Vector::new(700.0, 50.0));
    install(&mut store, vec![a.clone(), b.clone()]);

    assert_eq!(store.nth_pane_in_viewport(2), Some(b.id));
    assert_eq!(store.enumeration_in_viewport(a.id), Some(1));

    store.clear_selection();
    let first = store.next_pane(TraversalDirection::Forward).unwrap();
    let second = store.next_pane(TraversalDirection::Forward).unwrap();
    assert_ne!(first, second);
    assert_eq!(**store.selection(), Selection::from([second]));
}

#[test]
fn test_drag_select_replaces_or_adds() {
    let (mut store, _clock) = store();
    let a = settings_pane(1, Vector::ZERO);
    let b = settings_pane(2, Vector::new(700.0, 0.0));
    install(&mut store, vec![a.clone(), b.clone()]);

    store.drag_select(Rect::from_corners(Vector::new(10.0, 10.0), Vector::new(20.0, 20.0)), false);
    assert_eq!(**store.selection(), Selection::from([a.id]));

    store.drag_select(Rect::from_corners(Vector::new(710.0, 10.0), Vector::new(720.0, 20.0)), true);
    assert_eq!(**store.selection(), Selection::from([a.id, b.id]));

    store.drag_select(Rect::from_corners(Vector::new(710.0, 10.0), Vector::new(720.0, 20.0)), false);
    assert_eq!(**store.selection(), Selection::from([b.id]));
}

#[test]
fn test_workspace_save_and_open_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let persistence = Arc::new(JsonFilePersistence::new(dir.path().join("workspaces.json")));
    let (mut store, _clock) =
        store_with(WorkspaceContext::default().with_persistence(persistence));

    install(&mut store, vec![code_pane(1, "file:///a.rs", 1)]);
    store.set_camera(Vector::new(-40.0, 10.0));
    let id = block_on(store.save_workspace("review")).unwrap();
    assert!(!store.is_workspace_dirty());

    install(
        &mut store,
        vec![code_pane(1, "file:///a.rs", 1), code_pane(2, "file:///b.rs", 9)],
    );
    store.set_camera(Vector::ZERO);
    assert!(store.is_workspace_dirty());

    assert!(block_on(store.open_workspace(id)).unwrap());
    assert_eq!(store.panes().len(), 1);
    assert!(store.pane(Uuid::from_u128(1)).is_some());
    assert_eq!(store.camera().position, Vector::new(-40.0, 10.0));
    assert!(!store.is_workspace_dirty());
    assert!(!store.can_undo());

    block_on(store.delete_workspace(id)).unwrap();
    assert!(store.current_workspace().is_none());
    assert!(store.saved_workspaces().is_empty());
}

#[test]
fn test_workspace_operations_need_persistence() {
    let (mut store, _clock) = store();
    assert!(matches!(
        block_on(store.save_workspace("nowhere")),
        Err(crate::error::WorkspaceError::NoPersistenceHost)
    ));
}
