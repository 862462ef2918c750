//! Dependency graph between panes and the arrows drawn for it.
//!
//! The engine keeps an adjacency map of relationships keyed by the source pane. Whenever the
//! pane map changes it decides whether the change can affect relationships (a pane was added or
//! removed, or its kind, host identifier, pin state or symbol range changed) or only their
//! on-screen geometry. Relationship changes trigger a fresh query to the symbol provider; every
//! query carries a request number and a [`CancellationToken`], and a result is only applied if
//! no newer query was issued in the meantime.
//!
//! # Module Organization
//!
//! - `arrows` - Clipping and stroke geometry
//! - `palette` - Highlight color buffers
//! - `sorter` - Reading-order traversal

mod arrows;
mod palette;
mod sorter;

pub use arrows::{clip_between, dashed_segments, ArrowStroke, DependencyArrow, StrokeCircle};
pub use palette::{neutral_color, ColorPalette, DARK_PALETTE, LIGHT_PALETTE};
pub use sorter::{SpatialSorter, TraversalDirection};

use crate::camera::CameraState;
use crate::constants::UNASSIGNED_ARROW_COLOR;
use crate::geometry::Vector;
use crate::providers::{CancellationToken, SymbolProvider};
use crate::types::{Pane, PaneId, PaneMap, SymbolDescriptor, TextRange, Theme};
use futures::future::{BoxFuture, FutureExt};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Kind of relationship between two panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipKind {
    /// Both panes show the same document
    SameFile,
    /// Code in the source pane references the symbol in the target pane
    SymbolDependency,
}

/// One relationship as reported by a symbol provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolRelationship {
    /// Source pane
    pub from: PaneId,
    /// Target pane
    pub to: PaneId,
    /// Relationship kind
    pub kind: RelationshipKind,
    /// Where in the source the reference occurs
    pub from_range: Option<TextRange>,
}

/// An edge of the relationship graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    /// Target pane
    pub to: PaneId,
    /// Relationship kind
    pub kind: RelationshipKind,
    /// Every reference site in the source pane
    pub from_ranges: Vec<TextRange>,
    /// Added directly rather than by a query; keeps its color across regenerations
    pub unconditional: bool,
}

/// A memoized highlight color for one ordered pane pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorAssignment {
    /// Color as 0xRRGGBB
    pub color: u32,
    /// Reference sites in the source pane highlighted with this color
    pub from_ranges: Vec<TextRange>,
}

/// An in-flight relationship query.
///
/// Await `future` and hand the result back together with `request_number`; the engine ignores
/// it if another query has been issued since.
pub struct PendingRelationships {
    /// Number of the query when it was issued
    pub request_number: u64,
    /// Resolves to the relationships found
    pub future: BoxFuture<'static, Vec<SymbolRelationship>>,
}

impl std::fmt::Debug for PendingRelationships {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRelationships")
            .field("request_number", &self.request_number)
            .finish_non_exhaustive()
    }
}

/// What a pane-map change did to the graph.
#[derive(Debug)]
pub enum GraphUpdate {
    /// Nothing relevant changed
    Unchanged,
    /// Some panes are not mounted yet; nothing was done
    Waiting,
    /// Arrow geometry was recomputed
    ArrowsChanged,
    /// Relationships may have changed and a query was issued
    Query(PendingRelationships),
}

/// Render inputs for arrow generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowView {
    /// Current camera
    pub camera: CameraState,
    /// Current theme
    pub theme: Theme,
}

/// The relationship graph, its arrows, and its highlight colors.
#[derive(Debug)]
pub struct DependencyGraphEngine {
    relationships: HashMap<PaneId, Vec<Relationship>>,
    cached_panes: Arc<PaneMap>,
    colors: HashMap<PaneId, HashMap<PaneId, ColorAssignment>>,
    palette: ColorPalette,
    arrows: Vec<DependencyArrow>,
    request_number: u64,
    cancellation: Option<CancellationToken>,
    sorter: SpatialSorter,
}

impl Default for DependencyGraphEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyGraphEngine {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            relationships: HashMap::new(),
            cached_panes: Arc::new(PaneMap::new()),
            colors: HashMap::new(),
            palette: ColorPalette::new(),
            arrows: Vec::new(),
            request_number: 0,
            cancellation: None,
            sorter: SpatialSorter::new(),
        }
    }

    /// The adjacency map, keyed by source pane.
    pub fn relationships(&self) -> &HashMap<PaneId, Vec<Relationship>> {
        &self.relationships
    }

    /// Arrows from the last generation pass.
    pub fn arrows(&self) -> &[DependencyArrow] {
        &self.arrows
    }

    /// Number of the most recently issued query.
    pub fn request_number(&self) -> u64 {
        self.request_number
    }

    /// Every memoized highlight color, keyed by source then target pane.
    pub fn color_assignments(&self) -> &HashMap<PaneId, HashMap<PaneId, ColorAssignment>> {
        &self.colors
    }

    /// Highlight color of the `from → to` pair, or the unassigned color.
    pub fn color(&self, from: PaneId, to: PaneId) -> u32 {
        self.colors
            .get(&from)
            .and_then(|targets| targets.get(&to))
            .map_or(UNASSIGNED_ARROW_COLOR, |assignment| assignment.color)
    }

    /// The traversal sorter.
    pub fn sorter_mut(&mut self) -> &mut SpatialSorter {
        &mut self.sorter
    }

    /// Reacts to a new pane map.
    ///
    /// # Arguments
    ///
    /// * `panes` - The new pane map
    /// * `previous` - The pane map before the change
    /// * `view` - Camera and theme for arrow generation
    /// * `provider` - Symbol provider to query, if any
    ///
    /// # Returns
    ///
    /// What happened; a [`GraphUpdate::Query`] must be awaited and passed to
    /// [`DependencyGraphEngine::apply_relationships`].
    pub fn on_panes_changed(
        &mut self,
        panes: &Arc<PaneMap>,
        previous: &PaneMap,
        view: ArrowView,
        provider: Option<&Arc<dyn SymbolProvider>>,
    ) -> GraphUpdate {
        self.sorter.invalidate();
        if panes.values().any(|pane| pane.kind.awaits_identifier()) {
            return GraphUpdate::Waiting;
        }

        if self.should_regenerate(panes) {
            self.cached_panes = Arc::clone(panes);
            self.refresh_arrows(panes, view);
            self.clear_highlight_colors(panes, previous);
            return GraphUpdate::Query(self.issue_query(provider));
        }

        self.cached_panes = Arc::clone(panes);
        if Self::should_rerender(panes, previous) {
            self.refresh_arrows(panes, view);
            GraphUpdate::ArrowsChanged
        } else {
            GraphUpdate::Unchanged
        }
    }

    /// Returns true if the change since the last cached map can affect relationships.
    pub fn should_regenerate(&self, panes: &PaneMap) -> bool {
        if self.cached_panes.len() != panes.len() {
            return true;
        }
        panes.iter().any(|(id, current)| match self.cached_panes.get(id) {
            None => true,
            Some(cached) => {
                !cached.kind.same_variant(&current.kind)
                    || cached.kind.identifier() != current.kind.identifier()
                    || cached.is_pinned != current.is_pinned
                    || cached.kind.symbol_range() != current.kind.symbol_range()
            }
        })
    }

    /// Returns true if the change can move, resize or hide any arrow.
    pub fn should_rerender(panes: &PaneMap, previous: &PaneMap) -> bool {
        if panes.len() != previous.len() {
            return true;
        }
        panes.iter().any(|(id, current)| match previous.get(id) {
            None => true,
            Some(previous) => {
                !previous.kind.same_variant(&current.kind)
                    || previous.position != current.position
                    || previous.size != current.size
                    || previous.is_pinned != current.is_pinned
                    || previous.kind.symbol_range() != current.kind.symbol_range()
            }
        })
    }

    /// Symbol descriptors for every mounted code pane over a queryable document.
    pub fn descriptors(panes: &PaneMap) -> Vec<SymbolDescriptor> {
        let mut descriptors: Vec<SymbolDescriptor> = panes
            .values()
            .filter(|pane| pane.kind.is_code())
            .filter_map(|pane| {
                let identifier = pane.kind.identifier()?;
                let uri = pane.kind.uri()?;
                is_queryable_uri(uri).then(|| SymbolDescriptor {
                    pane_id: pane.id,
                    uri: uri.to_string(),
                    range: pane.kind.relationship_range(),
                    identifier,
                })
            })
            .collect();
        descriptors.sort_by(|a, b| a.pane_id.cmp(&b.pane_id));
        descriptors
    }

    /// Same-file relationships derived from the descriptors alone: a pane showing a whole file
    /// relates to every other pane over the same document.
    pub fn same_file_relationships(descriptors: &[SymbolDescriptor]) -> Vec<SymbolRelationship> {
        let mut relationships = Vec::new();
        for whole_file in descriptors.iter().filter(|d| d.range.is_none()) {
            for other in descriptors {
                if other.pane_id != whole_file.pane_id && other.uri == whole_file.uri {
                    relationships.push(SymbolRelationship {
                        from: whole_file.pane_id,
                        to: other.pane_id,
                        kind: RelationshipKind::SameFile,
                        from_range: None,
                    });
                }
            }
        }
        relationships
    }

    /// Cancels the previous query and issues a new one against the cached panes.
    fn issue_query(&mut self, provider: Option<&Arc<dyn SymbolProvider>>) -> PendingRelationships {
        if let Some(token) = self.cancellation.take() {
            token.cancel();
        }
        self.request_number += 1;
        let token = CancellationToken::new();
        self.cancellation = Some(token.clone());

        let descriptors = Self::descriptors(&self.cached_panes);
        let same_file = Self::same_file_relationships(&descriptors);
        debug!(
            "issuing relationship query {} for {} panes",
            self.request_number,
            descriptors.len()
        );

        let future = match provider {
            Some(provider) => {
                let query = provider.symbol_relationships(descriptors, token);
                async move {
                    let mut relationships = query.await;
                    relationships.extend(same_file);
                    relationships
                }
                .boxed()
            }
            None => futures::future::ready(same_file).boxed(),
        };

        PendingRelationships {
            request_number: self.request_number,
            future,
        }
    }

    /// Applies a resolved query if it is still current.
    ///
    /// # Arguments
    ///
    /// * `request_number` - Number the query was issued with
    /// * `relationships` - Query result
    /// * `panes` - Current pane map
    /// * `view` - Camera and theme for arrow generation
    ///
    /// # Returns
    ///
    /// True if the result was applied, false if it was stale and dropped.
    pub fn apply_relationships(
        &mut self,
        request_number: u64,
        relationships: Vec<SymbolRelationship>,
        panes: &PaneMap,
        view: ArrowView,
    ) -> bool {
        if request_number != self.request_number {
            debug!(
                "dropping stale relationship result {} (current is {})",
                request_number, self.request_number
            );
            return false;
        }
        self.build_graph(relationships);
        self.assign_highlight_colors(panes, view.theme);
        self.refresh_arrows(panes, view);
        true
    }

    /// Replaces the adjacency map. Symbol dependencies between the same ordered pair merge their
    /// reference sites; a same-file relationship replaces whatever was there.
    pub fn build_graph(&mut self, relationships: Vec<SymbolRelationship>) {
        let mut grouped: HashMap<PaneId, Vec<Relationship>> = HashMap::new();
        for relationship in relationships {
            let edges = grouped.entry(relationship.from).or_default();
            let existing = edges.iter_mut().find(|edge| edge.to == relationship.to);
            match (relationship.kind, existing) {
                (RelationshipKind::SymbolDependency, Some(existing)) => {
                    if existing.kind == RelationshipKind::SymbolDependency {
                        existing.from_ranges.extend(relationship.from_range);
                    }
                }
                (RelationshipKind::SymbolDependency, None) => edges.push(Relationship {
                    to: relationship.to,
                    kind: RelationshipKind::SymbolDependency,
                    from_ranges: relationship.from_range.into_iter().collect(),
                    unconditional: false,
                }),
                (RelationshipKind::SameFile, existing) => {
                    let edge = Relationship {
                        to: relationship.to,
                        kind: RelationshipKind::SameFile,
                        from_ranges: Vec::new(),
                        unconditional: false,
                    };
                    match existing {
                        Some(existing) => *existing = edge,
                        None => edges.push(edge),
                    }
                }
            }
        }
        self.relationships = grouped;
    }

    /// Adds a symbol dependency immediately, without waiting for a query. Its color survives
    /// later regenerations.
    pub fn add_unconditional_relationship(
        &mut self,
        from: PaneId,
        to: PaneId,
        from_ranges: Vec<TextRange>,
        panes: &PaneMap,
        view: ArrowView,
    ) {
        self.relationships.entry(from).or_default().push(Relationship {
            to,
            kind: RelationshipKind::SymbolDependency,
            from_ranges,
            unconditional: true,
        });
        self.assign_highlight_colors(panes, view.theme);
        self.refresh_arrows(panes, view);
    }

    /// Gives every colorless symbol dependency out of a code pane the next palette color, and
    /// mirrors it onto the inverse dependency if there is one.
    pub fn assign_highlight_colors(&mut self, panes: &PaneMap, theme: Theme) {
        let mut sources: Vec<&PaneId> = self.relationships.keys().collect();
        sources.sort();

        for from in sources {
            let Some(from_pane) = panes.get(from) else {
                continue;
            };
            if from_pane.is_pinned || !from_pane.kind.is_code() {
                continue;
            }
            let Some(edges) = self.relationships.get(from) else {
                continue;
            };
            for edge in edges {
                if edge.kind == RelationshipKind::SameFile {
                    continue;
                }
                if !panes.get(&edge.to).is_some_and(|to| !to.is_pinned) {
                    continue;
                }
                if self
                    .colors
                    .get(from)
                    .is_some_and(|targets| targets.contains_key(&edge.to))
                {
                    continue;
                }

                let color = self.palette.next_color(theme);
                self.colors.entry(*from).or_default().insert(
                    edge.to,
                    ColorAssignment {
                        color,
                        from_ranges: edge.from_ranges.clone(),
                    },
                );

                let inverse = self.relationships.get(&edge.to).into_iter().flatten().filter(
                    |inverse| inverse.to == *from && inverse.kind == RelationshipKind::SymbolDependency,
                );
                for inverse in inverse {
                    self.colors.entry(edge.to).or_default().insert(
                        *from,
                        ColorAssignment {
                            color,
                            from_ranges: inverse.from_ranges.clone(),
                        },
                    );
                }
            }
        }
    }

    /// Drops colors of pairs that changed. A color survives while both panes exist and are
    /// unchanged in kind, identifier, pin state and symbol range; unconditional pairs always keep
    /// theirs.
    pub fn clear_highlight_colors(&mut self, panes: &PaneMap, previous: &PaneMap) {
        let relationships = &self.relationships;
        self.colors.retain(|from, targets| {
            let edges = relationships.get(from);
            targets.retain(|to, _| {
                let unconditional = edges.into_iter().flatten().any(|edge| {
                    edge.kind == RelationshipKind::SymbolDependency
                        && edge.to == *to
                        && edge.unconditional
                });
                if unconditional {
                    return true;
                }
                edges.is_some()
                    && unchanged(previous.get(from), panes.get(from))
                    && unchanged(previous.get(to), panes.get(to))
            });
            !targets.is_empty()
        });
    }

    /// Recomputes arrow geometry for the current relationships.
    pub fn refresh_arrows(&mut self, panes: &PaneMap, view: ArrowView) {
        let neutral = neutral_color(view.theme);
        let mut arrows = Vec::new();
        let mut symmetrical_sources: HashSet<PaneId> = HashSet::new();

        let mut sources: Vec<&PaneId> = self.relationships.keys().collect();
        sources.sort();

        for from_id in sources {
            let Some(from) = panes.get(from_id) else {
                continue;
            };
            if from.is_pinned || from.kind.identifier().is_none() {
                continue;
            }
            let Some(edges) = self.relationships.get(from_id) else {
                continue;
            };
            for edge in edges {
                if symmetrical_sources.contains(&edge.to) {
                    continue;
                }
                let Some(to) = panes.get(&edge.to) else {
                    continue;
                };
                if to.is_pinned {
                    continue;
                }

                let symmetrical = edge.kind == RelationshipKind::SymbolDependency
                    && self.relationships.get(&edge.to).is_some_and(|inverse| {
                        inverse.iter().any(|inverse| {
                            inverse.to == *from_id
                                && inverse.kind == RelationshipKind::SymbolDependency
                        })
                    });
                if symmetrical {
                    symmetrical_sources.insert(*from_id);
                }

                let (from_center, from_half) = center_and_half_size(from, &view.camera);
                let (to_center, to_half) = center_and_half_size(to, &view.camera);
                let Some((start, end)) = clip_between(from_center, from_half, to_center, to_half)
                else {
                    continue;
                };

                let color = match edge.kind {
                    RelationshipKind::SameFile => neutral,
                    RelationshipKind::SymbolDependency => self.color(*from_id, edge.to),
                };
                arrows.push(DependencyArrow {
                    from: start,
                    to: end,
                    color,
                    symmetrical,
                    kind: edge.kind,
                });
            }
        }
        self.arrows = arrows;
    }
}

fn center_and_half_size(pane: &Pane, camera: &CameraState) -> (Vector, Vector) {
    let half = pane.size / 2.0 * camera.scale;
    (pane.viewport_position(camera).round() + half, half)
}

fn unchanged(previous: Option<&Pane>, current: Option<&Pane>) -> bool {
    match (previous, current) {
        (Some(previous), Some(current)) => {
            previous.kind.same_variant(&current.kind)
                && previous.kind.identifier() == current.kind.identifier()
                && previous.is_pinned == current.is_pinned
                && previous.kind.symbol_range() == current.kind.symbol_range()
        }
        _ => false,
    }
}

/// Documents the symbol provider cannot resolve.
fn is_queryable_uri(uri: &str) -> bool {
    !(uri.starts_with("walkThrough:")
        || uri.starts_with("webview-panel:")
        || uri.ends_with("/untitled"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EditorIdentifier, LineMetadata, PaneKind, PaneSymbol};
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use std::sync::Mutex;

    const VIEW: ArrowView = ArrowView {
        camera: CameraState {
            position: Vector::ZERO,
            scale: 1.0,
        },
        theme: Theme::Dark,
    };

    fn code_pane(uri: &str, symbol: Option<TextRange>, editor: u64, position: Vector) -> Pane {
        Pane::new(
            PaneKind::Code {
                uri: uri.into(),
                file_path: uri.into(),
                symbol: symbol.map(|range| PaneSymbol {
                    name: "symbol".into(),
                    range,
                }),
                edit_range: None,
                identifier: Some(EditorIdentifier {
                    group_id: 1,
                    editor,
                }),
            },
            position,
            Vector::new(100.0, 100.0),
        )
    }

    fn map(panes: &[&Pane]) -> Arc<PaneMap> {
        Arc::new(panes.iter().map(|pane| (pane.id, (*pane).clone())).collect())
    }

    fn dependency(from: PaneId, to: PaneId, line: u32) -> SymbolRelationship {
        SymbolRelationship {
            from,
            to,
            kind: RelationshipKind::SymbolDependency,
            from_range: Some(TextRange::lines(line, line)),
        }
    }

    /// Provider whose answers are released by hand, in any order.
    #[derive(Default)]
    struct ManualProvider {
        senders: Mutex<Vec<oneshot::Sender<Vec<SymbolRelationship>>>>,
        tokens: Mutex<Vec<CancellationToken>>,
    }

    impl SymbolProvider for ManualProvider {
        fn symbol_relationships(
            &self,
            _descriptors: Vec<SymbolDescriptor>,
            token: CancellationToken,
        ) -> BoxFuture<'static, Vec<SymbolRelationship>> {
            let (sender, receiver) = oneshot::channel();
            self.senders.lock().unwrap().push(sender);
            self.tokens.lock().unwrap().push(token);
            async move { receiver.await.unwrap_or_default() }.boxed()
        }

        fn line_metadata(
            &self,
            _uri: &str,
            _range: Option<TextRange>,
        ) -> BoxFuture<'static, Option<LineMetadata>> {
            futures::future::ready(None).boxed()
        }
    }

    fn query(update: GraphUpdate) -> PendingRelationships {
        match update {
            GraphUpdate::Query(pending) => pending,
            other => panic!("expected a query, got {:?}", other),
        }
    }

    #[test]
    fn test_stale_result_is_dropped() {
        let mut engine = DependencyGraphEngine::new();
        let provider = Arc::new(ManualProvider::default());
        let dyn_provider: Arc<dyn SymbolProvider> = provider.clone();

        let a = code_pane("file:///a.rs", Some(TextRange::lines(1, 5)), 1, Vector::ZERO);
        let b = code_pane("file:///b.rs", Some(TextRange::lines(1, 5)), 2, Vector::new(300.0, 0.0));
        let first_map = map(&[&a]);
        let first = query(engine.on_panes_changed(&first_map, &PaneMap::new(), VIEW, Some(&dyn_provider)));

        let second_map = map(&[&a, &b]);
        let second = query(engine.on_panes_changed(&second_map, &first_map, VIEW, Some(&dyn_provider)));
        assert_eq!(second.request_number, first.request_number + 1);
        assert!(provider.tokens.lock().unwrap()[0].is_cancelled());

        // The older query resolves last-but-not-least: its answer must not land.
        let senders: Vec<_> = provider.senders.lock().unwrap().drain(..).collect();
        let mut senders = senders.into_iter();
        let first_sender = senders.next().unwrap();
        let second_sender = senders.next().unwrap();
        first_sender.send(vec![dependency(a.id, b.id, 3)]).unwrap();
        let stale = block_on(first.future);
        assert!(!engine.apply_relationships(first.request_number, stale, &second_map, VIEW));
        assert!(engine.relationships().is_empty());

        second_sender.send(vec![dependency(b.id, a.id, 4)]).unwrap();
        let fresh = block_on(second.future);
        assert!(engine.apply_relationships(second.request_number, fresh, &second_map, VIEW));
        assert_eq!(engine.relationships()[&b.id][0].to, a.id);
    }

    #[test]
    fn test_same_file_panes_get_dashed_relationship_without_provider() {
        let mut engine = DependencyGraphEngine::new();
        let a = code_pane("file:///shared.rs", None, 1, Vector::ZERO);
        let b = code_pane("file:///shared.rs", None, 2, Vector::new(400.0, 0.0));
        let panes = map(&[&a, &b]);

        let pending = query(engine.on_panes_changed(&panes, &PaneMap::new(), VIEW, None));
        let relationships = block_on(pending.future);
        assert!(engine.apply_relationships(pending.request_number, relationships, &panes, VIEW));

        assert_eq!(engine.relationships()[&a.id][0].kind, RelationshipKind::SameFile);
        let arrows = engine.arrows();
        assert_eq!(arrows.len(), 1);
        assert_eq!(arrows[0].kind, RelationshipKind::SameFile);
        assert_eq!(arrows[0].color, 0xffffff);

        let stroke = ArrowStroke::from_arrow(&arrows[0], &crate::WorkspaceConfig::default());
        assert!(stroke.segments.len() > 1);
        assert!(stroke.circle.is_none());
        assert!(stroke.segments.iter().all(|(start, end)| start.y == 50.0 && end.y == 50.0));
    }

    #[test]
    fn test_panes_awaiting_identifiers_defer_queries() {
        let mut engine = DependencyGraphEngine::new();
        let mut unmounted = code_pane("file:///a.rs", None, 1, Vector::ZERO);
        if let PaneKind::Code { identifier, .. } = &mut unmounted.kind {
            *identifier = None;
        }
        let panes = map(&[&unmounted]);
        assert!(matches!(
            engine.on_panes_changed(&panes, &PaneMap::new(), VIEW, None),
            GraphUpdate::Waiting
        ));
        assert_eq!(engine.request_number(), 0);
    }

    #[test]
    fn test_moving_a_pane_only_rerenders() {
        let mut engine = DependencyGraphEngine::new();
        let a = code_pane("file:///a.rs", None, 1, Vector::ZERO);
        let panes = map(&[&a]);
        query(engine.on_panes_changed(&panes, &PaneMap::new(), VIEW, None));

        let mut moved = a.clone();
        moved.position = Vector::new(50.0, 0.0);
        let moved_map = map(&[&moved]);
        assert!(matches!(
            engine.on_panes_changed(&moved_map, &panes, VIEW, None),
            GraphUpdate::ArrowsChanged
        ));
        assert!(matches!(
            engine.on_panes_changed(&moved_map, &moved_map, VIEW, None),
            GraphUpdate::Unchanged
        ));
    }

    #[test]
    fn test_symbol_dependencies_merge_ranges_and_share_colors() {
        let mut engine = DependencyGraphEngine::new();
        let a = code_pane("file:///a.rs", Some(TextRange::lines(1, 9)), 1, Vector::ZERO);
        let b = code_pane("file:///b.rs", Some(TextRange::lines(1, 9)), 2, Vector::new(400.0, 0.0));
        let panes = map(&[&a, &b]);
        let pending = query(engine.on_panes_changed(&panes, &PaneMap::new(), VIEW, None));
        block_on(pending.future);

        assert!(engine.apply_relationships(
            pending.request_number,
            vec![dependency(a.id, b.id, 2), dependency(a.id, b.id, 5), dependency(b.id, a.id, 7)],
            &panes,
            VIEW,
        ));
        assert_eq!(engine.relationships()[&a.id][0].from_ranges.len(), 2);

        let color = engine.color(a.id, b.id);
        assert_ne!(color, UNASSIGNED_ARROW_COLOR);
        assert_eq!(engine.color(b.id, a.id), color);

        // One double-headed arrow for the pair.
        assert_eq!(engine.arrows().len(), 1);
        assert!(engine.arrows()[0].symmetrical);
        assert_eq!(engine.arrows()[0].color, color);
    }

    #[test]
    fn test_mixed_kind_pair_draws_two_single_arrows() {
        let mut engine = DependencyGraphEngine::new();
        let a = code_pane("file:///a.rs", Some(TextRange::lines(1, 9)), 1, Vector::ZERO);
        let b = code_pane("file:///b.rs", Some(TextRange::lines(1, 9)), 2, Vector::new(400.0, 0.0));
        let panes = map(&[&a, &b]);
        let pending = query(engine.on_panes_changed(&panes, &PaneMap::new(), VIEW, None));
        block_on(pending.future);

        let same_file = SymbolRelationship {
            from: a.id,
            to: b.id,
            kind: RelationshipKind::SameFile,
            from_range: None,
        };
        assert!(engine.apply_relationships(
            pending.request_number,
            vec![same_file, dependency(b.id, a.id, 4)],
            &panes,
            VIEW,
        ));

        let arrows = engine.arrows();
        assert_eq!(arrows.len(), 2);
        assert!(arrows.iter().all(|arrow| !arrow.symmetrical));
        // a sits left of b, so direction shows in the x coordinates.
        assert!(arrows.iter().any(|arrow| {
            arrow.kind == RelationshipKind::SymbolDependency && arrow.from.x > arrow.to.x
        }));
        assert!(arrows.iter().any(|arrow| {
            arrow.kind == RelationshipKind::SameFile && arrow.from.x < arrow.to.x
        }));
    }

    #[test]
    fn test_changed_pane_loses_color_but_unconditional_pair_keeps_it() {
        let mut engine = DependencyGraphEngine::new();
        let a = code_pane("file:///a.rs", Some(TextRange::lines(1, 9)), 1, Vector::ZERO);
        let b = code_pane("file:///b.rs", Some(TextRange::lines(1, 9)), 2, Vector::new(400.0, 0.0));
        let c = code_pane("file:///c.rs", Some(TextRange::lines(1, 9)), 3, Vector::new(0.0, 400.0));
        let panes = map(&[&a, &b, &c]);
        let pending = query(engine.on_panes_changed(&panes, &PaneMap::new(), VIEW, None));
        block_on(pending.future);
        engine.apply_relationships(pending.request_number, vec![dependency(a.id, b.id, 2)], &panes, VIEW);
        engine.add_unconditional_relationship(a.id, c.id, vec![TextRange::lines(3, 3)], &panes, VIEW);
        let unconditional_color = engine.color(a.id, c.id);
        assert_ne!(unconditional_color, UNASSIGNED_ARROW_COLOR);

        // b navigates to another symbol: its pair is recolored later, the unconditional pair is not.
        let mut renavigated = b.clone();
        if let PaneKind::Code { symbol, .. } = &mut renavigated.kind {
            *symbol = Some(PaneSymbol {
                name: "other".into(),
                range: TextRange::lines(20, 30),
            });
        }
        let next = map(&[&a, &renavigated, &c]);
        query(engine.on_panes_changed(&next, &panes, VIEW, None));
        assert_eq!(engine.color(a.id, b.id), UNASSIGNED_ARROW_COLOR);
        assert_eq!(engine.color(a.id, c.id), unconditional_color);
    }

    #[test]
    fn test_pinned_panes_have_no_arrows() {
        let mut engine = DependencyGraphEngine::new();
        let a = code_pane("file:///a.rs", None, 1, Vector::ZERO);
        let mut b = code_pane("file:///b.rs", None, 2, Vector::new(400.0, 0.0));
        b.is_pinned = true;
        let panes = map(&[&a, &b]);
        engine.add_unconditional_relationship(a.id, b.id, Vec::new(), &panes, VIEW);
        assert!(engine.arrows().is_empty());
    }
}
