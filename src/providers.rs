//! Interfaces to the collaborators the workspace talks to, and the context that carries them.
//!
//! The store never reaches for globals. Everything it needs from the outside world (symbol
//! resolution, the editor widgets, storage, the time source) comes in through a
//! [`WorkspaceContext`] built once at startup. Every collaborator is optional: a missing symbol
//! provider yields no relationships and default pane sizes, a missing editor host closes panes
//! without asking, and a missing persistence host makes workspace saving fail with
//! [`crate::WorkspaceError::NoPersistenceHost`].

use crate::config::WorkspaceConfig;
use crate::error::Result;
use crate::graph::SymbolRelationship;
use crate::persistence::CanvasWorkspace;
use crate::types::{EditorIdentifier, LineMetadata, SymbolDescriptor, TextRange, Theme};
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// A cooperative cancellation flag shared between the graph engine and a provider.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that has not been cancelled.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Resolves relationships between symbols and reports line metrics for sizing.
pub trait SymbolProvider: Send + Sync {
    /// Finds the relationships between the given panes' symbols.
    ///
    /// Implementations should check `token` and may return early with a partial or empty result
    /// once it is cancelled; the engine drops stale results regardless.
    fn symbol_relationships(
        &self,
        descriptors: Vec<SymbolDescriptor>,
        token: CancellationToken,
    ) -> BoxFuture<'static, Vec<SymbolRelationship>>;

    /// Line count and longest line for a document or a range of it.
    fn line_metadata(
        &self,
        uri: &str,
        range: Option<TextRange>,
    ) -> BoxFuture<'static, Option<LineMetadata>>;
}

/// The host that owns the actual editing widgets.
pub trait EditorHost: Send + Sync {
    /// Closes an editor. Resolves to false when the user cancelled (for example declined to
    /// discard unsaved changes). `unconditional` skips any confirmation.
    fn close_editor(&self, identifier: EditorIdentifier, unconditional: bool)
        -> BoxFuture<'static, bool>;

    /// Gives keyboard focus to an editor.
    fn focus_editor(&self, identifier: EditorIdentifier);
}

/// Storage for named canvas workspaces.
pub trait PersistenceHost: Send + Sync {
    /// Loads every saved workspace.
    fn load_workspaces(&self) -> BoxFuture<'static, Result<Vec<CanvasWorkspace>>>;

    /// Inserts or replaces a workspace by id.
    fn save_workspace(&self, workspace: CanvasWorkspace) -> BoxFuture<'static, Result<()>>;

    /// Removes a workspace by id.
    fn delete_workspace(&self, id: Uuid) -> BoxFuture<'static, Result<()>>;
}

/// Time source for undo batching and navigation animation.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += duration;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Configuration and collaborators handed to a [`crate::WorkspaceStore`] at construction.
#[derive(Clone)]
pub struct WorkspaceContext {
    /// Tunable constants
    pub config: WorkspaceConfig,
    /// Active theme, selects arrow colors
    pub theme: Theme,
    /// Symbol relationships and line metrics
    pub symbol_provider: Option<Arc<dyn SymbolProvider>>,
    /// Editor widget host
    pub editor_host: Option<Arc<dyn EditorHost>>,
    /// Named workspace storage
    pub persistence: Option<Arc<dyn PersistenceHost>>,
    /// Time source
    pub clock: Arc<dyn Clock>,
}

impl Default for WorkspaceContext {
    fn default() -> Self {
        Self::new(WorkspaceConfig::default())
    }
}

impl std::fmt::Debug for WorkspaceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceContext")
            .field("config", &self.config)
            .field("theme", &self.theme)
            .field("symbol_provider", &self.symbol_provider.is_some())
            .field("editor_host", &self.editor_host.is_some())
            .field("persistence", &self.persistence.is_some())
            .finish()
    }
}

impl WorkspaceContext {
    /// Creates a context with no collaborators and the system clock.
    pub fn new(config: WorkspaceConfig) -> Self {
        Self {
            config,
            theme: Theme::default(),
            symbol_provider: None,
            editor_host: None,
            persistence: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Sets the theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Sets the symbol provider.
    pub fn with_symbol_provider(mut self, provider: Arc<dyn SymbolProvider>) -> Self {
        self.symbol_provider = Some(provider);
        self
    }

    /// Sets the editor host.
    pub fn with_editor_host(mut self, host: Arc<dyn EditorHost>) -> Self {
        self.editor_host = Some(host);
        self
    }

    /// Sets the persistence host.
    pub fn with_persistence(mut self, host: Arc<dyn PersistenceHost>) -> Self {
        self.persistence = Some(host);
        self
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_is_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_manual_clock_only_moves_when_advanced() {
        let clock = ManualClock::new();
        let shared = clock.clone();
        let start = clock.now();
        assert_eq!(clock.now(), start);
        shared.advance(Duration::from_millis(300));
        assert_eq!(clock.now(), start + Duration::from_millis(300));
    }

    #[test]
    fn test_context_defaults_have_no_collaborators() {
        let context = WorkspaceContext::default();
        assert!(context.symbol_provider.is_none());
        assert!(context.editor_host.is_none());
        assert!(context.persistence.is_none());
        assert_eq!(context.theme, Theme::Dark);
    }
}
