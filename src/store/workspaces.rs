//! Saving and opening named canvas workspaces through the persistence host.

use super::WorkspaceStore;
use crate::error::{Result, WorkspaceError};
use crate::persistence::CanvasWorkspace;
use crate::providers::PersistenceHost;
use crate::types::Selection;
use log::info;
use std::sync::Arc;
use uuid::Uuid;

impl WorkspaceStore {
    fn persistence(&self) -> Result<Arc<dyn PersistenceHost>> {
        self.context
            .persistence
            .clone()
            .ok_or(WorkspaceError::NoPersistenceHost)
    }

    /// Saved workspaces as of the last load or save.
    pub fn saved_workspaces(&self) -> &[CanvasWorkspace] {
        &self.saved_workspaces
    }

    /// The workspace that was last opened or saved, if any.
    pub fn current_workspace(&self) -> Option<&CanvasWorkspace> {
        self.current_workspace.as_ref()
    }

    /// Returns true if the open editor groups no longer match the current workspace.
    pub fn is_workspace_dirty(&self) -> bool {
        self.workspace_dirty
    }

    pub(super) fn update_workspace_dirty(&mut self) {
        self.workspace_dirty = self.current_workspace.as_ref().is_some_and(|current| {
            CanvasWorkspace::group_ids_of(&self.panes) != current.group_ids
        });
    }

    /// Reloads the saved workspace list from the persistence host.
    pub async fn load_workspaces(&mut self) -> Result<&[CanvasWorkspace]> {
        let host = self.persistence()?;
        self.saved_workspaces = host.load_workspaces().await?;
        info!("loaded {} canvas workspaces", self.saved_workspaces.len());
        Ok(&self.saved_workspaces)
    }

    /// Saves the current panes and camera as a new named workspace and makes it current.
    ///
    /// # Returns
    ///
    /// The new workspace's id.
    pub async fn save_workspace(&mut self, name: impl Into<String>) -> Result<Uuid> {
        let host = self.persistence()?;
        let workspace = CanvasWorkspace::capture(name, &self.panes, self.camera)?;
        let id = workspace.id;
        host.save_workspace(workspace.clone()).await?;
        info!("saved canvas workspace '{}' ({})", workspace.name, id);

        self.saved_workspaces.push(workspace.clone());
        self.current_workspace = Some(workspace);
        self.workspace_dirty = false;
        Ok(id)
    }

    /// Overwrites the current workspace with the current panes and camera.
    pub async fn overwrite_current_workspace(&mut self) -> Result<()> {
        let host = self.persistence()?;
        let mut workspace = self
            .current_workspace
            .clone()
            .ok_or(WorkspaceError::NoCurrentWorkspace)?;
        workspace.update(&self.panes, self.camera)?;
        host.save_workspace(workspace.clone()).await?;
        info!("overwrote canvas workspace '{}'", workspace.name);

        match self
            .saved_workspaces
            .iter_mut()
            .find(|saved| saved.id == workspace.id)
        {
            Some(saved) => *saved = workspace.clone(),
            None => self.saved_workspaces.push(workspace.clone()),
        }
        self.current_workspace = Some(workspace);
        self.workspace_dirty = false;
        Ok(())
    }

    /// Deletes a saved workspace. Deleting the current workspace leaves none current.
    pub async fn delete_workspace(&mut self, id: Uuid) -> Result<()> {
        let host = self.persistence()?;
        host.delete_workspace(id).await?;
        self.saved_workspaces.retain(|saved| saved.id != id);
        if self.current_workspace.as_ref().is_some_and(|current| current.id == id) {
            self.current_workspace = None;
        }
        self.update_workspace_dirty();
        info!("deleted canvas workspace {}", id);
        Ok(())
    }

    /// Replaces every pane with a saved workspace's panes and camera.
    ///
    /// Open panes are closed through the editor host first; if the user cancels any close the
    /// workspace is not opened. Undo history is cleared since the old map no longer applies.
    ///
    /// # Returns
    ///
    /// False if a close was cancelled.
    pub async fn open_workspace(&mut self, id: Uuid) -> Result<bool> {
        let workspace = match self.saved_workspaces.iter().find(|saved| saved.id == id) {
            Some(workspace) => workspace.clone(),
            None => {
                self.load_workspaces().await?;
                self.saved_workspaces
                    .iter()
                    .find(|saved| saved.id == id)
                    .cloned()
                    .ok_or(WorkspaceError::WorkspaceNotFound(id))?
            }
        };
        let panes = workspace.pane_map()?;

        if !self.close_all_panes().await {
            info!("opening canvas workspace '{}' was cancelled", workspace.name);
            return Ok(false);
        }

        self.animation.cancel();
        self.camera = workspace.camera();
        self.set_selection(Selection::new());
        self.focused = None;
        self.set_panes_untracked(panes);
        self.refresh_arrows();
        self.undo.clear();

        info!(
            "opened canvas workspace '{}' with {} panes",
            workspace.name,
            self.panes.len()
        );
        self.current_workspace = Some(workspace);
        self.workspace_dirty = false;
        Ok(true)
    }
}
