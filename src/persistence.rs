//! Named canvas workspaces and a JSON file store for them.
//!
//! A [`CanvasWorkspace`] is a saved arrangement: the pane map serialized to an opaque JSON blob,
//! the camera, and the set of host editor groups that were open. [`JsonFilePersistence`] keeps
//! every saved workspace in a single pretty-printed JSON array on disk.

use crate::camera::CameraState;
use crate::error::{Result, WorkspaceError};
use crate::geometry::Vector;
use crate::providers::PersistenceHost;
use crate::types::{Pane, PaneMap};
use futures::future::{BoxFuture, FutureExt};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A saved, named arrangement of panes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasWorkspace {
    /// Unique identifier for this workspace
    pub id: Uuid,
    /// Name shown to the user
    pub name: String,
    /// Pane map serialized as a JSON array of panes
    pub panes: String,
    /// Camera offset at save time
    pub camera_position: Vector,
    /// Canvas scale at save time
    pub scale: f32,
    /// Host editor groups of the code panes at save time
    pub group_ids: BTreeSet<u64>,
}

impl CanvasWorkspace {
    /// Captures the current panes and camera under a new id.
    ///
    /// # Arguments
    ///
    /// * `name` - Name shown to the user
    /// * `panes` - Panes to save
    /// * `camera` - Camera to restore on open
    pub fn capture(name: impl Into<String>, panes: &PaneMap, camera: CameraState) -> Result<Self> {
        let mut workspace = Self {
            id: Uuid::new_v4(),
            name: name.into(),
            panes: String::new(),
            camera_position: camera.position,
            scale: camera.scale,
            group_ids: BTreeSet::new(),
        };
        workspace.update(panes, camera)?;
        Ok(workspace)
    }

    /// Replaces the saved panes and camera, keeping id and name.
    pub fn update(&mut self, panes: &PaneMap, camera: CameraState) -> Result<()> {
        let mut ordered: Vec<&Pane> = panes.values().collect();
        ordered.sort_by(|a, b| a.id.cmp(&b.id));
        self.panes = serde_json::to_string(&ordered)?;
        self.camera_position = camera.position;
        self.scale = camera.scale;
        self.group_ids = Self::group_ids_of(panes);
        Ok(())
    }

    /// Deserializes the saved pane map.
    pub fn pane_map(&self) -> Result<PaneMap> {
        let panes: Vec<Pane> = serde_json::from_str(&self.panes)?;
        Ok(panes.into_iter().map(|pane| (pane.id, pane)).collect())
    }

    /// Camera to restore on open.
    pub fn camera(&self) -> CameraState {
        CameraState::new(self.camera_position, self.scale)
    }

    /// Editor groups of the mounted code panes.
    pub fn group_ids_of(panes: &PaneMap) -> BTreeSet<u64> {
        panes
            .values()
            .filter(|pane| pane.kind.is_code())
            .filter_map(|pane| pane.kind.identifier())
            .map(|identifier| identifier.group_id)
            .collect()
    }

    /// Serializes the workspace to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a workspace from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Stores every workspace in one JSON file.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    /// Creates a store backed by `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(path: &Path) -> Result<Vec<CanvasWorkspace>> {
        match fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(error) => Err(error.into()),
        }
    }

    fn write_all(path: &Path, workspaces: &[CanvasWorkspace]) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(workspaces)?)?;
        Ok(())
    }
}

impl PersistenceHost for JsonFilePersistence {
    fn load_workspaces(&self) -> BoxFuture<'static, Result<Vec<CanvasWorkspace>>> {
        let path = self.path.clone();
        async move {
            let workspaces = Self::read_all(&path)?;
            debug!("loaded {} canvas workspaces from {}", workspaces.len(), path.display());
            Ok(workspaces)
        }
        .boxed()
    }

    fn save_workspace(&self, workspace: CanvasWorkspace) -> BoxFuture<'static, Result<()>> {
        let path = self.path.clone();
        async move {
            let mut workspaces = Self::read_all(&path)?;
            match workspaces.iter_mut().find(|saved| saved.id == workspace.id) {
                Some(saved) => *saved = workspace,
                None => workspaces.push(workspace),
            }
            Self::write_all(&path, &workspaces)?;
            info!("saved canvas workspaces to {}", path.display());
            Ok(())
        }
        .boxed()
    }

    fn delete_workspace(&self, id: Uuid) -> BoxFuture<'static, Result<()>> {
        let path = self.path.clone();
        async move {
            let mut workspaces = Self::read_all(&path)?;
            let count = workspaces.len();
            workspaces.retain(|saved| saved.id != id);
            if workspaces.len() == count {
                return Err(WorkspaceError::WorkspaceNotFound(id));
            }
            Self::write_all(&path, &workspaces)?;
            info!("deleted canvas workspace {}", id);
            Ok(())
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EditorIdentifier, PaneKind};

    fn code_pane(group_id: u64) -> Pane {
        Pane::new(
            PaneKind::Code {
                uri: "file:///src/lib.rs".into(),
                file_path: "src/lib.rs".into(),
                symbol: None,
                edit_range: None,
                identifier: Some(EditorIdentifier {
                    group_id,
                    editor: 1,
                }),
            },
            Vector::new(10.0, 20.0),
            Vector::new(600.0, 300.0),
        )
    }

    #[test]
    fn test_capture_round_trips_panes_and_groups() {
        let first = code_pane(3);
        let second = code_pane(7);
        let settings = Pane::new(PaneKind::Settings, Vector::ZERO, Vector::new(600.0, 400.0));
        let panes: PaneMap = [first, second, settings]
            .into_iter()
            .map(|pane| (pane.id, pane))
            .collect();

        let workspace =
            CanvasWorkspace::capture("review", &panes, CameraState::new(Vector::new(5.0, 6.0), 0.5))
                .unwrap();
        assert_eq!(workspace.group_ids, BTreeSet::from([3, 7]));
        assert_eq!(workspace.camera(), CameraState::new(Vector::new(5.0, 6.0), 0.5));
        assert_eq!(workspace.pane_map().unwrap(), panes);

        let json = workspace.to_json().unwrap();
        assert_eq!(CanvasWorkspace::from_json(&json).unwrap(), workspace);
    }

    #[tokio::test]
    async fn test_json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePersistence::new(dir.path().join("nested").join("workspaces.json"));
        assert!(store.load_workspaces().await.unwrap().is_empty());

        let panes: PaneMap = [code_pane(1)].into_iter().map(|pane| (pane.id, pane)).collect();
        let mut workspace =
            CanvasWorkspace::capture("first", &panes, CameraState::default()).unwrap();
        store.save_workspace(workspace.clone()).await.unwrap();

        // Saving again with the same id replaces the record.
        workspace.name = "renamed".into();
        store.save_workspace(workspace.clone()).await.unwrap();
        let loaded = store.load_workspaces().await.unwrap();
        assert_eq!(loaded, vec![workspace.clone()]);

        store.delete_workspace(workspace.id).await.unwrap();
        assert!(store.load_workspaces().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_workspace_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePersistence::new(dir.path().join("workspaces.json"));
        let id = Uuid::new_v4();
        match store.delete_workspace(id).await {
            Err(WorkspaceError::WorkspaceNotFound(missing)) => assert_eq!(missing, id),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
