// ABOUTME: Layout file persistence next to the settings file.
// ABOUTME: Stores the split tree as versioned JSON and supplies the first-run layout.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wm_core::Config;
use wm_layout::{DisplayNode, LayoutError, NodeRecord, PaneRegistry};

use crate::panes::{ConsolePane, NotesPane, PaneKind};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid layout: {0}")]
    Layout(#[from] LayoutError),

    #[error("Unsupported layout version: {0}")]
    UnsupportedVersion(u32),

    #[error("Could not determine config directory")]
    NoConfigPath,
}

/// On-disk wrapper around the root node record
#[derive(Debug, Serialize, Deserialize)]
struct LayoutFile {
    version: u32,
    root: NodeRecord,
}

#[derive(Debug, Clone)]
pub struct LayoutStore {
    path: PathBuf,
}

impl LayoutStore {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default layout file path (~/.config/splitwm/layout.json)
    pub fn default_path() -> Option<PathBuf> {
        Config::config_dir().map(|p| p.join("layout.json"))
    }

    pub fn at_default_path() -> Result<Self, StoreError> {
        Self::default_path()
            .map(Self::new)
            .ok_or(StoreError::NoConfigPath)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, root: &DisplayNode<PaneKind>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = LayoutFile {
            version: Self::CURRENT_VERSION,
            root: root.to_record()?,
        };
        let json = serde_json::to_string_pretty(&file)?;
        std::fs::write(&self.path, json)?;
        tracing::info!("Saved layout to {}", self.path.display());
        Ok(())
    }

    pub fn load(&self, registry: &PaneRegistry<PaneKind>) -> Result<DisplayNode<PaneKind>, StoreError> {
        let json = std::fs::read_to_string(&self.path)?;
        let file: LayoutFile = serde_json::from_str(&json)?;
        if file.version > Self::CURRENT_VERSION {
            return Err(StoreError::UnsupportedVersion(file.version));
        }
        Ok(DisplayNode::from_record(file.root, registry)?)
    }

    /// Load the stored layout, falling back to [`default_layout`] when it is
    /// missing or unreadable
    pub fn load_or_default(&self, registry: &PaneRegistry<PaneKind>) -> DisplayNode<PaneKind> {
        match self.load(registry) {
            Ok(root) => root,
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No layout at {}; using the default", self.path.display());
                default_layout()
            }
            Err(e) => {
                tracing::warn!("Failed to load layout from {}: {}", self.path.display(), e);
                default_layout()
            }
        }
    }
}

/// Notes above a console
pub fn default_layout() -> DisplayNode<PaneKind> {
    let notes = NotesPane::new(
        "Notes",
        "Ctrl+E edits the layout\nCtrl+F zooms the pane under the mouse\nDrag a divider to resize",
    );
    let mut root = DisplayNode::leaf(PaneKind::from(notes));
    root.split_y(0.7, DisplayNode::leaf(PaneKind::from(ConsolePane::new())));
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panes::{pane_registry, PaneType};
    use wm_layout::{Element, SplitAxis, TreePane};

    fn temp_store(name: &str) -> LayoutStore {
        LayoutStore::new(std::env::temp_dir().join(name))
    }

    #[test]
    fn test_layout_roundtrip() {
        let store = temp_store("splitwm_test_layout.json");
        let root = default_layout();
        store.save(&root).unwrap();

        let loaded = store.load(&pane_registry()).unwrap();
        assert_eq!(loaded.axis(), SplitAxis::Vertical);
        assert_eq!(loaded.split_line().unwrap().pos, 0.7);

        let mut kinds = Vec::new();
        loaded.visit_panes(&mut |e| {
            if let Element::Pane(p) = e {
                kinds.push((p.pane_type(), p.name()));
            }
        });
        assert_eq!(
            kinds,
            vec![
                (PaneType::Notes, "Notes".to_string()),
                (PaneType::Console, "Console".to_string())
            ]
        );

        let _ = std::fs::remove_file(store.path());
    }

    #[test]
    fn test_newer_version_rejected() {
        let store = temp_store("splitwm_test_layout_future.json");
        let json = r#"{"version": 99, "root": {"split_line": {"pos": 0.5, "axis": "none"}, "type": "EmptyPane", "pane": {}}}"#;
        std::fs::write(store.path(), json).unwrap();

        let err = store.load(&pane_registry()).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedVersion(99)));
        // Falls back instead of failing
        assert_eq!(store.load_or_default(&pane_registry()).leaf_count(), 2);

        let _ = std::fs::remove_file(store.path());
    }

    #[test]
    fn test_missing_file_uses_default() {
        let store = temp_store("splitwm_test_layout_missing.json");
        let _ = std::fs::remove_file(store.path());
        let root = store.load_or_default(&pane_registry());
        assert_eq!(root.leaf_count(), 2);
    }

    #[test]
    fn test_default_path() {
        if let Some(p) = LayoutStore::default_path() {
            assert!(p.ends_with("splitwm/layout.json"));
        }
    }
}
