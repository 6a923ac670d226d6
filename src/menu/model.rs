//! In-memory menu tree.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::MenuNode;
use crate::engine::MENU_STATE_END;
use crate::error::UssdError;
use crate::Result;

/// Join a relative menu path onto the working directory.
fn resolve_relative(path: &Path, cwd: std::io::Result<PathBuf>) -> Result<PathBuf> {
    cwd.map(|dir| dir.join(path))
        .map_err(|e| UssdError::MenuLoad {
            path: path.to_path_buf(),
            reason: format!("cannot resolve working directory: {}", e),
        })
}

/// Immutable mapping from state identifier to [`MenuNode`].
///
/// Targets that point at undefined states are tolerated at load time and
/// only surface when navigation reaches them.
#[derive(Debug, Clone, Default)]
pub struct MenuModel {
    nodes: HashMap<String, MenuNode>,
}

impl MenuModel {
    /// Load a menu definition from a JSON file.
    ///
    /// Relative paths are resolved against the current working directory.
    /// Undefined targets other than the default terminal state are logged.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let resolved = if path.is_absolute() {
            path.to_path_buf()
        } else {
            resolve_relative(path, std::env::current_dir())?
        };

        let load_err = |reason: String| UssdError::MenuLoad {
            path: resolved.clone(),
            reason,
        };

        let content = std::fs::read_to_string(&resolved).map_err(|e| load_err(e.to_string()))?;
        let nodes: HashMap<String, MenuNode> =
            serde_json::from_str(&content).map_err(|e| load_err(e.to_string()))?;

        let model = Self { nodes };
        info!(
            "Loaded menu with {} states from {}",
            model.len(),
            resolved.display()
        );
        for (from, to) in model.dangling_references(Some(MENU_STATE_END)) {
            warn!(from = %from, to = %to, "Menu references undefined state");
        }

        Ok(model)
    }

    /// Parse a menu definition from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let nodes = serde_json::from_str(json).map_err(UssdError::MenuParse)?;
        Ok(Self { nodes })
    }

    /// Build a menu from already constructed nodes.
    pub fn from_nodes<I, K>(nodes: I) -> Self
    where
        I: IntoIterator<Item = (K, MenuNode)>,
        K: Into<String>,
    {
        Self {
            nodes: nodes.into_iter().map(|(k, n)| (k.into(), n)).collect(),
        }
    }

    /// Get the node for a state.
    pub fn lookup(&self, state: &str) -> Option<&MenuNode> {
        self.nodes.get(state)
    }

    /// Check if a state is defined.
    pub fn contains(&self, state: &str) -> bool {
        self.nodes.contains_key(state)
    }

    /// Number of defined states.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Defined state identifiers, in no particular order.
    pub fn state_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// List `(from, to)` transitions whose target is not defined.
    ///
    /// `terminal` is skipped since an exit state may be left undefined.
    /// Results are sorted for stable output.
    pub fn dangling_references(&self, terminal: Option<&str>) -> Vec<(String, String)> {
        let mut dangling: Vec<(String, String)> = self
            .nodes
            .iter()
            .flat_map(|(from, node)| node.targets().map(move |to| (from.as_str(), to)))
            .filter(|(_, to)| Some(*to) != terminal && !self.contains(to))
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        dangling.sort();
        dangling
    }
}
