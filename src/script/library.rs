//! Scenario library: the built-in scripts plus any loaded from disk.

use super::{scenarios, Script};
use crate::errors::ScriptError;
use crate::telemetry::sanitize_for_log;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Ordered collection of scripts, addressed by scenario id.
#[derive(Debug, Clone, Default)]
pub struct ScenarioLibrary {
    scripts: Vec<Arc<Script>>,
}

impl ScenarioLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The scenarios shipped with the binary.
    pub fn builtin() -> Self {
        let mut library = Self::new();
        for script in scenarios::all() {
            library.scripts.push(Arc::new(script));
        }
        library
    }

    /// Add a script; ids must be unique.
    pub fn insert(&mut self, script: Script) -> Result<(), ScriptError> {
        if self.contains(&script.id) {
            return Err(ScriptError::DuplicateScenario(script.id));
        }
        for warning in script.lint() {
            warn!(scenario = %sanitize_for_log(&script.id), "{}", warning);
        }
        self.scripts.push(Arc::new(script));
        Ok(())
    }

    /// Load every `*.json` file in `dir`, in file name order.
    /// Returns the number of scripts added.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, ScriptError> {
        let entries = std::fs::read_dir(dir).map_err(|source| ScriptError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut added = 0;
        for path in paths {
            let script = Script::load(&path)?;
            debug!(path = %path.display(), turns = script.len(), "Loaded scenario script");
            self.insert(script)?;
            added += 1;
        }
        Ok(added)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Script>> {
        self.scripts.iter().find(|s| s.id == id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.scripts.iter().any(|s| s.id == id)
    }

    pub fn first(&self) -> Option<Arc<Script>> {
        self.scripts.first().cloned()
    }

    /// Scenario at a 0-based position, for numeric shortcuts.
    pub fn nth(&self, position: usize) -> Option<Arc<Script>> {
        self.scripts.get(position).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Script>> {
        self.scripts.iter()
    }

    pub fn ids(&self) -> Vec<String> {
        self.scripts.iter().map(|s| s.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}
