//! Activity catalog: the registered activity types and their versions
//!
//! The catalog is loaded from configuration once and is read-only for the
//! lifetime of the process. Lookups are by activity type name.

use crate::{ConfigurationError, TaranResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A registered activity type
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCatalogEntry {
    pub name: String,
    pub version: String,
    pub task_list: String,
}

impl ActivityCatalogEntry {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        task_list: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            task_list: task_list.into(),
        }
    }
}

/// The static list of registered activity types
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityCatalog {
    entries: Vec<ActivityCatalogEntry>,
}

impl ActivityCatalog {
    pub fn new(entries: Vec<ActivityCatalogEntry>) -> Self {
        Self { entries }
    }

    /// First entry registered under `name`
    pub fn get(&self, name: &str) -> Option<&ActivityCatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Registered version of `name`; unregistered types are a configuration error
    pub fn version_of(&self, name: &str) -> TaranResult<&str> {
        self.get(name)
            .map(|e| e.version.as_str())
            .ok_or_else(|| {
                ConfigurationError::UnregisteredActivity {
                    activity_type: name.to_string(),
                }
                .into()
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn entries(&self) -> &[ActivityCatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reject empty names or versions and duplicate names
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if entry.name.trim().is_empty() {
                return Err(ConfigurationError::Invalid(
                    "activity name must not be empty".into(),
                ));
            }
            if entry.version.trim().is_empty() {
                return Err(ConfigurationError::Invalid(format!(
                    "activity '{}' has an empty version",
                    entry.name
                )));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(ConfigurationError::Invalid(format!(
                    "activity '{}' registered more than once",
                    entry.name
                )));
            }
        }
        Ok(())
    }
}

impl FromIterator<ActivityCatalogEntry> for ActivityCatalog {
    fn from_iter<I: IntoIterator<Item = ActivityCatalogEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
