//! Deployment manifest: a JSON list of `{ "type": name, "id": object id }`
//! written when the contract was published.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use indexmap::IndexMap;
use log::{debug, trace};
use reelchain_common::crypto::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

pub const DEFAULT_MANIFEST_PATH: &str = "created.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestEntry {
    #[serde(rename = "type", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

// Maps logical names to on-chain ids.
// The manifest is read on first use and never reloaded.
#[derive(Debug)]
pub struct IdentityResolver {
    path: PathBuf,
    table: OnceLock<IndexMap<String, ObjectId>>,
}

impl IdentityResolver {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            table: OnceLock::new(),
        }
    }

    // Resolver backed by an in-memory table instead of a file
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, ObjectId)>,
        S: Into<String>,
    {
        let table: IndexMap<String, ObjectId> = entries
            .into_iter()
            .map(|(name, id)| (name.into(), id))
            .collect();

        Self {
            path: PathBuf::new(),
            table: OnceLock::from(table),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, reason: String) -> ClientError {
        ClientError::ManifestUnavailable {
            path: self.path.display().to_string(),
            reason,
        }
    }

    fn load(&self) -> Result<IndexMap<String, ObjectId>> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("loading manifest from {}", self.path.display());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.unavailable(e.to_string()))?;
        let entries: Vec<ManifestEntry> =
            serde_json::from_str(&content).map_err(|e| self.unavailable(e.to_string()))?;

        let mut table = IndexMap::with_capacity(entries.len());
        for entry in entries {
            let (Some(name), Some(id)) = (entry.name, entry.id) else {
                debug!("Skipping incomplete manifest entry");
                continue;
            };

            let id = ObjectId::from_hex(&id)
                .map_err(|e| self.unavailable(format!("invalid id for '{}': {}", name, e)))?;
            // Later entries override earlier ones
            table.insert(name, id);
        }

        if log::log_enabled!(log::Level::Debug) {
            debug!("Loaded {} manifest entries", table.len());
        }
        Ok(table)
    }

    fn table(&self) -> Result<&IndexMap<String, ObjectId>> {
        if let Some(table) = self.table.get() {
            return Ok(table);
        }

        let table = self.load()?;
        Ok(self.table.get_or_init(|| table))
    }

    pub fn resolve(&self, name: &str) -> Result<ObjectId> {
        if name.is_empty() {
            return Err(ClientError::EmptyLogicalName);
        }

        let id = self
            .table()?
            .get(name)
            .copied()
            .ok_or_else(|| ClientError::NameNotFound(name.to_owned()))?;

        if log::log_enabled!(log::Level::Debug) {
            debug!("Resolved '{}' to {}", name, id);
        }
        Ok(id)
    }

    // All names known by the manifest, in file order
    pub fn names(&self) -> Result<Vec<&str>> {
        Ok(self.table()?.keys().map(String::as_str).collect())
    }
}
