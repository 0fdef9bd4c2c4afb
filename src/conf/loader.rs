//! Settings units and the loaders that find them.
//!
//! A unit is addressed by a dotted identifier (`settings`, `apps.blog`).
//! Two loaders ship with the crate:
//!
//! - [`FsUnitLoader`] reads a project directory: `a.b` is the TOML file
//!   `<root>/a/b.toml`, and its composite form is the directory `<root>/a/b/`.
//! - [`UnitRegistry`] holds units registered explicitly at startup.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::UnitError;

/// An immediate child of a composite unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubUnit {
    pub name: String,
    /// `true` for composite children (directories); only those are eligible
    /// for wildcard expansion.
    pub composite: bool,
}

impl SubUnit {
    pub fn package(name: &str) -> Self {
        Self { name: name.to_string(), composite: true }
    }

    pub fn module(name: &str) -> Self {
        Self { name: name.to_string(), composite: false }
    }
}

/// Source of settings units.
pub trait UnitLoader: Send + Sync {
    /// Load the settings table of a unit.
    fn load(&self, identifier: &str) -> Result<toml::Table, UnitError>;

    /// List the immediate children of a composite unit, in no particular order.
    fn sub_units(&self, identifier: &str) -> Result<Vec<SubUnit>, UnitError>;
}

// ── filesystem ────────────────────────────────────────────────────────────────

/// Loads units from a project directory.
#[derive(Debug, Clone)]
pub struct FsUnitLoader {
    root: PathBuf,
}

impl FsUnitLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Like [`FsUnitLoader::new`], expanding a leading `~`.
    pub fn from_dir(root: &str) -> Self {
        Self::new(expand_home(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map `a.b.c` to `<root>/a/b/c`. Empty segments and path syntax are
    /// rejected so an identifier can never escape the root.
    fn unit_path(&self, identifier: &str) -> Result<PathBuf, UnitError> {
        let mut path = self.root.clone();
        for segment in identifier.split('.') {
            if segment.is_empty()
                || segment == ".."
                || segment.contains(['/', '\\'])
            {
                return Err(UnitError::Malformed {
                    unit: identifier.to_string(),
                    reason: "not a dotted identifier".into(),
                });
            }
            path.push(segment);
        }
        Ok(path)
    }
}

impl UnitLoader for FsUnitLoader {
    fn load(&self, identifier: &str) -> Result<toml::Table, UnitError> {
        let mut path = self.unit_path(identifier)?;
        path.set_extension("toml");

        let raw = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => UnitError::NotFound(identifier.to_string()),
            _ => UnitError::Io(e),
        })?;

        toml::from_str(&raw).map_err(|e| UnitError::Malformed {
            unit: identifier.to_string(),
            reason: format!("parse error in {}: {e}", path.display()),
        })
    }

    fn sub_units(&self, identifier: &str) -> Result<Vec<SubUnit>, UnitError> {
        let dir = self.unit_path(identifier)?;
        if !dir.is_dir() {
            return Err(UnitError::NotFound(identifier.to_string()));
        }

        let mut subs = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            // Names that are not valid UTF-8 can never be identifiers.
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            subs.push(SubUnit {
                name,
                composite: entry.path().is_dir(),
            });
        }
        Ok(subs)
    }
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

// ── explicit registry ─────────────────────────────────────────────────────────

/// Units and composite listings registered up front.
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    units: HashMap<String, toml::Table>,
    packages: HashMap<String, Vec<SubUnit>>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit(mut self, identifier: &str, table: toml::Table) -> Self {
        self.units.insert(identifier.to_string(), table);
        self
    }

    /// Register a unit from TOML source text.
    pub fn with_unit_source(self, identifier: &str, source: &str) -> Result<Self, UnitError> {
        let table = toml::from_str(source).map_err(|e| UnitError::Malformed {
            unit: identifier.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self.with_unit(identifier, table))
    }

    pub fn with_package<I>(mut self, identifier: &str, children: I) -> Self
    where
        I: IntoIterator<Item = SubUnit>,
    {
        self.packages
            .entry(identifier.to_string())
            .or_default()
            .extend(children);
        self
    }
}

impl UnitLoader for UnitRegistry {
    fn load(&self, identifier: &str) -> Result<toml::Table, UnitError> {
        self.units
            .get(identifier)
            .cloned()
            .ok_or_else(|| UnitError::NotFound(identifier.to_string()))
    }

    fn sub_units(&self, identifier: &str) -> Result<Vec<SubUnit>, UnitError> {
        self.packages
            .get(identifier)
            .cloned()
            .ok_or_else(|| UnitError::NotFound(identifier.to_string()))
    }
}
