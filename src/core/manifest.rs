//! Additive Cargo.toml editing for plugin packages.
//!
//! Manifests are edited through `toml_edit` so that every line the tool
//! does not touch keeps its exact formatting. Loading runs the textual
//! repair pass first, since the concatenated-declaration corruption is
//! not valid TOML and would otherwise fail the parse.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use toml_edit::{DocumentMut, Item};

use crate::core::repair::repair_manifest_text;
use crate::util::fs;

/// A plugin manifest held in memory for additive edits.
#[derive(Debug)]
pub struct ManifestFile {
    path: PathBuf,
    /// Raw text as read from disk, before any repair.
    original: String,
    doc: DocumentMut,
    repaired: bool,
}

impl ManifestFile {
    /// Load and parse a manifest, repairing corrupted lines first.
    pub fn load(path: &Path) -> Result<Self> {
        let original = fs::read_to_string(path)?;

        let (text, repaired) = match repair_manifest_text(&original) {
            Some(fixed) => {
                tracing::warn!(
                    "repaired concatenated declarations in {}",
                    path.display()
                );
                (fixed, true)
            }
            None => (original.clone(), false),
        };

        let doc: DocumentMut = text
            .parse()
            .with_context(|| format!("failed to parse {}", path.display()))?;

        Ok(ManifestFile {
            path: path.to_path_buf(),
            original,
            doc,
            repaired,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether loading had to repair corrupted lines.
    pub fn was_repaired(&self) -> bool {
        self.repaired
    }

    /// Whether `[dependencies]` declares the named dependency.
    pub fn has_dependency(&self, name: &str) -> bool {
        self.doc
            .get("dependencies")
            .and_then(Item::as_table)
            .is_some_and(|deps| deps.contains_key(name))
    }

    /// Append declarations for any of the given dependencies that are
    /// not already present in `[dependencies]`.
    ///
    /// Existing declarations are never replaced or reordered. When the
    /// manifest has no `[dependencies]` table at all, nothing is added
    /// and a warning is logged; adding a whole section is out of scope
    /// for an additive patch.
    pub fn add_missing_dependencies(&mut self, wanted: &[(&str, &str)]) -> Result<Vec<String>> {
        let Some(deps) = self
            .doc
            .get_mut("dependencies")
            .and_then(Item::as_table_mut)
        else {
            if !wanted.is_empty() {
                tracing::warn!(
                    "{} has no [dependencies] section; skipping patch",
                    self.path.display()
                );
            }
            return Ok(Vec::new());
        };

        let mut added = Vec::new();
        for (name, spec) in wanted {
            if deps.contains_key(name) {
                continue;
            }
            let item = parse_dependency_spec(name, spec)?;
            deps.insert(name, item);
            added.push((*name).to_string());
        }
        Ok(added)
    }

    /// Current serialized form of the document.
    pub fn render(&self) -> String {
        self.doc.to_string()
    }

    /// Whether saving would change the file on disk.
    ///
    /// A repair alone counts as a change even when no dependency was
    /// added, so corrupted files get persisted in fixed form.
    pub fn is_dirty(&self) -> bool {
        self.render() != self.original
    }

    /// Write the document back if it differs from what was loaded.
    pub fn save_if_changed(&self) -> Result<bool> {
        if !self.is_dirty() {
            return Ok(false);
        }
        fs::write_string(&self.path, &self.render())?;
        Ok(true)
    }
}

/// Parse a dependency declaration value such as `"1.0"` or
/// `{ version = "0.4", features = ["serde"] }` into a TOML item.
pub(crate) fn parse_dependency_spec(name: &str, spec: &str) -> Result<Item> {
    let fragment: DocumentMut = format!("{name} = {spec}\n")
        .parse()
        .with_context(|| format!("invalid dependency spec for `{name}`: {spec}"))?;
    fragment
        .get(name)
        .cloned()
        .with_context(|| format!("dependency spec for `{name}` produced no value"))
}
