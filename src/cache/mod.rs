//! Per-file memoisation of parse and resolution results.
//!
//! Each key owns a slot: `Arc<Mutex<Option<Arc<V>>>>`. The first caller locks the
//! slot and computes; concurrent callers for the same key block on the slot and
//! then read the stored value, so a file is parsed at most once per cache epoch.
//! A failed computation leaves the slot empty and the next caller retries.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::debug;

use crate::extract::{ImportKind, ImportedNames, ModuleSummary};

/// One resolved dependency of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedImport {
    /// The first specifier that named this file (`./util`).
    pub specifier: String,
    pub kind: ImportKind,
    pub names: ImportedNames,
}

/// The resolved imports of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedImports {
    /// Canonical target path -> how it is imported. Records that resolve to the
    /// same file are merged.
    pub files: BTreeMap<PathBuf, ResolvedImport>,
    /// Bare package specifiers, not followed.
    pub external: BTreeSet<String>,
    /// Path specifiers that matched no file.
    pub unresolved: Vec<String>,
}

impl ResolvedImports {
    pub fn insert(&mut self, path: PathBuf, specifier: &str, kind: ImportKind, names: ImportedNames) {
        match self.files.get_mut(&path) {
            Some(existing) => {
                existing.names.merge(names);
                // Static beats dynamic beats re-export when reporting the edge kind.
                existing.kind = existing.kind.min(kind);
            }
            None => {
                self.files.insert(
                    path,
                    ResolvedImport {
                        specifier: specifier.to_owned(),
                        kind,
                        names,
                    },
                );
            }
        }
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.keys()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

/// Entry counts per cache table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub exports: usize,
    pub imports: usize,
    /// Memoised `(base, specifier)` and input path resolutions.
    pub path_resolution: usize,
    /// Memoised winning candidate paths, shared across specifiers.
    pub candidate_resolution: usize,
}

type Slot<V> = Arc<Mutex<Option<Arc<V>>>>;

#[derive(Debug)]
struct SlotTable<V> {
    slots: Mutex<HashMap<PathBuf, Slot<V>>>,
}

impl<V> Default for SlotTable<V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<V> SlotTable<V> {
    fn slot(&self, path: &Path) -> Slot<V> {
        let mut slots = self.slots.lock();
        match slots.get(path) {
            Some(slot) => Arc::clone(slot),
            None => {
                let slot: Slot<V> = Arc::new(Mutex::new(None));
                slots.insert(path.to_path_buf(), Arc::clone(&slot));
                slot
            }
        }
    }

    fn get_or_compute<E>(
        &self,
        path: &Path,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        let slot = self.slot(path);
        let mut guard = slot.lock();
        if let Some(value) = guard.as_ref() {
            return Ok(Arc::clone(value));
        }
        let value = Arc::new(compute()?);
        *guard = Some(Arc::clone(&value));
        Ok(value)
    }

    /// Filled slots. A slot whose computation is in flight is not counted.
    fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.try_lock().is_some_and(|value| value.is_some()))
            .count()
    }
}

#[derive(Debug, Default)]
struct Tables {
    modules: SlotTable<ModuleSummary>,
    imports: SlotTable<ResolvedImports>,
}

/// Module summary and resolved-import tables of one analysis context.
#[derive(Debug, Default)]
pub struct ModuleCache {
    tables: RwLock<Arc<Tables>>,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Arc<Tables> {
        Arc::clone(&*self.tables.read())
    }

    /// The parsed summary of `path`, computing it on first use.
    pub fn summary<E>(
        &self,
        path: &Path,
        compute: impl FnOnce() -> Result<ModuleSummary, E>,
    ) -> Result<Arc<ModuleSummary>, E> {
        self.tables().modules.get_or_compute(path, compute)
    }

    /// The resolved imports of `path`, computing them on first use.
    pub fn resolved_imports<E>(
        &self,
        path: &Path,
        compute: impl FnOnce() -> Result<ResolvedImports, E>,
    ) -> Result<Arc<ResolvedImports>, E> {
        self.tables().imports.get_or_compute(path, compute)
    }

    /// Drop every entry. Swaps in fresh tables under one write lock; computations
    /// still running against the old tables finish into the discarded epoch.
    pub fn clear(&self) {
        *self.tables.write() = Arc::new(Tables::default());
        debug!("module cache cleared");
    }

    /// `(exports, imports)` entry counts.
    pub fn counts(&self) -> (usize, usize) {
        let tables = self.tables();
        (tables.modules.len(), tables.imports.len())
    }
}
