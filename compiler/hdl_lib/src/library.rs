//! Libraries and the compiled units they hold.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hdl_codegen::NativeModule;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::naming;

/// Design unit kinds as stored in a library.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Entity,
    Architecture,
    Package,
    PackageBody,
    Configuration,
}

/// An analysed unit and the native module compiled from it, once loaded.
#[derive(Debug)]
pub struct CompiledUnit {
    name: String,
    kind: UnitKind,
    native: Mutex<Option<Arc<NativeModule>>>,
}

impl CompiledUnit {
    pub fn new(name: impl Into<String>, kind: UnitKind) -> Self {
        Self {
            name: name.into(),
            kind,
            native: Mutex::new(None),
        }
    }

    /// Qualified unit name, `LIB.UNIT` or `LIB.UNIT-body`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    /// A package declaration; its subprograms are compiled into the body.
    pub fn is_package(&self) -> bool {
        self.kind == UnitKind::Package
    }

    pub fn artifact_name(&self) -> String {
        naming::artifact_name(&self.name)
    }

    /// The native module cached on this unit, if one was loaded.
    pub fn native(&self) -> Option<Arc<NativeModule>> {
        self.native.lock().clone()
    }

    pub fn set_native(&self, module: Arc<NativeModule>) {
        *self.native.lock() = Some(module);
    }
}

/// A named design library backed by a directory of artifacts.
#[derive(Debug)]
pub struct Library {
    name: String,
    dir: PathBuf,
    units: RwLock<FxHashMap<String, Arc<CompiledUnit>>>,
}

impl Library {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            units: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Add or replace a unit.
    pub fn put_unit(&self, unit: CompiledUnit) -> Arc<CompiledUnit> {
        let unit = Arc::new(unit);
        self.units
            .write()
            .insert(unit.name.clone(), Arc::clone(&unit));
        unit
    }

    pub fn get_unit(&self, name: &str) -> Option<Arc<CompiledUnit>> {
        self.units.read().get(name).cloned()
    }

    pub fn unit_count(&self) -> usize {
        self.units.read().len()
    }

    /// Absolute location of artifact `filename` in this library.
    pub fn realpath_of_artifact(&self, filename: &str) -> PathBuf {
        let path = self.dir.join(filename);
        std::path::absolute(&path).unwrap_or(path)
    }
}
