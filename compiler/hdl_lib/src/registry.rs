//! Library lookup by name.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Library;

/// Locates design libraries by name.
pub trait LibraryService {
    /// `None` when no library of that name exists or it is not yet
    /// available.
    fn find_library(&self, name: &str) -> Option<Arc<Library>>;
}

/// In-memory set of libraries registered by the driver.
#[derive(Debug, Default)]
pub struct LibraryRegistry {
    libraries: RwLock<FxHashMap<String, Arc<Library>>>,
}

impl LibraryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, library: Library) -> Arc<Library> {
        let library = Arc::new(library);
        tracing::debug!(
            library = library.name(),
            dir = %library.dir().display(),
            "registered library"
        );
        self.libraries
            .write()
            .insert(library.name().to_owned(), Arc::clone(&library));
        library
    }

    pub fn len(&self) -> usize {
        self.libraries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.read().is_empty()
    }
}

impl LibraryService for LibraryRegistry {
    fn find_library(&self, name: &str) -> Option<Arc<Library>> {
        self.libraries.read().get(name).cloned()
    }
}
