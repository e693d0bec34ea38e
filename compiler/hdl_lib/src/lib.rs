//! Design libraries as seen by elaboration-time folding.
//!
//! A [`Library`] maps qualified unit names to [`CompiledUnit`]s and owns
//! the directory their artifacts live in. Each unit carries a cache slot
//! for its native module so an artifact is read from disk at most once.
//! [`LibraryService`] is the lookup seam; [`LibraryRegistry`] is the
//! in-memory implementation the driver populates.

mod library;
pub mod naming;
mod registry;

pub use library::{CompiledUnit, Library, UnitKind};
pub use registry::{LibraryRegistry, LibraryService};
