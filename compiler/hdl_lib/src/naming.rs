//! Qualified-name conventions.
//!
//! Declarations are named `LIB.UNIT.ITEM`; a library unit is named
//! `LIB.UNIT`. A package's body is stored as a separate unit under the
//! package name with a `-body` suffix.

/// Owning library of a qualified name: everything before the first `.`.
pub fn library_of(qualified: &str) -> &str {
    qualified.split_once('.').map_or(qualified, |(lib, _)| lib)
}

/// Owning unit of a qualified name: everything before the last `.`.
pub fn unit_of(qualified: &str) -> &str {
    qualified.rsplit_once('.').map_or(qualified, |(unit, _)| unit)
}

/// Name of the body unit of package `unit`.
pub fn body_of(unit: &str) -> String {
    format!("{unit}-body")
}

/// File name of the bitcode artifact of `unit` within its library
/// directory.
pub fn artifact_name(unit: &str) -> String {
    format!("_{unit}.bc")
}
