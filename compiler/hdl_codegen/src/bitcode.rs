//! On-disk form of a [`NativeModule`].
//!
//! ```text
//! +-------+-----------+------------------------------+
//! | HDLBC | version   | bincode(NativeModule)        |
//! | 5 B   | u32 LE    | ...                          |
//! +-------+-----------+------------------------------+
//! ```
//!
//! The general code generator writes one artifact per compiled library
//! unit; folding only ever reads them.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::NativeModule;

pub const MAGIC: &[u8; 5] = b"HDLBC";
pub const FORMAT_VERSION: u32 = 1;

const HEADER_LEN: usize = MAGIC.len() + 4;

#[derive(Debug, Error)]
pub enum BitcodeError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: malformed bitcode: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
    #[error("{}: bitcode format version {found}, expected {}", path.display(), FORMAT_VERSION)]
    Version { path: PathBuf, found: u32 },
}

impl BitcodeError {
    /// The artifact the error concerns.
    pub fn path(&self) -> &Path {
        match self {
            BitcodeError::Io { path, .. }
            | BitcodeError::Malformed { path, .. }
            | BitcodeError::Version { path, .. } => path,
        }
    }
}

/// Serialize `module` into artifact bytes.
pub fn encode(module: &NativeModule) -> Result<Vec<u8>, bincode::Error> {
    let mut bytes = Vec::with_capacity(HEADER_LEN + 256);
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bincode::serialize_into(&mut bytes, module)?;
    Ok(bytes)
}

/// Parse artifact bytes; `path` is only used for error reporting.
pub fn decode(path: &Path, bytes: &[u8]) -> Result<NativeModule, BitcodeError> {
    let malformed = |reason: String| BitcodeError::Malformed {
        path: path.to_owned(),
        reason,
    };
    if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err(malformed("missing HDLBC header".to_owned()));
    }
    let mut version = [0u8; 4];
    version.copy_from_slice(&bytes[MAGIC.len()..HEADER_LEN]);
    let found = u32::from_le_bytes(version);
    if found != FORMAT_VERSION {
        return Err(BitcodeError::Version {
            path: path.to_owned(),
            found,
        });
    }
    bincode::deserialize(&bytes[HEADER_LEN..]).map_err(|e| malformed(e.to_string()))
}

pub fn read_bitcode(path: &Path) -> Result<NativeModule, BitcodeError> {
    let bytes = fs::read(path).map_err(|source| BitcodeError::Io {
        path: path.to_owned(),
        source,
    })?;
    let module = decode(path, &bytes)?;
    tracing::debug!(
        path = %path.display(),
        functions = module.functions.len(),
        "read bitcode"
    );
    Ok(module)
}

pub fn write_bitcode(path: &Path, module: &NativeModule) -> Result<(), BitcodeError> {
    let bytes = encode(module).map_err(|e| BitcodeError::Malformed {
        path: path.to_owned(),
        reason: e.to_string(),
    })?;
    fs::write(path, bytes).map_err(|source| BitcodeError::Io {
        path: path.to_owned(),
        source,
    })
}
