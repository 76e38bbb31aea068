use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::sequence::domain::sequence::Sequence;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed sequence data in {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },
    #[error("failed to encode sequence: {0}")]
    Encode(#[source] bincode::Error),
}

/// Binary persistence for landmark sequences.
///
/// The on-disk format is the bincode encoding of the Sequence tree,
/// version-less by design: the schema is the data model itself.
pub struct SequenceStore;

impl SequenceStore {
    /// Loads a sequence, reconstructing frame order exactly as persisted.
    ///
    /// Fails on unreadable paths and malformed byte streams; never
    /// returns a partially populated sequence.
    pub fn load(path: &Path) -> Result<Sequence, StoreError> {
        let bytes = fs::read(path).map_err(|e| StoreError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        bincode::deserialize(&bytes).map_err(|e| StoreError::Decode {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Saves a sequence, replacing the target's full contents.
    ///
    /// Writes to a `.part` sibling first, then renames over the target,
    /// so readers never observe a half-written file.
    pub fn save(sequence: &Sequence, path: &Path) -> Result<(), StoreError> {
        let bytes = bincode::serialize(sequence).map_err(StoreError::Encode)?;

        let temp_path = path.with_extension("part");
        fs::write(&temp_path, &bytes).map_err(|e| StoreError::Write {
            path: temp_path.clone(),
            source: e,
        })?;
        fs::rename(&temp_path, path).map_err(|e| StoreError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
