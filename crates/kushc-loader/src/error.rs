//! Errors the module loader can raise while resolving or parsing an
//! `.am` artifact. Modeled after the teacher's `thiserror`-per-crate
//! convention (`kushc-util::error`'s `SymbolError`/`SourceMapError`).

use std::path::PathBuf;
use thiserror::Error;

/// The compiler's own format major version. An artifact whose major
/// version differs is a hard failure — the reader cannot safely
/// interpret a layout it was not built to understand.
pub const CURRENT_MAJOR: u16 = 1;
/// The compiler's own format minor version. An artifact with the same
/// major but a newer minor is a soft failure: the layout is understood
/// as far as this reader goes, but the artifact may carry fields newer
/// than this reader knows about, so the load is refused without taking
/// down the whole run (spec.md §9, "unknown minors as soft failure").
pub const CURRENT_MINOR: u16 = 0;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("{path}: corrupted module artifact ({reason})")]
    CorruptedBinaryEntity { path: PathBuf, reason: String },

    /// `hard` distinguishes a major-version mismatch (unreadable at any
    /// confidence) from a minor-version mismatch (readable, but newer
    /// than this compiler knows about).
    #[error(
        "{path}: incompatible module artifact version {found_major}.{found_minor} \
         (this compiler supports {CURRENT_MAJOR}.{CURRENT_MINOR})"
    )]
    InvalidFebVersion {
        path: PathBuf,
        found_major: u16,
        found_minor: u16,
        hard: bool,
    },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoaderError {
    pub fn path(&self) -> &PathBuf {
        match self {
            LoaderError::CorruptedBinaryEntity { path, .. } => path,
            LoaderError::InvalidFebVersion { path, .. } => path,
            LoaderError::Io { path, .. } => path,
        }
    }

    /// Whether this failure should abort the whole driver run rather
    /// than merely failing this one import (spec.md §9's hard/soft split
    /// applies only to version mismatches; corruption and I/O are
    /// always hard).
    pub fn is_hard(&self) -> bool {
        match self {
            LoaderError::CorruptedBinaryEntity { .. } | LoaderError::Io { .. } => true,
            LoaderError::InvalidFebVersion { hard, .. } => *hard,
        }
    }
}

pub type LoaderResult<T> = Result<T, LoaderError>;
