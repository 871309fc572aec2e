//! Resolves a dotted module descriptor (`kush.core`) to a cached,
//! parsed `.am` artifact.
//!
//! One `ModuleLoader` is built per driver invocation and handed to the
//! analyzer; its cache is write-once per descriptor (spec.md §5: "the
//! module-loader cache is populated the first time a descriptor is
//! resolved and never invalidated within one run").

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{LoaderError, LoaderResult};
use crate::format::{self, LoadedModule};

/// Looks up and parses `.am` artifacts from a fixed list of search
/// directories, caching the result under its descriptor.
#[derive(Debug, Default)]
pub struct ModuleLoader {
    search_dirs: Vec<PathBuf>,
    cache: DashMap<String, Arc<LoadedModule>>,
}

impl ModuleLoader {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self {
            search_dirs,
            cache: DashMap::new(),
        }
    }

    /// Converts a dotted descriptor (`kush.core`) into the relative
    /// artifact path it names (`kush/core.am`) — the inverse of spec.md
    /// §6's "package name is derived from its path by replacing every
    /// `/` with `.`".
    pub fn descriptor_to_relative_path(descriptor: &str) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in descriptor.split('.') {
            path.push(segment);
        }
        path.set_extension("am");
        path
    }

    /// Resolves `descriptor` against the search directories. A missing
    /// file is not an error — it returns `Ok(None)` and the caller (the
    /// analyzer) decides whether that omission is itself an error
    /// (spec.md §4.7: "a missing file returns null without error; the
    /// caller decides whether that is itself an error").
    pub fn resolve(&self, descriptor: &str) -> LoaderResult<Option<Arc<LoadedModule>>> {
        if let Some(cached) = self.cache.get(descriptor) {
            return Ok(Some(Arc::clone(&cached)));
        }

        let relative = Self::descriptor_to_relative_path(descriptor);
        let Some(found_path) = self.find_in_search_dirs(&relative) else {
            return Ok(None);
        };

        let module = self.load_from_path(&found_path)?;
        let module = Arc::new(module);
        self.cache.insert(descriptor.to_string(), Arc::clone(&module));
        Ok(Some(module))
    }

    fn find_in_search_dirs(&self, relative: &Path) -> Option<PathBuf> {
        self.search_dirs
            .iter()
            .map(|dir| dir.join(relative))
            .find(|candidate| candidate.is_file())
    }

    fn load_from_path(&self, path: &Path) -> LoaderResult<LoadedModule> {
        let bytes = fs::read(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        format::parse_module(&bytes, path)
    }
}
