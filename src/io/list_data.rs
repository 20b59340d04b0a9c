//! `IListData` — directory browsing for `ListFiles`.
//!
//! Grounded on `original_source/src/io-base/UVFListData.h`'s
//! `IListData`/`UVFListData` pair; `DirListData` here plays the role
//! `UVFListData` does there, but walks the real filesystem instead of a
//! UVF container's internal table of contents.

use std::path::PathBuf;

use crate::core::error::Error;
use crate::wire::commands::DatasetKind;

/// One entry returned by [`IListData::list_data`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoData {
    pub name: String,
    pub file_id: String,
    pub kind: DatasetKind,
}

/// Answers "what datasets live under this id" for `ListFiles`.
pub trait IListData: Send + Sync {
    fn contains_io_data(&self, dir_or_file_id: &str) -> bool;
    fn list_data(&self, dir_id: &str) -> Result<Vec<IoData>, Error>;
}

/// Lists real filesystem directories, scoped under `root` so a `dirId`
/// can't escape the configured dataset directory.
pub struct DirListData {
    root: PathBuf,
}

impl DirListData {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, dir_id: &str) -> Result<PathBuf, Error> {
        let candidate = self.root.join(dir_id.trim_start_matches('/'));
        let canonical_root = self
            .root
            .canonicalize()
            .map_err(|e| Error::InvalidArgument(format!("dataset root unavailable: {e}")))?;
        let canonical = candidate
            .canonicalize()
            .map_err(|_| Error::InvalidArgument(format!("unknown dir id '{dir_id}'")))?;
        if !canonical.starts_with(&canonical_root) {
            return Err(Error::InvalidArgument(format!("dir id '{dir_id}' escapes dataset root")));
        }
        Ok(canonical)
    }
}

impl IListData for DirListData {
    fn contains_io_data(&self, dir_or_file_id: &str) -> bool {
        self.resolve(dir_or_file_id).map(|p| p.exists()).unwrap_or(false)
    }

    fn list_data(&self, dir_id: &str) -> Result<Vec<IoData>, Error> {
        let dir = self.resolve(dir_id)?;
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(Error::Io)? {
            let entry = entry.map_err(Error::Io)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let kind = if entry.file_type().map_err(Error::Io)?.is_dir() {
                DatasetKind::Directory
            } else {
                DatasetKind::Dataset
            };
            entries.push(IoData { file_id: name.clone(), name, kind });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_entries_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.uvf"), b"").unwrap();
        std::fs::write(dir.path().join("a.uvf"), b"").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let list = DirListData::new(dir.path());
        let entries = list.list_data(".").unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.clone()).collect();
        assert_eq!(names, vec!["a.uvf", "b.uvf", "sub"]);
        assert_eq!(entries[0].kind, DatasetKind::Dataset);
        assert_eq!(entries[0].file_id, "a.uvf");
        assert_eq!(entries[2].kind, DatasetKind::Directory);
    }

    #[test]
    fn rejects_dir_ids_that_escape_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let list = DirListData::new(dir.path());
        assert!(list.list_data("../../etc").is_err());
    }
}
