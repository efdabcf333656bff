//! Filesystem capability used to open config files.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// What the loader needs to know about a file besides its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileMetadata {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

/// An open config file. Closed when dropped.
pub trait ConfigFile: Read {
    fn metadata(&self) -> io::Result<FileMetadata>;
}

/// Where config files are read from.
pub trait FileSystem: Send + Sync {
    fn open(&self, path: &Path) -> io::Result<Box<dyn ConfigFile>>;

    fn metadata(&self, path: &Path) -> io::Result<FileMetadata>;
}

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl ConfigFile for File {
    fn metadata(&self) -> io::Result<FileMetadata> {
        File::metadata(self).map(|m| FileMetadata {
            modified: m.modified().ok(),
            len: m.len(),
        })
    }
}

impl FileSystem for OsFileSystem {
    fn open(&self, path: &Path) -> io::Result<Box<dyn ConfigFile>> {
        Ok(Box::new(File::open(path)?))
    }

    fn metadata(&self, path: &Path) -> io::Result<FileMetadata> {
        std::fs::metadata(path).map(|m| FileMetadata {
            modified: m.modified().ok(),
            len: m.len(),
        })
    }
}

/// An in-memory filesystem, for tests and embedded configs.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: BTreeMap<PathBuf, MemoryEntry>,
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    contents: Vec<u8>,
    modified: Option<SystemTime>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents, None);
        self
    }

    pub fn insert(
        &mut self,
        path: impl Into<PathBuf>,
        contents: impl Into<Vec<u8>>,
        modified: Option<SystemTime>,
    ) {
        self.files.insert(
            path.into(),
            MemoryEntry {
                contents: contents.into(),
                modified,
            },
        );
    }

    fn entry(&self, path: &Path) -> io::Result<&MemoryEntry> {
        self.files
            .get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }
}

struct MemoryFile {
    contents: Cursor<Vec<u8>>,
    metadata: FileMetadata,
}

impl Read for MemoryFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.contents.read(buf)
    }
}

impl ConfigFile for MemoryFile {
    fn metadata(&self) -> io::Result<FileMetadata> {
        Ok(self.metadata)
    }
}

impl FileSystem for MemoryFileSystem {
    fn open(&self, path: &Path) -> io::Result<Box<dyn ConfigFile>> {
        let entry = self.entry(path)?;
        Ok(Box::new(MemoryFile {
            contents: Cursor::new(entry.contents.clone()),
            metadata: entry.metadata(),
        }))
    }

    fn metadata(&self, path: &Path) -> io::Result<FileMetadata> {
        self.entry(path).map(MemoryEntry::metadata)
    }
}

impl MemoryEntry {
    fn metadata(&self) -> FileMetadata {
        FileMetadata {
            modified: self.modified,
            len: self.contents.len() as u64,
        }
    }
}
