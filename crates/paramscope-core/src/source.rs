//! Capabilities the catalog builder reads and parses through.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use paramscope_dts::{DtsFile, ParseError};

/// Trait for providing file content to the catalog builder.
/// This allows tests to run the pipeline against in-memory files.
pub trait ContentProvider {
    fn read_file(&self, path: &Path) -> Result<String, io::Error>;
}

/// Default implementation that reads from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemProvider;

impl ContentProvider for FileSystemProvider {
    fn read_file(&self, path: &Path) -> Result<String, io::Error> {
        fs::read_to_string(path)
    }
}

/// Files held in memory, keyed by the exact path they are requested under.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    files: HashMap<PathBuf, String>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }
}

impl ContentProvider for MemoryProvider {
    fn read_file(&self, path: &Path) -> Result<String, io::Error> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not loaded", path.display()),
            )
        })
    }
}

/// Turns declaration source text into a syntax tree.
pub trait DeclarationParser {
    fn parse(&self, src: &str) -> Result<DtsFile, ParseError>;
}

/// The recursive descent parser from `paramscope-dts`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DtsParser;

impl DeclarationParser for DtsParser {
    fn parse(&self, src: &str) -> Result<DtsFile, ParseError> {
        paramscope_dts::parse(src)
    }
}
