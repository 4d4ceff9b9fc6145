use crate::error::Result;
use crate::naming::UniqueNames;
use std::io::{Cursor, Write};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// Builds a zip archive in memory, one entry per artifact.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    names: UniqueNames,
    entries: usize,
}

/// Encoded images are already compressed, so entries are stored as-is
fn entry_options() -> FileOptions {
    FileOptions::default().compression_method(CompressionMethod::Stored)
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            names: UniqueNames::new(),
            entries: 0,
        }
    }

    /// Adds an entry and returns the name it was stored under
    pub fn add(&mut self, name: &str, bytes: &[u8]) -> Result<String> {
        let stored_name = self.names.claim(name);
        self.writer.start_file(stored_name.as_str(), entry_options())?;
        self.writer.write_all(bytes)?;
        self.entries += 1;
        Ok(stored_name)
    }

    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    pub fn finish(mut self) -> Result<Vec<u8>> {
        let cursor = self.writer.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}
