/// Where finished artifacts go.
///
/// A sink stands in for the browser's download mechanism: it accepts a file
/// name and bytes and reports nothing back beyond success or an I/O error.
use crate::error::{ConvertError, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub trait DownloadSink {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> Result<()>;
}

/// Writes each delivery into a directory, overwriting existing files.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    created: bool,
    delivered: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            created: false,
            delivered: Vec::new(),
        }
    }

    pub fn delivered(&self) -> &[PathBuf] {
        &self.delivered
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> Result<()> {
        if !self.created {
            fs::create_dir_all(&self.dir)
                .map_err(|_| ConvertError::DirectoryCreationFailed(self.dir.clone()))?;
            self.created = true;
        }

        // Source names come from user files; never let them escape the directory
        let file_name = Path::new(file_name)
            .file_name()
            .ok_or_else(|| ConvertError::InvalidFileName(file_name.to_string()))?;
        let path = self.dir.join(file_name);
        fs::write(&path, bytes)?;
        crate::verbose!("Wrote {:?} ({} bytes)", path, bytes.len());
        self.delivered.push(path);
        Ok(())
    }
}

/// Keeps deliveries in memory, in order.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub files: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<&str> {
        self.files.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl DownloadSink for MemorySink {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> Result<()> {
        self.files.push((file_name.to_string(), bytes.to_vec()));
        Ok(())
    }
}
