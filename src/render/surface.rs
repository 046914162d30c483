//! Display surfaces
//!
//! A surface receives one complete document per render cycle and replaces
//! whatever it showed before. No incremental patching.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::utils::error::PreviewResult;

/// Receives whole rendered documents
pub trait DisplaySurface {
    fn replace(&mut self, document: String) -> PreviewResult<()>;
}

/// Keeps the latest document in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySurface {
    current: Option<String>,
    replacements: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The document currently shown
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// How many times the content was replaced
    pub fn replacements(&self) -> usize {
        self.replacements
    }
}

impl DisplaySurface for MemorySurface {
    fn replace(&mut self, document: String) -> PreviewResult<()> {
        self.current = Some(document);
        self.replacements += 1;
        Ok(())
    }
}

/// Writes each document to a file, swapping it in with a rename so readers
/// never observe a half-written page
#[derive(Debug, Clone)]
pub struct FileSurface {
    path: PathBuf,
}

impl FileSurface {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory the staging file is created in, next to the target
    fn staging_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl DisplaySurface for FileSurface {
    fn replace(&mut self, document: String) -> PreviewResult<()> {
        // The staging file is removed on drop if any step below fails.
        let mut staging = tempfile::Builder::new()
            .prefix(".mathmark-")
            .suffix(".html")
            .tempfile_in(self.staging_dir())?;
        staging.write_all(document.as_bytes())?;
        staging.flush()?;
        staging.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_memory_surface_replaces() {
        let mut surface = MemorySurface::new();
        assert!(surface.current().is_none());
        surface.replace("one".to_string()).unwrap();
        surface.replace("two".to_string()).unwrap();
        assert_eq!(surface.current(), Some("two"));
        assert_eq!(surface.replacements(), 2);
    }

    #[test]
    fn test_file_surface_writes_whole_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.html");
        let mut surface = FileSurface::new(&path);
        surface.replace("<html>first</html>".to_string()).unwrap();
        surface.replace("<html>second</html>".to_string()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<html>second</html>");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_file_surface_cleans_up_when_swap_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.html");
        fs::create_dir(&target).unwrap();

        let mut surface = FileSurface::new(&target);
        assert!(surface.replace("<html></html>".to_string()).is_err());

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("out.html")]);
        assert!(target.is_dir());
    }

    #[test]
    fn test_file_surface_relative_path_stages_in_cwd() {
        let surface = FileSurface::new("preview.html");
        assert_eq!(surface.staging_dir(), Path::new("."));
    }
}
