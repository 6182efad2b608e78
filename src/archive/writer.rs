use std::fs::File;
use std::io::Write;
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::Result;

/// Thin wrapper around `ZipWriter`: forward-slash entry paths, UTF-8 text
/// content.
pub struct ZipSink {
    inner: ZipWriter<File>,
}

impl ZipSink {
    /// Create (or truncate) the archive file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self { inner: ZipWriter::new(file) })
    }

    pub fn write_text(&mut self, entry: &str, text: &str) -> Result<()> {
        self.inner.start_file(entry, SimpleFileOptions::default())?;
        self.inner.write_all(text.as_bytes())?;
        Ok(())
    }

    pub fn finish(self) -> Result<()> {
        self.inner.finish()?;
        Ok(())
    }
}
