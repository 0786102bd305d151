// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Download sink writing artifacts into a directory.

use std::path::{Path, PathBuf};

use tracing::info;
use wasserzeichen_core::WasserzeichenError;
use wasserzeichen_export::{DownloadSink, hash_bytes, verify_hash};

/// Writes each artifact to `<dir>/<filename>` and re-reads it to confirm the
/// digest.
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, WasserzeichenError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, written: Vec::new() })
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl DownloadSink for DirectorySink {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<(), WasserzeichenError> {
        // Artifact names never carry directories.
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| WasserzeichenError::Io(std::io::Error::other(format!("bad file name: {filename}"))))?;
        let path = self.dir.join(name);
        std::fs::write(&path, bytes)?;
        verify_hash(&std::fs::read(&path)?, &hash_bytes(bytes))?;
        info!(path = %path.display(), size = bytes.len(), "artifact written");
        self.written.push(path);
        Ok(())
    }
}
