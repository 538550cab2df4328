//! Storage layer for taskman
//!
//! All state lives in plain text files inside a single data directory:
//!
//! ```text
//! <data-dir>/
//!   .taskman.toml        # Optional configuration
//!   tasks.txt            # One task per line
//!   user.txt             # One user per line
//!   task_overview.txt    # Generated report (overwritten)
//!   user_overview.txt    # Generated report (overwritten)
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::StorageConfig;
use crate::error::{Error, Result};

/// Storage manager for taskman state
#[derive(Debug, Clone)]
pub struct Storage {
    /// Data directory holding every backing file
    root: PathBuf,
    tasks_file: String,
    users_file: String,
    atomic_writes: bool,
}

impl Storage {
    /// Create a storage manager rooted at `root`
    pub fn new(root: PathBuf, config: &StorageConfig) -> Self {
        Self {
            root,
            tasks_file: config.tasks_file.trim().to_string(),
            users_file: config.users_file.trim().to_string(),
            atomic_writes: config.atomic_writes,
        }
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    /// Path to the task records file
    pub fn tasks_file(&self) -> PathBuf {
        self.root.join(&self.tasks_file)
    }

    /// Path to the user records file
    pub fn users_file(&self) -> PathBuf {
        self.root.join(&self.users_file)
    }

    // =========================================================================
    // Line-oriented I/O
    // =========================================================================

    /// Read every line of `path`.
    ///
    /// Returns `None` when the file does not exist; callers treat that as an
    /// empty collection.
    pub fn read_lines(&self, path: &Path) -> Result<Option<Vec<String>>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(content.lines().map(str::to_string).collect()))
    }

    /// Append a single line, creating the file if needed.
    ///
    /// A newline is inserted first when the existing file does not end with
    /// one, so the record always starts on its own line.
    pub fn append_line(&self, path: &Path, line: &str) -> Result<()> {
        self.append_line_inner(path, line).map_err(|source| Error::StorageWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    fn append_line_inner(&self, path: &Path, line: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        let needs_newline = if file.metadata()?.len() == 0 {
            false
        } else {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1))?;
            file.read_exact(&mut last)?;
            last[0] != b'\n'
        };

        let mut buffer = String::with_capacity(line.len() + 2);
        if needs_newline {
            buffer.push('\n');
        }
        buffer.push_str(line);
        buffer.push('\n');
        file.write_all(buffer.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    /// Replace the whole content of `path` with `lines`.
    ///
    /// With atomic writes enabled the data goes to a temp file in the same
    /// directory which is then renamed over the target, so a failed rewrite
    /// leaves the previous content in place.
    pub fn write_lines(&self, path: &Path, lines: &[String]) -> Result<()> {
        let mut data = String::new();
        for line in lines {
            data.push_str(line);
            data.push('\n');
        }

        let written = if self.atomic_writes {
            self.write_atomic(path, data.as_bytes())
        } else {
            self.write_in_place(path, data.as_bytes())
        };
        written.map_err(|source| Error::StorageWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write data atomically using temp file + rename
    fn write_atomic(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let mut temp = NamedTempFile::new_in(&parent)?;
        temp.write_all(data)?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|err| err.error)?;
        Ok(())
    }

    fn write_in_place(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        file.write_all(data)?;
        file.sync_all()?;
        Ok(())
    }
}
