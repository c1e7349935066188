//! Append-only CSV log on the mounted card.
//!
//! Implements [`LogStorePort`].  Every append opens the file in append
//! mode, writes the full line in one call, flushes, syncs and closes, so a
//! power cut between cycles never leaves a handle open or earlier lines
//! rewritten.  ESP-IDF exposes the FAT volume through VFS, so the same
//! `std::fs` code runs on the device and on the host.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::app::ports::LogStorePort;
use crate::config::LoggerConfig;
use crate::error::StorageError;
use crate::record::CSV_HEADER;

/// errno for "no space left on device".
const ENOSPC: i32 = 28;

pub struct CsvLogStore {
    path: PathBuf,
    write_header: bool,
}

impl CsvLogStore {
    pub fn new(path: impl Into<PathBuf>, write_header: bool) -> Self {
        let path = path.into();
        info!("CsvLogStore: {} (header {})", path.display(), write_header);
        Self { path, write_header }
    }

    pub fn from_config(config: &LoggerConfig) -> Self {
        Self::new(config.log_path.as_str(), config.write_header)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> io::Result<File> {
        OpenOptions::new().create(true).append(true).open(&self.path)
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut file = self.open()?;

        let mut buf = String::with_capacity(CSV_HEADER.len() + line.len() + 2);
        if self.write_header && file.metadata()?.len() == 0 {
            debug!("CsvLogStore: new log, writing header");
            buf.push_str(CSV_HEADER);
            buf.push('\n');
        }
        buf.push_str(line);
        buf.push('\n');

        file.write_all(buf.as_bytes())?;
        file.flush()?;
        file.sync_data()
    }
}

impl LogStorePort for CsvLogStore {
    fn append(&mut self, line: &str) -> Result<(), StorageError> {
        self.write_line(line).map_err(storage_error)
    }
}

fn storage_error(e: io::Error) -> StorageError {
    if e.raw_os_error() == Some(ENOSPC) || e.kind() == io::ErrorKind::StorageFull {
        return StorageError::Full;
    }
    match e.kind() {
        io::ErrorKind::NotFound => StorageError::NotMounted,
        _ => StorageError::IoError,
    }
}
