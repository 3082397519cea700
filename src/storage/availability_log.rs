//! Append-only availability log.
//!
//! One `device_id,timestamp,status` row per probe outcome. Rows are only ever
//! appended; nothing in this crate truncates, reorders, or rewrites them.
//!
//! A batch is written row by row. If an I/O error interrupts a batch, the rows
//! already written stay in the log, so readers must tolerate a cycle that is
//! only partially present.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::storage::{AvailabilityRecord, DeviceId, StorageError};

/// Column separator.
const DELIMITER: char = ',';

/// Column names written as the first row when the log keeps a header.
pub const HEADER_ROW: [&str; 3] = ["device_id", "timestamp", "status"];

/// A log row as stored, without type coercion.
pub type RawRow = Vec<String>;

/// Append-only store of [`AvailabilityRecord`] rows.
#[derive(Debug, Clone)]
pub struct AvailabilityLog {
    path: PathBuf,
    header: bool,
}

impl AvailabilityLog {
    /// Create a log backed by the file at `path`, without a header row.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            header: false,
        }
    }

    /// Treat the first row as a header.
    ///
    /// A header is written when the log is first created, and
    /// [`find_by_device_id`](Self::find_by_device_id) always returns it ahead
    /// of the matching rows.
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the first row is a header.
    pub fn has_header(&self) -> bool {
        self.header
    }

    /// Append `records` in order, one row each.
    ///
    /// The file is created if needed and opened in append mode; existing rows
    /// are never touched. An empty batch does not touch the file at all.
    ///
    /// # Errors
    /// Returns `StorageError::Io` if the file cannot be opened or written.
    pub fn append(&self, records: &[AvailabilityRecord]) -> Result<(), StorageError> {
        if records.is_empty() {
            return Ok(());
        }

        let io_err = |e| StorageError::io(&self.path, e);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        let is_new = file.metadata().map_err(io_err)?.len() == 0;

        let mut writer = BufWriter::new(file);
        if self.header && is_new {
            write_row(&mut writer, &HEADER_ROW).map_err(io_err)?;
        }
        for record in records {
            write_row(&mut writer, &record.to_row()).map_err(io_err)?;
        }
        writer.flush().map_err(io_err)?;

        tracing::debug!(
            path = %self.path.display(),
            rows = records.len(),
            "Availability records appended"
        );
        Ok(())
    }

    /// Read every row back as raw fields.
    ///
    /// An absent log has no rows yet and reads as empty. Blank lines are
    /// ignored.
    ///
    /// # Errors
    /// Returns `StorageError::Io` if the file exists but cannot be read.
    pub fn load_all(&self) -> Result<Vec<RawRow>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.split(DELIMITER).map(str::to_owned).collect())
            .collect())
    }

    /// Rows whose first column equals `id`.
    ///
    /// With a header configured the first row is returned unconditionally in
    /// front of the matches. Rows whose first column is not an integer are
    /// skipped.
    ///
    /// # Errors
    /// Returns `StorageError::Io` if the file exists but cannot be read.
    pub fn find_by_device_id(&self, id: DeviceId) -> Result<Vec<RawRow>, StorageError> {
        let mut rows = self.load_all()?.into_iter();
        let mut matched = Vec::new();

        if self.header {
            matched.extend(rows.next());
        }

        for row in rows {
            let Some(first) = row.first() else {
                continue;
            };
            match first.trim().parse::<DeviceId>() {
                Ok(device_id) if device_id == id => matched.push(row),
                Ok(_) => {}
                Err(_) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        column = %first,
                        "Skipping availability row with non-numeric device id"
                    );
                }
            }
        }

        Ok(matched)
    }
}

fn write_row<W: Write, S: AsRef<str>>(writer: &mut W, columns: &[S]) -> std::io::Result<()> {
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            write!(writer, "{DELIMITER}")?;
        }
        writer.write_all(column.as_ref().as_bytes())?;
    }
    writeln!(writer)
}
