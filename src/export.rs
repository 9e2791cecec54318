use std::fs;
use std::io::Write;
use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::debug;

use crate::data::{Dataset, Row};
use crate::error::ExportError;
use crate::ExportOptions;

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
pub const EXPORT_CONTENT_TYPE: &str = "text/csv";

/// Encode columns and rows as BOM-prefixed, fully quoted, LF-separated text.
///
/// Every field is quoted and embedded quotes are doubled. Null or missing
/// cells become an empty quoted field. Rows are joined by a single `\n` with
/// none after the last row; a table without rows still ends its header line.
pub fn serialize(columns: &[String], rows: &[Row]) -> Result<Vec<u8>, ExportError> {
    let mut out = Vec::with_capacity(UTF8_BOM.len() + 16 * (rows.len() + 1) * columns.len());
    out.extend_from_slice(UTF8_BOM);
    serialize_to(&mut out, columns, rows)?;
    Ok(out)
}

/// Same encoding as [`serialize`] without the byte-order mark.
pub fn serialize_to<W: Write>(writer: W, columns: &[String], rows: &[Row]) -> Result<(), ExportError> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .double_quote(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(TrimFinalNewline::new(writer, !rows.is_empty()));

    wtr.write_record(columns)?;
    for row in rows {
        wtr.write_record(columns.iter().map(|col| Dataset::cell(row, col).field().into_owned()))?;
    }
    wtr.flush()?;

    let inner = wtr.into_inner().map_err(|e| ExportError::Io(e.into_error()))?;
    inner.finish()?;
    Ok(())
}

/// Holds back one trailing `\n` so the last record is not terminated.
struct TrimFinalNewline<W: Write> {
    inner: W,
    trim: bool,
    pending: bool,
}

impl<W: Write> TrimFinalNewline<W> {
    fn new(inner: W, trim: bool) -> Self {
        Self {
            inner,
            trim,
            pending: false,
        }
    }

    fn finish(mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write> Write for TrimFinalNewline<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if !self.trim {
            return self.inner.write(buf);
        }
        if self.pending {
            self.inner.write_all(b"\n")?;
            self.pending = false;
        }
        match buf.split_last() {
            Some((b'\n', head)) => {
                self.inner.write_all(head)?;
                self.pending = true;
            }
            _ => self.inner.write_all(buf)?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// A serialized dataset ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    /// Write the bytes to `path`, or to `path/<name>` when `path` is a directory.
    pub fn write_to(&self, path: &Path) -> Result<std::path::PathBuf, ExportError> {
        let target = if path.is_dir() {
            path.join(&self.name)
        } else {
            path.to_path_buf()
        };
        fs::write(&target, &self.bytes)?;
        Ok(target)
    }
}

/// Serialize `dataset` into a named file, falling back to the configured default name.
pub fn export_dataset(
    dataset: &Dataset,
    name: Option<&str>,
    options: &ExportOptions,
) -> Result<ExportFile, ExportError> {
    let name = match name {
        Some(n) if !n.trim().is_empty() => n.to_string(),
        _ => options.filename.clone(),
    };
    let bytes = serialize(dataset.columns(), dataset.rows())?;
    debug!(name = %name, bytes = bytes.len(), "dataset serialized");

    Ok(ExportFile {
        name,
        content_type: EXPORT_CONTENT_TYPE,
        bytes,
    })
}
