//! Table loader and writer.
//!
//! Every stage reads a comma separated file with a header row and writes its
//! tables back the same way. Two read modes exist: schema inference over the
//! whole file (Stage 1 profiling, Stage 3 training) and all-text (Stage 2,
//! where every value is handled by its written form).

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use tracing::{debug, info};

use crate::error::{ProcessingError, Result, ResultExt};

/// How column types are decided when a table is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Infer each column's type from all rows.
    Inferred,
    /// Read every column as text.
    Text,
}

impl ReadMode {
    fn infer_schema_length(self) -> Option<usize> {
        match self {
            ReadMode::Inferred => None,
            ReadMode::Text => Some(0),
        }
    }
}

/// Read a CSV file with a header row.
///
/// A missing file is reported as [`ProcessingError::InputNotFound`] so the
/// caller can tell it apart from a malformed file.
pub fn read_table(path: &Path, mode: ReadMode) -> Result<DataFrame> {
    if !path.exists() {
        return Err(ProcessingError::InputNotFound(path.display().to_string()));
    }

    debug!("Reading {} ({:?})", path.display(), mode);

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(mode.infer_schema_length())
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))
        .context(format!("Opening {}", path.display()))?
        .finish()
        .context(format!("Parsing {}", path.display()))?;

    if df.width() == 0 {
        return Err(ProcessingError::EmptyTable);
    }

    info!("Loaded {}: {:?}", path.display(), df.shape());
    Ok(df)
}

/// Read a CSV file inferring column types.
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    read_table(path, ReadMode::Inferred)
}

/// Read a CSV file keeping every column as text.
pub fn load_csv_as_text(path: &Path) -> Result<DataFrame> {
    read_table(path, ReadMode::Text)
}

/// Write a table as CSV with a header row, creating parent directories.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).context(format!("Creating {}", parent.display()))?;
    }

    let mut file = File::create(path).context(format!("Creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(df)
        .context(format!("Writing {}", path.display()))?;

    info!("Saved {}", path.display());
    Ok(())
}
