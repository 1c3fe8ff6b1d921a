use polars::prelude::*;
use rayon::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument, trace};

use crate::domain::TSError;
use crate::search::{SearchQuery, SearchResultSet};

/// Display string of a missing value.
pub const NULL_MARKER: &str = "∅";

const CSV_SUFFIX: &str = ".csv";

#[derive(Debug)]
pub struct FileInfo {
    path: PathBuf,
    file_size: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: Vec<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, data: Vec<String>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn as_string(&self) -> String {
        format!("\"{}\", # rows {}", self.name, self.data.len())
    }
}

/// An in-memory table where every cell is kept as its display string.
#[derive(Debug)]
pub struct Dataset {
    name: String,
    file_info: Option<FileInfo>,
    columns: Vec<Column>,
    nrows: usize,
}

impl Dataset {
    /// True if the file name carries the csv suffix.
    pub fn is_csv(path: &Path) -> bool {
        path.file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|name| name.ends_with(CSV_SUFFIX))
    }

    #[instrument(level = "debug")]
    pub fn load(path: PathBuf) -> Result<Self, TSError> {
        let file_info = Self::get_file_info(path)?;
        if !Self::is_csv(&file_info.path) {
            return Err(TSError::UnknownFileType);
        }

        let start_time = Instant::now();
        let df = Self::load_csv(&file_info.path)?.collect()?;
        if df.width() == 0 {
            return Err(TSError::LoadingFailed("file contains no columns".into()));
        }

        // Every column is cast to strings in its own rayon task.
        let c_: Result<Vec<Column>, PolarsError> = df
            .get_column_names()
            .par_iter()
            .map(|name| Self::load_column(&df, name))
            .collect();
        let columns = c_?;

        info!(
            "Loading {:?} ({} bytes) took {}ms ...",
            file_info.path,
            file_info.file_size,
            start_time.elapsed().as_millis()
        );
        for c in columns.iter() {
            debug!("Column: {}", c.as_string());
        }

        let name = file_info
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("???")
            .to_string();
        let mut dataset = Self::from_columns(name, columns)?;
        dataset.file_info = Some(file_info);
        Ok(dataset)
    }

    /// Builds a dataset from named columns of display strings.
    pub fn from_columns(name: impl Into<String>, columns: Vec<Column>) -> Result<Self, TSError> {
        let nrows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        if let Some(c) = columns.iter().find(|c| c.data.len() != nrows) {
            return Err(TSError::MalformedData(format!(
                "column \"{}\" has {} rows, expected {}",
                c.name,
                c.data.len(),
                nrows
            )));
        }
        Ok(Self {
            name: name.into(),
            file_info: None,
            columns,
            nrows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.file_info.as_ref().map(|f| f.path.as_path())
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Column name and cell value pairs of a row, in column order.
    pub fn row(&self, ridx: usize) -> Option<Vec<(&str, &str)>> {
        if ridx >= self.nrows {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|c| (c.name.as_str(), c.data[ridx].as_str()))
                .collect(),
        )
    }

    /// Scans every row and keeps those where any cell contains the query.
    #[instrument(level = "trace", skip(self), fields(dataset = %self.name))]
    pub fn search(&self, query: &SearchQuery) -> Result<SearchResultSet, TSError> {
        if let Some(c) = self.columns.iter().find(|c| c.data.len() != self.nrows) {
            return Err(TSError::MalformedData(format!(
                "column \"{}\" is out of shape",
                c.name
            )));
        }

        let start_time = Instant::now();
        let rows: Vec<usize> = (0..self.nrows)
            .into_par_iter()
            .filter(|&ridx| self.columns.iter().any(|c| query.matches(&c.data[ridx])))
            .collect();

        trace!(
            "Search for \"{}\" found {} matching rows in {}ms",
            query.as_str(),
            rows.len(),
            start_time.elapsed().as_millis()
        );
        Ok(SearchResultSet::new(query.clone(), rows))
    }

    fn load_column(df: &DataFrame, col_name: &str) -> Result<Column, PolarsError> {
        let col = df.column(col_name)?.cast(&DataType::String)?;
        let series = col.str()?;
        let data = series
            .into_iter()
            .map(|value| match value {
                Some(s) => s.to_string(),
                None => NULL_MARKER.to_string(),
            })
            .collect();

        Ok(Column {
            name: col_name.to_string(),
            data,
        })
    }

    fn get_file_info(path: PathBuf) -> Result<FileInfo, TSError> {
        let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TSError::FileNotFound,
            ErrorKind::PermissionDenied => TSError::PermissionDenied,
            _ => TSError::IoError(e),
        })?;
        if !metadata.is_file() {
            return Err(TSError::LoadingFailed("Not a file!".into()));
        }

        Ok(FileInfo {
            path,
            file_size: metadata.len(),
        })
    }

    fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
        LazyCsvReader::new(PlPath::Local(path.into()))
            .with_has_header(true)
            .with_infer_schema_length(None)
            .finish()
    }
}

#[cfg(test)]
impl Dataset {
    /// Skips the shape check of `from_columns`.
    pub(crate) fn from_columns_unchecked(name: &str, columns: Vec<Column>, nrows: usize) -> Self {
        Self {
            name: name.to_string(),
            file_info: None,
            columns,
            nrows,
        }
    }
}
