use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;
use std::fmt;
use std::io::Error;

pub const APP_TITLE: &str = "CSV Viewer & Search";

pub const HELP_TEXT: &str = "\
u        Upload a CSV file
d        Delete the loaded file
/ s      Edit the search query
Enter    Search for the query
↑ k ↓ j  Select previous / next result
PgUp     Select result one page up
PgDn     Select result one page down
Home End Select first / last result
y        Copy selected result as csv line
Esc      Close notifications and popups
?        Show this help
q        Quit";

#[derive(Debug, Clone, Setters)]
pub struct TSConfig {
    /// Milliseconds the controller waits for terminal events before emitting a tick.
    pub event_poll_time: u64,
    /// Milliseconds between two updates of the simulated upload progress.
    pub progress_step_time: u64,
    /// Milliseconds an error toast stays visible.
    pub toast_duration: u64,
}

impl Default for TSConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            progress_step_time: 100,
            toast_duration: 4000,
        }
    }
}

#[derive(Debug)]
pub enum Message {
    Quit,
    Tick,
    Resize(usize, usize),
    Upload,
    Delete,
    EditQuery,
    Search,
    MoveUp,
    MoveDown,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    CopyResult,
    Help,
    Exit,
    RawKey(KeyEvent),
}

/// Which prompt currently receives the raw key events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CMDMode {
    UploadPath,
    SearchQuery,
}

#[derive(Debug)]
pub enum TSError {
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed(String),
    MalformedData(String),
    Clipboard(String),
    InvalidArgument(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
    NoFileSelected,
    NothingToDelete,
    NoDataLoaded,
    EmptyQuery,
}

impl fmt::Display for TSError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TSError::IoError(e) => write!(f, "{e}"),
            TSError::PolarsError(e) => write!(f, "{e}"),
            TSError::LoadingFailed(msg) => write!(f, "{msg}"),
            TSError::MalformedData(msg) => write!(f, "malformed data: {msg}"),
            TSError::Clipboard(msg) => write!(f, "clipboard unavailable: {msg}"),
            TSError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            TSError::FileNotFound => write!(f, "file not found"),
            TSError::PermissionDenied => write!(f, "permission denied"),
            TSError::UnknownFileType => write!(f, "Invalid file type. Please upload a CSV file."),
            TSError::NoFileSelected => write!(f, "No file selected."),
            TSError::NothingToDelete => write!(f, "No file to delete!"),
            TSError::NoDataLoaded => write!(f, "Please upload a CSV file first!"),
            TSError::EmptyQuery => write!(f, "Search query cannot be empty!"),
        }
    }
}

impl TSError {
    /// Errors caused by user input, shown without further context.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            TSError::UnknownFileType
                | TSError::NoFileSelected
                | TSError::NothingToDelete
                | TSError::NoDataLoaded
                | TSError::EmptyQuery
        )
    }
}

impl std::error::Error for TSError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TSError::IoError(e) => Some(e),
            TSError::PolarsError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Error> for TSError {
    fn from(err: Error) -> Self {
        TSError::IoError(err)
    }
}

impl From<PolarsError> for TSError {
    fn from(err: PolarsError) -> Self {
        TSError::PolarsError(err)
    }
}
