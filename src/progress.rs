use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::trace;

/// Number of progress updates shown before a file is loaded: 0%, 10%, ..., 100%.
pub const PROGRESS_STEPS: u16 = 11;

/// Cosmetic upload progress. It is not tied to the bytes read, it only walks
/// through a fixed number of steps before the file gets parsed.
#[derive(Debug)]
pub struct UploadProgress {
    path: PathBuf,
    steps: u16,
    step_time: Duration,
    last_step: Instant,
}

impl UploadProgress {
    pub fn start(path: PathBuf, step_time: Duration) -> Self {
        Self {
            path,
            steps: 0,
            step_time,
            last_step: Instant::now(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of updates emitted so far.
    pub fn steps(&self) -> u16 {
        self.steps
    }

    pub fn percent(&self) -> u16 {
        self.steps.saturating_sub(1).min(PROGRESS_STEPS - 1) * 10
    }

    pub fn is_complete(&self) -> bool {
        self.steps >= PROGRESS_STEPS
    }

    /// Emits the next update if the step time has passed. Returns true if an update happened.
    pub fn advance(&mut self, now: Instant) -> bool {
        if self.is_complete() || now.duration_since(self.last_step) < self.step_time {
            return false;
        }
        self.steps += 1;
        self.last_step = now;
        trace!("Upload progress {}% for {:?}", self.percent(), self.path);
        true
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}
