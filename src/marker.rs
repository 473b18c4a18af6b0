//! Once-per-trip posting guard backed by a one-line marker file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::publish::Publisher;

/// Plain-text file holding the timestamp of the last reported trip.
#[derive(Debug, Clone)]
pub struct MarkerFile {
    path: PathBuf,
}

impl MarkerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        MarkerFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last reported trip timestamp, or `None` when nothing has been
    /// reported yet or the file cannot be read.
    pub fn read(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Some(data.lines().next().unwrap_or("").trim().to_string()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no marker file yet");
                None
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "marker file unreadable, treating as absent"
                );
                None
            }
        }
    }

    pub fn write(&self, value: &str) -> Result<()> {
        fs::write(&self.path, value)
            .with_context(|| format!("Failed to write marker file {}", self.path.display()))
    }
}

/// What the guard did with a trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The trip matches the marker; nothing was posted.
    AlreadyReported,
    Posted,
    /// The marker was advanced but publishing failed.
    PostFailed(String),
}

/// Suppresses repeat posts for the same trip.
pub struct DuplicatePostGuard<'a> {
    marker: &'a MarkerFile,
}

impl<'a> DuplicatePostGuard<'a> {
    pub fn new(marker: &'a MarkerFile) -> Self {
        DuplicatePostGuard { marker }
    }

    /// Publish `text` unless `trip_timestamp` was already reported.
    ///
    /// The marker is written before publishing, so a failed or interrupted
    /// post is not retried on the next run. Publishing errors are swallowed;
    /// only a failure to write the marker is returned.
    pub fn report(
        &self,
        trip_timestamp: &str,
        text: &str,
        publisher: &dyn Publisher,
    ) -> Result<GuardOutcome> {
        let last = self.marker.read();
        if last.as_deref() == Some(trip_timestamp) {
            debug!(trip = trip_timestamp, "trip already reported");
            return Ok(GuardOutcome::AlreadyReported);
        }

        info!(previous = ?last, trip = trip_timestamp, "new trip, posting");
        self.marker.write(trip_timestamp)?;

        match publisher.publish(text) {
            Ok(()) => Ok(GuardOutcome::Posted),
            Err(e) => {
                warn!(error = %e, "post failed");
                Ok(GuardOutcome::PostFailed(e.to_string()))
            }
        }
    }
}
