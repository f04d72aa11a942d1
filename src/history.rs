//! Version-control history as a fallback source of document metadata.
//!
//! When a document does not declare a date or an author, the file's git
//! history usually knows: the last commit touching the file gives a
//! modification timestamp, a calendar date, and an author name.
//!
//! The pipeline only sees the [`HistoryOracle`] trait. Two implementations
//! ship with the crate:
//!
//! - [`GitHistory`] shells out to `git log` with a bounded timeout.
//! - [`NoHistory`] answers nothing; used when the fallback is disabled
//!   (config, `FOLIO_DISABLE_GIT_FALLBACK`, export/CI builds).
//!
//! An oracle never fails. Every problem collapses to `None`. A file that is
//! simply not tracked is the expected case and stays silent; spawn errors,
//! unexpected git failures and timeouts are logged as warnings.

use chrono::{DateTime, FixedOffset, NaiveDate};
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{trace, warn};

/// A fact the oracle can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryFact {
    /// Full timestamp of the last commit touching the file.
    LastCommitTimestamp,
    /// Calendar date of the last commit, in the committer's offset.
    LastCommitDate,
    /// Author name of the last commit.
    LastCommitAuthor,
}

/// Answer to a [`HistoryFact`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryValue {
    Timestamp(DateTime<FixedOffset>),
    Date(NaiveDate),
    Author(String),
}

/// Source of per-file history facts.
pub trait HistoryOracle {
    /// Resolve `fact` for the file at `path`, or `None` when unknown.
    fn resolve(&self, path: &Path, fact: HistoryFact) -> Option<HistoryValue>;

    fn last_commit_timestamp(&self, path: &Path) -> Option<DateTime<FixedOffset>> {
        match self.resolve(path, HistoryFact::LastCommitTimestamp)? {
            HistoryValue::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    fn last_commit_date(&self, path: &Path) -> Option<NaiveDate> {
        match self.resolve(path, HistoryFact::LastCommitDate)? {
            HistoryValue::Date(date) => Some(date),
            HistoryValue::Timestamp(ts) => Some(ts.date_naive()),
            HistoryValue::Author(_) => None,
        }
    }

    fn last_commit_author(&self, path: &Path) -> Option<String> {
        match self.resolve(path, HistoryFact::LastCommitAuthor)? {
            HistoryValue::Author(name) => Some(name),
            _ => None,
        }
    }
}

/// Oracle that never knows anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl HistoryOracle for NoHistory {
    fn resolve(&self, _path: &Path, _fact: HistoryFact) -> Option<HistoryValue> {
        None
    }
}

#[derive(Error, Debug)]
enum HistoryError {
    /// File is outside a repository or has no commits. Expected.
    #[error("no tracked history")]
    Untracked,
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("git exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("git did not finish within {0:?}")]
    Timeout(Duration),
    #[error("unparseable git output: {0:?}")]
    Parse(String),
}

impl HistoryError {
    fn is_expected(&self) -> bool {
        matches!(self, HistoryError::Untracked)
    }
}

/// Oracle backed by the `git` command line.
///
/// Each query is a separate `git log -1` invocation run from the file's
/// directory, so files in nested repositories and submodules resolve
/// against the right history.
#[derive(Debug, Clone)]
pub struct GitHistory {
    program: String,
    timeout: Duration,
}

const POLL_INTERVAL: Duration = Duration::from_millis(5);

impl GitHistory {
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: "git".to_string(),
            timeout,
        }
    }

    /// Use a different executable in place of `git`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn query(&self, path: &Path, fact: HistoryFact) -> Result<HistoryValue, HistoryError> {
        let format = match fact {
            HistoryFact::LastCommitTimestamp | HistoryFact::LastCommitDate => "--format=%cI",
            HistoryFact::LastCommitAuthor => "--format=%an",
        };
        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file = path.file_name().ok_or(HistoryError::Untracked)?;

        let mut child = Command::new(&self.program)
            .arg("-C")
            .arg(dir)
            .args(["log", "-1", format, "--"])
            .arg(file)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = wait_with_timeout(&mut child, self.timeout)?;
        let line = stdout.trim();
        if line.is_empty() {
            return Err(HistoryError::Untracked);
        }

        match fact {
            HistoryFact::LastCommitAuthor => Ok(HistoryValue::Author(line.to_string())),
            HistoryFact::LastCommitTimestamp => parse_timestamp(line).map(HistoryValue::Timestamp),
            HistoryFact::LastCommitDate => {
                parse_timestamp(line).map(|ts| HistoryValue::Date(ts.date_naive()))
            }
        }
    }
}

impl HistoryOracle for GitHistory {
    fn resolve(&self, path: &Path, fact: HistoryFact) -> Option<HistoryValue> {
        match self.query(path, fact) {
            Ok(value) => Some(value),
            Err(e) if e.is_expected() => {
                trace!(path = %path.display(), ?fact, "no git history");
                None
            }
            Err(e) => {
                warn!(path = %path.display(), ?fact, error = %e, "git history lookup failed");
                None
            }
        }
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, HistoryError> {
    DateTime::parse_from_rfc3339(raw).map_err(|_| HistoryError::Parse(raw.to_string()))
}

/// Wait for `child` to exit, killing it once `timeout` has elapsed.
///
/// Returns stdout on success. A non-zero exit whose stderr says the path
/// is not in a repository counts as untracked, not as a failure.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<String, HistoryError> {
    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            // The child may have exited between the two checks; either way
            // it must be reaped before returning.
            let _ = child.kill();
            let _ = child.wait();
            return Err(HistoryError::Timeout(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    };

    let mut stdout = String::new();
    if let Some(mut pipe) = child.stdout.take() {
        pipe.read_to_string(&mut stdout)?;
    }
    let mut stderr = String::new();
    if let Some(mut pipe) = child.stderr.take() {
        pipe.read_to_string(&mut stderr)?;
    }

    if status.success() {
        return Ok(stdout);
    }
    if is_untracked_stderr(&stderr) {
        return Err(HistoryError::Untracked);
    }
    Err(HistoryError::Failed {
        status: status.to_string(),
        stderr: stderr.trim().to_string(),
    })
}

fn is_untracked_stderr(stderr: &str) -> bool {
    let stderr = stderr.to_ascii_lowercase();
    stderr.contains("not a git repository")
        || stderr.contains("does not have any commits")
        || stderr.contains("unknown revision")
        || stderr.contains("outside repository")
}
