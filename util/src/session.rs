//! Session management
//!
//! A session is one run of an executable. It owns a directory under
//! `<sw_root>/<sessions_dir>/` holding the run's log file and an `arch`
//! directory for CSV archives. The first session created in a process also
//! fixes the session epoch, which all log and archive timestamps are measured
//! from.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::{DateTime, Utc};
use conquer_once::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal imports
use crate::{host, time};

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static SESSION_EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// strftime format used in session directory names.
const DIR_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Name of the archive directory inside a session.
const ARCH_DIR_NAME: &str = "arch";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Paths belonging to the current run.
#[derive(Clone, Debug)]
pub struct Session {
    /// The directory of this run
    pub session_root: PathBuf,

    /// Archives are written below this directory
    pub arch_root: PathBuf,

    /// The run's log file
    pub log_file_path: PathBuf,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("The software root environment variable ({}) is not set", host::SW_ROOT_ENV_VAR)]
    SwRootNotSet,

    #[error("Cannot create the session directory: {0}")]
    CannotCreateDir(std::io::Error),

    #[error("A session has already been started in this process ({0})")]
    CannotInitEpoch(conquer_once::TryInitError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Start the session for this process.
    ///
    /// Creates `<sw_root>/<sessions_dir>/<exec_name>_<timestamp>/` and sets
    /// the session epoch. Only one session may be started per process.
    pub fn new(exec_name: &str, sessions_dir: &str) -> Result<Self, SessionError> {
        let epoch = Utc::now();
        SESSION_EPOCH
            .try_init_once(|| epoch)
            .map_err(SessionError::CannotInitEpoch)?;

        let sessions_root = host::get_sw_root()
            .map_err(|_| SessionError::SwRootNotSet)?
            .join(sessions_dir);

        Self::create(
            &sessions_root.join(format!("{}_{}", exec_name, epoch.format(DIR_TIMESTAMP_FORMAT))),
            exec_name,
        )
    }

    /// Lay out a session in an explicit directory without touching the epoch.
    ///
    /// Used where a process needs somewhere to write archives but does not
    /// own the session, for example tools and tests.
    pub fn create(session_root: &Path, exec_name: &str) -> Result<Self, SessionError> {
        let arch_root = session_root.join(ARCH_DIR_NAME);
        fs::create_dir_all(&arch_root).map_err(SessionError::CannotCreateDir)?;

        Ok(Session {
            session_root: session_root.to_path_buf(),
            arch_root,
            log_file_path: session_root.join(format!("{}.log", exec_name)),
        })
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Seconds since the session epoch.
///
/// Returns `0.0` if no session has been started, so library code can run
/// without one.
pub fn get_elapsed_seconds() -> f64 {
    match SESSION_EPOCH.get() {
        Some(e) => time::duration_to_seconds(Utc::now() - *e).unwrap_or(std::f64::NAN),
        None => 0.0,
    }
}

/// The session epoch, or `None` if no session has been started.
pub fn get_epoch() -> Option<&'static DateTime<Utc>> {
    SESSION_EPOCH.get()
}
