//! # Script interpreter module
//!
//! This module provides an interpreter for timed scripts. A script is a text
//! file made up of entries of the form
//!
//! ```text
//! <time_s>: <json payload>;
//! ```
//!
//! Each payload is deserialised into the item type `T` when the script is
//! loaded, and released by `get_pending_at` once the given time passes the
//! entry's time. Lines starting with `#` are comments.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An item which is scripted to occur at a specific time.
struct Entry<T> {
    /// The time the item is supposed to be released at
    exec_time_s: f64,

    item: T,
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use `.get_pending_at`
/// to acquire a list of items that are due.
pub struct ScriptInterpreter<T> {
    script_path: PathBuf,
    entries: VecDeque<Entry<T>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)"
    )]
    InvalidTimestamp(String),

    #[error("Script entries must be in time order, found {1} s after {0} s")]
    OutOfOrder(f64, f64),

    #[error("Script contains an invalid entry at {0} s: {1}")]
    InvalidEntry(f64, serde_json::Error),
}

/// Items released by the interpreter on a given call to `get_pending_at`.
#[derive(Debug)]
pub enum Pending<T> {
    None,
    Some(Vec<T>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T> ScriptInterpreter<T>
where
    T: DeserializeOwned,
{
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = PathBuf::from(script_path.as_ref());

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        let script = fs::read_to_string(&path).map_err(ScriptError::ScriptLoadError)?;

        let mut interp = Self::from_str(&script)?;
        interp.script_path = path;

        Ok(interp)
    }

    /// Build an interpreter from the contents of a script.
    pub fn from_str(script: &str) -> Result<Self, ScriptError> {
        let mut entries: VecDeque<Entry<T>> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .expect("Script regex is invalid");

        for cap in re.captures_iter(script) {
            let time_str = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
            let exec_time_s: f64 = time_str
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            if let Some(prev) = entries.back() {
                if exec_time_s < prev.exec_time_s {
                    return Err(ScriptError::OutOfOrder(prev.exec_time_s, exec_time_s));
                }
            }

            // The scripts contain JSON only.
            let payload = cap.get(3).map(|m| m.as_str()).unwrap_or_default();
            let item: T = serde_json::from_str(payload)
                .map_err(|e| ScriptError::InvalidEntry(exec_time_s, e))?;

            entries.push_back(Entry { exec_time_s, item });
        }

        if entries.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(ScriptInterpreter {
            script_path: PathBuf::new(),
            entries,
        })
    }
}

impl<T> ScriptInterpreter<T> {
    /// Return the items which are due at the given time.
    pub fn get_pending_at(&mut self, current_time_s: f64) -> Pending<T> {
        // If the queue is empty the script is over
        if self.entries.is_empty() {
            return Pending::EndOfScript;
        }

        let mut items: Vec<T> = vec![];

        // Pop items from the queue while the head's exec time is lower than
        // the current time
        while self
            .entries
            .front()
            .map(|e| e.exec_time_s <= current_time_s)
            .unwrap_or(false)
        {
            if let Some(e) = self.entries.pop_front() {
                items.push(e.item);
            }
        }

        if items.is_empty() {
            Pending::None
        } else {
            Pending::Some(items)
        }
    }

    /// Get the number of items remaining in the script
    pub fn get_num_items(&self) -> usize {
        self.entries.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.entries.back() {
            Some(e) => e.exec_time_s,
            None => 0f64,
        }
    }

    /// Path the script was loaded from, empty if it was built from a string.
    pub fn script_path(&self) -> &Path {
        &self.script_path
    }
}
