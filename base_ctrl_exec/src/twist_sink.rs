//! # Twist sinks
//!
//! Destinations for the velocity commands produced by the controller. The
//! control loop hands every command it produces to each configured sink.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{info, warn};
use serde::Serialize;

use crate::axes::Twist;
use util::{
    archive::{ArchiveError, Archived, Archiver},
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Something which consumes velocity commands.
pub trait TwistSink {
    /// Consume one velocity command.
    fn send(&mut self, twist: &Twist);
}

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Logs commands, but only when they change.
#[derive(Default)]
pub struct LogSink {
    last: Option<Twist>,
}

/// Writes every command into a CSV archive in the session directory.
pub struct ArchiveSink {
    arch: Archiver,

    /// Records waiting to be written by `Archived::write`
    pending: Vec<TwistRecord>,
}

/// A single archived command.
#[derive(Debug, Clone, Copy, Serialize)]
struct TwistRecord {
    /// Session time of the command
    time_s: f64,

    linear_x: f64,
    linear_y: f64,
    linear_z: f64,
    angular_x: f64,
    angular_y: f64,
    angular_z: f64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TwistSink for LogSink {
    fn send(&mut self, twist: &Twist) {
        if self.last.as_ref() == Some(twist) {
            return;
        }

        if twist.is_zero() {
            info!("Commanding zero twist");
        } else {
            info!(
                "Commanding twist: lin [{:.03}, {:.03}, {:.03}] m/s, ang [{:.03}, {:.03}, {:.03}] rad/s",
                twist.linear_x,
                twist.linear_y,
                twist.linear_z,
                twist.angular_x,
                twist.angular_y,
                twist.angular_z
            );
        }

        self.last = Some(*twist);
    }
}

impl ArchiveSink {
    /// Path of the archive relative to the session's archive root.
    pub const ARCHIVE_PATH: &'static str = "base_ctrl/cmd_vel.csv";

    pub fn new(session: &Session) -> Result<Self, ArchiveError> {
        Ok(Self {
            arch: Archiver::from_path(session, Self::ARCHIVE_PATH)?,
            pending: Vec::new(),
        })
    }
}

impl TwistSink for ArchiveSink {
    fn send(&mut self, twist: &Twist) {
        self.pending.push(TwistRecord::new(session::get_elapsed_seconds(), twist));
    }
}

impl Archived for ArchiveSink {
    fn write(&mut self) -> Result<(), ArchiveError> {
        for record in self.pending.drain(..) {
            self.arch.serialise(record)?;
        }

        Ok(())
    }
}

impl Drop for ArchiveSink {
    fn drop(&mut self) {
        if let Err(e) = self.write() {
            warn!("Could not flush the twist archive: {}", e);
        }
    }
}

impl TwistRecord {
    fn new(time_s: f64, twist: &Twist) -> Self {
        Self {
            time_s,
            linear_x: twist.linear_x,
            linear_y: twist.linear_y,
            linear_z: twist.linear_z,
            angular_x: twist.angular_x,
            angular_y: twist.angular_y,
            angular_z: twist.angular_z,
        }
    }
}
