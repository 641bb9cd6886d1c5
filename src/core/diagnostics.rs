//! Process-scoped diagnostics context.
//!
//! Holds the in-memory diagnostic trail and the most recent error string.
//! Components that report receive a [Diagnostics] handle explicitly; the layout
//! step consumes the last error exactly once per frame.
//!
//! Every record is mirrored as a `tracing` event, so a subscriber installed from
//! the `log_file` setting receives the same trail.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct Trail {
    entries: Vec<String>,
    last_error: Option<String>,
    fatal: Option<String>,
}

/// Cheap, clonable handle to the shared diagnostics trail.
#[derive(Clone, Default)]
pub struct Diagnostics {
    inner: Arc<Mutex<Trail>>,
    enabled: bool,
    force_exit: bool,
}

impl Diagnostics {
    pub fn new(enabled: bool, force_exit: bool) -> Self {
        Self {
            inner: Arc::default(),
            enabled,
            force_exit,
        }
    }

    fn trail(&self) -> MutexGuard<'_, Trail> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Appends a line to the trail.
    pub fn note(&self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::debug!(target: "fex", "{msg}");
        if self.enabled {
            self.trail().entries.push(msg);
        }
    }

    /// Emits a `tracing` event only. For high-volume records such as key
    /// presses, which would grow the in-memory trail without bound.
    pub fn trace(&self, msg: impl AsRef<str>) {
        tracing::trace!(target: "fex", "{}", msg.as_ref());
    }

    /// Records an error for the footer and the trail.
    ///
    /// With `force_exit` set, the first reported error also becomes fatal and
    /// the event loop stops after the current dispatch.
    pub fn report(&self, err: impl std::fmt::Display) {
        let msg = err.to_string();
        tracing::warn!(target: "fex", "{msg}");
        let mut trail = self.trail();
        if self.enabled {
            trail.entries.push(msg.clone());
        }
        if self.force_exit && trail.fatal.is_none() {
            trail.fatal = Some(msg.clone());
        }
        trail.last_error = Some(msg);
    }

    /// Takes the most recent error. Returns `None` until the next report.
    pub fn take_error(&self) -> Option<String> {
        self.trail().last_error.take()
    }

    pub fn fatal(&self) -> Option<String> {
        self.trail().fatal.clone()
    }

    pub fn entries(&self) -> Vec<String> {
        self.trail().entries.clone()
    }

    /// End-of-run flush: writes the trail to `out` when `print_log` is set or an
    /// error turned fatal, and returns the fatal error.
    pub fn finish(&self, print_log: bool, out: &mut impl Write) -> io::Result<Option<String>> {
        let fatal = self.fatal();
        if print_log || fatal.is_some() {
            self.dump(out)?;
        }
        Ok(fatal)
    }

    /// Writes the trail, one record per line.
    pub fn dump(&self, out: &mut impl Write) -> io::Result<()> {
        for line in self.trail().entries.iter() {
            writeln!(out, "{line}")?;
        }
        out.flush()
    }
}
