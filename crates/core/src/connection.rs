//! Connection lifecycle as a pure state machine.
//!
//! The shell feeds [`LinkEvent`]s observed on the backend and acts on the
//! returned [`Transition`]: dropping the handle, logging, pushing a status.

use crate::status::PluginStatus;

/// Where the shared connection handle stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkPhase {
    #[default]
    Absent,
    Connected,
    /// Handle retained after an error; the backend may still recover.
    Degraded,
}

/// Something the backend reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// A connection was established or a command succeeded while degraded.
    Connect,
    /// A connection-class failure.
    Error,
    /// The connection is gone for good.
    End,
}

/// Side effects the shell must carry out for one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transition {
    /// Drop the shared handle.
    pub release_handle: bool,
    /// Log the error. False for repeats after the first one.
    pub report_error: bool,
    /// Log that the store is reachable.
    pub announce_connect: bool,
    /// Status to push to the host, if any.
    pub status: Option<PluginStatus>,
}

/// Connection lifecycle state.
///
/// Errors are edge-triggered: only the first one after each connect is
/// reported, so a flapping link cannot flood the logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkState {
    phase: LinkPhase,
    ever_connected: bool,
    error_reported: bool,
}

impl LinkState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> LinkPhase {
        self.phase
    }

    pub fn ever_connected(&self) -> bool {
        self.ever_connected
    }

    pub fn is_degraded(&self) -> bool {
        self.phase == LinkPhase::Degraded
    }

    /// Applies an event and returns what the shell has to do about it.
    pub fn apply(&mut self, event: LinkEvent) -> Transition {
        match event {
            LinkEvent::Connect => {
                self.phase = LinkPhase::Connected;
                self.ever_connected = true;
                self.error_reported = false;
                Transition {
                    announce_connect: true,
                    status: Some(PluginStatus::Usable),
                    ..Transition::default()
                }
            }
            LinkEvent::Error => {
                // Nothing worth holding on to if the link never worked.
                let release_handle = !self.ever_connected || self.phase == LinkPhase::Absent;
                self.phase = if release_handle {
                    LinkPhase::Absent
                } else {
                    LinkPhase::Degraded
                };

                let report_error = !self.error_reported;
                self.error_reported = true;

                Transition {
                    release_handle,
                    report_error,
                    announce_connect: false,
                    status: report_error.then_some(PluginStatus::UnknownError),
                }
            }
            LinkEvent::End => {
                self.phase = LinkPhase::Absent;
                Transition {
                    release_handle: true,
                    ..Transition::default()
                }
            }
        }
    }
}
