//! Observable events for shelterdb
//!
//! Every log line carries one of these as its `event` field, so failures can
//! be grepped for without parsing free-form messages.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Store lifecycle
    /// Store passed its liveness probe
    StoreConnected,
    /// Store construction failed its liveness probe
    StoreConnectFailed,

    // Store operations
    /// Record insert failed in the backend
    InsertFailed,
    /// Record read failed in the backend
    ReadFailed,
    /// Record update failed in the backend
    UpdateFailed,
    /// Record delete failed in the backend
    DeleteFailed,
    /// Liveness probe failed after construction
    PingFailed,
    /// Input rejected before reaching the backend
    InputRejected,

    // Dashboard
    /// Dashboard server listening
    Serving,
    /// Dashboard login probe could not build a store
    LoginFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::StoreConnected => "STORE_CONNECTED",
            Event::StoreConnectFailed => "STORE_CONNECT_FAILED",

            Event::InsertFailed => "RECORD_INSERT_FAILED",
            Event::ReadFailed => "RECORD_READ_FAILED",
            Event::UpdateFailed => "RECORD_UPDATE_FAILED",
            Event::DeleteFailed => "RECORD_DELETE_FAILED",
            Event::PingFailed => "PING_FAILED",
            Event::InputRejected => "INPUT_REJECTED",

            Event::Serving => "DASHBOARD_SERVING",
            Event::LoginFailed => "DASHBOARD_LOGIN_FAILED",
        }
    }

    /// Human-readable message logged alongside the event
    pub fn message(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "configuration loaded",
            Event::StoreConnected => "connected to record store",
            Event::StoreConnectFailed => "unable to connect to record store",
            Event::InsertFailed => "error inserting record",
            Event::ReadFailed => "error reading records",
            Event::UpdateFailed => "error updating records",
            Event::DeleteFailed => "error deleting records",
            Event::PingFailed => "ping failed",
            Event::InputRejected => "input rejected",
            Event::Serving => "dashboard listening",
            Event::LoginFailed => "dashboard login failed",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
