//! Fatal error taxonomy
//!
//! Everything here aborts the main loop. Expected conditions (no data on a
//! non-blocking read, no menu selection) never become a `RemapError`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemapError {
    #[error("no window has input focus")]
    NoFocus,

    #[error("property {property} returned unexpected type {found}")]
    UnexpectedPropertyType { property: String, found: String },

    #[error("property {property} returned unexpected format {format}")]
    UnexpectedPropertyFormat { property: String, format: i32 },

    #[error("unhandled readiness condition on {fd}: revents={revents:#x}")]
    UnhandledReadiness { fd: i32, revents: i16 },

    #[error("unable to open X display")]
    DisplayUnavailable,
}
