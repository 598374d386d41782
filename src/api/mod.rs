//! Remote store adapter for the hosted relational backend.
//!
//! Every operation here is total: transport and service failures are
//! absorbed at this boundary, logged, and reported through
//! [`RemoteOutcome`] rather than thrown. The system stays fully usable
//! with no backend configured at all.

pub mod client;
pub mod error;

pub use client::{LedgerRow, RemoteStore};
pub use error::RemoteError;

/// Result of a remote operation.
///
/// `Unavailable` means no backend is configured; `Failed` means the
/// backend is configured but the call did not complete. The
/// reconciliation layer treats both as "proceed with local-only
/// state", but logs and operators can tell them apart.
#[derive(Debug)]
pub enum RemoteOutcome<T> {
    Ok(T),
    Unavailable,
    Failed(RemoteError),
}

impl<T> RemoteOutcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, RemoteOutcome::Ok(_))
    }

    /// Collapse to the confirmed value, if any.
    pub fn into_option(self) -> Option<T> {
        match self {
            RemoteOutcome::Ok(v) => Some(v),
            RemoteOutcome::Unavailable | RemoteOutcome::Failed(_) => None,
        }
    }
}
