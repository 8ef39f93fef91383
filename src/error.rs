//! Error types shared by the set implementations.

use thiserror::Error;

/// Errors surfaced by set construction and mutation.
///
/// Both variants are programmer errors. The set remains valid and usable
/// after either is returned; no operation leaves it in a partial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// A construction parameter was out of range, or an entry of the
    /// wrong width was passed to an operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// An insert of a new key was attempted while the set already holds
    /// its maximum number of entries. Re-inserting a key that is already
    /// present does not fail, even at maximum size.
    #[error("capacity exceeded: the set already holds its maximum number of entries")]
    CapacityExceeded,
}
