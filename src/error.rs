//! Error taxonomy for the authorization engine.
//!
//! Empty ACLs and empty pattern lists are deliberately *not* errors; they
//! evaluate to "no access". Callers at the transport boundary must map any
//! error from this crate to a denied authorization, never to a grant.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, DatagateError>;

/// Errors surfaced by the authorization engine.
#[derive(Debug, Error)]
pub enum DatagateError {
    /// The ACL dump did not start with the fixed `#NFSv4 ACL` /
    /// `#owner:` / `#group:` prefix. Fatal for that resource.
    #[error("malformed ACL header: {reason}")]
    MalformedAclHeader { reason: String },

    /// A mask string contained a letter outside the known alias table.
    #[error("unknown permission letter {letter:?} in ACL mask {mask:?}")]
    UnknownMaskLetter { letter: char, mask: String },

    /// The ACL inspection command exited non-zero, wrote to stderr, or the
    /// path could not be stat'ed. Retried once with backoff by the engine.
    #[error("ACL query for {} failed (exit code {exit_code:?}): {stderr}", .path.display())]
    AclQueryFailed {
        path: PathBuf,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// Directory-service lookup failed. Surfaced immediately, never
    /// retried implicitly: identity is security-sensitive.
    #[error("identity lookup for {identifier:?} failed: {reason}")]
    IdentityLookupFailed { identifier: String, reason: String },

    /// A compiled read-permission pattern was rejected by the regex engine.
    #[error("invalid read-permission pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The proposal catalog could not be built or loaded.
    #[error("proposal catalog unavailable: {reason}")]
    CatalogUnavailable { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
