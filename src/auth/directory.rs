//! Directory-service port and identity records.
//!
//! The concrete client (LDAP or equivalent) lives outside this crate;
//! the engine only depends on [`DirectoryService`]. Tests use in-memory
//! fakes.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// Fixed at compile time; failing to compile it is a programming error.
#[allow(clippy::expect_used)]
static GROUP_DN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"cn=([^,]+)").expect("static pattern compiles"));

/// Identity record returned by the directory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryIdentity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<u32>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub groups: Vec<String>,
}

/// External directory-service client.
///
/// `identifier` is a username or an email address; implementations decide
/// which search filter to use. Lookup failures surface as
/// [`IdentityLookupFailed`] and are never retried implicitly.
///
/// [`IdentityLookupFailed`]: crate::error::DatagateError::IdentityLookupFailed
pub trait DirectoryService: Send + Sync {
    fn lookup(&self, identifier: &str) -> Result<DirectoryIdentity>;
}

/// Extract the plain group name from a directory DN (`cn=<name>,…`).
///
/// Returns `None` for values without a `cn=` component; callers skip
/// those, and the debug log keeps them visible.
#[must_use]
pub fn group_name_from_dn(dn: &str) -> Option<String> {
    match GROUP_DN.captures(dn) {
        Some(caps) => caps.get(1).map(|name| name.as_str().to_string()),
        None => {
            tracing::debug!(target = "datagate::directory", dn, "group DN has no cn= component");
            None
        }
    }
}
