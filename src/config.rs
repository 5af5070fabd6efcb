//! Engine configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_ACL_COMMAND, DEFAULT_CATALOG_CACHE_FILE, DEFAULT_CATALOG_TTL_SECS,
    DEFAULT_IDENTITY_TTL_SECS, DEFAULT_RESOURCE_TTL_SECS, DEFAULT_RETRY_BACKOFF_MS,
    EXPERIMENT_ROOT,
};

/// Tunables for [`AuthEngine`].
///
/// TTLs are constructor parameters rather than globals so tests can run
/// with millisecond windows.
///
/// [`AuthEngine`]: crate::auth::AuthEngine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Root of the experiment tree; scans and compiled patterns are
    /// rooted here.
    pub experiment_root: PathBuf,
    /// ACL inspection command spawned per uncached resource.
    pub acl_command: String,
    /// Time-to-live for cached per-resource ACL/ownership lookups.
    pub resource_ttl: Duration,
    /// Time-to-live for cached directory-service identities.
    pub identity_ttl: Duration,
    /// Time-to-live for the full-tree proposal catalog.
    pub catalog_ttl: Duration,
    /// Persisted catalog location; `None` disables persistence.
    pub catalog_cache_path: Option<PathBuf>,
    /// Backoff before the single ACL-query retry.
    pub retry_backoff: Duration,
}

impl Default for EngineConfig {
    fn default() -> EngineConfig {
        EngineConfig {
            experiment_root: PathBuf::from(EXPERIMENT_ROOT),
            acl_command: DEFAULT_ACL_COMMAND.to_string(),
            resource_ttl: Duration::from_secs(DEFAULT_RESOURCE_TTL_SECS),
            identity_ttl: Duration::from_secs(DEFAULT_IDENTITY_TTL_SECS),
            catalog_ttl: Duration::from_secs(DEFAULT_CATALOG_TTL_SECS),
            catalog_cache_path: Some(std::env::temp_dir().join(DEFAULT_CATALOG_CACHE_FILE)),
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_experiment_root(mut self, root: impl Into<PathBuf>) -> EngineConfig {
        self.experiment_root = root.into();
        self
    }

    #[must_use]
    pub fn with_acl_command(mut self, command: impl Into<String>) -> EngineConfig {
        self.acl_command = command.into();
        self
    }

    #[must_use]
    pub fn with_resource_ttl(mut self, ttl: Duration) -> EngineConfig {
        self.resource_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_identity_ttl(mut self, ttl: Duration) -> EngineConfig {
        self.identity_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_catalog_ttl(mut self, ttl: Duration) -> EngineConfig {
        self.catalog_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_catalog_cache_path(mut self, path: Option<PathBuf>) -> EngineConfig {
        self.catalog_cache_path = path;
        self
    }

    #[must_use]
    pub fn with_retry_backoff(mut self, backoff: Duration) -> EngineConfig {
        self.retry_backoff = backoff;
        self
    }
}
