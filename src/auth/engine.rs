//! Authorization entry points wiring the ports, caches, and catalog.
//!
//! The engine is synchronous and `Send + Sync`; a concurrent transport
//! calls it from blocking workers. Every expensive lookup (subprocess ACL
//! query, directory-service lookup, full-tree scan) sits behind a
//! time-bounded cache with single-flight miss coalescing, so bursts of
//! checks against the same path or identity cost one fetch.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::acl::{AclSource, Mask};
use crate::auth::directory::DirectoryService;
use crate::auth::models::{Group, Resource, User};
use crate::cache::{TtlCache, lock};
use crate::catalog::{Catalog, CatalogEntry};
use crate::config::EngineConfig;
use crate::error::{DatagateError, Result};
use crate::permissions::{compile_patterns, read_permissions};

/// Outcome of one authorization check.
///
/// `allowed` is true when the intersected mask is non-empty; callers that
/// demand a specific bit (usually `READ`) check `mask` themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    pub allowed: bool,
    pub mask: Mask,
}

impl Authorization {
    #[must_use]
    pub fn from_mask(mask: Mask) -> Authorization {
        Authorization {
            allowed: !mask.is_empty(),
            mask,
        }
    }

    #[must_use]
    pub fn denied() -> Authorization {
        Authorization {
            allowed: false,
            mask: Mask::EMPTY,
        }
    }
}

/// The authorization engine.
///
/// Holds the injected ports and per-instance caches. There is no
/// cross-process cache tier: each instance maintains independent
/// in-memory state.
pub struct AuthEngine {
    config: EngineConfig,
    acl_source: Arc<dyn AclSource>,
    directory: Arc<dyn DirectoryService>,
    resources: TtlCache<PathBuf, Resource>,
    identities: TtlCache<String, User>,
    catalog: Mutex<Option<Arc<Catalog>>>,
}

impl AuthEngine {
    #[must_use]
    pub fn new(
        config: EngineConfig,
        acl_source: Arc<dyn AclSource>,
        directory: Arc<dyn DirectoryService>,
    ) -> AuthEngine {
        let resources = TtlCache::new(config.resource_ttl);
        let identities = TtlCache::new(config.identity_ttl);
        AuthEngine {
            config,
            acl_source,
            directory,
            resources,
            identities,
            catalog: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Check `identifier`'s effective rights on `path`.
    ///
    /// Identity lookup failures surface as errors. Resource resolution
    /// failures deny: an unreadable or unparseable ACL must never read as
    /// a grant.
    pub fn authorize(&self, identifier: &str, path: &Path) -> Result<Authorization> {
        let user = self.user(identifier)?;

        match self.resource(path) {
            Ok(resource) => {
                let mask = resource.effective_mask(&user);
                tracing::debug!(
                    target = "datagate::engine",
                    identifier,
                    path = %path.display(),
                    mask = %mask,
                    "authorization decision"
                );
                Ok(Authorization::from_mask(mask))
            }
            Err(err) => {
                tracing::warn!(
                    target = "datagate::engine",
                    identifier,
                    path = %path.display(),
                    error = %err,
                    "denying access after resource resolution failure"
                );
                Ok(Authorization::denied())
            }
        }
    }

    /// Paths of every cataloged proposal directory visible to
    /// `identifier`.
    pub fn list_visible_proposals(&self, identifier: &str) -> Result<Vec<PathBuf>> {
        let user = self.user(identifier)?;
        let entries = self.visible_entries(&user.group_names())?;
        Ok(entries.into_iter().map(|entry| entry.path).collect())
    }

    /// Resolve and cache the user for `identifier`.
    ///
    /// The proposal list is best-effort: a catalog failure leaves it
    /// empty rather than failing the identity, so plain authorization
    /// checks survive an unscannable tree.
    pub fn user(&self, identifier: &str) -> Result<User> {
        self.identities
            .get_or_fetch(&identifier.to_string(), || self.fetch_user(identifier))
    }

    /// Resolve and cache the resource at `path`, retrying a failed ACL
    /// query once with backoff. Malformed ACL text is not retried.
    pub fn resource(&self, path: &Path) -> Result<Resource> {
        self.resources.get_or_fetch(&path.to_path_buf(), || {
            match Resource::from_source(self.acl_source.as_ref(), path) {
                Err(err @ DatagateError::AclQueryFailed { .. }) => {
                    tracing::warn!(
                        target = "datagate::engine",
                        path = %path.display(),
                        error = %err,
                        "ACL query failed, retrying once"
                    );
                    std::thread::sleep(self.config.retry_backoff);
                    Resource::from_source(self.acl_source.as_ref(), path)
                }
                resolved => resolved,
            }
        })
    }

    /// The cached catalog, rebuilding or reloading as needed.
    ///
    /// Freshness is judged by the catalog's scan timestamp, so a catalog
    /// reloaded from disk does not get a full TTL on top of its age.
    /// Concurrent rebuilds coalesce: the slot lock is held across the
    /// scan and later callers find the fresh catalog.
    pub fn catalog(&self) -> Result<Arc<Catalog>> {
        let mut slot = lock(&self.catalog);
        if let Some(cached) = slot.as_ref() {
            if cached.is_fresh(self.config.catalog_ttl) {
                return Ok(Arc::clone(cached));
            }
        }

        let rebuilt = self.rebuild_catalog(slot.as_ref())?;
        *slot = Some(Arc::clone(&rebuilt));
        Ok(rebuilt)
    }

    /// Sweep expired entries from the per-key caches.
    pub fn evict_expired(&self) {
        self.resources.evict_expired();
        self.identities.evict_expired();
    }

    fn fetch_user(&self, identifier: &str) -> Result<User> {
        let identity =
            self.directory
                .lookup(identifier)
                .map_err(|err| match err {
                    err @ DatagateError::IdentityLookupFailed { .. } => err,
                    other => DatagateError::IdentityLookupFailed {
                        identifier: identifier.to_string(),
                        reason: other.to_string(),
                    },
                })?;

        let proposals = match self.visible_entries(&identity.groups) {
            Ok(entries) => entries.into_iter().map(|entry| entry.proposal).collect(),
            Err(err) => {
                tracing::warn!(
                    target = "datagate::engine",
                    identifier,
                    error = %err,
                    "proposal listing unavailable, leaving user proposals empty"
                );
                Vec::new()
            }
        };

        Ok(User {
            uid: identity.uid,
            username: identity.username,
            name: identity.display_name,
            email: identity.email,
            groups: identity.groups.into_iter().map(Group::new).collect(),
            proposals,
        })
    }

    fn visible_entries(&self, groups: &[String]) -> Result<Vec<CatalogEntry>> {
        let patterns = read_permissions(&self.config.experiment_root, groups);
        // No patterns is no access, not an error.
        if patterns.is_empty() {
            return Ok(Vec::new());
        }

        let compiled = compile_patterns(&patterns)?;
        let catalog = self.catalog()?;
        Ok(catalog.filter(&compiled).into_iter().cloned().collect())
    }

    fn rebuild_catalog(&self, previous: Option<&Arc<Catalog>>) -> Result<Arc<Catalog>> {
        // A fresh persisted catalog spares a restarted process the
        // immediate full re-scan.
        if let Some(cache_path) = &self.config.catalog_cache_path {
            if let Some(persisted) = Catalog::load(cache_path) {
                if persisted.is_fresh(self.config.catalog_ttl) {
                    return Ok(Arc::new(persisted));
                }
            }
        }

        match Catalog::scan(&self.config.experiment_root) {
            Ok(catalog) => {
                if let Some(cache_path) = &self.config.catalog_cache_path {
                    if let Err(err) = catalog.store(cache_path) {
                        tracing::warn!(
                            target = "datagate::engine",
                            path = %cache_path.display(),
                            error = %err,
                            "failed to persist catalog"
                        );
                    }
                }
                Ok(Arc::new(catalog))
            }
            Err(err) => {
                // A stale catalog beats failing the request.
                if let Some(stale) = previous {
                    tracing::warn!(
                        target = "datagate::engine",
                        error = %err,
                        "catalog scan failed, serving stale in-memory catalog"
                    );
                    return Ok(Arc::clone(stale));
                }
                if let Some(cache_path) = &self.config.catalog_cache_path {
                    if let Some(stale) = Catalog::load(cache_path) {
                        tracing::warn!(
                            target = "datagate::engine",
                            error = %err,
                            "catalog scan failed, serving stale persisted catalog"
                        );
                        return Ok(Arc::new(stale));
                    }
                }
                Err(err)
            }
        }
    }
}
