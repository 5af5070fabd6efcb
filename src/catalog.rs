//! Proposal-directory discovery, filtering, and persistence.
//!
//! One full-tree scan is the most expensive operation in the system, so
//! its result is a value (a [`Catalog`]) that can be cached, persisted to
//! a flat JSON file, and rebuilt wholesale; there is no incremental
//! diffing. Permission errors during the walk are swallowed per branch:
//! an unreadable instrument directory must not hide the rest of the tree.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{SHARED_DIR_CANDIDATES, SHARED_SUBDIR};
use crate::error::{DatagateError, Result};
use crate::permissions::matches_any;

/// One discovered shared analysis directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Full path to the shared analysis directory.
    pub path: PathBuf,
    /// Proposal number as it appears in the directory name (`000123`).
    pub proposal: String,
    pub instrument: String,
    pub cycle: String,
}

/// Persisted on-disk shape: a human-inspectable map keyed by proposal
/// number, plus the scan timestamp used for freshness checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedCatalog {
    scanned_at: DateTime<Utc>,
    proposals: BTreeMap<String, CatalogEntry>,
}

/// The result of one full-tree scan, sorted by path.
#[derive(Debug, Clone)]
pub struct Catalog {
    scanned_at: DateTime<Utc>,
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    #[must_use]
    pub fn new(mut entries: Vec<CatalogEntry>) -> Catalog {
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Catalog {
            scanned_at: Utc::now(),
            entries,
        }
    }

    #[must_use]
    pub fn with_scanned_at(mut self, scanned_at: DateTime<Utc>) -> Catalog {
        self.scanned_at = scanned_at;
        self
    }

    #[must_use]
    pub fn scanned_at(&self) -> DateTime<Utc> {
        self.scanned_at
    }

    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        Utc::now()
            .signed_duration_since(self.scanned_at)
            .to_std()
            .is_ok_and(|age| age <= ttl)
    }

    /// Walk the experiment tree and collect every proposal directory with
    /// a shared analysis directory underneath.
    ///
    /// The walk is fixed-depth (instrument, cycle, proposal) with
    /// `usr/Shared/{amore,amore-online}` probed under each proposal
    /// directory, first existing candidate winning. An unreadable root is
    /// fatal; unreadable branches are skipped.
    pub fn scan(root: &Path) -> Result<Catalog> {
        let instruments =
            fs_err::read_dir(root).map_err(|err| DatagateError::CatalogUnavailable {
                reason: err.to_string(),
            })?;

        let mut entries = Vec::new();
        for instrument in instruments.flatten() {
            scan_instrument(&instrument.path(), &mut entries);
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        log::info!(
            "catalog scan found {} proposal directories under {}",
            entries.len(),
            root.display()
        );

        Ok(Catalog {
            scanned_at: Utc::now(),
            entries,
        })
    }

    /// Every entry whose path matches at least one compiled pattern.
    #[must_use]
    pub fn filter(&self, patterns: &[Regex]) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|entry| matches_any(&entry.path.to_string_lossy(), patterns))
            .collect()
    }

    /// Read a persisted catalog, returning `None` when the file is
    /// absent or unusable. A corrupt cache file must not take the engine
    /// down; it only costs a re-scan.
    #[must_use]
    pub fn load(path: &Path) -> Option<Catalog> {
        let text = match fs_err::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(
                    target = "datagate::catalog",
                    path = %path.display(),
                    error = %err,
                    "failed to read persisted catalog"
                );
                return None;
            }
        };

        match serde_json::from_str::<PersistedCatalog>(&text) {
            Ok(persisted) => Some(persisted.into()),
            Err(err) => {
                tracing::warn!(
                    target = "datagate::catalog",
                    path = %path.display(),
                    error = %err,
                    "ignoring unparseable persisted catalog"
                );
                None
            }
        }
    }

    /// Atomically rewrite the persisted catalog.
    pub fn store(&self, path: &Path) -> Result<()> {
        let persisted = PersistedCatalog::from(self);
        let mut file = AtomicWriteFile::open(path)?;
        serde_json::to_writer_pretty(&mut file, &persisted).map_err(|err| {
            DatagateError::CatalogUnavailable {
                reason: format!("failed to encode persisted catalog: {err}"),
            }
        })?;
        writeln!(file)?;
        file.commit()?;
        Ok(())
    }
}

impl From<PersistedCatalog> for Catalog {
    fn from(persisted: PersistedCatalog) -> Catalog {
        let mut entries: Vec<CatalogEntry> = persisted.proposals.into_values().collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Catalog {
            scanned_at: persisted.scanned_at,
            entries,
        }
    }
}

impl From<&Catalog> for PersistedCatalog {
    fn from(catalog: &Catalog) -> PersistedCatalog {
        PersistedCatalog {
            scanned_at: catalog.scanned_at,
            proposals: catalog
                .entries
                .iter()
                .map(|entry| (entry.proposal.clone(), entry.clone()))
                .collect(),
        }
    }
}

fn scan_instrument(path: &Path, entries: &mut Vec<CatalogEntry>) {
    let Ok(cycles) = fs_err::read_dir(path) else {
        tracing::debug!(
            target = "datagate::catalog",
            path = %path.display(),
            "skipping unreadable instrument directory"
        );
        return;
    };
    for cycle in cycles.flatten() {
        scan_cycle(&cycle.path(), entries);
    }
}

fn scan_cycle(path: &Path, entries: &mut Vec<CatalogEntry>) {
    let Ok(proposals) = fs_err::read_dir(path) else {
        tracing::debug!(
            target = "datagate::catalog",
            path = %path.display(),
            "skipping unreadable cycle directory"
        );
        return;
    };
    for proposal in proposals.flatten() {
        if let Some(entry) = probe_proposal(&proposal.path()) {
            entries.push(entry);
        }
    }
}

/// Probe the shared-directory candidates under one proposal directory.
/// Candidates are tried in preference order; missing or unreadable ones
/// simply don't match.
fn probe_proposal(path: &Path) -> Option<CatalogEntry> {
    let shared = path.join(SHARED_SUBDIR);
    for candidate in SHARED_DIR_CANDIDATES {
        let dir = shared.join(candidate);
        if dir.is_dir() {
            return Some(entry_for(dir, path));
        }
    }
    None
}

fn entry_for(shared_dir: PathBuf, proposal_dir: &Path) -> CatalogEntry {
    let name = proposal_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let proposal = name
        .strip_prefix('p')
        .filter(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
        .map_or_else(|| name.clone(), str::to_string);
    let cycle = dir_name(proposal_dir.parent());
    let instrument = dir_name(proposal_dir.parent().and_then(Path::parent));

    CatalogEntry {
        path: shared_dir,
        proposal,
        instrument,
        cycle,
    }
}

fn dir_name(path: Option<&Path>) -> String {
    path.and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
