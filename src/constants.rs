//! Fixed site tables and default tunables.
//!
//! The group-name conventions encoded here (support groups, instrument
//! codes, role suffixes) come from the facility's directory service and are
//! load-bearing: the read-permission compiler matches raw group names
//! against these tables.

/// Root of the shared experiment tree.
pub const EXPERIMENT_ROOT: &str = "/gpfs/exfel/exp";

/// Administrative groups granted read access to the entire experiment tree.
pub const SUPPORT_GROUPS: &[&str] = &["exfel_da", "exfel_cas"];

/// Known instrument and beamline codes. A group named `<code>data` marks
/// instrument staff for that subtree.
pub const INSTRUMENT_CODES: &[&str] = &[
    "sa1", "sa2", "sa3", "la1", "la2", "la3", "spb", "fxe", "hed", "mid", "scs", "sqs", "sxp",
];

/// Group-name suffix for the data-management role on a proposal.
pub const DATA_MANAGEMENT_SUFFIX: &str = "-dmgt";

/// Group-name suffix for the participant role on a proposal.
pub const PARTICIPANT_SUFFIX: &str = "-part";

/// Relative path under a proposal directory holding shared analysis data.
pub const SHARED_SUBDIR: &str = "usr/Shared";

/// Shared analysis directory names probed under [`SHARED_SUBDIR`], in
/// preference order. The first existing directory wins.
pub const SHARED_DIR_CANDIDATES: &[&str] = &["amore", "amore-online"];

/// Width proposal numbers are zero-padded to in directory names (`p000123`).
pub const PROPOSAL_NUMBER_WIDTH: usize = 6;

/// Default ACL inspection command spawned per uncached resource.
pub const DEFAULT_ACL_COMMAND: &str = "mmgetacl";

/// Default time-to-live for cached per-resource ACL/ownership lookups.
pub const DEFAULT_RESOURCE_TTL_SECS: u64 = 30;

/// Default time-to-live for cached directory-service identities.
pub const DEFAULT_IDENTITY_TTL_SECS: u64 = 60;

/// Default time-to-live for the full-tree proposal catalog.
pub const DEFAULT_CATALOG_TTL_SECS: u64 = 600;

/// Backoff before the single ACL-query retry.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 200;

/// File name of the persisted catalog, created under the system temp
/// directory unless the configuration overrides the full path.
pub const DEFAULT_CATALOG_CACHE_FILE: &str = "datagate_proposals.json";
