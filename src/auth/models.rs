//! User, group, and resource models plus their ACL projections.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::acl::{Ace, Acl, AclSource, Mask};
use crate::error::Result;

/// Directory-service group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gid: Option<u32>,
    pub name: String,
}

impl Group {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Group {
        Group {
            gid: None,
            name: name.into(),
        }
    }

    /// Synthetic ACE granting the group full nominal rights.
    #[must_use]
    pub fn ace(&self) -> Ace {
        Ace::group(self.name.clone(), Mask::RWX)
    }
}

/// Authenticated user with resolved group memberships.
///
/// Identity projection grants the user and every group they belong to
/// full nominal rights; the actual restriction comes from intersecting
/// against the resource's ACL, never from the user's own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<u32>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub proposals: Vec<String>,
}

impl User {
    /// Synthetic ACE for the user themselves.
    #[must_use]
    pub fn ace(&self) -> Ace {
        Ace::user(self.username.clone(), Mask::RWX)
    }

    /// The user's evaluable ACL: their own ACE plus one per group.
    #[must_use]
    pub fn acl(&self) -> Acl {
        let mut entries = Vec::with_capacity(1 + self.groups.len());
        entries.push(self.ace());
        entries.extend(self.groups.iter().map(Group::ace));
        Acl::new(entries)
    }

    #[must_use]
    pub fn group_names(&self) -> Vec<String> {
        self.groups.iter().map(|group| group.name.clone()).collect()
    }
}

/// A data directory with its parsed ACL and ownership.
///
/// Immutable once constructed; lifetime is bounded by its cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub path: PathBuf,
    pub acl: Acl,
    pub owner: String,
    pub group: String,
}

impl Resource {
    /// Query and parse the ACL and ownership for `path`.
    pub fn from_source(source: &dyn AclSource, path: &Path) -> Result<Resource> {
        let text = source.acl_text(path)?;
        let acl = Acl::parse(&text)?;
        let (owner, group) = source.owner_group(path)?;

        tracing::debug!(
            target = "datagate::auth",
            path = %path.display(),
            entries = acl.len(),
            owner = %owner,
            group = %group,
            "resolved resource"
        );

        Ok(Resource {
            path: path.to_path_buf(),
            acl,
            owner,
            group,
        })
    }

    /// Effective rights of `user` on this resource: the intersection of
    /// the resource's ACL with the user's projected ACL.
    #[must_use]
    pub fn effective_mask(&self, user: &User) -> Mask {
        &self.acl & &user.acl()
    }
}
