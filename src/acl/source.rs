//! Injectable port for reading ACLs and ownership from the filesystem.
//!
//! The parser and authorization logic never talk to the real ACL
//! inspection tool directly; they go through [`AclSource`] so they can be
//! exercised against canned dumps in tests.

use std::path::Path;
use std::process::Command;

use crate::constants::DEFAULT_ACL_COMMAND;
use crate::error::{DatagateError, Result};

/// Capability for reading a path's raw ACL text and ownership.
pub trait AclSource: Send + Sync {
    /// Raw text dump of the ACL for `path`, as produced by the
    /// inspection tool.
    fn acl_text(&self, path: &Path) -> Result<String>;

    /// Owner and group names for `path`.
    fn owner_group(&self, path: &Path) -> Result<(String, String)>;
}

/// Production implementation: spawns `<command> <path>` and stats the path.
#[derive(Debug, Clone)]
pub struct SystemAclSource {
    command: String,
}

impl SystemAclSource {
    #[must_use]
    pub fn new(command: impl Into<String>) -> SystemAclSource {
        SystemAclSource {
            command: command.into(),
        }
    }

    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Default for SystemAclSource {
    fn default() -> SystemAclSource {
        SystemAclSource::new(DEFAULT_ACL_COMMAND)
    }
}

impl AclSource for SystemAclSource {
    fn acl_text(&self, path: &Path) -> Result<String> {
        let output = Command::new(&self.command)
            .arg(path)
            .output()
            .map_err(|err| query_failed(path, None, err))?;

        // stderr output counts as failure even on a zero exit.
        if !output.status.success() || !output.stderr.is_empty() {
            return Err(DatagateError::AclQueryFailed {
                path: path.to_path_buf(),
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn owner_group(&self, path: &Path) -> Result<(String, String)> {
        stat_owner_group(path)
    }
}

fn query_failed(path: &Path, exit_code: Option<i32>, err: impl std::fmt::Display) -> DatagateError {
    DatagateError::AclQueryFailed {
        path: path.to_path_buf(),
        exit_code,
        stderr: err.to_string(),
    }
}

#[cfg(unix)]
fn stat_owner_group(path: &Path) -> Result<(String, String)> {
    use std::os::unix::fs::MetadataExt;

    use nix::unistd::{Gid, Group, Uid, User};

    let metadata = fs_err::metadata(path).map_err(|err| query_failed(path, None, err))?;
    let uid = Uid::from_raw(metadata.uid());
    let gid = Gid::from_raw(metadata.gid());

    // An id with no system-database entry renders as the numeric id; the
    // ACL evaluation then simply never matches it.
    let owner = match User::from_uid(uid) {
        Ok(Some(user)) => user.name,
        Ok(None) => uid.to_string(),
        Err(err) => return Err(query_failed(path, None, err)),
    };
    let group = match Group::from_gid(gid) {
        Ok(Some(group)) => group.name,
        Ok(None) => gid.to_string(),
        Err(err) => return Err(query_failed(path, None, err)),
    };

    Ok((owner, group))
}

#[cfg(not(unix))]
fn stat_owner_group(path: &Path) -> Result<(String, String)> {
    Err(query_failed(
        path,
        None,
        "owner/group resolution is only supported on unix",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonzero_exit_is_a_query_failure() {
        let source = SystemAclSource::new("false");
        let err = source.acl_text(Path::new("/tmp")).unwrap_err();
        assert!(matches!(
            err,
            DatagateError::AclQueryFailed {
                exit_code: Some(1),
                ..
            }
        ));
    }

    #[test]
    fn missing_command_is_a_query_failure() {
        let source = SystemAclSource::new("datagate-no-such-tool");
        let err = source.acl_text(Path::new("/tmp")).unwrap_err();
        assert!(matches!(
            err,
            DatagateError::AclQueryFailed {
                exit_code: None,
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn owner_group_resolves_for_an_existing_path() {
        let source = SystemAclSource::default();
        let (owner, group) = source.owner_group(Path::new("/")).unwrap();
        assert!(!owner.is_empty());
        assert!(!group.is_empty());
    }
}
