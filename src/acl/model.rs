//! ACE/ACL model and the text parser for ACL-inspection dumps.
//!
//! The parser consumes the output of the filesystem's ACL inspection
//! command (GPFS NFSv4 syntax): a fixed three-line header naming the owner
//! and group, followed by one line per entry plus verbose permission-bit
//! breakdowns that carry no extra information. Two narrowly-scoped
//! patterns keep the phases independent: a header that must match, and a
//! line-oriented entry pattern that simply skips everything else.

use std::ops::BitAnd;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::acl::mask::Mask;
use crate::error::{DatagateError, Result};

// Parser patterns are fixed at compile time; failing to compile one is a
// programming error, not a runtime condition.
#[allow(clippy::expect_used)]
fn static_pattern(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern compiles")
}

static ACL_HEADER: Lazy<Regex> = Lazy::new(|| {
    static_pattern(
        r"\A#NFSv4 ACL[ \t]*\r?\n#owner:(?P<owner>[\w@-]+)[ \t]*\r?\n#group:(?P<group>[\w@-]+)[ \t]*\r?\n",
    )
});

static ACL_ENTRY: Lazy<Regex> = Lazy::new(|| {
    static_pattern(
        r"(?m)^(?P<identity>special|user|group):(?P<name>[\w@-]+):(?P<mask>[-rwxcpRWDaAdCos]+):(?P<rest>.*)$",
    )
});

/// Identity kind an ACE applies to.
///
/// `special` placeholders (`owner@`, `group@`) are resolved at parse time
/// and never survive into the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AceIdentity {
    User,
    Group,
}

/// Access Control Entry: one (identity kind, name, mask) triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ace {
    pub identity: AceIdentity,
    pub who: String,
    pub mask: Mask,
}

impl Ace {
    #[must_use]
    pub fn user(who: impl Into<String>, mask: Mask) -> Ace {
        Ace {
            identity: AceIdentity::User,
            who: who.into(),
            mask,
        }
    }

    #[must_use]
    pub fn group(who: impl Into<String>, mask: Mask) -> Ace {
        Ace {
            identity: AceIdentity::Group,
            who: who.into(),
            mask,
        }
    }

    /// True when both ACEs name the same principal.
    #[must_use]
    pub fn same_principal(&self, other: &Ace) -> bool {
        self.identity == other.identity && self.who == other.who
    }

    /// Intersection of two ACEs: the AND of their masks when they name the
    /// same principal, otherwise the empty mask. Never an error.
    #[must_use]
    pub fn intersect(&self, other: &Ace) -> Mask {
        if self.same_principal(other) {
            self.mask & other.mask
        } else {
            Mask::EMPTY
        }
    }
}

impl BitAnd<&Ace> for &Ace {
    type Output = Mask;

    fn bitand(self, other: &Ace) -> Mask {
        self.intersect(other)
    }
}

/// Access Control List: ordered ACEs scoped to one resource or one user.
///
/// Order is preserved for provenance only; evaluation ORs over all
/// entries, so it is order-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acl {
    entries: Vec<Ace>,
}

impl Acl {
    #[must_use]
    pub fn new(entries: Vec<Ace>) -> Acl {
        Acl { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[Ace] {
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
    pub fn iter(&self) -> std::slice::Iter<'_, Ace> {
        self.entries.iter()
    }

    /// Parse a complete ACL-inspection dump.
    ///
    /// The fixed header prefix must match (`MalformedAclHeader` otherwise).
    /// `special:owner@` and `special:group@` entries are rewritten eagerly
    /// into concrete user/group entries using the header's owner and group;
    /// any other `special` entry is outside this model and is skipped with
    /// a warning. Zero matched entries after a valid header is not an
    /// error: the ACL is empty and evaluates to denial.
    pub fn parse(text: &str) -> Result<Acl> {
        let header =
            ACL_HEADER
                .captures(text)
                .ok_or_else(|| DatagateError::MalformedAclHeader {
                    reason: "missing `#NFSv4 ACL` / `#owner:` / `#group:` prefix".to_string(),
                })?;
        let owner = &header["owner"];
        let group = &header["group"];
        let body = &text[header.get(0).map_or(0, |m| m.end())..];

        let mut entries = Vec::new();
        for caps in ACL_ENTRY.captures_iter(body) {
            let name = &caps["name"];
            let mask = Mask::from_letters(&caps["mask"])?;

            let ace = match &caps["identity"] {
                "special" => match name {
                    "owner@" => Ace::user(owner, mask),
                    "group@" => Ace::group(group, mask),
                    other => {
                        tracing::warn!(
                            target = "datagate::acl",
                            special = other,
                            "skipping special ACL entry outside the user/group model"
                        );
                        continue;
                    }
                },
                "group" => Ace::group(name, mask),
                _ => Ace::user(name, mask),
            };
            entries.push(ace);
        }

        Ok(Acl::new(entries))
    }

    /// Intersection of this ACL with a single ACE: OR of every member's
    /// intersection with it. An empty ACL yields the empty mask.
    #[must_use]
    pub fn mask_for(&self, ace: &Ace) -> Mask {
        self.entries
            .iter()
            .fold(Mask::EMPTY, |acc, entry| acc | entry.intersect(ace))
    }

    /// Intersection of two ACLs: OR over all pairwise matches. Either side
    /// may be empty; the result is then the empty mask.
    #[must_use]
    pub fn intersect(&self, other: &Acl) -> Mask {
        other
            .entries
            .iter()
            .fold(Mask::EMPTY, |acc, ace| acc | self.mask_for(ace))
    }
}

impl From<Vec<Ace>> for Acl {
    fn from(entries: Vec<Ace>) -> Acl {
        Acl::new(entries)
    }
}

impl<'a> IntoIterator for &'a Acl {
    type Item = &'a Ace;
    type IntoIter = std::slice::Iter<'a, Ace>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl BitAnd<&Ace> for &Acl {
    type Output = Mask;

    fn bitand(self, ace: &Ace) -> Mask {
        self.mask_for(ace)
    }
}

impl BitAnd<&Acl> for &Acl {
    type Output = Mask;

    fn bitand(self, other: &Acl) -> Mask {
        self.intersect(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_DUMP: &str = "\
#NFSv4 ACL
#owner:bob
#group:staff
user:alice:rwx-:allow
";

    #[test]
    fn parse_single_user_entry() {
        let acl = Acl::parse(SIMPLE_DUMP).unwrap();
        assert_eq!(acl.len(), 1);
        assert_eq!(acl.entries()[0], Ace::user("alice", Mask::RWX));
    }

    #[test]
    fn parse_resolves_owner_and_group_specials() {
        let dump = "\
#NFSv4 ACL
#owner:bob
#group:staff
special:owner@:rwxc:allow:FileInherit
special:group@:r-x-:allow
";
        let acl = Acl::parse(dump).unwrap();
        assert_eq!(acl.len(), 2);
        assert_eq!(
            acl.entries()[0],
            Ace::user("bob", Mask::RWX | Mask::READ_ACL)
        );
        assert_eq!(acl.entries()[1], Ace::group("staff", Mask::READ | Mask::EXECUTE));
    }

    #[test]
    fn parse_skips_unknown_specials() {
        let dump = "\
#NFSv4 ACL
#owner:bob
#group:staff
special:everyone@:r---:allow
user:alice:rw--:allow
";
        let acl = Acl::parse(dump).unwrap();
        assert_eq!(acl.len(), 1);
        assert_eq!(acl.entries()[0].who, "alice");
    }

    #[test]
    fn parse_skips_verbose_permission_lines() {
        let dump = "\
#NFSv4 ACL
#owner:smithj
#group:staff
special:owner@:rwxc:allow:FileInherit
(X)READ/LIST (X)WRITE/CREATE (X)APPEND/MKDIR (-)SYNCHRONIZE (X)READ_ACL  (X)READ_ATTR  (-)READ_NAMED
(X)DELETE    (X)DELETE_CHILD (X)CHOWN (X)EXEC/SEARCH (X)WRITE_ACL (X)WRITE_ATTR (-)WRITE_NAMED

user:smithj:rwxc:allow
 (X)READ/LIST (X)WRITE/CREATE (X)APPEND/MKDIR (-)SYNCHRONIZE (X)READ_ACL  (X)READ_ATTR  (-)READ_NAMED
";
        let acl = Acl::parse(dump).unwrap();
        assert_eq!(acl.len(), 2);
        assert_eq!(acl.entries()[0].who, "smithj");
        assert_eq!(acl.entries()[1].who, "smithj");
    }

    #[test]
    fn parse_rejects_missing_header() {
        let err = Acl::parse("user:alice:rwx-:allow\n").unwrap_err();
        assert!(matches!(err, DatagateError::MalformedAclHeader { .. }));
    }

    #[test]
    fn parse_accepts_header_without_entries() {
        let dump = "\
#NFSv4 ACL
#owner:bob
#group:staff
";
        let acl = Acl::parse(dump).unwrap();
        assert!(acl.is_empty());
    }

    #[test]
    fn all_dash_mask_is_empty_not_an_error() {
        let dump = "\
#NFSv4 ACL
#owner:bob
#group:staff
user:alice:----:allow
";
        let acl = Acl::parse(dump).unwrap();
        assert!(acl.entries()[0].mask.is_empty());
    }

    #[test]
    fn ace_self_intersection_is_idempotent() {
        let ace = Ace::user("alice", Mask::READ | Mask::WRITE);
        assert_eq!(&ace & &ace, ace.mask);
    }

    #[test]
    fn ace_intersection_across_principals_is_empty() {
        let a = Ace::user("alice", Mask::RWX);
        let b = Ace::user("bob", Mask::RWX);
        let g = Ace::group("alice", Mask::RWX);
        assert!((&a & &b).is_empty());
        // Same name, different identity kind: still distinct principals.
        assert!((&a & &g).is_empty());
    }

    #[test]
    fn acl_and_ace_ors_over_members() {
        let acl = Acl::new(vec![
            Ace::user("alice", Mask::READ),
            Ace::user("alice", Mask::WRITE),
            Ace::group("staff", Mask::EXECUTE),
        ]);
        let probe = Ace::user("alice", Mask::RWX);
        assert_eq!(&acl & &probe, Mask::READ | Mask::WRITE);
    }

    #[test]
    fn acl_and_acl_is_symmetric_for_identical_single_entry_lists() {
        let left = Acl::new(vec![Ace::user("alice", Mask::READ | Mask::EXECUTE)]);
        let right = left.clone();
        assert_eq!(&left & &right, &right & &left);
        assert_eq!(&left & &right, Mask::READ | Mask::EXECUTE);
    }

    #[test]
    fn empty_acl_intersections_are_empty() {
        let empty = Acl::default();
        let acl = Acl::new(vec![Ace::user("alice", Mask::RWX)]);
        assert!(empty.intersect(&acl).is_empty());
        assert!(acl.intersect(&empty).is_empty());
        assert!(empty.intersect(&empty).is_empty());
    }
}
