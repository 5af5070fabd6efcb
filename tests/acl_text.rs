//! Integration tests for ACL text parsing against realistic tool output.

use datagate_core::{Ace, Acl, DatagateError, Mask};

/// Dump shape produced by the inspection tool on a healthy proposal
/// directory: specials with inheritance flags, verbose permission-bit
/// breakdowns, named user and group entries.
const PROPOSAL_DUMP: &str = "\
#NFSv4 ACL
#owner:smithj
#group:staff
special:owner@:rwxc:allow:FileInherit
(X)READ/LIST (X)WRITE/CREATE (X)APPEND/MKDIR (-)SYNCHRONIZE (X)READ_ACL  (X)READ_ATTR  (-)READ_NAMED
(X)DELETE    (X)DELETE_CHILD (X)CHOWN (X)EXEC/SEARCH (X)WRITE_ACL (X)WRITE_ATTR (-)WRITE_NAMED

special:group@:r-x-:allow:DirInherit:InheritOnly
(X)READ/LIST (-)WRITE/CREATE (-)APPEND/MKDIR (-)SYNCHRONIZE (X)READ_ACL  (X)READ_ATTR  (-)READ_NAMED
(-)DELETE    (-)DELETE_CHILD (-)CHOWN (X)EXEC/SEARCH (-)WRITE_ACL (-)WRITE_ATTR (-)WRITE_NAMED

special:everyone@:----:allow
user:smithj:rwxc:allow
group:600123-part:r-x-:allow
";

#[test]
fn parses_a_full_proposal_dump() {
    let acl = Acl::parse(PROPOSAL_DUMP).unwrap();

    // owner@ and group@ resolved eagerly, everyone@ dropped.
    assert_eq!(
        acl.entries(),
        &[
            Ace::user("smithj", Mask::RWX | Mask::READ_ACL),
            Ace::group("staff", Mask::READ | Mask::EXECUTE),
            Ace::user("smithj", Mask::RWX | Mask::READ_ACL),
            Ace::group("600123-part", Mask::READ | Mask::EXECUTE),
        ]
    );
}

#[test]
fn parsed_masks_render_canonically() {
    let acl = Acl::parse(PROPOSAL_DUMP).unwrap();
    assert_eq!(acl.entries()[0].mask.to_string(), "rwx");
    assert_eq!(acl.entries()[3].mask.to_string(), "r-x");
}

#[test]
fn intersection_against_a_projected_user_acl() {
    let acl = Acl::parse(PROPOSAL_DUMP).unwrap();
    let member = Acl::new(vec![
        Ace::user("curiea", Mask::RWX),
        Ace::group("600123-part", Mask::RWX),
    ]);
    assert_eq!(&acl & &member, Mask::READ | Mask::EXECUTE);

    let outsider = Acl::new(vec![Ace::user("lonely", Mask::RWX)]);
    assert!((&acl & &outsider).is_empty());
}

#[test]
fn truncated_header_is_rejected() {
    let err = Acl::parse("#NFSv4 ACL\n#owner:smithj\n").unwrap_err();
    assert!(matches!(err, DatagateError::MalformedAclHeader { .. }));
}

#[test]
fn arbitrary_text_is_rejected() {
    let err = Acl::parse("mmgetacl: command not found\n").unwrap_err();
    assert!(matches!(err, DatagateError::MalformedAclHeader { .. }));
}

#[test]
fn inherited_only_dump_yields_an_empty_acl() {
    let dump = "\
#NFSv4 ACL
#owner:smithj
#group:staff
special:everyone@:r---:allow
";
    let acl = Acl::parse(dump).unwrap();
    assert!(acl.is_empty());
    // Empty ACL means denial, not an error.
    assert!((&acl & &Ace::user("smithj", Mask::RWX)).is_empty());
}
