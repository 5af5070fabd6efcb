//! NFSv4-subset ACL model.
//!
//! Models enough of the filesystem's NFSv4 ACLs to decide what basic
//! (`rwx`) permissions a user has on a file or directory: the permission
//! bit set, structured entries with intersection operators, the text
//! parser for inspection-tool dumps, and the injectable query port.
//!
//! For the underlying syntax see the GPFS documentation on NFS v4 ACLs.

pub mod mask;
pub mod model;
pub mod source;

pub use mask::Mask;
pub use model::{Ace, AceIdentity, Acl};
pub use source::{AclSource, SystemAclSource};
