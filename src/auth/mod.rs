//! Identity models, external ports, and the authorization engine.

pub mod directory;
pub mod engine;
pub mod models;

pub use directory::{DirectoryIdentity, DirectoryService, group_name_from_dn};
pub use engine::{AuthEngine, Authorization};
pub use models::{Group, Resource, User};
