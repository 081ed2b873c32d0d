//! Release pipeline stages
//!
//! - [`version`]: resolve the version being built from the persisted one
//! - [`changelog`]: find or author the patch notes for that version
//! - [`publish`]: stage, commit, tag and push the release

pub mod changelog;
pub mod publish;
pub mod version;
