//! Bundled document stores
//!
//! Both stores implement [`LinkResolver`](crate::sync::LinkResolver) and
//! [`DocumentStore`](crate::sync::DocumentStore) with the same link rules
//! (see [`resolve_linkpath`]).

mod fs;
mod memory;
mod resolve;

pub use fs::FsVault;
pub use memory::MemoryVault;
pub use resolve::resolve_linkpath;
