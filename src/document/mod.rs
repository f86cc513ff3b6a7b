//! Documents as the synchronization engine sees them
//!
//! A document is identified by its vault-relative path and carries an
//! ordered metadata block (frontmatter) ahead of its body text. The engine
//! never owns documents; stores hand out fresh copies on every read.

pub mod frontmatter;
mod id;
mod property;

pub use frontmatter::{merge_frontmatter, parse_properties, split_frontmatter, Frontmatter, FrontmatterError};
pub use id::DocumentId;
pub use property::{Properties, PropertyValue};
