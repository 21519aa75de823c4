//! Domain value objects - validated, immutable values

pub mod base_ref;
pub mod constraint;
pub mod digest;
pub mod port;

pub use base_ref::BaseRef;
pub use constraint::{version_cmp, VersionConstraint};
pub use digest::{TreeDigest, TreeEntry};
pub use port::PortDeclaration;
