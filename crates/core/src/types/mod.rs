//! Common type definitions shared across Menuforge.

pub mod id;
pub mod owner;
pub mod role;

pub use id::*;
pub use owner::{Owner, OwnerError};
pub use role::Role;
