//! # Domain Layer
//!
//! Pure resolution logic: alias codecs, the not-found policy and the shared
//! resolution cache.
//!
//! ## Hexagonal Architecture
//!
//! This module performs NO store I/O. Reads go through the
//! [`ResolutionStore`](crate::ports::ResolutionStore) port.

pub mod alias;
pub mod cache;
pub mod policy;

pub use alias::*;
pub use cache::*;
pub use policy::*;
