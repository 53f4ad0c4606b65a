//! An abstraction layer for hosted chat models.
//!
//! This crate establishes the protocol that the conversation layer uses to
//! talk to a model provider, so that the provider can be swapped (for
//! example, with a scripted fake in tests) without touching the rest of
//! the codebase.
//!
//! Types in this crate don't define any network behavior, instead they are
//! the constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod message;
mod provider;
mod request;

pub use error::*;
pub use message::*;
pub use provider::*;
pub use request::*;
