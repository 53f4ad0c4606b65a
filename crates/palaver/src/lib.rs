//! A terminal chat client for hosted language models.
//!
//! The crate includes a CLI tool for using in the terminal. And you can also
//! use [`Session`] as a library to hold a conversation from your own code.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

pub mod config;
#[cfg(feature = "cli")]
pub mod repl;
mod session;

pub use session::{Session, SessionBuilder};

/// Re-exports of [`palaver_core`] crate.
pub mod core {
    pub use palaver_core::*;
}
