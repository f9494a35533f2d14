//! Shared domain model for the Orpheus lecture-generation control plane.
//!
//! Everything that crosses a crate boundary lives here: the wire entities
//! (persona, prompt, retrieval chunks, lecture script, slide structure), the
//! Status record with its patch fold, the shared error type, and the
//! environment-driven configuration.

pub mod config;
pub mod error;
pub mod persona;
pub mod prompt;
pub mod retrieval;
pub mod script;
pub mod slides;
pub mod status;

pub use error::{Error, Result};
