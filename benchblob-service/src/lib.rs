//! Core logic for generating incompressible benchmark files.
//!
//! This crate holds everything below the CLI surface: the size ladder,
//! capability detection, the two generation strategies, the disk-space guard,
//! the resume marker, and the index renderers. It is designed as a library
//! crate to be used by the `benchblob` binary.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod capabilities;
pub mod diskspace;
mod error;
pub mod generate;
pub mod index;
pub mod resume;
pub mod sizes;

pub use error::GeneratorError;
