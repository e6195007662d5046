//! The benchblob CLI.
//!
//! This builds on top of [`benchblob_service`] and exposes the generation
//! pipeline as a command line tool with YAML/env configuration.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod cli;
pub mod config;
pub mod observability;
pub mod pipeline;
