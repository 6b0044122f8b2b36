//! Core types and trait definitions for the arbitration case registry.
//!
//! This crate is free of database and CLI dependencies. Storage backends and
//! the command-line front end both depend on it.

pub mod case;
pub mod error;
pub mod store;

pub use case::{ArbitrationCase, CaseNumber, CaseRecord, Inn};
pub use error::{Error, Result};
