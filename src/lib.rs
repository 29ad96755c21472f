//! The mapping registry: owns the loaded mapping database and answers
//! member-identity lookups for it.
//!
//! The heavy lifting lives in the member crates: `vellum` holds the data
//! model and the three on-disk codecs, `nib` the descriptor and
//! local-variable-slot computations. This crate ties them together behind
//! [`MappingRegistry`], and adds the [`rename`] bridge that translates a
//! build tool's naming scheme into the names the database is keyed by
//! before a lookup runs.

pub mod registry;
pub mod rename;

pub use registry::MappingRegistry;
