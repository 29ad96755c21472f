//! Crate for storing human-assigned names and documentation for members of
//! compiled classes, and for reading and writing that data in three on-disk
//! forms.
//!
//! The data model lives in [`tree`]: a container of packages and classes,
//! where nested classes are flat entries whose names embed `$`-separated
//! segments. Fields, methods and method parameters hang off their class,
//! keyed by JVM-level identity (name, descriptor, local-variable slot).
//!
//! Three codecs move the model to and from disk:
//! - [`enigma_dir`]: a directory of line-oriented `.mapping` files, one per
//!   top-level class, with nested classes folded into their outer class's
//!   file, plus `info.json` and `packages.json` sidecars;
//! - [`json`]: a single JSON document mirroring the model;
//! - [`archive`]: the same JSON document stored as the single entry
//!   `parchment.json` of a ZIP archive.
//!
//! [`format::MappingFormat`] infers the codec from a path and dispatches.

pub mod archive;
pub mod enigma_dir;
pub mod enigma_file;
pub mod format;
pub mod json;
pub mod tree;
