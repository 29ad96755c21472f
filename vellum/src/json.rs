//! Reading and writing the whole mapping database as one JSON document.
//!
//! The document mirrors the data model directly:
//!
//! ```json
//! {
//!   "formatVersion": { "major": 1, "minor": 1, "patch": 0 },
//!   "packages": [ { "name": "a/b", "javadoc": ["..."] } ],
//!   "classes": [ { "name": "a/b/C", "fields": [], "methods": [] } ]
//! }
//! ```
//!
//! Empty javadoc and member collections are omitted on write and default to
//! empty on read. Packages and classes are written sorted by name, so the
//! document is deterministic; on read, a repeated package or class name is
//! an error.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use crate::tree::mappings::{ClassData, FormatVersion, MappingData, PackageData};

#[derive(Serialize)]
struct DocumentRef<'a> {
	#[serde(rename = "formatVersion")]
	format_version: FormatVersion,
	packages: Vec<&'a PackageData>,
	classes: Vec<&'a ClassData>,
}

#[derive(Deserialize)]
struct Document {
	#[serde(rename = "formatVersion")]
	format_version: FormatVersion,
	#[serde(default)]
	packages: Vec<PackageData>,
	#[serde(default)]
	classes: Vec<ClassData>,
}

/// Reads a mapping database from a JSON document.
pub fn read(reader: impl Read) -> Result<MappingData> {
	let document: Document = serde_json::from_reader(reader)
		.context("failed to deserialize mapping data from json")?;

	let mut data = MappingData::new();
	data.version = document.format_version;
	for package in document.packages {
		data.add_package(package)?;
	}
	for class in document.classes {
		data.add_class(class)?;
	}

	Ok(data)
}

/// Reads a mapping database from a `.json` file.
pub fn read_file(path: impl AsRef<Path>) -> Result<MappingData> {
	let path = path.as_ref();
	let file = File::open(path)
		.with_context(|| anyhow!("failed to open mappings file {path:?}"))?;
	read(file)
		.with_context(|| anyhow!("failed to read mappings file {path:?} as json"))
}

/// Writes a mapping database as a JSON document.
pub fn write(data: &MappingData, writer: impl Write) -> Result<()> {
	let mut packages: Vec<&PackageData> = data.packages.values().collect();
	packages.sort_by(|a, b| a.name.cmp(&b.name));

	let mut classes: Vec<&ClassData> = data.classes.values().collect();
	classes.sort_by(|a, b| a.name.cmp(&b.name));

	let document = DocumentRef {
		format_version: data.version,
		packages,
		classes,
	};

	serde_json::to_writer_pretty(writer, &document)
		.context("failed to serialize mapping data to json")
}

/// Writes a mapping database to a `.json` file, creating parent directories
/// as needed.
pub fn write_file(data: &MappingData, path: impl AsRef<Path>) -> Result<()> {
	let path = path.as_ref();

	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)
			.with_context(|| anyhow!("failed to create parent directories for mappings file {path:?}"))?;
	}

	let file = File::create(path)
		.with_context(|| anyhow!("failed to create mappings file {path:?}"))?;
	write(data, BufWriter::new(file))
		.with_context(|| anyhow!("failed to write mappings file {path:?}"))
}

/// Writes the given mapping database into a `String`.
///
/// This method is of most use in test cases, where you also use the
/// `pretty_assertions` crate for viewing string diffs.
pub fn write_string(data: &MappingData) -> Result<String> {
	let mut vec = Vec::new();
	write(data, &mut vec)?;
	String::from_utf8(vec).context("failed to convert written mappings to utf8")
}
