//! Reading and writing a mapping database as a directory of `.mapping`
//! files.
//!
//! # Layout
//! The directory root holds `info.json` (the format version),
//! `packages.json` (package documentation) and one `.mapping` file per
//! top-level class, named after the class; a class `a/b/C` lands in
//! `a/b/C.mapping`. Nested classes live inside their outer class's file,
//! see [`crate::enigma_file`] for the line grammar.
//!
//! # Reading
//! [`read`] fails on the first malformed file: a partially loaded database
//! is never returned. The `info.json` version is mandatory.
//!
//! # Writing
//! [`write`] only touches files whose content actually changed, keeps the
//! newline style a pre-existing file already uses, and deletes files under
//! the output root it did not regenerate, so repeated writes of an
//! unchanged database leave the directory untouched.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexSet;
use log::debug;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;
use crate::enigma_file;
use crate::tree::mappings::{FormatVersion, MappingData, PackageData};

const MAPPING_EXTENSION: &str = "mapping";
const INFO_JSON: &str = "info.json";
const PACKAGES_JSON: &str = "packages.json";

/// The content of `info.json`. The version is not optional: a directory
/// without one is rejected as a whole.
#[derive(Debug, Serialize, Deserialize)]
struct DataInfo {
	version: FormatVersion,
}

/// What a [`write`] pass actually did to the file system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteSummary {
	/// Files created or rewritten because their content changed.
	pub written: usize,
	/// Stale files deleted because nothing regenerated them.
	pub deleted: usize,
}

/// Reads a mapping directory.
///
/// Any malformed `.mapping` file, as well as a missing or malformed
/// `info.json` or `packages.json`, fails the whole read.
pub fn read(path: impl AsRef<Path>) -> Result<MappingData> {
	let path = path.as_ref();

	let info: DataInfo = read_json_file(&path.join(INFO_JSON))?;
	let packages: Vec<PackageData> = read_json_file(&path.join(PACKAGES_JSON))?;

	let mut data = MappingData::new();
	data.version = info.version;
	for package in packages {
		let entry = data.get_or_create_package(&package.name);
		entry.javadoc.extend(package.javadoc);
	}

	for entry in WalkDir::new(path).sort_by_file_name() {
		let entry = entry.with_context(|| anyhow!("failed to walk mappings directory {path:?}"))?;
		if entry.file_type().is_file() && entry.path().extension().is_some_and(|extension| extension == MAPPING_EXTENSION) {
			enigma_file::read_file_into(entry.path(), &mut data)?;
		}
	}

	Ok(data)
}

fn read_json_file<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
	let file = File::open(path)
		.with_context(|| anyhow!("failed to open {path:?}"))?;
	serde_json::from_reader(file)
		.with_context(|| anyhow!("failed to parse {path:?}"))
}

/// Writes a mapping directory, returning what actually changed on disk.
pub fn write(data: &MappingData, path: impl AsRef<Path>) -> Result<WriteSummary> {
	let path = path.as_ref();

	// everything under the root that this pass does not regenerate is stale
	let mut stale: IndexSet<PathBuf> = IndexSet::new();
	if path.exists() {
		for entry in WalkDir::new(path) {
			let entry = entry.with_context(|| anyhow!("failed to walk output directory {path:?}"))?;
			if entry.file_type().is_file() {
				stale.insert(entry.into_path());
			}
		}
	}

	std::fs::create_dir_all(path)
		.with_context(|| anyhow!("failed to create output directory {path:?}"))?;

	let mut summary = WriteSummary::default();

	let info_json = path.join(INFO_JSON);
	stale.swap_remove(&info_json);
	let info = DataInfo { version: data.version };
	write_if_changed(&info_json, &to_pretty_json(&info)?, &mut summary)?;

	let packages_json = path.join(PACKAGES_JSON);
	stale.swap_remove(&packages_json);
	let mut packages: Vec<&PackageData> = data.packages.values().collect();
	packages.sort_by(|a, b| a.name.cmp(&b.name));
	write_if_changed(&packages_json, &to_pretty_json(&packages)?, &mut summary)?;

	let tree = enigma_file::ClassTree::build(data);
	for top_level in tree.top_level() {
		let target = mapping_file_path(path, top_level)?;

		if let Some(parent) = target.parent() {
			std::fs::create_dir_all(parent)
				.with_context(|| anyhow!("failed to create parent directories for mapping file {target:?}"))?;
		}

		stale.swap_remove(&target);

		let current = read_existing(&target)?;
		let newline = match &current {
			Some(current) if current.contains('\r') => "\r\n",
			_ => "\n",
		};

		let content = enigma_file::render_top_level(data, &tree, top_level, newline);
		if current.as_deref() != Some(&content) {
			std::fs::write(&target, &content)
				.with_context(|| anyhow!("failed to write mapping file {target:?}"))?;
			summary.written += 1;
		}
	}

	for leftover in stale {
		std::fs::remove_file(&leftover)
			.with_context(|| anyhow!("failed to delete stale file {leftover:?}"))?;
		summary.deleted += 1;
	}

	debug!("wrote mapping directory {path:?}: {} files written, {} stale files deleted", summary.written, summary.deleted);

	Ok(summary)
}

fn mapping_file_path(path: &Path, class_name: &str) -> Result<PathBuf> {
	if class_name.contains('.') {
		bail!("class name {class_name:?} contains '.'");
	}
	let file_name = Path::new(class_name);
	if file_name.is_absolute() {
		bail!("path relative to target write path {path:?} is absolute: {file_name:?}");
	}

	let mut target = path.join(file_name);
	target.set_extension(MAPPING_EXTENSION);
	Ok(target)
}

fn read_existing(path: &Path) -> Result<Option<String>> {
	match File::open(path) {
		Ok(mut file) => {
			let mut content = String::new();
			file.read_to_string(&mut content)
				.with_context(|| anyhow!("failed to read existing mapping file {path:?}"))?;
			Ok(Some(content))
		},
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
		Err(e) => Err(e).with_context(|| anyhow!("failed to open existing mapping file {path:?}")),
	}
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
	serde_json::to_string_pretty(value).context("failed to serialize json")
}

fn write_if_changed(path: &Path, content: &str, summary: &mut WriteSummary) -> Result<()> {
	if read_existing(path)?.as_deref() != Some(content) {
		std::fs::write(path, content)
			.with_context(|| anyhow!("failed to write {path:?}"))?;
		summary.written += 1;
	}
	Ok(())
}
