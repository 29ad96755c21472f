//! Reading and writing the JSON document inside a ZIP archive.
//!
//! The archive contains exactly one entry, [`ARCHIVE_ENTRY`], whose content
//! is the single-file JSON format of the [`crate::json`] module. Everything
//! else delegates there.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;
use anyhow::{anyhow, Context, Result};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};
use crate::tree::mappings::MappingData;

/// The fixed path of the JSON document inside the archive.
pub const ARCHIVE_ENTRY: &str = "parchment.json";

/// Reads a mapping database from a ZIP archive.
pub fn read(reader: impl Read + Seek) -> Result<MappingData> {
	let mut zip = ZipArchive::new(reader)
		.context("failed to read zip archive")?;

	let entry = zip.by_name(ARCHIVE_ENTRY)
		.with_context(|| anyhow!("archive has no {ARCHIVE_ENTRY:?} entry"))?;

	crate::json::read(entry)
		.with_context(|| anyhow!("failed to read {ARCHIVE_ENTRY:?} from archive"))
}

/// Reads a mapping database from a `.zip` file.
pub fn read_file(path: impl AsRef<Path>) -> Result<MappingData> {
	let path = path.as_ref();
	let file = File::open(path)
		.with_context(|| anyhow!("failed to open mappings archive {path:?}"))?;
	read(BufReader::new(file))
		.with_context(|| anyhow!("failed to read mappings archive {path:?}"))
}

/// Writes a mapping database as a ZIP archive with the single entry
/// [`ARCHIVE_ENTRY`].
pub fn write(data: &MappingData, writer: impl Write + Seek) -> Result<()> {
	let mut zip = ZipWriter::new(writer);

	zip.start_file(ARCHIVE_ENTRY, SimpleFileOptions::default())
		.with_context(|| anyhow!("failed to start archive entry {ARCHIVE_ENTRY:?}"))?;
	crate::json::write(data, &mut zip)?;

	zip.finish().context("failed to finish writing the archive")?;
	Ok(())
}

/// Writes a mapping database to a `.zip` file, creating parent directories
/// as needed.
pub fn write_file(data: &MappingData, path: impl AsRef<Path>) -> Result<()> {
	let path = path.as_ref();

	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)
			.with_context(|| anyhow!("failed to create parent directories for mappings archive {path:?}"))?;
	}

	let file = File::create(path)
		.with_context(|| anyhow!("failed to create mappings archive {path:?}"))?;
	write(data, BufWriter::new(file))
		.with_context(|| anyhow!("failed to write mappings archive {path:?}"))
}
