//! Choosing a codec from a path.

use std::path::Path;
use anyhow::Result;
use log::debug;
use crate::tree::mappings::MappingData;

/// The three on-disk forms of the mapping database.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MappingFormat {
	/// A directory of `.mapping` files, see [`crate::enigma_dir`].
	EnigmaDirectory,
	/// A single `.json` document, see [`crate::json`].
	Json,
	/// A `.zip` archive holding that document, see [`crate::archive`].
	Archive,
}

impl MappingFormat {
	/// Infers the format from a path: `.json` and `.zip` select the
	/// single-file codecs, everything else is treated as a directory.
	pub fn detect(path: impl AsRef<Path>) -> MappingFormat {
		match path.as_ref().extension() {
			Some(extension) if extension == "json" => MappingFormat::Json,
			Some(extension) if extension == "zip" => MappingFormat::Archive,
			_ => MappingFormat::EnigmaDirectory,
		}
	}

	pub fn read(self, path: impl AsRef<Path>) -> Result<MappingData> {
		match self {
			MappingFormat::EnigmaDirectory => crate::enigma_dir::read(path),
			MappingFormat::Json => crate::json::read_file(path),
			MappingFormat::Archive => crate::archive::read_file(path),
		}
	}

	pub fn write(self, data: &MappingData, path: impl AsRef<Path>) -> Result<()> {
		match self {
			MappingFormat::EnigmaDirectory => {
				let summary = crate::enigma_dir::write(data, path)?;
				debug!("enigma directory write: {summary:?}");
				Ok(())
			},
			MappingFormat::Json => crate::json::write_file(data, path),
			MappingFormat::Archive => crate::archive::write_file(data, path),
		}
	}
}

#[cfg(test)]
mod testing {
	use super::MappingFormat;

	#[test]
	fn detection_follows_the_extension() {
		assert_eq!(MappingFormat::detect("mappings/parchment.json"), MappingFormat::Json);
		assert_eq!(MappingFormat::detect("mappings/parchment.zip"), MappingFormat::Archive);
		assert_eq!(MappingFormat::detect("mappings"), MappingFormat::EnigmaDirectory);
		assert_eq!(MappingFormat::detect("mappings.d"), MappingFormat::EnigmaDirectory);
	}
}
