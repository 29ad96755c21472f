use anyhow::Result;
use pretty_assertions::assert_eq;
use vellum::format::MappingFormat;
use vellum::tree::mappings::MappingData;

/// Converting through every on-disk form preserves the data.
#[test]
fn conversion_chain() -> Result<()> {
	let dir = tempfile::tempdir()?;

	let mut data = MappingData::new();
	data.get_or_create_package("a").add_javadoc("package docs");
	let class = data.get_or_create_class("a/B$Inner");
	class.get_or_create_field("f", "I");
	class.get_or_create_method("m", "(J)V")
		.get_or_create_parameter(1)
		.mapped_name = Some("value".to_owned());
	// the ancestor exists explicitly, so the directory form is lossless
	data.get_or_create_class("a/B");

	let enigma = dir.path().join("enigma");
	let json = dir.path().join("mappings.json");
	let zip = dir.path().join("mappings.zip");

	MappingFormat::detect(&enigma).write(&data, &enigma)?;
	let from_enigma = MappingFormat::detect(&enigma).read(&enigma)?;
	assert_eq!(from_enigma, data);

	MappingFormat::detect(&json).write(&from_enigma, &json)?;
	let from_json = MappingFormat::detect(&json).read(&json)?;
	assert_eq!(from_json, data);

	MappingFormat::detect(&zip).write(&from_json, &zip)?;
	let from_zip = MappingFormat::detect(&zip).read(&zip)?;
	assert_eq!(from_zip, data);

	Ok(())
}
