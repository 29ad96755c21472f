use anyhow::Result;
use pretty_assertions::assert_eq;
use vellum::json;
use vellum::tree::mappings::MappingData;

fn sample_data() -> MappingData {
	let mut data = MappingData::new();
	data.get_or_create_package("a/b").add_javadoc("docs");

	let class = data.get_or_create_class("a/b/C");
	class.add_javadoc("a class");
	let field = class.get_or_create_field("f", "J");
	field.mapped_name = Some("total".to_owned());
	let method = class.get_or_create_method("m", "(D)V");
	let parameter = method.get_or_create_parameter(1);
	parameter.mapped_name = Some("x".to_owned());
	parameter.javadoc = Some("the value".to_owned());

	data.get_or_create_class("a/b/C$Inner");
	data
}

#[test]
fn round_trip() -> Result<()> {
	let data = sample_data();

	let written = json::write_string(&data)?;
	let read_back = json::read(written.as_bytes())?;

	assert_eq!(read_back, data);
	Ok(())
}

#[test]
fn document_shape() -> Result<()> {
	let data = sample_data();
	let written = json::write_string(&data)?;

	let value: serde_json::Value = serde_json::from_str(&written)?;
	assert_eq!(value["formatVersion"]["major"], 1);
	assert_eq!(value["classes"][0]["name"], "a/b/C");
	assert_eq!(value["classes"][0]["fields"][0]["mappedName"], "total");
	assert_eq!(value["classes"][0]["methods"][0]["parameters"][0]["index"], 1);

	// the dataless inner class serializes without empty member arrays
	assert_eq!(value["classes"][1]["name"], "a/b/C$Inner");
	assert!(value["classes"][1].get("fields").is_none());
	assert!(value["classes"][1].get("javadoc").is_none());

	Ok(())
}

#[test]
fn missing_collections_default_to_empty() -> Result<()> {
	let input = r#"{ "formatVersion": { "major": 1, "minor": 1, "patch": 0 } }"#;
	let data = json::read(input.as_bytes())?;

	assert!(data.packages.is_empty());
	assert!(data.classes.is_empty());
	Ok(())
}

#[test]
fn missing_version_is_an_error() {
	assert!(json::read(r#"{ "classes": [] }"#.as_bytes()).is_err());
}

#[test]
fn duplicate_entries_are_an_error() {
	let input = r#"{
		"formatVersion": { "major": 1, "minor": 1, "patch": 0 },
		"classes": [ { "name": "a/B" }, { "name": "a/B" } ]
	}"#;
	assert!(json::read(input.as_bytes()).is_err());

	let input = r#"{
		"formatVersion": { "major": 1, "minor": 1, "patch": 0 },
		"classes": [ { "name": "a/B", "methods": [
			{ "name": "m", "descriptor": "(I)V" },
			{ "name": "m", "descriptor": "(I)V" }
		] } ]
	}"#;
	assert!(json::read(input.as_bytes()).is_err());
}

#[test]
fn overloads_deserialize_side_by_side() -> Result<()> {
	let input = r#"{
		"formatVersion": { "major": 1, "minor": 1, "patch": 0 },
		"classes": [ { "name": "a/B", "methods": [
			{ "name": "m", "descriptor": "(I)V" },
			{ "name": "m", "descriptor": "(J)V" }
		] } ]
	}"#;
	let data = json::read(input.as_bytes())?;

	let class = data.get_class("a/B").unwrap();
	assert_eq!(class.methods.len(), 2);
	assert!(class.get_method("m", "(I)V").is_some());
	assert!(class.get_method("m", "(J)V").is_some());
	Ok(())
}
