use anyhow::Result;
use pretty_assertions::assert_eq;
use nib::{MemberReference, SyntheticParams};
use scrivener::rename::RenameTable;
use scrivener::MappingRegistry;
use vellum::tree::mappings::{MappingContainer, MappingData};

fn sample_data() -> MappingData {
	let mut data = MappingData::new();

	let class = data.get_or_create_class("net/example/Thing");
	class.get_or_create_field("count", "I").add_javadoc("the count");
	let method = class.get_or_create_method("grow", "(IJ)V");
	method.add_javadoc("makes it bigger");
	let parameter = method.get_or_create_parameter(1);
	parameter.mapped_name = Some("amount".to_owned());
	parameter.javadoc = Some("by how much".to_owned());

	data
}

fn loaded_registry() -> MappingRegistry {
	let mut registry = MappingRegistry::new();
	registry.replace_container(Some(MappingContainer::Writable(sample_data())));
	registry
}

#[test]
fn lookups_without_a_rename_table_match_raw_identities() {
	let registry = loaded_registry();

	let reference = MemberReference::new(
		"grow",
		Some("(IJ)V".to_owned()),
		Some("net/example/Thing".to_owned()),
	);

	let method = registry.get_method_data(&reference, None).unwrap();
	assert_eq!(method.javadoc, vec!["makes it bigger".to_owned()]);

	// unqualified and descriptor-less references cannot match
	assert!(registry.get_method_data(&reference.without_owner(), None).is_none());
	let no_descriptor = MemberReference::new("grow", None, Some("net/example/Thing".to_owned()));
	assert!(registry.get_method_data(&no_descriptor, None).is_none());
}

#[test]
fn lookups_normalize_through_the_rename_table() {
	let registry = loaded_registry();

	// the build tool knows the class and method under different names
	let mut table = RenameTable::empty();
	table.insert_class("tool/C_77", "net/example/Thing");
	table.insert_method("tool/C_77", "method_12", "(IJ)V", "grow");
	table.insert_field("tool/C_77", "field_3", "count");

	let method_reference = MemberReference::new(
		"method_12",
		Some("(IJ)V".to_owned()),
		Some("tool/C_77".to_owned()),
	);
	let method = registry.get_method_data(&method_reference, Some(&table)).unwrap();
	assert_eq!(method.javadoc, vec!["makes it bigger".to_owned()]);

	let field_reference = MemberReference::new(
		"field_3",
		Some("I".to_owned()),
		Some("tool/C_77".to_owned()),
	);
	let field = registry.get_field_data(&field_reference, Some(&table)).unwrap();
	assert_eq!(field.javadoc, vec!["the count".to_owned()]);

	// the raw identity no longer matches once the table is in play
	let raw = MemberReference::new("grow", Some("(IJ)V".to_owned()), Some("net/example/Thing".to_owned()));
	assert!(registry.get_method_data(&raw, Some(&table)).is_some()); // falls through the table unchanged
	assert!(registry.get_method_data(&method_reference, None).is_none());
}

#[test]
fn parameters_resolve_by_surface_position() {
	let registry = loaded_registry();

	let reference = MemberReference::new(
		"grow",
		Some("(IJ)V".to_owned()),
		Some("net/example/Thing".to_owned()),
	);

	// surface parameter 0 of an instance method sits in slot 1
	let parameter = registry
		.get_parameter_data(&reference, false, &SyntheticParams::None, 0, None)
		.unwrap();
	assert_eq!(parameter.mapped_name.as_deref(), Some("amount"));

	// surface parameter 1 sits in slot 2, which carries no name
	assert!(registry.get_parameter_data(&reference, false, &SyntheticParams::None, 1, None).is_none());
}

#[test]
fn inner_class_constructor_parameters_are_offset() {
	let mut registry = MappingRegistry::new();
	let mut data = MappingData::new();
	data.get_or_create_class("outer/Outer$Inner")
		.get_or_create_method("<init>", "(Louter/Outer;I)V")
		.get_or_create_parameter(2)
		.mapped_name = Some("size".to_owned());
	registry.replace_container(Some(MappingContainer::Writable(data)));

	// the declared parameter list is just `(I)V`; the compiled descriptor
	// carries the enclosing instance first
	let reference = MemberReference::new(
		"<init>",
		Some("(Louter/Outer;I)V".to_owned()),
		Some("outer/Outer$Inner".to_owned()),
	);
	let synthetic = SyntheticParams::OuterInstance { owner: "outer/Outer".to_owned() };

	let parameter = registry
		.get_parameter_data(&reference, false, &synthetic, 0, None)
		.unwrap();
	assert_eq!(parameter.mapped_name.as_deref(), Some("size"));
}

#[test]
fn read_only_containers_reject_creation() {
	let mut registry = MappingRegistry::new();
	registry.replace_container(Some(MappingContainer::ReadOnly(sample_data())));

	assert!(registry.get_or_create_class_data("net/example/New", None).is_none());
	assert!(!registry.is_modified());

	// plain lookups still work
	assert!(registry.get_class_data("net/example/Thing", None).is_some());
}

#[test]
fn creation_marks_the_registry_modified() {
	let mut registry = loaded_registry();
	assert!(!registry.is_modified());

	// fetching an existing entry through the creating lookup changes nothing
	let reference = MemberReference::new("grow", Some("(IJ)V".to_owned()), Some("net/example/Thing".to_owned()));
	registry.get_or_create_method_data(&reference, None).unwrap();
	assert!(!registry.is_modified());

	let class = registry.get_or_create_class_data("net/example/New", None).unwrap();
	class.add_javadoc("created");

	assert!(registry.is_modified());
	assert!(registry.get_class_data("net/example/New", None).is_some());
}

#[test]
fn load_save_reset_cycle() -> Result<()> {
	let dir = tempfile::tempdir()?;
	let path = dir.path().join("mappings.json");

	vellum::json::write_file(&sample_data(), &path)?;

	let mut registry = MappingRegistry::new();
	registry.load(&path)?;
	assert!(registry.is_loaded());
	assert_eq!(registry.mappings_path(), Some(path.as_path()));
	assert_eq!(registry.data().unwrap(), &sample_data());

	// mutate, then reset back to the on-disk state
	registry.get_or_create_class_data("net/example/Scratch", None).unwrap();
	assert!(registry.is_modified());

	registry.reset_mapping_container()?;
	assert!(!registry.is_modified());
	assert!(registry.get_class_data("net/example/Scratch", None).is_none());

	// mutate and save; a fresh load sees the change
	registry.get_or_create_class_data("net/example/Kept", None).unwrap();
	registry.save_in_place()?;
	assert!(!registry.is_modified());

	registry.reset_mapping_container()?;
	assert!(registry.get_class_data("net/example/Kept", None).is_some());

	Ok(())
}

#[test]
fn failed_loads_clear_the_configured_path() {
	let mut registry = MappingRegistry::new();

	let missing = std::path::Path::new("/definitely/not/here/mappings.json");
	assert!(registry.load(missing).is_err());

	assert!(!registry.is_loaded());
	assert_eq!(registry.mappings_path(), None);

	// with no remembered location, a reset is a no-op unload
	registry.reset_mapping_container().unwrap();
	assert!(!registry.is_loaded());
}

#[test]
fn method_javadoc_renders_param_lines() {
	let registry = loaded_registry();

	let reference = MemberReference::new(
		"grow",
		Some("(IJ)V".to_owned()),
		Some("net/example/Thing".to_owned()),
	);

	let javadoc = registry.method_javadoc(&reference, None).unwrap();
	assert_eq!(javadoc, "makes it bigger\n@param amount by how much");
}
