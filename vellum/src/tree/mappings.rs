//! The in-memory mapping database: packages and classes carrying
//! human-assigned names and documentation for compiled class members.
//!
//! Nested classes are not a tree here: a class named `Outer$Inner$Leaf` is
//! one flat entry whose name embeds the nesting. The hierarchy only gets
//! reconstructed when a codec needs it.

use std::fmt::{Display, Formatter};
use anyhow::{bail, Result};
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};
use crate::tree::ToKey;

/// The version of the mapping data format, a semantic version triple.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatVersion {
	pub major: u32,
	pub minor: u32,
	pub patch: u32,
}

impl FormatVersion {
	pub const CURRENT: FormatVersion = FormatVersion { major: 1, minor: 1, patch: 0 };
}

impl Display for FormatVersion {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
	}
}

/// The root of the mapping database.
///
/// Classes are keyed by their fully-slashed internal name, which may contain
/// `$` for nested classes; packages by their slash-separated name. Both maps
/// keep insertion order, and the codecs sort where their output format
/// demands a deterministic order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MappingData {
	pub version: FormatVersion,
	pub packages: IndexMap<String, PackageData>,
	pub classes: IndexMap<String, ClassData>,
}

impl Default for FormatVersion {
	fn default() -> FormatVersion {
		FormatVersion::CURRENT
	}
}

impl MappingData {
	pub fn new() -> MappingData {
		MappingData::default()
	}

	pub fn get_package(&self, name: &str) -> Option<&PackageData> {
		self.packages.get(name)
	}

	pub fn get_class(&self, name: &str) -> Option<&ClassData> {
		self.classes.get(name)
	}

	/// Returns the package of that name, inserting an empty one if absent.
	///
	/// Calling this twice with the same name returns the same entry.
	pub fn get_or_create_package(&mut self, name: &str) -> &mut PackageData {
		self.packages.entry(name.to_owned())
			.or_insert_with(|| PackageData::new(name))
	}

	/// Returns the class of that name, inserting an empty one if absent.
	///
	/// Calling this twice with the same name returns the same entry.
	pub fn get_or_create_class(&mut self, name: &str) -> &mut ClassData {
		self.classes.entry(name.to_owned())
			.or_insert_with(|| ClassData::new(name))
	}

	pub(crate) fn add_package(&mut self, package: PackageData) -> Result<()> {
		match self.packages.entry(package.get_key()) {
			Entry::Occupied(e) => {
				bail!("cannot add package for key {:?}, as there's already one: {:?}", e.key(), e.get());
			},
			Entry::Vacant(e) => {
				e.insert(package);
			},
		}

		Ok(())
	}

	pub(crate) fn add_class(&mut self, class: ClassData) -> Result<()> {
		match self.classes.entry(class.get_key()) {
			Entry::Occupied(e) => {
				bail!("cannot add class for key {:?}, as there's already one: {:?}", e.key(), e.get());
			},
			Entry::Vacant(e) => {
				e.insert(class);
			},
		}

		Ok(())
	}
}

/// A package entry, carrying only documentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageData {
	pub name: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub javadoc: Vec<String>,
}

impl PackageData {
	pub fn new(name: impl Into<String>) -> PackageData {
		PackageData {
			name: name.into(),
			javadoc: Vec::new(),
		}
	}

	pub fn add_javadoc(&mut self, line: impl Into<String>) {
		self.javadoc.push(line.into());
	}

	pub fn clear_javadoc(&mut self) {
		self.javadoc.clear();
	}
}

impl ToKey<String> for PackageData {
	fn get_key(&self) -> String {
		self.name.clone()
	}
}

/// A class entry.
///
/// Fields are keyed by name alone; methods by name and descriptor, since
/// overloads share a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassData {
	pub name: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub javadoc: Vec<String>,
	#[serde(default, with = "keyed_seq", skip_serializing_if = "IndexMap::is_empty")]
	pub fields: IndexMap<String, FieldData>,
	#[serde(default, with = "keyed_seq", skip_serializing_if = "IndexMap::is_empty")]
	pub methods: IndexMap<MethodKey, MethodData>,
}

impl ClassData {
	pub fn new(name: impl Into<String>) -> ClassData {
		ClassData {
			name: name.into(),
			javadoc: Vec::new(),
			fields: IndexMap::new(),
			methods: IndexMap::new(),
		}
	}

	/// A class with no documentation, fields or methods. Such entries also
	/// stand in for structural ancestors like `Outer` when only
	/// `Outer$Inner` carries data.
	pub fn is_empty(&self) -> bool {
		self.javadoc.is_empty() && self.fields.is_empty() && self.methods.is_empty()
	}

	pub fn get_field(&self, name: &str) -> Option<&FieldData> {
		self.fields.get(name)
	}

	pub fn get_method(&self, name: &str, descriptor: &str) -> Option<&MethodData> {
		let key = MethodKey {
			name: name.to_owned(),
			descriptor: descriptor.to_owned(),
		};
		self.methods.get(&key)
	}

	pub fn get_or_create_field(&mut self, name: &str, descriptor: &str) -> &mut FieldData {
		self.fields.entry(name.to_owned())
			.or_insert_with(|| FieldData::new(name, descriptor))
	}

	pub fn get_or_create_method(&mut self, name: &str, descriptor: &str) -> &mut MethodData {
		let key = MethodKey {
			name: name.to_owned(),
			descriptor: descriptor.to_owned(),
		};
		self.methods.entry(key)
			.or_insert_with(|| MethodData::new(name, descriptor))
	}

	pub fn add_javadoc(&mut self, line: impl Into<String>) {
		self.javadoc.push(line.into());
	}

	pub fn clear_javadoc(&mut self) {
		self.javadoc.clear();
	}
}

impl ToKey<String> for ClassData {
	fn get_key(&self) -> String {
		self.name.clone()
	}
}

/// A field entry. `mapped_name` is the human-assigned display name; absent
/// means the original name is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldData {
	pub name: String,
	pub descriptor: String,
	#[serde(rename = "mappedName", default, skip_serializing_if = "Option::is_none")]
	pub mapped_name: Option<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub javadoc: Vec<String>,
}

impl FieldData {
	pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> FieldData {
		FieldData {
			name: name.into(),
			descriptor: descriptor.into(),
			mapped_name: None,
			javadoc: Vec::new(),
		}
	}

	pub fn add_javadoc(&mut self, line: impl Into<String>) {
		self.javadoc.push(line.into());
	}

	pub fn clear_javadoc(&mut self) {
		self.javadoc.clear();
	}
}

impl ToKey<String> for FieldData {
	fn get_key(&self) -> String {
		self.name.clone()
	}
}

/// The key a method is stored under: overloads share a name, so the
/// descriptor is part of the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodKey {
	pub name: String,
	pub descriptor: String,
}

/// A method entry. Parameters are keyed by their JVM local-variable slot,
/// not by their position in the source parameter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodData {
	pub name: String,
	pub descriptor: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub javadoc: Vec<String>,
	#[serde(default, with = "keyed_seq", skip_serializing_if = "IndexMap::is_empty")]
	pub parameters: IndexMap<u8, ParameterData>,
}

impl MethodData {
	pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> MethodData {
		MethodData {
			name: name.into(),
			descriptor: descriptor.into(),
			javadoc: Vec::new(),
			parameters: IndexMap::new(),
		}
	}

	pub fn get_parameter(&self, index: u8) -> Option<&ParameterData> {
		self.parameters.get(&index)
	}

	pub fn get_or_create_parameter(&mut self, index: u8) -> &mut ParameterData {
		self.parameters.entry(index)
			.or_insert_with(|| ParameterData::new(index))
	}

	pub fn add_javadoc(&mut self, line: impl Into<String>) {
		self.javadoc.push(line.into());
	}

	pub fn clear_javadoc(&mut self) {
		self.javadoc.clear();
	}
}

impl ToKey<MethodKey> for MethodData {
	fn get_key(&self) -> MethodKey {
		MethodKey {
			name: self.name.clone(),
			descriptor: self.descriptor.clone(),
		}
	}
}

/// A parameter entry, keyed by JVM local-variable slot (0–127).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterData {
	pub index: u8,
	#[serde(rename = "mappedName", default, skip_serializing_if = "Option::is_none")]
	pub mapped_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub javadoc: Option<String>,
}

impl ParameterData {
	pub fn new(index: u8) -> ParameterData {
		ParameterData {
			index,
			mapped_name: None,
			javadoc: None,
		}
	}

	/// Appends a documentation line, joining with `\n` if one is already set.
	pub fn append_javadoc(&mut self, line: &str) {
		match &mut self.javadoc {
			Some(javadoc) => {
				javadoc.push('\n');
				javadoc.push_str(line);
			},
			None => self.javadoc = Some(line.to_owned()),
		}
	}
}

impl ToKey<u8> for ParameterData {
	fn get_key(&self) -> u8 {
		self.index
	}
}

/// The owned mapping database, tagged with its mutability.
///
/// The read-only variant rejects mutation: [`try_mutate`][Self::try_mutate]
/// returns [`None`] and callers degrade to a no-op. Building a writable
/// container from a read-only one deep-copies every level, so mutations of
/// the copy never reach the source.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingContainer {
	ReadOnly(MappingData),
	Writable(MappingData),
}

impl MappingContainer {
	pub fn data(&self) -> &MappingData {
		match self {
			MappingContainer::ReadOnly(data) => data,
			MappingContainer::Writable(data) => data,
		}
	}

	pub fn try_mutate(&mut self) -> Option<&mut MappingData> {
		match self {
			MappingContainer::ReadOnly(_) => None,
			MappingContainer::Writable(data) => Some(data),
		}
	}

	pub fn is_writable(&self) -> bool {
		matches!(self, MappingContainer::Writable(_))
	}

	pub fn to_writable(&self) -> MappingContainer {
		MappingContainer::Writable(self.data().clone())
	}

	pub fn into_read_only(self) -> MappingContainer {
		match self {
			MappingContainer::ReadOnly(data) => MappingContainer::ReadOnly(data),
			MappingContainer::Writable(data) => MappingContainer::ReadOnly(data),
		}
	}
}

/// Serializes an [`IndexMap`] as a sequence of its values, and rebuilds the
/// map on deserialization from each value's [`ToKey`] key. A repeated key is
/// a deserialization error, never a silent overwrite.
mod keyed_seq {
	use std::fmt::Debug;
	use std::hash::Hash;
	use indexmap::IndexMap;
	use serde::{Deserialize, Deserializer, Serialize, Serializer};
	use serde::de::Error;
	use crate::tree::ToKey;

	pub(super) fn serialize<K, V, S>(map: &IndexMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
	where
		V: Serialize,
		S: Serializer,
	{
		serializer.collect_seq(map.values())
	}

	pub(super) fn deserialize<'de, K, V, D>(deserializer: D) -> Result<IndexMap<K, V>, D::Error>
	where
		K: Hash + Eq + Debug,
		V: Deserialize<'de> + ToKey<K>,
		D: Deserializer<'de>,
	{
		let values = Vec::<V>::deserialize(deserializer)?;

		let mut map = IndexMap::with_capacity(values.len());
		for value in values {
			let key = value.get_key();
			if map.contains_key(&key) {
				return Err(D::Error::custom(format_args!("duplicate entry for key {key:?}")));
			}
			map.insert(key, value);
		}
		Ok(map)
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use super::{MappingContainer, MappingData};

	#[test]
	fn get_or_create_is_idempotent() {
		let mut data = MappingData::new();

		data.get_or_create_class("a/B").add_javadoc("a class");
		let class = data.get_or_create_class("a/B");
		assert_eq!(class.javadoc, vec!["a class".to_owned()]);

		class.get_or_create_method("m", "(I)V").get_or_create_parameter(1).mapped_name = Some("x".to_owned());
		let parameter = class.get_or_create_method("m", "(I)V").get_or_create_parameter(1);
		assert_eq!(parameter.mapped_name.as_deref(), Some("x"));

		assert_eq!(data.classes.len(), 1);
	}

	#[test]
	fn overloads_are_distinct_methods() {
		let mut data = MappingData::new();
		let class = data.get_or_create_class("a/B");

		class.get_or_create_method("m", "(I)V");
		class.get_or_create_method("m", "(J)V");

		assert_eq!(class.methods.len(), 2);
	}

	#[test]
	fn writable_copy_does_not_alias() {
		let mut data = MappingData::new();
		data.get_or_create_class("a/B").add_javadoc("original");
		let read_only = MappingContainer::ReadOnly(data);

		let mut copy = read_only.to_writable();
		let mutable = copy.try_mutate().unwrap();
		mutable.get_or_create_class("a/B").clear_javadoc();
		mutable.get_or_create_class("c/D");

		assert_eq!(read_only.data().get_class("a/B").unwrap().javadoc, vec!["original".to_owned()]);
		assert!(read_only.data().get_class("c/D").is_none());
	}

	#[test]
	fn read_only_rejects_mutation() {
		let mut container = MappingContainer::ReadOnly(MappingData::new());
		assert!(container.try_mutate().is_none());
		assert!(!container.is_writable());

		let mut container = container.to_writable();
		assert!(container.try_mutate().is_some());
	}
}
