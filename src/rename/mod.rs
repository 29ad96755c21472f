//! The rename table bridging a build tool's naming scheme to the names the
//! mapping database is keyed by.
//!
//! A table is loaded from a two-column mapping file ([`RenameTable::read`]),
//! where class lines are unindented and member lines are indented below
//! their class:
//!
//! ```text
//! a/B x/Y
//! 	count total
//! 	m (I)V made
//! ```
//!
//! Tables compose: [`chain`][RenameTable::chain] follows two tables in
//! sequence, [`reverse`][RenameTable::reverse] flips the direction. The
//! usual pairing, a "client" table chained with an "extract" table and then
//! reversed, is bundled in [`RenameTable::compose`].
//!
//! Every `remap_*` lookup falls back to the input name, so a missing entry
//! (or an entirely [`empty`][RenameTable::empty] table) leaves identities
//! unchanged.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;

pub mod cache;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FieldKey {
	owner: String,
	name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MethodKey {
	owner: String,
	name: String,
	descriptor: String,
}

/// A class, field and method renaming map.
///
/// Field and method entries are keyed by their owner class (and for methods
/// the descriptor) in the table's *source* namespace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenameTable {
	classes: IndexMap<String, String>,
	fields: IndexMap<FieldKey, String>,
	methods: IndexMap<MethodKey, String>,
}

impl RenameTable {
	/// A table with no entries; every lookup falls through unchanged.
	pub fn empty() -> RenameTable {
		RenameTable::default()
	}

	pub fn is_empty(&self) -> bool {
		self.classes.is_empty() && self.fields.is_empty() && self.methods.is_empty()
	}

	pub fn insert_class(&mut self, src: impl Into<String>, dst: impl Into<String>) {
		self.classes.insert(src.into(), dst.into());
	}

	pub fn insert_field(&mut self, owner: impl Into<String>, src: impl Into<String>, dst: impl Into<String>) {
		let key = FieldKey {
			owner: owner.into(),
			name: src.into(),
		};
		self.fields.insert(key, dst.into());
	}

	pub fn insert_method(
		&mut self,
		owner: impl Into<String>,
		src: impl Into<String>,
		descriptor: impl Into<String>,
		dst: impl Into<String>,
	) {
		let key = MethodKey {
			owner: owner.into(),
			name: src.into(),
			descriptor: descriptor.into(),
		};
		self.methods.insert(key, dst.into());
	}

	/// Reads a two-column mapping file.
	pub fn read(reader: impl Read) -> Result<RenameTable> {
		let mut table = RenameTable::default();
		let mut current_class: Option<String> = None;

		for (line_number, line) in BufReader::new(reader).lines().enumerate() {
			let line_number = line_number + 1;
			let line = line?;

			if line.trim().is_empty() || line.starts_with('#') {
				continue;
			}

			let indented = line.starts_with('\t') || line.starts_with(' ');
			let tokens: Vec<&str> = line.split_whitespace().collect();

			if !indented {
				match tokens[..] {
					[src, dst] => {
						table.insert_class(src, dst);
						current_class = Some(src.to_owned());
					},
					_ => bail!("expected `<class> <class>` in line {line_number}: {line:?}"),
				}
			} else {
				let owner = current_class.as_ref()
					.with_context(|| anyhow!("member line {line_number} without a class line before it: {line:?}"))?;

				match tokens[..] {
					[src, dst] => table.insert_field(owner, src, dst),
					[src, descriptor, dst] => table.insert_method(owner, src, descriptor, dst),
					_ => bail!("expected `<name> <name>` or `<name> <descriptor> <name>` in line {line_number}: {line:?}"),
				}
			}
		}

		Ok(table)
	}

	pub fn read_file(path: impl AsRef<Path>) -> Result<RenameTable> {
		let path = path.as_ref();
		let file = File::open(path)
			.with_context(|| anyhow!("failed to open rename file {path:?}"))?;
		RenameTable::read(file)
			.with_context(|| anyhow!("failed to read rename file {path:?}"))
	}

	/// Loads and composes the usual table pairing: `client` chained with
	/// `extract`, then reversed.
	pub fn compose(client: impl AsRef<Path>, extract: impl AsRef<Path>) -> Result<RenameTable> {
		let client = RenameTable::read_file(client)?;
		let extract = RenameTable::read_file(extract)?;
		Ok(client.chain(&extract).reverse())
	}

	/// Follows `self` with `next`: an `a → b` table chained with a `b → c`
	/// table gives an `a → c` table. Names `next` has no entry for are
	/// carried through unchanged.
	pub fn chain(&self, next: &RenameTable) -> RenameTable {
		let classes = self.classes.iter()
			.map(|(src, mid)| (src.clone(), next.remap_class(mid).to_owned()))
			.collect();

		let fields = self.fields.iter()
			.map(|(key, mid)| {
				let mid_owner = self.remap_class(&key.owner);
				(key.clone(), next.remap_field(mid_owner, mid).to_owned())
			})
			.collect();

		let methods = self.methods.iter()
			.map(|(key, mid)| {
				let mid_owner = self.remap_class(&key.owner);
				let mid_descriptor = self.remap_descriptor_lossy(&key.descriptor);
				(key.clone(), next.remap_method(mid_owner, mid, &mid_descriptor).to_owned())
			})
			.collect();

		RenameTable { classes, fields, methods }
	}

	/// Flips the direction of the table: an `a → b` table becomes `b → a`.
	pub fn reverse(&self) -> RenameTable {
		let classes = self.classes.iter()
			.map(|(src, dst)| (dst.clone(), src.clone()))
			.collect();

		let fields = self.fields.iter()
			.map(|(key, dst)| {
				let reversed = FieldKey {
					owner: self.remap_class(&key.owner).to_owned(),
					name: dst.clone(),
				};
				(reversed, key.name.clone())
			})
			.collect();

		let methods = self.methods.iter()
			.map(|(key, dst)| {
				let reversed = MethodKey {
					owner: self.remap_class(&key.owner).to_owned(),
					name: dst.clone(),
					descriptor: self.remap_descriptor_lossy(&key.descriptor),
				};
				(reversed, key.name.clone())
			})
			.collect();

		RenameTable { classes, fields, methods }
	}

	/// Maps a class name, falling back to the input if there's no entry.
	pub fn remap_class<'a>(&'a self, name: &'a str) -> &'a str {
		self.classes.get(name).map(String::as_str).unwrap_or(name)
	}

	/// Maps a field name by its owner class, falling back to the input.
	pub fn remap_field<'a>(&'a self, owner: &str, name: &'a str) -> &'a str {
		let key = FieldKey {
			owner: owner.to_owned(),
			name: name.to_owned(),
		};
		self.fields.get(&key).map(String::as_str).unwrap_or(name)
	}

	/// Maps a method name by its owner class and descriptor, falling back
	/// to the input.
	pub fn remap_method<'a>(&'a self, owner: &str, name: &'a str, descriptor: &str) -> &'a str {
		let key = MethodKey {
			owner: owner.to_owned(),
			name: name.to_owned(),
			descriptor: descriptor.to_owned(),
		};
		self.methods.get(&key).map(String::as_str).unwrap_or(name)
	}

	/// Maps every `L...;` class name inside a field or method descriptor.
	pub fn remap_descriptor(&self, descriptor: &str) -> Result<String> {
		let mut out = String::with_capacity(descriptor.len());
		let mut chars = descriptor.chars();

		while let Some(c) = chars.next() {
			out.push(c);

			if c == 'L' {
				let mut class_name = String::new();
				let mut terminated = false;
				for c in chars.by_ref() {
					if c == ';' {
						terminated = true;
						break;
					}
					class_name.push(c);
				}
				if !terminated {
					bail!("descriptor {descriptor:?} has a missing semicolon somewhere");
				}

				out.push_str(self.remap_class(&class_name));
				out.push(';');
			}
		}

		Ok(out)
	}

	fn remap_descriptor_lossy(&self, descriptor: &str) -> String {
		self.remap_descriptor(descriptor)
			.unwrap_or_else(|_| descriptor.to_owned())
	}
}

#[cfg(test)]
mod testing {
	use anyhow::Result;
	use pretty_assertions::assert_eq;
	use super::RenameTable;

	fn table_a_to_b() -> RenameTable {
		let mut table = RenameTable::empty();
		table.insert_class("a/A", "b/B");
		table.insert_field("a/A", "f", "g");
		table.insert_method("a/A", "m", "(La/A;)V", "n");
		table
	}

	#[test]
	fn read_two_column_file() -> Result<()> {
		let input = "\
a/A b/B
	f g
	m (La/A;)V n
x/X y/Y
";

		let table = RenameTable::read(input.as_bytes())?;
		assert_eq!(table, {
			let mut expected = table_a_to_b();
			expected.insert_class("x/X", "y/Y");
			expected
		});
		Ok(())
	}

	#[test]
	fn member_line_without_class_is_an_error() {
		assert!(RenameTable::read("\tf g\n".as_bytes()).is_err());
		assert!(RenameTable::read("one\n".as_bytes()).is_err());
	}

	#[test]
	fn remapping_falls_back_to_the_input() {
		let table = table_a_to_b();

		assert_eq!(table.remap_class("a/A"), "b/B");
		assert_eq!(table.remap_class("untouched/U"), "untouched/U");
		assert_eq!(table.remap_field("a/A", "f"), "g");
		assert_eq!(table.remap_field("a/A", "other"), "other");
		assert_eq!(table.remap_method("a/A", "m", "(La/A;)V"), "n");
	}

	#[test]
	fn descriptors_remap_class_names() -> Result<()> {
		let table = table_a_to_b();

		assert_eq!(table.remap_descriptor("(ILa/A;[La/A;J)La/A;")?, "(ILb/B;[Lb/B;J)Lb/B;");
		assert_eq!(table.remap_descriptor("(I)V")?, "(I)V");
		assert!(table.remap_descriptor("(La/A)V").is_err());
		Ok(())
	}

	#[test]
	fn chain_follows_both_tables() {
		let mut second = RenameTable::empty();
		second.insert_class("b/B", "c/C");
		second.insert_field("b/B", "g", "h");
		second.insert_method("b/B", "n", "(Lb/B;)V", "o");

		let chained = table_a_to_b().chain(&second);

		assert_eq!(chained.remap_class("a/A"), "c/C");
		assert_eq!(chained.remap_field("a/A", "f"), "h");
		assert_eq!(chained.remap_method("a/A", "m", "(La/A;)V"), "o");
	}

	#[test]
	fn reverse_flips_the_direction() {
		let reversed = table_a_to_b().reverse();

		assert_eq!(reversed.remap_class("b/B"), "a/A");
		assert_eq!(reversed.remap_field("b/B", "g"), "f");
		// the reversed method is keyed by the remapped descriptor
		assert_eq!(reversed.remap_method("b/B", "n", "(Lb/B;)V"), "m");
	}

	#[test]
	fn chain_then_reverse_composition() {
		let mut second = RenameTable::empty();
		second.insert_class("b/B", "c/C");

		let composed = table_a_to_b().chain(&second).reverse();
		assert_eq!(composed.remap_class("c/C"), "a/A");
	}
}
