//! The line grammar of a single `.mapping` file.
//!
//! A file holds one top-level class and all of its nested classes:
//!
//! ```text
//! CLASS a/B
//! 	COMMENT the outer class
//! 	FIELD count I
//! 	METHOD m (I)V
//! 		ARG 1 amount
//! 			COMMENT how much to add
//! 	CLASS Inner
//! ```
//!
//! `CLASS` lines open a class; their indentation depth is the nesting depth,
//! and a nested class's real name is `<parent>$<localname>`. `FIELD` and
//! `METHOD` lines attach to the most recently opened class, `ARG` lines to
//! the most recently opened method, and `COMMENT` lines to whichever entity
//! was opened last, at any level. Keywords match case-insensitively.
//!
//! Reading is done here line by line; [`crate::enigma_dir`] walks the
//! directory and owns the sidecar files.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use anyhow::{anyhow, bail, Context, Result};
use indexmap::{IndexMap, IndexSet};
use crate::tree::mappings::{ClassData, MappingData, MethodKey};

const CLASS: &str = "CLASS";
const FIELD: &str = "FIELD";
const METHOD: &str = "METHOD";
const PARAMETER: &str = "ARG";
const COMMENT: &str = "COMMENT";

/// Orders sibling class-name segments and file names: shorter first, then
/// lexicographic. Applied per `$`-separated component, this keeps the
/// generated files stable under re-runs regardless of discovery order.
pub(crate) fn compare_class_names(a: &str, b: &str) -> std::cmp::Ordering {
	let length_then_lex = |a: &str, b: &str| a.len().cmp(&b.len()).then_with(|| a.cmp(b));

	for (a_component, b_component) in a.split('$').zip(b.split('$')) {
		let ordering = length_then_lex(a_component, b_component);
		if ordering.is_ne() {
			return ordering;
		}
	}
	length_then_lex(a, b)
}

/// All prefixes of a class name at `$` boundaries, outermost first,
/// including the name itself: `a/B$C$D` gives `a/B`, `a/B$C`, `a/B$C$D`.
pub(crate) fn expand_class(name: &str) -> Vec<String> {
	let (package, class) = match name.rfind('/') {
		Some(separator) => name.split_at(separator + 1),
		None => ("", name),
	};

	let mut expanded = Vec::new();
	let mut prefix = String::from(package);
	for component in class.split('$') {
		if !expanded.is_empty() {
			prefix.push('$');
		}
		prefix.push_str(component);
		expanded.push(prefix.clone());
	}
	expanded
}

pub(crate) fn strip_to_most_inner(name: &str) -> &str {
	match name.rfind('$') {
		Some(separator) => &name[separator + 1..],
		None => name,
	}
}

fn dollar_count(name: &str) -> usize {
	name.matches('$').count()
}

/// The nesting hierarchy of the flat class map, computed once per write
/// pass. Holds every class name implied by `$`-expansion, whether or not
/// the container has data for it.
pub(crate) struct ClassTree {
	top_level: Vec<String>,
	children: IndexMap<String, Vec<String>>,
}

impl ClassTree {
	pub(crate) fn build(data: &MappingData) -> ClassTree {
		let mut top_level = IndexSet::new();
		let mut children: IndexMap<String, IndexSet<String>> = IndexMap::new();

		for name in data.classes.keys() {
			for node in expand_class(name) {
				match node.rfind('$') {
					None => {
						top_level.insert(node);
					},
					Some(separator) => {
						let parent = node[..separator].to_owned();
						children.entry(parent).or_default().insert(node);
					},
				}
			}
		}

		let mut top_level: Vec<String> = top_level.into_iter().collect();
		top_level.sort_by(|a, b| compare_class_names(a, b));

		let children = children.into_iter()
			.map(|(parent, siblings)| {
				let mut siblings: Vec<String> = siblings.into_iter().collect();
				siblings.sort_by(|a, b| compare_class_names(strip_to_most_inner(a), strip_to_most_inner(b)));
				(parent, siblings)
			})
			.collect();

		ClassTree { top_level, children }
	}

	pub(crate) fn top_level(&self) -> &[String] {
		&self.top_level
	}

	fn children_of(&self, name: &str) -> &[String] {
		self.children.get(name).map(Vec::as_slice).unwrap_or_default()
	}
}

/// Renders the complete file content for one top-level class: the class
/// itself, then all of its descendants in pre-order, siblings ordered
/// shortest-then-lexicographic per name segment.
pub(crate) fn render_top_level(data: &MappingData, tree: &ClassTree, top_level: &str, newline: &str) -> String {
	let mut out = String::new();
	render_class(&mut out, data, top_level, top_level, 0, newline);
	render_children(&mut out, data, tree, top_level, newline);
	out
}

fn render_children(out: &mut String, data: &MappingData, tree: &ClassTree, name: &str, newline: &str) {
	for child in tree.children_of(name) {
		render_class(out, data, child, strip_to_most_inner(child), dollar_count(child), newline);
		render_children(out, data, tree, child, newline);
	}
}

fn render_class(out: &mut String, data: &MappingData, name: &str, header_name: &str, indent: usize, newline: &str) {
	// classes only present as structural ancestors render as a bare header
	let placeholder;
	let class = match data.get_class(name) {
		Some(class) => class,
		None => {
			placeholder = ClassData::new(name);
			&placeholder
		},
	};

	push_indent(out, indent);
	out.push_str(CLASS);
	out.push(' ');
	out.push_str(header_name);
	out.push_str(newline);

	let member_indent = indent + 1;
	let javadoc_indent = indent + 2;

	for line in &class.javadoc {
		render_comment(out, member_indent, line, newline);
	}

	let mut fields: Vec<_> = class.fields.values().collect();
	fields.sort_by_key(|field| format!("{}{}", field.name, field.descriptor));
	for field in fields {
		push_indent(out, member_indent);
		out.push_str(FIELD);
		out.push(' ');
		out.push_str(&field.name);
		out.push(' ');
		out.push_str(&field.descriptor);
		out.push_str(newline);

		for line in &field.javadoc {
			render_comment(out, javadoc_indent, line, newline);
		}
	}

	for method in class.methods.values() {
		push_indent(out, member_indent);
		out.push_str(METHOD);
		out.push(' ');
		out.push_str(&method.name);
		out.push(' ');
		out.push_str(&method.descriptor);
		out.push_str(newline);

		for line in &method.javadoc {
			render_comment(out, javadoc_indent, line, newline);
		}

		let mut parameters: Vec<_> = method.parameters.values().collect();
		parameters.sort_by_key(|parameter| parameter.index);
		for parameter in parameters {
			// parameters without an assigned name are not written
			let Some(mapped_name) = &parameter.mapped_name else {
				continue;
			};

			push_indent(out, javadoc_indent);
			out.push_str(PARAMETER);
			out.push(' ');
			out.push_str(&parameter.index.to_string());
			out.push(' ');
			out.push_str(mapped_name);
			out.push_str(newline);

			if let Some(javadoc) = &parameter.javadoc {
				for line in javadoc.split('\n') {
					render_comment(out, javadoc_indent + 1, line, newline);
				}
			}
		}
	}
}

fn render_comment(out: &mut String, indent: usize, text: &str, newline: &str) {
	push_indent(out, indent);
	out.push_str(COMMENT);
	if !text.is_empty() {
		out.push(' ');
		out.push_str(text);
	}
	out.push_str(newline);
}

fn push_indent(out: &mut String, indent: usize) {
	for _ in 0..indent {
		out.push('\t');
	}
}

pub(crate) fn read_file_into(path: impl AsRef<Path>, data: &mut MappingData) -> Result<()> {
	read_into(File::open(&path)?, data)
		.with_context(|| anyhow!("failed to read mappings file {:?} as enigma file", path.as_ref()))
}

pub(crate) fn read_into(reader: impl Read, data: &mut MappingData) -> Result<()> {
	let mut state = ReadState::default();

	for (line_number, line) in BufReader::new(reader).lines().enumerate() {
		let line_number = line_number + 1;
		let line = line?;

		if let Some(line) = mapping_line::MappingLine::new(&line) {
			state.accept(data, line)
				.with_context(|| anyhow!("in line {line_number}"))?;
		}
	}

	Ok(())
}

/// The entity a `COMMENT` line attaches to: always the innermost entity
/// opened most recently, at whatever level. Entries are addressed by key,
/// not by reference, so the borrow on the container ends with each line.
enum JavadocTarget {
	Class(String),
	Field(String, String),
	Method(String, MethodKey),
	Parameter(String, MethodKey, u8),
}

#[derive(Default)]
struct ReadState {
	/// Currently open classes, outermost first; the depth of a `CLASS` line
	/// equals the number of entries that remain its ancestors.
	class_stack: Vec<String>,
	current_class: Option<String>,
	current_method: Option<MethodKey>,
	javadoc_target: Option<JavadocTarget>,
}

impl ReadState {
	fn accept(&mut self, data: &mut MappingData, line: mapping_line::MappingLine) -> Result<()> {
		let mapping_line::MappingLine { indent, keyword, fields } = line;

		match keyword.as_str() {
			CLASS => {
				let [local_name] = fields_array(fields)
					.context("expected `CLASS <name>`")?;

				self.class_stack.truncate(indent);
				if self.class_stack.len() < indent {
					bail!("class {local_name:?} is indented {} deep, but only {} classes are open", indent, self.class_stack.len());
				}

				let name = match self.class_stack.last() {
					Some(parent) => format!("{parent}${local_name}"),
					None => local_name,
				};

				data.get_or_create_class(&name);

				self.class_stack.push(name.clone());
				self.current_class = Some(name.clone());
				self.current_method = None;
				self.javadoc_target = Some(JavadocTarget::Class(name));
			},
			FIELD => {
				let [name, descriptor] = fields_array(fields)
					.context("expected `FIELD <name> <descriptor>`")?;
				let class_name = self.current_class.clone()
					.context("`FIELD` line without an open class")?;

				data.get_or_create_class(&class_name).get_or_create_field(&name, &descriptor);

				self.javadoc_target = Some(JavadocTarget::Field(class_name, name));
			},
			METHOD => {
				let [name, descriptor] = fields_array(fields)
					.context("expected `METHOD <name> <descriptor>`")?;
				let class_name = self.current_class.clone()
					.context("`METHOD` line without an open class")?;

				data.get_or_create_class(&class_name).get_or_create_method(&name, &descriptor);

				let key = MethodKey { name, descriptor };
				self.current_method = Some(key.clone());
				self.javadoc_target = Some(JavadocTarget::Method(class_name, key));
			},
			PARAMETER => {
				let [raw_index, name] = fields_array(fields)
					.context("expected `ARG <jvmIndex> <name>`")?;
				let class_name = self.current_class.clone()
					.context("`ARG` line without an open class")?;
				let method = self.current_method.clone()
					.context("`ARG` line without an open method")?;

				let index: u8 = raw_index.parse()
					.with_context(|| anyhow!("illegal parameter index {raw_index:?}"))?;
				if index > 127 {
					bail!("parameter index {index} is out of the byte range 0-127");
				}

				let parameter = data.get_or_create_class(&class_name)
					.get_or_create_method(&method.name, &method.descriptor)
					.get_or_create_parameter(index);
				parameter.mapped_name = Some(name);

				self.javadoc_target = Some(JavadocTarget::Parameter(class_name, method, index));
			},
			COMMENT => {
				let text = fields.join(" ");

				match self.javadoc_target.as_ref()
					.context("`COMMENT` line without anything for it to document")?
				{
					JavadocTarget::Class(class) => {
						data.get_or_create_class(class).add_javadoc(text);
					},
					JavadocTarget::Field(class, field) => {
						// the target was opened by a previous line, so these lookups exist
						data.get_or_create_class(class)
							.fields.get_mut(field)
							.with_context(|| anyhow!("field {field:?} vanished"))?
							.add_javadoc(text);
					},
					JavadocTarget::Method(class, method) => {
						data.get_or_create_class(class)
							.get_or_create_method(&method.name, &method.descriptor)
							.add_javadoc(text);
					},
					JavadocTarget::Parameter(class, method, index) => {
						data.get_or_create_class(class)
							.get_or_create_method(&method.name, &method.descriptor)
							.get_or_create_parameter(*index)
							.append_javadoc(&text);
					},
				}
			},
			keyword => bail!("unknown mapping target {keyword:?}, allowed are: `CLASS`, `FIELD`, `METHOD`, `ARG`, `COMMENT`"),
		}

		Ok(())
	}
}

/// The line's fields as a fixed-size array, for grammar rules with an exact
/// number of tokens.
fn fields_array<const N: usize>(fields: Vec<String>) -> Result<[String; N]> {
	<[String; N]>::try_from(fields)
		.map_err(|fields| anyhow!("expected {N} fields, got {}: {fields:?}", fields.len()))
}

mod mapping_line {
	#[derive(Debug)]
	pub(super) struct MappingLine {
		pub(super) indent: usize,
		pub(super) keyword: String,
		pub(super) fields: Vec<String>,
	}

	impl MappingLine {
		/// Splits a line into its indentation depth, keyword and fields.
		/// Blank lines give [`None`].
		pub(super) fn new(line: &str) -> Option<MappingLine> {
			let indent = line.chars().take_while(|&c| c == '\t').count();

			let mut tokens = line.split_whitespace();
			let keyword = tokens.next()?.to_uppercase();

			Some(MappingLine {
				indent,
				keyword,
				fields: tokens.map(str::to_owned).collect(),
			})
		}
	}
}
