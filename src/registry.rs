//! Ownership of the active mapping database, and member-identity lookups
//! against it.

use std::path::{Path, PathBuf};
use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use nib::{MemberReference, SyntheticParams};
use vellum::format::MappingFormat;
use vellum::tree::mappings::{ClassData, FieldData, MappingContainer, MappingData, MethodData, ParameterData};
use crate::rename::cache::RenameCache;
use crate::rename::RenameTable;

/// Owns the mapping database of one logical scope (one open project), and
/// resolves member identities against it.
///
/// Every lookup takes an optional [`RenameTable`]; when one is given, the
/// owner, name and descriptor of the queried identity are translated
/// through it first, bridging the caller's naming scheme to the names the
/// database is keyed by. Without a table, identities are matched raw.
///
/// The registry is a single-writer structure: all mutation is expected to
/// come from one coordinating execution context. Only the
/// [`rename_cache`][Self::rename_cache] is safe to hit from concurrent
/// readers.
pub struct MappingRegistry {
	container: Option<MappingContainer>,
	mappings_path: Option<PathBuf>,
	modified: bool,
	rename_cache: RenameCache,
}

impl Default for MappingRegistry {
	fn default() -> MappingRegistry {
		MappingRegistry::new()
	}
}

impl MappingRegistry {
	pub fn new() -> MappingRegistry {
		MappingRegistry {
			container: None,
			mappings_path: None,
			modified: false,
			rename_cache: RenameCache::new(),
		}
	}

	pub fn container(&self) -> Option<&MappingContainer> {
		self.container.as_ref()
	}

	pub fn data(&self) -> Option<&MappingData> {
		self.container.as_ref().map(MappingContainer::data)
	}

	pub fn is_loaded(&self) -> bool {
		self.container.is_some()
	}

	/// Whether the database changed since it was loaded or last saved.
	///
	/// Creation lookups flip this themselves; edits made through returned
	/// `&mut` entries should be recorded with [`mark_modified`][Self::mark_modified].
	pub fn is_modified(&self) -> bool {
		self.modified
	}

	pub fn mark_modified(&mut self) {
		self.modified = true;
	}

	pub fn mappings_path(&self) -> Option<&Path> {
		self.mappings_path.as_deref()
	}

	pub fn set_mappings_path(&mut self, path: Option<PathBuf>) {
		self.mappings_path = path;
	}

	pub fn rename_cache(&self) -> &RenameCache {
		&self.rename_cache
	}

	/// Swaps the active database wholesale. The previous one is dropped;
	/// nothing of it survives into the replacement.
	pub fn replace_container(&mut self, container: Option<MappingContainer>) {
		self.container = container;
		self.modified = false;
	}

	/// Loads the database from the given location, inferring the format
	/// from the path, and remembers the location for later
	/// [`reset_mapping_container`][Self::reset_mapping_container] calls.
	///
	/// On failure the registry ends up unloaded with *no* remembered
	/// location (a broken path must not be retried on every restart), and
	/// the error propagates to the caller for notification.
	pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
		let path = path.as_ref();
		self.mappings_path = Some(path.to_owned());
		self.reset_mapping_container()
	}

	/// Reloads the database from the remembered location, dropping any
	/// unsaved state. With no remembered location, the registry just
	/// becomes unloaded.
	pub fn reset_mapping_container(&mut self) -> Result<()> {
		self.modified = false;

		let Some(path) = self.mappings_path.clone() else {
			self.container = None;
			return Ok(());
		};

		let format = MappingFormat::detect(&path);
		match format.read(&path) {
			Ok(data) => {
				debug!("loaded {} classes and {} packages from {path:?}", data.classes.len(), data.packages.len());
				self.container = Some(MappingContainer::Writable(data));
				Ok(())
			},
			Err(e) => {
				warn!("failed to load mappings from {path:?}: {e:#}");
				self.container = None;
				self.mappings_path = None;
				Err(e).with_context(|| anyhow!("failed to load mappings from {path:?}"))
			},
		}
	}

	/// Writes the database to the given location, inferring the format
	/// from the path. The loaded state stays as it is, except that the
	/// database no longer counts as modified.
	pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
		let path = path.as_ref();
		let data = self.data()
			.context("no mappings are loaded, nothing to save")?;

		MappingFormat::detect(path).write(data, path)
			.with_context(|| anyhow!("failed to save mappings to {path:?}"))?;

		self.modified = false;
		Ok(())
	}

	/// [`save`][Self::save] to the remembered location.
	pub fn save_in_place(&mut self) -> Result<()> {
		let path = self.mappings_path.clone()
			.context("no mappings location is configured")?;
		self.save(path)
	}

	pub fn get_class_data(&self, name: &str, rename: Option<&RenameTable>) -> Option<&ClassData> {
		let data = self.data()?;
		let name = match rename {
			Some(table) => table.remap_class(name),
			None => name,
		};
		data.get_class(name)
	}

	/// Like [`get_class_data`][Self::get_class_data], but inserts an empty
	/// entry if absent. Gives [`None`] when nothing is loaded or the loaded
	/// database is read-only.
	pub fn get_or_create_class_data(&mut self, name: &str, rename: Option<&RenameTable>) -> Option<&mut ClassData> {
		let name = match rename {
			Some(table) => table.remap_class(name).to_owned(),
			None => name.to_owned(),
		};

		let data = self.container.as_mut()?.try_mutate()?;
		if data.get_class(&name).is_none() {
			self.modified = true;
		}
		Some(data.get_or_create_class(&name))
	}

	pub fn get_field_data(&self, reference: &MemberReference, rename: Option<&RenameTable>) -> Option<&FieldData> {
		let (owner, name, _) = normalize(reference, rename)?;
		self.data()?.get_class(&owner)?.get_field(&name)
	}

	pub fn get_or_create_field_data(&mut self, reference: &MemberReference, rename: Option<&RenameTable>) -> Option<&mut FieldData> {
		let (owner, name, descriptor) = normalize(reference, rename)?;

		let data = self.container.as_mut()?.try_mutate()?;
		let existed = data.get_class(&owner).is_some_and(|class| class.get_field(&name).is_some());
		if !existed {
			self.modified = true;
		}
		Some(data.get_or_create_class(&owner).get_or_create_field(&name, &descriptor))
	}

	pub fn get_method_data(&self, reference: &MemberReference, rename: Option<&RenameTable>) -> Option<&MethodData> {
		let (owner, name, descriptor) = normalize_method(reference, rename)?;
		self.data()?.get_class(&owner)?.get_method(&name, &descriptor)
	}

	pub fn get_or_create_method_data(&mut self, reference: &MemberReference, rename: Option<&RenameTable>) -> Option<&mut MethodData> {
		let (owner, name, descriptor) = normalize_method(reference, rename)?;

		let data = self.container.as_mut()?.try_mutate()?;
		let existed = data.get_class(&owner).is_some_and(|class| class.get_method(&name, &descriptor).is_some());
		if !existed {
			self.modified = true;
		}
		Some(data.get_or_create_class(&owner).get_or_create_method(&name, &descriptor))
	}

	/// Resolves the parameter at a surface position of the referenced
	/// method. The reference's descriptor must be the full compiled one;
	/// `synthetic` describes the compiler-injected leading parameters that
	/// shift the surface position (see [`SyntheticParams`]).
	///
	/// For anonymous functions whose invoked method carries captured
	/// variables, the caller folds [`nib::descriptor::capture_offset`] into
	/// `surface_index` before calling.
	pub fn get_parameter_data(
		&self,
		reference: &MemberReference,
		is_static: bool,
		synthetic: &SyntheticParams,
		surface_index: usize,
		rename: Option<&RenameTable>,
	) -> Option<&ParameterData> {
		let jvm_index = jvm_index_of(reference, is_static, synthetic, surface_index)?;
		self.get_method_data(reference, rename)?.get_parameter(jvm_index)
	}

	pub fn get_or_create_parameter_data(
		&mut self,
		reference: &MemberReference,
		is_static: bool,
		synthetic: &SyntheticParams,
		surface_index: usize,
		rename: Option<&RenameTable>,
	) -> Option<&mut ParameterData> {
		let jvm_index = jvm_index_of(reference, is_static, synthetic, surface_index)?;
		let (owner, name, descriptor) = normalize_method(reference, rename)?;

		let data = self.container.as_mut()?.try_mutate()?;
		let existed = data.get_class(&owner)
			.and_then(|class| class.get_method(&name, &descriptor))
			.is_some_and(|method| method.get_parameter(jvm_index).is_some());
		if !existed {
			self.modified = true;
		}
		Some(data.get_or_create_class(&owner)
			.get_or_create_method(&name, &descriptor)
			.get_or_create_parameter(jvm_index))
	}

	/// The documentation of a method rendered as one string: the method's
	/// own lines, then an `@param` line for every parameter that carries
	/// both a name and documentation.
	pub fn method_javadoc(&self, reference: &MemberReference, rename: Option<&RenameTable>) -> Option<String> {
		let method = self.get_method_data(reference, rename)?;

		let mut javadoc = method.javadoc.join("\n");
		for parameter in method.parameters.values() {
			if let (Some(name), Some(doc)) = (&parameter.mapped_name, &parameter.javadoc) {
				if !javadoc.is_empty() {
					javadoc.push('\n');
				}
				javadoc.push_str(&format!("@param {name} {doc}"));
			}
		}

		Some(javadoc)
	}
}

/// Applies the rename table to an identity triple. Gives [`None`] for
/// unqualified or descriptor-less references, and for descriptors the
/// table fails to translate; lookups degrade to "no mapping available".
fn normalize(reference: &MemberReference, rename: Option<&RenameTable>) -> Option<(String, String, String)> {
	let owner = reference.owner.as_ref()?;
	let descriptor = reference.descriptor.as_ref()?;

	match rename {
		None => Some((owner.clone(), reference.name.clone(), descriptor.clone())),
		Some(table) => {
			let new_owner = table.remap_class(owner).to_owned();
			let new_name = table.remap_field(owner, &reference.name).to_owned();
			let new_descriptor = table.remap_descriptor(descriptor).ok()?;
			Some((new_owner, new_name, new_descriptor))
		},
	}
}

fn normalize_method(reference: &MemberReference, rename: Option<&RenameTable>) -> Option<(String, String, String)> {
	let owner = reference.owner.as_ref()?;
	let descriptor = reference.descriptor.as_ref()?;

	match rename {
		None => Some((owner.clone(), reference.name.clone(), descriptor.clone())),
		Some(table) => {
			let new_owner = table.remap_class(owner).to_owned();
			let new_name = table.remap_method(owner, &reference.name, descriptor).to_owned();
			let new_descriptor = table.remap_descriptor(descriptor).ok()?;
			Some((new_owner, new_name, new_descriptor))
		},
	}
}

fn jvm_index_of(
	reference: &MemberReference,
	is_static: bool,
	synthetic: &SyntheticParams,
	surface_index: usize,
) -> Option<u8> {
	let descriptor = reference.descriptor.as_ref()?;
	nib::compute_jvm_index(descriptor, is_static, surface_index + synthetic.surface_offset())
}
