//! Helpers for working with JVM method descriptor strings.

use crate::index::SlotWalk;

/// The parameters a compiler injects at the front of a constructor's
/// descriptor without them appearing in the source parameter list.
///
/// Constructors of non-static inner classes receive a leading reference to
/// the outer instance; enum constructors receive a leading name `String` and
/// ordinal `int`. Both shift every surface parameter: the surface index must
/// be offset by [`surface_offset`][Self::surface_offset] before any slot
/// computation, and the corresponding descriptor text must be prepended when
/// building the constructor's descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntheticParams {
	/// No injected parameters.
	None,
	/// The enclosing instance of a non-static inner class constructor.
	OuterInstance {
		/// Internal name of the enclosing class, e.g. `a/b/Outer`.
		owner: String,
	},
	/// The name and ordinal of an enum constructor.
	EnumNameOrdinal,
}

impl SyntheticParams {
	/// How many leading surface positions the injected parameters occupy.
	pub fn surface_offset(&self) -> usize {
		match self {
			SyntheticParams::None => 0,
			SyntheticParams::OuterInstance { .. } => 1,
			SyntheticParams::EnumNameOrdinal => 2,
		}
	}

	/// The descriptor text of the injected parameters.
	pub fn descriptor_prefix(&self) -> String {
		match self {
			SyntheticParams::None => String::new(),
			SyntheticParams::OuterInstance { owner } => format!("L{owner};"),
			SyntheticParams::EnumNameOrdinal => "Ljava/lang/String;I".to_owned(),
		}
	}
}

/// Extracts the parameter-list substring of a method descriptor, i.e. the
/// text between `(` and `)`.
///
/// ```
/// assert_eq!(nib::descriptor::parameter_types("(IJ)V"), Some("IJ"));
/// assert_eq!(nib::descriptor::parameter_types("()V"), Some(""));
/// assert_eq!(nib::descriptor::parameter_types("IJ"), None);
/// ```
pub fn parameter_types(descriptor: &str) -> Option<&str> {
	let rest = descriptor.strip_prefix('(')?;
	let end = rest.find(')')?;
	Some(&rest[..end])
}

/// Builds a method descriptor from parameter type descriptors and a return
/// type descriptor, prepending any synthetic constructor parameters.
pub fn build_method_descriptor<S: AsRef<str>>(
	parameters: &[S],
	return_type: &str,
	synthetic: &SyntheticParams,
) -> String {
	let mut descriptor = String::from("(");
	descriptor.push_str(&synthetic.descriptor_prefix());
	for parameter in parameters {
		descriptor.push_str(parameter.as_ref());
	}
	descriptor.push(')');
	descriptor.push_str(return_type);
	descriptor
}

/// The summed slot width of a method descriptor's argument list, not
/// counting `this` and not counting the return type.
///
/// `long` and `double` count two slots, everything else (arrays included)
/// counts one. Returns [`None`] for a descriptor that cannot be scanned.
pub fn argument_slot_width(descriptor: &str) -> Option<usize> {
	let parameters = parameter_types(descriptor)?;
	SlotWalk::new(parameters, 0).total_width()
}

/// The number of leading parameters an invoked method carries beyond a
/// surface parameter list, measured in slot width.
///
/// An anonymous function's invoked method may receive captured variables as
/// extra leading parameters not present in the source parameter list; this
/// offset must be added to a surface index before slot computation against
/// the invoked method's descriptor.
pub fn capture_offset(invoked_descriptor: &str, surface_descriptor: &str) -> Option<usize> {
	argument_slot_width(invoked_descriptor)?
		.checked_sub(argument_slot_width(surface_descriptor)?)
}
