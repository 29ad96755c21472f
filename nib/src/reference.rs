/// A reference to a class, field or method, keyed by JVM-level identity.
///
/// The `owner` is a slash-separated internal class name (`a/b/C`), absent for
/// an unqualified reference. The `descriptor` is a JVM type descriptor
/// string, absent when resolution failed; a reference without a descriptor
/// cannot be used for method or field lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberReference {
	pub name: String,
	pub descriptor: Option<String>,
	pub owner: Option<String>,
}

impl MemberReference {
	pub fn new(
		name: impl Into<String>,
		descriptor: Option<String>,
		owner: Option<String>,
	) -> MemberReference {
		MemberReference {
			name: name.into(),
			descriptor,
			owner,
		}
	}

	/// A reference carrying only a name, e.g. a local or not-yet-resolved one.
	pub fn unqualified(name: impl Into<String>) -> MemberReference {
		MemberReference::new(name, None, None)
	}

	pub fn is_qualified(&self) -> bool {
		self.owner.is_some()
	}

	pub fn without_owner(&self) -> MemberReference {
		MemberReference {
			name: self.name.clone(),
			descriptor: self.descriptor.clone(),
			owner: None,
		}
	}
}

#[cfg(test)]
mod testing {
	use super::MemberReference;

	#[test]
	fn structural_equality() {
		let a = MemberReference::new("run", Some("()V".to_owned()), Some("a/b/C".to_owned()));
		let b = MemberReference::new("run", Some("()V".to_owned()), Some("a/b/C".to_owned()));
		assert_eq!(a, b);

		assert_ne!(a, a.without_owner());
		assert!(a.is_qualified());
		assert!(!a.without_owner().is_qualified());
	}
}
