use std::fmt::{Display, Formatter};
use crate::descriptor::{FieldDescriptor, MethodDescriptor};
use crate::entry::ClassEntry;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldEntry {
	pub parent: ClassEntry,
	pub name: String,
	pub desc: FieldDescriptor,
}

impl FieldEntry {
	pub fn new(parent: ClassEntry, name: impl Into<String>, desc: impl Into<FieldDescriptor>) -> FieldEntry {
		FieldEntry { parent, name: name.into(), desc: desc.into() }
	}

	pub fn with_name(&self, name: impl Into<String>) -> FieldEntry {
		FieldEntry { parent: self.parent.clone(), name: name.into(), desc: self.desc.clone() }
	}

	pub fn with_parent(&self, parent: ClassEntry) -> FieldEntry {
		FieldEntry { parent, name: self.name.clone(), desc: self.desc.clone() }
	}

	pub fn with_desc(&self, desc: FieldDescriptor) -> FieldEntry {
		FieldEntry { parent: self.parent.clone(), name: self.name.clone(), desc }
	}
}

impl Display for FieldEntry {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}#{}:{}", self.parent, self.name, self.desc)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodEntry {
	pub parent: ClassEntry,
	pub name: String,
	pub desc: MethodDescriptor,
}

impl MethodEntry {
	pub fn new(parent: ClassEntry, name: impl Into<String>, desc: impl Into<MethodDescriptor>) -> MethodEntry {
		MethodEntry { parent, name: name.into(), desc: desc.into() }
	}

	pub fn with_name(&self, name: impl Into<String>) -> MethodEntry {
		MethodEntry { parent: self.parent.clone(), name: name.into(), desc: self.desc.clone() }
	}

	pub fn with_parent(&self, parent: ClassEntry) -> MethodEntry {
		MethodEntry { parent, name: self.name.clone(), desc: self.desc.clone() }
	}

	pub fn with_desc(&self, desc: MethodDescriptor) -> MethodEntry {
		MethodEntry { parent: self.parent.clone(), name: self.name.clone(), desc }
	}

	/// Returns `true` for both instance (`<init>`) and static (`<clinit>`) initializers.
	pub fn is_constructor(&self) -> bool {
		self.name == "<init>" || self.name == "<clinit>"
	}
}

impl Display for MethodEntry {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}#{}{}", self.parent, self.name, self.desc)
	}
}
