use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use crate::entry::MethodEntry;

/// A local variable (or parameter) of a method, identified by its slot index.
///
/// Only the parent method and the index take part in equality, hashing and ordering: the name of a local variable
/// is whatever the class file or the mappings happened to call it.
#[derive(Debug, Clone)]
pub struct LocalVariableEntry {
	pub parent: MethodEntry,
	pub index: u16,
	pub name: String,
	pub parameter: bool,
}

impl LocalVariableEntry {
	pub fn new(parent: MethodEntry, index: u16, name: impl Into<String>, parameter: bool) -> LocalVariableEntry {
		LocalVariableEntry { parent, index, name: name.into(), parameter }
	}

	pub fn with_name(&self, name: impl Into<String>) -> LocalVariableEntry {
		LocalVariableEntry { parent: self.parent.clone(), index: self.index, name: name.into(), parameter: self.parameter }
	}

	pub fn with_parent(&self, parent: MethodEntry) -> LocalVariableEntry {
		LocalVariableEntry { parent, index: self.index, name: self.name.clone(), parameter: self.parameter }
	}
}

impl PartialEq for LocalVariableEntry {
	fn eq(&self, other: &Self) -> bool {
		self.parent == other.parent && self.index == other.index
	}
}

impl Eq for LocalVariableEntry {}

impl Hash for LocalVariableEntry {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.parent.hash(state);
		self.index.hash(state);
	}
}

impl PartialOrd for LocalVariableEntry {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for LocalVariableEntry {
	fn cmp(&self, other: &Self) -> Ordering {
		self.parent.cmp(&other.parent)
			.then(self.index.cmp(&other.index))
	}
}

impl Display for LocalVariableEntry {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}[{}:{}]", self.parent, self.index, self.name)
	}
}
