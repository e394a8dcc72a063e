//! Identifiers for the things that can be named: classes, fields, methods and local variables.
//!
//! Every entry knows its parent by containment: a method belongs to a class, a local variable to a method and an
//! inner class to its outer class. Inheritance is not part of an entry, that is what the indices are for.

mod class;
mod local;
mod member;

use std::fmt::{Display, Formatter};

pub use class::ClassEntry;
pub use local::LocalVariableEntry;
pub use member::{FieldEntry, MethodEntry};

/// Any of the four kinds of entries.
///
/// The derived ordering sorts by kind first, then by the entry itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Entry {
	Class(ClassEntry),
	Field(FieldEntry),
	Method(MethodEntry),
	LocalVariable(LocalVariableEntry),
}

impl Entry {
	/// The name stored in this entry. For inner classes, this is the inner name only.
	pub fn name(&self) -> &str {
		match self {
			Entry::Class(class) => class.name(),
			Entry::Field(field) => &field.name,
			Entry::Method(method) => &method.name,
			Entry::LocalVariable(local) => &local.name,
		}
	}

	pub fn with_name(&self, name: impl Into<String>) -> Entry {
		match self {
			Entry::Class(class) => Entry::Class(class.with_name(name)),
			Entry::Field(field) => Entry::Field(field.with_name(name)),
			Entry::Method(method) => Entry::Method(method.with_name(name)),
			Entry::LocalVariable(local) => Entry::LocalVariable(local.with_name(name)),
		}
	}

	/// The entry containing this one, `None` for top level classes.
	pub fn parent(&self) -> Option<Entry> {
		match self {
			Entry::Class(class) => class.outer().cloned().map(Entry::Class),
			Entry::Field(field) => Some(Entry::Class(field.parent.clone())),
			Entry::Method(method) => Some(Entry::Class(method.parent.clone())),
			Entry::LocalVariable(local) => Some(Entry::Method(local.parent.clone())),
		}
	}

	/// The class this entry is or belongs to.
	pub fn containing_class(&self) -> &ClassEntry {
		match self {
			Entry::Class(class) => class,
			Entry::Field(field) => &field.parent,
			Entry::Method(method) => &method.parent,
			Entry::LocalVariable(local) => &local.parent.parent,
		}
	}

	pub fn top_level_class(&self) -> &ClassEntry {
		self.containing_class().outermost_class()
	}

	/// All entries from the top level class down to (and including) this entry.
	///
	/// ```
	/// # use pretty_assertions::assert_eq;
	/// use duke::entry::{ClassEntry, Entry, LocalVariableEntry, MethodEntry};
	///
	/// let method = MethodEntry::new(ClassEntry::new("a$b"), "c", "()V");
	/// let local = Entry::LocalVariable(LocalVariableEntry::new(method.clone(), 1, "x", true));
	///
	/// assert_eq!(local.ancestry(), vec![
	///     Entry::Class(ClassEntry::new("a")),
	///     Entry::Class(ClassEntry::new("a$b")),
	///     Entry::Method(method),
	///     local.clone(),
	/// ]);
	/// ```
	pub fn ancestry(&self) -> Vec<Entry> {
		let mut ancestry = match self.parent() {
			Some(parent) => parent.ancestry(),
			None => Vec::new(),
		};
		ancestry.push(self.clone());
		ancestry
	}

	/// Returns whether `ancestor` is this entry or one of its parents.
	pub fn has_ancestor(&self, ancestor: &Entry) -> bool {
		if self == ancestor {
			return true;
		}
		self.parent().is_some_and(|parent| parent.has_ancestor(ancestor))
	}

	/// Rebuilds this entry with `target` (this entry or one of its ancestors) swapped for `replacement`.
	///
	/// If `target` isn't in the ancestry, or `replacement` is of a different kind than `target`, the entry is
	/// returned unchanged.
	pub fn replace_ancestor(&self, target: &Entry, replacement: &Entry) -> Entry {
		if self == target {
			return replacement.clone();
		}

		let Some(parent) = self.parent() else {
			return self.clone();
		};
		let new_parent = parent.replace_ancestor(target, replacement);
		if new_parent == parent {
			return self.clone();
		}

		match (self, new_parent) {
			(Entry::Class(class), Entry::Class(outer)) => Entry::Class(class.with_outer(outer)),
			(Entry::Field(field), Entry::Class(class)) => Entry::Field(field.with_parent(class)),
			(Entry::Method(method), Entry::Class(class)) => Entry::Method(method.with_parent(class)),
			(Entry::LocalVariable(local), Entry::Method(method)) => Entry::LocalVariable(local.with_parent(method)),
			_ => self.clone(),
		}
	}

	/// The method this entry is or belongs to.
	pub fn find_method_ancestor(&self) -> Option<&MethodEntry> {
		match self {
			Entry::Method(method) => Some(method),
			Entry::LocalVariable(local) => Some(&local.parent),
			_ => None,
		}
	}

	/// Returns whether giving `other` the same name as this entry would make the two clash.
	///
	/// Classes clash with any class, fields and local variables with their siblings of the same kind, and methods
	/// only with sibling methods taking the same arguments.
	pub fn can_conflict_with(&self, other: &Entry) -> bool {
		match (self, other) {
			(Entry::Class(_), Entry::Class(_)) => true,
			(Entry::Field(a), Entry::Field(b)) => a.parent == b.parent,
			(Entry::Method(a), Entry::Method(b)) => a.parent == b.parent && a.desc.arguments() == b.desc.arguments(),
			(Entry::LocalVariable(a), Entry::LocalVariable(b)) => a.parent == b.parent,
			_ => false,
		}
	}

	pub fn is_constructor(&self) -> bool {
		matches!(self, Entry::Method(method) if method.is_constructor())
	}

	pub fn as_class(&self) -> Option<&ClassEntry> {
		match self {
			Entry::Class(class) => Some(class),
			_ => None,
		}
	}

	pub fn as_field(&self) -> Option<&FieldEntry> {
		match self {
			Entry::Field(field) => Some(field),
			_ => None,
		}
	}

	pub fn as_method(&self) -> Option<&MethodEntry> {
		match self {
			Entry::Method(method) => Some(method),
			_ => None,
		}
	}

	pub fn as_local(&self) -> Option<&LocalVariableEntry> {
		match self {
			Entry::LocalVariable(local) => Some(local),
			_ => None,
		}
	}
}

impl Display for Entry {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Entry::Class(class) => write!(f, "{class}"),
			Entry::Field(field) => write!(f, "{field}"),
			Entry::Method(method) => write!(f, "{method}"),
			Entry::LocalVariable(local) => write!(f, "{local}"),
		}
	}
}

impl From<ClassEntry> for Entry {
	fn from(value: ClassEntry) -> Self {
		Entry::Class(value)
	}
}

impl From<FieldEntry> for Entry {
	fn from(value: FieldEntry) -> Self {
		Entry::Field(value)
	}
}

impl From<MethodEntry> for Entry {
	fn from(value: MethodEntry) -> Self {
		Entry::Method(value)
	}
}

impl From<LocalVariableEntry> for Entry {
	fn from(value: LocalVariableEntry) -> Self {
		Entry::LocalVariable(value)
	}
}
