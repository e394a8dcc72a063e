use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// Identifies a class by its name.
///
/// An inner class keeps its outer class as parent, and only stores the part of the name after the last `$`.
/// Use [`ClassEntry::new`] to get the canonical split of a full name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassEntry {
	outer: Option<Box<ClassEntry>>,
	name: String,
}

impl ClassEntry {
	/// Creates a class entry from a full internal name like `a/b/C$D`.
	///
	/// A `$` only splits the name if there's something on both sides of it, and array class names are never split.
	///
	/// ```
	/// # use pretty_assertions::assert_eq;
	/// use duke::entry::ClassEntry;
	///
	/// let class = ClassEntry::new("a/b/C$D$E");
	/// assert_eq!(class.name(), "E");
	/// assert_eq!(class.full_name(), "a/b/C$D$E");
	/// assert_eq!(class.outer().map(ClassEntry::full_name), Some("a/b/C$D".to_owned()));
	/// assert_eq!(class.outermost_class().full_name(), "a/b/C");
	///
	/// assert_eq!(ClassEntry::new("a$").outer(), None);
	/// assert_eq!(ClassEntry::new("$a").outer(), None);
	/// ```
	pub fn new(full_name: impl Into<String>) -> ClassEntry {
		let full_name = full_name.into();

		if !full_name.starts_with('[') {
			if let Some(index) = full_name.rfind('$') {
				if index > 0 && index < full_name.len() - 1 && !full_name[index..].contains('/') {
					let outer = ClassEntry::new(&full_name[..index]);
					return ClassEntry::inner(outer, &full_name[index + 1..]);
				}
			}
		}

		ClassEntry { outer: None, name: full_name }
	}

	/// Creates an inner class entry, with the given simple inner name.
	pub fn inner(outer: ClassEntry, name: impl Into<String>) -> ClassEntry {
		ClassEntry { outer: Some(Box::new(outer)), name: name.into() }
	}

	/// The name of the class as stored in the entry: the inner name for inner classes, the full name otherwise.
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn full_name(&self) -> String {
		match &self.outer {
			Some(outer) => format!("{}${}", outer.full_name(), self.name),
			None => self.name.clone(),
		}
	}

	pub fn outer(&self) -> Option<&ClassEntry> {
		self.outer.as_deref()
	}

	pub fn is_inner(&self) -> bool {
		self.outer.is_some()
	}

	pub fn is_array(&self) -> bool {
		self.name.starts_with('[')
	}

	pub fn outermost_class(&self) -> &ClassEntry {
		match &self.outer {
			Some(outer) => outer.outermost_class(),
			None => self,
		}
	}

	/// Returns the package of the outermost class, or `None` for the default package.
	///
	/// ```
	/// # use pretty_assertions::assert_eq;
	/// use duke::entry::ClassEntry;
	///
	/// assert_eq!(ClassEntry::new("a/b/C$D").package_name(), Some("a/b"));
	/// assert_eq!(ClassEntry::new("C").package_name(), None);
	/// ```
	pub fn package_name(&self) -> Option<&str> {
		self.outermost_class().name.rsplit_once('/').map(|(package, _)| package)
	}

	/// The name without the package, so `C$D` for `a/b/C$D`.
	pub fn simple_name(&self) -> String {
		match &self.outer {
			Some(outer) => format!("{}${}", outer.simple_name(), self.name),
			None => self.name.rsplit_once('/').map_or(self.name.clone(), |(_, simple)| simple.to_owned()),
		}
	}

	pub fn with_name(&self, name: impl Into<String>) -> ClassEntry {
		ClassEntry { outer: self.outer.clone(), name: name.into() }
	}

	pub fn with_outer(&self, outer: ClassEntry) -> ClassEntry {
		ClassEntry { outer: Some(Box::new(outer)), name: self.name.clone() }
	}

	/// Returns the chain of classes from the outermost class down to this one.
	pub fn class_chain(&self) -> Vec<&ClassEntry> {
		let mut chain = match &self.outer {
			Some(outer) => outer.class_chain(),
			None => Vec::new(),
		};
		chain.push(self);
		chain
	}
}

impl PartialOrd for ClassEntry {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for ClassEntry {
	fn cmp(&self, other: &Self) -> Ordering {
		if self.outer == other.outer {
			self.name.cmp(&other.name)
		} else {
			self.full_name().cmp(&other.full_name())
		}
	}
}

impl Display for ClassEntry {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		if let Some(outer) = &self.outer {
			write!(f, "{outer}$")?;
		}
		f.write_str(&self.name)
	}
}
