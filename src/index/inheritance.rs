use indexmap::{IndexMap, IndexSet};
use duke::entry::ClassEntry;
use quill::translator::{Translatable, Translator};
use crate::index::entry::EntryIndex;

/// How two classes are related, see [`InheritanceIndex::compute_class_relation`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Relation {
	Related,
	Unrelated,
	/// Some class on the way isn't indexed, so it's impossible to tell.
	Unknown,
}

/// Stores parent and child class information.
///
/// `java/lang/Object` is never stored as a parent. Neither are platform classes: a class having one of those is
/// only remembered as having an external parent.
#[derive(Debug, Clone, Default)]
pub struct InheritanceIndex {
	parents: IndexMap<ClassEntry, IndexSet<ClassEntry>>,
	children: IndexMap<ClassEntry, IndexSet<ClassEntry>>,
	external_parents: IndexSet<ClassEntry>,
}

pub(crate) const JAVA_LANG_OBJECT: &str = "java/lang/Object";

impl InheritanceIndex {
	pub fn new() -> InheritanceIndex {
		InheritanceIndex::default()
	}

	/// Stores the supertypes of a class. `is_external` tells which of them to skip.
	pub(crate) fn index_class<'a>(
		&mut self,
		class: &ClassEntry,
		super_class: Option<&'a ClassEntry>,
		interfaces: impl IntoIterator<Item=&'a ClassEntry>,
		is_external: impl Fn(&ClassEntry) -> bool,
	) {
		let super_class = super_class.filter(|super_class| super_class.full_name() != JAVA_LANG_OBJECT);

		for parent in super_class.into_iter().chain(interfaces) {
			if is_external(parent) {
				self.external_parents.insert(class.clone());
			} else {
				self.index_parent(class, parent);
			}
		}
	}

	fn index_parent(&mut self, child: &ClassEntry, parent: &ClassEntry) {
		self.parents.entry(child.clone()).or_default().insert(parent.clone());
		self.children.entry(parent.clone()).or_default().insert(child.clone());
	}

	pub fn get_parents(&self, class: &ClassEntry) -> impl Iterator<Item=&ClassEntry> {
		self.parents.get(class).into_iter().flatten()
	}

	pub fn get_children(&self, class: &ClassEntry) -> impl Iterator<Item=&ClassEntry> {
		self.children.get(class).into_iter().flatten()
	}

	/// All classes and interfaces this class inherits from, nearest first.
	///
	/// Every ancestor appears once, even if it's reachable on multiple paths.
	pub fn get_ancestors(&self, class: &ClassEntry) -> IndexSet<ClassEntry> {
		Self::walk(&self.parents, class)
	}

	/// All classes inheriting from this class, directly or indirectly.
	pub fn get_descendants(&self, class: &ClassEntry) -> IndexSet<ClassEntry> {
		Self::walk(&self.children, class)
	}

	fn walk(map: &IndexMap<ClassEntry, IndexSet<ClassEntry>>, start: &ClassEntry) -> IndexSet<ClassEntry> {
		let mut found: IndexSet<&ClassEntry> = map.get(start).into_iter().flatten().collect();
		let mut index = 0;
		while let Some(&class) = found.get_index(index) {
			index += 1;
			found.extend(map.get(class).into_iter().flatten());
		}
		found.shift_remove(start);
		found.into_iter().cloned().collect()
	}

	/// Tells whether `potential_ancestor` is an ancestor of `class`.
	///
	/// Everything is related to `java/lang/Object`. If `class` or one of its ancestors isn't indexed, or has a
	/// platform class as parent, the answer is [`Relation::Unknown`] unless the ancestor was found before.
	pub fn compute_class_relation(&self, entry_index: &EntryIndex, class: &ClassEntry, potential_ancestor: &ClassEntry) -> Relation {
		if potential_ancestor.full_name() == JAVA_LANG_OBJECT {
			return Relation::Related;
		}

		if !entry_index.has_class(class) {
			return Relation::Unknown;
		}

		let mut unknown = self.external_parents.contains(class);
		for ancestor in self.get_ancestors(class) {
			if &ancestor == potential_ancestor {
				return Relation::Related;
			}
			if !entry_index.has_class(&ancestor) || self.external_parents.contains(&ancestor) {
				unknown = true;
			}
		}

		if unknown {
			Relation::Unknown
		} else {
			Relation::Unrelated
		}
	}

	/// Returns whether some class inherits from this one.
	pub fn is_parent(&self, class: &ClassEntry) -> bool {
		self.children.get(class).is_some_and(|children| !children.is_empty())
	}

	pub fn has_parents(&self, class: &ClassEntry) -> bool {
		self.parents.get(class).is_some_and(|parents| !parents.is_empty())
	}

	pub fn remapped(&self, translator: &(impl Translator + ?Sized)) -> InheritanceIndex {
		fn translate_map(
			map: &IndexMap<ClassEntry, IndexSet<ClassEntry>>,
			translator: &(impl Translator + ?Sized),
		) -> IndexMap<ClassEntry, IndexSet<ClassEntry>> {
			map.iter()
				.map(|(class, others)| {
					let others = others.iter().map(|other| other.translate(translator)).collect();
					(class.translate(translator), others)
				})
				.collect()
		}

		InheritanceIndex {
			parents: translate_map(&self.parents, translator),
			children: translate_map(&self.children, translator),
			external_parents: self.external_parents.iter().map(|class| class.translate(translator)).collect(),
		}
	}
}

#[cfg(test)]
mod testing {
	use indexmap::IndexSet;
	use pretty_assertions::assert_eq;
	use duke::entry::ClassEntry;
	use crate::index::entry::{ClassDefinition, EntryIndex};
	use crate::index::inheritance::{InheritanceIndex, Relation};

	fn class(name: &str) -> ClassEntry {
		ClassEntry::new(name)
	}

	fn index(classes: &[(&str, Option<&str>, &[&str])]) -> (EntryIndex, InheritanceIndex) {
		let mut entry_index = EntryIndex::new();
		let mut inheritance_index = InheritanceIndex::new();
		for &(name, super_class, interfaces) in classes {
			let super_class = super_class.map(class);
			let interfaces: Vec<_> = interfaces.iter().map(|&x| class(x)).collect();
			inheritance_index.index_class(&class(name), super_class.as_ref(), &interfaces, |c| c.full_name().starts_with("java/"));
			entry_index.index_class(class(name), ClassDefinition {
				access: 0.into(),
				super_class,
				interfaces,
				signature: None,
			});
		}
		(entry_index, inheritance_index)
	}

	#[test]
	fn diamonds_are_walked_once() {
		// d extends b, c; b, c extend a
		let (_, index) = index(&[
			("a", Some("java/lang/Object"), &[]),
			("b", None, &["a"]),
			("c", None, &["a"]),
			("d", Some("b"), &["c"]),
		]);

		assert_eq!(index.get_ancestors(&class("d")), IndexSet::from([class("b"), class("c"), class("a")]));
		assert_eq!(index.get_descendants(&class("a")), IndexSet::from([class("b"), class("c"), class("d")]));
		assert!(index.get_ancestors(&class("a")).is_empty());
		assert!(index.is_parent(&class("a")));
		assert!(!index.is_parent(&class("d")));
		assert!(index.has_parents(&class("d")));
		assert!(!index.has_parents(&class("a")));
	}

	#[test]
	fn relations() {
		let (entries, index) = index(&[
			("a", None, &[]),
			("b", Some("a"), &[]),
			("c", Some("java/util/AbstractList"), &[]),
			("d", Some("lib/Missing"), &[]),
		]);

		assert_eq!(index.compute_class_relation(&entries, &class("b"), &class("a")), Relation::Related);
		assert_eq!(index.compute_class_relation(&entries, &class("a"), &class("b")), Relation::Unrelated);
		assert_eq!(index.compute_class_relation(&entries, &class("a"), &class("java/lang/Object")), Relation::Related);
		assert_eq!(index.compute_class_relation(&entries, &class("c"), &class("a")), Relation::Unknown);
		assert_eq!(index.compute_class_relation(&entries, &class("d"), &class("a")), Relation::Unknown);
		assert_eq!(index.compute_class_relation(&entries, &class("x"), &class("a")), Relation::Unknown);

		// platform classes aren't stored
		assert_eq!(index.get_parents(&class("c")).count(), 0);
		assert_eq!(index.get_parents(&class("d")).collect::<Vec<_>>(), vec![&class("lib/Missing")]);
	}
}
