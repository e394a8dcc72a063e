use indexmap::IndexSet;
use log::trace;
use duke::entry::{ClassEntry, Entry};
use quill::mapping::EntryMapping;
use quill::resolver::EntryResolver;
use quill::translator::{MappingTranslator, Translator};
use quill::tree::EntryTree;
use quill::validation::{validate_class_name, validate_identifier, ValidationContext, ValidationError};
use crate::index::JarIndex;

/// Checks whether an entry may get a new name, given the current mappings.
#[derive(Debug, Clone)]
pub struct MappingValidator<'a> {
	index: &'a JarIndex,
	mappings: &'a EntryTree<EntryMapping>,
}

impl<'a> MappingValidator<'a> {
	pub fn new(index: &'a JarIndex, mappings: &'a EntryTree<EntryMapping>) -> MappingValidator<'a> {
		MappingValidator { index, mappings }
	}

	/// Checks the name for the entry and everything that must share the name with it. Problems are added to the
	/// context. Returns whether there was any problem.
	pub fn validate_rename(&self, context: &mut ValidationContext, entry: &Entry, name: &str) -> bool {
		let before = context.errors().len();

		let equivalent = self.index.entry_resolver().resolve_equivalent_entries(entry);
		for equivalent_entry in &equivalent {
			validate_name(context, equivalent_entry, name);
			self.validate_unique(context, equivalent_entry, &equivalent, name);
		}

		context.errors().len() > before
	}

	fn validate_unique(&self, context: &mut ValidationContext, entry: &Entry, equivalent: &IndexSet<Entry>, name: &str) {
		let translator = MappingTranslator::new(self.mappings, self.index.entry_resolver());
		let containing_class = entry.containing_class();
		let is_static = self.index.entry_index().get_entry_access(entry)
			.is_some_and(|access| access.is_static());

		for related_class in self.related_classes(entry) {
			if is_static && &related_class != containing_class {
				// static members only clash inside their own class
				continue;
			}

			let related_entry = entry.replace_ancestor(&Entry::Class(containing_class.clone()), &Entry::Class(related_class));
			let translated = translator.translate_entry(&related_entry);

			let clash = self.siblings(&related_entry).into_iter()
				.filter(|sibling| !equivalent.contains(sibling))
				.map(|sibling| translator.translate_entry(&sibling))
				.any(|sibling| translated.can_conflict_with(&sibling) && sibling.name() == name);

			if clash {
				trace!("{name:?} for {related_entry} clashes with a sibling");
				context.raise(ValidationError::NonUniqueName {
					name: name.to_owned(),
					parent: translated.parent().map_or_else(|| "the top level".to_owned(), |parent| parent.to_string()),
				});
			}
		}
	}

	/// Renaming a member also needs to look at the classes above and below it. A class itself only clashes with its
	/// own siblings.
	fn related_classes(&self, entry: &Entry) -> IndexSet<ClassEntry> {
		let class = entry.containing_class();
		if matches!(entry, Entry::Class(_)) {
			return IndexSet::from([class.clone()]);
		}

		let inheritance_index = self.index.inheritance_index();
		let mut related = IndexSet::from([class.clone()]);
		related.extend(inheritance_index.get_children(class).cloned());
		related.extend(inheritance_index.get_ancestors(class));
		related
	}

	/// The entries next to the given one: those with a mapping, and those declared in the index.
	fn siblings(&self, entry: &Entry) -> IndexSet<Entry> {
		let mut siblings: IndexSet<Entry> = self.mappings.siblings(entry).into_iter().cloned().collect();

		let entry_index = self.index.entry_index();
		match entry {
			Entry::Class(class) => {
				let outer = class.outer();
				siblings.extend(entry_index.classes()
					.filter(|other| other.outer() == outer)
					.cloned()
					.map(Entry::Class));
			},
			Entry::Field(field) => siblings.extend(entry_index.members_of(&field.parent).cloned()),
			Entry::Method(method) => siblings.extend(entry_index.members_of(&method.parent).cloned()),
			Entry::LocalVariable(_) => {},
		}

		siblings.shift_remove(entry);
		siblings
	}
}

fn validate_name(context: &mut ValidationContext, entry: &Entry, name: &str) {
	match entry {
		Entry::Class(class) => validate_class_name(context, name, class.is_inner()),
		_ => validate_identifier(context, name),
	}
}
