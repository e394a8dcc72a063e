//! Renaming entries, descriptors and signatures.

use log::warn;
use duke::descriptor::{FieldDescriptor, MethodDescriptor};
use duke::entry::{ClassEntry, Entry, FieldEntry, LocalVariableEntry, MethodEntry};
use duke::signature::Signature;
use crate::mapping::EntryMapping;
use crate::resolver::{EntryResolver, ResolutionStrategy};
use crate::tree::EntryTree;

/// Something that gives entries new names.
///
/// Only the four entry kinds must be implemented; descriptors and signatures are translated by translating the
/// classes they mention.
pub trait Translator {
	fn translate_class(&self, class: &ClassEntry) -> ClassEntry;
	fn translate_field(&self, field: &FieldEntry) -> FieldEntry;
	fn translate_method(&self, method: &MethodEntry) -> MethodEntry;
	fn translate_local(&self, local: &LocalVariableEntry) -> LocalVariableEntry;

	fn translate_entry(&self, entry: &Entry) -> Entry {
		match entry {
			Entry::Class(class) => Entry::Class(self.translate_class(class)),
			Entry::Field(field) => Entry::Field(self.translate_field(field)),
			Entry::Method(method) => Entry::Method(self.translate_method(method)),
			Entry::LocalVariable(local) => Entry::LocalVariable(self.translate_local(local)),
		}
	}

	/// Translates an internal class name, like `a$b`.
	fn translate_class_name(&self, name: &str) -> String {
		self.translate_class(&ClassEntry::new(name)).full_name()
	}

	fn translate_field_desc(&self, desc: &FieldDescriptor) -> FieldDescriptor {
		desc.map_class_names(|name| self.translate_class_name(name))
	}

	fn translate_method_desc(&self, desc: &MethodDescriptor) -> MethodDescriptor {
		desc.map_class_names(|name| self.translate_class_name(name))
	}

	/// Translates a generic signature. A signature that can't be parsed is returned as is.
	fn translate_signature(&self, signature: &Signature) -> Signature {
		match signature.map_class_names(|name| self.translate_class_name(name)) {
			Ok(translated) => translated,
			Err(e) => {
				warn!("not translating signature {signature:?}: {e:#}");
				signature.clone()
			},
		}
	}
}

impl<T: Translator + ?Sized> Translator for &T {
	fn translate_class(&self, class: &ClassEntry) -> ClassEntry {
		(**self).translate_class(class)
	}

	fn translate_field(&self, field: &FieldEntry) -> FieldEntry {
		(**self).translate_field(field)
	}

	fn translate_method(&self, method: &MethodEntry) -> MethodEntry {
		(**self).translate_method(method)
	}

	fn translate_local(&self, local: &LocalVariableEntry) -> LocalVariableEntry {
		(**self).translate_local(local)
	}
}

/// Something a [`Translator`] can rename.
pub trait Translatable: Sized {
	fn translate(&self, translator: &(impl Translator + ?Sized)) -> Self;
}

impl Translatable for ClassEntry {
	fn translate(&self, translator: &(impl Translator + ?Sized)) -> Self {
		translator.translate_class(self)
	}
}

impl Translatable for FieldEntry {
	fn translate(&self, translator: &(impl Translator + ?Sized)) -> Self {
		translator.translate_field(self)
	}
}

impl Translatable for MethodEntry {
	fn translate(&self, translator: &(impl Translator + ?Sized)) -> Self {
		translator.translate_method(self)
	}
}

impl Translatable for LocalVariableEntry {
	fn translate(&self, translator: &(impl Translator + ?Sized)) -> Self {
		translator.translate_local(self)
	}
}

impl Translatable for Entry {
	fn translate(&self, translator: &(impl Translator + ?Sized)) -> Self {
		translator.translate_entry(self)
	}
}

impl Translatable for FieldDescriptor {
	fn translate(&self, translator: &(impl Translator + ?Sized)) -> Self {
		translator.translate_field_desc(self)
	}
}

impl Translatable for MethodDescriptor {
	fn translate(&self, translator: &(impl Translator + ?Sized)) -> Self {
		translator.translate_method_desc(self)
	}
}

impl Translatable for Signature {
	fn translate(&self, translator: &(impl Translator + ?Sized)) -> Self {
		translator.translate_signature(self)
	}
}

impl<T: Translatable> Translatable for Option<T> {
	fn translate(&self, translator: &(impl Translator + ?Sized)) -> Self {
		self.as_ref().map(|x| x.translate(translator))
	}
}

impl<T: Translatable> Translatable for Vec<T> {
	fn translate(&self, translator: &(impl Translator + ?Sized)) -> Self {
		self.iter().map(|x| x.translate(translator)).collect()
	}
}

/// Translates entries using the names from a mapping tree.
///
/// Entries are first resolved to their root declarations, so that a method inherited from a mapped superclass gets
/// the name of that superclass method.
#[derive(Debug, Clone)]
pub struct MappingTranslator<'a, R> {
	mappings: &'a EntryTree<EntryMapping>,
	resolver: R,
}

impl<'a, R: EntryResolver> MappingTranslator<'a, R> {
	pub fn new(mappings: &'a EntryTree<EntryMapping>, resolver: R) -> MappingTranslator<'a, R> {
		MappingTranslator { mappings, resolver }
	}

	/// The mapping of the first root declaration of `entry` that has one.
	pub fn get_mapping(&self, entry: &Entry) -> Option<&'a EntryMapping> {
		let mappings = self.mappings;
		self.resolver.resolve_entry(entry, ResolutionStrategy::ResolveRoot)
			.iter()
			.find_map(|resolved| mappings.get(resolved))
	}

	fn target_name(&self, entry: Entry) -> Option<&'a str> {
		self.get_mapping(&entry)
			.and_then(|mapping| mapping.target_name.as_deref())
	}
}

impl<R: EntryResolver> Translator for MappingTranslator<'_, R> {
	fn translate_class(&self, class: &ClassEntry) -> ClassEntry {
		if class.is_array() {
			let translated = self.translate_field_desc(&FieldDescriptor::new(class.full_name()));
			return ClassEntry::new(translated.as_str());
		}

		match class.outer() {
			Some(outer) => {
				let name = self.target_name(Entry::Class(class.clone()))
					.map(|name| name.rsplit('$').next().unwrap_or(name))
					.unwrap_or(class.name());
				ClassEntry::inner(self.translate_class(outer), name)
			},
			None => {
				let name = self.target_name(Entry::Class(class.clone()))
					.unwrap_or(class.name());
				ClassEntry::new(name)
			},
		}
	}

	fn translate_field(&self, field: &FieldEntry) -> FieldEntry {
		let name = self.target_name(Entry::Field(field.clone()))
			.unwrap_or(&field.name);
		FieldEntry::new(self.translate_class(&field.parent), name, self.translate_field_desc(&field.desc))
	}

	fn translate_method(&self, method: &MethodEntry) -> MethodEntry {
		let name = self.target_name(Entry::Method(method.clone()))
			.unwrap_or(&method.name);
		MethodEntry::new(self.translate_class(&method.parent), name, self.translate_method_desc(&method.desc))
	}

	fn translate_local(&self, local: &LocalVariableEntry) -> LocalVariableEntry {
		let name = self.target_name(Entry::LocalVariable(local.clone()))
			.unwrap_or(&local.name);
		LocalVariableEntry::new(self.translate_method(&local.parent), local.index, name, local.parameter)
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use duke::entry::{ClassEntry, Entry, FieldEntry, LocalVariableEntry, MethodEntry};
	use duke::signature::Signature;
	use crate::mapping::EntryMapping;
	use crate::resolver::VoidEntryResolver;
	use crate::translator::{MappingTranslator, Translatable};
	use crate::tree::EntryTree;

	fn mappings() -> EntryTree<EntryMapping> {
		let a = ClassEntry::new("a");
		let method = MethodEntry::new(a.clone(), "b", "(La$c;)La;");
		[
			(Entry::Class(a.clone()), EntryMapping::new("com/example/Foo")),
			(Entry::Class(ClassEntry::new("a$c")), EntryMapping::new("Inner")),
			(Entry::Field(FieldEntry::new(a.clone(), "f", "[La;")), EntryMapping::new("self")),
			(Entry::Method(method.clone()), EntryMapping::new("make")),
			(Entry::LocalVariable(LocalVariableEntry::new(method, 1, "", true)), EntryMapping::new("inner")),
		].into_iter().collect()
	}

	#[test]
	fn translate_entries() {
		let mappings = mappings();
		let translator = MappingTranslator::new(&mappings, VoidEntryResolver);

		assert_eq!(ClassEntry::new("a$c$d").translate(&translator).full_name(), "com/example/Foo$Inner$d");
		assert_eq!(ClassEntry::new("[[La$c;").translate(&translator).full_name(), "[[Lcom/example/Foo$Inner;");

		let field = FieldEntry::new(ClassEntry::new("a"), "f", "[La;").translate(&translator);
		assert_eq!(field.to_string(), "com/example/Foo#self:[Lcom/example/Foo;");

		let method = MethodEntry::new(ClassEntry::new("a"), "b", "(La$c;)La;");
		let local = LocalVariableEntry::new(method.clone(), 1, "x", true).translate(&translator);
		assert_eq!(local.name, "inner");
		assert_eq!(local.parent.to_string(), "com/example/Foo#make(Lcom/example/Foo$Inner;)Lcom/example/Foo;");

		// unmapped things keep their names
		let other = MethodEntry::new(ClassEntry::new("z"), "y", "()V").translate(&translator);
		assert_eq!(other.to_string(), "z#y()V");
	}

	#[test]
	fn translate_signatures() {
		let mappings = mappings();
		let translator = MappingTranslator::new(&mappings, VoidEntryResolver);

		let signature = Signature::new("Ljava/util/List<La$c;>;").translate(&translator);
		assert_eq!(signature.as_str(), "Ljava/util/List<Lcom/example/Foo$Inner;>;");

		let broken = Signature::new("Ljava/util/List<La;").translate(&translator);
		assert_eq!(broken.as_str(), "Ljava/util/List<La;");
	}
}
