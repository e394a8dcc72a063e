use indexmap::{IndexMap, IndexSet};
use duke::access::AccessFlags;
use duke::entry::{ClassEntry, Entry, FieldEntry, MethodEntry};
use duke::parsed::ParsedClass;
use duke::signature::Signature;
use quill::translator::{Translatable, Translator};

/// What a class declares about itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDefinition {
	pub access: AccessFlags,
	pub super_class: Option<ClassEntry>,
	pub interfaces: Vec<ClassEntry>,
	pub signature: Option<Signature>,
}

impl ClassDefinition {
	pub(crate) fn of(class: &ParsedClass) -> ClassDefinition {
		ClassDefinition {
			access: class.access,
			super_class: class.super_class.as_deref().map(ClassEntry::new),
			interfaces: class.interfaces.iter().map(ClassEntry::new).collect(),
			signature: class.signature.clone(),
		}
	}
}

impl Translatable for ClassDefinition {
	fn translate(&self, translator: &(impl Translator + ?Sized)) -> Self {
		ClassDefinition {
			access: self.access,
			super_class: self.super_class.translate(translator),
			interfaces: self.interfaces.translate(translator),
			signature: self.signature.translate(translator),
		}
	}
}

/// Every class, field and method declared in the indexed classes, together with their access flags.
#[derive(Debug, Clone, Default)]
pub struct EntryIndex {
	classes: IndexMap<ClassEntry, ClassDefinition>,
	fields: IndexMap<FieldEntry, AccessFlags>,
	methods: IndexMap<MethodEntry, AccessFlags>,
	/// Fields and methods by the class declaring them, fields first.
	members: IndexMap<ClassEntry, IndexSet<Entry>>,
}

impl EntryIndex {
	pub fn new() -> EntryIndex {
		EntryIndex::default()
	}

	pub(crate) fn index_class(&mut self, class: ClassEntry, definition: ClassDefinition) {
		self.classes.insert(class, definition);
	}

	pub(crate) fn index_field(&mut self, field: FieldEntry, access: AccessFlags) {
		self.members.entry(field.parent.clone()).or_default().insert(Entry::Field(field.clone()));
		self.fields.insert(field, access);
	}

	pub(crate) fn index_method(&mut self, method: MethodEntry, access: AccessFlags) {
		self.members.entry(method.parent.clone()).or_default().insert(Entry::Method(method.clone()));
		self.methods.insert(method, access);
	}

	pub fn has_class(&self, class: &ClassEntry) -> bool {
		self.classes.contains_key(class)
	}

	pub fn has_field(&self, field: &FieldEntry) -> bool {
		self.fields.contains_key(field)
	}

	pub fn has_method(&self, method: &MethodEntry) -> bool {
		self.methods.contains_key(method)
	}

	/// Returns whether the entry is declared. A local variable counts as declared if its method is.
	pub fn has_entry(&self, entry: &Entry) -> bool {
		match entry {
			Entry::Class(class) => self.has_class(class),
			Entry::Field(field) => self.has_field(field),
			Entry::Method(method) => self.has_method(method),
			Entry::LocalVariable(local) => self.has_method(&local.parent),
		}
	}

	pub fn get_class_access(&self, class: &ClassEntry) -> Option<AccessFlags> {
		self.classes.get(class).map(|definition| definition.access)
	}

	pub fn get_field_access(&self, field: &FieldEntry) -> Option<AccessFlags> {
		self.fields.get(field).copied()
	}

	pub fn get_method_access(&self, method: &MethodEntry) -> Option<AccessFlags> {
		self.methods.get(method).copied()
	}

	/// The access flags of a member, or of the method of a local variable. Classes give `None` here, use
	/// [`EntryIndex::get_class_access`] for them.
	pub fn get_entry_access(&self, entry: &Entry) -> Option<AccessFlags> {
		match entry {
			Entry::Class(_) => None,
			Entry::Field(field) => self.get_field_access(field),
			Entry::Method(method) => self.get_method_access(method),
			Entry::LocalVariable(local) => self.get_method_access(&local.parent),
		}
	}

	pub fn get_definition(&self, class: &ClassEntry) -> Option<&ClassDefinition> {
		self.classes.get(class)
	}

	pub fn classes(&self) -> impl Iterator<Item=&ClassEntry> {
		self.classes.keys()
	}

	pub fn fields(&self) -> impl Iterator<Item=&FieldEntry> {
		self.fields.keys()
	}

	pub fn methods(&self) -> impl Iterator<Item=&MethodEntry> {
		self.methods.keys()
	}

	/// The fields and methods declared directly in the given class.
	pub fn members_of(&self, class: &ClassEntry) -> impl Iterator<Item=&Entry> {
		self.members.get(class).into_iter().flatten()
	}

	pub fn remapped(&self, translator: &(impl Translator + ?Sized)) -> EntryIndex {
		EntryIndex {
			classes: self.classes.iter()
				.map(|(class, definition)| (class.translate(translator), definition.translate(translator)))
				.collect(),
			fields: self.fields.iter()
				.map(|(field, &access)| (field.translate(translator), access))
				.collect(),
			methods: self.methods.iter()
				.map(|(method, &access)| (method.translate(translator), access))
				.collect(),
			members: self.members.iter()
				.map(|(class, members)| (class.translate(translator), members.iter().map(|member| member.translate(translator)).collect()))
				.collect(),
		}
	}
}
