use std::fmt::{Display, Formatter};
use indexmap::{IndexMap, IndexSet};
use log::trace;
use duke::descriptor::{FieldDescriptor, MethodDescriptor, Type};
use duke::entry::{ClassEntry, Entry, FieldEntry, MethodEntry};
use duke::parsed::{Handle, Instruction, Loadable, ParsedMethod, Receiver};
use quill::resolver::{EntryResolver, ResolutionStrategy};
use quill::translator::{Translatable, Translator};
use crate::index::inheritance::JAVA_LANG_OBJECT;

const LAMBDA_METAFACTORY: &str = "java/lang/invoke/LambdaMetafactory";

/// What a reference works on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReferenceTargetType {
	/// Static members, and references without any object.
	None,
	/// `null`, `this` before the super constructor call, or an object whose constructor wasn't called yet.
	Uninitialized,
	/// An object of the given class. Arrays count as `java/lang/Object`.
	ClassType(ClassEntry),
}

impl ReferenceTargetType {
	fn of(receiver: &Receiver) -> ReferenceTargetType {
		match receiver {
			Receiver::Uninitialized => ReferenceTargetType::Uninitialized,
			Receiver::Class(name) if name.starts_with('[') => ReferenceTargetType::ClassType(ClassEntry::new(JAVA_LANG_OBJECT)),
			Receiver::Class(name) => ReferenceTargetType::ClassType(ClassEntry::new(name)),
		}
	}
}

impl Translatable for ReferenceTargetType {
	fn translate(&self, translator: &(impl Translator + ?Sized)) -> Self {
		match self {
			ReferenceTargetType::ClassType(class) => ReferenceTargetType::ClassType(class.translate(translator)),
			other => other.clone(),
		}
	}
}

/// A use of `entry` inside of `context`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryReference<E, C> {
	pub entry: E,
	pub context: C,
	pub target_type: ReferenceTargetType,
}

impl<E, C> EntryReference<E, C> {
	pub fn new(entry: E, context: C, target_type: ReferenceTargetType) -> EntryReference<E, C> {
		EntryReference { entry, context, target_type }
	}
}

impl<E: Translatable, C: Translatable> Translatable for EntryReference<E, C> {
	fn translate(&self, translator: &(impl Translator + ?Sized)) -> Self {
		EntryReference {
			entry: self.entry.translate(translator),
			context: self.context.translate(translator),
			target_type: self.target_type.translate(translator),
		}
	}
}

impl<E: Display, C: Display> Display for EntryReference<E, C> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} in {}", self.entry, self.context)
	}
}

/// A single thing found while looking at a method body.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ReferenceRecord {
	Class(ClassEntry, ReferenceTargetType),
	Field(FieldEntry, ReferenceTargetType),
	Method(MethodEntry, ReferenceTargetType),
	/// A class mentioned in a descriptor the method body uses, like the one of a lambda.
	MethodType(ClassEntry),
}

/// Finds everything a method body refers to.
pub(crate) fn scan_method(method: &ParsedMethod) -> Vec<ReferenceRecord> {
	let mut records = Vec::new();

	for instruction in method.code.iter().flatten() {
		match instruction {
			Instruction::GetStatic(field) | Instruction::PutStatic(field) =>
				records.push(ReferenceRecord::Field(field.entry(), ReferenceTargetType::None)),
			Instruction::GetField(field, receiver) | Instruction::PutField(field, receiver) =>
				records.push(ReferenceRecord::Field(field.entry(), ReferenceTargetType::of(receiver))),
			Instruction::InvokeStatic(method) =>
				records.push(ReferenceRecord::Method(method.entry(), ReferenceTargetType::None)),
			Instruction::InvokeVirtual(method, receiver) |
			Instruction::InvokeSpecial(method, receiver) |
			Instruction::InvokeInterface(method, receiver) =>
				records.push(ReferenceRecord::Method(method.entry(), ReferenceTargetType::of(receiver))),
			Instruction::Ldc(Loadable::Class(name)) |
			Instruction::CheckCast(name) |
			Instruction::InstanceOf(name) => {
				if let Some(class) = element_class(name) {
					records.push(ReferenceRecord::Class(class, ReferenceTargetType::None));
				}
			},
			Instruction::InvokeDynamic { desc, bootstrap, arguments, .. } => scan_invoke_dynamic(&mut records, desc, bootstrap, arguments),
			Instruction::Ldc(_) | Instruction::New(_) | Instruction::Other => {},
		}
	}

	records
}

/// The class an `ldc`, `checkcast` or `instanceof` refers to, looking through arrays. Arrays of primitives refer to
/// no class.
fn element_class(name: &str) -> Option<ClassEntry> {
	if name.starts_with('[') {
		FieldDescriptor::new(name).parse().ok()
			.and_then(|desc| desc.0.class_name().map(ClassEntry::new))
	} else {
		Some(ClassEntry::new(name))
	}
}

fn scan_invoke_dynamic(records: &mut Vec<ReferenceRecord>, desc: &MethodDescriptor, bootstrap: &Handle, arguments: &[Loadable]) {
	let is_lambda = matches!(bootstrap, Handle::InvokeStatic(method)
		if method.class == LAMBDA_METAFACTORY && (method.name == "metafactory" || method.name == "altMetafactory"));

	if is_lambda {
		if let [Loadable::MethodType(sam_type), Loadable::MethodHandle(implementation), Loadable::MethodType(instantiated_type), ..] = arguments {
			let target_type = lambda_target_type(desc, implementation, instantiated_type);
			records.push(match implementation.entry() {
				Entry::Method(method) => ReferenceRecord::Method(method, target_type),
				Entry::Field(field) => ReferenceRecord::Field(field, target_type),
				_ => return,
			});

			for desc in [desc, sam_type, instantiated_type] {
				scan_method_descriptor(records, desc);
			}
			return;
		}
		trace!("lambda metafactory call with unexpected arguments {arguments:?}");
	}

	// other bootstrap methods: anything they get a handle to is referenced
	for argument in arguments {
		if let Loadable::MethodHandle(handle) = argument {
			let target_type = if handle.has_receiver() { ReferenceTargetType::Uninitialized } else { ReferenceTargetType::None };
			match handle.entry() {
				Entry::Method(method) => records.push(ReferenceRecord::Method(method, target_type)),
				Entry::Field(field) => records.push(ReferenceRecord::Field(field, target_type)),
				_ => {},
			}
		}
	}
}

/// If the lambda captures the object its implementation is called on, the type of that object. The captured object
/// is the first argument of the `invokedynamic`.
fn lambda_target_type(desc: &MethodDescriptor, implementation: &Handle, instantiated_type: &MethodDescriptor) -> ReferenceTargetType {
	if !implementation.has_receiver() {
		return ReferenceTargetType::None;
	}

	let (Ok(desc), Ok(instantiated_type)) = (desc.parse(), instantiated_type.parse()) else {
		return ReferenceTargetType::None;
	};
	let implementation_arguments = match implementation.entry() {
		Entry::Method(method) => method.desc.parse().map(|x| x.parameter_descriptors.len()).unwrap_or(0),
		_ => 0,
	};

	if instantiated_type.parameter_descriptors.len() < implementation_arguments {
		match desc.parameter_descriptors.first() {
			Some(Type::Object(class)) => ReferenceTargetType::ClassType(ClassEntry::new(class)),
			_ => ReferenceTargetType::None,
		}
	} else {
		ReferenceTargetType::None
	}
}

fn scan_method_descriptor(records: &mut Vec<ReferenceRecord>, desc: &MethodDescriptor) {
	records.extend(descriptor_classes(desc).into_iter().map(ReferenceRecord::MethodType));
}

/// The classes mentioned in a method descriptor, looking through arrays.
pub(crate) fn descriptor_classes(desc: &MethodDescriptor) -> Vec<ClassEntry> {
	let Ok(parsed) = desc.parse() else {
		return Vec::new();
	};
	parsed.parameter_descriptors.iter()
		.chain(parsed.return_descriptor.iter())
		.filter_map(Type::class_name)
		.map(ClassEntry::new)
		.collect()
}

/// The class a field descriptor mentions, looking through arrays.
pub(crate) fn field_descriptor_class(desc: &FieldDescriptor) -> Option<ClassEntry> {
	desc.parse().ok()
		.and_then(|parsed| parsed.0.class_name().map(ClassEntry::new))
}

type References<E, C> = IndexMap<E, Vec<EntryReference<E, C>>>;

/// Stores what refers to what: which methods are called, fields accessed and classes used, and from where.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
	method_references: IndexMap<MethodEntry, IndexSet<MethodEntry>>,

	references_to_methods: References<MethodEntry, MethodEntry>,
	references_to_classes: References<ClassEntry, MethodEntry>,
	references_to_fields: References<FieldEntry, MethodEntry>,
	field_type_references: References<ClassEntry, FieldEntry>,
	method_type_references: References<ClassEntry, MethodEntry>,
}

fn add<E: Clone + std::hash::Hash + Eq, C>(map: &mut References<E, C>, reference: EntryReference<E, C>) {
	map.entry(reference.entry.clone()).or_default().push(reference);
}

impl ReferenceIndex {
	pub fn new() -> ReferenceIndex {
		ReferenceIndex::default()
	}

	/// Records the classes in the type of a declared field.
	pub(crate) fn index_field(&mut self, field: &FieldEntry) {
		if let Some(class) = field_descriptor_class(&field.desc) {
			add(&mut self.field_type_references, EntryReference::new(class, field.clone(), ReferenceTargetType::None));
		}
	}

	/// Records the classes in the descriptor of a declared method.
	pub(crate) fn index_method(&mut self, method: &MethodEntry) {
		self.index_method_descriptor(method, &method.desc);
	}

	fn index_method_descriptor(&mut self, context: &MethodEntry, desc: &MethodDescriptor) {
		for class in descriptor_classes(desc) {
			add(&mut self.method_type_references, EntryReference::new(class, context.clone(), ReferenceTargetType::None));
		}
	}

	pub(crate) fn index_record(&mut self, caller: &MethodEntry, record: ReferenceRecord) {
		match record {
			ReferenceRecord::Class(class, target_type) => self.index_class_reference(caller, class, target_type),
			ReferenceRecord::Field(field, target_type) => self.index_field_reference(caller, field, target_type),
			ReferenceRecord::Method(method, target_type) => self.index_method_reference(caller, method, target_type),
			ReferenceRecord::MethodType(class) =>
				add(&mut self.method_type_references, EntryReference::new(class, caller.clone(), ReferenceTargetType::None)),
		}
	}

	fn index_class_reference(&mut self, caller: &MethodEntry, class: ClassEntry, target_type: ReferenceTargetType) {
		add(&mut self.references_to_classes, EntryReference::new(class, caller.clone(), target_type));
	}

	fn index_method_reference(&mut self, caller: &MethodEntry, method: MethodEntry, target_type: ReferenceTargetType) {
		self.method_references.entry(caller.clone()).or_default().insert(method.clone());

		if method.is_constructor() {
			self.index_class_reference(caller, method.parent.clone(), target_type.clone());
		}

		add(&mut self.references_to_methods, EntryReference::new(method, caller.clone(), target_type));
	}

	fn index_field_reference(&mut self, caller: &MethodEntry, field: FieldEntry, target_type: ReferenceTargetType) {
		add(&mut self.references_to_fields, EntryReference::new(field, caller.clone(), target_type));
	}

	/// The methods the given method calls, or refers to with a method handle.
	pub fn get_methods_referenced_by(&self, method: &MethodEntry) -> impl Iterator<Item=&MethodEntry> {
		self.method_references.get(method).into_iter().flatten()
	}

	pub fn get_references_to_method(&self, method: &MethodEntry) -> &[EntryReference<MethodEntry, MethodEntry>] {
		self.references_to_methods.get(method).map_or(&[], Vec::as_slice)
	}

	/// Uses of a class: constructor calls, class constants, casts and `instanceof` checks.
	pub fn get_references_to_class(&self, class: &ClassEntry) -> &[EntryReference<ClassEntry, MethodEntry>] {
		self.references_to_classes.get(class).map_or(&[], Vec::as_slice)
	}

	pub fn get_references_to_field(&self, field: &FieldEntry) -> &[EntryReference<FieldEntry, MethodEntry>] {
		self.references_to_fields.get(field).map_or(&[], Vec::as_slice)
	}

	/// The fields whose type mentions the class.
	pub fn get_field_type_references_to_class(&self, class: &ClassEntry) -> &[EntryReference<ClassEntry, FieldEntry>] {
		self.field_type_references.get(class).map_or(&[], Vec::as_slice)
	}

	/// The methods whose descriptor, or a descriptor of a lambda inside of them, mentions the class.
	pub fn get_method_type_references_to_class(&self, class: &ClassEntry) -> &[EntryReference<ClassEntry, MethodEntry>] {
		self.method_type_references.get(class).map_or(&[], Vec::as_slice)
	}

	/// Re-keys every referenced entry to the declaration closest to where it's referenced.
	pub(crate) fn process_index(&mut self, resolver: &impl EntryResolver) {
		fn resolve_method(resolver: &impl EntryResolver, method: &MethodEntry) -> MethodEntry {
			match resolver.resolve_first_entry(&Entry::Method(method.clone()), ResolutionStrategy::ResolveClosest) {
				Entry::Method(resolved) => resolved,
				_ => method.clone(),
			}
		}

		fn resolve_field(resolver: &impl EntryResolver, field: &FieldEntry) -> FieldEntry {
			match resolver.resolve_first_entry(&Entry::Field(field.clone()), ResolutionStrategy::ResolveClosest) {
				Entry::Field(resolved) => resolved,
				_ => field.clone(),
			}
		}

		fn resolve_references<E: Clone + std::hash::Hash + Eq, C: Clone>(
			map: &References<E, C>,
			resolve_entry: impl Fn(&E) -> E,
			resolve_context: impl Fn(&C) -> C,
		) -> References<E, C> {
			let mut resolved = IndexMap::new();
			for reference in map.values().flatten() {
				add(&mut resolved, EntryReference::new(
					resolve_entry(&reference.entry),
					resolve_context(&reference.context),
					reference.target_type.clone(),
				));
			}
			resolved
		}

		let method = |method: &MethodEntry| resolve_method(resolver, method);
		let field = |field: &FieldEntry| resolve_field(resolver, field);
		let class = |class: &ClassEntry| class.clone();

		let mut method_references: IndexMap<MethodEntry, IndexSet<MethodEntry>> = IndexMap::new();
		for (caller, referenced) in &self.method_references {
			method_references.entry(method(caller)).or_default()
				.extend(referenced.iter().map(method));
		}
		self.method_references = method_references;

		self.references_to_methods = resolve_references(&self.references_to_methods, method, method);
		self.references_to_classes = resolve_references(&self.references_to_classes, class, method);
		self.references_to_fields = resolve_references(&self.references_to_fields, field, method);
		self.field_type_references = resolve_references(&self.field_type_references, class, field);
		self.method_type_references = resolve_references(&self.method_type_references, class, method);
	}

	pub fn remapped(&self, translator: &(impl Translator + ?Sized)) -> ReferenceIndex {
		fn translate_references<E: Translatable + Clone + std::hash::Hash + Eq, C: Translatable>(
			map: &References<E, C>,
			translator: &(impl Translator + ?Sized),
		) -> References<E, C> {
			let mut translated = IndexMap::new();
			for reference in map.values().flatten() {
				add(&mut translated, reference.translate(translator));
			}
			translated
		}

		ReferenceIndex {
			method_references: self.method_references.iter()
				.map(|(caller, referenced)| {
					(caller.translate(translator), referenced.iter().map(|x| x.translate(translator)).collect())
				})
				.collect(),
			references_to_methods: translate_references(&self.references_to_methods, translator),
			references_to_classes: translate_references(&self.references_to_classes, translator),
			references_to_fields: translate_references(&self.references_to_fields, translator),
			field_type_references: translate_references(&self.field_type_references, translator),
			method_type_references: translate_references(&self.method_type_references, translator),
		}
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use duke::entry::{ClassEntry, FieldEntry, MethodEntry};
	use duke::parsed::{Handle, Instruction, Loadable, MethodRef, ParsedMethod, Receiver, FieldRef};
	use crate::index::reference::{scan_method, ReferenceRecord, ReferenceTargetType};

	fn class(name: &str) -> ClassEntry {
		ClassEntry::new(name)
	}

	#[test]
	fn scan_plain_instructions() {
		let method = ParsedMethod::new(0x0001u16, "run", "()V").with_code(vec![
			Instruction::GetStatic(FieldRef::new("a", "b", "I")),
			Instruction::PutField(FieldRef::new("a", "c", "J"), Receiver::Class("b".to_owned())),
			Instruction::InvokeVirtual(MethodRef::new("a", "d", "()V"), Receiver::Class("[La;".to_owned())),
			Instruction::InvokeSpecial(MethodRef::new("a", "<init>", "()V"), Receiver::Uninitialized),
			Instruction::New("a".to_owned()),
			Instruction::CheckCast("[[Lc;".to_owned()),
			Instruction::InstanceOf("[I".to_owned()),
			Instruction::Ldc(Loadable::Class("d".to_owned())),
			Instruction::Ldc(Loadable::Integer(3)),
			Instruction::Other,
		]);

		assert_eq!(scan_method(&method), vec![
			ReferenceRecord::Field(FieldEntry::new(class("a"), "b", "I"), ReferenceTargetType::None),
			ReferenceRecord::Field(FieldEntry::new(class("a"), "c", "J"), ReferenceTargetType::ClassType(class("b"))),
			ReferenceRecord::Method(MethodEntry::new(class("a"), "d", "()V"), ReferenceTargetType::ClassType(class("java/lang/Object"))),
			ReferenceRecord::Method(MethodEntry::new(class("a"), "<init>", "()V"), ReferenceTargetType::Uninitialized),
			ReferenceRecord::Class(class("c"), ReferenceTargetType::None),
			ReferenceRecord::Class(class("d"), ReferenceTargetType::None),
		]);
	}

	#[test]
	fn scan_lambdas() {
		let metafactory = Handle::InvokeStatic(MethodRef::new(
			"java/lang/invoke/LambdaMetafactory",
			"metafactory",
			"(Ljava/lang/invoke/MethodHandles$Lookup;Ljava/lang/String;Ljava/lang/invoke/MethodType;Ljava/lang/invoke/MethodType;Ljava/lang/invoke/MethodHandle;Ljava/lang/invoke/MethodType;)Ljava/lang/invoke/CallSite;",
		));

		// `foo::bar` with `foo` of type `a`, implementing `Supplier<b>`
		let method = ParsedMethod::new(0x0001u16, "run", "()V").with_code(vec![
			Instruction::InvokeDynamic {
				name: "get".to_owned(),
				desc: "(La;)Ljava/util/function/Supplier;".into(),
				bootstrap: metafactory,
				arguments: vec![
					Loadable::MethodType("()Ljava/lang/Object;".into()),
					Loadable::MethodHandle(Handle::InvokeVirtual(MethodRef::new("a", "bar", "()Lb;"))),
					Loadable::MethodType("()Lb;".into()),
				],
			},
		]);

		let records = scan_method(&method);
		assert_eq!(records[0], ReferenceRecord::Method(MethodEntry::new(class("a"), "bar", "()Lb;"), ReferenceTargetType::None));
		assert_eq!(records[1..], [
			ReferenceRecord::MethodType(class("a")),
			ReferenceRecord::MethodType(class("java/util/function/Supplier")),
			ReferenceRecord::MethodType(class("java/lang/Object")),
			ReferenceRecord::MethodType(class("b")),
		]);
	}
}
