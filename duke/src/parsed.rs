//! The already parsed form of a class, as much of it as indexing needs.
//!
//! Reading class files is not done here, a [`ClassProvider`] hands out [`ParsedClass`]es from wherever they come from.

use indexmap::IndexMap;
use crate::access::AccessFlags;
use crate::descriptor::{FieldDescriptor, MethodDescriptor};
use crate::entry::{ClassEntry, Entry, FieldEntry, MethodEntry};
use crate::signature::Signature;

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedClass {
	pub access: AccessFlags,
	pub name: String,
	pub super_class: Option<String>,
	pub interfaces: Vec<String>,
	pub signature: Option<Signature>,

	pub fields: Vec<ParsedField>,
	pub methods: Vec<ParsedMethod>,
}

impl ParsedClass {
	pub fn new(access: impl Into<AccessFlags>, name: impl Into<String>, super_class: Option<&str>, interfaces: &[&str]) -> ParsedClass {
		ParsedClass {
			access: access.into(),
			name: name.into(),
			super_class: super_class.map(str::to_owned),
			interfaces: interfaces.iter().map(|&x| x.to_owned()).collect(),
			signature: None,
			fields: Vec::new(),
			methods: Vec::new(),
		}
	}

	pub fn with_field(mut self, field: ParsedField) -> ParsedClass {
		self.fields.push(field);
		self
	}

	pub fn with_method(mut self, method: ParsedMethod) -> ParsedClass {
		self.methods.push(method);
		self
	}

	pub fn entry(&self) -> ClassEntry {
		ClassEntry::new(&self.name)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedField {
	pub access: AccessFlags,
	pub name: String,
	pub desc: FieldDescriptor,
	pub signature: Option<Signature>,
}

impl ParsedField {
	pub fn new(access: impl Into<AccessFlags>, name: impl Into<String>, desc: impl Into<FieldDescriptor>) -> ParsedField {
		ParsedField { access: access.into(), name: name.into(), desc: desc.into(), signature: None }
	}

	pub fn entry(&self, class: &ClassEntry) -> FieldEntry {
		FieldEntry::new(class.clone(), &self.name, self.desc.clone())
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMethod {
	pub access: AccessFlags,
	pub name: String,
	pub desc: MethodDescriptor,
	pub signature: Option<Signature>,
	/// The instructions of the method, `None` for abstract and native methods.
	pub code: Option<Vec<Instruction>>,
}

impl ParsedMethod {
	pub fn new(access: impl Into<AccessFlags>, name: impl Into<String>, desc: impl Into<MethodDescriptor>) -> ParsedMethod {
		ParsedMethod { access: access.into(), name: name.into(), desc: desc.into(), signature: None, code: None }
	}

	pub fn with_code(mut self, code: Vec<Instruction>) -> ParsedMethod {
		self.code = Some(code);
		self
	}

	pub fn entry(&self, class: &ClassEntry) -> MethodEntry {
		MethodEntry::new(class.clone(), &self.name, self.desc.clone())
	}
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct FieldRef {
	pub class: String,
	pub name: String,
	pub desc: FieldDescriptor,
}

impl FieldRef {
	pub fn new(class: impl Into<String>, name: impl Into<String>, desc: impl Into<FieldDescriptor>) -> FieldRef {
		FieldRef { class: class.into(), name: name.into(), desc: desc.into() }
	}

	pub fn entry(&self) -> FieldEntry {
		FieldEntry::new(ClassEntry::new(&self.class), &self.name, self.desc.clone())
	}
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct MethodRef {
	pub class: String,
	pub name: String,
	pub desc: MethodDescriptor,
}

impl MethodRef {
	pub fn new(class: impl Into<String>, name: impl Into<String>, desc: impl Into<MethodDescriptor>) -> MethodRef {
		MethodRef { class: class.into(), name: name.into(), desc: desc.into() }
	}

	pub fn entry(&self) -> MethodEntry {
		MethodEntry::new(ClassEntry::new(&self.class), &self.name, self.desc.clone())
	}
}

/// A method handle, as used by `invokedynamic` bootstrap methods and their arguments.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Handle {
	GetField(FieldRef),
	GetStatic(FieldRef),
	PutField(FieldRef),
	PutStatic(FieldRef),
	InvokeVirtual(MethodRef),
	InvokeStatic(MethodRef),
	InvokeSpecial(MethodRef),
	NewInvokeSpecial(MethodRef),
	InvokeInterface(MethodRef),
}

impl Handle {
	/// The field or method this handle refers to.
	pub fn entry(&self) -> Entry {
		match self {
			Handle::GetField(field) | Handle::GetStatic(field) | Handle::PutField(field) | Handle::PutStatic(field) =>
				Entry::Field(field.entry()),
			Handle::InvokeVirtual(method) | Handle::InvokeStatic(method) | Handle::InvokeSpecial(method) |
			Handle::NewInvokeSpecial(method) | Handle::InvokeInterface(method) =>
				Entry::Method(method.entry()),
		}
	}

	/// Returns whether using this handle involves an instance of the owning class.
	pub fn has_receiver(&self) -> bool {
		!matches!(self, Handle::GetStatic(_) | Handle::PutStatic(_) | Handle::InvokeStatic(_))
	}
}

/// A value an `ldc` instruction or a bootstrap method argument can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable {
	Integer(i32),
	Float(f32),
	Long(i64),
	Double(f64),
	String(String),
	/// An internal class name, or an array descriptor.
	Class(String),
	MethodType(MethodDescriptor),
	MethodHandle(Handle),
}

/// The object an instance field access or instance method call works on, as found on the operand stack by whoever
/// parsed the method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Receiver {
	/// `null`, an object whose constructor wasn't called yet, or an instruction that can't be reached.
	Uninitialized,
	/// An object of the class with the given internal name, or an array with the given descriptor.
	Class(String),
}

/// The instructions relevant for finding references. Everything else is [`Instruction::Other`].
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
	GetField(FieldRef, Receiver),
	PutField(FieldRef, Receiver),
	GetStatic(FieldRef),
	PutStatic(FieldRef),
	InvokeVirtual(MethodRef, Receiver),
	InvokeSpecial(MethodRef, Receiver),
	InvokeStatic(MethodRef),
	InvokeInterface(MethodRef, Receiver),
	InvokeDynamic {
		name: String,
		desc: MethodDescriptor,
		bootstrap: Handle,
		arguments: Vec<Loadable>,
	},
	Ldc(Loadable),
	New(String),
	CheckCast(String),
	InstanceOf(String),
	Other,
}

/// Gives access to the classes of the program being indexed.
///
/// Implementations are shared between threads when indexing in parallel.
pub trait ClassProvider: Sync {
	/// The names of all classes this provider knows of, in a stable order.
	fn class_names(&self) -> Vec<String>;

	fn get(&self, name: &str) -> Option<ParsedClass>;
}

/// A [`ClassProvider`] keeping all classes in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryClassProvider {
	classes: IndexMap<String, ParsedClass>,
}

impl MemoryClassProvider {
	pub fn new() -> MemoryClassProvider {
		MemoryClassProvider::default()
	}

	pub fn add(&mut self, class: ParsedClass) {
		self.classes.insert(class.name.clone(), class);
	}

	pub fn with(mut self, class: ParsedClass) -> MemoryClassProvider {
		self.add(class);
		self
	}
}

impl FromIterator<ParsedClass> for MemoryClassProvider {
	fn from_iter<T: IntoIterator<Item=ParsedClass>>(iter: T) -> Self {
		let mut provider = MemoryClassProvider::new();
		for class in iter {
			provider.add(class);
		}
		provider
	}
}

impl ClassProvider for MemoryClassProvider {
	fn class_names(&self) -> Vec<String> {
		self.classes.keys().cloned().collect()
	}

	fn get(&self, name: &str) -> Option<ParsedClass> {
		self.classes.get(name).cloned()
	}
}
