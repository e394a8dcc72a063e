use anyhow::Result;
use indexmap::IndexSet;
use pretty_assertions::assert_eq;
use duke::access::AccessFlags;
use duke::entry::{ClassEntry, Entry, FieldEntry, LocalVariableEntry, MethodEntry};
use duke::parsed::{Instruction, MemoryClassProvider, MethodRef, ParsedClass, ParsedField, ParsedMethod, Receiver};
use quill::resolver::{EntryResolver, ResolutionStrategy};
use unscramble::config::IndexingConfig;
use unscramble::index::JarIndex;
use unscramble::progress::NoProgress;

const PUBLIC: u16 = AccessFlags::PUBLIC;

fn method(class: &str, name: &str, desc: &str) -> MethodEntry {
	MethodEntry::new(ClassEntry::new(class), name, desc)
}

/// An interface `i`, a class `a` implementing it and a class `b` extending `a`, all with a method `run()V`.
fn hierarchy() -> Result<JarIndex> {
	let provider = MemoryClassProvider::new()
		.with(ParsedClass::new(PUBLIC | AccessFlags::INTERFACE | AccessFlags::ABSTRACT, "i", Some("java/lang/Object"), &[])
			.with_method(ParsedMethod::new(PUBLIC | AccessFlags::ABSTRACT, "run", "()V")))
		.with(ParsedClass::new(PUBLIC, "a", Some("java/lang/Object"), &["i"])
			.with_field(ParsedField::new(PUBLIC, "f", "I"))
			.with_field(ParsedField::new(AccessFlags::PRIVATE, "p", "I"))
			.with_method(ParsedMethod::new(PUBLIC, "<init>", "()V"))
			.with_method(ParsedMethod::new(PUBLIC, "run", "()V"))
			.with_method(ParsedMethod::new(PUBLIC | AccessFlags::FINAL, "done", "()V"))
			.with_method(ParsedMethod::new(AccessFlags::PRIVATE, "hidden", "()V")))
		.with(ParsedClass::new(PUBLIC, "b", Some("a"), &[])
			.with_method(ParsedMethod::new(PUBLIC, "<init>", "()V"))
			.with_method(ParsedMethod::new(PUBLIC, "run", "()V"))
			.with_method(ParsedMethod::new(PUBLIC | AccessFlags::STATIC, "create", "()Lb;"))
			.with_method(ParsedMethod::new(AccessFlags::PRIVATE, "hidden", "()V")));
	JarIndex::index_jar(&provider, &IndexingConfig::default(), NoProgress)
}

#[test]
fn entry_owners() -> Result<()> {
	let index = hierarchy()?;
	let resolver = index.entry_resolver();

	// not inherited, so owned by their own class
	let private = Entry::Field(FieldEntry::new(ClassEntry::new("a"), "p", "I"));
	assert_eq!(resolver.resolve_entry_owner(&private), ClassEntry::new("a"));
	let static_method = Entry::Method(method("b", "create", "()Lb;"));
	assert_eq!(resolver.resolve_entry_owner(&static_method), ClassEntry::new("b"));

	// b doesn't declare f, but inherits it from a
	let inherited = Entry::Field(FieldEntry::new(ClassEntry::new("b"), "f", "I"));
	assert_eq!(resolver.resolve_entry_owner(&inherited), ClassEntry::new("a"));

	// the nearest declaration wins
	assert_eq!(resolver.resolve_entry_owner(&Entry::Method(method("b", "run", "()V"))), ClassEntry::new("b"));
	Ok(())
}

#[test]
fn resolving_to_declarations() -> Result<()> {
	let index = hierarchy()?;
	let resolver = index.entry_resolver();

	let run = Entry::Method(method("b", "run", "()V"));
	assert_eq!(resolver.resolve_entry(&run, ResolutionStrategy::ResolveRoot), vec![Entry::Method(method("i", "run", "()V"))]);
	assert_eq!(resolver.resolve_entry(&run, ResolutionStrategy::ResolveClosest), vec![run.clone()]);

	let inherited = Entry::Field(FieldEntry::new(ClassEntry::new("b"), "f", "I"));
	assert_eq!(resolver.resolve_entry(&inherited, ResolutionStrategy::ResolveClosest), vec![
		Entry::Field(FieldEntry::new(ClassEntry::new("a"), "f", "I")),
	]);

	// local variables follow their method
	let local = Entry::LocalVariable(LocalVariableEntry::new(method("b", "run", "()V"), 1, "", true));
	assert_eq!(resolver.resolve_entry(&local, ResolutionStrategy::ResolveRoot), vec![
		Entry::LocalVariable(LocalVariableEntry::new(method("i", "run", "()V"), 1, "", true)),
	]);

	// private methods don't override anything
	let hidden = Entry::Method(method("b", "hidden", "()V"));
	assert_eq!(resolver.resolve_entry(&hidden, ResolutionStrategy::ResolveRoot), vec![hidden.clone()]);

	// classes, and entries nobody knows of, resolve to themselves
	let class = Entry::Class(ClassEntry::new("b"));
	assert_eq!(resolver.resolve_entry(&class, ResolutionStrategy::ResolveRoot), vec![class.clone()]);
	let unknown = Entry::Method(method("x", "run", "()V"));
	assert_eq!(resolver.resolve_first_entry(&unknown, ResolutionStrategy::ResolveRoot), unknown);
	Ok(())
}

#[test]
fn methods_that_cannot_be_overridden() -> Result<()> {
	let index = hierarchy()?;
	let resolver = index.entry_resolver();

	for m in [
		method("a", "<init>", "()V"),
		method("a", "done", "()V"),
		method("a", "hidden", "()V"),
		method("b", "create", "()Lb;"),
		// not indexed at all
		method("x", "run", "()V"),
	] {
		assert_eq!(resolver.resolve_equivalent_methods(&m), IndexSet::from([m.clone()]), "{m}");
	}
	Ok(())
}

#[test]
fn overriding_methods_are_equivalent() -> Result<()> {
	let index = hierarchy()?;
	let resolver = index.entry_resolver();

	let expected = IndexSet::from([
		method("i", "run", "()V"),
		method("a", "run", "()V"),
		method("b", "run", "()V"),
	]);
	for m in &expected {
		assert_eq!(resolver.resolve_equivalent_methods(m), expected, "{m}");
	}

	let local = Entry::LocalVariable(LocalVariableEntry::new(method("a", "run", "()V"), 1, "", true));
	assert_eq!(resolver.resolve_equivalent_entries(&local).len(), 3);
	Ok(())
}

#[test]
fn inheritance_tree() -> Result<()> {
	let index = hierarchy()?;
	let tree = index.entry_resolver().tree_builder().build_method_inheritance(&method("b", "run", "()V"));

	assert_eq!(tree.entry, method("i", "run", "()V"));
	assert!(tree.implemented);
	assert_eq!(tree.methods(), vec![
		&method("i", "run", "()V"),
		&method("a", "run", "()V"),
		&method("b", "run", "()V"),
	]);
	Ok(())
}

#[test]
fn bridge_and_specialized_methods_are_equivalent() -> Result<()> {
	let provider = MemoryClassProvider::new()
		.with(ParsedClass::new(PUBLIC, "c", Some("java/lang/Object"), &["java/util/function/Supplier"])
			.with_method(ParsedMethod::new(PUBLIC, "get", "()Ljava/lang/String;"))
			.with_method(ParsedMethod::new(PUBLIC | AccessFlags::SYNTHETIC | AccessFlags::BRIDGE, "get", "()Ljava/lang/Object;")
				.with_code(vec![
					Instruction::InvokeVirtual(MethodRef::new("c", "get", "()Ljava/lang/String;"), Receiver::Class("c".to_owned())),
				])));
	let index = JarIndex::index_jar(&provider, &IndexingConfig::default(), NoProgress)?;
	let resolver = index.entry_resolver();

	let bridge = method("c", "get", "()Ljava/lang/Object;");
	let specialized = method("c", "get", "()Ljava/lang/String;");
	let expected = IndexSet::from([bridge.clone(), specialized.clone()]);

	assert_eq!(resolver.resolve_equivalent_methods(&bridge), expected);
	assert_eq!(resolver.resolve_equivalent_methods(&specialized), expected);

	// the specialized method is named through its bridge
	assert_eq!(
		resolver.resolve_entry(&Entry::Method(specialized), ResolutionStrategy::ResolveRoot),
		vec![Entry::Method(bridge)],
	);
	Ok(())
}
