use anyhow::Result;
use pretty_assertions::assert_eq;
use duke::access::AccessFlags;
use duke::entry::{ClassEntry, Entry, FieldEntry, LocalVariableEntry, MethodEntry};
use duke::parsed::{ClassProvider, MemoryClassProvider, ParsedClass, ParsedMethod};

#[test]
fn inner_classes() -> Result<()> {
	let class = ClassEntry::new("net/example/Outer$Inner$1");

	assert_eq!(class.name(), "1");
	assert!(class.is_inner());
	assert_eq!(class.simple_name(), "Outer$Inner$1");
	assert_eq!(class.package_name(), Some("net/example"));
	assert_eq!(
		class.class_chain().into_iter().map(ClassEntry::full_name).collect::<Vec<_>>(),
		vec!["net/example/Outer", "net/example/Outer$Inner", "net/example/Outer$Inner$1"]
	);

	// dollar signs in packages or at the edges of a name don't make inner classes
	assert!(!ClassEntry::new("a$b/C").is_inner());
	assert!(!ClassEntry::new("a$").is_inner());
	assert!(!ClassEntry::new("[La$b;").is_inner());

	assert_eq!(ClassEntry::new("a$b"), ClassEntry::inner(ClassEntry::new("a"), "b"));
	Ok(())
}

#[test]
fn class_ordering_uses_full_name() -> Result<()> {
	let mut classes = vec![
		ClassEntry::new("b"),
		ClassEntry::new("a$c"),
		ClassEntry::new("a"),
		ClassEntry::new("a$b"),
	];
	classes.sort();

	assert_eq!(
		classes.iter().map(ClassEntry::to_string).collect::<Vec<_>>(),
		vec!["a", "a$b", "a$c", "b"]
	);
	Ok(())
}

#[test]
fn replace_ancestor() -> Result<()> {
	let method = MethodEntry::new(ClassEntry::new("a$b"), "c", "(La;)V");
	let local = Entry::LocalVariable(LocalVariableEntry::new(method, 1, "x", true));

	let renamed = local.replace_ancestor(
		&Entry::Class(ClassEntry::new("a")),
		&Entry::Class(ClassEntry::new("com/example/Foo")),
	);

	assert_eq!(renamed.containing_class().full_name(), "com/example/Foo$b");
	assert_eq!(renamed.name(), "x");
	// descriptors are not touched, they are translated separately
	assert_eq!(renamed.find_method_ancestor().map(|m| m.desc.as_str()), Some("(La;)V"));

	// not an ancestor, so nothing happens
	let unrelated = local.replace_ancestor(
		&Entry::Class(ClassEntry::new("z")),
		&Entry::Class(ClassEntry::new("y")),
	);
	assert_eq!(unrelated, local);
	Ok(())
}

#[test]
fn conflicts() -> Result<()> {
	let a = ClassEntry::new("a");
	let b = ClassEntry::new("b");

	let field = Entry::Field(FieldEntry::new(a.clone(), "f", "I"));
	let other_field = Entry::Field(FieldEntry::new(a.clone(), "g", "J"));
	let foreign_field = Entry::Field(FieldEntry::new(b.clone(), "g", "J"));
	assert!(field.can_conflict_with(&other_field));
	assert!(!field.can_conflict_with(&foreign_field));

	let method = Entry::Method(MethodEntry::new(a.clone(), "m", "(I)V"));
	let same_args = Entry::Method(MethodEntry::new(a.clone(), "n", "(I)Ljava/lang/String;"));
	let other_args = Entry::Method(MethodEntry::new(a.clone(), "n", "(J)V"));
	assert!(method.can_conflict_with(&same_args));
	assert!(!method.can_conflict_with(&other_args));
	assert!(!method.can_conflict_with(&field));

	assert!(Entry::Class(a).can_conflict_with(&Entry::Class(b)));
	Ok(())
}

#[test]
fn local_variables_are_identified_by_index() -> Result<()> {
	let method = MethodEntry::new(ClassEntry::new("a"), "m", "(II)V");
	let x = LocalVariableEntry::new(method.clone(), 1, "x", true);
	let y = LocalVariableEntry::new(method.clone(), 1, "y", true);
	let z = LocalVariableEntry::new(method, 2, "x", true);

	assert_eq!(x, y);
	assert_ne!(x, z);
	Ok(())
}

#[test]
fn memory_class_provider() -> Result<()> {
	let provider: MemoryClassProvider = [
		ParsedClass::new(AccessFlags::PUBLIC, "b", Some("java/lang/Object"), &[]),
		ParsedClass::new(AccessFlags::PUBLIC, "a", Some("b"), &[])
			.with_method(ParsedMethod::new(AccessFlags::PUBLIC, "<init>", "()V")),
	].into_iter().collect();

	assert_eq!(provider.class_names(), vec!["b", "a"]);
	let a = provider.get("a").ok_or_else(|| anyhow::anyhow!("class a is missing"))?;
	assert_eq!(a.super_class.as_deref(), Some("b"));
	assert!(a.methods[0].entry(&a.entry()).is_constructor());
	assert_eq!(provider.get("c"), None);
	Ok(())
}
