use anyhow::Result;
use pretty_assertions::assert_eq;
use duke::access::AccessFlags;
use duke::entry::{ClassEntry, Entry, FieldEntry, MethodEntry};
use duke::parsed::{MemoryClassProvider, ParsedClass, ParsedField, ParsedMethod};
use quill::mapping::EntryMapping;
use quill::tree::EntryTree;
use quill::validation::{ValidationContext, ValidationError};
use unscramble::config::IndexingConfig;
use unscramble::index::JarIndex;
use unscramble::progress::NoProgress;
use unscramble::remapper::{BidirectionalMapper, EntryRemapper};

const PUBLIC: u16 = AccessFlags::PUBLIC;

fn class(name: &str) -> Entry {
	Entry::Class(ClassEntry::new(name))
}

fn method(class: &str, name: &str, desc: &str) -> Entry {
	Entry::Method(MethodEntry::new(ClassEntry::new(class), name, desc))
}

fn field(class: &str, name: &str, desc: &str) -> Entry {
	Entry::Field(FieldEntry::new(ClassEntry::new(class), name, desc))
}

/// A class `a`, and a class `b` extending it and overriding `run()V`.
fn index() -> Result<JarIndex> {
	let provider = MemoryClassProvider::new()
		.with(ParsedClass::new(PUBLIC, "a", Some("java/lang/Object"), &[])
			.with_field(ParsedField::new(AccessFlags::PRIVATE, "a", "Ljava/lang/String;"))
			.with_field(ParsedField::new(AccessFlags::PRIVATE, "b", "Ljava/lang/String;"))
			.with_method(ParsedMethod::new(PUBLIC, "a", "()Ljava/lang/String;"))
			.with_method(ParsedMethod::new(PUBLIC, "run", "()V"))
			.with_method(ParsedMethod::new(PUBLIC, "stop", "()V")))
		.with(ParsedClass::new(PUBLIC, "b", Some("a"), &[])
			.with_method(ParsedMethod::new(PUBLIC, "run", "()V")));
	JarIndex::index_jar(&provider, &IndexingConfig::default(), NoProgress)
}

#[test]
fn renamed_class_shows_in_its_members() -> Result<()> {
	let index = index()?;
	let mut remapper = EntryRemapper::empty(&index);

	remapper.map_from_obf(&class("a"), Some(EntryMapping::new("com/example/Foo")))?;

	let deobf = remapper.deobfuscate(&method("a", "a", "()Ljava/lang/String;"));
	assert_eq!(deobf.containing_class().full_name(), "com/example/Foo");
	assert_eq!(deobf.name(), "a");
	Ok(())
}

#[test]
fn overriding_methods_share_the_mapping() -> Result<()> {
	let index = index()?;
	let mut remapper = EntryRemapper::empty(&index);

	remapper.map_from_obf(&method("b", "run", "()V"), Some(EntryMapping::new("execute")))?;

	// stored once, at the topmost declaration
	assert_eq!(remapper.obf_entries().cloned().collect::<Vec<_>>(), vec![method("a", "run", "()V")]);
	assert_eq!(remapper.deobfuscate(&method("a", "run", "()V")).name(), "execute");
	assert_eq!(remapper.deobfuscate(&method("b", "run", "()V")).name(), "execute");

	let mapper = BidirectionalMapper::new(&remapper);
	assert_eq!(mapper.obfuscate(&method("a", "execute", "()V")), method("a", "run", "()V"));
	Ok(())
}

#[test]
fn documentation_stays_with_the_closest_declaration() -> Result<()> {
	let index = index()?;
	let mut remapper = EntryRemapper::empty(&index);

	let docs = EntryMapping::DEFAULT.with_docs(Some("Runs it again.".to_owned()));
	remapper.map_from_obf(&method("b", "run", "()V"), Some(docs.clone()))?;

	assert_eq!(remapper.get_deobf_mapping(&method("b", "run", "()V")), docs);
	assert_eq!(remapper.get_deobf_mapping(&method("a", "run", "()V")), EntryMapping::DEFAULT);
	Ok(())
}

#[test]
fn deltas() -> Result<()> {
	let index = index()?;
	let mut remapper = EntryRemapper::empty(&index);

	remapper.map_from_obf(&class("a"), Some(EntryMapping::new("com/example/Foo")))?;
	remapper.map_from_obf(&method("b", "run", "()V"), Some(EntryMapping::new("execute")))?;
	assert!(remapper.is_dirty());

	let delta = remapper.take_mapping_delta();
	assert!(delta.base_mappings.is_empty());
	assert_eq!(delta.changed_roots().into_iter().cloned().collect::<Vec<_>>(), vec![class("a")]);

	assert!(!remapper.is_dirty());
	assert!(remapper.take_mapping_delta().is_empty());

	remapper.map_from_obf(&class("a"), None)?;
	let delta = remapper.take_mapping_delta();
	assert_eq!(delta.base_mappings.get(&class("a")), Some(&EntryMapping::new("com/example/Foo")));
	assert!(delta.additions.is_empty());
	assert!(delta.deletions.contains(&class("a")));
	Ok(())
}

#[test]
fn clashing_names_are_rejected() -> Result<()> {
	let index = index()?;
	let mut remapper = EntryRemapper::empty(&index);
	remapper.map_from_obf(&field("a", "b", "Ljava/lang/String;"), Some(EntryMapping::new("name")))?;
	remapper.take_mapping_delta();

	// with the mapped name of a sibling
	let mut context = ValidationContext::new();
	remapper.put_mapping(&mut context, &field("a", "a", "Ljava/lang/String;"), EntryMapping::new("name"));
	assert_eq!(context.errors(), &[ValidationError::NonUniqueName { name: "name".to_owned(), parent: "a".to_owned() }]);

	// with the obfuscated name of a method in the superclass
	assert!(remapper.map_from_obf(&method("b", "run", "()V"), Some(EntryMapping::new("stop"))).is_err());

	assert!(!remapper.is_dirty());
	assert_eq!(remapper.get_deobf_mapping(&field("a", "a", "Ljava/lang/String;")), EntryMapping::DEFAULT);
	assert_eq!(remapper.deobfuscate(&method("b", "run", "()V")).name(), "run");
	Ok(())
}

#[test]
fn validating_stores_nothing() -> Result<()> {
	let index = index()?;
	let remapper = EntryRemapper::empty(&index);

	let mut context = ValidationContext::new();
	remapper.validate_put_mapping(&mut context, &class("a"), &EntryMapping::new("com/example/Foo"));
	assert!(context.can_proceed());

	let mut context = ValidationContext::new();
	remapper.validate_put_mapping(&mut context, &class("a"), &EntryMapping::new("Foo"));
	assert_eq!(context.errors(), &[ValidationError::MissingPackage("Foo".to_owned())]);

	assert_eq!(remapper.obf_entries().count(), 0);
	Ok(())
}

#[test]
fn broken_mappings_are_dropped() -> Result<()> {
	let index = index()?;
	let mappings: EntryTree<_> = [
		(class("a"), EntryMapping::new("com/example/Foo")),
		(method("a", "run", "()V"), EntryMapping::new("execute")),
		(method("a", "missing", "()V"), EntryMapping::new("gone")),
		(class("x"), EntryMapping::new("com/example/Gone")),
	].into_iter().collect();
	let mut remapper = EntryRemapper::mapped(&index, mappings);

	let dropped = remapper.drop_broken_mappings(NoProgress);

	assert_eq!(dropped.entries().cloned().collect::<Vec<_>>(), vec![method("a", "missing", "()V"), class("x")]);
	assert!(remapper.is_dirty());
	assert_eq!(remapper.obf_entries().cloned().collect::<Vec<_>>(), vec![class("a"), method("a", "run", "()V")]);

	let mapper = BidirectionalMapper::new(&remapper);
	assert_eq!(mapper.obfuscate(&class("com/example/Gone")), class("com/example/Gone"));

	let mappings = remapper.into_mappings();
	assert_eq!(mappings.len(), 2);
	Ok(())
}
